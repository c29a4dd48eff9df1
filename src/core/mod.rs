/*!
# Core Module

Error types and file system helpers shared by the extraction engine and
the docset assembler.
*/

pub mod errors;
pub mod fs_utils;

pub use errors::{is_validation_error, ExtractionError, ValidationError};
pub use fs_utils::{copy_dir_recursive, copy_file, read_html_file, resolve_path, write_file};
