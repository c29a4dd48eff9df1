/*!
# Error System for the AS3 Docset Converter

Two families of typed errors travel inside `anyhow` chains:

- [`ValidationError`] - the source corpus or configuration is not what the
  converter expects. Reported as a single line, never retried.
- [`ExtractionError`] - the markup of a page does not match the structural
  assumptions of an extractor. Reported with the full cause chain.

Everything else (a missing optional table, a page without a type signature,
an anchor that cannot be resolved) is a soft condition and is not an error.
*/

use std::path::PathBuf;
use thiserror::Error;

/// Ошибки проверки исходного корпуса документации
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("{file} does not look like the expected reference (title \"{expected}\" not found)")]
    TitleMismatch { file: PathBuf, expected: String },

    #[error("Required file is missing from the source directory: {0}")]
    MissingRequiredFile(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}

/// Structural mismatch between an extractor and the page markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("expected <{expected}> element, found {found}")]
    UnexpectedTag { expected: String, found: String },

    #[error("<{tag}> element has no `{attribute}` attribute")]
    MissingAttribute { tag: String, attribute: String },

    #[error("expected a table-like container, found {found}")]
    NotATable { found: String },
}

impl ExtractionError {
    pub fn unexpected_tag(expected: &str, found: impl Into<String>) -> Self {
        Self::UnexpectedTag {
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    pub fn missing_attribute(tag: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Возвращает true, если в цепочке причин есть ошибка валидации
pub fn is_validation_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| cause.downcast_ref::<ValidationError>().is_some())
}
