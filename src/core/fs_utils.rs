//! File system utility helpers (BOM-aware readers, directory copies, etc.)
use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Read an HTML page as UTF-8 text, stripping UTF-8 BOM if present.
///
/// Invalid UTF-8 sequences are replaced rather than rejected; a handful of
/// pages in the reference carry stray Latin-1 bytes.
pub fn read_html_file(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content.trim_start_matches('\u{FEFF}').to_string())
}

/// Absolute, symlink-free form of a path that may not exist yet.
///
/// The longest existing prefix is canonicalized and the missing tail is
/// appended with `.` and `..` folded lexically.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read the current directory")?
            .join(path)
    };

    let mut existing = absolute.as_path();
    let mut tail: Vec<Component> = Vec::new();
    let mut resolved = loop {
        if let Ok(canonical) = existing.canonicalize() {
            break canonical;
        }
        let Some(parent) = existing.parent() else {
            break PathBuf::new();
        };
        if let Some(last) = existing.components().next_back() {
            tail.push(last);
        }
        existing = parent;
    };

    for component in tail.into_iter().rev() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Writes a file, creating parent directories as needed.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Copies a single file, creating parent directories of the target.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))
}

/// Recursively copies a directory tree. Returns the number of copied files.
pub fn copy_dir_recursive(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", from.display()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("Unexpected path outside {}", from.display()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
