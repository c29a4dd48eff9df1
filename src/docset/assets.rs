//! Копирование статических файлов и литеральные CSS-патчи

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::configuration::{CorpusConfig, CssPatch};
use crate::core::{copy_dir_recursive, copy_file};

/// Результат копирования статики
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetReport {
    pub files_copied: usize,
    /// Files copied from static directories
    pub directory_files_copied: usize,
    pub patches_applied: usize,
    /// `file: find` of patches whose text was not found
    pub patches_missed: Vec<String>,
}

/// Copies the configured static files and directories into `documents`.
pub fn copy_static_assets(
    source: &Path,
    documents: &Path,
    corpus: &CorpusConfig,
) -> Result<AssetReport> {
    let mut report = AssetReport::default();

    for file in &corpus.static_files {
        copy_file(&source.join(file), &documents.join(file))?;
        report.files_copied += 1;
    }

    for dir in &corpus.static_dirs {
        let copied = copy_dir_recursive(&source.join(dir), &documents.join(dir))
            .with_context(|| format!("Failed to copy static directory {}", dir))?;
        tracing::debug!("Copied {} files from {}", copied, dir);
        report.directory_files_copied += copied;
    }

    Ok(report)
}

/// Применяет патчи к уже скопированным файлам.
///
/// Each patch replaces every occurrence of `find` with `replace`. A patch
/// whose file or text is absent is reported and skipped.
pub fn apply_css_patches(documents: &Path, patches: &[CssPatch], report: &mut AssetReport) -> Result<()> {
    for patch in patches {
        let path = documents.join(&patch.file);
        let label = format!("{}: {}", patch.file, patch.find);

        if !path.is_file() {
            tracing::warn!("CSS patch target {} was not copied, skipping", patch.file);
            report.patches_missed.push(label);
            continue;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if !content.contains(&patch.find) {
            tracing::warn!("{:?} not found in {}, patch skipped", patch.find, patch.file);
            report.patches_missed.push(label);
            continue;
        }

        fs::write(&path, content.replace(&patch.find, &patch.replace))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        report.patches_applied += 1;
    }
    Ok(())
}
