/*!
# External Indexer

Запуск внешней утилиты индексации (`docsetutil index <bundle>`) после
сборки. The utility is opaque: only its exit status is inspected.
*/

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::configuration::IndexerConfig;

/// Итог шага индексации
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexingOutcome {
    Disabled,
    NotFound,
    Succeeded,
    Failed { code: Option<i32> },
}

impl IndexingOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, IndexingOutcome::Succeeded | IndexingOutcome::Failed { .. })
    }
}

/// Resolved indexing command.
#[derive(Debug, Clone)]
pub struct DocsetIndexer {
    program: PathBuf,
    args: Vec<String>,
}

impl DocsetIndexer {
    /// Находит утилиту: явный путь, затем кандидаты по порядку
    pub fn resolve(config: &IndexerConfig) -> Option<Self> {
        let program = config
            .path
            .iter()
            .chain(config.candidates.iter())
            .find(|candidate| candidate.is_file())?
            .clone();

        Some(Self {
            program,
            args: config.args.clone(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `<program> <args...> <docset root>`
    pub fn command(&self, docset_root: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(docset_root);
        command
    }

    pub fn run(&self, docset_root: &Path) -> Result<IndexingOutcome> {
        tracing::info!("Indexing {} with {}", docset_root.display(), self.program.display());
        let status = self
            .command(docset_root)
            .status()
            .with_context(|| format!("Failed to start {}", self.program.display()))?;

        if status.success() {
            Ok(IndexingOutcome::Succeeded)
        } else {
            tracing::warn!("{} exited with {}", self.program.display(), status);
            Ok(IndexingOutcome::Failed {
                code: status.code(),
            })
        }
    }
}

/// Runs the configured indexer, if any. Sources are removed only after a
/// successful run.
pub fn run_indexer(
    config: &IndexerConfig,
    docset_root: &Path,
    sources: &[PathBuf],
) -> Result<IndexingOutcome> {
    if !config.enabled {
        return Ok(IndexingOutcome::Disabled);
    }

    let Some(indexer) = DocsetIndexer::resolve(config) else {
        tracing::warn!("Indexing utility not found; Nodes.xml and Tokens.xml are kept for manual indexing");
        return Ok(IndexingOutcome::NotFound);
    };

    let outcome = indexer.run(docset_root)?;
    if outcome == IndexingOutcome::Succeeded && config.remove_sources {
        for source in sources {
            if source.exists() {
                fs::remove_file(source)
                    .with_context(|| format!("Failed to remove {}", source.display()))?;
            }
        }
    }
    Ok(outcome)
}
