//! Общие аргументы командной строки

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use super::output::OutputFormat;
use crate::configuration::ConverterConfig;

/// Общие аргументы для всех команд
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CommonArgs {
    /// Определяет уровень логирования на основе флагов
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Проверяет, нужно ли выводить информацию
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Progress bar only makes sense for interactive text output
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.verbose && self.format == OutputFormat::Text
    }
}

/// Аргументы конфигурации конвертера
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML file overriding the built-in AS3 layout
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the external indexing step
    #[arg(long)]
    pub no_index: bool,

    /// Process pages in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Keep inherited members hidden in rewritten pages
    #[arg(long)]
    pub keep_hidden: bool,

    /// Path to the docsetutil binary
    #[arg(long)]
    pub docsetutil: Option<PathBuf>,
}

impl ConfigArgs {
    /// Загружает конфигурацию и применяет флаги поверх неё
    pub fn load(&self) -> Result<ConverterConfig> {
        let mut config = match &self.config {
            Some(path) => {
                super::validate_path(path, "Config file")?;
                ConverterConfig::load_from_file(path)?
            }
            None => ConverterConfig::default(),
        };

        if self.no_index {
            config.indexer.enabled = false;
        }
        if self.parallel {
            config.parallel = true;
        }
        if self.keep_hidden {
            config.rewrite.reveal_inherited = false;
        }
        if let Some(path) = &self.docsetutil {
            config.indexer.path = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
