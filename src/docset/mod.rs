/*!
# Docset Assembler

Собирает docset-бандл из распакованного справочника ActionScript 3.

## Этапы

1. проверка исходной папки (заголовок манифеста, обязательные файлы);
2. подготовка `<bundle>/Contents/Resources/Documents`;
3. `Info.plist` и `Nodes.xml`;
4. копирование статики и CSS-патчи;
5. сбор страниц из алфавитных индексов;
6. для каждой страницы: один разбор, извлечение токенов, переписывание,
   запись в `Documents/<page>`;
7. `Tokens.xml` после завершения всех страниц;
8. внешняя индексация (необязательно).

Pages are independent of each other, so step 6 can run on a rayon pool.
Results are collected in page order before `Tokens.xml` is written, so the
output is identical in both modes.
*/

pub mod assets;
pub mod indexer;
pub mod manifest;
pub mod tokens;

pub use assets::AssetReport;
pub use indexer::{DocsetIndexer, IndexingOutcome};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::configuration::ConverterConfig;
use crate::core::{read_html_file, resolve_path, ValidationError};
use crate::docs_integration::{
    normalize_page_path, parse_page, PageExtractor, PageIndex, PageIndexHarvester, PageRewriter,
    RewriteReport, SymbolToken,
};

/// Пути внутри бандла
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsetLayout {
    pub root: PathBuf,
    pub contents: PathBuf,
    pub resources: PathBuf,
    pub documents: PathBuf,
}

impl DocsetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let contents = root.join("Contents");
        let resources = contents.join("Resources");
        let documents = resources.join("Documents");
        Self {
            root,
            contents,
            resources,
            documents,
        }
    }

    pub fn info_plist(&self) -> PathBuf {
        self.contents.join("Info.plist")
    }

    pub fn nodes_xml(&self) -> PathBuf {
        self.resources.join("Nodes.xml")
    }

    pub fn tokens_xml(&self) -> PathBuf {
        self.resources.join("Tokens.xml")
    }
}

/// Hooks for progress reporting. Called from worker threads in parallel mode.
pub trait BuildObserver: Sync {
    fn phase(&self, _name: &str) {}
    fn pages_started(&self, _total: usize) {}
    fn page_finished(&self, _page: &str, _tokens: usize) {}
    fn pages_finished(&self) {}
}

/// Наблюдатель, который ничего не делает
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// Итоги сборки
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub pages_harvested: usize,
    pub pages_written: usize,
    pub pages_with_tokens: usize,
    pub total_tokens: usize,
    pub anchors_inserted: usize,
    pub anchors_missed: usize,
    /// Pages listed by an index but absent on disk
    pub missing_pages: Vec<String>,
    pub assets: AssetReport,
    pub indexing: IndexingOutcome,
    #[serde(skip)]
    pub duration: Duration,
}

enum PageOutcome {
    Missing,
    Written {
        tokens: Vec<SymbolToken>,
        report: RewriteReport,
    },
}

/// Основной сборщик docset
pub struct DocsetBuilder {
    config: ConverterConfig,
    source: PathBuf,
    layout: DocsetLayout,
    extractor: PageExtractor,
    rewriter: PageRewriter,
}

impl DocsetBuilder {
    /// `output` defaults to `<source>/<bundle.docset_dir_name>`.
    pub fn new(
        config: ConverterConfig,
        source: impl Into<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;
        let source = source.into();
        let root = output.unwrap_or_else(|| source.join(&config.bundle.docset_dir_name));

        // the bundle may live inside the source, never the other way round
        let resolved_source = resolve_path(&source)?;
        if resolved_source.starts_with(resolve_path(&root)?) {
            return Err(ValidationError::ConfigInvalid(format!(
                "output {} would replace the source directory {}",
                root.display(),
                source.display()
            ))
            .into());
        }

        let extractor = PageExtractor::from_config(&config);
        let rewriter = PageRewriter::new(config.rewrite.clone());
        Ok(Self {
            config,
            source,
            layout: DocsetLayout::new(root),
            extractor,
            rewriter,
        })
    }

    pub fn layout(&self) -> &DocsetLayout {
        &self.layout
    }

    /// Проверяет, что исходная папка является справочником AS3
    pub fn validate_source(&self) -> Result<()> {
        let corpus = &self.config.corpus;
        if !self.source.exists() {
            return Err(ValidationError::SourceMissing(self.source.clone()).into());
        }
        if !self.source.is_dir() {
            return Err(ValidationError::NotADirectory(self.source.clone()).into());
        }

        let manifest = self.source.join(&corpus.manifest_file);
        if !manifest.is_file() {
            return Err(ValidationError::MissingRequiredFile(manifest).into());
        }
        let content = read_html_file(&manifest)?;
        if !contains_title(&content, &corpus.manifest_title) {
            return Err(ValidationError::TitleMismatch {
                file: manifest,
                expected: corpus.manifest_title.clone(),
            }
            .into());
        }

        let required_files = corpus
            .index_pages
            .iter()
            .chain(corpus.static_files.iter())
            .chain(std::iter::once(&corpus.package_list));
        for file in required_files {
            let path = self.source.join(file);
            if !path.is_file() {
                return Err(ValidationError::MissingRequiredFile(path).into());
            }
        }
        for dir in &corpus.static_dirs {
            let path = self.source.join(dir);
            if !path.is_dir() {
                return Err(ValidationError::MissingRequiredFile(path).into());
            }
        }

        tracing::debug!("Source {} looks like the AS3 reference", self.source.display());
        Ok(())
    }

    /// Собирает страницы из индексов (без обработки)
    pub fn harvest(&self) -> Result<PageIndex> {
        let harvester = PageIndexHarvester::new(&self.config.corpus.index_row_class)?;
        harvester.harvest_all(&self.source, &self.config.corpus.index_pages)
    }

    /// Извлекает токены одной страницы без записи чего-либо на диск.
    /// The source is validated first, as for a build.
    pub fn inspect_page(&self, page: &str) -> Result<Vec<SymbolToken>> {
        self.validate_source()?;
        let normalized = normalize_page_path(page).ok_or_else(|| {
            ValidationError::ConfigInvalid(format!("{:?} is not a relative page path", page))
        })?;
        let path = self.source.join(&normalized);
        if !path.is_file() {
            return Err(ValidationError::MissingRequiredFile(path).into());
        }

        let document = parse_page(&read_html_file(&path)?);
        let tokens = self
            .extractor
            .extract(&normalized, &document)
            .with_context(|| format!("Failed to extract symbols from {}", normalized))?;
        Ok(tokens)
    }

    pub fn build(&self) -> Result<BuildSummary> {
        self.build_with(&NoopObserver)
    }

    /// Полный цикл сборки
    pub fn build_with(&self, observer: &dyn BuildObserver) -> Result<BuildSummary> {
        let started = Instant::now();

        observer.phase("Validating source");
        self.validate_source()?;

        observer.phase("Preparing bundle");
        self.prepare_output()?;
        manifest::write_info_plist(&self.layout.info_plist(), &self.config.bundle)?;
        manifest::write_nodes_xml(
            &self.layout.nodes_xml(),
            &self.config.bundle.toc_name,
            &self.config.corpus.package_list,
        )?;

        observer.phase("Copying static assets");
        let mut assets =
            assets::copy_static_assets(&self.source, &self.layout.documents, &self.config.corpus)?;
        assets::apply_css_patches(&self.layout.documents, &self.config.css_patches, &mut assets)?;

        observer.phase("Harvesting index pages");
        let mut index = self.harvest()?;
        let pages: Vec<String> = index.paths().map(str::to_string).collect();

        observer.pages_started(pages.len());
        let outcomes = self.process_pages(&pages, observer)?;
        observer.pages_finished();

        let mut summary = BuildSummary {
            output: self.layout.root.clone(),
            pages_harvested: pages.len(),
            pages_written: 0,
            pages_with_tokens: 0,
            total_tokens: 0,
            anchors_inserted: 0,
            anchors_missed: 0,
            missing_pages: Vec::new(),
            assets,
            indexing: IndexingOutcome::Disabled,
            duration: Duration::default(),
        };

        for (page, outcome) in outcomes {
            match outcome {
                PageOutcome::Missing => summary.missing_pages.push(page),
                PageOutcome::Written { tokens, report } => {
                    summary.pages_written += 1;
                    summary.anchors_inserted += report.anchors_inserted;
                    summary.anchors_missed += report.anchors_missing.len();
                    if !tokens.is_empty() {
                        summary.pages_with_tokens += 1;
                        summary.total_tokens += tokens.len();
                        index.populate(&page, tokens);
                    }
                }
            }
        }

        observer.phase("Writing token index");
        tokens::write_tokens_xml(&self.layout.tokens_xml(), &index)?;

        observer.phase("Indexing");
        summary.indexing = indexer::run_indexer(
            &self.config.indexer,
            &self.layout.root,
            &[self.layout.nodes_xml(), self.layout.tokens_xml()],
        )?;

        summary.duration = started.elapsed();
        tracing::info!(
            "Docset written to {}: {} pages, {} tokens",
            self.layout.root.display(),
            summary.pages_written,
            summary.total_tokens
        );
        Ok(summary)
    }

    fn prepare_output(&self) -> Result<()> {
        let root = &self.layout.root;
        if root.exists() {
            tracing::info!("Removing previous bundle {}", root.display());
            fs::remove_dir_all(root)
                .with_context(|| format!("Failed to remove {}", root.display()))?;
        }
        fs::create_dir_all(&self.layout.documents)
            .with_context(|| format!("Failed to create {}", self.layout.documents.display()))
    }

    fn process_pages(
        &self,
        pages: &[String],
        observer: &dyn BuildObserver,
    ) -> Result<Vec<(String, PageOutcome)>> {
        let run = |page: &String| -> Result<(String, PageOutcome)> {
            let outcome = self.process_page(page)?;
            let token_count = match &outcome {
                PageOutcome::Written { tokens, .. } => tokens.len(),
                PageOutcome::Missing => 0,
            };
            observer.page_finished(page, token_count);
            Ok((page.clone(), outcome))
        };

        if self.config.parallel {
            pages.par_iter().map(run).collect()
        } else {
            pages.iter().map(run).collect()
        }
    }

    /// Разбирает страницу один раз: сначала извлечение, затем переписывание
    fn process_page(&self, page: &str) -> Result<PageOutcome> {
        let source = self.source.join(page);
        if !source.is_file() {
            tracing::warn!("{} is listed in the index but does not exist", page);
            return Ok(PageOutcome::Missing);
        }

        let content = read_html_file(&source)?;
        let document = parse_page(&content);

        let tokens = self
            .extractor
            .extract(page, &document)
            .with_context(|| format!("Failed to extract symbols from {}", page))?;

        let report = self
            .rewriter
            .rewrite_to_file(&document, &tokens, &self.layout.documents.join(page))
            .with_context(|| format!("Failed to rewrite {}", page))?;

        for anchor in &report.anchors_missing {
            tracing::debug!("{}: anchor {:?} not found", page, anchor);
        }
        tracing::debug!("{}: {} token(s)", page, tokens.len());

        Ok(PageOutcome::Written { tokens, report })
    }
}

/// Title check over the visible text of the manifest page, whitespace-collapsed.
fn contains_title(html: &str, title: &str) -> bool {
    let document = scraper::Html::parse_document(html);
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text).contains(&collapse_whitespace(title))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lists the pages a build would process.
pub fn list_pages(config: &ConverterConfig, source: &Path) -> Result<Vec<String>> {
    let builder = DocsetBuilder::new(config.clone(), source, None)?;
    builder.validate_source()?;
    let index = builder.harvest()?;
    Ok(index.paths().map(str::to_string).collect())
}
