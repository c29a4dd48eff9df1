/*!
# Converter Configuration

Immutable configuration value handed to [`crate::docset::DocsetBuilder`].
The defaults describe the ActionScript 3.0 reference layout; a TOML file can
override any subset of fields (tests use this to substitute reduced
fixture corpora).

```toml
parallel = true

[corpus]
index_pages = ["all-index-A.html"]
static_files = ["style.css"]

[indexer]
enabled = false
```
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::ValidationError;

/// Заголовок справочника, по которому проверяется исходная папка
pub const DEFAULT_MANIFEST_TITLE: &str =
    "ActionScript® 3.0 Reference for the Adobe® Flash® Platform";

/// Полная конфигурация конвертера
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Раскладка исходного корпуса
    pub corpus: CorpusConfig,

    /// Параметры выходного бандла
    pub bundle: BundleConfig,

    /// Параметры переписывания страниц
    pub rewrite: RewriteConfig,

    /// Литеральные замены в скопированных CSS файлах
    pub css_patches: Vec<CssPatch>,

    /// Внешняя утилита индексации
    pub indexer: IndexerConfig,

    /// Обрабатывать страницы параллельно (rayon)
    pub parallel: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            bundle: BundleConfig::default(),
            rewrite: RewriteConfig::default(),
            css_patches: default_css_patches(),
            indexer: IndexerConfig::default(),
            parallel: false,
        }
    }
}

/// Source corpus layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// File whose text must contain `manifest_title`
    pub manifest_file: String,
    pub manifest_title: String,
    /// Alphabetic and symbol index pages used to discover the page set
    pub index_pages: Vec<String>,
    /// Static files copied verbatim into the documents folder
    pub static_files: Vec<String>,
    /// Static directories copied recursively
    pub static_dirs: Vec<String>,
    /// Page the table of contents points at
    pub package_list: String,
    /// Basename of per-package overview pages
    pub package_detail_name: String,
    /// Class marking link-bearing rows of the index pages
    pub index_row_class: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            manifest_file: "index.html".to_string(),
            manifest_title: DEFAULT_MANIFEST_TITLE.to_string(),
            index_pages: default_index_pages(),
            static_files: [
                "package-list.html",
                "class-summary.html",
                "style.css",
                "print.css",
                "override.css",
                "asdoc.js",
                "help.js",
                "cookies.js",
                "AC_RunActiveContent.js",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            static_dirs: vec!["images".to_string()],
            package_list: "package-list.html".to_string(),
            package_detail_name: "package-detail.html".to_string(),
            index_row_class: "idxrow".to_string(),
        }
    }
}

/// `all-index-A.html` .. `all-index-Z.html` plus `all-index-Symbols.html`
pub fn default_index_pages() -> Vec<String> {
    ('A'..='Z')
        .map(|letter| format!("all-index-{}.html", letter))
        .chain(std::iter::once("all-index-Symbols.html".to_string()))
        .collect()
}

/// Output bundle identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub docset_dir_name: String,
    pub identifier: String,
    pub name: String,
    pub platform_family: String,
    /// Name of the single folder entry in Nodes.xml
    pub toc_name: String,
    /// Prepended to every reference string (e.g. `//apple_ref/cpp/`)
    pub reference_prefix: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            docset_dir_name: "as3.docset".to_string(),
            identifier: "as3".to_string(),
            name: "Actionscript 3".to_string(),
            platform_family: "as3".to_string(),
            toc_name: "Package Index".to_string(),
            reference_prefix: String::new(),
        }
    }
}

/// Browser chrome removed from every page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub filter_panel_id: String,
    pub splitter_id: String,
    pub left_nav_id: String,
    pub main_container_id: String,
    pub search_form_id: String,
    /// Container class of the "show/hide inherited" controls
    pub toggle_class: String,
    /// Class tokens with this prefix are dropped from rows and tables
    pub hidden_class_prefix: String,
    /// Strip hidden markers so inherited members render by default
    pub reveal_inherited: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            filter_panel_id: "filter_panel_float".to_string(),
            splitter_id: "splitter".to_string(),
            left_nav_id: "toc".to_string(),
            main_container_id: "maincontainer".to_string(),
            search_form_id: "searchForm".to_string(),
            toggle_class: "showHideLinks".to_string(),
            hidden_class_prefix: "hide".to_string(),
            reveal_inherited: true,
        }
    }
}

/// Literal substring replacement applied to a copied asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssPatch {
    pub file: String,
    pub find: String,
    pub replace: String,
}

/// External indexing utility (docsetutil).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub enabled: bool,
    /// Explicit path; when unset the candidates are probed in order
    pub path: Option<PathBuf>,
    pub candidates: Vec<PathBuf>,
    /// Arguments placed before the bundle root path; the default `["index"]`
    /// gives `docsetutil index <root>` rather than the root alone
    pub args: Vec<String>,
    /// Delete Nodes.xml and Tokens.xml after a successful run
    pub remove_sources: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            candidates: vec![
                PathBuf::from("/Developer/usr/bin/docsetutil"),
                PathBuf::from("/Applications/Xcode.app/Contents/Developer/usr/bin/docsetutil"),
            ],
            args: vec!["index".to_string()],
            remove_sources: true,
        }
    }
}

impl ConverterConfig {
    /// Загружает конфигурацию из TOML файла
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?;
        Ok(config)
    }

    /// Разбирает конфигурацию из строки TOML и проверяет её
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ValidationError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Проверяет внутреннюю согласованность конфигурации
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.corpus.index_pages.is_empty() {
            return Err(ValidationError::ConfigInvalid(
                "corpus.index_pages must list at least one page".to_string(),
            ));
        }
        if self.corpus.manifest_title.trim().is_empty() {
            return Err(ValidationError::ConfigInvalid(
                "corpus.manifest_title must not be empty".to_string(),
            ));
        }
        if self.bundle.docset_dir_name.trim().is_empty() {
            return Err(ValidationError::ConfigInvalid(
                "bundle.docset_dir_name must not be empty".to_string(),
            ));
        }
        if let Some(patch) = self.css_patches.iter().find(|p| p.find.is_empty()) {
            return Err(ValidationError::ConfigInvalid(format!(
                "css patch for {} has an empty `find` string",
                patch.file
            )));
        }
        Ok(())
    }
}

/// The content pane sits below the removed search header; move it to the top.
pub fn default_css_patches() -> Vec<CssPatch> {
    vec![CssPatch {
        file: "style.css".to_string(),
        find: "top:110px".to_string(),
        replace: "top:0px".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_index_pages() {
        let pages = default_index_pages();
        assert_eq!(pages.len(), 27);
        assert_eq!(pages[0], "all-index-A.html");
        assert_eq!(pages[25], "all-index-Z.html");
        assert_eq!(pages[26], "all-index-Symbols.html");
    }

    #[test]
    fn test_default_bundle_constants() {
        let config = ConverterConfig::default();
        assert_eq!(config.bundle.identifier, "as3");
        assert_eq!(config.bundle.name, "Actionscript 3");
        assert_eq!(config.bundle.platform_family, "as3");
        assert!(config.rewrite.reveal_inherited);
        assert!(!config.parallel);
        assert_eq!(config.css_patches, default_css_patches());
    }

    #[test]
    fn test_css_patches_can_be_cleared() {
        let config = ConverterConfig::from_toml_str("css_patches = []\n").unwrap();
        assert!(config.css_patches.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConverterConfig::from_toml_str(
            r#"
            parallel = true

            [corpus]
            index_pages = ["all-index-A.html"]

            [indexer]
            enabled = false
            "#,
        )
        .unwrap();

        assert!(config.parallel);
        assert_eq!(config.corpus.index_pages, vec!["all-index-A.html".to_string()]);
        assert_eq!(config.corpus.manifest_file, "index.html");
        assert!(!config.indexer.enabled);
        assert_eq!(config.indexer.args, vec!["index".to_string()]);
    }

    #[test]
    fn test_empty_index_pages_rejected() {
        let err = ConverterConfig::from_toml_str("[corpus]\nindex_pages = []\n").unwrap_err();
        assert!(crate::core::is_validation_error(&err));
    }

    #[test]
    fn test_css_patches_from_toml() {
        let config = ConverterConfig::from_toml_str(
            r#"
            [[css_patches]]
            file = "style.css"
            find = "top:85px"
            replace = "top:0px"
            "#,
        )
        .unwrap();

        assert_eq!(config.css_patches.len(), 1);
        assert_eq!(config.css_patches[0].find, "top:85px");
    }
}
