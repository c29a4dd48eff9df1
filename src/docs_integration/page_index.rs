/*!
# Page Index Harvester

Собирает множество страниц справочника из алфавитных индексов
(`all-index-A.html` ... `all-index-Symbols.html`).

Every link inside an index row is taken, its fragment dropped and its path
normalized, so `./flash/display/Sprite.html#x` and `flash/display/Sprite.html`
collapse to one key. Target pages are not opened here.
*/

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::path::Path;

use super::symbols::SymbolToken;
use crate::core::{read_html_file, ValidationError};

/// Нормализует относительный путь страницы.
///
/// Drops the fragment and query, resolves `.` and `..` segments and collapses
/// repeated slashes. Returns `None` for external links, script links, empty
/// paths and paths that climb above the corpus root.
/// `normalize_page_path(normalize_page_path(p)) == normalize_page_path(p)`.
pub fn normalize_page_path(href: &str) -> Option<String> {
    let href = href.trim();
    let lowered = href.to_ascii_lowercase();
    if lowered.contains("://")
        || lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || href.starts_with('/')
    {
        return None;
    }

    let path = href.split(['#', '?']).next().unwrap_or_default();
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Harvester for the alphabetic index pages.
pub struct PageIndexHarvester {
    link_selector: Selector,
}

impl PageIndexHarvester {
    /// `index_row_class` is the class carried by the link-bearing index rows
    pub fn new(index_row_class: &str) -> Result<Self> {
        let selector = format!(".{} a[href]", index_row_class);
        let link_selector = Selector::parse(&selector).map_err(|e| {
            ValidationError::ConfigInvalid(format!(
                "invalid index row class {:?}: {:?}",
                index_row_class, e
            ))
        })?;
        Ok(Self { link_selector })
    }

    /// Страницы, на которые ссылается один индекс
    pub fn harvest(&self, index_page_content: &str) -> BTreeSet<String> {
        let document = Html::parse_document(index_page_content);
        document
            .select(&self.link_selector)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| {
                let normalized = normalize_page_path(href);
                if normalized.is_none() {
                    tracing::trace!("Ignoring index link {:?}", href);
                }
                normalized
            })
            .collect()
    }

    /// Объединяет страницы всех индексов корпуса.
    ///
    /// Each index page is required; a missing one is a validation error.
    pub fn harvest_all(&self, source_root: &Path, index_pages: &[String]) -> Result<PageIndex> {
        let mut index = PageIndex::default();

        for index_page in index_pages {
            let path = source_root.join(index_page);
            if !path.is_file() {
                return Err(ValidationError::MissingRequiredFile(path).into());
            }
            let content = read_html_file(&path)
                .with_context(|| format!("Failed to read index page {}", index_page))?;

            let pages = self.harvest(&content);
            tracing::debug!("{}: {} pages", index_page, pages.len());
            for page in pages {
                index.seed(page);
            }
        }

        tracing::info!(
            "Harvested {} pages from {} index pages",
            index.len(),
            index_pages.len()
        );
        Ok(index)
    }
}

/// Page path → tokens, keyed uniquely and iterated in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndex {
    pages: BTreeMap<String, Vec<SymbolToken>>,
}

impl PageIndex {
    /// Добавляет страницу с пустым списком токенов; повтор игнорируется
    pub fn seed(&mut self, page: impl Into<String>) -> bool {
        match self.pages.entry(page.into()) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(Vec::new());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Stores the tokens of a page. Tokens are set once per page; a second
    /// call for the same page is ignored and reported as `false`.
    pub fn populate(&mut self, page: &str, tokens: Vec<SymbolToken>) -> bool {
        match self.pages.get_mut(page) {
            Some(existing) if existing.is_empty() => {
                *existing = tokens;
                true
            }
            Some(_) => {
                tracing::warn!("Tokens for {} were already collected", page);
                false
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Страницы с хотя бы одним токеном (то, что попадает в Tokens.xml)
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &[SymbolToken])> {
        self.pages
            .iter()
            .filter(|(_, tokens)| !tokens.is_empty())
            .map(|(path, tokens)| (path.as_str(), tokens.as_slice()))
    }

    pub fn token_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const INDEX_A: &str = r##"<html><body><table>
        <tr><td class="idxrow" colspan="2"><a href="flash/display/Sprite.html#addChild()">addChild()</a></td></tr>
        <tr><td class="idxrow"><a href="./flash/display/Sprite.html">Sprite</a></td></tr>
        <tr><td class="idxrow"><a href="flash/./display/../display/Shape.html#graphics">graphics</a></td></tr>
        <tr><td class="idxrow"><a href="http://www.adobe.com/x.html">external</a></td></tr>
        <tr><td class="idxrow"><a href="#top">top</a></td></tr>
        <tr><td class="other"><a href="Ignored.html">ignored</a></td></tr>
      </table></body></html>"##;

    const INDEX_B: &str = r##"<table>
        <tr><td class="idxrow"><a href="Array.html#push()">push()</a></td></tr>
        <tr><td class="idxrow"><a href="flash/display/Shape.html">Shape</a></td></tr>
      </table>"##;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_page_path() {
        assert_eq!(normalize_page_path("a/./b/../c.html#x").as_deref(), Some("a/c.html"));
        assert_eq!(normalize_page_path("./Foo.html").as_deref(), Some("Foo.html"));
        assert_eq!(normalize_page_path("a//b.html?q=1").as_deref(), Some("a/b.html"));
        assert_eq!(normalize_page_path("#frag"), None);
        assert_eq!(normalize_page_path("../outside.html"), None);
        assert_eq!(normalize_page_path("https://example.com/a.html"), None);
        assert_eq!(normalize_page_path("javascript:void(0)"), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["./a/./b.html", "a/b/../b.html#f", "x.html", "./././y/z.html"] {
            let once = normalize_page_path(input).unwrap();
            assert_eq!(normalize_page_path(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_harvest_single_index() {
        let harvester = PageIndexHarvester::new("idxrow").unwrap();
        assert_eq!(
            harvester.harvest(INDEX_A),
            set(&["flash/display/Shape.html", "flash/display/Sprite.html"])
        );
    }

    #[test]
    fn test_harvest_is_order_independent_and_idempotent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("all-index-A.html"), INDEX_A).unwrap();
        fs::write(dir.path().join("all-index-B.html"), INDEX_B).unwrap();
        let harvester = PageIndexHarvester::new("idxrow").unwrap();

        let forward = harvester
            .harvest_all(
                dir.path(),
                &["all-index-A.html".to_string(), "all-index-B.html".to_string()],
            )
            .unwrap();
        let backward = harvester
            .harvest_all(
                dir.path(),
                &["all-index-B.html".to_string(), "all-index-A.html".to_string()],
            )
            .unwrap();
        let twice = harvester
            .harvest_all(
                dir.path(),
                &[
                    "all-index-A.html".to_string(),
                    "all-index-B.html".to_string(),
                    "all-index-A.html".to_string(),
                ],
            )
            .unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward, twice);
        assert_eq!(
            forward.paths().collect::<Vec<_>>(),
            vec!["Array.html", "flash/display/Shape.html", "flash/display/Sprite.html"]
        );
    }

    #[test]
    fn test_missing_index_page_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let harvester = PageIndexHarvester::new("idxrow").unwrap();
        let err = harvester
            .harvest_all(dir.path(), &["all-index-A.html".to_string()])
            .unwrap_err();
        assert!(crate::core::is_validation_error(&err));
    }

    #[test]
    fn test_page_index_populate_once() {
        let mut index = PageIndex::default();
        assert!(index.seed("Foo.html"));
        assert!(!index.seed("Foo.html"));
        assert!(index.non_empty().next().is_none());

        let token = SymbolToken::new("cl/Foo", None);
        assert!(index.populate("Foo.html", vec![token.clone()]));
        assert!(!index.populate("Foo.html", vec![token.clone()]));
        assert!(!index.populate("Bar.html", vec![token]));

        assert_eq!(index.token_count(), 1);
        assert_eq!(index.non_empty().count(), 1);
    }
}
