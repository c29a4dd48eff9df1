/*!
# Page Rewriter

Очищает страницу справочника для автономного просмотра и добавляет якоря
для оглавления docset-браузера.

Steps, each skipped silently when its target is absent:

1. remove the floating filter panel;
2. remove the splitter;
3. remove the left navigation;
4. clear the inline `style` of the main container (it starts hidden);
5. remove the search form;
6. optionally drop `hide*` class tokens from rows and tables so inherited
   members are visible without scripting;
7. remove the show/hide inherited toggles built from nested blocks, keeping
   lookalikes whose direct children are links;
8. insert `<a name="<reference>">` right after the anchor each token points at.

Step 8 is guarded by an existing-name check: a synthetic anchor is only
inserted when no `<a name>` with the same reference exists yet, so running
the rewrite twice over the same tree (or over already rewritten markup)
inserts nothing new.
*/

use anyhow::{Context, Result};
use kuchikikiki::{Attribute, ElementData, ExpandedName, NodeRef};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::predicates::{self, attr_eq, class_prefix, has_child, has_class, tag, tag_in};
use super::symbols::SymbolToken;
use crate::configuration::RewriteConfig;
use crate::core::write_file;

/// Что было сделано с одной страницей
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Chrome nodes removed (filter panel, splitter, nav, search form)
    pub chrome_removed: usize,
    pub main_container_revealed: bool,
    /// Class tokens dropped from rows and tables
    pub hidden_markers_dropped: usize,
    pub toggles_removed: usize,
    pub anchors_inserted: usize,
    pub anchors_already_present: usize,
    /// Anchors of tokens that could not be located on the page
    pub anchors_missing: Vec<String>,
}

/// Rewrites one parsed page in place.
#[derive(Debug, Clone)]
pub struct PageRewriter {
    config: RewriteConfig,
}

impl PageRewriter {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    /// Применяет все шаги к дереву документа
    pub fn rewrite(&self, document: &NodeRef, tokens: &[SymbolToken]) -> RewriteReport {
        let mut report = RewriteReport::default();

        for id in [
            &self.config.filter_panel_id,
            &self.config.splitter_id,
            &self.config.left_nav_id,
        ] {
            if remove_by_id(document, id) {
                report.chrome_removed += 1;
            }
        }

        report.main_container_revealed =
            clear_inline_style(document, &self.config.main_container_id);

        if remove_by_id(document, &self.config.search_form_id) {
            report.chrome_removed += 1;
        }

        if self.config.reveal_inherited {
            report.hidden_markers_dropped =
                drop_hidden_markers(document, &self.config.hidden_class_prefix);
        }

        report.toggles_removed = remove_inherited_toggles(document, &self.config.toggle_class);

        self.insert_anchors(document, tokens, &mut report);
        report
    }

    /// Переписывает и сериализует страницу в `destination`
    pub fn rewrite_to_file(
        &self,
        document: &NodeRef,
        tokens: &[SymbolToken],
        destination: &Path,
    ) -> Result<RewriteReport> {
        let report = self.rewrite(document, tokens);
        let html = serialize(document)
            .with_context(|| format!("Failed to serialize {}", destination.display()))?;
        write_file(destination, html)?;
        Ok(report)
    }

    fn insert_anchors(&self, document: &NodeRef, tokens: &[SymbolToken], report: &mut RewriteReport) {
        let mut targets: HashMap<String, NodeRef> = HashMap::new();
        let mut existing_names: HashSet<String> = HashSet::new();
        for anchor in tag("a").select_in(document) {
            if let Some(name) = predicates::attr(&anchor, "name") {
                existing_names.insert(name.clone());
                targets.entry(name).or_insert(anchor);
            }
        }

        for token in tokens {
            let Some(anchor) = token.anchor.as_deref() else {
                continue;
            };
            if existing_names.contains(&token.reference) {
                report.anchors_already_present += 1;
                continue;
            }
            let Some((target, element)) = targets
                .get(anchor)
                .and_then(|node| node.as_element().map(|element| (node, element)))
            else {
                tracing::debug!("Anchor {:?} for {} not found", anchor, token.reference);
                report.anchors_missing.push(anchor.to_string());
                continue;
            };

            target.insert_after(new_anchor(element, &token.reference));
            existing_names.insert(token.reference.clone());
            report.anchors_inserted += 1;
        }
    }
}

/// Serializes a document back to HTML.
pub fn serialize(document: &NodeRef) -> Result<String> {
    let mut out = Vec::new();
    document
        .serialize(&mut out)
        .context("Failed to serialize document")?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn find_by_id(document: &NodeRef, id: &str) -> Option<NodeRef> {
    if id.is_empty() {
        return None;
    }
    attr_eq("id", id).find_in(document)
}

fn remove_by_id(document: &NodeRef, id: &str) -> bool {
    match find_by_id(document, id) {
        Some(node) => {
            node.detach();
            true
        }
        None => false,
    }
}

fn clear_inline_style(document: &NodeRef, id: &str) -> bool {
    let Some(container) = find_by_id(document, id) else {
        return false;
    };
    container
        .as_element()
        .map(|element| element.attributes.borrow_mut().remove("style").is_some())
        .unwrap_or(false)
}

/// Drops class tokens starting with `prefix` from `tr` and `table` elements,
/// leaving the remaining classes in place.
fn drop_hidden_markers(document: &NodeRef, prefix: &str) -> usize {
    if prefix.is_empty() {
        return 0;
    }

    let mut dropped = 0;
    let flagged = tag_in(&["tr", "table"]).and(class_prefix(prefix));
    for node in flagged.select_in(document) {
        let Some(element) = node.as_element() else {
            continue;
        };
        let mut attributes = element.attributes.borrow_mut();
        let Some(current) = attributes.get("class").map(str::to_string) else {
            continue;
        };

        let (hidden, kept): (Vec<&str>, Vec<&str>) = current
            .split_whitespace()
            .partition(|class_name| class_name.starts_with(prefix));
        dropped += hidden.len();

        if kept.is_empty() {
            attributes.remove("class");
        } else {
            attributes.insert("class", kept.join(" "));
        }
    }
    dropped
}

/// Removes toggle containers made of nested blocks. A container with a direct
/// `<a>` child is an informational link, not a toggle, and stays.
fn remove_inherited_toggles(document: &NodeRef, toggle_class: &str) -> usize {
    if toggle_class.is_empty() {
        return 0;
    }

    let toggles = has_class(toggle_class).and(has_child(tag("a")).negate());
    let found = toggles.select_in(document);
    let removed = found.len();
    for node in found {
        node.detach();
    }
    removed
}

fn new_anchor(template: &ElementData, name: &str) -> NodeRef {
    NodeRef::new_element(
        template.name.clone(),
        vec![(
            ExpandedName::new("", "name"),
            Attribute {
                prefix: None,
                value: name.to_string(),
            },
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs_integration::predicates::tests::parse;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r##"<html><body>
      <div id="filter_panel_float">filters</div>
      <div id="splitter"></div>
      <div id="toc">nav</div>
      <form id="searchForm"><input name="q"></form>
      <div id="maincontainer" style="display:none">
        <div class="showHideLinks"><div class="hideInheritedProperty"><a href="#p">Hide</a></div><div class="showInheritedProperty"><a href="#p">Show</a></div></div>
        <div class="showHideLinks"><a href="Other.html">See also</a></div>
        <table id="summaryTableProperty" class="summaryTable hideInheritedTable">
          <tr class="hideInheritedProperty owned"><td><a href="Base.html#x">x</a></td></tr>
          <tr class="hideInheritedProperty"><td><a href="Base.html#y">y</a></td></tr>
          <tr><td><a href="#bar_prop">bar</a></td></tr>
        </table>
        <a name="bar_prop"></a><div class="detailHeader">bar</div>
      </div>
    </body></html>"##;

    fn rewriter() -> PageRewriter {
        PageRewriter::new(RewriteConfig::default())
    }

    fn bar_token() -> SymbolToken {
        SymbolToken::new("instp/Foo.bar", Some("bar_prop".to_string()))
    }

    #[test]
    fn test_chrome_is_removed() {
        let doc = parse(PAGE);
        let report = rewriter().rewrite(&doc, &[]);

        assert_eq!(report.chrome_removed, 4);
        assert!(report.main_container_revealed);
        for id in ["filter_panel_float", "splitter", "toc", "searchForm"] {
            assert!(find_by_id(&doc, id).is_none(), "{} should be gone", id);
        }
        let main = find_by_id(&doc, "maincontainer").unwrap();
        assert_eq!(predicates::attr(&main, "style"), None);
    }

    #[test]
    fn test_hidden_markers_dropped_but_other_classes_kept() {
        let doc = parse(PAGE);
        let report = rewriter().rewrite(&doc, &[]);

        assert_eq!(report.hidden_markers_dropped, 3);
        let table = find_by_id(&doc, "summaryTableProperty").unwrap();
        assert_eq!(predicates::attr(&table, "class").as_deref(), Some("summaryTable"));

        let rows = tag("tr").select_in(&doc);
        assert_eq!(predicates::attr(&rows[0], "class").as_deref(), Some("owned"));
        assert_eq!(predicates::attr(&rows[1], "class"), None);
    }

    #[test]
    fn test_keep_hidden_when_disabled() {
        let doc = parse(PAGE);
        let config = RewriteConfig {
            reveal_inherited: false,
            ..RewriteConfig::default()
        };
        let report = PageRewriter::new(config).rewrite(&doc, &[]);
        assert_eq!(report.hidden_markers_dropped, 0);
        assert_eq!(has_class("hideInheritedProperty").select_in(&doc).len(), 2);
    }

    #[test]
    fn test_only_block_toggles_removed() {
        let doc = parse(PAGE);
        let report = rewriter().rewrite(&doc, &[]);

        assert_eq!(report.toggles_removed, 1);
        let remaining = has_class("showHideLinks").select_in(&doc);
        assert_eq!(remaining.len(), 1);
        assert_eq!(predicates::visible_text(&remaining[0]), "See also");
    }

    #[test]
    fn test_anchor_inserted_after_target() {
        let doc = parse(PAGE);
        let report = rewriter().rewrite(&doc, &[bar_token()]);
        assert_eq!(report.anchors_inserted, 1);

        let original = attr_eq("name", "bar_prop").find_in(&doc).unwrap();
        let next = original.next_sibling().unwrap();
        assert_eq!(predicates::element_name(&next).as_deref(), Some("a"));
        assert_eq!(predicates::attr(&next, "name").as_deref(), Some("instp/Foo.bar"));
    }

    #[test]
    fn test_missing_anchor_is_skipped() {
        let doc = parse(PAGE);
        let tokens = vec![
            SymbolToken::new("instp/Foo.nope", Some("nope".to_string())),
            SymbolToken::new("cl/Foo", None),
            bar_token(),
        ];
        let report = rewriter().rewrite(&doc, &tokens);

        assert_eq!(report.anchors_missing, vec!["nope".to_string()]);
        assert_eq!(report.anchors_inserted, 1);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let doc = parse(PAGE);
        rewriter().rewrite(&doc, &[bar_token()]);
        let first = serialize(&doc).unwrap();

        let second_report = rewriter().rewrite(&doc, &[bar_token()]);
        assert_eq!(second_report.chrome_removed, 0);
        assert_eq!(second_report.anchors_inserted, 0);
        assert_eq!(second_report.anchors_already_present, 1);
        assert_eq!(serialize(&doc).unwrap(), first);

        let reparsed = parse(&first);
        let third_report = rewriter().rewrite(&reparsed, &[bar_token()]);
        assert_eq!(third_report.anchors_inserted, 0);
        assert_eq!(attr_eq("name", "instp/Foo.bar").select_in(&reparsed).len(), 1);
    }
}
