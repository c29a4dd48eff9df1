/*!
# Summary Table Extractors

Member summaries in the reference are tables (`summaryTableProperty`,
`summaryTableMethod`, ...). Two row shapes occur:

- [`MemberFormat::One`]: `tr > td > a`. The hidden flag is read from the
  link's grandparent (the row).
- [`MemberFormat::Two`]: `tr > td > div.summarySignature > a`. The flag is
  read one level further up, which again is the row.

Rows flagged with the category's hidden class are inherited members and are
excluded from extraction.
*/

use kuchikikiki::NodeRef;
use std::collections::BTreeSet;

use super::predicates::{self, attr_one_of, has_class, tag, tag_in, Predicate};
use crate::core::ExtractionError;

/// Класс обертки ссылки во втором формате
pub const SIGNATURE_WRAPPER_CLASS: &str = "summarySignature";

/// Маркер унаследованного члена (один класс или любой из набора)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenFlag {
    Single(String),
    AnyOf(BTreeSet<String>),
}

impl HiddenFlag {
    pub fn single(class_name: &str) -> Self {
        HiddenFlag::Single(class_name.to_string())
    }

    pub fn any_of(class_names: &[&str]) -> Self {
        HiddenFlag::AnyOf(class_names.iter().map(|s| s.to_string()).collect())
    }

    /// Предикат «узел помечен этим флагом»
    pub fn predicate(&self) -> Predicate {
        match self {
            HiddenFlag::Single(class_name) => has_class(class_name),
            HiddenFlag::AnyOf(class_names) => predicates::has_any_class(class_names),
        }
    }
}

/// Row shape of a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberFormat {
    One,
    Two,
}

impl MemberFormat {
    /// Structural predicate for the member element (without the hidden check).
    pub fn member_predicate(self, member_tag: &str) -> Predicate {
        let row_cell = tag("td").with_parent(tag("tr"));
        match self {
            MemberFormat::One => tag(member_tag).with_parent(row_cell),
            MemberFormat::Two => tag(member_tag)
                .with_parent(has_class(SIGNATURE_WRAPPER_CLASS).with_parent(row_cell)),
        }
    }

    /// Сколько уровней вверх от ссылки лежит носитель флага
    pub fn flag_depth(self) -> usize {
        match self {
            MemberFormat::One => 2,
            MemberFormat::Two => 3,
        }
    }

    pub fn flag_holder(self, member: &NodeRef) -> Option<NodeRef> {
        predicates::nth_ancestor(member, self.flag_depth())
    }
}

/// Ищет таблицу, id которой входит в `ids`
pub fn find_table(ids: &[String], root: &NodeRef) -> Option<NodeRef> {
    tag("table").and(attr_one_of("id", ids)).find_in(root)
}

fn is_table_like(node: &NodeRef) -> bool {
    tag_in(&["table", "tbody", "thead", "tfoot"]).matches(node)
}

/// Извлекает элементы-члены из таблицы, пропуская помеченные `hidden` строки.
///
/// `table` must be a table-like element; anything else is a structural error
/// because callers are expected to check for the table first.
pub fn extract(
    table: &NodeRef,
    format: MemberFormat,
    member_tag: &str,
    hidden: Option<&HiddenFlag>,
) -> Result<Vec<NodeRef>, ExtractionError> {
    if !is_table_like(table) {
        return Err(ExtractionError::NotATable {
            found: predicates::describe(table),
        });
    }

    let member = format.member_predicate(member_tag);
    let hidden_predicate = hidden.map(HiddenFlag::predicate);

    let members = member
        .select_in(table)
        .into_iter()
        .filter(|node| match (&hidden_predicate, format.flag_holder(node)) {
            (Some(flagged), Some(holder)) => !flagged.matches(&holder),
            _ => true,
        })
        .collect();

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs_integration::predicates::tests::parse;
    use crate::docs_integration::predicates::visible_text;
    use pretty_assertions::assert_eq;

    fn texts(nodes: &[NodeRef]) -> Vec<String> {
        nodes.iter().map(visible_text).collect()
    }

    const FORMAT_ONE: &str = r##"
        <table id="summaryTableProperty" class="summaryTable">
          <tr class=""><td class="summaryTableSignatureCol"><a href="#alpha" class="signatureLink">alpha</a> : Number
            <div class="summaryTableDescription">See <a href="Other.html#x">x</a></div></td></tr>
          <tr class="hideInheritedProperty"><td class="summaryTableSignatureCol"><a href="Base.html#beta">beta</a></td></tr>
          <tr><td class="summaryTableSignatureCol"><a href="#gamma">gamma</a></td></tr>
          <tr class="hideInheritedProperty"><td><a href="Base.html#delta">delta</a></td></tr>
        </table>"##;

    #[test]
    fn test_format_one_excludes_hidden_rows() {
        let doc = parse(FORMAT_ONE);
        let table = find_table(&["summaryTableProperty".to_string()], &doc).unwrap();
        let flag = HiddenFlag::single("hideInheritedProperty");

        let members = extract(&table, MemberFormat::One, "a", Some(&flag)).unwrap();
        // 2 eligible rows, 2 hidden rows: exactly the eligible ones come back
        assert_eq!(texts(&members), vec!["alpha", "gamma"]);

        let all = extract(&table, MemberFormat::One, "a", None).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_format_two_flag_on_row() {
        let doc = parse(
            r##"<table id="summaryTableMethod">
              <tr><td class="summaryTableSignatureCol"><div class="summarySignature"><a href="#run()">run</a>()</div>
                  <div class="summaryTableDescription"><a href="#stop()">stop</a></div></td></tr>
              <tr class="hideInheritedMethod"><td><div class="summarySignature"><a href="Base.html#walk()">walk</a>()</div></td></tr>
            </table>"##,
        );
        let table = find_table(&["summaryTableMethod".to_string()], &doc).unwrap();
        let flag = HiddenFlag::single("hideInheritedMethod");

        let members = extract(&table, MemberFormat::Two, "a", Some(&flag)).unwrap();
        assert_eq!(texts(&members), vec!["run"]);
    }

    #[test]
    fn test_any_of_hidden_flags() {
        let doc = parse(
            r##"<table id="summaryTablesparkStyle">
              <tr><td><div class="summarySignature"><span class="signatureLink">color</span></div></td></tr>
              <tr class="hideInheritedcommonStyle"><td><div class="summarySignature"><span>a</span></div></td></tr>
              <tr class="hideInheritedsparkStyle"><td><div class="summarySignature"><span>b</span></div></td></tr>
              <tr class="hideInheritedhaloStyle"><td><div class="summarySignature"><span>c</span></div></td></tr>
            </table>"##,
        );
        let ids: Vec<String> = ["summaryTablecommonStyle", "summaryTablesparkStyle"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let table = find_table(&ids, &doc).unwrap();
        let flag = HiddenFlag::any_of(&[
            "hideInheritedcommonStyle",
            "hideInheritedsparkStyle",
            "hideInheritedhaloStyle",
        ]);

        let members = extract(&table, MemberFormat::Two, "span", Some(&flag)).unwrap();
        assert_eq!(texts(&members), vec!["color"]);
    }

    #[test]
    fn test_missing_table_is_none() {
        let doc = parse("<div id='summaryTableProperty'></div>");
        assert!(find_table(&["summaryTableProperty".to_string()], &doc).is_none());
    }

    #[test]
    fn test_extract_rejects_non_table() {
        let doc = parse("<div id='x'><a href='#a'>a</a></div>");
        let div = tag("div").find_in(&doc).unwrap();
        let err = extract(&div, MemberFormat::One, "a", None).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NotATable {
                found: "<div>".to_string()
            }
        );
    }
}
