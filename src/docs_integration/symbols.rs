/*!
# Symbol Classifiers

Превращает найденные узлы в токены `(reference, anchor)`.

A reference string is `<kind code>/<qualified name>`, where the qualified
name is `<page name>.<member>` for members and just the page (or package)
name for page-level tokens. The kind codes are fixed:

| category                                   | code      |
|--------------------------------------------|-----------|
| class                                      | `cl`      |
| interface                                  | `intf`    |
| method, protected method                   | `clm`     |
| property, protected property, style, skin part, skin state, effect | `instp` |
| event                                      | `binding` |
| constant                                   | `clconst` |
| package                                    | `cat`     |
*/

use kuchikikiki::NodeRef;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::predicates::{self, attr_eq, has_class, tag};
use super::tables::{HiddenFlag, MemberFormat};
use crate::core::ExtractionError;

/// Anchor of the constructor section on class pages
pub const CONSTRUCTOR_ANCHOR: &str = "constructorDetail";

/// Класс ячейки с сигнатурой типа
pub const CLASS_SIGNATURE_CLASS: &str = "classSignature";

/// Код типа ссылки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindCode {
    Class,
    Interface,
    Method,
    InstanceProperty,
    Binding,
    Constant,
    Category,
}

impl KindCode {
    pub fn as_str(self) -> &'static str {
        match self {
            KindCode::Class => "cl",
            KindCode::Interface => "intf",
            KindCode::Method => "clm",
            KindCode::InstanceProperty => "instp",
            KindCode::Binding => "binding",
            KindCode::Constant => "clconst",
            KindCode::Category => "cat",
        }
    }
}

impl fmt::Display for KindCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documented symbol as it appears in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolToken {
    pub reference: String,
    /// In-page anchor; `None` when the symbol has no addressable target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl SymbolToken {
    pub fn new(reference: impl Into<String>, anchor: Option<String>) -> Self {
        Self {
            reference: reference.into(),
            anchor: anchor.filter(|a| !a.is_empty()),
        }
    }
}

impl fmt::Display for SymbolToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.anchor {
            Some(anchor) => write!(f, "{} -> #{}", self.reference, anchor),
            None => write!(f, "{}", self.reference),
        }
    }
}

/// Builds reference strings; the prefix is empty unless configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceBuilder {
    prefix: String,
}

impl ReferenceBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn page(&self, kind: KindCode, page_name: &str) -> String {
        format!("{}{}/{}", self.prefix, kind, page_name)
    }

    pub fn member(&self, kind: KindCode, page_name: &str, member: &str) -> String {
        format!("{}{}/{}.{}", self.prefix, kind, page_name, member)
    }
}

/// How a member row exposes its anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberShape {
    /// `<a href="#anchor">name</a>`
    Link,
    /// Label without a link; anchor is `<prefix>:<name>`
    Label { anchor_prefix: String },
}

/// Одна категория членов класса: где искать и как классифицировать
#[derive(Debug, Clone)]
pub struct MemberCategory {
    pub name: &'static str,
    pub table_ids: Vec<String>,
    pub format: MemberFormat,
    pub member_tag: &'static str,
    pub hidden: HiddenFlag,
    pub kind: KindCode,
    pub shape: MemberShape,
}

impl MemberCategory {
    fn new(
        name: &'static str,
        table_ids: &[&str],
        format: MemberFormat,
        hidden: HiddenFlag,
        kind: KindCode,
        shape: MemberShape,
    ) -> Self {
        let member_tag = match shape {
            MemberShape::Link => "a",
            MemberShape::Label { .. } => "span",
        };
        Self {
            name,
            table_ids: table_ids.iter().map(|s| s.to_string()).collect(),
            format,
            member_tag,
            hidden,
            kind,
            shape,
        }
    }
}

fn label(prefix: &str) -> MemberShape {
    MemberShape::Label {
        anchor_prefix: prefix.to_string(),
    }
}

/// Категории членов в порядке, в котором они попадают в индекс
pub static DEFAULT_CATEGORIES: Lazy<Vec<MemberCategory>> = Lazy::new(build_default_categories);

pub fn default_categories() -> Vec<MemberCategory> {
    DEFAULT_CATEGORIES.clone()
}

fn build_default_categories() -> Vec<MemberCategory> {
    use KindCode::*;
    use MemberFormat::*;

    vec![
        MemberCategory::new(
            "property",
            &["summaryTableProperty"],
            One,
            HiddenFlag::single("hideInheritedProperty"),
            InstanceProperty,
            MemberShape::Link,
        ),
        MemberCategory::new(
            "protected property",
            &["summaryTableProtectedProperty"],
            One,
            HiddenFlag::single("hideInheritedProtectedProperty"),
            InstanceProperty,
            MemberShape::Link,
        ),
        MemberCategory::new(
            "method",
            &["summaryTableMethod"],
            Two,
            HiddenFlag::single("hideInheritedMethod"),
            Method,
            MemberShape::Link,
        ),
        MemberCategory::new(
            "protected method",
            &["summaryTableProtectedMethod"],
            Two,
            HiddenFlag::single("hideInheritedProtectedMethod"),
            Method,
            MemberShape::Link,
        ),
        MemberCategory::new(
            "event",
            &["summaryTableEvent"],
            Two,
            HiddenFlag::single("hideInheritedEvent"),
            Binding,
            MemberShape::Link,
        ),
        MemberCategory::new(
            "style",
            &[
                "summaryTablecommonStyle",
                "summaryTablesparkStyle",
                "summaryTablehaloStyle",
            ],
            Two,
            HiddenFlag::any_of(&[
                "hideInheritedcommonStyle",
                "hideInheritedsparkStyle",
                "hideInheritedhaloStyle",
            ]),
            InstanceProperty,
            label("style"),
        ),
        MemberCategory::new(
            "skin part",
            &["summaryTableSkinPart"],
            Two,
            HiddenFlag::single("hideInheritedSkinPart"),
            InstanceProperty,
            label("SkinPart"),
        ),
        MemberCategory::new(
            "skin state",
            &["summaryTableSkinState"],
            Two,
            HiddenFlag::single("hideInheritedSkinState"),
            InstanceProperty,
            label("SkinState"),
        ),
        MemberCategory::new(
            "effect",
            &["summaryTableEffect"],
            Two,
            HiddenFlag::single("hideInheritedEffect"),
            InstanceProperty,
            label("effect"),
        ),
        MemberCategory::new(
            "constant",
            &["summaryTableConstant"],
            One,
            HiddenFlag::single("hideInheritedConstant"),
            Constant,
            MemberShape::Link,
        ),
    ]
}

/// Преобразует узлы в токены.
///
/// Every node must be a `member_tag` element; a different node means the
/// extractor and the classifier disagree about the markup, which is reported
/// instead of skipped. Nodes with empty visible text yield no token.
pub fn to_tokens(
    nodes: &[NodeRef],
    member_tag: &str,
    kind: KindCode,
    page_name: &str,
    shape: &MemberShape,
    references: &ReferenceBuilder,
) -> Result<Vec<SymbolToken>, ExtractionError> {
    let expected = tag(member_tag);
    let mut tokens = Vec::with_capacity(nodes.len());

    for node in nodes {
        if !expected.matches(node) {
            return Err(ExtractionError::unexpected_tag(
                member_tag,
                predicates::describe(node),
            ));
        }

        let name = predicates::visible_text(node);
        if name.is_empty() {
            tracing::debug!("Skipping {} member with empty text on {}", kind, page_name);
            continue;
        }

        let anchor = match shape {
            MemberShape::Link => {
                let href = predicates::attr(node, "href")
                    .ok_or_else(|| ExtractionError::missing_attribute(member_tag, "href"))?;
                href.trim_start_matches('#').to_string()
            }
            MemberShape::Label { anchor_prefix } => format!("{}:{}", anchor_prefix, name),
        };

        tokens.push(SymbolToken::new(
            references.member(kind, page_name, &name),
            Some(anchor),
        ));
    }

    Ok(tokens)
}

/// Определяет, описывает ли страница класс или интерфейс.
///
/// Looks for the type-signature cell and reads the label cell right before
/// it. Pages without that structure (package overviews, operator pages)
/// produce `None`.
pub fn classify_type_signature(
    root: &NodeRef,
    page_name: &str,
    references: &ReferenceBuilder,
) -> Option<SymbolToken> {
    let signature = tag("td").and(has_class(CLASS_SIGNATURE_CLASS)).find_in(root)?;
    let label = predicates::previous_element_sibling(&signature)?;
    let label_text = predicates::visible_text(&label).to_lowercase();

    if label_text.contains("interface") {
        Some(SymbolToken::new(
            references.page(KindCode::Interface, page_name),
            None,
        ))
    } else if label_text.contains("class") {
        let anchor = has_constructor_anchor(root).then(|| CONSTRUCTOR_ANCHOR.to_string());
        Some(SymbolToken::new(
            references.page(KindCode::Class, page_name),
            anchor,
        ))
    } else {
        tracing::debug!(
            "Type signature label {:?} on {} is neither class nor interface",
            label_text,
            page_name
        );
        None
    }
}

fn has_constructor_anchor(root: &NodeRef) -> bool {
    tag("a")
        .and(attr_eq("name", CONSTRUCTOR_ANCHOR))
        .find_in(root)
        .is_some()
}

/// Токен категории для страницы пакета (`cat/flash.display`)
pub fn package_token(package_name: &str, references: &ReferenceBuilder) -> SymbolToken {
    SymbolToken::new(references.page(KindCode::Category, package_name), None)
}
