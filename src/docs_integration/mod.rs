/*!
# Documentation Integration Module

Извлечение символов из страниц справочника ActionScript 3 и подготовка
страниц к упаковке в docset.

## Основные компоненты

- `predicates` - композируемые предикаты над узлами DOM
- `tables` - извлечение членов из summary-таблиц (два формата строк)
- `symbols` - классификация узлов в токены `(reference, anchor)`
- `page_index` - сбор множества страниц из алфавитных индексов
- `rewriter` - очистка страницы и вставка якорей
- [`PageExtractor`] - фасад, собирающий токены одной страницы

## Использование

```rust,ignore
use as3_docset::docs_integration::{parse_page, PageExtractor, PageRewriter};

let document = parse_page(&html);
let tokens = PageExtractor::default().extract("flash/display/Sprite.html", &document)?;
PageRewriter::new(config.rewrite.clone()).rewrite(&document, &tokens);
```

Extraction only reads the tree, so the same parsed document is handed to
the rewriter afterwards; a page is never parsed twice.
*/

pub mod page_index;
pub mod predicates;
pub mod rewriter;
pub mod symbols;
pub mod tables;

pub use page_index::{normalize_page_path, PageIndex, PageIndexHarvester};
pub use predicates::Predicate;
pub use rewriter::{PageRewriter, RewriteReport};
pub use symbols::{
    default_categories, KindCode, MemberCategory, MemberShape, ReferenceBuilder, SymbolToken,
};
pub use tables::{HiddenFlag, MemberFormat};

use kuchikikiki::traits::*;
use kuchikikiki::NodeRef;
use std::path::Path;

use crate::configuration::ConverterConfig;
use crate::core::ExtractionError;

/// Имя корневого пакета в справочнике
pub const TOP_LEVEL_PACKAGE: &str = "Top Level";

/// Parses an HTML page into a mutable DOM.
pub fn parse_page(html: &str) -> NodeRef {
    kuchikikiki::parse_html().one(html)
}

/// Имя страницы для ссылок: имя файла без расширения
pub fn page_name(page_path: &str) -> String {
    Path::new(page_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| page_path.to_string())
}

/// Dotted package of a page: its directory with `/` replaced by `.`.
/// Pages at the corpus root belong to the top-level package.
pub fn package_name(page_path: &str) -> String {
    match page_path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.replace('/', "."),
        _ => TOP_LEVEL_PACKAGE.to_string(),
    }
}

/// Собирает токены одной страницы
#[derive(Debug, Clone)]
pub struct PageExtractor {
    categories: Vec<MemberCategory>,
    references: ReferenceBuilder,
    package_detail_name: String,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl PageExtractor {
    pub fn new(
        categories: Vec<MemberCategory>,
        references: ReferenceBuilder,
        package_detail_name: impl Into<String>,
    ) -> Self {
        Self {
            categories,
            references,
            package_detail_name: package_detail_name.into(),
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            default_categories(),
            ReferenceBuilder::new(config.bundle.reference_prefix.clone()),
            config.corpus.package_detail_name.clone(),
        )
    }

    pub fn categories(&self) -> &[MemberCategory] {
        &self.categories
    }

    fn is_package_page(&self, page_path: &str) -> bool {
        Path::new(page_path)
            .file_name()
            .is_some_and(|name| name.to_string_lossy() == self.package_detail_name)
    }

    /// Извлекает токены страницы.
    ///
    /// Package overview pages yield a single `cat` token. Any other page
    /// yields its type-signature token (if it has one) followed by the
    /// members of every category in order. Absent tables contribute nothing;
    /// a table whose rows do not have the expected shape is an error.
    pub fn extract(
        &self,
        page_path: &str,
        document: &NodeRef,
    ) -> Result<Vec<SymbolToken>, ExtractionError> {
        if self.is_package_page(page_path) {
            let package = package_name(page_path);
            return Ok(vec![symbols::package_token(&package, &self.references)]);
        }

        let name = page_name(page_path);
        let mut tokens = Vec::new();

        if let Some(signature) = symbols::classify_type_signature(document, &name, &self.references)
        {
            tokens.push(signature);
        }

        for category in &self.categories {
            let Some(table) = tables::find_table(&category.table_ids, document) else {
                continue;
            };

            let nodes = tables::extract(
                &table,
                category.format,
                category.member_tag,
                Some(&category.hidden),
            )?;
            let found = symbols::to_tokens(
                &nodes,
                category.member_tag,
                category.kind,
                &name,
                &category.shape,
                &self.references,
            )?;

            tracing::debug!("{}: {} {} token(s)", page_path, found.len(), category.name);
            tokens.extend(found);
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SPRITE: &str = r##"<html><body>
      <table class="classHeaderTable">
        <tr><td class="classHeaderTableLabel">Package</td><td>flash.display</td></tr>
        <tr><td class="classHeaderTableLabel">Class</td><td class="classSignature">public class Sprite</td></tr>
      </table>
      <table id="summaryTableProperty" class="summaryTable hideInheritedProperty">
        <tr><td class="summaryTableSignatureCol"><a href="#buttonMode" class="signatureLink">buttonMode</a> : Boolean</td></tr>
        <tr class="hideInheritedProperty"><td class="summaryTableSignatureCol"><a href="DisplayObject.html#alpha">alpha</a></td></tr>
      </table>
      <table id="summaryTableMethod">
        <tr><td class="summaryTableSignatureCol"><div class="summarySignature"><a href="#Sprite()" class="signatureLink">Sprite</a>()</div></td></tr>
        <tr><td class="summaryTableSignatureCol"><div class="summarySignature"><a href="#startDrag()" class="signatureLink">startDrag</a>(lockCenter)</div>
          <div class="summaryTableDescription">See <a href="#stopDrag()">stopDrag</a></div></td></tr>
      </table>
      <table id="summaryTablecommonStyle">
        <tr><td><div class="summarySignature"><span class="signatureLink">focusColor</span></div></td></tr>
      </table>
      <table id="summaryTableEvent">
        <tr><td><div class="summarySignature"><a href="#event:added" class="signatureLink">added</a></div></td></tr>
      </table>
      <table id="summaryTableConstant">
        <tr><td><a href="#MAX" class="signatureLink">MAX</a></td></tr>
      </table>
      <a name="constructorDetail"></a>
    </body></html>"##;

    #[test]
    fn test_page_and_package_names() {
        assert_eq!(page_name("flash/display/Sprite.html"), "Sprite");
        assert_eq!(page_name("Array.html"), "Array");
        assert_eq!(package_name("flash/display/package-detail.html"), "flash.display");
        assert_eq!(package_name("package-detail.html"), TOP_LEVEL_PACKAGE);
    }

    #[test]
    fn test_class_page_tokens_in_order() {
        let document = parse_page(SPRITE);
        let tokens = PageExtractor::default()
            .extract("flash/display/Sprite.html", &document)
            .unwrap();

        let references: Vec<&str> = tokens.iter().map(|t| t.reference.as_str()).collect();
        assert_eq!(
            references,
            vec![
                "cl/Sprite",
                "instp/Sprite.buttonMode",
                "clm/Sprite.Sprite",
                "clm/Sprite.startDrag",
                "binding/Sprite.added",
                "instp/Sprite.focusColor",
                "clconst/Sprite.MAX",
            ]
        );
        assert_eq!(tokens[0].anchor.as_deref(), Some("constructorDetail"));
        assert_eq!(tokens[4].anchor.as_deref(), Some("event:added"));
        assert_eq!(tokens[5].anchor.as_deref(), Some("style:focusColor"));
    }

    #[test]
    fn test_package_page_yields_category_token() {
        let document = parse_page(SPRITE);
        let tokens = PageExtractor::default()
            .extract("flash/display/package-detail.html", &document)
            .unwrap();
        assert_eq!(tokens, vec![SymbolToken::new("cat/flash.display", None)]);
    }

    #[test]
    fn test_page_without_tables_yields_nothing() {
        let document = parse_page("<html><body><h1>Operators</h1></body></html>");
        let tokens = PageExtractor::default()
            .extract("operators.html", &document)
            .unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_reference_prefix_from_config() {
        let mut config = ConverterConfig::default();
        config.bundle.reference_prefix = "//apple_ref/cpp/".to_string();
        let document = parse_page(SPRITE);

        let tokens = PageExtractor::from_config(&config)
            .extract("flash/display/Sprite.html", &document)
            .unwrap();
        assert_eq!(tokens[0].reference, "//apple_ref/cpp/cl/Sprite");
    }

    #[test]
    fn test_malformed_member_row_is_error() {
        let categories = vec![MemberCategory {
            name: "property",
            table_ids: vec!["summaryTableProperty".to_string()],
            format: MemberFormat::One,
            member_tag: "a",
            hidden: HiddenFlag::single("hideInheritedProperty"),
            kind: KindCode::InstanceProperty,
            shape: MemberShape::Link,
        }];
        let extractor = PageExtractor::new(categories, ReferenceBuilder::default(), "package-detail.html");
        let document = parse_page(
            r##"<table id="summaryTableProperty"><tr><td><a name="bar">bar</a></td></tr></table>"##,
        );

        let err = extractor.extract("Foo.html", &document).unwrap_err();
        assert_eq!(err, ExtractionError::missing_attribute("a", "href"));
    }
}
