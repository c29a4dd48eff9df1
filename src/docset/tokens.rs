/*!
# Tokens.xml Writer

```xml
<Tokens version="1.0">
    <File path="flash/display/Sprite.html">
        <Token>
            <TokenIdentifier>clm/Sprite.startDrag</TokenIdentifier>
            <Anchor>startDrag()</Anchor>
        </Token>
    </File>
</Tokens>
```

Pages without tokens get no `File` element. `Anchor` is omitted when the
token has none.
*/

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::path::Path;

use super::manifest::{finish, write_declaration, write_text_element, xml_writer};
use crate::core::write_file;
use crate::docs_integration::PageIndex;

/// Рендерит индекс токенов
pub fn tokens_xml(index: &PageIndex) -> Result<String> {
    let mut writer = xml_writer();
    write_declaration(&mut writer)?;
    writer.write_event(Event::Start(
        BytesStart::new("Tokens").with_attributes([("version", "1.0")]),
    ))?;

    for (path, tokens) in index.non_empty() {
        writer.write_event(Event::Start(
            BytesStart::new("File").with_attributes([("path", path)]),
        ))?;

        for token in tokens.iter().filter(|t| !t.reference.is_empty()) {
            writer.write_event(Event::Start(BytesStart::new("Token")))?;
            write_text_element(&mut writer, "TokenIdentifier", &token.reference)?;
            if let Some(anchor) = &token.anchor {
                write_text_element(&mut writer, "Anchor", anchor)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Token")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("File")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Tokens")))?;
    finish(writer)
}

pub fn write_tokens_xml(path: &Path, index: &PageIndex) -> Result<()> {
    write_file(path, tokens_xml(index)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs_integration::SymbolToken;
    use pretty_assertions::assert_eq;
    use quick_xml::Reader;

    #[derive(Debug, Default, PartialEq)]
    struct FileEntry {
        path: String,
        tokens: Vec<(String, Option<String>)>,
    }

    fn read_back(xml: &str) -> Vec<FileEntry> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut files: Vec<FileEntry> = Vec::new();
        let mut current_element = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    current_element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match current_element.as_str() {
                        "File" => {
                            let path = e
                                .try_get_attribute("path")
                                .unwrap()
                                .unwrap()
                                .unescape_value()
                                .unwrap()
                                .into_owned();
                            files.push(FileEntry {
                                path,
                                tokens: Vec::new(),
                            });
                        }
                        "Token" => files.last_mut().unwrap().tokens.push((String::new(), None)),
                        _ => {}
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape().unwrap().into_owned();
                    let token = files.last_mut().unwrap().tokens.last_mut().unwrap();
                    match current_element.as_str() {
                        "TokenIdentifier" => token.0 = text,
                        "Anchor" => token.1 = Some(text),
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        files
    }

    #[test]
    fn test_only_pages_with_tokens_are_listed() {
        let mut index = PageIndex::default();
        index.seed("Empty.html");
        index.seed("Foo.html");
        index.populate(
            "Foo.html",
            vec![
                SymbolToken::new("cl/Foo", None),
                SymbolToken::new("instp/Foo.bar", Some("bar_prop".to_string())),
            ],
        );

        let xml = tokens_xml(&index).unwrap();
        assert_eq!(
            read_back(&xml),
            vec![FileEntry {
                path: "Foo.html".to_string(),
                tokens: vec![
                    ("cl/Foo".to_string(), None),
                    ("instp/Foo.bar".to_string(), Some("bar_prop".to_string())),
                ],
            }]
        );
        assert!(!xml.contains("Empty.html"));
    }

    #[test]
    fn test_empty_index() {
        let xml = tokens_xml(&PageIndex::default()).unwrap();
        assert!(read_back(&xml).is_empty());
        assert!(xml.contains(r#"<Tokens version="1.0">"#));
    }
}
