//! Манифест бандла (`Info.plist`) и оглавление (`Nodes.xml`)

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::Path;

use crate::configuration::BundleConfig;
use crate::core::write_file;

const PLIST_DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

pub(crate) fn xml_writer() -> Writer<Vec<u8>> {
    Writer::new_with_indent(Vec::new(), b' ', 4)
}

pub(crate) fn write_declaration<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(())
}

/// `<name>text</name>`
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).context("Generated XML is not valid UTF-8")
}

/// Рендерит `Info.plist` с идентификатором, именем и семейством платформы
pub fn info_plist(bundle: &BundleConfig) -> Result<String> {
    let mut writer = xml_writer();
    write_declaration(&mut writer)?;
    writer.write_event(Event::DocType(BytesText::from_escaped(PLIST_DOCTYPE)))?;
    writer.write_event(Event::Start(
        BytesStart::new("plist").with_attributes([("version", "1.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("dict")))?;

    for (key, value) in [
        ("CFBundleIdentifier", bundle.identifier.as_str()),
        ("CFBundleName", bundle.name.as_str()),
        ("DocSetPlatformFamily", bundle.platform_family.as_str()),
    ] {
        write_text_element(&mut writer, "key", key)?;
        write_text_element(&mut writer, "string", value)?;
    }

    writer.write_event(Event::End(BytesEnd::new("dict")))?;
    writer.write_event(Event::End(BytesEnd::new("plist")))?;
    finish(writer)
}

/// Renders `Nodes.xml`: a single folder node pointing at the package list.
pub fn nodes_xml(toc_name: &str, package_list: &str) -> Result<String> {
    let mut writer = xml_writer();
    write_declaration(&mut writer)?;
    writer.write_event(Event::Start(
        BytesStart::new("DocSetNodes").with_attributes([("version", "1.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("TOC")))?;
    writer.write_event(Event::Start(
        BytesStart::new("Node").with_attributes([("type", "folder")]),
    ))?;
    write_text_element(&mut writer, "Name", toc_name)?;
    write_text_element(&mut writer, "Path", package_list)?;
    writer.write_event(Event::End(BytesEnd::new("Node")))?;
    writer.write_event(Event::End(BytesEnd::new("TOC")))?;
    writer.write_event(Event::End(BytesEnd::new("DocSetNodes")))?;
    finish(writer)
}

pub fn write_info_plist(path: &Path, bundle: &BundleConfig) -> Result<()> {
    write_file(path, info_plist(bundle)?)
}

pub fn write_nodes_xml(path: &Path, toc_name: &str, package_list: &str) -> Result<()> {
    write_file(path, nodes_xml(toc_name, package_list)?)
}
