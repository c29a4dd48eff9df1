//! Модуль для форматирования и вывода результатов

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

/// Формат вывода результатов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Unknown output format: {}", s)),
        }
    }
}

/// Writer для вывода результатов
pub struct OutputWriter {
    writer: Box<dyn Write>,
    format: OutputFormat,
}

impl OutputWriter {
    /// Создает writer для stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }

    pub fn new(writer: Box<dyn Write>, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Записывает сериализуемый объект как JSON
    pub fn write_object<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(obj)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Записывает строку
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    /// Записывает заголовок
    pub fn write_header(&mut self, header: &str) -> Result<()> {
        writeln!(self.writer, "\n{}", header.bold().blue())?;
        writeln!(self.writer, "{}", "=".repeat(header.chars().count()).blue())?;
        Ok(())
    }

    /// Записывает таблицу
    pub fn write_table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        for (i, header) in headers.iter().enumerate() {
            if i > 0 {
                write!(self.writer, " │ ")?;
            }
            write!(self.writer, "{:width$}", header, width = widths[i])?;
        }
        writeln!(self.writer)?;

        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                write!(self.writer, "─┼─")?;
            }
            write!(self.writer, "{}", "─".repeat(*width))?;
        }
        writeln!(self.writer)?;

        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(self.writer, " │ ")?;
                }
                let width = widths.get(i).copied().unwrap_or(0);
                write!(self.writer, "{:width$}", cell, width = width)?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    /// Завершает запись и сбрасывает буфер
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Буфер, доступный после передачи writer'у
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_object_as_json() {
        let buffer = SharedBuffer::default();
        let mut writer = OutputWriter::new(Box::new(buffer.clone()), OutputFormat::Json);
        writer
            .write_object(&serde_json::json!({ "reference": "cl/Foo" }))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(value["reference"], "cl/Foo");
    }

    #[test]
    fn test_write_table_aligns_columns() {
        let buffer = SharedBuffer::default();
        let mut writer = OutputWriter::new(Box::new(buffer.clone()), OutputFormat::Text);
        writer
            .write_table(
                &["reference", "anchor"],
                &[vec!["cl/Foo".to_string(), String::new()]],
            )
            .unwrap();

        let text = buffer.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "reference │ anchor");
        assert_eq!(lines[2], "cl/Foo    │       ");
    }
}
