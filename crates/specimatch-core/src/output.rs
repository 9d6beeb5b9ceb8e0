//! Report output for evaluation records.
//!
//! JSON Lines streams one record per line as the sweep progresses. JSON
//! collects records and writes a single array on `finish`.

use serde::Serialize;
use std::io::{self, Write};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes serializable records in the chosen format.
pub struct ReportWriter<W: Write, T: Serialize> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<T>,
    items_written: usize,
}

impl<W: Write, T: Serialize> ReportWriter<W, T> {
    /// `pretty` only affects the JSON array format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            items_written: 0,
        }
    }

    /// Add one record. JSONL writes and flushes it immediately.
    pub fn push(&mut self, item: T) -> io::Result<()> {
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()?;
                self.items_written += 1;
            }
            OutputFormat::Json => self.pending.push(item),
        }
        Ok(())
    }

    /// Write anything still buffered and flush. Returns the record count.
    pub fn finish(mut self) -> io::Result<usize> {
        if self.format == OutputFormat::Json {
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &self.pending).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
            self.items_written += self.pending.len();
        }
        self.writer.flush()?;
        Ok(self.items_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row {
        query_image: String,
        is_match: Option<bool>,
    }

    fn row(name: &str, is_match: Option<bool>) -> Row {
        Row {
            query_image: name.to_string(),
            is_match,
        }
    }

    #[test]
    fn test_jsonl_streams_lines() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.push(row("a.jpg", Some(true))).unwrap();
        writer.push(row("b.jpg", None)).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"{"query_image":"b.jpg","is_match":null}"#);
    }

    #[test]
    fn test_json_writes_array_on_finish() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.push(row("a.jpg", Some(false))).unwrap();
        writer.push(row("b.jpg", Some(true))).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["is_match"], false);
    }

    #[test]
    fn test_json_empty_report_is_empty_array() {
        let mut buffer = Vec::new();
        let writer: ReportWriter<_, Row> = ReportWriter::new(&mut buffer, OutputFormat::Json, false);
        assert_eq!(writer.finish().unwrap(), 0);
        assert_eq!(String::from_utf8(buffer).unwrap().trim(), "[]");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("csv"), None);
    }
}
