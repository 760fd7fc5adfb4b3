//! CSV / TSV encoder
//!
//! Accepts a sequence of sequences (one row each), a sequence of mappings
//! (header row from the first mapping's keys), or a flat sequence of scalars
//! (a single row).

use std::io::Write;

use super::json::to_json;
use super::{CsvPreferences, EncodeError, Encoder};
use crate::node::{CandidateNode, NodeKind};

pub struct CsvEncoder {
    prefs: CsvPreferences,
}

impl CsvEncoder {
    pub fn new(prefs: CsvPreferences) -> Self {
        CsvEncoder { prefs }
    }

    fn format_name(&self) -> &'static str {
        if self.prefs.separator == '\t' {
            "tsv"
        } else {
            "csv"
        }
    }

    fn write_row<'a>(
        &self,
        out: &mut String,
        cells: impl Iterator<Item = Option<&'a CandidateNode>>,
    ) -> Result<(), EncodeError> {
        for (i, cell) in cells.enumerate() {
            if i > 0 {
                out.push(self.prefs.separator);
            }
            if let Some(cell) = cell {
                out.push_str(&self.escape(&self.cell_text(cell)?));
            }
        }
        out.push('\n');
        Ok(())
    }

    fn cell_text(&self, cell: &CandidateNode) -> Result<String, EncodeError> {
        match cell.kind {
            NodeKind::Scalar if cell.is_null() => Ok(String::new()),
            NodeKind::Scalar => Ok(cell.value.clone()),
            // nested collections are written as compact JSON
            _ => Ok(serde_json::to_string(&to_json(cell)?)?),
        }
    }

    fn escape(&self, text: &str) -> String {
        let needs_quotes = text
            .chars()
            .any(|c| c == self.prefs.separator || c == '"' || c == '\n' || c == '\r');
        if needs_quotes {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text.to_string()
        }
    }

    fn unsupported(&self, what: &str) -> EncodeError {
        EncodeError::Unsupported {
            format: self.format_name(),
            what: what.to_string(),
        }
    }
}

impl Encoder for CsvEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        let mut out = String::new();
        match node.kind {
            NodeKind::Scalar => {
                out.push_str(&self.escape(&node.value));
                out.push('\n');
            }
            NodeKind::Sequence => match node.content.first().map(|first| first.kind) {
                None => {}
                Some(NodeKind::Mapping) => {
                    let header: Vec<&CandidateNode> =
                        node.content[0].pairs().map(|(key, _)| key).collect();
                    self.write_row(&mut out, header.iter().map(|key| Some(*key)))?;
                    for row in &node.content {
                        if row.kind != NodeKind::Mapping {
                            return Err(self.unsupported("a mix of mappings and other rows"));
                        }
                        self.write_row(&mut out, header.iter().map(|key| row.get(&key.value)))?;
                    }
                }
                Some(NodeKind::Sequence) => {
                    for row in &node.content {
                        if row.kind != NodeKind::Sequence {
                            return Err(self.unsupported("a mix of sequences and other rows"));
                        }
                        self.write_row(&mut out, row.content.iter().map(Some))?;
                    }
                }
                Some(_) => self.write_row(&mut out, node.content.iter().map(Some))?,
            },
            NodeKind::Mapping => return Err(self.unsupported("a mapping; expected a sequence of rows")),
            NodeKind::Alias => {
                return Err(EncodeError::UnexpectedAlias(self.format_name(), node.value.clone()))
            }
        }
        writer.write_all(out.as_bytes())?;
        Ok(())
    }

    fn print_document_separator(&self, _writer: &mut dyn Write) -> Result<(), EncodeError> {
        Ok(())
    }

    fn print_leading_content(&self, _writer: &mut dyn Write, _content: &str) -> Result<(), EncodeError> {
        Ok(())
    }

    fn can_handle_aliases(&self) -> bool {
        false
    }
}
