//! Java properties encoder
//!
//! Flattens a tree into `path.to.key = value` lines. Sequence indices become
//! path segments (`list.0`) or brackets (`list[0]`).

use std::io::Write;

use super::{EncodeError, Encoder, PropertiesPreferences};
use crate::node::{CandidateNode, NodeKind};

pub struct PropertiesEncoder {
    prefs: PropertiesPreferences,
}

impl PropertiesEncoder {
    pub fn new(prefs: PropertiesPreferences) -> Self {
        PropertiesEncoder { prefs }
    }

    fn flatten(&self, out: &mut String, path: &str, node: &CandidateNode) -> Result<(), EncodeError> {
        match node.kind {
            NodeKind::Scalar => {
                for line in node.head_comment.lines() {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str(path);
                out.push_str(&self.prefs.key_value_separator);
                out.push_str(&escape_value(&node.value));
                out.push('\n');
            }
            NodeKind::Mapping => {
                for (key, value) in node.pairs() {
                    let child = join(path, &escape_key(&key.value));
                    for line in key.head_comment.lines() {
                        out.push_str(line);
                        out.push('\n');
                    }
                    self.flatten(out, &child, value)?;
                }
            }
            NodeKind::Sequence => {
                for (i, item) in node.content.iter().enumerate() {
                    let child = if self.prefs.use_array_brackets {
                        format!("{}[{}]", path, i)
                    } else {
                        join(path, &i.to_string())
                    };
                    self.flatten(out, &child, item)?;
                }
            }
            NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("props", node.value.clone())),
        }
        Ok(())
    }
}

impl Encoder for PropertiesEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        let mut out = String::new();
        if node.kind == NodeKind::Scalar {
            // a lone scalar has no key to print
            out.push_str(&node.value);
            out.push('\n');
        } else {
            self.flatten(&mut out, "", node)?;
        }
        writer.write_all(out.as_bytes())?;
        Ok(())
    }

    fn print_document_separator(&self, _writer: &mut dyn Write) -> Result<(), EncodeError> {
        Ok(())
    }

    fn print_leading_content(&self, writer: &mut dyn Write, content: &str) -> Result<(), EncodeError> {
        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') || trimmed.starts_with('!') {
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn can_handle_aliases(&self) -> bool {
        false
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            ' ' | ':' | '=' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
