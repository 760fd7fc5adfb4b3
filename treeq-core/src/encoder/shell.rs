//! Shell variables encoder
//!
//! Flattens a tree into `path_to_key=value` assignments that can be
//! `eval`'d or sourced by a POSIX shell.

use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{EncodeError, Encoder};
use crate::node::{CandidateNode, NodeKind};

static UNSAFE_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());
static SAFE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_./:@%+,-]+$").unwrap());

#[derive(Default)]
pub struct ShellVariablesEncoder;

impl ShellVariablesEncoder {
    pub fn new() -> Self {
        ShellVariablesEncoder
    }

    fn flatten(&self, out: &mut String, path: &str, node: &CandidateNode) -> Result<(), EncodeError> {
        match node.kind {
            NodeKind::Scalar => {
                out.push_str(&variable_name(path));
                out.push('=');
                out.push_str(&quote(&node.value));
                out.push('\n');
            }
            NodeKind::Mapping => {
                for (key, value) in node.pairs() {
                    self.flatten(out, &join(path, &key.value), value)?;
                }
            }
            NodeKind::Sequence => {
                for (i, item) in node.content.iter().enumerate() {
                    self.flatten(out, &join(path, &i.to_string()), item)?;
                }
            }
            NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("shell", node.value.clone())),
        }
        Ok(())
    }
}

impl Encoder for ShellVariablesEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        if node.kind == NodeKind::Scalar {
            return Err(EncodeError::Unsupported {
                format: "shell",
                what: "a scalar without a key".to_string(),
            });
        }
        let mut out = String::new();
        self.flatten(&mut out, "", node)?;
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

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}_{}", path, segment)
    }
}

/// Replace characters a shell won't accept in a variable name
fn variable_name(path: &str) -> String {
    let name = UNSAFE_KEY_CHARS.replace_all(path, "_");
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name.into_owned()
    }
}

fn quote(value: &str) -> String {
    if SAFE_VALUE.is_match(value) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}
