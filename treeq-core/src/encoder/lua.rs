//! Lua encoder
//!
//! Renders each document as a Lua table literal, by default as
//! `return { ... };`.

use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use super::scalar::{classify, Scalar};
use super::{EncodeError, Encoder, LuaPreferences};
use crate::node::{CandidateNode, NodeKind};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

pub struct LuaEncoder {
    prefs: LuaPreferences,
}

impl LuaEncoder {
    pub fn new(prefs: LuaPreferences) -> Self {
        LuaEncoder { prefs }
    }

    fn value(&self, out: &mut String, node: &CandidateNode, depth: usize) -> Result<(), EncodeError> {
        match node.kind {
            NodeKind::Scalar => out.push_str(&scalar(node)),
            NodeKind::Mapping | NodeKind::Sequence if node.content.is_empty() => out.push_str("{}"),
            NodeKind::Mapping => {
                out.push_str("{\n");
                for (key, value) in node.pairs() {
                    out.push_str(&"\t".repeat(depth + 1));
                    out.push_str(&self.key(key));
                    out.push_str(" = ");
                    self.value(out, value, depth + 1)?;
                    out.push_str(",\n");
                }
                out.push_str(&"\t".repeat(depth));
                out.push('}');
            }
            NodeKind::Sequence => {
                out.push_str("{\n");
                for item in &node.content {
                    out.push_str(&"\t".repeat(depth + 1));
                    self.value(out, item, depth + 1)?;
                    out.push_str(",\n");
                }
                out.push_str(&"\t".repeat(depth));
                out.push('}');
            }
            NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("lua", node.value.clone())),
        }
        Ok(())
    }

    fn key(&self, key: &CandidateNode) -> String {
        if self.prefs.unquoted_keys && is_identifier(&key.value) {
            key.value.clone()
        } else {
            format!("[{}]", scalar(key))
        }
    }
}

impl Encoder for LuaEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        let mut out = String::new();
        if self.prefs.globals && node.kind == NodeKind::Mapping {
            for (key, value) in node.pairs() {
                if !is_identifier(&key.value) {
                    return Err(EncodeError::Unsupported {
                        format: "lua",
                        what: format!("global named '{}'", key.value),
                    });
                }
                out.push_str(&key.value);
                out.push_str(" = ");
                self.value(&mut out, value, 0)?;
                out.push_str(";\n");
            }
        } else {
            out.push_str(&self.prefs.doc_prefix);
            self.value(&mut out, node, 0)?;
            out.push_str(&self.prefs.doc_suffix);
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

fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !KEYWORDS.contains(&name)
}

fn scalar(node: &CandidateNode) -> String {
    match classify(node) {
        Scalar::Null => "nil".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) if f.is_nan() => "(0/0)".to_string(),
        Scalar::Float(f) if f.is_infinite() => {
            let huge = if f > 0.0 { "math.huge" } else { "-math.huge" };
            huge.to_string()
        }
        Scalar::Float(_) => node.value.clone(),
        Scalar::Str(s) => quote(s),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
