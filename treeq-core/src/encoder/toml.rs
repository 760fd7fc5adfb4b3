//! TOML encoder

use std::io::Write;

use ::toml::{Table, Value};

use super::scalar::{classify, Scalar};
use super::{EncodeError, Encoder};
use crate::node::{CandidateNode, NodeKind};

#[derive(Default)]
pub struct TomlEncoder;

impl TomlEncoder {
    pub fn new() -> Self {
        TomlEncoder
    }
}

fn unsupported(what: impl Into<String>) -> EncodeError {
    EncodeError::Unsupported {
        format: "toml",
        what: what.into(),
    }
}

fn to_toml(node: &CandidateNode) -> Result<Value, EncodeError> {
    Ok(match node.kind {
        NodeKind::Scalar => match classify(node) {
            Scalar::Null => return Err(unsupported("null values")),
            Scalar::Bool(b) => Value::Boolean(b),
            Scalar::Int(i) => Value::Integer(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Str(s) => Value::String(s.to_string()),
        },
        NodeKind::Mapping => Value::Table(to_table(node)?),
        NodeKind::Sequence => Value::Array(node.content.iter().map(to_toml).collect::<Result<_, _>>()?),
        NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("toml", node.value.clone())),
    })
}

fn to_table(node: &CandidateNode) -> Result<Table, EncodeError> {
    let mut table = Table::new();
    for (key, value) in node.pairs() {
        table.insert(key.value.clone(), to_toml(value)?);
    }
    Ok(table)
}

impl Encoder for TomlEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        match node.kind {
            NodeKind::Scalar => {
                writer.write_all(node.value.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            NodeKind::Mapping => {
                let rendered = ::toml::to_string(&to_table(node)?)?;
                writer.write_all(rendered.as_bytes())?;
            }
            NodeKind::Sequence => return Err(unsupported("a sequence at the document root")),
            NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("toml", node.value.clone())),
        }
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
