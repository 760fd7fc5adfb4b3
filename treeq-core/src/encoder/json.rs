//! JSON encoder

use std::io::Write;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::scalar::{classify, Scalar};
use super::{EncodeError, Encoder, JsonPreferences};
use crate::node::{CandidateNode, NodeKind};

pub struct JsonEncoder {
    prefs: JsonPreferences,
}

impl JsonEncoder {
    pub fn new(prefs: JsonPreferences) -> Self {
        JsonEncoder { prefs }
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        let value = to_json(node)?;

        if self.prefs.unwrap_scalar {
            if let Value::String(s) = &value {
                writer.write_all(s.as_bytes())?;
                writer.write_all(b"\n")?;
                return Ok(());
            }
        }

        if self.prefs.indent == 0 {
            serde_json::to_writer(&mut *writer, &value)?;
        } else {
            let indent = " ".repeat(self.prefs.indent);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
            value.serialize(&mut serializer)?;
        }
        writer.write_all(b"\n")?;
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

/// Convert a node tree to a JSON value, keeping mapping order
pub(crate) fn to_json(node: &CandidateNode) -> Result<Value, EncodeError> {
    Ok(match node.kind {
        NodeKind::Scalar => match classify(node) {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Int(i) => Value::Number(i.into()),
            Scalar::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(node.value.clone())),
            Scalar::Str(s) => Value::String(s.to_string()),
        },
        NodeKind::Mapping => {
            let mut map = Map::new();
            for (key, value) in node.pairs() {
                map.insert(key.value.clone(), to_json(value)?);
            }
            Value::Object(map)
        }
        NodeKind::Sequence => Value::Array(node.content.iter().map(to_json).collect::<Result<_, _>>()?),
        NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("json", node.value.clone())),
    })
}
