//! Per-format node encoders
//!
//! Every output format implements [`Encoder`]. The printer picks one encoder
//! at startup (through the format registry) and hands it nodes one at a time:
//! - yaml: block YAML, the only encoder that keeps anchors and aliases
//! - json: JSON via serde_json
//! - properties: Java-style `key = value` lines
//! - csv / tsv: delimited rows
//! - xml: XML via quick-xml
//! - toml: TOML via the toml crate
//! - shell: `KEY=value` shell variable assignments
//! - lua: Lua table literals

mod preferences;
mod scalar;
pub mod csv;
pub mod json;
pub mod lua;
pub mod properties;
pub mod shell;
pub mod toml;
pub mod xml;
pub mod yaml;

pub use preferences::{
    CsvPreferences, JsonPreferences, LuaPreferences, Preferences, PropertiesPreferences,
    XmlPreferences, YamlPreferences,
};

use std::io::{self, Write};
use thiserror::Error;

use crate::node::CandidateNode;

/// Errors that can occur while encoding a node
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{format} cannot encode {what}")]
    Unsupported { format: &'static str, what: String },
    #[error("{0} encoder found an unexpanded alias '*{1}'")]
    UnexpectedAlias(&'static str, String),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML encoding failed: {0}")]
    Xml(String),
    #[error("TOML encoding failed: {0}")]
    Toml(#[from] ::toml::ser::Error),
}

/// Serializes single nodes for one output format
pub trait Encoder {
    /// Encode one node to the sink
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError>;

    /// Emit the format's native document separator, if it has one
    fn print_document_separator(&self, writer: &mut dyn Write) -> Result<(), EncodeError>;

    /// Emit free text (comments, front matter) preceding a document
    fn print_leading_content(&self, writer: &mut dyn Write, content: &str)
        -> Result<(), EncodeError>;

    /// Whether anchors and aliases can be represented in the output.
    /// When false, the printer explodes aliases before encoding.
    fn can_handle_aliases(&self) -> bool;
}
