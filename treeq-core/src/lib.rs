//! treeq-core: result printing for structured-data queries
//!
//! This library provides:
//! - A document tree model shared by decoders and encoders
//! - An output format registry with encoders for YAML, JSON, properties,
//!   CSV/TSV, XML, TOML, shell variables and Lua
//! - A results printer that keeps document separators, leading comments and
//!   front matter intact, with an optional NUL-separated mode
//! - Writer providers for a single stream or one file per document

pub mod node;
pub mod format;
pub mod encoder;
pub mod writer;
pub mod explode;
pub mod printer;
pub mod decoder;

pub use node::{tags, CandidateNode, NodeKind, DOC_SEPARATOR_SENTINEL};
pub use format::{describe_available, resolve, FormatError, PrinterOutputFormat, FORMATS};
pub use encoder::{EncodeError, Encoder, Preferences};
pub use writer::{InMemorySink, MultiFileWriter, PrinterWriter, SingleWriter, WriterError};
pub use explode::{AliasExploder, ExplodeError, Exploder};
pub use printer::{PrintError, PrinterState, ResultsPrinter};
pub use decoder::{decode_documents, split_front_matter, DecodeError, FrontMatter};
