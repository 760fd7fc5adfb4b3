//! Matched tree nodes
//!
//! A `CandidateNode` is one node of a decoded document tree, tagged with the
//! document and source file it came from. Query evaluation produces ordered
//! sequences of these; the printer only reads them.

use std::rc::Rc;
use strum_macros::{Display, EnumString};

/// Leading-content prefix meaning "this node already carries its own
/// document separator". Decoders write it where the input had an explicit
/// `---` line.
pub const DOC_SEPARATOR_SENTINEL: &str = "$yqDocSeparator$";

/// Standard YAML core-schema tags
pub mod tags {
    pub const NULL: &str = "!!null";
    pub const BOOL: &str = "!!bool";
    pub const INT: &str = "!!int";
    pub const FLOAT: &str = "!!float";
    pub const STR: &str = "!!str";
    pub const MAP: &str = "!!map";
    pub const SEQ: &str = "!!seq";
    pub const MERGE: &str = "!!merge";
}

/// Structural kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Scalar,
    Mapping,
    Sequence,
    Alias,
}

/// A single node produced by decoding or query evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateNode {
    pub kind: NodeKind,
    /// Type tag, e.g. `!!str` or a custom `!thing`
    pub tag: String,
    /// Scalar text; the anchor name for aliases
    pub value: String,
    /// Anchor defined on this node (`&name`)
    pub anchor: Option<String>,
    /// Target of an alias node (`*name`)
    pub alias: Option<Rc<CandidateNode>>,
    /// Children. Mappings store alternating key and value nodes.
    pub content: Vec<CandidateNode>,
    /// Comment lines printed above the node, including their `#`
    pub head_comment: String,
    /// Trailing comment on the node's line, including its `#`
    pub line_comment: String,
    /// Free text preceding the document (comments, front matter, separators)
    pub leading_content: String,
    /// Index of the document within its source file
    pub document: usize,
    /// Index of the source file
    pub file_index: usize,
    /// Source file name, `-` for stdin
    pub filename: String,
}

impl CandidateNode {
    fn with_kind(kind: NodeKind, tag: &str, value: String) -> Self {
        CandidateNode {
            kind,
            tag: tag.to_string(),
            value,
            anchor: None,
            alias: None,
            content: Vec::new(),
            head_comment: String::new(),
            line_comment: String::new(),
            leading_content: String::new(),
            document: 0,
            file_index: 0,
            filename: String::new(),
        }
    }

    /// Create a scalar with an explicit tag
    pub fn scalar(tag: &str, value: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Scalar, tag, value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(tags::STR, value)
    }

    pub fn null() -> Self {
        Self::scalar(tags::NULL, "null")
    }

    pub fn boolean(value: bool) -> Self {
        Self::scalar(tags::BOOL, value.to_string())
    }

    pub fn int(value: i64) -> Self {
        Self::scalar(tags::INT, value.to_string())
    }

    /// Create a mapping from key/value pairs, preserving their order
    pub fn mapping(pairs: Vec<(CandidateNode, CandidateNode)>) -> Self {
        let mut node = Self::with_kind(NodeKind::Mapping, tags::MAP, String::new());
        node.content = pairs.into_iter().flat_map(|(k, v)| [k, v]).collect();
        node
    }

    pub fn sequence(items: Vec<CandidateNode>) -> Self {
        let mut node = Self::with_kind(NodeKind::Sequence, tags::SEQ, String::new());
        node.content = items;
        node
    }

    /// Create an alias (`*name`) pointing at an anchored node
    pub fn alias(name: impl Into<String>, target: Rc<CandidateNode>) -> Self {
        let mut node = Self::with_kind(NodeKind::Alias, "", name.into());
        node.alias = Some(target);
        node
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_document(mut self, document: usize) -> Self {
        self.document = document;
        self
    }

    pub fn with_file_index(mut self, file_index: usize) -> Self {
        self.file_index = file_index;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_leading_content(mut self, content: impl Into<String>) -> Self {
        self.leading_content = content.into();
        self
    }

    pub fn with_head_comment(mut self, comment: impl Into<String>) -> Self {
        self.head_comment = comment.into();
        self
    }

    pub fn with_line_comment(mut self, comment: impl Into<String>) -> Self {
        self.line_comment = comment.into();
        self
    }

    pub fn document(&self) -> usize {
        self.document
    }

    pub fn file_index(&self) -> usize {
        self.file_index
    }

    pub fn is_null(&self) -> bool {
        self.tag == tags::NULL
    }

    /// Whether printing this node counts as real output.
    /// Nulls and boolean `false` do not.
    pub fn counts_as_output(&self) -> bool {
        !self.is_null() && (self.tag != tags::BOOL || self.value != "false")
    }

    /// Whether the leading content already represents a document separator
    pub fn starts_with_separator(&self) -> bool {
        self.leading_content.starts_with(DOC_SEPARATOR_SENTINEL)
    }

    /// Whether this is a YAML merge key (`<<`)
    pub fn is_merge_key(&self) -> bool {
        self.kind == NodeKind::Scalar && (self.tag == tags::MERGE || self.value == "<<")
    }

    /// Key/value pairs of a mapping. Empty for other kinds.
    pub fn pairs(&self) -> impl Iterator<Item = (&CandidateNode, &CandidateNode)> {
        let content: &[CandidateNode] = if self.kind == NodeKind::Mapping {
            &self.content
        } else {
            &[]
        };
        content.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Look up a mapping value by scalar key
    pub fn get(&self, key: &str) -> Option<&CandidateNode> {
        self.pairs().find(|(k, _)| k.value == key).map(|(_, v)| v)
    }
}
