//! Alias explosion
//!
//! Encoders that cannot represent anchors and aliases get a rewritten copy of
//! the match sequence: aliases are replaced by deep copies of their targets,
//! anchors are dropped and `<<` merge keys are expanded in place.

use std::collections::HashSet;

use thiserror::Error;
use tracing::trace;

use crate::node::{CandidateNode, NodeKind};

/// Alias chains longer than this are treated as cycles
pub const MAX_ALIAS_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplodeError {
    #[error("alias '*{0}' does not refer to any anchor")]
    UnresolvedAlias(String),
    #[error("aliases nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("merge key '<<' must refer to a mapping or a sequence of mappings")]
    InvalidMerge,
}

/// Rewrites a match sequence so it contains no aliases
pub trait AliasExploder {
    fn explode(&self, nodes: Vec<CandidateNode>) -> Result<Vec<CandidateNode>, ExplodeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Exploder;

impl Exploder {
    pub fn new() -> Self {
        Exploder
    }

    /// Explode a single node. `depth` counts aliases followed so far.
    pub fn explode_node(&self, node: &CandidateNode, depth: usize) -> Result<CandidateNode, ExplodeError> {
        match node.kind {
            NodeKind::Alias => {
                if depth >= MAX_ALIAS_DEPTH {
                    return Err(ExplodeError::TooDeep(MAX_ALIAS_DEPTH));
                }
                let target = node
                    .alias
                    .as_ref()
                    .ok_or_else(|| ExplodeError::UnresolvedAlias(node.value.clone()))?;
                trace!(alias = %node.value, "expanding alias");
                let mut copy = self.explode_node(target, depth + 1)?;
                copy.document = node.document;
                copy.file_index = node.file_index;
                copy.filename = node.filename.clone();
                copy.leading_content = node.leading_content.clone();
                if !node.head_comment.is_empty() {
                    copy.head_comment = node.head_comment.clone();
                }
                if !node.line_comment.is_empty() {
                    copy.line_comment = node.line_comment.clone();
                }
                Ok(copy)
            }
            NodeKind::Mapping => self.explode_mapping(node, depth),
            NodeKind::Scalar | NodeKind::Sequence => {
                let mut copy = shallow_copy(node);
                copy.content = node
                    .content
                    .iter()
                    .map(|child| self.explode_node(child, depth))
                    .collect::<Result<_, _>>()?;
                Ok(copy)
            }
        }
    }

    fn explode_mapping(&self, node: &CandidateNode, depth: usize) -> Result<CandidateNode, ExplodeError> {
        let explicit: HashSet<&str> = node
            .pairs()
            .filter(|(key, _)| !key.is_merge_key())
            .map(|(key, _)| key.value.as_str())
            .collect();

        let mut pairs: Vec<(CandidateNode, CandidateNode)> = Vec::new();
        for (key, value) in node.pairs() {
            if !key.is_merge_key() {
                pairs.push((self.explode_node(key, depth)?, self.explode_node(value, depth)?));
                continue;
            }

            let source = self.explode_node(value, depth)?;
            let sources = match source.kind {
                NodeKind::Mapping => vec![source],
                NodeKind::Sequence if source.content.iter().all(|s| s.kind == NodeKind::Mapping) => {
                    source.content
                }
                _ => return Err(ExplodeError::InvalidMerge),
            };
            for source in sources {
                for (merged_key, merged_value) in source.pairs() {
                    let name = merged_key.value.as_str();
                    if explicit.contains(name) || pairs.iter().any(|(k, _)| k.value == name) {
                        continue;
                    }
                    pairs.push((merged_key.clone(), merged_value.clone()));
                }
            }
        }

        let mut copy = shallow_copy(node);
        copy.content = pairs.into_iter().flat_map(|(k, v)| [k, v]).collect();
        Ok(copy)
    }
}

impl AliasExploder for Exploder {
    fn explode(&self, nodes: Vec<CandidateNode>) -> Result<Vec<CandidateNode>, ExplodeError> {
        nodes.iter().map(|node| self.explode_node(node, 0)).collect()
    }
}

/// Copy a node's own fields without children, anchor or alias target
fn shallow_copy(node: &CandidateNode) -> CandidateNode {
    CandidateNode {
        kind: node.kind,
        tag: node.tag.clone(),
        value: node.value.clone(),
        anchor: None,
        alias: None,
        content: Vec::new(),
        head_comment: node.head_comment.clone(),
        line_comment: node.line_comment.clone(),
        leading_content: node.leading_content.clone(),
        document: node.document,
        file_index: node.file_index,
        filename: node.filename.clone(),
    }
}
