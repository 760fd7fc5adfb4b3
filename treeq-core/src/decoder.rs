//! YAML/JSON input decoding
//!
//! Splits a multi-document stream on `---` lines, parses each document with
//! serde_yaml and converts it into [`CandidateNode`]s. Comment lines and
//! explicit `---` markers in front of a document become its leading content,
//! with markers written as [`DOC_SEPARATOR_SENTINEL`].
//!
//! Comments inside a document's content are dropped by serde_yaml, and so are
//! comments after the last document of a stream.
//!
//! JSON is a subset of YAML's flow style, so JSON input decodes the same way.

use serde_yaml::value::TaggedValue;
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::node::{tags, CandidateNode, DOC_SEPARATOR_SENTINEL};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{filename}: document {document}: {source}")]
    Yaml {
        filename: String,
        document: usize,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A document split into its YAML header and the text after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    /// Header including the opening `---` line
    pub header: String,
    /// Everything from the closing `---` line on, kept verbatim
    pub body: String,
}

#[derive(Default)]
struct Segment {
    leading: String,
    body: String,
}

fn is_document_start(line: &str) -> bool {
    line == "---" || line.starts_with("--- ") || line.starts_with("---\t")
}

fn is_document_end(line: &str) -> bool {
    line == "..." || line.starts_with("... ")
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(|c: char| c == '\n' || c == '\r')
}

/// Cut the stream into documents. Comment-only stretches attach to the
/// document that follows them: comments after a document's content but before
/// the next `---` or `...` go below that marker, in the next document's
/// leading content.
fn split_documents(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::default();
    let mut seen_content = false;
    // comment and blank lines seen after content, not yet placed
    let mut pending = String::new();

    for line in source.split_inclusive('\n') {
        let text = strip_eol(line);

        if is_document_start(text) {
            if seen_content {
                segments.push(std::mem::take(&mut current));
                seen_content = false;
            }
            current.leading.push_str(DOC_SEPARATOR_SENTINEL);
            current.leading.push('\n');
            current.leading.push_str(&std::mem::take(&mut pending));
            let rest = text[3..].trim();
            if !rest.is_empty() && !rest.starts_with('#') {
                current.body.push_str(rest);
                current.body.push('\n');
                seen_content = true;
            }
            continue;
        }

        if is_document_end(text) {
            if seen_content {
                segments.push(std::mem::take(&mut current));
                seen_content = false;
            }
            current.leading.push_str(&std::mem::take(&mut pending));
            continue;
        }

        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            let target = if seen_content { &mut pending } else { &mut current.leading };
            target.push_str(text);
            target.push('\n');
            continue;
        }

        seen_content = true;
        current.body.push_str(&std::mem::take(&mut pending));
        current.body.push_str(line);
    }

    if !pending.trim().is_empty() {
        debug!(lines = pending.lines().count(), "dropping trailing comments");
    }
    if seen_content {
        segments.push(current);
    }
    segments
}

struct Origin<'a> {
    document: usize,
    file_index: usize,
    filename: &'a str,
}

impl Origin<'_> {
    fn convert(&self, value: Value) -> CandidateNode {
        let node = match value {
            Value::Null => CandidateNode::null(),
            Value::Bool(b) => CandidateNode::boolean(b),
            Value::Number(n) => {
                let tag = if n.is_f64() { tags::FLOAT } else { tags::INT };
                CandidateNode::scalar(tag, n.to_string())
            }
            Value::String(s) => CandidateNode::string(s),
            Value::Sequence(items) => {
                CandidateNode::sequence(items.into_iter().map(|item| self.convert(item)).collect())
            }
            Value::Mapping(mapping) => CandidateNode::mapping(
                mapping
                    .into_iter()
                    .map(|(k, v)| (self.convert(k), self.convert(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                let mut node = self.convert(value);
                node.tag = tag.to_string();
                node
            }
        };
        node.with_document(self.document)
            .with_file_index(self.file_index)
            .with_filename(self.filename)
    }
}

/// Decode every document in `source`
pub fn decode_documents(
    source: &str,
    file_index: usize,
    filename: &str,
) -> Result<Vec<CandidateNode>, DecodeError> {
    let segments = split_documents(source);
    debug!(filename, documents = segments.len(), "decoding input");

    segments
        .into_iter()
        .enumerate()
        .map(|(document, segment)| {
            let value: Value = serde_yaml::from_str(&segment.body).map_err(|source| DecodeError::Yaml {
                filename: filename.to_string(),
                document,
                source,
            })?;
            let origin = Origin {
                document,
                file_index,
                filename,
            };
            Ok(origin.convert(value).with_leading_content(segment.leading))
        })
        .collect()
}

/// Split a front-matter document (e.g. Markdown with a YAML header).
///
/// Returns `None` when the input does not open with `---`. Without a closing
/// marker the whole input is header and the body is empty.
pub fn split_front_matter(source: &str) -> Option<FrontMatter> {
    let mut lines = source.split_inclusive('\n');
    let first = lines.next()?;
    if strip_eol(first) != "---" {
        return None;
    }

    let mut header = first.to_string();
    let mut offset = first.len();
    for line in lines {
        if strip_eol(line) == "---" {
            return Some(FrontMatter {
                header,
                body: source[offset..].to_string(),
            });
        }
        header.push_str(line);
        offset += line.len();
    }

    Some(FrontMatter {
        header,
        body: String::new(),
    })
}
