//! YAML encoder
//!
//! Block-style emitter that keeps anchors, aliases and comments. Strings are
//! quoted only when a plain scalar would read back as something else.

use std::io::Write;

use super::{EncodeError, Encoder, YamlPreferences};
use crate::node::{tags, CandidateNode, NodeKind, DOC_SEPARATOR_SENTINEL};

const CORE_TAGS: &[&str] = &[
    tags::NULL,
    tags::BOOL,
    tags::INT,
    tags::FLOAT,
    tags::STR,
    tags::MAP,
    tags::SEQ,
    tags::MERGE,
];

pub struct YamlEncoder {
    prefs: YamlPreferences,
}

impl YamlEncoder {
    pub fn new(prefs: YamlPreferences) -> Self {
        YamlEncoder { prefs }
    }

    fn render(&self, node: &CandidateNode) -> Result<String, EncodeError> {
        let mut out = String::new();
        write_comment(&mut out, &node.head_comment, 0);

        if self.prefs.unwrap_scalar && node.kind == NodeKind::Scalar {
            out.push_str(if node.is_null() && node.value.is_empty() { "null" } else { node.value.as_str() });
            out.push('\n');
            return Ok(out);
        }

        match node.kind {
            NodeKind::Scalar | NodeKind::Alias => {
                out.push_str(&inline(node));
                write_line_comment(&mut out, &node.line_comment);
                out.push('\n');
            }
            NodeKind::Mapping | NodeKind::Sequence if node.content.is_empty() => {
                out.push_str(&with_properties(node, empty_collection(node)));
                write_line_comment(&mut out, &node.line_comment);
                out.push('\n');
            }
            NodeKind::Mapping | NodeKind::Sequence => {
                let props = properties(node);
                if !props.is_empty() || !node.line_comment.is_empty() {
                    out.push_str(&props);
                    write_line_comment(&mut out, &node.line_comment);
                    out.push('\n');
                }
                if node.kind == NodeKind::Mapping {
                    self.block_mapping(&mut out, node, 0, false)?;
                } else {
                    self.block_sequence(&mut out, node, 0, false)?;
                }
            }
        }
        Ok(out)
    }

    fn block_mapping(
        &self,
        out: &mut String,
        node: &CandidateNode,
        indent: usize,
        inline_first: bool,
    ) -> Result<(), EncodeError> {
        for (i, (key, value)) in node.pairs().enumerate() {
            let continues_line = i == 0 && inline_first;
            if continues_line && !key.head_comment.is_empty() {
                // "- # comment" then the mapping on the following lines
                out.push_str(key.head_comment.lines().next().unwrap_or_default());
                out.push('\n');
                for line in key.head_comment.lines().skip(1) {
                    write_comment(out, line, indent);
                }
                out.push_str(&" ".repeat(indent));
            } else if continues_line {
                // already positioned after "- "
            } else {
                write_comment(out, &key.head_comment, indent);
                out.push_str(&" ".repeat(indent));
            }

            out.push_str(&key_text(key)?);
            out.push(':');
            let comment = if value.line_comment.is_empty() { &key.line_comment } else { &value.line_comment };
            self.value_after_indicator(out, value, indent, comment)?;
        }
        Ok(())
    }

    fn block_sequence(
        &self,
        out: &mut String,
        node: &CandidateNode,
        indent: usize,
        inline_first: bool,
    ) -> Result<(), EncodeError> {
        for (i, item) in node.content.iter().enumerate() {
            if !(i == 0 && inline_first) {
                write_comment(out, &item.head_comment, indent);
                out.push_str(&" ".repeat(indent));
            }
            out.push('-');

            let compact = properties(item).is_empty() && item.line_comment.is_empty() && !item.content.is_empty();
            match item.kind {
                NodeKind::Mapping if compact => {
                    out.push(' ');
                    self.block_mapping(out, item, indent + 2, true)?;
                }
                NodeKind::Sequence if compact => {
                    out.push(' ');
                    self.block_sequence(out, item, indent + 2, true)?;
                }
                _ => self.value_after_indicator(out, item, indent, &item.line_comment)?,
            }
        }
        Ok(())
    }

    /// Write a value that follows `key:` or `-` on the current line
    fn value_after_indicator(
        &self,
        out: &mut String,
        value: &CandidateNode,
        indent: usize,
        comment: &str,
    ) -> Result<(), EncodeError> {
        match value.kind {
            NodeKind::Scalar | NodeKind::Alias => {
                out.push(' ');
                out.push_str(&inline(value));
                write_line_comment(out, comment);
                out.push('\n');
            }
            NodeKind::Mapping | NodeKind::Sequence if value.content.is_empty() => {
                out.push(' ');
                out.push_str(&with_properties(value, empty_collection(value)));
                write_line_comment(out, comment);
                out.push('\n');
            }
            NodeKind::Mapping | NodeKind::Sequence => {
                let props = properties(value);
                if !props.is_empty() {
                    out.push(' ');
                    out.push_str(&props);
                }
                write_line_comment(out, comment);
                out.push('\n');
                let child_indent = indent + self.prefs.indent;
                if value.kind == NodeKind::Mapping {
                    self.block_mapping(out, value, child_indent, false)?;
                } else {
                    self.block_sequence(out, value, child_indent, false)?;
                }
            }
        }
        Ok(())
    }
}

impl Encoder for YamlEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        let text = self.render(node)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn print_document_separator(&self, writer: &mut dyn Write) -> Result<(), EncodeError> {
        if self.prefs.print_doc_separators {
            writer.write_all(b"---\n")?;
        }
        Ok(())
    }

    fn print_leading_content(&self, writer: &mut dyn Write, content: &str) -> Result<(), EncodeError> {
        let mut out = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            match line.strip_prefix(DOC_SEPARATOR_SENTINEL) {
                Some(rest) if self.prefs.print_doc_separators => {
                    out.push_str("---");
                    out.push_str(rest);
                }
                Some(_) => {}
                None => out.push_str(line),
            }
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        writer.write_all(out.as_bytes())?;
        Ok(())
    }

    fn can_handle_aliases(&self) -> bool {
        true
    }
}

/// Anchor and non-core tag, space separated
fn properties(node: &CandidateNode) -> String {
    let mut parts = Vec::new();
    if let Some(anchor) = &node.anchor {
        parts.push(format!("&{}", anchor));
    }
    if !node.tag.is_empty() && !CORE_TAGS.contains(&node.tag.as_str()) {
        parts.push(node.tag.clone());
    }
    parts.join(" ")
}

fn with_properties(node: &CandidateNode, text: &str) -> String {
    let props = properties(node);
    if props.is_empty() {
        text.to_string()
    } else {
        format!("{} {}", props, text)
    }
}

fn empty_collection(node: &CandidateNode) -> &'static str {
    if node.kind == NodeKind::Mapping {
        "{}"
    } else {
        "[]"
    }
}

/// Single-line rendering of a scalar or alias, with its properties
fn inline(node: &CandidateNode) -> String {
    if node.kind == NodeKind::Alias {
        return format!("*{}", node.value);
    }
    with_properties(node, &format_scalar(node))
}

fn key_text(key: &CandidateNode) -> Result<String, EncodeError> {
    match key.kind {
        NodeKind::Scalar => Ok(inline(key)),
        // an alias key needs a space before the colon
        NodeKind::Alias => Ok(format!("*{} ", key.value)),
        _ => Err(EncodeError::Unsupported {
            format: "yaml",
            what: "non-scalar mapping keys".to_string(),
        }),
    }
}

fn format_scalar(node: &CandidateNode) -> String {
    match node.tag.as_str() {
        tags::NULL if node.value.is_empty() => "null".to_string(),
        tags::NULL | tags::BOOL | tags::INT | tags::FLOAT => node.value.clone(),
        _ => quote_string(&node.value),
    }
}

/// Quote a string only if its plain form would not read back as the same string
fn quote_string(value: &str) -> String {
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return double_quote(value);
    }
    match serde_yaml::to_string(&serde_yaml::Value::String(value.to_string())) {
        Ok(rendered) => rendered.trim_end_matches('\n').to_string(),
        Err(_) => double_quote(value),
    }
}

fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn write_comment(out: &mut String, comment: &str, indent: usize) {
    for line in comment.lines() {
        out.push_str(&" ".repeat(indent));
        if !line.trim_start().starts_with('#') {
            out.push_str("# ");
        }
        out.push_str(line);
        out.push('\n');
    }
}

fn write_line_comment(out: &mut String, comment: &str) {
    if comment.is_empty() {
        return;
    }
    out.push(' ');
    if !comment.starts_with('#') {
        out.push_str("# ");
    }
    out.push_str(comment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn encode(node: &CandidateNode) -> String {
        encode_with(YamlPreferences::new(), node)
    }

    fn encode_with(prefs: YamlPreferences, node: &CandidateNode) -> String {
        let mut out = Vec::new();
        YamlEncoder::new(prefs).encode(&mut out, node).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn key(k: &str) -> CandidateNode {
        CandidateNode::string(k)
    }

    #[test]
    fn test_nested_mapping() {
        let node = CandidateNode::mapping(vec![
            (key("a"), CandidateNode::int(1)),
            (
                key("b"),
                CandidateNode::mapping(vec![(key("c"), CandidateNode::string("hello"))]),
            ),
            (
                key("d"),
                CandidateNode::sequence(vec![CandidateNode::string("x"), CandidateNode::boolean(true)]),
            ),
        ]);
        assert_eq!(encode(&node), "a: 1\nb:\n  c: hello\nd:\n  - x\n  - true\n");
    }

    #[test]
    fn test_sequence_of_mappings_is_compact() {
        let node = CandidateNode::sequence(vec![
            CandidateNode::mapping(vec![
                (key("name"), CandidateNode::string("a")),
                (key("size"), CandidateNode::int(2)),
            ]),
            CandidateNode::sequence(vec![CandidateNode::int(1), CandidateNode::int(2)]),
        ]);
        assert_eq!(encode(&node), "- name: a\n  size: 2\n- - 1\n  - 2\n");
    }

    #[test]
    fn test_strings_quoted_when_ambiguous() {
        let node = CandidateNode::mapping(vec![
            (key("a"), CandidateNode::string("true")),
            (key("b"), CandidateNode::string("")),
            (key("c"), CandidateNode::string("two\nlines")),
            (key("d"), CandidateNode::string("plain")),
        ]);
        assert_eq!(
            encode(&node),
            "a: 'true'\nb: ''\nc: \"two\\nlines\"\nd: plain\n"
        );
    }

    #[test]
    fn test_anchor_and_alias() {
        let target = CandidateNode::mapping(vec![(key("x"), CandidateNode::int(1))]).with_anchor("base");
        let node = CandidateNode::mapping(vec![
            (key("base"), target.clone()),
            (key("copy"), CandidateNode::alias("base", Rc::new(target))),
        ]);
        assert_eq!(encode(&node), "base: &base\n  x: 1\ncopy: *base\n");
    }

    #[test]
    fn test_comments() {
        let node = CandidateNode::mapping(vec![(
            key("a").with_head_comment("# about a"),
            CandidateNode::int(1).with_line_comment("# one"),
        )]);
        assert_eq!(encode(&node), "# about a\na: 1 # one\n");
    }

    #[test]
    fn test_unwrap_scalar() {
        let node = CandidateNode::string("multi\nline");
        assert_eq!(encode(&node), "multi\nline\n");
        let wrapped = encode_with(YamlPreferences::new().with_unwrap_scalar(false), &CandidateNode::string("true"));
        assert_eq!(wrapped, "'true'\n");
    }

    #[test]
    fn test_empty_collections() {
        let node = CandidateNode::mapping(vec![
            (key("m"), CandidateNode::mapping(vec![])),
            (key("s"), CandidateNode::sequence(vec![])),
        ]);
        assert_eq!(encode(&node), "m: {}\ns: []\n");
    }

    #[test]
    fn test_custom_tag() {
        let node = CandidateNode::mapping(vec![(key("a"), CandidateNode::scalar("!thing", "x"))]);
        assert_eq!(encode(&node), "a: !thing x\n");
    }

    #[test]
    fn test_leading_content_rewrites_sentinel() {
        let encoder = YamlEncoder::new(YamlPreferences::new());
        let mut out = Vec::new();
        let content = format!("{}\n# front\n", DOC_SEPARATOR_SENTINEL);
        encoder.print_leading_content(&mut out, &content).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "---\n# front\n");

        let encoder = YamlEncoder::new(YamlPreferences::new().with_doc_separators(false));
        let mut out = Vec::new();
        encoder.print_leading_content(&mut out, &content).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "# front\n");
    }

    #[test]
    fn test_document_separator() {
        let mut out = Vec::new();
        YamlEncoder::new(YamlPreferences::new()).print_document_separator(&mut out).unwrap();
        assert_eq!(out, b"---\n");

        let mut out = Vec::new();
        YamlEncoder::new(YamlPreferences::new().with_doc_separators(false))
            .print_document_separator(&mut out)
            .unwrap();
        assert!(out.is_empty());
    }
}
