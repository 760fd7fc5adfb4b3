//! XML encoder
//!
//! Mapping keys become elements. Keys starting with the attribute prefix
//! (`+@` by default) become attributes, and the content key (`+content`)
//! becomes the element's text. Sequences repeat their parent element.

use std::fmt::Display;
use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{EncodeError, Encoder, XmlPreferences};
use crate::node::{CandidateNode, NodeKind};

pub struct XmlEncoder {
    prefs: XmlPreferences,
}

fn xml_error(e: impl Display) -> EncodeError {
    EncodeError::Xml(e.to_string())
}

impl XmlEncoder {
    pub fn new(prefs: XmlPreferences) -> Self {
        XmlEncoder { prefs }
    }

    fn write_comment(&self, xml: &mut Writer<&mut Vec<u8>>, comment: &str) -> Result<(), EncodeError> {
        for line in comment.lines() {
            let text = line.trim_start().trim_start_matches('#');
            xml.write_event(Event::Comment(BytesText::from_escaped(text)))
                .map_err(xml_error)?;
        }
        Ok(())
    }

    fn write_element(
        &self,
        xml: &mut Writer<&mut Vec<u8>>,
        name: &str,
        node: &CandidateNode,
    ) -> Result<(), EncodeError> {
        match node.kind {
            NodeKind::Sequence => {
                for item in &node.content {
                    self.write_element(xml, name, item)?;
                }
            }
            NodeKind::Mapping => {
                let mut start = BytesStart::new(name);
                let mut text = None;
                let mut children = Vec::new();
                for (key, value) in node.pairs() {
                    if let Some(attribute) = key.value.strip_prefix(self.prefs.attribute_prefix.as_str()) {
                        start.push_attribute((attribute, value.value.as_str()));
                    } else if key.value == self.prefs.content_name {
                        text = Some(value.value.as_str());
                    } else {
                        children.push((key, value));
                    }
                }

                if text.is_none() && children.is_empty() {
                    xml.write_event(Event::Empty(start)).map_err(xml_error)?;
                    return Ok(());
                }

                xml.write_event(Event::Start(start.borrow())).map_err(xml_error)?;
                if let Some(text) = text {
                    xml.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
                }
                for (key, value) in children {
                    self.write_comment(xml, &key.head_comment)?;
                    self.write_element(xml, &key.value, value)?;
                }
                xml.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)?;
            }
            NodeKind::Scalar if node.is_null() => {
                xml.write_event(Event::Empty(BytesStart::new(name))).map_err(xml_error)?;
            }
            NodeKind::Scalar => {
                xml.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)?;
                xml.write_event(Event::Text(BytesText::new(&node.value))).map_err(xml_error)?;
                xml.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)?;
            }
            NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("xml", node.value.clone())),
        }
        Ok(())
    }
}

impl Encoder for XmlEncoder {
    fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
        let mut buffer = Vec::new();
        match node.kind {
            NodeKind::Scalar => {
                buffer.extend_from_slice(quick_xml::escape::escape(node.value.as_str()).as_bytes());
            }
            NodeKind::Mapping => {
                let mut xml = if self.prefs.indent == 0 {
                    Writer::new(&mut buffer)
                } else {
                    Writer::new_with_indent(&mut buffer, b' ', self.prefs.indent)
                };
                for (key, value) in node.pairs() {
                    self.write_comment(&mut xml, &key.head_comment)?;
                    self.write_element(&mut xml, &key.value, value)?;
                }
            }
            NodeKind::Sequence => {
                return Err(EncodeError::Unsupported {
                    format: "xml",
                    what: "a sequence at the document root".to_string(),
                })
            }
            NodeKind::Alias => return Err(EncodeError::UnexpectedAlias("xml", node.value.clone())),
        }
        buffer.push(b'\n');
        writer.write_all(&buffer)?;
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
