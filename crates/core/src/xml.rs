//! XML handling for eCFR source documents.
//!
//! Documents are first read into a small ordered element tree, which is then
//! either mapped structurally to JSON (`xml_to_json`) or interpreted as a
//! regulation hierarchy (see `regulation::RegulationDocument`).

use crate::error::{CoreError, CoreResult};
use crate::regulation::RegulationDocument;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Prefix for attribute keys in the JSON mapping.
pub const ATTRIBUTE_PREFIX: &str = "@";
/// Key for element text when the element also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Inline markup flattened into the surrounding text.
const INLINE_TAGS: &[&str] = &["I", "E", "B", "SU", "FR", "AC"];

/// An XML element with its children in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(start: &BytesStart<'_>, position: u64) -> CoreResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CoreError::Xml {
                position,
                message: e.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| CoreError::Xml {
                    position,
                    message: e.to_string(),
                })?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Value of the attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// All descendant text with whitespace collapsed to single spaces.
    pub fn text(&self) -> String {
        self.text_excluding(&[])
    }

    /// Descendant text, skipping subtrees whose element name is in `skip`.
    pub fn text_excluding(&self, skip: &[&str]) -> String {
        let mut raw = String::new();
        self.collect_text(skip, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, skip: &[&str], out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) if skip.contains(&element.name.as_str()) => {}
                Node::Element(element) if INLINE_TAGS.contains(&element.name.as_str()) => {
                    element.collect_text(skip, out);
                }
                Node::Element(element) => {
                    // Block-level children would otherwise run into each other.
                    out.push(' ');
                    element.collect_text(skip, out);
                    out.push(' ');
                }
            }
        }
    }
}

/// Read `xml` into an element tree rooted at the document element.
pub fn parse_element(xml: &str) -> CoreResult<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| CoreError::Xml {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                stack.push(Element::from_start(&start, position)?);
            }
            Event::Empty(start) => {
                let element = Element::from_start(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| CoreError::Xml {
                    position,
                    message: format!("unexpected closing tag </{}>", name),
                })?;
                if element.name != name {
                    return Err(CoreError::MismatchedTag {
                        expected: element.name,
                        found: name,
                    });
                }
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| CoreError::Xml {
                        position,
                        message: e.to_string(),
                    })?
                    .into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(CoreError::Xml {
            position: xml.len() as u64,
            message: format!("unclosed element <{}>", open.name),
        });
    }
    root.ok_or(CoreError::EmptyDocument)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> CoreResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(CoreError::Xml {
                position,
                message: format!("second root element <{}>", element.name),
            })
        }
    }
    Ok(())
}

/// Convert an XML document to JSON.
///
/// Attributes become `@name` keys, repeated child names become arrays,
/// elements with only text become strings, empty elements become null, and
/// text next to attributes or children is stored under `#text`.
pub fn xml_to_json(xml: &str) -> CoreResult<Value> {
    let root = parse_element(xml)?;
    let mut document = Map::new();
    document.insert(root.name.clone(), element_to_json(&root));
    Ok(Value::Object(document))
}

/// Parse eCFR source XML into a regulation tree of `DIVn` divisions.
pub fn parse_regulation_document(xml: &str) -> CoreResult<RegulationDocument> {
    RegulationDocument::parse(xml)
}

/// Structural JSON mapping of a single element (without its own name).
pub fn element_to_json(element: &Element) -> Value {
    let text = element
        .children
        .iter()
        .filter_map(|child| match child {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let has_elements = element.elements().next().is_some();

    if element.attributes.is_empty() && !has_elements {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text)
        };
    }

    let mut map = Map::new();
    for (key, value) in &element.attributes {
        map.insert(
            format!("{}{}", ATTRIBUTE_PREFIX, key),
            Value::String(value.clone()),
        );
    }
    for child in element.elements() {
        let value = element_to_json(child);
        match map.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }
    if !text.is_empty() {
        map.insert(TEXT_KEY.to_string(), Value::String(text));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DIV8 N="§ 1910.1200" TYPE="SECTION">
  <HEAD>§ 1910.1200   Hazard communication.</HEAD>
  <P>(a) <I>Purpose.</I> The purpose of this section is to ensure &amp; classify.</P>
  <P>(b) <I>Scope and application.</I></P>
  <CITA>[77 FR 17884, Mar. 26, 2012]</CITA>
</DIV8>"#;

    #[test]
    fn test_attributes_and_repeated_children() {
        let value = xml_to_json(SECTION).unwrap();
        let section = &value["DIV8"];

        assert_eq!(section["@N"], "§ 1910.1200");
        assert_eq!(section["@TYPE"], "SECTION");
        assert_eq!(section["HEAD"], "§ 1910.1200 Hazard communication.");
        assert!(section["P"].is_array());
        assert_eq!(section["P"].as_array().unwrap().len(), 2);
        assert_eq!(section["P"][0]["I"], "Purpose.");
        assert_eq!(
            section["P"][0]["#text"],
            "(a) The purpose of this section is to ensure & classify."
        );
        assert_eq!(section["CITA"], "[77 FR 17884, Mar. 26, 2012]");
    }

    #[test]
    fn test_empty_element_is_null() {
        let value = xml_to_json("<ROOT><EMPTY/><LEAF>x</LEAF></ROOT>").unwrap();
        assert_eq!(value, json!({"ROOT": {"EMPTY": null, "LEAF": "x"}}));
    }

    #[test]
    fn test_cdata_is_text() {
        let value = xml_to_json("<NOTE><![CDATA[a < b]]></NOTE>").unwrap();
        assert_eq!(value, json!({"NOTE": "a < b"}));
    }

    #[test]
    fn test_element_text_keeps_inline_order() {
        let root = parse_element(SECTION).unwrap();
        let paragraph = root.child("P").unwrap();
        assert_eq!(
            paragraph.text(),
            "(a) Purpose. The purpose of this section is to ensure & classify."
        );
    }

    #[test]
    fn test_mismatched_tag_is_an_error() {
        let err = xml_to_json("<A><B></A>").unwrap_err();
        assert!(matches!(
            err,
            CoreError::MismatchedTag { .. } | CoreError::Xml { .. }
        ));
    }

    #[test]
    fn test_unclosed_and_empty_documents() {
        assert!(xml_to_json("<A><B></B>").is_err());
        assert!(matches!(
            xml_to_json("   ").unwrap_err(),
            CoreError::EmptyDocument
        ));
    }
}
