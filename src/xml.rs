//! Namespace-aware element tree for package parts.
//!
//! Parts are parsed with [`quick_xml::NsReader`] into a small owned tree so
//! that checks can ask structural questions (ancestry, direct children,
//! resolved namespaces) instead of matching raw prefixes.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::NsReader;
use std::borrow::Cow;

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace URI; `None` for unprefixed attributes
    pub namespace: Option<String>,
    /// Local name without prefix
    pub local_name: String,
    /// Unescaped value
    pub value: String,
}

/// A child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its resolved namespace, attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace URI; `None` when the element is in no namespace
    pub namespace: Option<String>,
    /// Local name without prefix
    pub local_name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Whether this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    /// Attribute value by namespace and local name.
    ///
    /// Pass `None` for unprefixed attributes.
    pub fn attr(&self, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given name.
    pub fn child(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(namespace, local_name))
    }

    /// All elements below this one in document order, excluding itself.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&XmlElement> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// This element followed by all of its descendants, in document order.
    pub fn iter(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Descendants with the given name.
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.descendants().filter(move |e| e.is(namespace, local_name))
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                text.push_str(t);
            }
        }
        text
    }
}

// Deeply nested parts would overflow the stack with the derived recursive drop.
impl Drop for XmlElement {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let XmlNode::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// Pre-order iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.child_elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

/// XML 1.0 `Char` production.
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn check_chars(value: &str, position: u64) -> Result<()> {
    match value.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(Error::XmlParse(format!(
            "not well-formed (invalid character {:#x}) near byte {}",
            c as u32, position
        ))),
        None => Ok(()),
    }
}

fn namespace_of(resolved: ResolveResult<'_>, qname: QName<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.0).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::XmlParse(format!(
            "unbound prefix '{}' in <{}>",
            String::from_utf8_lossy(&prefix),
            String::from_utf8_lossy(qname.as_ref())
        ))),
    }
}

fn build_element(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement> {
    let position = reader.buffer_position() as u64;
    let (resolved, local) = reader.resolve_element(start.name());
    let namespace = namespace_of(resolved, start.name())?;
    let local_name = String::from_utf8_lossy(local.as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::XmlParse(format!("{} near byte {}", e, position)))?;
        // Namespace declarations are consumed by the reader.
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let attr_namespace = namespace_of(resolved, attr.key)?;
        let value = attr.unescape_value()?;
        check_chars(&value, position)?;
        attributes.push(XmlAttribute {
            namespace: attr_namespace,
            local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    Ok(XmlElement {
        namespace,
        local_name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: u64,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::XmlParse(format!(
            "junk after document element near byte {}",
            position
        ))),
    }
}

fn push_text(stack: &mut [XmlElement], text: Cow<'_, str>, position: u64) -> Result<()> {
    check_chars(&text, position)?;
    match stack.last_mut() {
        Some(parent) => {
            if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
                existing.push_str(&text);
            } else {
                parent.children.push(XmlNode::Text(text.into_owned()));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::XmlParse(format!(
            "text outside the document element near byte {}",
            position
        ))),
    }
}

/// Parse XML text into an element tree, returning the root element.
///
/// Rejects documents that are not well-formed: mismatched or unclosed
/// tags, more than one root, text outside the root, unbound prefixes,
/// duplicate attributes, unknown entities and illegal characters.
pub fn parse_xml(xml: &str) -> Result<XmlElement> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::XmlParse(format!("{} at byte {}", e, reader.error_position()))
        })?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Start(ref e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(Error::XmlParse(format!(
                        "junk after document element near byte {}",
                        position
                    )));
                }
                let element = build_element(&reader, e)?;
                stack.push(element);
            }
            Event::Empty(ref e) => {
                let element = build_element(&reader, e)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    Error::XmlParse(format!("unexpected end tag near byte {}", position))
                })?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape()?;
                push_text(&mut stack, text, position)?;
            }
            Event::CData(ref e) => {
                let text = String::from_utf8_lossy(e).into_owned();
                push_text(&mut stack, Cow::Owned(text), position)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DOCTYPE
            // carry nothing the checks look at.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::XmlParse(format!(
            "unclosed element <{}> at end of document",
            open.local_name
        )));
    }

    root.ok_or_else(|| Error::XmlParse("no element found".to_string()))
}
