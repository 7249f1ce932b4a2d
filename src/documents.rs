//! Instance documents
//!
//! This module provides the instance side of matching: the [`InstanceNode`]
//! trait the matcher consumes, and [`ElementNode`], a plain tree that can be
//! parsed from FHIR XML or built programmatically.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::FHIR_NAMESPACE;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A node of an instance document
pub trait InstanceNode {
    /// Element name
    fn name(&self) -> &str;

    /// Resolved type name, when known
    fn type_name(&self) -> Option<&str>;

    /// Scalar value of a primitive node
    fn value(&self) -> Option<&str>;

    /// Child nodes, in document order
    fn children(&self) -> Vec<&Self>;
}

/// Element in the instance tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Element name
    pub name: String,
    /// Type name, when known
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Scalar value (the `value` attribute in XML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the type name
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the scalar value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Find child elements by name
    pub fn find_children(&self, name: &str) -> Vec<&ElementNode> {
        self.children.iter().filter(|e| e.name == name).collect()
    }
}

impl InstanceNode for ElementNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }
}

/// Instance document
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<ElementNode>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a FHIR XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Load a FHIR XML document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let loader = Loader::new();
        let xml = loader.load(path.as_ref())?;
        Self::parse_with_limits(xml.as_bytes(), loader.limits())
    }

    /// Parse a document from the JSON form of [`ElementNode`]
    pub fn from_json(json: &str) -> Result<Self> {
        let root: ElementNode = serde_json::from_str(json)?;
        Ok(Self { root: Some(root) })
    }

    /// Parse a FHIR XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse a FHIR XML document from bytes, enforcing limits
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_document_size(xml.len())?;

        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<ElementNode> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_document_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, element_stack.is_empty())?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        Self::attach(&mut element_stack, &mut doc, current, limits)?;
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_document_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, element_stack.is_empty())?;
                    Self::attach(&mut element_stack, &mut doc, element, limits)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Text, comments and processing instructions carry no children
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml(format!(
                "Unclosed element '{}'",
                element_stack[element_stack.len() - 1].name
            )));
        }

        debug!(
            root = doc.root.as_ref().map(|r| r.name.as_str()).unwrap_or(""),
            "parsed instance document"
        );
        Ok(doc)
    }

    fn attach(
        stack: &mut [ElementNode],
        doc: &mut Document,
        element: ElementNode,
        limits: &Limits,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => {
                limits.check_children(parent.children.len() + 1)?;
                parent.children.push(element);
            }
            None if doc.root.is_some() => {
                return Err(Error::Xml(format!(
                    "multiple root elements: '{}' follows the root",
                    element.name
                )))
            }
            None => doc.root = Some(element),
        }
        Ok(())
    }

    /// Parse element name and `value` attribute from a start tag
    fn parse_element(start: &BytesStart, is_root: bool) -> Result<ElementNode> {
        let local_name = start.local_name();
        let name = std::str::from_utf8(local_name.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?;

        let mut element = ElementNode::new(name);

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            match attr.key.as_ref() {
                b"value" => {
                    let value = attr
                        .unescape_value()
                        .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                        .to_string();
                    element.value = Some(value);
                }
                b"xmlns" if is_root => {
                    let namespace = attr
                        .unescape_value()
                        .map_err(|e| Error::Xml(format!("Failed to unescape namespace: {}", e)))?;
                    if namespace != FHIR_NAMESPACE {
                        warn!(element = name, namespace = %namespace, "root is not in the FHIR namespace");
                    }
                }
                _ => {}
            }
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&ElementNode> {
        self.root.as_ref()
    }
}
