//! Payload types for the structured node kinds.

use std::collections::BTreeMap;

use super::Node;

/// An XML element: a tag name, attributes, and ordered children.
///
/// Attributes live in a sorted map; their document order carries no meaning
/// and sorting keeps diff output deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: adds an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: appends a child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns a mutable reference to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.attributes
    }

    /// Sets an attribute, or removes it when `value` is `None`.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(v) => {
                self.attributes.insert(name.to_string(), v.to_string());
            }
            None => {
                self.attributes.remove(name);
            }
        }
    }

    /// Returns the children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns a mutable reference to the children.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }
}

/// A processing instruction such as `<?xml-stylesheet href="a.css"?>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    target: String,
    data: String,
}

impl ProcessingInstruction {
    pub fn new(target: impl Into<String>, data: impl Into<String>) -> Self {
        ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

/// A DOCTYPE declaration, kept as its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentType {
    text: String,
}

impl DocumentType {
    pub fn new(text: impl Into<String>) -> Self {
        DocumentType { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
