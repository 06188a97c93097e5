//! Node structures for XML tree representation.
//!
//! A tree is an owned value: every node has exactly one owner (its parent's
//! child list, or the caller for a root). Diffing borrows two trees
//! immutably; patching borrows one tree mutably for its whole duration.

mod element;

pub use element::{DocumentType, Element, ProcessingInstruction};

use std::collections::BTreeMap;
use std::fmt;

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    CData,
    Comment,
    DocumentType,
    ProcessingInstruction,
}

impl NodeKind {
    /// Returns true for kinds that carry a single optional string value.
    pub fn is_value_bearing(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::CData | NodeKind::Comment)
    }

    /// Returns true for kinds that own an ordered child list.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }

    /// Returns true for kinds the diff and patch engines refuse to touch.
    pub fn is_unsupported(self) -> bool {
        matches!(
            self,
            NodeKind::DocumentType | NodeKind::ProcessingInstruction
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Document => "Document",
            NodeKind::Element => "Element",
            NodeKind::Text => "Text",
            NodeKind::CData => "CData",
            NodeKind::Comment => "Comment",
            NodeKind::DocumentType => "DocumentType",
            NodeKind::ProcessingInstruction => "ProcessingInstruction",
        };
        f.write_str(name)
    }
}

/// A node of a document tree.
///
/// Value-bearing leaves hold `Option<String>`: `None` means the node has no
/// value at all, which is distinct from `Some("")`. Parsed documents always
/// produce `Some`; `None` only arises from edit scripts that say so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Root container, children only.
    Document(Vec<Node>),
    /// A tag with attributes and ordered children.
    Element(Element),
    /// Character data.
    Text(Option<String>),
    /// A CDATA section.
    CData(Option<String>),
    /// A comment.
    Comment(Option<String>),
    /// A DOCTYPE declaration.
    DocumentType(DocumentType),
    /// A processing instruction.
    ProcessingInstruction(ProcessingInstruction),
}

impl Node {
    /// Creates a document holding `children`.
    pub fn document(children: Vec<Node>) -> Self {
        Node::Document(children)
    }

    /// Creates an element with no attributes and no children.
    pub fn element(name: impl Into<String>) -> Self {
        Node::Element(Element::new(name))
    }

    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Some(value.into()))
    }

    /// Creates a CDATA node.
    pub fn cdata(value: impl Into<String>) -> Self {
        Node::CData(Some(value.into()))
    }

    /// Creates a comment node.
    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(Some(value.into()))
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Document(_) => NodeKind::Document,
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::CData(_) => NodeKind::CData,
            Node::Comment(_) => NodeKind::Comment,
            Node::DocumentType(_) => NodeKind::DocumentType,
            Node::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
        }
    }

    /// Returns the tag name for elements.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element(e) => Some(e.name()),
            _ => None,
        }
    }

    /// Returns true if this node owns a child list.
    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Returns the value of a value-bearing leaf.
    ///
    /// The outer `Option` is `None` for kinds without a value; the inner one
    /// is the value itself.
    pub fn value(&self) -> Option<Option<&str>> {
        match self {
            Node::Text(v) | Node::CData(v) | Node::Comment(v) => Some(v.as_deref()),
            _ => None,
        }
    }

    /// Returns a mutable handle on the value of a value-bearing leaf.
    pub fn value_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Node::Text(v) | Node::CData(v) | Node::Comment(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the attributes of an element.
    pub fn attributes(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Node::Element(e) => Some(e.attributes()),
            _ => None,
        }
    }

    /// Returns the children, or an empty slice for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(children) => children,
            Node::Element(e) => e.children(),
            _ => &[],
        }
    }

    /// Returns the child list of a container.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document(children) => Some(children),
            Node::Element(e) => Some(e.children_mut()),
            _ => None,
        }
    }

    /// Returns the child at the given index.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    /// Creates a node of the same kind (and name) with no value, attributes
    /// or children.
    ///
    /// This is the starting point an inserted node is built out from.
    pub fn empty_like(&self) -> Node {
        match self {
            Node::Document(_) => Node::Document(Vec::new()),
            Node::Element(e) => Node::element(e.name()),
            Node::Text(_) => Node::Text(None),
            Node::CData(_) => Node::CData(None),
            Node::Comment(_) => Node::Comment(None),
            Node::DocumentType(d) => Node::DocumentType(d.clone()),
            Node::ProcessingInstruction(pi) => Node::ProcessingInstruction(pi.clone()),
        }
    }

    /// Counts this node and all of its descendants.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::subtree_size)
            .sum::<usize>()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Node::element("a").kind(), NodeKind::Element);
        assert_eq!(Node::text("x").kind(), NodeKind::Text);
        assert!(NodeKind::Comment.is_value_bearing());
        assert!(!NodeKind::Element.is_value_bearing());
        assert!(NodeKind::Document.is_container());
        assert!(NodeKind::ProcessingInstruction.is_unsupported());
    }

    #[test]
    fn test_value_null_vs_empty() {
        assert_eq!(Node::Text(None).value(), Some(None));
        assert_eq!(Node::text("").value(), Some(Some("")));
        assert_eq!(Node::element("a").value(), None);
    }

    #[test]
    fn test_children_of_leaf() {
        let mut text = Node::text("x");
        assert!(text.children().is_empty());
        assert!(text.children_mut().is_none());
    }

    #[test]
    fn test_empty_like() {
        let full = Element::new("e")
            .with_attr("a", "1")
            .with_child(Node::text("x"))
            .into();
        let empty: Node = Node::empty_like(&full);
        assert_eq!(empty, Node::element("e"));
        assert_eq!(Node::comment("c").empty_like(), Node::Comment(None));
    }

    #[test]
    fn test_subtree_size() {
        let tree: Node = Element::new("r")
            .with_child(Element::new("a").with_child(Node::text("t")).into())
            .with_child(Node::comment("c"))
            .into();
        assert_eq!(tree.subtree_size(), 4);
    }
}
