//! The edit script: a tree of ops produced by diff and consumed by patch.
//!
//! Every `index` in an op refers to a position in the child sequence as it
//! stands at the moment the op is applied, not to a position in either
//! original tree. Ops must therefore be applied strictly in order.

mod codec;

pub use codec::{decode, encode, write_script};

use std::fmt;

use crate::node::NodeKind;

/// Element name of the script's root container.
pub const SCRIPT_ROOT_TAG: &str = "root";

/// Element names for ops.
pub const VALUE_TAG: &str = "Value";
pub const REMOVE_TAG: &str = "Remove";
pub const INSERT_TAG: &str = "Insert";
pub const CHANGE_TAG: &str = "Change";
pub const ATTR_TAG: &str = "Attr";

/// Attribute names for ops.
pub const IDX_ATTR: &str = "idx";
pub const NAME_ATTR: &str = "name";
pub const NODE_TYPE_ATTR: &str = "node_type";

/// The kinds of node an `Insert` op can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKind {
    Element,
    Comment,
    Text,
    CData,
}

impl InsertKind {
    /// Returns the `node_type` attribute value for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            InsertKind::Element => "Element",
            InsertKind::Comment => "Comment",
            InsertKind::Text => "Text",
            InsertKind::CData => "CData",
        }
    }

    /// Parses a `node_type` attribute value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Element" => Some(InsertKind::Element),
            "Comment" => Some(InsertKind::Comment),
            "Text" => Some(InsertKind::Text),
            "CData" => Some(InsertKind::CData),
            _ => None,
        }
    }

    /// Maps a node kind to the insert kind that recreates it.
    pub fn from_node_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Element => Some(InsertKind::Element),
            NodeKind::Comment => Some(InsertKind::Comment),
            NodeKind::Text => Some(InsertKind::Text),
            NodeKind::CData => Some(InsertKind::CData),
            NodeKind::Document | NodeKind::DocumentType | NodeKind::ProcessingInstruction => None,
        }
    }

    /// Returns the node kind this insert creates.
    pub fn node_kind(self) -> NodeKind {
        match self {
            InsertKind::Element => NodeKind::Element,
            InsertKind::Comment => NodeKind::Comment,
            InsertKind::Text => NodeKind::Text,
            InsertKind::CData => NodeKind::CData,
        }
    }
}

impl fmt::Display for InsertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instruction of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Set the value of the value-bearing child at `index`, or insert a text
    /// node there when the child list ends at `index`.
    Value {
        index: usize,
        content: Option<String>,
    },
    /// Detach the child at `index`. A present `name` must match the child.
    Remove { index: usize, name: Option<String> },
    /// Create a node at `index` and build it out with `children`.
    Insert {
        index: usize,
        kind: InsertKind,
        name: Option<String>,
        children: Vec<Op>,
    },
    /// Descend into the child at `index` and apply `children` to it.
    Change {
        index: usize,
        name: Option<String>,
        children: Vec<Op>,
    },
    /// Set (`Some`) or remove (`None`) an attribute on the current target.
    Attr { name: String, value: Option<String> },
}

impl Op {
    /// Returns the element name this op encodes to.
    pub fn tag(&self) -> &'static str {
        match self {
            Op::Value { .. } => VALUE_TAG,
            Op::Remove { .. } => REMOVE_TAG,
            Op::Insert { .. } => INSERT_TAG,
            Op::Change { .. } => CHANGE_TAG,
            Op::Attr { .. } => ATTR_TAG,
        }
    }

    /// Returns the child position this op addresses, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            Op::Value { index, .. }
            | Op::Remove { index, .. }
            | Op::Insert { index, .. }
            | Op::Change { index, .. } => Some(*index),
            Op::Attr { .. } => None,
        }
    }

    /// Returns the nested ops of an `Insert` or `Change`.
    pub fn children(&self) -> &[Op] {
        match self {
            Op::Insert { children, .. } | Op::Change { children, .. } => children,
            _ => &[],
        }
    }

    /// Counts this op and every nested op.
    pub fn op_count(&self) -> usize {
        1 + self.children().iter().map(Op::op_count).sum::<usize>()
    }
}

/// An ordered list of top-level ops, applied against a tree's root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<Op>,
}

impl EditScript {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a list of ops.
    pub fn from_ops(ops: Vec<Op>) -> Self {
        EditScript { ops }
    }

    /// Returns the top-level ops.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Consumes the script, returning its ops.
    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Returns `true` if the script changes nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of top-level ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Number of ops at every nesting level.
    pub fn op_count(&self) -> usize {
        self.ops.iter().map(Op::op_count).sum()
    }

    /// Encodes the script in its XML form.
    pub fn to_xml(&self) -> String {
        encode(self)
    }

    /// Decodes a script from its XML form.
    pub fn from_xml(xml: &str) -> crate::Result<Self> {
        decode(xml)
    }
}

impl From<Vec<Op>> for EditScript {
    fn from(ops: Vec<Op>) -> Self {
        EditScript::from_ops(ops)
    }
}
