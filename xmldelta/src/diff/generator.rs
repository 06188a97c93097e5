//! Edit script generation.
//!
//! Walks the child lists of two containers with one cursor into each and a
//! running output position. Compatible siblings are related by a `Change`
//! (or a `Value` for text-like leaves); incompatible stretches are bridged
//! by the resync locator with removes and inserts.

use tracing::{debug, trace};

use super::resync::{find_nearest_match, is_compatible};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::script::{EditScript, InsertKind, Op};

/// How nodes present only in the left tree are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffMode {
    /// Left-only nodes are removed; patching reproduces the right tree.
    #[default]
    Transform,
    /// Left-only nodes are kept; right-only nodes are still inserted and
    /// shared nodes are still reconciled.
    Merge,
}

/// Diff generator for two document trees.
#[derive(Debug, Clone, Default)]
pub struct Diff {
    mode: DiffMode,
}

impl Diff {
    /// Creates a diff generator for the given mode.
    pub fn new(mode: DiffMode) -> Self {
        Diff { mode }
    }

    /// Returns the mode this generator runs in.
    pub fn mode(&self) -> DiffMode {
        self.mode
    }

    /// Computes the script that turns `left` into `right`.
    ///
    /// Both roots must be containers of the same kind, and elements must
    /// share a name: a script can rewrite a root but never replace it.
    /// Neither input is modified.
    pub fn diff(&self, left: &Node, right: &Node) -> Result<EditScript> {
        check_roots(left, right)?;
        debug!(mode = ?self.mode, "diff started");

        let ops = self.diff_container(left, right)?;
        let script = EditScript::from_ops(ops);

        debug!(
            top_level = script.len(),
            total = script.op_count(),
            "diff finished"
        );
        Ok(script)
    }

    /// Attribute ops followed by child ops for two compatible containers.
    fn diff_container(&self, left: &Node, right: &Node) -> Result<Vec<Op>> {
        let mut ops = attribute_ops(left, right);
        self.diff_children(left.children(), right.children(), &mut ops)?;
        Ok(ops)
    }

    fn diff_children(&self, left: &[Node], right: &[Node], ops: &mut Vec<Op>) -> Result<()> {
        check_supported(left)?;
        check_supported(right)?;

        let mut i = 0;
        let mut j = 0;
        let mut out_idx = 0;

        loop {
            match (left.get(i), right.get(j)) {
                (None, None) => break,
                (None, Some(_)) => {
                    out_idx = self.insert_all(&right[j..], out_idx, ops)?;
                    j = right.len();
                }
                (Some(_), None) => {
                    out_idx = self.skip_all(&left[i..], out_idx, ops);
                    i = left.len();
                }
                (Some(l), Some(r)) if is_compatible(l, r) => {
                    self.change(l, r, out_idx, ops)?;
                    out_idx += 1;
                    i += 1;
                    j += 1;
                }
                (Some(_), Some(_)) => {
                    let (skip_left, skip_right) =
                        find_nearest_match(&left[i..], &right[j..], is_compatible)
                            .unwrap_or((left.len() - i, right.len() - j));
                    trace!(
                        left = i,
                        right = j,
                        skip_left,
                        skip_right,
                        "resynchronized siblings"
                    );

                    out_idx = self.skip_all(&left[i..i + skip_left], out_idx, ops);
                    out_idx = self.insert_all(&right[j..j + skip_right], out_idx, ops)?;
                    i += skip_left;
                    j += skip_right;
                }
            }
        }

        Ok(())
    }

    /// Relates two compatible siblings at output position `out_idx`.
    fn change(&self, left: &Node, right: &Node, out_idx: usize, ops: &mut Vec<Op>) -> Result<()> {
        match right {
            Node::Element(element) => {
                let nested = self.diff_container(left, right)?;
                if !nested.is_empty() {
                    ops.push(Op::Change {
                        index: out_idx,
                        name: Some(element.name().to_string()),
                        children: nested,
                    });
                }
            }
            Node::Text(value) | Node::CData(value) | Node::Comment(value) => {
                if left.value() != Some(value.as_deref()) {
                    ops.push(Op::Value {
                        index: out_idx,
                        content: value.clone(),
                    });
                }
            }
            Node::Document(_) | Node::DocumentType(_) | Node::ProcessingInstruction(_) => {
                return Err(Error::UnsupportedNodeKind(right.kind()));
            }
        }
        Ok(())
    }

    /// Emits inserts for `nodes` starting at `out_idx`; returns the next
    /// output position.
    fn insert_all(&self, nodes: &[Node], mut out_idx: usize, ops: &mut Vec<Op>) -> Result<usize> {
        for node in nodes {
            ops.push(self.insert_op(node, out_idx)?);
            out_idx += 1;
        }
        Ok(out_idx)
    }

    /// Builds the insert for one node by diffing it against an empty node of
    /// the same kind.
    fn insert_op(&self, node: &Node, out_idx: usize) -> Result<Op> {
        let kind = InsertKind::from_node_kind(node.kind())
            .ok_or(Error::UnsupportedNodeKind(node.kind()))?;

        let children = match node {
            Node::Element(_) => self.diff_container(&node.empty_like(), node)?,
            _ => match node.value() {
                Some(Some(value)) => vec![Op::Value {
                    index: 0,
                    content: Some(value.to_string()),
                }],
                _ => Vec::new(),
            },
        };

        Ok(Op::Insert {
            index: out_idx,
            kind,
            name: node.name().map(str::to_string),
            children,
        })
    }

    /// Removes (transform) or keeps (merge) left-only nodes; returns the next
    /// output position.
    fn skip_all(&self, nodes: &[Node], out_idx: usize, ops: &mut Vec<Op>) -> usize {
        match self.mode {
            DiffMode::Transform => {
                for node in nodes {
                    ops.push(Op::Remove {
                        index: out_idx,
                        name: node.name().map(str::to_string),
                    });
                }
                out_idx
            }
            DiffMode::Merge => out_idx + nodes.len(),
        }
    }
}

/// Attribute removals (sorted by name) followed by attribute sets (sorted
/// by name). Equal values produce nothing.
fn attribute_ops(left: &Node, right: &Node) -> Vec<Op> {
    let (Node::Element(left), Node::Element(right)) = (left, right) else {
        return Vec::new();
    };

    let removed = left
        .attributes()
        .keys()
        .filter(|name| !right.attributes().contains_key(*name))
        .map(|name| Op::Attr {
            name: name.clone(),
            value: None,
        });

    let set = right
        .attributes()
        .iter()
        .filter(|(name, value)| left.attributes().get(*name) != Some(*value))
        .map(|(name, value)| Op::Attr {
            name: name.clone(),
            value: Some(value.clone()),
        });

    removed.chain(set).collect()
}

fn check_roots(left: &Node, right: &Node) -> Result<()> {
    for root in [left, right] {
        if !root.is_container() {
            return Err(Error::UnsupportedNodeKind(root.kind()));
        }
    }
    match (left, right) {
        (Node::Document(_), Node::Document(_)) => Ok(()),
        (Node::Element(_), Node::Element(_)) if is_compatible(left, right) => Ok(()),
        (Node::Element(l), _) => Err(Error::mismatch(0, l.name(), right)),
        _ => Err(Error::mismatch(0, "a Document node", right)),
    }
}

fn check_supported(nodes: &[Node]) -> Result<()> {
    match nodes
        .iter()
        .find(|n| n.kind().is_unsupported() || matches!(n, Node::Document(_)))
    {
        Some(node) => Err(Error::UnsupportedNodeKind(node.kind())),
        None => Ok(()),
    }
}

/// Computes the script that turns `left` into `right` under `mode`.
pub fn diff(left: &Node, right: &Node, mode: DiffMode) -> Result<EditScript> {
    Diff::new(mode).diff(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Element, NodeKind, ProcessingInstruction};

    fn doc(children: Vec<Node>) -> Node {
        Node::document(children)
    }

    fn transform(left: &Node, right: &Node) -> Vec<Op> {
        diff(left, right, DiffMode::Transform).unwrap().into_ops()
    }

    #[test]
    fn test_identical_trees() {
        let tree = doc(vec![Element::new("r")
            .with_attr("a", "1")
            .with_child(Node::text("t"))
            .with_child(Node::comment("c"))
            .into()]);
        assert!(transform(&tree, &tree).is_empty());
        assert!(diff(&tree, &tree, DiffMode::Merge).unwrap().is_empty());
    }

    #[test]
    fn test_attribute_ops_order() {
        let left = doc(vec![Element::new("e")
            .with_attr("a", "1")
            .with_attr("b", "2")
            .into()]);
        let right = doc(vec![Element::new("e")
            .with_attr("b", "2")
            .with_attr("c", "3")
            .into()]);
        assert_eq!(
            transform(&left, &right),
            vec![Op::Change {
                index: 0,
                name: Some("e".into()),
                children: vec![
                    Op::Attr {
                        name: "a".into(),
                        value: None
                    },
                    Op::Attr {
                        name: "c".into(),
                        value: Some("3".into())
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_root_attributes_are_top_level() {
        let left: Node = Element::new("r").with_attr("v", "1").into();
        let right: Node = Element::new("r").with_attr("v", "2").into();
        assert_eq!(
            transform(&left, &right),
            vec![Op::Attr {
                name: "v".into(),
                value: Some("2".into())
            }]
        );
    }

    #[test]
    fn test_text_change_emits_value() {
        let left: Node = Element::new("r").with_child(Node::text("old")).into();
        let right: Node = Element::new("r").with_child(Node::text("new")).into();
        assert_eq!(
            transform(&left, &right),
            vec![Op::Value {
                index: 0,
                content: Some("new".into())
            }]
        );
    }

    #[test]
    fn test_null_vs_empty_value() {
        let left: Node = Element::new("r").with_child(Node::Text(None)).into();
        let right: Node = Element::new("r").with_child(Node::text("")).into();
        assert_eq!(
            transform(&left, &right),
            vec![Op::Value {
                index: 0,
                content: Some(String::new())
            }]
        );
        assert_eq!(
            transform(&right, &left),
            vec![Op::Value {
                index: 0,
                content: None
            }]
        );
    }

    #[test]
    fn test_rename_is_remove_then_insert() {
        let left: Node = Element::new("r")
            .with_child(Node::element("a"))
            .with_child(Node::element("b"))
            .into();
        let right: Node = Element::new("r")
            .with_child(Node::element("a"))
            .with_child(Node::element("c"))
            .into();
        assert_eq!(
            transform(&left, &right),
            vec![
                Op::Remove {
                    index: 1,
                    name: Some("b".into())
                },
                Op::Insert {
                    index: 1,
                    kind: InsertKind::Element,
                    name: Some("c".into()),
                    children: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_removes_do_not_advance() {
        let left: Node = Element::new("r")
            .with_child(Node::element("x"))
            .with_child(Node::element("y"))
            .with_child(Node::element("k"))
            .into();
        let right: Node = Element::new("r").with_child(Node::element("k")).into();
        assert_eq!(
            transform(&left, &right),
            vec![
                Op::Remove {
                    index: 0,
                    name: Some("x".into())
                },
                Op::Remove {
                    index: 0,
                    name: Some("y".into())
                },
            ]
        );
    }

    #[test]
    fn test_merge_keeps_left_only_nodes() {
        let left: Node = Element::new("r")
            .with_child(Node::element("x"))
            .with_child(Node::element("k"))
            .into();
        let right: Node = Element::new("r")
            .with_child(Node::element("k"))
            .with_child(Node::element("n"))
            .into();
        let ops = diff(&left, &right, DiffMode::Merge).unwrap().into_ops();
        assert_eq!(
            ops,
            vec![Op::Insert {
                index: 2,
                kind: InsertKind::Element,
                name: Some("n".into()),
                children: vec![],
            }]
        );
    }

    #[test]
    fn test_insert_builds_subtree() {
        let left: Node = Element::new("r").into();
        let right: Node = Element::new("r")
            .with_child(
                Element::new("n")
                    .with_attr("k", "v")
                    .with_child(Node::comment("note"))
                    .into(),
            )
            .into();
        assert_eq!(
            transform(&left, &right),
            vec![Op::Insert {
                index: 0,
                kind: InsertKind::Element,
                name: Some("n".into()),
                children: vec![
                    Op::Attr {
                        name: "k".into(),
                        value: Some("v".into())
                    },
                    Op::Insert {
                        index: 0,
                        kind: InsertKind::Comment,
                        name: None,
                        children: vec![Op::Value {
                            index: 0,
                            content: Some("note".into())
                        }],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_text_inserted_before_element() {
        let left: Node = Element::new("r").with_child(Node::element("a")).into();
        let right: Node = Element::new("r")
            .with_child(Node::text("x"))
            .with_child(Node::element("a"))
            .into();
        assert_eq!(
            transform(&left, &right),
            vec![Op::Insert {
                index: 0,
                kind: InsertKind::Text,
                name: None,
                children: vec![Op::Value {
                    index: 0,
                    content: Some("x".into())
                }],
            }]
        );
    }

    #[test]
    fn test_root_name_mismatch() {
        let err = diff(&Node::element("a"), &Node::element("b"), DiffMode::Transform).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }), "got: {:?}", err);
    }

    #[test]
    fn test_leaf_root_unsupported() {
        let err = diff(&Node::text("a"), &Node::text("b"), DiffMode::Transform).unwrap_err();
        assert!(matches!(err, Error::UnsupportedNodeKind(NodeKind::Text)));
    }

    #[test]
    fn test_processing_instruction_unsupported() {
        let left = doc(vec![Node::element("r")]);
        let right = doc(vec![
            Node::ProcessingInstruction(ProcessingInstruction::new("pi", "x")),
            Node::element("r"),
        ]);
        let err = diff(&left, &right, DiffMode::Transform).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedNodeKind(NodeKind::ProcessingInstruction)
        ));
    }

    #[test]
    fn test_does_not_mutate_inputs() {
        let left: Node = Element::new("r").with_child(Node::element("a")).into();
        let right: Node = Element::new("r").with_child(Node::element("b")).into();
        let (l, r) = (left.clone(), right.clone());
        let _ = transform(&left, &right);
        assert_eq!(left, l);
        assert_eq!(right, r);
    }
}
