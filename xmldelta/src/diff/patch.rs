//! Patch application algorithm.
//!
//! Replays an edit script against a live tree, in order, mutating it in
//! place. Indices in the script already account for every earlier op, so no
//! rebasing happens here.
//!
//! Application is not transactional: when an op fails, the ops before it
//! remain applied. Clone the tree first if the original must survive.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::node::{Element, Node};
use crate::script::{EditScript, InsertKind, Op};

/// Patch application for edit scripts.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    _placeholder: (),
}

impl Patch {
    /// Creates a new patch applicator.
    pub fn new() -> Self {
        Patch { _placeholder: () }
    }

    /// Applies `script` to `tree`.
    ///
    /// Takes the tree by exclusive reference for the whole run; nothing else
    /// can observe it half-patched.
    pub fn apply(&self, tree: &mut Node, script: &EditScript) -> Result<()> {
        if !tree.is_container() {
            return Err(Error::UnsupportedNodeKind(tree.kind()));
        }
        debug!(ops = script.op_count(), "patch started");
        self.apply_ops(tree, script.ops())?;
        debug!("patch finished");
        Ok(())
    }

    fn apply_ops(&self, target: &mut Node, ops: &[Op]) -> Result<()> {
        for op in ops {
            self.apply_op(target, op)?;
        }
        Ok(())
    }

    fn apply_op(&self, target: &mut Node, op: &Op) -> Result<()> {
        trace!(op = op.tag(), index = ?op.index(), target = %target.kind(), "applying op");

        match op {
            Op::Attr { name, value } => match target {
                Node::Element(element) => {
                    element.set_attribute(name, value.as_deref());
                    Ok(())
                }
                other => Err(Error::MalformedOp(format!(
                    "cannot set attribute {:?} on a {} node",
                    name,
                    other.kind()
                ))),
            },

            Op::Value { index, content } => {
                // The nested value of an inserted leaf sets the leaf itself.
                if let Some(slot) = target.value_mut() {
                    *slot = content.clone();
                    return Ok(());
                }

                let children = child_list(target, op)?;
                let len = children.len();
                match children.get_mut(*index) {
                    Some(child) => set_value(child, *index, content),
                    None if *index == len => {
                        children.push(Node::Text(content.clone()));
                        Ok(())
                    }
                    None => Err(Error::IndexOutOfRange { index: *index, len }),
                }
            }

            Op::Remove { index, name } => {
                let children = child_list(target, op)?;
                let child = children.get(*index).ok_or(Error::IndexOutOfRange {
                    index: *index,
                    len: children.len(),
                })?;
                check_target(child, *index, name.as_deref())?;
                children.remove(*index);
                Ok(())
            }

            Op::Insert {
                index,
                kind,
                name,
                children: nested,
            } => {
                let node = new_node(*kind, name.as_deref())?;
                let children = child_list(target, op)?;
                if *index > children.len() {
                    return Err(Error::IndexOutOfRange {
                        index: *index,
                        len: children.len(),
                    });
                }
                children.insert(*index, node);
                self.apply_ops(&mut children[*index], nested)
            }

            Op::Change {
                index,
                name,
                children: nested,
            } => {
                let children = child_list(target, op)?;
                let len = children.len();
                let child = children
                    .get_mut(*index)
                    .ok_or(Error::IndexOutOfRange { index: *index, len })?;
                check_target(child, *index, name.as_deref())?;
                self.apply_ops(child, nested)
            }
        }
    }
}

/// Returns the child list an indexed op works on.
fn child_list<'a>(target: &'a mut Node, op: &Op) -> Result<&'a mut Vec<Node>> {
    let kind = target.kind();
    target.children_mut().ok_or_else(|| {
        Error::MalformedOp(format!(
            "<{}> cannot apply beneath a {} node",
            op.tag(),
            kind
        ))
    })
}

/// Verifies the node an op is about to remove or descend into.
fn check_target(child: &Node, index: usize, expected: Option<&str>) -> Result<()> {
    if child.kind().is_unsupported() {
        return Err(Error::UnsupportedNodeKind(child.kind()));
    }
    match expected {
        Some(name) if child.name() != Some(name) => Err(Error::mismatch(index, name, child)),
        _ => Ok(()),
    }
}

fn set_value(child: &mut Node, index: usize, content: &Option<String>) -> Result<()> {
    if child.kind().is_unsupported() {
        return Err(Error::UnsupportedNodeKind(child.kind()));
    }
    match child.value_mut() {
        Some(slot) => {
            *slot = content.clone();
            Ok(())
        }
        None => Err(Error::mismatch(index, "a text, CDATA or comment node", child)),
    }
}

fn new_node(kind: InsertKind, name: Option<&str>) -> Result<Node> {
    let node = match kind {
        InsertKind::Element => {
            let name = name.ok_or_else(|| {
                Error::MalformedOp("<Insert> of an Element requires a name".to_string())
            })?;
            Node::Element(Element::new(name))
        }
        InsertKind::Comment => Node::Comment(None),
        InsertKind::Text => Node::Text(None),
        InsertKind::CData => Node::CData(None),
    };
    Ok(node)
}

/// Applies `script` to `tree` in place.
pub fn patch(tree: &mut Node, script: &EditScript) -> Result<()> {
    Patch::new().apply(tree, script)
}
