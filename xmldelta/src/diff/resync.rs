//! Resynchronization of two diverging sibling sequences.
//!
//! When the current left and right siblings cannot be related by a change,
//! the diff engine asks for the nearest pair of nodes further along that
//! can. Everything skipped on the left is removed (or kept, in merge mode)
//! and everything skipped on the right is inserted.

use crate::node::Node;

/// Returns true if two nodes can be related by a change rather than a
/// remove/insert pair: same kind, and same tag name for elements.
pub fn is_compatible(left: &Node, right: &Node) -> bool {
    match (left, right) {
        (Node::Element(a), Node::Element(b)) => a.name() == b.name(),
        _ => left.kind() == right.kind(),
    }
}

/// Finds the compatible pair `(skip_left, skip_right)` with the smallest
/// combined skip `skip_left + skip_right`.
///
/// Ties on the combined skip go to the smallest `skip_left`. Returns `None`
/// when no left node is compatible with any right node.
///
/// The search walks anti-diagonals of the `left × right` grid, so it costs
/// `O(left.len() × right.len())` when nothing matches.
pub fn find_nearest_match<F>(left: &[Node], right: &[Node], compatible: F) -> Option<(usize, usize)>
where
    F: Fn(&Node, &Node) -> bool,
{
    if left.is_empty() || right.is_empty() {
        return None;
    }

    let max_total = left.len() + right.len() - 2;
    for total in 0..=max_total {
        let first = total.saturating_sub(right.len() - 1);
        let last = total.min(left.len() - 1);
        for skip_left in first..=last {
            let skip_right = total - skip_left;
            if compatible(&left[skip_left], &right[skip_right]) {
                return Some((skip_left, skip_right));
            }
        }
    }

    None
}
