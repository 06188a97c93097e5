//! Diff and patch algorithms for document trees.
//!
//! [`Diff`] compares two trees and produces an [`EditScript`]; [`Patch`]
//! replays a script against a tree. In [`DiffMode::Transform`],
//! `patch(left, diff(left, right))` reproduces `right` exactly.
//!
//! [`EditScript`]: crate::script::EditScript

mod generator;
mod patch;
pub mod resync;

pub use generator::{diff, Diff, DiffMode};
pub use patch::{patch, Patch};
pub use resync::{find_nearest_match, is_compatible};
