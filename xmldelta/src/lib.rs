//! xmldelta - ordered tree diff and patch for XML-like documents
//!
//! This library compares two ordered trees and produces an edit script that
//! transforms one into the other, applies such scripts to trees, and renders
//! them as human-readable change reports.
//!
//! # Overview
//!
//! Trees are made of [`Node`]s: documents, elements with attributes, text,
//! CDATA sections and comments. Sibling lists are compared position by
//! position; when two siblings cannot be paired, the nearest point where the
//! lists line up again is located and the nodes skipped on the way become
//! removals and insertions.
//!
//! Edit scripts have a stable XML encoding (see [`script::codec`]) so they
//! can be stored, exchanged and patched later.
//!
//! # Modes
//!
//! - [`DiffMode::Transform`]: `patch(left, diff(left, right))` yields `right`.
//! - [`DiffMode::Merge`]: nothing is removed; nodes that only exist on the
//!   left survive, so the result carries the union of both trees.
//!
//! # Example
//!
//! ```
//! use xmldelta::{diff, parse_str, patch, DiffMode, ParseOptions};
//!
//! let options = ParseOptions::default();
//! let mut left = parse_str("<doc><a/><b>old</b></doc>", &options).unwrap();
//! let right = parse_str("<doc><b>new</b><c/></doc>", &options).unwrap();
//!
//! let script = diff(&left, &right, DiffMode::Transform).unwrap();
//! patch(&mut left, &script).unwrap();
//! assert_eq!(left, right);
//! ```

pub mod diff;
pub mod error;
pub mod node;
pub mod report;
pub mod script;
pub mod xml;

pub use diff::{diff, patch, Diff, DiffMode, Patch};
pub use error::{Error, Result};
pub use node::{DocumentType, Element, Node, NodeKind, ProcessingInstruction};
pub use report::{report, Reporter};
pub use script::{EditScript, InsertKind, Op};
pub use xml::{parse_file, parse_str, print_to_string, ParseOptions, PrintOptions};
