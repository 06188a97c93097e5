//! Error types for xmldelta.

use thiserror::Error;

use crate::node::{Node, NodeKind};

/// Result type alias for xmldelta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while diffing, patching or decoding.
///
/// Every error is fatal for the call in progress. A failed patch is not
/// rolled back: ops applied before the failing one stay applied.
#[derive(Error, Debug)]
pub enum Error {
    /// The node found at `index` does not carry the name the op expects.
    #[error("structural mismatch at index {index}: expected {expected}, found {found}")]
    StructuralMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    /// Diff or patch reached a node kind it cannot handle.
    #[error("unsupported node kind: {0}")]
    UnsupportedNodeKind(NodeKind),

    /// An op is unknown, incomplete, or cannot apply to its target.
    #[error("malformed op: {0}")]
    MalformedOp(String),

    /// An op addressed a child position past the end of the child list.
    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    pub(crate) fn mismatch(index: usize, expected: &str, found: &Node) -> Self {
        let found = match found.name() {
            Some(name) => name.to_string(),
            None => format!("a {} node", found.kind()),
        };
        Error::StructuralMismatch {
            index,
            expected: expected.to_string(),
            found,
        }
    }
}
