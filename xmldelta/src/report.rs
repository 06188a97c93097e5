//! Human-readable change reports.
//!
//! Walks an edit script and prints one line per effective op. `Change` ops
//! only extend the path; every other op produces a line, and the ops nested
//! in an `Insert` are reported beneath the inserted node.
//!
//! Paths are built from `name[index]` segments, or `[index]` for nodes
//! without a name. Attributes appear as `@name`. For example:
//!
//! ```text
//! /catalog[0]/book[2]/@lang: set to "en"
//! /catalog[0]/book[3]: removed
//! /catalog[0]/[1]: value set to "In stock"
//! ```

use std::io::Write;

use crate::script::{EditScript, InsertKind, Op};

/// Renders an edit script as text.
#[derive(Debug, Default)]
pub struct Reporter {
    lines: Vec<String>,
}

impl Reporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the report lines for `script`.
    pub fn report(mut self, script: &EditScript) -> Vec<String> {
        self.walk(script.ops(), "", false);
        self.lines
    }

    /// `leaf` is set while inside an inserted text-like node, whose nested
    /// `Value` applies to the node itself.
    fn walk(&mut self, ops: &[Op], path: &str, leaf: bool) {
        for op in ops {
            match op {
                Op::Change {
                    index,
                    name,
                    children,
                } => {
                    let path = child_path(path, name.as_deref(), *index);
                    self.walk(children, &path, false);
                }
                Op::Insert {
                    index,
                    kind,
                    name,
                    children,
                } => {
                    let path = child_path(path, name.as_deref(), *index);
                    self.lines
                        .push(format!("{}: inserted {}", path, describe_insert(*kind)));
                    self.walk(children, &path, *kind != InsertKind::Element);
                }
                Op::Remove { index, name } => {
                    let path = child_path(path, name.as_deref(), *index);
                    self.lines.push(format!("{}: removed", path));
                }
                Op::Value { index, content } => {
                    let target = if leaf {
                        path.to_string()
                    } else {
                        child_path(path, None, *index)
                    };
                    self.lines
                        .push(format!("{}: value set to {}", target, describe(content)));
                }
                Op::Attr { name, value } => {
                    let line = match value {
                        Some(_) => format!("{}/@{}: set to {}", path, name, describe(value)),
                        None => format!("{}/@{}: removed", path, name),
                    };
                    self.lines.push(line);
                }
            }
        }
    }
}

fn child_path(parent: &str, name: Option<&str>, index: usize) -> String {
    format!("{}/{}[{}]", parent, name.unwrap_or(""), index)
}

fn describe(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => "null".to_string(),
    }
}

fn describe_insert(kind: InsertKind) -> &'static str {
    match kind {
        InsertKind::Element => "element",
        InsertKind::Comment => "comment",
        InsertKind::Text => "text",
        InsertKind::CData => "CDATA section",
    }
}

/// Renders `script` as newline-terminated lines.
pub fn report(script: &EditScript) -> String {
    Reporter::new()
        .report(script)
        .into_iter()
        .map(|line| line + "\n")
        .collect()
}

/// Writes the report for `script` to `writer`.
pub fn write_report<W: Write>(script: &EditScript, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(report(script).as_bytes())
}
