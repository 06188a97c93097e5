//! XML printer that outputs node trees.
//!
//! Attributes are written in sorted order and childless elements as `<e/>`,
//! so printing is deterministic for a given tree.

use std::io::Write;

use crate::node::Node;

use super::{escape_attribute, escape_text};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Options for XML printing.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Indent elements that hold only markup children.
    pub pretty: bool,
    /// Emit the XML declaration first.
    pub declaration: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            pretty: false,
            declaration: true,
        }
    }
}

/// XML printer that outputs node trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: PrintOptions,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer.
    pub fn new(writer: W, options: PrintOptions) -> Self {
        XmlPrinter { writer, options }
    }

    /// Prints a node tree to the output.
    pub fn print(&mut self, root: &Node) -> std::io::Result<()> {
        let text = render(root, &self.options);
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn render(root: &Node, options: &PrintOptions) -> String {
    let mut out = String::new();
    if options.declaration {
        out.push_str(DECLARATION);
        out.push('\n');
    }
    match root {
        Node::Document(children) => {
            for child in children {
                write_node(&mut out, child, 0, options.pretty);
                if options.pretty {
                    out.push('\n');
                }
            }
        }
        other => {
            write_node(&mut out, other, 0, options.pretty);
            if options.pretty {
                out.push('\n');
            }
        }
    }
    if !options.pretty {
        out.push('\n');
    }
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize, pretty: bool) {
    match node {
        Node::Document(children) => {
            for child in children {
                write_node(out, child, depth, pretty);
            }
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(element.name());
            for (name, value) in element.attributes() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }

            let children = element.children();
            if children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');

            // Mixed content is written inline so no whitespace is invented.
            let block = pretty && !children.iter().any(is_character_data);
            for child in children {
                if block {
                    out.push('\n');
                    out.push_str(&indent_str_for(depth + 1));
                }
                write_node(out, child, depth + 1, block);
            }
            if block {
                out.push('\n');
                out.push_str(&indent_str_for(depth));
            }

            out.push_str("</");
            out.push_str(element.name());
            out.push('>');
        }
        Node::Text(value) => {
            if let Some(text) = value {
                out.push_str(&escape_text(text));
            }
        }
        Node::CData(value) => {
            out.push_str("<![CDATA[");
            if let Some(text) = value {
                out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
            }
            out.push_str("]]>");
        }
        Node::Comment(value) => {
            out.push_str("<!--");
            out.push_str(value.as_deref().unwrap_or(""));
            out.push_str("-->");
        }
        Node::ProcessingInstruction(pi) => {
            out.push_str("<?");
            out.push_str(pi.target());
            if !pi.data().is_empty() {
                out.push(' ');
                out.push_str(pi.data());
            }
            out.push_str("?>");
        }
        Node::DocumentType(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype.text());
            out.push('>');
        }
    }
}

fn is_character_data(node: &Node) -> bool {
    matches!(node, Node::Text(_) | Node::CData(_))
}

fn indent_str_for(level: usize) -> String {
    "  ".repeat(level)
}

/// Prints a node tree to a string.
pub fn print_to_string(root: &Node, options: &PrintOptions) -> String {
    render(root, options)
}
