//! XML parser that builds node trees.
//!
//! Uses quick-xml's streaming API. Adjacent character data (including
//! resolved entity references) is merged into a single text node; CDATA
//! sections, comments, processing instructions and the DOCTYPE each become
//! their own node. The XML declaration is dropped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};
use crate::node::{DocumentType, Element, Node, ProcessingInstruction};

/// Options for XML parsing.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keep text nodes that consist only of whitespace.
    pub keep_whitespace: bool,
}

/// XML parser that builds node trees.
#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    options: ParseOptions,
}

impl XmlParser {
    /// Creates a new parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        XmlParser { options }
    }

    /// Parses XML from a string.
    pub fn parse_str(&self, xml: &str) -> Result<Node> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Node> {
        let path = path.as_ref();
        debug!(path = %path.display(), "parsing document");
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a quick-xml Reader into a `Document` node.
    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<Node> {
        let mut builder = TreeBuilder::new(self.options.keep_whitespace);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    builder.flush_text();
                    builder.open(parse_element(e)?);
                }
                Ok(Event::End(_)) => {
                    builder.flush_text();
                    builder.close()?;
                }
                Ok(Event::Empty(ref e)) => {
                    builder.flush_text();
                    builder.append(Node::Element(parse_element(e)?));
                }
                Ok(Event::Text(e)) => {
                    let raw = std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.push_text(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name = std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    let entity = format!("&{};", name);
                    let resolved = unescape(&entity).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.push_text(&resolved);
                }
                Ok(Event::CData(e)) => {
                    builder.flush_text();
                    let text = std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.append(Node::cdata(text));
                }
                Ok(Event::Comment(e)) => {
                    builder.flush_text();
                    let text = std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.append(Node::comment(text));
                }
                Ok(Event::PI(e)) => {
                    builder.flush_text();
                    let raw = std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.append(Node::ProcessingInstruction(split_pi(raw)));
                }
                Ok(Event::DocType(e)) => {
                    builder.flush_text();
                    let raw = std::str::from_utf8(&e).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.append(Node::DocumentType(DocumentType::new(raw.trim())));
                }
                Ok(Event::Decl(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
            }
            buf.clear();
        }

        builder.finish()
    }
}

/// Stack of open containers, bottom is the document.
struct TreeBuilder {
    stack: Vec<Element>,
    document: Vec<Node>,
    pending_text: Option<String>,
    keep_whitespace: bool,
}

impl TreeBuilder {
    fn new(keep_whitespace: bool) -> Self {
        TreeBuilder {
            stack: Vec::new(),
            document: Vec::new(),
            pending_text: None,
            keep_whitespace,
        }
    }

    fn push_text(&mut self, text: &str) {
        self.pending_text
            .get_or_insert_with(String::new)
            .push_str(text);
    }

    fn flush_text(&mut self) {
        if let Some(text) = self.pending_text.take() {
            if self.keep_whitespace || !text.trim().is_empty() {
                self.append(Node::Text(Some(text)));
            }
        }
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children_mut().push(node),
            None => self.document.push(node),
        }
    }

    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn close(&mut self) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| Error::Parse("unexpected end tag".to_string()))?;
        self.append(Node::Element(element));
        Ok(())
    }

    fn finish(mut self) -> Result<Node> {
        self.flush_text();
        if let Some(open) = self.stack.last() {
            return Err(Error::Parse(format!("unclosed element <{}>", open.name())));
        }
        Ok(Node::Document(self.document))
    }
}

/// Parses an element's name and attributes.
fn parse_element(e: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| Error::Parse(e.to_string()))?
        .to_string();

    let mut attributes = BTreeMap::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        attributes.insert(key, value);
    }

    let mut element = Element::new(name);
    *element.attributes_mut() = attributes;
    Ok(element)
}

/// Splits the body of `<?target data?>` into target and data.
fn split_pi(raw: &str) -> ProcessingInstruction {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((target, data)) => ProcessingInstruction::new(target, data.trim_start()),
        None => ProcessingInstruction::new(raw, ""),
    }
}

/// Parses an XML file into a `Document` node.
pub fn parse_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Node> {
    XmlParser::new(options.clone()).parse_file(path)
}

/// Parses an XML string into a `Document` node.
pub fn parse_str(xml: &str, options: &ParseOptions) -> Result<Node> {
    XmlParser::new(options.clone()).parse_str(xml)
}
