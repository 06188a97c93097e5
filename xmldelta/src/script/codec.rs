//! XML encoding of edit scripts.
//!
//! Each op becomes an element named after its kind inside a `<root>`
//! container. For `Value` and `Attr` the element content is the value: a
//! self-closing element means `None`, an open/close pair with no text in
//! between means `Some("")`. Decoding keeps that distinction exactly.

use std::collections::BTreeMap;
use std::io::Write;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{
    EditScript, InsertKind, Op, ATTR_TAG, CHANGE_TAG, IDX_ATTR, INSERT_TAG, NAME_ATTR,
    NODE_TYPE_ATTR, REMOVE_TAG, SCRIPT_ROOT_TAG, VALUE_TAG,
};
use crate::error::{Error, Result};
use crate::xml::escape_text;

/// Encodes a script to a string.
pub fn encode(script: &EditScript) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if script.is_empty() {
        out.push_str(&format!("<{}/>\n", SCRIPT_ROOT_TAG));
        return out;
    }
    out.push_str(&format!("<{}>\n", SCRIPT_ROOT_TAG));
    for op in script.ops() {
        write_op(&mut out, op, 1);
    }
    out.push_str(&format!("</{}>\n", SCRIPT_ROOT_TAG));
    out
}

/// Encodes a script to a writer.
pub fn write_script<W: Write>(script: &EditScript, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(encode(script).as_bytes())?;
    writer.flush()
}

fn write_op(out: &mut String, op: &Op, depth: usize) {
    let indent = indent_str_for(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(op.tag());

    match op {
        Op::Value { index, content } => {
            push_attr(out, IDX_ATTR, &index.to_string());
            push_content(out, op.tag(), content.as_deref());
        }
        Op::Attr { name, value } => {
            push_attr(out, NAME_ATTR, name);
            push_content(out, op.tag(), value.as_deref());
        }
        Op::Remove { index, name } => {
            push_attr(out, IDX_ATTR, &index.to_string());
            if let Some(name) = name {
                push_attr(out, NAME_ATTR, name);
            }
            out.push_str("/>\n");
        }
        Op::Insert {
            index,
            kind,
            name,
            children,
        } => {
            push_attr(out, IDX_ATTR, &index.to_string());
            push_attr(out, NODE_TYPE_ATTR, kind.as_str());
            if let Some(name) = name {
                push_attr(out, NAME_ATTR, name);
            }
            push_children(out, op.tag(), children, depth);
        }
        Op::Change {
            index,
            name,
            children,
        } => {
            push_attr(out, IDX_ATTR, &index.to_string());
            if let Some(name) = name {
                push_attr(out, NAME_ATTR, name);
            }
            push_children(out, op.tag(), children, depth);
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_text(value));
    out.push('"');
}

fn push_content(out: &mut String, tag: &str, content: Option<&str>) {
    match content {
        None => out.push_str("/>\n"),
        Some(text) => {
            out.push('>');
            out.push_str(&escape_text(text));
            out.push_str("</");
            out.push_str(tag);
            out.push_str(">\n");
        }
    }
}

fn push_children(out: &mut String, tag: &str, children: &[Op], depth: usize) {
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in children {
        write_op(out, child, depth + 1);
    }
    out.push_str(&indent_str_for(depth));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn indent_str_for(level: usize) -> String {
    "  ".repeat(level)
}

/// Decodes a script from a string.
pub fn decode(xml: &str) -> Result<EditScript> {
    let mut decoder = Decoder {
        reader: Reader::from_str(xml),
    };
    decoder.reader.config_mut().trim_text_start = false;
    decoder.reader.config_mut().trim_text_end = false;
    decoder.read_script().map(EditScript::from_ops)
}

struct Decoder<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Decoder<'a> {
    fn read_script(&mut self) -> Result<Vec<Op>> {
        let mut ops = None;
        loop {
            match self.next_event()? {
                Event::Start(e) => {
                    self.expect_root(&e, ops.is_some())?;
                    ops = Some(self.read_ops()?);
                }
                Event::Empty(e) => {
                    self.expect_root(&e, ops.is_some())?;
                    ops = Some(Vec::new());
                }
                Event::Text(t) => {
                    if !is_whitespace(&t) {
                        return Err(Error::Parse("text outside the script root".to_string()));
                    }
                }
                Event::End(_) | Event::CData(_) | Event::GeneralRef(_) => {
                    return Err(Error::Parse("content outside the script root".to_string()));
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
                Event::Eof => break,
            }
        }
        ops.ok_or_else(|| Error::Parse("missing script root element".to_string()))
    }

    fn expect_root(&self, e: &BytesStart<'_>, seen: bool) -> Result<()> {
        let tag = element_name(e)?;
        if seen {
            return Err(Error::Parse("more than one script root element".to_string()));
        }
        if tag != SCRIPT_ROOT_TAG {
            return Err(Error::Parse(format!(
                "invalid root tag for edit script: {}",
                tag
            )));
        }
        Ok(())
    }

    /// Reads op elements until the enclosing element closes.
    fn read_ops(&mut self) -> Result<Vec<Op>> {
        let mut ops = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) => ops.push(self.read_op(&e, false)?),
                Event::Empty(e) => ops.push(self.read_op(&e, true)?),
                Event::End(_) => return Ok(ops),
                Event::Text(t) => {
                    if !is_whitespace(&t) {
                        return Err(Error::MalformedOp(
                            "unexpected text between ops".to_string(),
                        ));
                    }
                }
                Event::CData(_) | Event::GeneralRef(_) => {
                    return Err(Error::MalformedOp(
                        "unexpected text between ops".to_string(),
                    ));
                }
                Event::Comment(_) | Event::PI(_) => {}
                Event::Decl(_) | Event::DocType(_) => {
                    return Err(Error::Parse("unexpected declaration in script".to_string()));
                }
                Event::Eof => return Err(Error::Parse("unexpected end of script".to_string())),
            }
        }
    }

    fn read_op(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<Op> {
        let tag = element_name(e)?;
        let mut attrs = read_attributes(e)?;

        let op = match tag.as_str() {
            VALUE_TAG => Op::Value {
                index: required_index(&attrs, &tag)?,
                content: self.read_optional_content(empty)?,
            },
            ATTR_TAG => {
                let name = attrs.remove(NAME_ATTR).ok_or_else(|| {
                    Error::MalformedOp(format!("<{}> is missing the {} attribute", tag, NAME_ATTR))
                })?;
                Op::Attr {
                    name,
                    value: self.read_optional_content(empty)?,
                }
            }
            REMOVE_TAG => {
                let index = required_index(&attrs, &tag)?;
                if !empty && !self.read_ops()?.is_empty() {
                    return Err(Error::MalformedOp("<Remove> cannot contain ops".to_string()));
                }
                Op::Remove {
                    index,
                    name: attrs.remove(NAME_ATTR),
                }
            }
            INSERT_TAG => {
                let index = required_index(&attrs, &tag)?;
                let kind = attrs
                    .get(NODE_TYPE_ATTR)
                    .ok_or_else(|| {
                        Error::MalformedOp(format!(
                            "<{}> is missing the {} attribute",
                            tag, NODE_TYPE_ATTR
                        ))
                    })
                    .and_then(|v| {
                        InsertKind::parse(v).ok_or_else(|| {
                            Error::MalformedOp(format!("unknown node_type {:?}", v))
                        })
                    })?;
                Op::Insert {
                    index,
                    kind,
                    name: attrs.remove(NAME_ATTR),
                    children: self.read_optional_ops(empty)?,
                }
            }
            CHANGE_TAG => Op::Change {
                index: required_index(&attrs, &tag)?,
                name: attrs.remove(NAME_ATTR),
                children: self.read_optional_ops(empty)?,
            },
            other => return Err(Error::MalformedOp(format!("unknown op <{}>", other))),
        };

        Ok(op)
    }

    fn read_optional_ops(&mut self, empty: bool) -> Result<Vec<Op>> {
        if empty {
            Ok(Vec::new())
        } else {
            self.read_ops()
        }
    }

    fn read_optional_content(&mut self, empty: bool) -> Result<Option<String>> {
        if empty {
            Ok(None)
        } else {
            self.read_content().map(Some)
        }
    }

    /// Reads the text content of a value element up to its end tag.
    fn read_content(&mut self) -> Result<String> {
        let mut content = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => {
                    let raw = std::str::from_utf8(&t).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    content.push_str(&text);
                }
                Event::GeneralRef(r) => {
                    let name = std::str::from_utf8(&r).map_err(|e| Error::Parse(e.to_string()))?;
                    let entity = format!("&{};", name);
                    let resolved = unescape(&entity).map_err(|e| Error::Parse(e.to_string()))?;
                    content.push_str(&resolved);
                }
                Event::CData(c) => {
                    let text = std::str::from_utf8(&c).map_err(|e| Error::Parse(e.to_string()))?;
                    content.push_str(text);
                }
                Event::End(_) => return Ok(content),
                Event::Comment(_) | Event::PI(_) => {}
                Event::Start(_) | Event::Empty(_) => {
                    return Err(Error::MalformedOp(
                        "value content cannot contain elements".to_string(),
                    ));
                }
                Event::Decl(_) | Event::DocType(_) => {
                    return Err(Error::Parse("unexpected declaration in script".to_string()));
                }
                Event::Eof => return Err(Error::Parse("unexpected end of script".to_string())),
            }
        }
    }

    fn next_event(&mut self) -> Result<Event<'a>> {
        Ok(self.reader.read_event()?)
    }
}

fn element_name(e: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|e| Error::Parse(e.to_string()))
}

fn read_attributes(e: &BytesStart<'_>) -> Result<BTreeMap<String, String>> {
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
    Ok(attributes)
}

fn required_index(attrs: &BTreeMap<String, String>, tag: &str) -> Result<usize> {
    let raw = attrs.get(IDX_ATTR).ok_or_else(|| {
        Error::MalformedOp(format!("<{}> is missing the {} attribute", tag, IDX_ATTR))
    })?;
    raw.parse::<usize>()
        .map_err(|_| Error::MalformedOp(format!("<{}> has an invalid {}: {:?}", tag, IDX_ATTR, raw)))
}

fn is_whitespace(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}
