//! XML parsing and output.
//!
//! Turns XML text into [`Node`](crate::node::Node) trees and back so the
//! diff engine can run on real documents.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str, ParseOptions, XmlParser};
pub use printer::{print_to_string, PrintOptions, XmlPrinter};

use std::borrow::Cow;

use quick_xml::escape::escape;

/// Escapes markup characters, plus carriage returns so they survive a
/// parse.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    let escaped = escape(s);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

/// Escapes an attribute value. Tabs and line breaks become character
/// references, since parsers normalize them to spaces inside attributes.
pub(crate) fn escape_attribute(s: &str) -> Cow<'_, str> {
    let escaped = escape_text(s);
    if escaped.contains(['\n', '\t']) {
        Cow::Owned(escaped.replace('\n', "&#10;").replace('\t', "&#9;"))
    } else {
        escaped
    }
}
