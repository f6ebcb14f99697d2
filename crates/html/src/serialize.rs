//! Static markup serialization of nodes.
//!
//! Contract:
//! - Attributes are written in order; bare attributes (`None`) are written as
//!   the attribute name alone.
//! - Void elements are written self-closed: `<meta name="a"/>`.
//! - Text inside raw text elements (`script`, `style`, `noscript`) is written
//!   verbatim; all other text and every attribute value is escaped unless
//!   `encode_special_characters` is disabled.
//! - Output is deterministic for a given node tree.

use crate::escape::push_escaped;
use crate::types::{Attribute, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    pub encode_special_characters: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            encode_special_characters: true,
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn to_html(nodes: &[Node]) -> String {
    to_html_with(nodes, SerializeOptions::default())
}

pub fn to_html_with(nodes: &[Node], options: SerializeOptions) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, options);
    }
    out
}

pub fn write_node(out: &mut String, node: &Node, options: SerializeOptions) {
    write_node_inner(out, node, options, false);
}

fn write_node_inner(out: &mut String, node: &Node, options: SerializeOptions, raw: bool) {
    match node {
        Node::Document {
            doctype, children, ..
        } => {
            if let Some(doctype) = doctype {
                out.push_str("<!DOCTYPE ");
                out.push_str(doctype);
                out.push('>');
            }
            for child in children {
                write_node_inner(out, child, options, false);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            out.push('<');
            out.push_str(name);
            if !attributes.is_empty() {
                out.push(' ');
                write_attribute_list(out, attributes, options);
            }
            if is_void_element(name) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            let raw = is_raw_text_element(name);
            for child in children {
                write_node_inner(out, child, options, raw);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text { text, .. } => {
            if raw || !options.encode_special_characters {
                out.push_str(text);
            } else {
                push_escaped(out, text);
            }
        }
    }
}

/// Space-separated attribute list without a leading space: `lang="en" hidden`.
pub fn write_attribute_list(out: &mut String, attributes: &[Attribute], options: SerializeOptions) {
    for (i, (name, value)) in attributes.iter().enumerate() {
        if i != 0 {
            out.push(' ');
        }
        out.push_str(name);
        if let Some(value) = value {
            out.push_str("=\"");
            if options.encode_special_characters {
                push_escaped(out, value);
            } else {
                out.push_str(value);
            }
            out.push('"');
        }
    }
}
