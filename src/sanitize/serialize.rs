// src/sanitize/serialize.rs

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::node::{Element, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content the parser reads verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// The parser swallows one leading newline inside these.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, None, &mut out);
    }
    out
}

fn write_node(node: &Node, parent: Option<&str>, out: &mut String) {
    match node {
        Node::Text(text) => {
            if parent.is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag)) {
                out.push_str(text);
            } else {
                out.push_str(&encode_text(text));
            }
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        if !is_serializable_attr_name(name) {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    if LEADING_NEWLINE_ELEMENTS.contains(&element.tag.as_str())
        && matches!(element.children.first(), Some(Node::Text(t)) if t.starts_with('\n'))
    {
        out.push('\n');
    }

    for child in &element.children {
        write_node(child, Some(&element.tag), out);
    }

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn is_serializable_attr_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}
