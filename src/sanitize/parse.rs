// src/sanitize/parse.rs

use html5ever::{
    LocalName, Namespace, ParseOpts, QualName, parse_fragment, tendril::TendrilSink,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::node::{Element, Node};

/// Elements nested deeper than this are collapsed into their text.
pub const MAX_DEPTH: usize = 256;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Turns a markup string into a [`Node`] forest.
///
/// Implementations must be purely structural: no scripts run, nothing is
/// fetched, and malformed input still yields some tree.
pub trait FragmentParser: Send + Sync {
    fn parse_fragment(&self, input: &str) -> Vec<Node>;
}

/// html5ever-backed parser. Fragments are parsed in a `<div>` context, which
/// is where the handbook markup ends up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5everParser;

impl FragmentParser for Html5everParser {
    fn parse_fragment(&self, input: &str) -> Vec<Node> {
        if input.is_empty() {
            return Vec::new();
        }

        let context = QualName::new(None, Namespace::from(HTML_NS), LocalName::from("div"));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![])
            .one(input);

        // A parsed fragment is a document holding a single synthetic <html>
        // element; its children are the fragment.
        let root = dom.document.children.borrow().first().cloned();
        match root {
            Some(root) => convert_children(&root, 0),
            None => Vec::new(),
        }
    }
}

fn child_handles(handle: &Handle) -> Vec<Handle> {
    if let NodeData::Element {
        template_contents, ..
    } = &handle.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            return contents.children.borrow().clone();
        }
    }
    handle.children.borrow().clone()
}

fn convert_children(handle: &Handle, depth: usize) -> Vec<Node> {
    child_handles(handle)
        .iter()
        .filter_map(|child| convert(child, depth))
        .collect()
}

fn convert(handle: &Handle, depth: usize) -> Option<Node> {
    match &handle.data {
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Element { name, attrs, .. } => {
            if depth >= MAX_DEPTH {
                return Some(Node::Text(flatten_text(handle)));
            }

            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let local: &str = &attr.name.local;
                    let local = local.to_ascii_lowercase();
                    let name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, local),
                        None => local,
                    };
                    (name, attr.value.to_string())
                })
                .collect();

            let tag: &str = &name.local;
            Some(Node::Element(Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
                children: convert_children(handle, depth + 1),
            }))
        }
        NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
            None
        }
    }
}

/// Text of a subtree, collected without recursion.
fn flatten_text(handle: &Handle) -> String {
    let mut out = String::new();
    let mut stack = vec![handle.clone()];
    while let Some(node) = stack.pop() {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => stack.extend(child_handles(&node).into_iter().rev()),
            _ => {}
        }
    }
    out
}
