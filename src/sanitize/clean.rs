// src/sanitize/clean.rs

use std::sync::OnceLock;

use regex::Regex;

use super::{
    node::{Element, Node},
    policy::AllowListPolicy,
};

/// Replacement for any anchor href that is not http(s).
pub const PLACEHOLDER_HREF: &str = "#";
pub const ANCHOR_TARGET: &str = "_blank";
pub const ANCHOR_REL: &str = "noopener noreferrer";

fn http_scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?:").expect("valid regex"))
}

pub fn is_http_url(href: &str) -> bool {
    http_scheme_regex().is_match(href)
}

/// Applies the allow-list to a parsed fragment.
///
/// Comments are dropped. Disallowed elements are unwrapped: their children take
/// their place and are cleaned in the same pass. Allowed elements keep only
/// allowed, non-event-handler attributes, and anchors are rewritten to open
/// http(s) targets in a new tab with no opener or referrer.
pub fn clean_fragment(nodes: Vec<Node>, policy: &AllowListPolicy) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    clean_into(nodes, policy, &mut out);
    out
}

fn clean_into(nodes: Vec<Node>, policy: &AllowListPolicy, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Comment(_) => {}
            Node::Text(text) => {
                if !text.is_empty() {
                    out.push(Node::Text(text));
                }
            }
            Node::Element(element) if !policy.allows_tag(&element.tag) => {
                clean_into(element.children, policy, out);
            }
            Node::Element(mut element) => {
                element
                    .attrs
                    .retain(|(name, _)| policy.allows_attribute(&element.tag, name));

                if element.tag == "a" {
                    secure_anchor(&mut element);
                }

                element.children = clean_fragment(std::mem::take(&mut element.children), policy);
                out.push(Node::Element(element));
            }
        }
    }
}

fn secure_anchor(anchor: &mut Element) {
    let href = anchor
        .attr("href")
        .filter(|href| is_http_url(href))
        .unwrap_or(PLACEHOLDER_HREF)
        .to_string();

    anchor.set_attr("href", &href);
    anchor.set_attr("target", ANCHOR_TARGET);
    anchor.set_attr("rel", ANCHOR_REL);
}
