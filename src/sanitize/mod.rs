// src/sanitize/mod.rs

//! Allow-list HTML sanitizer for admin-authored handbook markup.
//!
//! The pipeline is parse -> [`clean::clean_fragment`] -> [`serialize::serialize`].
//! Unwrapping a disallowed element can leave structure the HTML parser would
//! rearrange on the next read (a `<div>` freed inside a `<p>`, for example), so
//! the output is re-fed through the pipeline until it stops changing. That
//! makes `sanitize(sanitize(x)) == sanitize(x)` hold for the markup browsers
//! will actually see.

pub mod clean;
pub mod node;
pub mod parse;
pub mod policy;
pub mod serialize;

use std::sync::Arc;

pub use clean::{ANCHOR_REL, ANCHOR_TARGET, PLACEHOLDER_HREF};
pub use node::{Element, Node};
pub use parse::{FragmentParser, Html5everParser};
pub use policy::AllowListPolicy;

/// Upper bound on parse/clean rounds per call.
pub const MAX_PASSES: usize = 8;

/// Sanitizes `raw` with the html5ever parser. Total over all inputs.
pub fn sanitize(raw: &str, policy: &AllowListPolicy) -> String {
    sanitize_with(&Html5everParser, raw, policy)
}

pub fn sanitize_with(parser: &dyn FragmentParser, raw: &str, policy: &AllowListPolicy) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut current = single_pass(parser, raw, policy);
    for _ in 1..MAX_PASSES {
        let next = single_pass(parser, &current, policy);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn single_pass(parser: &dyn FragmentParser, raw: &str, policy: &AllowListPolicy) -> String {
    let tree = parser.parse_fragment(raw);
    serialize::serialize(&clean::clean_fragment(tree, policy))
}

/// A policy bundled with the parser that feeds it. Cheap to clone.
#[derive(Clone)]
pub struct Sanitizer {
    policy: Arc<AllowListPolicy>,
    parser: Arc<dyn FragmentParser>,
}

impl Sanitizer {
    pub fn new(policy: AllowListPolicy) -> Self {
        Self::with_parser(policy, Arc::new(Html5everParser))
    }

    pub fn with_parser(policy: AllowListPolicy, parser: Arc<dyn FragmentParser>) -> Self {
        Self {
            policy: Arc::new(policy),
            parser,
        }
    }

    pub fn policy(&self) -> &AllowListPolicy {
        &self.policy
    }

    pub fn clean(&self, raw: &str) -> String {
        sanitize_with(self.parser.as_ref(), raw, &self.policy)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(AllowListPolicy::portal_default())
    }
}
