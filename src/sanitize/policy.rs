// src/sanitize/policy.rs

use std::collections::{HashMap, HashSet};

/// Key in `allowed_attributes` whose entries apply to every allowed tag.
pub const WILDCARD: &str = "*";

/// Tags the handbook viewer renders.
const PORTAL_TAGS: &[&str] = &[
    "div", "p", "span", "strong", "em", "b", "i", "u", "br", "hr", "h1", "h2", "h3", "h4", "h5",
    "h6", "ul", "ol", "li", "blockquote", "pre", "code", "table", "thead", "tbody", "tr", "th",
    "td", "a",
];

/// Immutable allow-list consulted by the sanitizer.
///
/// Names are stored lower-cased. Event-handler attributes (`on*`) are rejected
/// by [`AllowListPolicy::allows_attribute`] even when listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowListPolicy {
    allowed_tags: HashSet<String>,
    allowed_attributes: HashMap<String, HashSet<String>>,
}

impl AllowListPolicy {
    /// Builds a policy from tag names and `(tag, attributes)` pairs.
    /// Use [`WILDCARD`] as the tag to allow an attribute everywhere.
    pub fn new<'a, T, A>(tags: T, attributes: A) -> Self
    where
        T: IntoIterator<Item = &'a str>,
        A: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let allowed_tags = tags.into_iter().map(|t| t.to_ascii_lowercase()).collect();

        let mut allowed_attributes: HashMap<String, HashSet<String>> = HashMap::new();
        for (tag, names) in attributes {
            allowed_attributes
                .entry(tag.to_ascii_lowercase())
                .or_default()
                .extend(names.iter().map(|n| n.to_ascii_lowercase()));
        }

        Self {
            allowed_tags,
            allowed_attributes,
        }
    }

    /// The allow-list used for employee handbook markup.
    pub fn portal_default() -> Self {
        Self::new(
            PORTAL_TAGS.iter().copied(),
            [
                ("a", &["href", "target", "rel"][..]),
                (WILDCARD, &[][..]),
            ],
        )
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(&tag.to_ascii_lowercase())
    }

    /// Whether `name` may stay on an allowed `tag`.
    pub fn allows_attribute(&self, tag: &str, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        if is_event_handler(&name) {
            return false;
        }

        let listed = |key: &str| {
            self.allowed_attributes
                .get(key)
                .is_some_and(|names| names.contains(&name))
        };

        listed(&tag.to_ascii_lowercase()) || listed(WILDCARD)
    }
}

/// `onclick`, `ONLOAD`, `on` ... all count.
pub fn is_event_handler(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}
