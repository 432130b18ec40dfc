// src/handbook/resolver.rs

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::key::ContentKey;

/// Handbook variants a session may view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entitlement(HashSet<ContentKey>);

impl Entitlement {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ContentKey>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, key: &ContentKey) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<ContentKey>> FromIterator<K> for Entitlement {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Where a piece of handbook markup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Admin edit kept in the override store.
    LocalOverride,
    /// Per-session content from the backend.
    Remote,
    /// Process-wide generic content.
    Fallback,
}

/// Whitespace-only markup counts as absent.
pub fn has_content(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Tabs a session sees, in `known_keys` order.
///
/// Elevated sessions see every known key. Anyone left with nothing sees the
/// synthetic fallback tab, provided fallback content exists.
pub fn visible_keys(
    entitlement: &Entitlement,
    is_elevated: bool,
    known_keys: &[ContentKey],
    fallback: &str,
) -> Vec<ContentKey> {
    let mut keys: Vec<ContentKey> = known_keys
        .iter()
        .filter(|key| is_elevated || entitlement.contains(key))
        .cloned()
        .collect();

    if keys.is_empty() && has_content(fallback) {
        keys.push(ContentKey::fallback());
    }
    keys
}

/// Picks the layer that supplies `key`: local override, then remote, then
/// fallback. `None` when every layer is empty.
pub fn resolve_layer<'a>(
    key: &ContentKey,
    remote: &'a HashMap<ContentKey, String>,
    local: &'a HashMap<ContentKey, String>,
    fallback: &'a str,
) -> Option<(ContentSource, &'a str)> {
    let layered = |source, map: &'a HashMap<ContentKey, String>| {
        map.get(key)
            .map(String::as_str)
            .filter(|html| has_content(html))
            .map(|html| (source, html))
    };

    layered(ContentSource::LocalOverride, local)
        .or_else(|| layered(ContentSource::Remote, remote))
        .or_else(|| has_content(fallback).then_some((ContentSource::Fallback, fallback)))
}

/// Raw (unsanitized) markup for `key`, or an empty string.
///
/// Any key with no local or remote content falls through to `fallback`,
/// including keys outside `known_keys`. Callers that must answer "unknown
/// key" with nothing check the key against the configured list first, as the
/// handbook page handler does.
pub fn resolve_content(
    key: &ContentKey,
    remote: &HashMap<ContentKey, String>,
    local: &HashMap<ContentKey, String>,
    fallback: &str,
) -> String {
    resolve_layer(key, remote, local, fallback)
        .map(|(_, html)| html.to_string())
        .unwrap_or_default()
}
