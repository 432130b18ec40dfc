// src/handbook/key.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Names one handbook variant, e.g. one per company.
///
/// Keys are compared after trimming and lower-casing, so `" RoverX "` and
/// `"roverx"` name the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ContentKey(String);

impl ContentKey {
    /// The synthetic key shown when a session has no entitled variant.
    pub const FALLBACK: &'static str = "fallback";

    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_lowercase())
    }

    pub fn fallback() -> Self {
        Self(Self::FALLBACK.to_string())
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == Self::FALLBACK
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContentKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for ContentKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<ContentKey> for String {
    fn from(key: ContentKey) -> Self {
        key.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configured variant: its key plus the tab label shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownKey {
    pub key: ContentKey,
    pub label: String,
}

/// Parses `key:Label,key:Label`. A missing label falls back to the key itself.
/// Empty entries, the reserved fallback key and duplicates are skipped; the
/// first occurrence fixes the canonical position.
pub fn parse_known_keys(raw: &str) -> Vec<KnownKey> {
    let mut known: Vec<KnownKey> = Vec::new();
    for entry in raw.split(',') {
        let (key, label) = match entry.split_once(':') {
            Some((key, label)) => (key, label.trim()),
            None => (entry, ""),
        };
        let key = ContentKey::new(key);
        if key.as_str().is_empty() || key.is_fallback() || known.iter().any(|k| k.key == key) {
            continue;
        }
        let label = if label.is_empty() {
            key.to_string()
        } else {
            label.to_string()
        };
        known.push(KnownKey { key, label });
    }
    known
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_normalized() {
        assert_eq!(ContentKey::new("  RoverX "), ContentKey::new("roverx"));
        assert!(ContentKey::new("Fallback").is_fallback());
    }

    #[test]
    fn deserializes_through_normalization() {
        let key: ContentKey = serde_json::from_str("\" NINJAS\"").unwrap();
        assert_eq!(key.as_str(), "ninjas");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"ninjas\"");
    }

    #[test]
    fn parses_known_keys_in_order() {
        let known = parse_known_keys("roverx:ROVER X TRAVEL, ninjas:Tipsy Ninjas");
        assert_eq!(
            known,
            vec![
                KnownKey {
                    key: "roverx".into(),
                    label: "ROVER X TRAVEL".into()
                },
                KnownKey {
                    key: "ninjas".into(),
                    label: "Tipsy Ninjas".into()
                },
            ]
        );
    }

    #[test]
    fn skips_blank_reserved_and_duplicate_keys() {
        let known = parse_known_keys("a,,fallback:Generic, A:Again ,b:");
        let keys: Vec<&str> = known.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(known[0].label, "a");
        assert_eq!(known[1].label, "b");
    }
}
