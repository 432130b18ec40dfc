// src/handbook/mod.rs

//! Employee handbook content resolution: which company variants a session
//! sees, and which content layer wins for the selected one.

pub mod key;
pub mod overrides;
pub mod panel;
pub mod resolver;

pub use key::{ContentKey, KnownKey, parse_known_keys};
pub use overrides::{LocalOverrideStore, MemoryOverrideStore, SqlOverrideStore};
pub use panel::{HandbookPanel, PanelState};
pub use resolver::{
    ContentSource, Entitlement, has_content, resolve_content, resolve_layer, visible_keys,
};
