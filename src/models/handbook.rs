// src/models/handbook.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handbook::{ContentKey, ContentSource};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HandbookTab {
    pub key: ContentKey,
    pub label: String,
}

/// The handbook panel: visible tabs plus the default selection.
#[derive(Debug, Serialize)]
pub struct HandbookIndexResponse {
    pub tabs: Vec<HandbookTab>,
    pub selected: Option<ContentKey>,
}

/// One tab's content, already sanitized.
#[derive(Debug, Serialize)]
pub struct HandbookPageResponse {
    pub key: ContentKey,
    pub label: String,
    /// `None` when no layer had content.
    pub source: Option<ContentSource>,
    pub html: String,
    pub has_content: bool,
}

/// DTO for an admin's local handbook edit.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveOverrideRequest {
    #[validate(length(max = 200000, message = "Handbook content is too large."))]
    pub html: String,
}

/// Returned after saving so the editor can show what staff will see.
#[derive(Debug, Serialize)]
pub struct OverridePreview {
    pub key: ContentKey,
    pub html: String,
}
