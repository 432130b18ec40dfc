// src/models/session.rs

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::handbook::{ContentKey, Entitlement};

/// Panels the backend enabled for this account. Absent flags are off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelFlags {
    pub check_in: bool,
    pub leave: bool,
    pub daily_sale: bool,
    pub admin: bool,
    pub cv: bool,
}

/// A daily-sale sheet linked to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedSheet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One company handbook the backend mapped to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandbookEntry {
    pub key: ContentKey,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub html: String,
}

/// Represents the 'sessions' table in the database.
///
/// Built once from the backend's sign-in answer; everything downstream reads
/// these typed fields instead of the raw payload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,

    pub tabs: Json<PanelFlags>,
    pub sheets: Json<Vec<LinkedSheet>>,

    /// Remote-resolved handbook content. Never serialized back to clients raw.
    #[serde(skip)]
    pub handbooks: Json<Vec<HandbookEntry>>,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_approved(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("approved")
    }

    /// Admin-equivalent sessions manage approvals and preview every handbook.
    pub fn is_elevated(&self) -> bool {
        self.tabs.admin
    }

    pub fn is_owner(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case("owner")
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn entitlement(&self) -> Entitlement {
        self.handbooks.iter().map(|h| h.key.clone()).collect()
    }

    /// Key to html. Later entries for the same key win.
    pub fn remote_content(&self) -> HashMap<ContentKey, String> {
        self.handbooks
            .iter()
            .map(|h| (h.key.clone(), h.html.clone()))
            .collect()
    }

    /// Panel opened right after sign-in. Owners pick their own.
    pub fn landing_panel(&self) -> Option<&'static str> {
        if self.is_owner() { None } else { Some("handbook") }
    }

    /// Panels shown in the dashboard tab bar, in display order.
    pub fn panels(&self) -> Vec<&'static str> {
        let mut panels = Vec::new();
        if self.tabs.check_in {
            panels.push("checkin");
        }
        if self.tabs.leave {
            panels.push("leave");
        }
        if self.tabs.daily_sale {
            panels.push("dailysale");
        }
        panels.push("handbook");
        if self.is_elevated() {
            panels.push("admin");
        }
        panels
    }
}

/// End of the local calendar day containing `now`: sessions last until
/// 23:59:59.999 local time.
pub fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_day = now.with_timezone(&Local).date_naive();
    let last_moment = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
    Local
        .from_local_datetime(&local_day.and_time(last_moment))
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Public view of the signed-in session.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub approved: bool,
    pub panels: Vec<&'static str>,
    pub landing: Option<&'static str>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Session> for MeResponse {
    fn from(session: &Session) -> Self {
        Self {
            email: session.email.clone(),
            name: session.name.clone(),
            role: session.role.clone(),
            status: session.status.clone(),
            approved: session.is_approved(),
            panels: session.panels(),
            landing: session.landing_panel(),
            expires_at: session.expires_at,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::session;
    use super::*;

    #[test]
    fn status_and_role_checks_ignore_case() {
        let s = session("OWNER", " Approved ", PanelFlags::default(), &[]);
        assert!(s.is_approved());
        assert!(s.is_owner());
        assert_eq!(s.landing_panel(), None);

        let s = session("Staff", "pending", PanelFlags::default(), &[]);
        assert!(!s.is_approved());
        assert_eq!(s.landing_panel(), Some("handbook"));
    }

    #[test]
    fn panels_follow_flags() {
        let tabs = PanelFlags {
            check_in: true,
            daily_sale: true,
            admin: true,
            ..PanelFlags::default()
        };
        let s = session("Manager", "approved", tabs, &[]);
        assert_eq!(s.panels(), vec!["checkin", "dailysale", "handbook", "admin"]);
        assert!(s.is_elevated());
    }

    #[test]
    fn entitlement_and_remote_content_come_from_handbooks() {
        let s = session("Staff", "approved", PanelFlags::default(), &["ninjas"]);
        assert!(s.entitlement().contains(&ContentKey::new("ninjas")));
        assert!(!s.entitlement().contains(&ContentKey::new("roverx")));
        assert_eq!(
            s.remote_content().get(&ContentKey::new("ninjas")).map(String::as_str),
            Some("<p>ninjas</p>")
        );
    }

    #[test]
    fn missing_payload_fields_default() {
        let flags: PanelFlags = serde_json::from_str(r#"{"checkIn": true}"#).unwrap();
        assert!(flags.check_in);
        assert!(!flags.admin);

        let entry: HandbookEntry = serde_json::from_str(r#"{"key": "RoverX"}"#).unwrap();
        assert_eq!(entry.key, ContentKey::new("roverx"));
        assert!(entry.html.is_empty());
    }

    #[test]
    fn sessions_end_at_end_of_local_day() {
        let now = Utc::now();
        let end = end_of_day(now);
        assert!(end >= now);
        assert!(end - now < chrono::Duration::hours(25));
        let local_end = end.with_timezone(&Local);
        assert_eq!(local_end.date_naive(), now.with_timezone(&Local).date_naive());
    }
}
