// src/models/approval.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Roles the backend understands. Stored and sent by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Staff,
    #[serde(rename = "HR")]
    Hr,
    Manager,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "Staff",
            Role::Hr => "HR",
            Role::Manager => "Manager",
            Role::Owner => "Owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account waiting for approval, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Free-form request time as the backend reports it.
    #[serde(default)]
    pub when: String,
}

/// DTO for changing an account's role.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// DTO for Google sign-in. The token is verified by the backend, not here.
#[derive(Debug, Deserialize, Validate)]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, max = 8192, message = "id_token is required."))]
    pub id_token: String,
}

/// Path emails are checked loosely; the backend owns the account list.
pub fn validate_target_email(email: &str) -> Result<(), validator::ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.len() > 254 || !email.contains('@') {
        return Err(validator::ValidationError::new("invalid_email"));
    }
    Ok(())
}
