// src/upstream.rs

//! Client for the portal script endpoint.
//!
//! Sign-in verification, approvals, role storage and the email-to-company
//! handbook mapping all live behind that endpoint. Every action is a POST of
//! `{"action": ..., ...fields}` sent as `text/plain` (the endpoint rejects
//! preflighted requests), answered by JSON carrying `ok` and maybe `error`.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    error::AppError,
    models::{
        approval::{PendingRequest, Role},
        session::{HandbookEntry, LinkedSheet, PanelFlags},
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// What the backend knows about an account after verifying its Google token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginOutcome {
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub tabs: PanelFlags,
    pub sheets: Vec<LinkedSheet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HandbookList {
    handbooks: Vec<HandbookEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PendingList {
    pending: Vec<PendingRequest>,
}

#[async_trait]
pub trait PortalBackend: Send + Sync {
    async fn google_login(&self, id_token: &str) -> Result<LoginOutcome, AppError>;

    /// Handbooks mapped to the account, with their current content.
    async fn resolve_handbook(&self, email: &str, name: &str)
    -> Result<Vec<HandbookEntry>, AppError>;

    async fn list_pending(&self) -> Result<Vec<PendingRequest>, AppError>;

    async fn approve(&self, target: &str) -> Result<(), AppError>;

    async fn revoke(&self, target: &str) -> Result<(), AppError>;

    async fn set_role(&self, target: &str, role: Role) -> Result<(), AppError>;
}

/// HTTP implementation of [`PortalBackend`].
#[derive(Debug, Clone)]
pub struct ScriptClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ScriptClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Posts one action and returns the raw JSON answer. Only transport and
    /// HTTP status failures are errors here.
    async fn post(&self, action: &str, fields: Value) -> Result<Value, AppError> {
        let mut body = json!({ "action": action });
        if let (Some(body), Value::Object(fields)) = (body.as_object_mut(), fields) {
            body.extend(fields);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "{} failed with status {}",
                action, status
            )));
        }

        Ok(response.json().await?)
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, fields: Value) -> Result<T, AppError> {
        let payload = self.post(action, fields).await?;
        if let Some(message) = rejection(action, &payload) {
            return Err(AppError::Upstream(message));
        }
        decode(action, payload)
    }
}

/// The endpoint's refusal message when `ok` is not `true`.
fn rejection(action: &str, payload: &Value) -> Option<String> {
    if payload.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    Some(
        payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} failed", action)),
    )
}

fn decode<T: DeserializeOwned>(action: &str, payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| {
        tracing::error!("Unexpected {} response shape: {:?}", action, e);
        AppError::Upstream(format!("{} returned an unexpected response", action))
    })
}

#[async_trait]
impl PortalBackend for ScriptClient {
    /// A refused token is an `AuthError`; transport failures stay `Upstream`.
    async fn google_login(&self, id_token: &str) -> Result<LoginOutcome, AppError> {
        let payload = self
            .post("googleLogin", json!({ "id_token": id_token }))
            .await?;
        if let Some(message) = rejection("googleLogin", &payload) {
            tracing::warn!("Google sign-in rejected: {}", message);
            return Err(AppError::AuthError("Google sign-in was rejected".to_string()));
        }
        decode("googleLogin", payload)
    }

    async fn resolve_handbook(
        &self,
        email: &str,
        name: &str,
    ) -> Result<Vec<HandbookEntry>, AppError> {
        let list: HandbookList = self
            .call("resolveHandbook", json!({ "email": email, "name": name }))
            .await?;
        Ok(list.handbooks)
    }

    async fn list_pending(&self) -> Result<Vec<PendingRequest>, AppError> {
        let list: PendingList = self.call("listPending", json!({})).await?;
        Ok(list.pending)
    }

    async fn approve(&self, target: &str) -> Result<(), AppError> {
        let _: Value = self.call("approve", json!({ "target": target })).await?;
        Ok(())
    }

    async fn revoke(&self, target: &str) -> Result<(), AppError> {
        let _: Value = self.call("revoke", json!({ "target": target })).await?;
        Ok(())
    }

    async fn set_role(&self, target: &str, role: Role) -> Result<(), AppError> {
        let _: Value = self
            .call("setRole", json!({ "target": target, "role": role }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::HeaderMap, routing::post};
    use std::sync::{Arc, Mutex};

    /// Fake script endpoint. Records each request body and answers by action.
    async fn spawn_endpoint(seen: Arc<Mutex<Vec<Value>>>) -> String {
        let app = Router::new().route(
            "/exec",
            post(move |headers: HeaderMap, body: String| {
                let seen = seen.clone();
                async move {
                    assert_eq!(
                        headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
                        Some("text/plain;charset=utf-8")
                    );
                    let request: Value = serde_json::from_str(&body).unwrap();
                    seen.lock().unwrap().push(request.clone());
                    let reply = match request["action"].as_str() {
                        Some("googleLogin") if request["id_token"] == "forged" => {
                            json!({ "ok": false, "error": "Token audience mismatch" })
                        }
                        Some("googleLogin") => json!({
                            "ok": true,
                            "email": "staff@example.test",
                            "name": "Staff",
                            "role": "Staff",
                            "status": "approved",
                            "tabs": { "checkIn": true }
                        }),
                        Some("resolveHandbook") => json!({
                            "ok": true,
                            "handbooks": [{ "key": "roverx", "company": "Rover X", "html": "<p>x</p>" }]
                        }),
                        Some("listPending") => json!({ "ok": true }),
                        Some("approve") => json!({ "ok": false, "error": "Not allowed" }),
                        _ => json!({ "ok": false }),
                    };
                    axum::Json(reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://127.0.0.1:{}/exec", port)
    }

    #[tokio::test]
    async fn login_and_handbook_round_trip() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = ScriptClient::new(spawn_endpoint(seen.clone()).await).unwrap();

        let outcome = client.google_login("token-123").await.unwrap();
        assert_eq!(outcome.email, "staff@example.test");
        assert!(outcome.tabs.check_in);
        assert!(outcome.sheets.is_empty());

        let handbooks = client.resolve_handbook("staff@example.test", "Staff").await.unwrap();
        assert_eq!(handbooks.len(), 1);
        assert_eq!(handbooks[0].key.as_str(), "roverx");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], json!({ "action": "googleLogin", "id_token": "token-123" }));
        assert_eq!(seen[1]["email"], "staff@example.test");
    }

    #[tokio::test]
    async fn missing_lists_default_to_empty() {
        let client = ScriptClient::new(spawn_endpoint(Arc::default()).await).unwrap();
        assert!(client.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn not_ok_maps_to_upstream_error() {
        let client = ScriptClient::new(spawn_endpoint(Arc::default()).await).unwrap();

        let err = client.approve("a@b.c").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(msg) if msg == "Not allowed"));

        let err = client.revoke("a@b.c").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(msg) if msg == "revoke failed"));
    }

    #[tokio::test]
    async fn refused_google_token_is_an_auth_error() {
        let client = ScriptClient::new(spawn_endpoint(Arc::default()).await).unwrap();

        let err = client.google_login("forged").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(msg) if msg == "Google sign-in was rejected"));
    }
}
