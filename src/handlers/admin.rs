// src/handlers/admin.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    handbook::ContentKey,
    models::{
        approval::{SetRoleRequest, validate_target_email},
        handbook::{OverridePreview, SaveOverrideRequest},
        session::Session,
    },
    state::AppState,
};

fn target_email(raw: &str) -> Result<String, AppError> {
    validate_target_email(raw)
        .map_err(|_| AppError::BadRequest(format!("'{}' is not an email address", raw)))?;
    Ok(raw.trim().to_string())
}

/// Accounts waiting for approval.
/// Admin only.
pub async fn list_pending(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pending = state.backend.list_pending().await?;
    Ok(Json(json!({ "pending": pending })))
}

/// Approves an account.
/// Admin only.
pub async fn approve(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let target = target_email(&email)?;
    state.backend.approve(&target).await?;
    tracing::info!("{} approved {}", session.email, target);
    Ok(StatusCode::NO_CONTENT)
}

/// Revokes an account's access.
/// Admin only.
pub async fn revoke(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let target = target_email(&email)?;
    state.backend.revoke(&target).await?;
    tracing::info!("{} revoked {}", session.email, target);
    Ok(StatusCode::NO_CONTENT)
}

/// Changes an account's role.
/// Admin only.
pub async fn set_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(email): Path<String>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let target = target_email(&email)?;
    state.backend.set_role(&target, payload.role).await?;
    tracing::info!("{} set role of {} to {}", session.email, target, payload.role);
    Ok(StatusCode::NO_CONTENT)
}

fn known_key(state: &AppState, raw: &str) -> Result<ContentKey, AppError> {
    let key = ContentKey::new(raw);
    if !state.config.is_known_key(&key) {
        return Err(AppError::NotFound(format!("Unknown handbook '{}'", key)));
    }
    Ok(key)
}

/// Saves an admin edit for one handbook. It shadows the backend's content for
/// everyone until cleared. Returns the sanitized markup staff will see.
/// Admin only.
pub async fn save_override(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(raw_key): Path<String>,
    Json(payload): Json<SaveOverrideRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let key = known_key(&state, &raw_key)?;

    state.overrides.set(&key, &payload.html).await?;
    tracing::info!("{} saved a handbook override for {}", session.email, key);

    Ok(Json(OverridePreview {
        html: state.sanitizer.clean(&payload.html),
        key,
    }))
}

/// Drops the admin edit so the backend's content shows again.
/// Admin only.
pub async fn clear_override(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(raw_key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = known_key(&state, &raw_key)?;

    if !state.overrides.clear(&key).await? {
        return Err(AppError::NotFound(format!("No override for '{}'", key)));
    }
    tracing::info!("{} cleared the handbook override for {}", session.email, key);

    Ok(StatusCode::NO_CONTENT)
}
