// src/handlers/portal.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};

use crate::{
    config::Config,
    error::AppError,
    models::session::{MeResponse, Session},
};

/// Current session profile and the panels it may open.
pub async fn me(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(MeResponse::from(&session))
}

fn link_panel(enabled: bool, url: Option<&String>, name: &str) -> Result<Json<Value>, AppError> {
    if !enabled {
        return Err(AppError::Forbidden(format!(
            "The {} panel is not enabled for your account",
            name
        )));
    }

    let url = url.ok_or_else(|| AppError::NotFound(format!("No {} link configured", name)))?;

    Ok(Json(json!({
        "panel": name,
        "url": url,
        "target": "_blank",
    })))
}

/// Attendance sheet link-out.
pub async fn check_in(
    State(config): State<Config>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    link_panel(
        session.tabs.check_in,
        config.links.check_in_url.as_ref(),
        "checkin",
    )
}

/// Leave form link-out.
pub async fn leave(
    State(config): State<Config>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    link_panel(session.tabs.leave, config.links.leave_url.as_ref(), "leave")
}

/// Daily-sale sheets linked to the account. Empty list when none are linked.
pub async fn daily_sale_sheets(
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    if !session.tabs.daily_sale {
        return Err(AppError::Forbidden(
            "The dailysale panel is not enabled for your account".to_string(),
        ));
    }

    Ok(Json(json!({ "sheets": session.sheets })))
}

/// Logos shown on the sign-in screen.
pub async fn branding(State(config): State<Config>) -> impl IntoResponse {
    Json(config.branding)
}

/// Guest access: the CV application form.
pub async fn guest_cv(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let url = config
        .links
        .cv_url
        .ok_or_else(|| AppError::NotFound("No CV form configured".to_string()))?;

    Ok(Json(json!({ "url": url, "target": "_blank" })))
}
