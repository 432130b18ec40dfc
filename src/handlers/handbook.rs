// src/handlers/handbook.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    config::Config,
    error::AppError,
    handbook::{ContentKey, HandbookPanel, has_content, resolve_layer, visible_keys},
    models::{
        handbook::{HandbookIndexResponse, HandbookPageResponse, HandbookTab},
        session::Session,
    },
    state::AppState,
};

fn panel_for(session: &Session, config: &Config) -> HandbookPanel {
    HandbookPanel::new(visible_keys(
        &session.entitlement(),
        session.is_elevated(),
        &config.known_keys(),
        &config.handbook_fallback_html,
    ))
}

/// Lists the handbook tabs this session may open and the one opened first.
pub async fn index(
    State(config): State<Config>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    let mut panel = panel_for(&session, &config);
    let selected = panel.select_default().cloned();

    let tabs = panel
        .visible()
        .iter()
        .map(|key| HandbookTab {
            key: key.clone(),
            label: config.label_for(key),
        })
        .collect();

    Json(HandbookIndexResponse { tabs, selected })
}

/// Sanitized handbook markup for one tab.
///
/// Admin overrides shadow the backend's content for the same key; the generic
/// fallback fills in when neither has anything.
pub async fn page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(raw_key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = ContentKey::new(&raw_key);
    if !key.is_fallback() && !state.config.is_known_key(&key) {
        return Err(AppError::NotFound(format!("Unknown handbook '{}'", key)));
    }

    let mut panel = panel_for(&session, &state.config);
    if !panel.select(&key) {
        return Err(AppError::Forbidden(
            "This handbook is not available to your account".to_string(),
        ));
    }

    let local = state.overrides.snapshot().await?;
    let remote = session.remote_content();

    let (source, html) = match resolve_layer(
        &key,
        &remote,
        &local,
        &state.config.handbook_fallback_html,
    ) {
        Some((source, raw)) => (Some(source), state.sanitizer.clean(raw)),
        None => (None, String::new()),
    };

    tracing::debug!("Handbook {} for {} served from {:?}", key, session.email, source);

    Ok(Json(HandbookPageResponse {
        label: state.config.label_for(&key),
        has_content: has_content(&html),
        key,
        source,
        html,
    }))
}
