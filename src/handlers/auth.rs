// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{approval::GoogleLoginRequest, session::Session},
    state::AppState,
    store::sessions,
    utils::jwt::sign_jwt,
};

/// Signs a user in with a Google ID token.
///
/// The backend verifies the token and reports the account's role, status and
/// panels. Handbook mapping is fetched right after; if that call fails the
/// session simply starts without remote handbooks.
/// Pending accounts still get a token so the client can show the waiting screen.
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let login = state.backend.google_login(&payload.id_token).await?;
    if login.email.trim().is_empty() {
        return Err(AppError::Upstream(
            "Sign-in returned no account".to_string(),
        ));
    }

    let handbooks = match state.backend.resolve_handbook(&login.email, &login.name).await {
        Ok(handbooks) => handbooks,
        Err(e) => {
            tracing::warn!("Handbook mapping unavailable for {}: {}", login.email, e);
            Vec::new()
        }
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    let session = sessions::create_session(
        &state.pool,
        &session_id,
        login,
        handbooks,
        chrono::Utc::now(),
    )
    .await?;

    let token = sign_jwt(&session, &state.config.jwt_secret)?;

    tracing::info!(
        "Signed in {} (role: {}, status: {})",
        session.email,
        session.role,
        session.status
    );

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "status": session.status,
        "approved": session.is_approved(),
        "role": session.role,
        "landing": session.landing_panel(),
        "expires_at": session.expires_at,
    })))
}

/// Ends the current session. The token stops working immediately.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    sessions::delete_session(&state.pool, &session.id).await?;
    tracing::info!("Signed out {}", session.email);
    Ok(StatusCode::NO_CONTENT)
}
