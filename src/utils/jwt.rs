// src/utils/jwt.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::session::Session, state::AppState, store::sessions};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the session ID.
    pub sub: String,
    /// Role name as the backend reported it (e.g. 'Staff', 'Owner'). For the
    /// client only; the server reads the stored session.
    pub role: String,
    /// Whether the session may use the admin panel.
    pub admin: bool,
    /// Expiration time as Unix timestamp. Matches the session's expiry.
    pub exp: usize,
}

/// Signs a bearer token for a stored session.
pub fn sign_jwt(session: &Session, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: session.id.clone(),
        role: session.role.clone(),
        admin: session.is_elevated(),
        exp: usize::try_from(session.expires_at.timestamp()).unwrap_or(0),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and loads the session
/// it names. Injects the `Session` into the request extensions.
/// Signed-out or expired sessions get 401 even while the token is unexpired.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

    let claims = verify_jwt(token, &state.config.jwt_secret)?;

    let session = sessions::find_session(&state.pool, &claims.sub, chrono::Utc::now())
        .await?
        .ok_or_else(|| AppError::AuthError("Session expired".to_string()))?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Axum Middleware: Approved accounts only.
///
/// Must be used AFTER `auth_middleware`.
pub async fn approved_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<Session>()
        .ok_or_else(|| AppError::AuthError("Not signed in".to_string()))?;

    if !session.is_approved() {
        return Err(AppError::Forbidden(
            "Your account setup is underway".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Requires an approved, elevated session.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<Session>()
        .ok_or_else(|| AppError::AuthError("Not signed in".to_string()))?;

    if !session.is_approved() || !session.is_elevated() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}
