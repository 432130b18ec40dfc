// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, handbook, portal},
    state::AppState,
    utils::jwt::{admin_middleware, approved_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public: sign-in, branding and the guest CV link.
/// * Signed in: profile and logout, also for accounts still pending.
/// * Approved: link-out panels and the handbook.
/// * Admin: approvals and handbook overrides.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/auth/google", post(auth::google_login))
        .route("/public/branding", get(portal::branding))
        .route("/public/cv", get(portal::guest_cv));

    let session_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/portal/me", get(portal::me));

    let approved_routes = Router::new()
        .route("/portal/checkin", get(portal::check_in))
        .route("/portal/leave", get(portal::leave))
        .route("/portal/sheets", get(portal::daily_sale_sheets))
        .route("/handbook", get(handbook::index))
        .route("/handbook/{key}", get(handbook::page))
        .layer(middleware::from_fn(approved_middleware));

    let admin_routes = Router::new()
        .route("/pending", get(admin::list_pending))
        .route("/approvals/{email}/approve", post(admin::approve))
        .route("/approvals/{email}/revoke", post(admin::revoke))
        .route("/approvals/{email}/role", put(admin::set_role))
        .route(
            "/handbook/{key}",
            put(admin::save_override).delete(admin::clear_override),
        )
        .layer(middleware::from_fn(admin_middleware));

    // Auth runs first for everything below, then the approval/admin checks.
    let protected_routes = Router::new()
        .merge(session_routes)
        .merge(approved_routes)
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
