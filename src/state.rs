// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    config::Config, handbook::LocalOverrideStore, sanitize::Sanitizer, upstream::PortalBackend,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub backend: Arc<dyn PortalBackend>,
    pub overrides: Arc<dyn LocalOverrideStore>,
    pub sanitizer: Sanitizer,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
