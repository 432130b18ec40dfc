// src/lib.rs

pub mod config;
pub mod error;
pub mod handbook;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sanitize;
pub mod state;
pub mod store;
pub mod upstream;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
