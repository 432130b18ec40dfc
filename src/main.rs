// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use portal::config::Config;
use portal::handbook::SqlOverrideStore;
use portal::routes;
use portal::sanitize::Sanitizer;
use portal::state::AppState;
use portal::store::sessions;
use portal::upstream::ScriptClient;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "portal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    return Err(e.into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    match sessions::purge_expired(&pool, chrono::Utc::now()).await {
        Ok(0) => {}
        Ok(purged) => tracing::info!("Purged {} expired sessions", purged),
        Err(e) => tracing::error!("Failed to purge expired sessions: {:?}", e),
    }

    let backend = ScriptClient::new(config.portal_api_url.clone())?;

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        backend: Arc::new(backend),
        overrides: Arc::new(SqlOverrideStore::new(pool)),
        sanitizer: Sanitizer::default(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = config.listen_addr;
    tracing::info!("Portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}
