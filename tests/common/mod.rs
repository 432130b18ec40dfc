// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use portal::{
    config::Config,
    error::AppError,
    handbook::{ContentKey, MemoryOverrideStore},
    models::{
        approval::{PendingRequest, Role},
        session::{HandbookEntry, PanelFlags},
    },
    routes,
    sanitize::Sanitizer,
    state::AppState,
    upstream::{LoginOutcome, PortalBackend},
};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;

pub const FALLBACK_HTML: &str = "<p>General handbook</p>";

/// Approving this account fails inside the backend.
pub const LOCKED_ACCOUNT: &str = "locked@example.test";

/// Scripted stand-in for the portal script endpoint.
#[derive(Default)]
pub struct FakeBackend {
    accounts: HashMap<String, LoginOutcome>,
    handbooks: HashMap<String, Vec<HandbookEntry>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn account(
        &mut self,
        token: &str,
        email: &str,
        role: &str,
        status: &str,
        tabs: PanelFlags,
        handbooks: &[(&str, &str)],
    ) {
        self.accounts.insert(
            token.to_string(),
            LoginOutcome {
                email: email.to_string(),
                name: email.split('@').next().unwrap_or_default().to_string(),
                role: role.to_string(),
                status: status.to_string(),
                tabs,
                sheets: Vec::new(),
            },
        );
        self.handbooks.insert(
            email.to_string(),
            handbooks
                .iter()
                .map(|(key, html)| HandbookEntry {
                    key: ContentKey::new(key),
                    company: key.to_string(),
                    html: html.to_string(),
                })
                .collect(),
        );
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PortalBackend for FakeBackend {
    async fn google_login(&self, id_token: &str) -> Result<LoginOutcome, AppError> {
        self.accounts
            .get(id_token)
            .cloned()
            .ok_or_else(|| AppError::AuthError("Google sign-in was rejected".to_string()))
    }

    async fn resolve_handbook(
        &self,
        email: &str,
        _name: &str,
    ) -> Result<Vec<HandbookEntry>, AppError> {
        self.handbooks
            .get(email)
            .cloned()
            .ok_or_else(|| AppError::Upstream("resolveHandbook failed".to_string()))
    }

    async fn list_pending(&self) -> Result<Vec<PendingRequest>, AppError> {
        Ok(vec![PendingRequest {
            email: "new@example.test".to_string(),
            name: "New".to_string(),
            role: "Staff".to_string(),
            when: "2026-10-19".to_string(),
        }])
    }

    async fn approve(&self, target: &str) -> Result<(), AppError> {
        if target == LOCKED_ACCOUNT {
            return Err(AppError::Upstream("Sheet row 42 is locked by another editor".to_string()));
        }
        self.record(format!("approve {}", target));
        Ok(())
    }

    async fn revoke(&self, target: &str) -> Result<(), AppError> {
        self.record(format!("revoke {}", target));
        Ok(())
    }

    async fn set_role(&self, target: &str, role: Role) -> Result<(), AppError> {
        self.record(format!("setRole {} {}", target, role));
        Ok(())
    }
}

/// Sign-in tokens the fake backend accepts.
pub fn default_backend() -> FakeBackend {
    let mut backend = FakeBackend::default();
    backend.account(
        "staff-token",
        "staff@example.test",
        "Staff",
        "approved",
        PanelFlags {
            check_in: true,
            ..PanelFlags::default()
        },
        &[(
            "roverx",
            r#"<p>Rover <script>alert(1)</script></p><a href="javascript:steal()" onclick="x()">bad</a>"#,
        )],
    );
    backend.account(
        "pending-token",
        "pending@example.test",
        "Staff",
        "pending",
        PanelFlags::default(),
        &[],
    );
    backend.account(
        "admin-token",
        "manager@example.test",
        "Manager",
        "approved",
        PanelFlags {
            admin: true,
            daily_sale: true,
            ..PanelFlags::default()
        },
        &[("ninjas", "<h2>Ninjas</h2>")],
    );
    backend.account(
        "nobody-token",
        "nobody@example.test",
        "Staff",
        "approved",
        PanelFlags::default(),
        &[],
    );
    backend
}

pub struct TestApp {
    pub address: String,
    pub backend: Arc<FakeBackend>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Signs in with a fake Google token and returns the bearer token.
    pub async fn login(&self, id_token: &str) -> String {
        let body: Value = self
            .client
            .post(self.url("/api/auth/google"))
            .json(&serde_json::json!({ "id_token": id_token }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .unwrap();
        body["token"].as_str().expect("login returned a token").to_string()
    }
}

/// Helper function to spawn the app on a random port for testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(default_backend()).await
}

pub async fn spawn_app_with(backend: FakeBackend) -> TestApp {
    // 1. In-memory database; one connection so every query sees the same one
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", "test_secret_for_integration_tests"),
        ("RUST_LOG", "error"),
        ("PORTAL_API_URL", "https://script.example.test/exec"),
        ("HANDBOOK_KEYS", "roverx:ROVER X TRAVEL,ninjas:Tipsy Ninjas"),
        ("HANDBOOK_FALLBACK_HTML", FALLBACK_HTML),
        ("CHECK_IN_URL", "https://sheets.example.test/checkin"),
        ("LOGO_LEFT", "https://cdn.example.test/left.png"),
    ]);
    let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("valid test config");

    let backend = Arc::new(backend);
    let state = AppState {
        pool,
        config,
        backend: backend.clone(),
        overrides: Arc::new(MemoryOverrideStore::new()),
        sanitizer: Sanitizer::default(),
    };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        backend,
        client: reqwest::Client::new(),
    }
}
