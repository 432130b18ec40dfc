// src/config.rs

use std::{env, net::SocketAddr};

use dotenvy::dotenv;
use serde::Serialize;
use url::Url;

use crate::{
    error::AppError,
    handbook::{ContentKey, KnownKey, parse_known_keys},
};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://portal.db?mode=rwc";
pub const DEFAULT_HANDBOOK_KEYS: &str = "roverx:ROVER X TRAVEL,ninjas:Tipsy Ninjas";
pub const DEFAULT_LOGO_SIZE: u32 = 120;

/// Link-out panels. Each is optional; an unset link hides nothing but makes
/// the panel endpoint answer 404.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortalLinks {
    pub check_in_url: Option<String>,
    pub leave_url: Option<String>,
    pub cv_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Branding {
    pub logo_left: Option<String>,
    pub logo_right: Option<String>,
    pub logo_size: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub listen_addr: SocketAddr,

    /// The portal script endpoint every backend action is posted to.
    pub portal_api_url: String,

    /// Handbook variants in canonical tab order.
    pub handbook_keys: Vec<KnownKey>,
    /// Shown when a session has no entitled variant. May be empty.
    pub handbook_fallback_html: String,

    pub links: PortalLinks,
    pub branding: Branding,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| AppError::Config(format!("{} must be set", name)))
        };

        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let listen_addr = var("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("LISTEN_ADDR is invalid: {}", e)))?;

        let portal_api_url = required("PORTAL_API_URL")?;
        validate_url("PORTAL_API_URL", &portal_api_url)?;

        let handbook_keys =
            parse_known_keys(&var("HANDBOOK_KEYS").unwrap_or_else(|| DEFAULT_HANDBOOK_KEYS.to_string()));

        let handbook_fallback_html = lookup("HANDBOOK_FALLBACK_HTML").unwrap_or_default();

        let optional_url = |name: &str| -> Result<Option<String>, AppError> {
            match var(name) {
                Some(url) => {
                    validate_url(name, &url)?;
                    Ok(Some(url))
                }
                None => Ok(None),
            }
        };

        let links = PortalLinks {
            check_in_url: optional_url("CHECK_IN_URL")?,
            leave_url: optional_url("LEAVE_URL")?,
            cv_url: optional_url("CV_URL")?,
        };

        let logo_size = match var("LOGO_SIZE") {
            Some(size) => size
                .trim()
                .parse::<u32>()
                .map_err(|e| AppError::Config(format!("LOGO_SIZE is invalid: {}", e)))?,
            None => DEFAULT_LOGO_SIZE,
        };

        let branding = Branding {
            logo_left: optional_url("LOGO_LEFT")?,
            logo_right: optional_url("LOGO_RIGHT")?,
            logo_size,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            listen_addr,
            portal_api_url,
            handbook_keys,
            handbook_fallback_html,
            links,
            branding,
        })
    }

    pub fn known_keys(&self) -> Vec<ContentKey> {
        self.handbook_keys.iter().map(|k| k.key.clone()).collect()
    }

    pub fn is_known_key(&self, key: &ContentKey) -> bool {
        self.handbook_keys.iter().any(|k| &k.key == key)
    }

    /// Tab label for `key`. The fallback tab and unknown keys use the key.
    pub fn label_for(&self, key: &ContentKey) -> String {
        self.handbook_keys
            .iter()
            .find(|k| &k.key == key)
            .map(|k| k.label.clone())
            .unwrap_or_else(|| {
                if key.is_fallback() {
                    "Employee Handbook".to_string()
                } else {
                    key.to_string()
                }
            })
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), AppError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", name, e)))
}
