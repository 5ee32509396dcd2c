//! Configuration management
//!
//! Settings live in `<data_dir>/settings.json`:
//! ```json
//! {
//!   "app": { "demoMode": false },
//!   "server": { "host": "127.0.0.1", "port": 5000 },
//!   "auth": { "jwtSecret": "...", "hashing": { "memoryCost": 19456, "timeCost": 2, "parallelism": 1 } }
//! }
//! ```
//! Environment variables override the file: `JWT_SECRET`, `HOST`, `PORT`,
//! `PAPERTRADE_DEMO_MODE`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::HashingParams;

/// Secret used when nothing is configured. Tokens signed with it are
/// forgeable by anyone who has read this file.
pub const PLACEHOLDER_SECRET: &str = "your-secret-key";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    server: ServerSettings,
    #[serde(default)]
    auth: AuthSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jwt_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hashing: Option<HashingParams>,
}

/// Papertrade configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub hashing: HashingParams,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: PLACEHOLDER_SECRET.to_string(),
            hashing: HashingParams::default(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    match std::env::var(name).ok().as_deref() {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the data directory, then apply environment overrides
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;

        let demo_mode = parse_bool_env("PAPERTRADE_DEMO_MODE").unwrap_or(raw.app.demo_mode);

        let host = std::env::var("HOST")
            .ok()
            .or_else(|| raw.server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match std::env::var("PORT") {
            Ok(p) => p
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {}", p))?,
            Err(_) => raw.server.port.unwrap_or(DEFAULT_PORT),
        };

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| raw.auth.jwt_secret.clone())
            .unwrap_or_else(|| {
                warn!("JWT_SECRET is not set; signing tokens with the placeholder secret");
                PLACEHOLDER_SECRET.to_string()
            });

        Ok(Self {
            demo_mode,
            host,
            port,
            jwt_secret,
            hashing: raw.auth.hashing.unwrap_or_default(),
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    ///
    /// Only the demo flag is written back; the secret and listen address are
    /// left as they are in the file so env overrides never leak into it.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        let mut settings = read_settings(data_dir)?;
        settings.app.demo_mode = self.demo_mode;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.jwt_secret == PLACEHOLDER_SECRET
    }

    /// Database file for the current mode
    pub fn db_filename(&self) -> &'static str {
        if self.demo_mode {
            "demo.duckdb"
        } else {
            "papertrade.duckdb"
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    // Never fall back to defaults here; save would write them over the file
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", settings_path.display()))
}
