//! Status service - store and configuration summary

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbCredentialStore;
use crate::config::Config;
use crate::ports::CredentialStore;

/// Status service for operator summaries
pub struct StatusService {
    store: Arc<DuckDbCredentialStore>,
}

impl StatusService {
    pub fn new(store: Arc<DuckDbCredentialStore>) -> Self {
        Self { store }
    }

    pub fn get_status(&self, config: &Config) -> Result<StatusSummary> {
        Ok(StatusSummary {
            total_principals: self.store.count()?,
            database_path: self
                .store
                .db_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            demo_mode: config.demo_mode,
            listen_addr: config.listen_addr(),
            placeholder_secret: config.uses_placeholder_secret(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_principals: u64,
    pub database_path: String,
    pub demo_mode: bool,
    pub listen_addr: String,
    /// True when tokens are signed with the built-in placeholder secret
    pub placeholder_secret: bool,
}
