//! Papertrade Core - accounts and sessions for the virtual trading API
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Principal, PublicProfile) and errors
//! - **ports**: Trait definitions for external dependencies (CredentialStore)
//! - **services**: Business logic (AuthService, hashing, tokens, event log)
//! - **adapters**: Concrete implementations (DuckDB)
//! - **api**: HTTP surface over the auth service

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbCredentialStore;
use config::Config;
use services::{DemoService, StatusService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Principal, PublicProfile};
pub use ports::CredentialStore;
pub use services::{AuthService, AuthSession, EntryPoint, LogEvent, LoggingService};

/// Main context for Papertrade operations
///
/// Holds the configuration, the credential store and the services built on
/// it. Both the server and the CLI commands start from here.
pub struct PapertradeContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: Arc<DuckDbCredentialStore>,
    pub auth_service: Arc<AuthService>,
    pub status_service: StatusService,
}

impl PapertradeContext {
    /// Create a new context rooted at `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let db_path = data_dir.join(config.db_filename());
        let store = Arc::new(
            DuckDbCredentialStore::new(&db_path)
                .with_context(|| format!("Failed to open {}", db_path.display()))?,
        );
        store.ensure_schema()?;

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            config.hashing,
            config.jwt_secret.as_bytes(),
        )?);

        if config.demo_mode {
            DemoService::seed(&auth_service)?;
        }

        let status_service = StatusService::new(Arc::clone(&store));

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            store,
            auth_service,
            status_service,
        })
    }
}
