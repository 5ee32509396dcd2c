//! Demo service - manage demo mode
//!
//! Demo mode runs against a separate demo.duckdb seeded with a known
//! principal, so the front end can be tried without registering.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::adapters::duckdb::DuckDbCredentialStore;
use crate::config::Config;
use crate::domain::result::Error;
use crate::services::AuthService;

pub const DEMO_NAME: &str = "Demo User";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password123";

/// Demo service for managing demo mode
pub struct DemoService {
    data_dir: PathBuf,
}

impl DemoService {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Check if demo mode is currently enabled
    pub fn is_enabled(&self) -> Result<bool> {
        let config = Config::load(&self.data_dir)?;
        Ok(config.demo_mode)
    }

    /// Enable demo mode
    ///
    /// 1. Delete any existing demo database (fresh start)
    /// 2. Enable demo mode in config
    /// 3. Create the demo database and seed the demo principal
    pub fn enable(&self) -> Result<()> {
        self.remove_demo_db()?;

        let mut config = Config::load(&self.data_dir)?;
        config.enable_demo_mode();
        config.save(&self.data_dir)?;

        let store = DuckDbCredentialStore::new(&self.data_dir.join(config.db_filename()))?;
        store.ensure_schema()?;
        let auth = AuthService::new(Arc::new(store), config.hashing, config.jwt_secret.as_bytes())?;
        Self::seed(&auth)?;

        Ok(())
    }

    /// Disable demo mode, optionally deleting the demo database
    pub fn disable(&self, clean: bool) -> Result<()> {
        let mut config = Config::load(&self.data_dir)?;
        config.disable_demo_mode();
        config.save(&self.data_dir)?;

        if clean {
            self.remove_demo_db()?;
        }

        Ok(())
    }

    /// Register the demo principal unless it already exists.
    /// Returns true if it was created.
    pub fn seed(auth: &AuthService) -> Result<bool> {
        match auth.register(DEMO_NAME, DEMO_EMAIL, DEMO_PASSWORD) {
            Ok(_) => Ok(true),
            Err(Error::Conflict) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_demo_db(&self) -> Result<()> {
        let demo_db = self.data_dir.join("demo.duckdb");
        let demo_wal = self.data_dir.join("demo.duckdb.wal");
        if demo_db.exists() {
            std::fs::remove_file(&demo_db)?;
        }
        if demo_wal.exists() {
            std::fs::remove_file(&demo_wal)?;
        }
        Ok(())
    }
}
