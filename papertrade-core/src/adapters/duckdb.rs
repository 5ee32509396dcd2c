//! DuckDB credential store implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection, OptionalExt};
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{NewPrincipal, Principal, PublicProfile};
use crate::ports::CredentialStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Check if an error message is DuckDB reporting a uniqueness violation
fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

/// DuckDB-backed credential store
///
/// One connection guarded by a mutex. Either file-backed (the normal server
/// setup) or in-memory (tests and throwaway runs).
pub struct DuckDbCredentialStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbCredentialStore {
    /// Open (or create) a file-backed store
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when the CLI and a running server touch the same file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            "Database busy, retrying: {}",
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a store that lives only as long as this value
    pub fn in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn row_to_principal(row: &duckdb::Row) -> duckdb::Result<Principal> {
        // 0: principal_id, 1: name, 2: email, 3: password_digest, 4: balance, 5: created_at
        let id_str: String = row.get(0)?;
        let balance_str: String = row.get(4)?;
        let created_str: String = row.get(5)?;

        Ok(Principal {
            id: parse_uuid(&id_str),
            name: row.get(1)?,
            email: row.get(2)?,
            password_digest: row.get(3)?,
            balance: parse_decimal(&balance_str),
            created_at: parse_timestamp(&created_str),
        })
    }

    fn row_to_profile(row: &duckdb::Row) -> duckdb::Result<PublicProfile> {
        // 0: principal_id, 1: name, 2: email, 3: balance
        let id_str: String = row.get(0)?;
        let balance_str: String = row.get(3)?;

        Ok(PublicProfile {
            id: parse_uuid(&id_str),
            name: row.get(1)?,
            email: row.get(2)?,
            balance: parse_decimal(&balance_str),
        })
    }
}

impl CredentialStore for DuckDbCredentialStore {
    fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        let conn = self.lock()?;
        let principal = conn
            .query_row(
                "SELECT principal_id, name, email, password_digest,
                        CAST(balance AS VARCHAR), created_at
                 FROM sys_principals WHERE email = ?",
                [email],
                Self::row_to_principal,
            )
            .optional()?;
        Ok(principal)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PublicProfile>> {
        let conn = self.lock()?;
        // The digest column is not selected
        let profile = conn
            .query_row(
                "SELECT principal_id, name, email, CAST(balance AS VARCHAR)
                 FROM sys_principals WHERE principal_id = ?",
                [id.to_string()],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    fn create(&self, new: NewPrincipal) -> Result<Principal> {
        let conn = self.lock()?;

        // Cheap early exit; the UNIQUE constraint below is what actually holds
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_principals WHERE email = ?",
            [new.email.as_str()],
            |row| row.get(0),
        )?;
        if exists > 0 {
            return Err(Error::Conflict);
        }

        let principal = Principal::from_new(new);
        let inserted = conn.execute(
            "INSERT INTO sys_principals
                (principal_id, name, email, password_digest, balance, created_at)
             VALUES (?, ?, ?, ?, CAST(? AS DECIMAL(18, 2)), ?)",
            params![
                principal.id.to_string(),
                principal.name,
                principal.email,
                principal.password_digest,
                principal.balance.to_string(),
                principal.created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => Ok(principal),
            Err(e) if is_unique_violation(&e.to_string()) => Err(Error::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_principals", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

// Helper functions

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_default()
}

fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_default()
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
