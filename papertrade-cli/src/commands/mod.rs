//! CLI command implementations

pub mod account;
pub mod demo;
pub mod logs;
pub mod serve;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use papertrade_core::{EntryPoint, LogEvent, LoggingService, PapertradeContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Record that a command ran, ignoring any errors
pub fn log_command(logger: &Option<LoggingService>, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PAPERTRADE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".papertrade"))
        .context("Could not find home directory; set PAPERTRADE_DIR")
}

/// Get or create papertrade context
pub fn get_context() -> Result<PapertradeContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    PapertradeContext::new(&data_dir).context("Failed to initialize papertrade context")
}

/// Password from the flag/env or an interactive prompt
pub fn resolve_password(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }

    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}
