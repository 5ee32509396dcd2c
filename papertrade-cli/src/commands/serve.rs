//! Serve command - run the HTTP API

use std::sync::Arc;

use anyhow::{Context, Result};
use papertrade_core::api::{self, AppState};
use papertrade_core::{EntryPoint, LoggingService};
use tracing::{info, warn};

use super::get_context;

pub fn run(host: Option<String>, port: Option<u16>) -> Result<()> {
    let ctx = get_context()?;

    let addr = format!(
        "{}:{}",
        host.unwrap_or_else(|| ctx.config.host.clone()),
        port.unwrap_or(ctx.config.port)
    );

    if ctx.config.uses_placeholder_secret() {
        warn!("Tokens are signed with the placeholder secret; set JWT_SECRET before exposing this server");
    }
    if ctx.config.demo_mode {
        info!("Demo mode is on; demo@example.com / password123 is available");
    }

    let mut state = AppState::new(Arc::clone(&ctx.auth_service));
    match LoggingService::new(&ctx.data_dir, EntryPoint::Server, env!("CARGO_PKG_VERSION")) {
        Ok(logger) => {
            let _ = logger.log_event("server_started");
            state = state.with_logger(Arc::new(logger));
        }
        Err(e) => warn!("Event log unavailable: {:#}", e),
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let socket_addr = tokio::net::lookup_host(&addr)
            .await
            .with_context(|| format!("Failed to resolve {}", addr))?
            .next()
            .with_context(|| format!("No address found for {}", addr))?;

        let (bound, server) = api::bind(socket_addr, state)
            .with_context(|| format!("Failed to bind {}", socket_addr))?;
        info!("Server running on {}", bound);

        server.await;
        info!("Server stopped");
        Ok(())
    })
}
