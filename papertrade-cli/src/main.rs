//! Papertrade CLI - auth server and account tools for the virtual trading app

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{account, demo, logs, serve, status};

/// Papertrade - virtual stock trading API
#[derive(Parser)]
#[command(name = "papertrade", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides HOST and settings)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides PORT and settings)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Register a new account
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        /// Login email
        #[arg(long)]
        email: String,
        /// Password (prompted if omitted)
        #[arg(long, env = "PAPERTRADE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in and print a bearer token
    Login {
        /// Login email
        #[arg(long)]
        email: String,
        /// Password (prompted if omitted)
        #[arg(long, env = "PAPERTRADE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the account a bearer token belongs to
    Whoami {
        /// Bearer token
        token: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show store and configuration summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

/// Initialize the tracing subscriber
///
/// RUST_LOG controls the level; the default is quieter for one-shot
/// commands than for the server.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info,warp=info",
        _ => "warn",
    };
    init_tracing(default_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => serve::run(host, port),
        Commands::Register { name, email, password, json } => {
            account::register(&name, &email, password, json)
        }
        Commands::Login { email, password, json } => account::login(&email, password, json),
        Commands::Whoami { token, json } => account::whoami(&token, json),
        Commands::Status { json } => status::run(json),
        Commands::Demo { command } => demo::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
