//! Account commands - register, login, whoami against the local store

use anyhow::Result;
use colored::Colorize;
use papertrade_core::{AuthSession, LogEvent};

use super::{get_context, get_logger, log_command, log_event, resolve_password};
use crate::output;

fn print_session(session: &AuthSession, json: bool, headline: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
        return Ok(());
    }

    output::success(headline);
    println!("{}", output::profile_table(&session.user));
    println!();
    println!("{}", "Token".bold());
    println!("{}", session.token);
    Ok(())
}

pub fn register(name: &str, email: &str, password: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_command(&logger, "register");

    let password = resolve_password(password, true)?;
    let ctx = get_context()?;
    let session = ctx.auth_service.register(name, email, &password)?;

    log_event(
        &logger,
        LogEvent::new("principal_registered")
            .with_principal(session.user.id)
            .with_command("register"),
    );
    print_session(&session, json, "Account created")
}

pub fn login(email: &str, password: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_command(&logger, "login");

    let password = resolve_password(password, false)?;
    let ctx = get_context()?;
    let session = match ctx.auth_service.login(email, &password) {
        Ok(s) => s,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("login_failed")
                    .with_command("login")
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };

    log_event(
        &logger,
        LogEvent::new("login_succeeded")
            .with_principal(session.user.id)
            .with_command("login"),
    );
    print_session(&session, json, "Logged in")
}

pub fn whoami(token: &str, json: bool) -> Result<()> {
    log_command(&get_logger(), "whoami");

    let ctx = get_context()?;
    let id = ctx.auth_service.verify(token)?;
    let profile = ctx.auth_service.get_profile(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let claims = ctx.auth_service.signer().decode_claims(token)?;
    println!("{}", output::profile_table(&profile));
    if let Some(expires) = chrono::DateTime::from_timestamp(claims.exp, 0) {
        println!("Token expires {}", expires.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
