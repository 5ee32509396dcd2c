//! Status command - show store and configuration summary

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status(&ctx.config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Papertrade Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Accounts", &status.total_principals.to_string()]);
    table.add_row(vec!["Database", &status.database_path]);
    table.add_row(vec!["Listen address", &status.listen_addr]);
    table.add_row(vec!["Demo mode", if status.demo_mode { "on" } else { "off" }]);
    println!("{}", table);

    if status.placeholder_secret {
        println!();
        output::warning("JWT_SECRET is not set: tokens are signed with the placeholder secret.");
    }

    Ok(())
}
