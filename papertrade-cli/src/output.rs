//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use papertrade_core::PublicProfile;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Key-value table for a profile
pub fn profile_table(profile: &PublicProfile) -> Table {
    let mut table = create_table();
    table.add_row(vec!["ID", &profile.id.to_string()]);
    table.add_row(vec!["Name", &profile.name]);
    table.add_row(vec!["Email", &profile.email]);
    table.add_row(vec!["Balance", &profile.balance.to_string()]);
    table
}
