//! Event log migrations - embedded SQL files
//!
//! The event log lives in its own database (logs.duckdb) so it can be
//! cleared or exported without touching credentials. Same (name, sql) layout
//! as the credential migrations.

/// All log migrations, embedded at compile time.
///
/// IMPORTANT: When adding a new migration:
/// 1. Create the SQL file: NNN_description.sql
/// 2. Add an entry here in order
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
