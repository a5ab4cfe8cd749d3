//! Database Schema Definitions
//!
//! Every logical table shares one layout: a text key, the JSON record and the
//! time of the last write. Migrations add what the shared layout cannot
//! express, such as expression indexes on foreign keys.

use super::Table;

/// Current database schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Schema migration versions
pub const MIGRATION_VERSIONS: &[i32] = &[1];

/// `CREATE TABLE` statement for a logical table
pub fn create_table_sql(table: Table) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            key TEXT PRIMARY KEY NOT NULL,
            record TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        table.name()
    )
}

/// Statements applied by a migration
pub fn migration_statements(version: i32) -> &'static [&'static str] {
    match version {
        1 => &[
            "CREATE INDEX IF NOT EXISTS idx_rooms_property_id
                ON rooms (json_extract(record, '$.property_id'))",
            "CREATE INDEX IF NOT EXISTS idx_tenants_room_id
                ON tenants (json_extract(record, '$.room_id'))",
            "CREATE INDEX IF NOT EXISTS idx_payment_records_room_id
                ON payment_records (json_extract(record, '$.room_id'))",
        ],
        _ => &[],
    }
}

/// Check if database needs migration
pub fn needs_migration(current_version: i32) -> bool {
    current_version < CURRENT_SCHEMA_VERSION
}

/// Get pending migrations
pub fn get_pending_migrations(current_version: i32) -> Vec<i32> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .cloned()
        .collect()
}
