/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Reference ICs, keyed by name
CREATE TABLE IF NOT EXISTS catalog_entries (
    name TEXT PRIMARY KEY,
    readings TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    photo TEXT,
    messages TEXT,
    comparison_results TEXT NOT NULL DEFAULT '[]',
    added_manually INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_catalog_entries_timestamp ON catalog_entries(timestamp);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
