//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

use crate::error::{LifemapError, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| LifemapError::Database(format!("Failed to create schema_version table: {}", e)))?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| LifemapError::Database(format!("Failed to clear schema_version: {}", e)))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .map_err(|e| LifemapError::Database(format!("Failed to set schema_version: {}", e)))?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(JOURNAL_SCHEMA)
        .map_err(|e| LifemapError::Database(format!("Failed to create journal tables: {}", e)))?;

    conn.execute_batch(INDEXES_SCHEMA)
        .map_err(|e| LifemapError::Database(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

/// Migrate schema from older version
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    match from_version {
        // Migration steps go here as the schema evolves
        _ => {}
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

/// Journal tables: the single-row birth anchor and the records
const JOURNAL_SCHEMA: &str = r#"
-- Birth anchor; exactly one row, written once on first run
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY,
    birthdate TEXT NOT NULL
);

-- Free-text records attached to time addresses
-- selected_list is the comma-wrapped serialization of the selection set
CREATE TABLE IF NOT EXISTS record (
    id INTEGER PRIMARY KEY,
    origin TEXT NOT NULL,
    text TEXT NOT NULL,
    show_above BOOLEAN NOT NULL DEFAULT 0,
    show_below BOOLEAN NOT NULL DEFAULT 0,
    selected_list TEXT,
    UNIQUE(origin, text)
);
"#;

/// Index definitions for the propagation queries
const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_record_origin ON record(origin);
CREATE INDEX IF NOT EXISTS idx_record_show_above ON record(show_above);
CREATE INDEX IF NOT EXISTS idx_record_show_below ON record(show_below);
"#;
