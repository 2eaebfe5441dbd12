//! SQLite database module for journal storage
//!
//! ## Tables
//!
//! - `user` - the single-row birth anchor
//! - `record` - free-text records keyed by (origin address, text)
//!
//! Access is serialized through a `Mutex<Connection>`; every mutation is
//! its own transaction, committed before control returns to the caller.

pub mod records;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{LifemapError, Result};

/// SQLite database for the journal
pub struct JournalDb {
    conn: Mutex<Connection>,
}

impl JournalDb {
    /// Open or create the journal database
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("Opening SQLite database at {:?}", db_path);

        let conn = Connection::open(db_path)
            .map_err(|e| LifemapError::Database(format!("Failed to open SQLite: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| LifemapError::Database(format!("Failed to set PRAGMA: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()
            .map_err(|e| LifemapError::Database(format!("Failed to open in-memory SQLite: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.init_schema()?;

        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LifemapError::Database(format!("Lock poisoned: {}", e)))?;

        schema::init_schema(&conn)?;

        Ok(())
    }

    /// Run a closure against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LifemapError::Database(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        self.with_conn(|conn| {
            let record_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM record", [], |row| row.get(0))
                .map_err(|e| LifemapError::Database(format!("Query failed: {}", e)))?;

            let flagged_above: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM record WHERE show_above = 1",
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| LifemapError::Database(format!("Query failed: {}", e)))?;

            let flagged_below: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM record WHERE show_below = 1",
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| LifemapError::Database(format!("Query failed: {}", e)))?;

            Ok(DbStats {
                record_count: record_count as u64,
                flagged_above: flagged_above as u64,
                flagged_below: flagged_below as u64,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub record_count: u64,
    pub flagged_above: u64,
    pub flagged_below: u64,
}

// Re-exports
pub use records::Record;
