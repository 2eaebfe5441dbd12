//! Record CRUD and the propagation queries
//!
//! Raw SQL layer; every function takes a borrowed connection. The staged
//! text overlay lives one layer up in the repository, so everything here
//! reads and writes stored values only.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LifemapError, Result};

/// A record row from the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    /// Address the record was created under
    pub origin: String,
    pub text: String,
    /// Propagate visibility to descendant addresses (LowTF)
    pub show_above: bool,
    /// Propagate visibility to ancestor addresses (HighTF)
    pub show_below: bool,
    /// Comma-wrapped serialization of the selection set
    pub selected_list: String,
}

impl Record {
    fn from_row(row: &Row) -> std::result::Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            origin: row.get("origin")?,
            text: row.get("text")?,
            show_above: row.get("show_above")?,
            show_below: row.get("show_below")?,
            selected_list: row
                .get::<_, Option<String>>("selected_list")?
                .unwrap_or_default(),
        })
    }

    /// Leading bracketed title segment of the text, if present:
    /// `"[Trip] we drove north"` has title `"Trip"`.
    pub fn title(&self) -> Option<&str> {
        let rest = self.text.strip_prefix('[')?;
        let end = rest.find(']')?;
        Some(&rest[..end])
    }

    /// The selection set parsed from its stored serialization.
    pub fn selection_set(&self) -> BTreeSet<String> {
        parse_selection(&self.selected_list)
    }
}

/// Parse the delimited selection-set serialization, dropping empty entries.
pub fn parse_selection(serialized: &str) -> BTreeSet<String> {
    serialized
        .split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

/// Serialize a selection set: comma-wrapped, sorted, no empty entries.
/// The empty set serializes to the empty string.
pub fn serialize_selection(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        return String::new();
    }
    let mut out = String::from(",");
    for entry in set {
        out.push_str(entry);
        out.push(',');
    }
    out
}

/// Insert a record, enforcing the (origin, text) uniqueness invariant.
pub fn insert_record(conn: &Connection, origin: &str, text: &str) -> Result<i64> {
    debug!("Inserting record at {:?}", origin);
    conn.execute(
        "INSERT INTO record (origin, text) VALUES (?, ?)",
        params![origin, text],
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => LifemapError::DuplicateRecord {
            origin: origin.to_string(),
            text: text.to_string(),
        },
        _ => LifemapError::Database(format!("Insert failed: {}", e)),
    })?;
    Ok(conn.last_insert_rowid())
}

/// Get a record by id
pub fn get_record(conn: &Connection, id: i64) -> Result<Option<Record>> {
    let mut stmt = conn
        .prepare("SELECT * FROM record WHERE id = ?")
        .map_err(|e| LifemapError::Database(format!("Prepare failed: {}", e)))?;

    let mut rows = stmt
        .query(params![id])
        .map_err(|e| LifemapError::Database(format!("Query failed: {}", e)))?;

    match rows
        .next()
        .map_err(|e| LifemapError::Database(format!("Row fetch failed: {}", e)))?
    {
        Some(row) => Ok(Some(Record::from_row(row).map_err(|e| {
            LifemapError::Database(format!("Row parse failed: {}", e))
        })?)),
        None => Ok(None),
    }
}

fn update_one(conn: &Connection, sql: &str, p: impl rusqlite::Params, id: i64) -> Result<()> {
    let changed = conn
        .execute(sql, p)
        .map_err(|e| LifemapError::Database(format!("Update failed: {}", e)))?;
    if changed == 0 {
        return Err(LifemapError::NotFound(id));
    }
    Ok(())
}

pub fn set_show_above(conn: &Connection, id: i64, value: bool) -> Result<()> {
    update_one(
        conn,
        "UPDATE record SET show_above = ? WHERE id = ?",
        params![value, id],
        id,
    )
}

pub fn set_show_below(conn: &Connection, id: i64, value: bool) -> Result<()> {
    update_one(
        conn,
        "UPDATE record SET show_below = ? WHERE id = ?",
        params![value, id],
        id,
    )
}

pub fn update_text(conn: &Connection, id: i64, text: &str) -> Result<()> {
    update_one(
        conn,
        "UPDATE record SET text = ? WHERE id = ?",
        params![text, id],
        id,
    )
}

pub fn update_selected_list(conn: &Connection, id: i64, serialized: &str) -> Result<()> {
    update_one(
        conn,
        "UPDATE record SET selected_list = ? WHERE id = ?",
        params![serialized, id],
        id,
    )
}

pub fn delete_record(conn: &Connection, id: i64) -> Result<()> {
    update_one(conn, "DELETE FROM record WHERE id = ?", params![id], id)
}

fn collect_records(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Record>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| LifemapError::Database(format!("Prepare failed: {}", e)))?;

    let rows = stmt
        .query_map(params, Record::from_row)
        .map_err(|e| LifemapError::Database(format!("Query failed: {}", e)))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| LifemapError::Database(format!("Row parse failed: {}", e)))
}

/// Records created at exactly this origin
pub fn records_at_origin(conn: &Connection, origin: &str) -> Result<Vec<Record>> {
    collect_records(
        conn,
        "SELECT * FROM record WHERE origin = ? ORDER BY id",
        &[&origin],
    )
}

/// Records whose selection set contains `node_key` as an exact,
/// delimiter-bounded member
pub fn records_selecting(conn: &Connection, node_key: &str) -> Result<Vec<Record>> {
    collect_records(
        conn,
        "SELECT * FROM record
         WHERE ',' || COALESCE(selected_list, '') || ',' LIKE '%,' || ? || ',%'
         ORDER BY id",
        &[&node_key],
    )
}

/// Records flagged show_below whose origin is one of the given prefixes
/// (the ancestor chain of the querying node)
pub fn records_show_below(conn: &Connection, prefixes: &[String]) -> Result<Vec<Record>> {
    if prefixes.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders: Vec<&str> = prefixes.iter().map(|_| "?").collect();
    let sql = format!(
        "SELECT * FROM record WHERE origin IN ({}) AND show_below = 1 ORDER BY id",
        placeholders.join(", ")
    );
    let params: Vec<&dyn rusqlite::ToSql> =
        prefixes.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
    collect_records(conn, &sql, &params)
}

/// Records flagged show_above whose origin lies at or below `prefix`
pub fn records_show_above(conn: &Connection, prefix: &str) -> Result<Vec<Record>> {
    collect_records(
        conn,
        "SELECT * FROM record WHERE origin LIKE ? || '%' AND show_above = 1 ORDER BY id",
        &[&prefix],
    )
}

/// Read the birth anchor, if set
pub fn get_birthdate(conn: &Connection) -> Result<Option<NaiveDate>> {
    let stored: Option<String> = conn
        .query_row("SELECT birthdate FROM user LIMIT 1", [], |row| row.get(0))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(LifemapError::Database(format!("Query failed: {}", other))),
        })?;

    match stored {
        Some(s) => {
            let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                LifemapError::Database(format!("Stored birthdate {:?} is malformed: {}", s, e))
            })?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

/// Write the birth anchor; fails if one is already stored
pub fn insert_birthdate(conn: &Connection, date: NaiveDate) -> Result<()> {
    if get_birthdate(conn)?.is_some() {
        return Err(LifemapError::BirthdateAlreadySet);
    }
    conn.execute(
        "INSERT INTO user (birthdate) VALUES (?)",
        params![date.format("%Y-%m-%d").to_string()],
    )
    .map_err(|e| LifemapError::Database(format!("Insert failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_round_trip() {
        let set: BTreeSet<String> = ["A", "AB"].iter().map(|s| s.to_string()).collect();
        let serialized = serialize_selection(&set);
        assert_eq!(serialized, ",A,AB,");
        assert_eq!(parse_selection(&serialized), set);
    }

    #[test]
    fn test_selection_empty_and_noise() {
        assert!(parse_selection("").is_empty());
        assert!(parse_selection(",,,").is_empty());
        assert_eq!(serialize_selection(&BTreeSet::new()), "");
        // Duplicate and empty entries collapse on parse.
        let parsed = parse_selection(",A,,A,B,");
        let expected: BTreeSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_title_extraction() {
        let mut rec = Record {
            id: 1,
            origin: "AB".to_string(),
            text: "[Trip] we drove north".to_string(),
            show_above: false,
            show_below: false,
            selected_list: String::new(),
        };
        assert_eq!(rec.title(), Some("Trip"));
        rec.text = "no title here".to_string();
        assert_eq!(rec.title(), None);
        rec.text = "[unterminated".to_string();
        assert_eq!(rec.title(), None);
    }
}
