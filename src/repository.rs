//! Record repository
//!
//! The single mutable resource of the system. Wraps the database with the
//! record contract: creation under the (origin, text) uniqueness
//! invariant, idempotent flag updates, selection-set toggling, and the
//! two-phase staged text edit.
//!
//! The pending-edit buffer is process-local and never persisted. Every
//! read overlays staged text over the stored value, so the four derived
//! views always reflect what the user currently sees in the editor.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::address::TimeAddress;
use crate::db::{records, JournalDb, Record};
use crate::error::{LifemapError, Result};

pub struct RecordRepository {
    db: JournalDb,
    /// Staged replacement texts by record id, not yet committed
    pending: HashMap<i64, String>,
}

impl RecordRepository {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            db: JournalDb::open(db_path)?,
            pending: HashMap::new(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: JournalDb::open_in_memory()?,
            pending: HashMap::new(),
        })
    }

    pub fn db(&self) -> &JournalDb {
        &self.db
    }

    // ---- birth anchor -------------------------------------------------

    pub fn birthdate(&self) -> Result<Option<NaiveDate>> {
        self.db.with_conn(records::get_birthdate)
    }

    /// Store the birth anchor. Set exactly once; a second call fails
    /// with `BirthdateAlreadySet`.
    pub fn set_birthdate(&self, date: NaiveDate) -> Result<()> {
        self.db.with_conn(|conn| records::insert_birthdate(conn, date))
    }

    // ---- record mutations ---------------------------------------------

    /// Create a record at `origin`. Empty text or the root origin is a
    /// no-op returning `None`; a duplicate (origin, text) pair fails
    /// with `DuplicateRecord`.
    pub fn create(&self, origin: &TimeAddress, text: &str) -> Result<Option<i64>> {
        if text.is_empty() || origin.is_root() {
            debug!("Ignoring create with empty text or root origin");
            return Ok(None);
        }
        let key = origin.to_string();
        let id = self
            .db
            .with_conn(|conn| records::insert_record(conn, &key, text))?;
        Ok(Some(id))
    }

    pub fn set_show_above(&self, id: i64, value: bool) -> Result<()> {
        self.db.with_conn(|conn| records::set_show_above(conn, id, value))
    }

    pub fn set_show_below(&self, id: i64, value: bool) -> Result<()> {
        self.db.with_conn(|conn| records::set_show_below(conn, id, value))
    }

    /// Flip `node_key`'s membership in the record's selection set and
    /// persist the re-serialized set.
    pub fn toggle_selection(&self, id: i64, node_key: &TimeAddress) -> Result<()> {
        let record = self.require(id)?;
        let mut set = record.selection_set();
        let key = node_key.to_string();
        if !set.remove(&key) {
            set.insert(key);
        }
        let serialized = records::serialize_selection(&set);
        self.db
            .with_conn(|conn| records::update_selected_list(conn, id, &serialized))
    }

    pub fn delete(&mut self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| records::delete_record(conn, id))?;
        self.pending.remove(&id);
        Ok(())
    }

    // ---- staged edits --------------------------------------------------

    /// Stage a replacement text for a record. Staging the stored text
    /// back clears the buffer entry instead (a no-op revert).
    pub fn stage_edit(&mut self, id: i64, new_text: &str) -> Result<()> {
        let stored = self.require_stored(id)?;
        if stored.text == new_text {
            self.pending.remove(&id);
        } else {
            self.pending.insert(id, new_text.to_string());
        }
        Ok(())
    }

    /// Persist the staged text, if any, and clear it. A commit with
    /// nothing staged is a no-op; a failed write leaves the buffer
    /// untouched.
    pub fn commit_edit(&mut self, id: i64) -> Result<()> {
        let Some(text) = self.pending.get(&id).cloned() else {
            return Ok(());
        };
        self.db.with_conn(|conn| records::update_text(conn, id, &text))?;
        self.pending.remove(&id);
        Ok(())
    }

    pub fn has_staged_edit(&self, id: i64) -> bool {
        self.pending.contains_key(&id)
    }

    // ---- reads (staged overlay applied) ---------------------------------

    pub fn get(&self, id: i64) -> Result<Option<Record>> {
        let rec = self.db.with_conn(|conn| records::get_record(conn, id))?;
        Ok(rec.map(|r| self.overlaid(r)))
    }

    /// Records created at exactly this address
    pub fn records_at(&self, origin: &TimeAddress) -> Result<Vec<Record>> {
        let key = origin.to_string();
        self.db
            .with_conn(|conn| records::records_at_origin(conn, &key))
            .map(|rs| self.overlay_all(rs))
    }

    /// Records pinned to this address through their selection set
    pub fn records_selecting(&self, address: &TimeAddress) -> Result<Vec<Record>> {
        let key = address.to_string();
        self.db
            .with_conn(|conn| records::records_selecting(conn, &key))
            .map(|rs| self.overlay_all(rs))
    }

    /// Ancestor records flagged show_below: origin is `address` or any
    /// strict prefix of it. Raw set; exact-origin exclusion is the
    /// caller's presentation concern.
    pub fn high_tf(&self, address: &TimeAddress) -> Result<Vec<Record>> {
        let prefixes: Vec<String> = address.ancestors().map(|a| a.to_string()).collect();
        self.db
            .with_conn(|conn| records::records_show_below(conn, &prefixes))
            .map(|rs| self.overlay_all(rs))
    }

    /// Descendant records flagged show_above: origin has `address` as a
    /// prefix. Raw set, as with `high_tf`.
    pub fn low_tf(&self, address: &TimeAddress) -> Result<Vec<Record>> {
        let key = address.to_string();
        self.db
            .with_conn(|conn| records::records_show_above(conn, &key))
            .map(|rs| self.overlay_all(rs))
    }

    fn require(&self, id: i64) -> Result<Record> {
        self.get(id)?.ok_or(LifemapError::NotFound(id))
    }

    fn require_stored(&self, id: i64) -> Result<Record> {
        self.db
            .with_conn(|conn| records::get_record(conn, id))?
            .ok_or(LifemapError::NotFound(id))
    }

    fn overlaid(&self, mut record: Record) -> Record {
        if let Some(text) = self.pending.get(&record.id) {
            record.text = text.clone();
        }
        record
    }

    fn overlay_all(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().map(|r| self.overlaid(r)).collect()
    }
}
