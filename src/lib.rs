//! Lifemap - a personal life-journal core
//!
//! Attaches free-text records to points and ranges of a single lifetime,
//! organized through a fixed-depth time subdivision:
//! decade -> year -> quarter -> month -> week -> day -> day part -> hour.
//!
//! ## Architecture
//!
//! - **address**: the 8-level `TimeAddress` algebra (letter encoding,
//!   level table, parent/child moves)
//! - **timeframe**: address-to-calendar resolution against the birth
//!   anchor, display labels, validity rules
//! - **db**: SQLite persistence (single-row birth anchor + records)
//! - **repository**: the record contract - creation, flags, selection
//!   sets, the two-phase staged text edit
//! - **views**: the four derived record lists (Self / Selected /
//!   HighTF / LowTF) computed over prefix relationships
//! - **nav**: the current-parent/selected-child walk state machine
//! - **session**: the view-model surface consumed by a UI collaborator
//!
//! Single actor, no background work: every mutation commits before the
//! views are recomputed, so read-after-write consistency is trivial.

pub mod address;
pub mod config;
pub mod db;
pub mod error;
pub mod nav;
pub mod repository;
pub mod session;
pub mod timeframe;
pub mod views;

// Re-exports
pub use address::{TimeAddress, LEVELS, MAX_DEPTH};
pub use config::Config;
pub use db::{JournalDb, Record};
pub use error::{LifemapError, Result};
pub use nav::NavigationState;
pub use repository::RecordRepository;
pub use session::{ChildSlot, Journal, ViewModel};
pub use timeframe::{is_navigable, is_valid, resolve_range, timeframe_label, BirthAnchor};
pub use views::NodeViews;
