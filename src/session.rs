//! Journal session
//!
//! Ties the repository, the birth anchor and the navigation state into
//! the single surface the UI collaborator consumes: pure label/validity
//! lookups, the navigation transitions, and `refresh`, which rebuilds the
//! complete view model (parent label, child slots, four record lists)
//! after every interaction. The UI owns rendering; nothing here knows
//! about widgets.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::address::TimeAddress;
use crate::error::{LifemapError, Result};
use crate::nav::NavigationState;
use crate::repository::RecordRepository;
use crate::timeframe::{is_navigable, is_valid, timeframe_label, BirthAnchor};
use crate::views::NodeViews;

/// One child button's worth of display state
#[derive(Debug, Clone, Serialize)]
pub struct ChildSlot {
    pub address: TimeAddress,
    pub label: String,
    /// False when the child denotes an unelapsed or pre-birth range
    pub enabled: bool,
    pub selected: bool,
    /// Text of the first record pinned to this child, if any
    pub pinned_preview: Option<String>,
}

/// Everything the UI needs to redraw after an interaction
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub parent_label: String,
    pub children: Vec<ChildSlot>,
    pub can_go_up: bool,
    pub can_go_down: bool,
    pub views: NodeViews,
}

pub struct Journal {
    repo: RecordRepository,
    anchor: BirthAnchor,
    nav: NavigationState,
}

impl Journal {
    /// Open a journal whose birth anchor is already stored.
    pub fn open(repo: RecordRepository) -> Result<Self> {
        let date = repo.birthdate()?.ok_or(LifemapError::BirthdateNotSet)?;
        Ok(Self {
            repo,
            anchor: BirthAnchor::new(date),
            nav: NavigationState::new(),
        })
    }

    /// First run: store the birth anchor, then open.
    pub fn initialize(repo: RecordRepository, birthdate: NaiveDate) -> Result<Self> {
        repo.set_birthdate(birthdate)?;
        Self::open(repo)
    }

    pub fn repo(&self) -> &RecordRepository {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut RecordRepository {
        &mut self.repo
    }

    pub fn anchor(&self) -> &BirthAnchor {
        &self.anchor
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    // ---- navigation ------------------------------------------------------

    pub fn select_child(&mut self, symbol: u8) -> bool {
        self.nav.select_child(symbol)
    }

    pub fn go_up(&mut self) -> bool {
        self.nav.go_up()
    }

    pub fn go_down(&mut self) -> bool {
        self.nav.go_down()
    }

    /// Jump the walk straight to `address`: its parent becomes the open
    /// node and the address itself the selection. The root opens with
    /// nothing selected.
    pub fn select_address(&mut self, address: &TimeAddress) -> Result<()> {
        if address.is_root() {
            self.nav = NavigationState::new();
            return Ok(());
        }
        let parent = address.parent()?;
        let mut nav = NavigationState::new();
        for (i, &symbol) in address.symbols().iter().enumerate() {
            if !nav.select_child(symbol) {
                return Err(LifemapError::OutOfRange { level: i, symbol });
            }
            if i + 1 < address.level() {
                nav.go_down();
            }
        }
        debug_assert_eq!(nav.current_parent(), &parent);
        self.nav = nav;
        Ok(())
    }

    // ---- presentation-pure lookups ----------------------------------------

    pub fn resolve_label(&self, address: &TimeAddress) -> String {
        timeframe_label(address, &self.anchor)
    }

    pub fn is_valid(&self, address: &TimeAddress) -> bool {
        is_valid(address, &self.anchor, now())
    }

    // ---- mutations ---------------------------------------------------------

    /// Create a record under the selected child. Without a selection this
    /// is a no-op, mirroring the create contract's absent-origin rule.
    pub fn create_record(&self, text: &str) -> Result<Option<i64>> {
        match self.nav.selected_child() {
            Some(child) => self.repo.create(child, text),
            None => {
                debug!("Ignoring create with no child selected");
                Ok(None)
            }
        }
    }

    // ---- view model ----------------------------------------------------------

    /// Rebuild the full view model against the current wall clock.
    pub fn refresh(&self) -> Result<ViewModel> {
        self.refresh_at(now())
    }

    /// Rebuild the full view model against an explicit clock.
    pub fn refresh_at(&self, now: NaiveDateTime) -> Result<ViewModel> {
        let parent = self.nav.current_parent();
        let mut children = Vec::with_capacity(parent.max_children());

        for symbol in 0..parent.max_children() as u8 {
            let address = parent.child(symbol)?;
            let pinned_preview = self
                .repo
                .records_selecting(&address)?
                .into_iter()
                .next()
                .map(|r| r.text);
            children.push(ChildSlot {
                label: timeframe_label(&address, &self.anchor),
                enabled: is_navigable(&address, &self.anchor, now),
                selected: self.nav.selected_child() == Some(&address),
                pinned_preview,
                address,
            });
        }

        Ok(ViewModel {
            parent_label: timeframe_label(parent, &self.anchor),
            children,
            can_go_up: self.nav.can_go_up(),
            can_go_down: self.nav.can_go_down(),
            views: NodeViews::compute(&self.repo, &self.nav)?,
        })
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
