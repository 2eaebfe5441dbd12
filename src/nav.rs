//! Tree-walk navigation state
//!
//! The walk holds the node currently open (`current_parent`) and at most
//! one selected direct child. Transitions that fail their precondition
//! are no-ops returning `false`, never errors; the UI collaborator uses
//! `can_go_up`/`can_go_down` for button enablement.

use crate::address::{TimeAddress, MAX_DEPTH};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_parent: TimeAddress,
    selected_child: Option<TimeAddress>,
}

impl NavigationState {
    /// Start at the root with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_parent(&self) -> &TimeAddress {
        &self.current_parent
    }

    pub fn selected_child(&self) -> Option<&TimeAddress> {
        self.selected_child.as_ref()
    }

    /// Select a direct child of the current parent.
    pub fn select_child(&mut self, symbol: u8) -> bool {
        match self.current_parent.child(symbol) {
            Ok(child) => {
                self.selected_child = Some(child);
                true
            }
            Err(_) => false,
        }
    }

    pub fn can_go_up(&self) -> bool {
        self.current_parent.level() > 0
    }

    /// Descending needs a selection, and hour-level nodes have no
    /// children to open.
    pub fn can_go_down(&self) -> bool {
        self.selected_child.is_some() && self.current_parent.level() < MAX_DEPTH - 1
    }

    /// Open the selected child, clearing the selection.
    pub fn go_down(&mut self) -> bool {
        if !self.can_go_down() {
            return false;
        }
        if let Some(child) = self.selected_child.take() {
            self.current_parent = child;
            true
        } else {
            false
        }
    }

    /// Reopen the parent of the current node, clearing the selection.
    pub fn go_up(&mut self) -> bool {
        match self.current_parent.parent() {
            Ok(parent) => {
                self.current_parent = parent;
                self.selected_child = None;
                true
            }
            Err(_) => false,
        }
    }
}
