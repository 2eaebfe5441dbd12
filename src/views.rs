//! Derived record views
//!
//! Four lists per focused node, recomputed in full after every mutation:
//!
//! - **Self** - records created at the focused address
//! - **Selected** - records pinned to it through their selection set
//! - **HighTF** - ancestor records flagged show_below
//! - **LowTF** - descendant records flagged show_above
//!
//! The repository returns the raw ancestor/descendant-inclusive sets;
//! dropping records whose origin is exactly the focused address from
//! HighTF/LowTF happens here, at the presentation boundary.

use serde::Serialize;

use crate::db::Record;
use crate::error::Result;
use crate::nav::NavigationState;
use crate::repository::RecordRepository;

/// The four derived record lists for one focused node
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeViews {
    pub self_records: Vec<Record>,
    pub selected: Vec<Record>,
    pub high_tf: Vec<Record>,
    pub low_tf: Vec<Record>,
}

impl NodeViews {
    /// Compute all four views for the navigation state's selected child.
    /// With nothing selected every list is empty.
    pub fn compute(repo: &RecordRepository, nav: &NavigationState) -> Result<NodeViews> {
        let Some(focus) = nav.selected_child() else {
            return Ok(NodeViews::default());
        };
        let focus_key = focus.to_string();

        let self_records = repo.records_at(focus)?;
        let selected = repo.records_selecting(focus)?;

        let high_tf = repo
            .high_tf(focus)?
            .into_iter()
            .filter(|r| r.origin != focus_key)
            .collect();
        let low_tf = repo
            .low_tf(focus)?
            .into_iter()
            .filter(|r| r.origin != focus_key)
            .collect();

        Ok(NodeViews {
            self_records,
            selected,
            high_tf,
            low_tf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TimeAddress;

    fn addr(key: &str) -> TimeAddress {
        TimeAddress::parse(key).unwrap()
    }

    fn nav_at(focus: &str) -> NavigationState {
        let target = addr(focus);
        let mut nav = NavigationState::new();
        let symbols = target.symbols().to_vec();
        for (i, &symbol) in symbols.iter().enumerate() {
            assert!(nav.select_child(symbol));
            if i + 1 < symbols.len() {
                assert!(nav.go_down());
            }
        }
        nav
    }

    #[test]
    fn test_empty_without_selection() {
        let repo = RecordRepository::open_in_memory().unwrap();
        repo.create(&addr("AB"), "x").unwrap();
        let views = NodeViews::compute(&repo, &NavigationState::new()).unwrap();
        assert!(views.self_records.is_empty());
        assert!(views.selected.is_empty());
        assert!(views.high_tf.is_empty());
        assert!(views.low_tf.is_empty());
    }

    #[test]
    fn test_views_split_by_relationship() {
        let repo = RecordRepository::open_in_memory().unwrap();

        // At the focus itself.
        let here = repo.create(&addr("ABCC"), "here").unwrap().unwrap();
        // An ancestor propagating downward.
        let above = repo.create(&addr("AB"), "from above").unwrap().unwrap();
        repo.set_show_below(above, true).unwrap();
        // A descendant propagating upward.
        let below = repo.create(&addr("ABCCAF"), "from below").unwrap().unwrap();
        repo.set_show_above(below, true).unwrap();
        // Pinned from elsewhere.
        let pinned = repo.create(&addr("BA"), "pinned").unwrap().unwrap();
        repo.toggle_selection(pinned, &addr("ABCC")).unwrap();

        let views = NodeViews::compute(&repo, &nav_at("ABCC")).unwrap();
        assert_eq!(views.self_records.len(), 1);
        assert_eq!(views.self_records[0].id, here);
        assert_eq!(views.selected.len(), 1);
        assert_eq!(views.selected[0].id, pinned);
        assert_eq!(views.high_tf.len(), 1);
        assert_eq!(views.high_tf[0].id, above);
        assert_eq!(views.low_tf.len(), 1);
        assert_eq!(views.low_tf[0].id, below);
    }

    #[test]
    fn test_exact_origin_excluded_from_propagated_views() {
        let repo = RecordRepository::open_in_memory().unwrap();
        let id = repo.create(&addr("ABCC"), "both flags").unwrap().unwrap();
        repo.set_show_above(id, true).unwrap();
        repo.set_show_below(id, true).unwrap();

        let views = NodeViews::compute(&repo, &nav_at("ABCC")).unwrap();
        // Visible as a Self record only, despite both flags matching the
        // raw prefix queries.
        assert_eq!(views.self_records.len(), 1);
        assert!(views.high_tf.is_empty());
        assert!(views.low_tf.is_empty());
    }
}
