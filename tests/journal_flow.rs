//! Integration tests for the full journal flow
//!
//! Drives the session surface against a real on-disk database the way
//! the UI collaborator would: navigate, mutate, refresh, and reopen.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tempfile::TempDir;

use lifemap::{Journal, LifemapError, RecordRepository, TimeAddress};

fn addr(key: &str) -> TimeAddress {
    TimeAddress::parse(key).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_time(NaiveTime::MIN)
}

/// Helper to open a journal over a temp directory, initializing the
/// birth anchor on first open
fn open_journal(dir: &TempDir) -> Journal {
    let repo = RecordRepository::open(&dir.path().join("journal.db")).unwrap();
    match Journal::open(repo) {
        Ok(journal) => journal,
        Err(LifemapError::BirthdateNotSet) => {
            let repo = RecordRepository::open(&dir.path().join("journal.db")).unwrap();
            Journal::initialize(repo, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()).unwrap()
        }
        Err(e) => panic!("open failed: {}", e),
    }
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let mut journal = open_journal(&dir);
        journal.select_address(&addr("AB")).unwrap();
        let id = journal.create_record("[Y2K] first note").unwrap().unwrap();
        journal.repo().set_show_below(id, true).unwrap();
        journal.repo().toggle_selection(id, &addr("ABCC")).unwrap();
    }

    let mut journal = open_journal(&dir);
    journal.select_address(&addr("AB")).unwrap();
    let vm = journal.refresh_at(at(2010, 1, 1)).unwrap();
    assert_eq!(vm.views.self_records.len(), 1);
    let rec = &vm.views.self_records[0];
    assert_eq!(rec.text, "[Y2K] first note");
    assert_eq!(rec.title(), Some("Y2K"));
    assert!(rec.show_below);
    assert_eq!(rec.selected_list, ",ABCC,");
}

#[test]
fn test_propagation_views_across_the_walk() {
    let dir = TempDir::new().unwrap();
    let mut journal = open_journal(&dir);

    journal.select_address(&addr("AB")).unwrap();
    let above = journal.create_record("decade-wide").unwrap().unwrap();
    journal.repo().set_show_below(above, true).unwrap();

    journal.select_address(&addr("ABCCAF")).unwrap();
    let below = journal.create_record("one fine day").unwrap().unwrap();
    journal.repo().set_show_above(below, true).unwrap();

    // At a node between the two, both propagate in.
    journal.select_address(&addr("ABCC")).unwrap();
    let vm = journal.refresh_at(at(2010, 1, 1)).unwrap();
    assert!(vm.views.self_records.is_empty());
    assert_eq!(vm.views.high_tf.len(), 1);
    assert_eq!(vm.views.high_tf[0].id, above);
    assert_eq!(vm.views.low_tf.len(), 1);
    assert_eq!(vm.views.low_tf[0].id, below);

    // On an unrelated branch, neither shows.
    journal.select_address(&addr("BA")).unwrap();
    let vm = journal.refresh_at(at(2015, 1, 1)).unwrap();
    assert!(vm.views.high_tf.is_empty());
    assert!(vm.views.low_tf.is_empty());

    // At the ancestor's own node the record is Self, not HighTF.
    journal.select_address(&addr("AB")).unwrap();
    let vm = journal.refresh_at(at(2010, 1, 1)).unwrap();
    assert_eq!(vm.views.self_records.len(), 1);
    assert!(vm.views.high_tf.is_empty());
    // The descendant's flagged record is still LowTF here.
    assert_eq!(vm.views.low_tf.len(), 1);
}

#[test]
fn test_duplicate_create_leaves_first_record_intact() {
    let dir = TempDir::new().unwrap();
    let mut journal = open_journal(&dir);

    journal.select_address(&addr("AB")).unwrap();
    journal.create_record("x").unwrap().unwrap();
    assert!(matches!(
        journal.create_record("x"),
        Err(LifemapError::DuplicateRecord { .. })
    ));

    let vm = journal.refresh_at(at(2010, 1, 1)).unwrap();
    assert_eq!(vm.views.self_records.len(), 1);
}

#[test]
fn test_staged_edit_is_transient_across_reopen() {
    let dir = TempDir::new().unwrap();
    let id;

    {
        let mut journal = open_journal(&dir);
        journal.select_address(&addr("AB")).unwrap();
        id = journal.create_record("original").unwrap().unwrap();
        journal.repo_mut().stage_edit(id, "staged only").unwrap();
        // Overlay is visible through the views...
        let vm = journal.refresh_at(at(2010, 1, 1)).unwrap();
        assert_eq!(vm.views.self_records[0].text, "staged only");
        // ...but never committed.
    }

    let journal = open_journal(&dir);
    assert_eq!(journal.repo().get(id).unwrap().unwrap().text, "original");
}

#[test]
fn test_navigation_enablement_follows_validity() {
    let dir = TempDir::new().unwrap();
    let mut journal = open_journal(&dir);

    // Walk into the first decade in mid-2005.
    journal.select_child(0);
    journal.go_down();
    let vm = journal.refresh_at(at(2005, 6, 1)).unwrap();
    assert_eq!(vm.parent_label, "2000 - 2010");
    assert!(vm.can_go_up);
    assert!(!vm.can_go_down);

    // Years 2000-2005 have begun, 2006-2009 have not.
    let enabled: Vec<bool> = vm.children.iter().map(|c| c.enabled).collect();
    assert_eq!(
        enabled,
        vec![true, true, true, true, true, true, false, false, false, false]
    );

    // Selecting an elapsed year enables descent.
    journal.select_child(3);
    let vm = journal.refresh_at(at(2005, 6, 1)).unwrap();
    assert!(vm.can_go_down);
    assert!(vm.children[3].selected);
}
