//! Address-to-calendar resolution and validity
//!
//! Resolution walks the level table: starting from the birth-year start
//! (January 1 of the birth year), each symbol advances the cursor by
//! `symbol * multiplier` of its level's unit; the range end is one more
//! multiplier of the last level processed.
//!
//! Two different anchors are deliberate and fixed contract: resolution is
//! anchored at the birth-year start, while the lower validity bound is the
//! literal birth date. A decade that opens before the user was born is
//! therefore not navigable even though it resolves to a calendar range.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::address::{TimeAddress, Unit, LEVELS, MAX_DEPTH};
use crate::error::{LifemapError, Result};

/// The immutable birth anchor, set once on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthAnchor {
    date: NaiveDate,
}

impl BirthAnchor {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// The literal birth date, midnight. Lower validity bound.
    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    /// January 1 of the birth year, midnight. Zero-point for resolution.
    pub fn year_start(&self) -> NaiveDateTime {
        self.date
            .with_ordinal(1)
            .unwrap_or(self.date)
            .and_time(NaiveTime::MIN)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

fn advance(cursor: NaiveDateTime, unit: Unit, steps: i64) -> Result<NaiveDateTime> {
    let moved = match unit {
        Unit::Years => cursor.checked_add_months(Months::new((steps * 12) as u32)),
        Unit::Months => cursor.checked_add_months(Months::new(steps as u32)),
        Unit::Days => cursor.checked_add_days(Days::new(steps as u64)),
        Unit::Hours => cursor.checked_add_signed(chrono::Duration::hours(steps)),
    };
    moved.ok_or_else(|| {
        LifemapError::Timeframe(format!("date overflow advancing {} {:?}", steps, unit))
    })
}

/// Resolve an address to its absolute calendar range.
///
/// The root resolves to the identity range at the birth-year start;
/// callers treat it specially as "Lifetime".
pub fn resolve_range(
    address: &TimeAddress,
    anchor: &BirthAnchor,
) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let mut start = anchor.year_start();
    if address.is_root() {
        return Ok((start, start));
    }
    let mut last = &LEVELS[0];
    for (i, &symbol) in address.symbols().iter().enumerate() {
        let level = &LEVELS[i];
        start = advance(start, level.unit, symbol as i64 * level.multiplier as i64)?;
        last = level;
    }
    let end = advance(start, last.unit, last.multiplier as i64)?;
    Ok((start, end))
}

/// Level-appropriate display label for an address.
///
/// Arithmetic failures surface as a `"Timeframe Error: ..."` string
/// rather than an error; label rendering must never abort a view refresh.
pub fn timeframe_label(address: &TimeAddress, anchor: &BirthAnchor) -> String {
    if address.is_root() {
        return "Lifetime".to_string();
    }
    match resolve_range(address, anchor) {
        Ok((start, end)) => format_label(address.level(), start, end),
        Err(e) => format!("Timeframe Error: {}", e),
    }
}

fn format_label(level: usize, start: NaiveDateTime, end: NaiveDateTime) -> String {
    let month = start.format("%b");
    match level {
        1 => format!("{} - {}", start.year(), end.year()),
        2 => format!("{}", start.year()),
        3 => format!("{} : {} - {}", start.year(), month, end.format("%b")),
        4 => format!("{} : {}", start.year(), month),
        5 => format!("{} {} : {} - {}", start.year(), month, start.day(), end.day()),
        6 => format!("{} {} {}", start.year(), month, start.day()),
        7 => format!(
            "{} {} {} : {} - {}",
            start.year(),
            month,
            start.day(),
            start.hour(),
            end.hour()
        ),
        _ => format!("{} {} {} : {}", start.year(), month, start.day(), start.hour()),
    }
}

/// An address is valid when its range has begun and does not precede the
/// literal birth date. Resolution failures count as invalid.
pub fn is_valid(address: &TimeAddress, anchor: &BirthAnchor, now: NaiveDateTime) -> bool {
    match resolve_range(address, anchor) {
        Ok((start, _end)) => start <= now && start >= anchor.datetime(),
        Err(_) => false,
    }
}

/// A node is worth navigating into when it is valid itself and at least
/// one of its immediate children is valid. One-level lookahead only;
/// hour-level addresses have no children and stand on their own validity.
pub fn is_navigable(address: &TimeAddress, anchor: &BirthAnchor, now: NaiveDateTime) -> bool {
    if !is_valid(address, anchor, now) {
        return false;
    }
    if address.level() >= MAX_DEPTH {
        return true;
    }
    (0..address.max_children() as u8).any(|symbol| match address.child(symbol) {
        Ok(child) => is_valid(&child, anchor, now),
        Err(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> BirthAnchor {
        BirthAnchor::new(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    fn resolve(key: &str) -> (NaiveDateTime, NaiveDateTime) {
        resolve_range(&TimeAddress::parse(key).unwrap(), &anchor()).unwrap()
    }

    fn label(key: &str) -> String {
        timeframe_label(&TimeAddress::parse(key).unwrap(), &anchor())
    }

    #[test]
    fn test_root_is_identity_range() {
        let (start, end) = resolve("");
        assert_eq!(start, at(2000, 1, 1));
        assert_eq!(start, end);
        assert_eq!(label(""), "Lifetime");
    }

    #[test]
    fn test_decade_and_year_resolution() {
        let (start, end) = resolve("A");
        assert_eq!(start, at(2000, 1, 1));
        assert_eq!(end, at(2010, 1, 1));
        assert_eq!(label("A"), "2000 - 2010");

        let (start, end) = resolve("AB");
        assert_eq!(start, at(2001, 1, 1));
        assert_eq!(end, at(2002, 1, 1));
        assert_eq!(label("AB"), "2001");
    }

    #[test]
    fn test_deeper_levels_and_labels() {
        // Third quarter of 2001: July through October.
        let (start, end) = resolve("ABC");
        assert_eq!(start, at(2001, 7, 1));
        assert_eq!(end, at(2001, 10, 1));
        assert_eq!(label("ABC"), "2001 : Jul - Oct");

        // Second month of that quarter.
        assert_eq!(resolve("ABCB").0, at(2001, 8, 1));
        assert_eq!(label("ABCB"), "2001 : Aug");

        // Second week span of August.
        let (start, end) = resolve("ABCBB");
        assert_eq!(start, at(2001, 8, 8));
        assert_eq!(end, at(2001, 8, 15));
        assert_eq!(label("ABCBB"), "2001 Aug : 8 - 15");

        // Third day of that span.
        assert_eq!(resolve("ABCBBC").0, at(2001, 8, 10));
        assert_eq!(label("ABCBBC"), "2001 Aug 10");

        // Second 8-hour part, then its fourth hour.
        let (start, end) = resolve("ABCBBCB");
        assert_eq!(start, at(2001, 8, 10) + chrono::Duration::hours(8));
        assert_eq!(end, at(2001, 8, 10) + chrono::Duration::hours(16));
        assert_eq!(label("ABCBBCB"), "2001 Aug 10 : 8 - 16");

        let (start, _) = resolve("ABCBBCBD");
        assert_eq!(start, at(2001, 8, 10) + chrono::Duration::hours(11));
        assert_eq!(label("ABCBBCBD"), "2001 Aug 10 : 11");
    }

    #[test]
    fn test_end_after_start_and_child_start_ordering() {
        for key in ["A", "AB", "ABC", "ABCB", "ABCBB", "ABCBBC", "ABCBBCB", "ABCBBCBD"] {
            let (start, end) = resolve(key);
            assert!(end > start, "end not after start for {}", key);
        }
        // A child's start never precedes its parent's start.
        let parent = TimeAddress::parse("ABC").unwrap();
        let (parent_start, _) = resolve_range(&parent, &anchor()).unwrap();
        for symbol in 0..parent.max_children() as u8 {
            let child = parent.child(symbol).unwrap();
            let (child_start, _) = resolve_range(&child, &anchor()).unwrap();
            assert!(child_start >= parent_start);
        }
    }

    #[test]
    fn test_validity_bounds() {
        let now = at(2005, 6, 1);
        let a = anchor();

        // Elapsed and after birth.
        assert!(is_valid(&TimeAddress::parse("A").unwrap(), &a, now));
        // Second decade has not begun.
        assert!(!is_valid(&TimeAddress::parse("B").unwrap(), &a, now));
        // Descendants of an unelapsed address stay invalid.
        assert!(!is_valid(&TimeAddress::parse("BA").unwrap(), &a, now));
        assert!(!is_valid(&TimeAddress::parse("BACA").unwrap(), &a, now));
        // Year 2006 is still in the future at `now`.
        assert!(!is_valid(&TimeAddress::parse("AG").unwrap(), &a, now));
    }

    #[test]
    fn test_validity_respects_literal_birth_date() {
        // Born mid-2000: the decade range opens at the year start, which
        // precedes the birth date, so the decade itself is excluded.
        let a = BirthAnchor::new(NaiveDate::from_ymd_opt(2000, 6, 15).unwrap());
        let now = at(2005, 1, 1);
        assert!(!is_valid(&TimeAddress::parse("A").unwrap(), &a, now));
        // The second year starts 2001-01-01, after the birth date.
        assert!(is_valid(&TimeAddress::parse("AB").unwrap(), &a, now));
    }

    #[test]
    fn test_navigability_lookahead() {
        let now = at(2005, 6, 1);
        let a = anchor();

        assert!(is_navigable(&TimeAddress::parse("A").unwrap(), &a, now));
        assert!(!is_navigable(&TimeAddress::parse("B").unwrap(), &a, now));
        // Hour level has no children but is navigable when valid.
        assert!(is_navigable(&TimeAddress::parse("AAAAAAAA").unwrap(), &a, now));
    }
}
