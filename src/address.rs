//! Hierarchical time addresses
//!
//! A `TimeAddress` names one node in a fixed-depth subdivision of a
//! lifetime: decade, year, quarter, month, week, day, day part, hour.
//! Each position in the address is a symbol drawn from that level's
//! alphabet and rendered as a letter (`'A' + symbol`), so `"AB"` is the
//! second year of the first decade. The empty address is the root
//! ("Lifetime").
//!
//! Addresses are immutable values; navigation produces new addresses
//! rather than mutating a tree.

use std::fmt;
use std::str::FromStr;

use crate::error::{LifemapError, Result};

/// Maximum address depth (hour level).
pub const MAX_DEPTH: usize = 8;

/// Calendar unit a level subdivides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Years,
    Months,
    Days,
    Hours,
}

/// One row of the fixed level table.
#[derive(Debug, Clone, Copy)]
pub struct Level {
    pub name: &'static str,
    /// Alphabet size: number of valid child symbols at this level.
    pub alphabet: u8,
    pub unit: Unit,
    /// How many `unit`s one symbol step spans.
    pub multiplier: u32,
}

/// The fixed level table, indexed by address position.
pub const LEVELS: [Level; MAX_DEPTH] = [
    Level { name: "decade",   alphabet: 9,  unit: Unit::Years,  multiplier: 10 },
    Level { name: "year",     alphabet: 10, unit: Unit::Years,  multiplier: 1 },
    Level { name: "quarter",  alphabet: 4,  unit: Unit::Months, multiplier: 3 },
    Level { name: "month",    alphabet: 3,  unit: Unit::Months, multiplier: 1 },
    Level { name: "week",     alphabet: 4,  unit: Unit::Days,   multiplier: 7 },
    Level { name: "day",      alphabet: 8,  unit: Unit::Days,   multiplier: 1 },
    Level { name: "day_part", alphabet: 3,  unit: Unit::Hours,  multiplier: 8 },
    Level { name: "hour",     alphabet: 8,  unit: Unit::Hours,  multiplier: 1 },
];

/// An address in the 8-level time hierarchy.
///
/// Equality, ordering and hashing are structural over the symbol
/// sequence, so ancestors sort before their descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeAddress {
    symbols: Vec<u8>,
}

impl TimeAddress {
    /// The root address ("Lifetime").
    pub fn root() -> Self {
        Self::default()
    }

    /// Depth of this address: 0 for the root, up to [`MAX_DEPTH`].
    pub fn level(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_root(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols of this address, one per level.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Number of valid children (the alphabet size one level down),
    /// 0 at maximum depth.
    pub fn max_children(&self) -> usize {
        if self.level() >= MAX_DEPTH {
            0
        } else {
            LEVELS[self.level()].alphabet as usize
        }
    }

    /// Ordered letters of the valid children, empty at maximum depth.
    pub fn child_letters(&self) -> Vec<char> {
        (0..self.max_children() as u8)
            .map(|sym| (b'A' + sym) as char)
            .collect()
    }

    /// Address with the last symbol dropped.
    pub fn parent(&self) -> Result<TimeAddress> {
        if self.is_root() {
            return Err(LifemapError::InvalidOperation(
                "the root address has no parent".to_string(),
            ));
        }
        Ok(TimeAddress {
            symbols: self.symbols[..self.symbols.len() - 1].to_vec(),
        })
    }

    /// Address with `symbol` appended.
    pub fn child(&self, symbol: u8) -> Result<TimeAddress> {
        let level = self.level();
        if level >= MAX_DEPTH || symbol as usize >= LEVELS[level].alphabet as usize {
            return Err(LifemapError::OutOfRange { level, symbol });
        }
        let mut symbols = self.symbols.clone();
        symbols.push(symbol);
        Ok(TimeAddress { symbols })
    }

    /// True when `prefix` is an ancestor-or-self of this address.
    pub fn starts_with(&self, prefix: &TimeAddress) -> bool {
        self.symbols.starts_with(&prefix.symbols)
    }

    /// Prefix chain from self down to (excluding) the root, longest first:
    /// `"ABCC"` yields `"ABCC", "ABC", "AB", "A"`.
    pub fn ancestors(&self) -> impl Iterator<Item = TimeAddress> + '_ {
        (1..=self.symbols.len()).rev().map(move |len| TimeAddress {
            symbols: self.symbols[..len].to_vec(),
        })
    }

    /// Parse the letter encoding, validating each symbol against its
    /// level's alphabet.
    pub fn parse(s: &str) -> Result<TimeAddress> {
        if s.len() > MAX_DEPTH {
            return Err(LifemapError::Parse(format!(
                "address {:?} exceeds maximum depth {}",
                s, MAX_DEPTH
            )));
        }
        let mut symbols = Vec::with_capacity(s.len());
        for (level, ch) in s.chars().enumerate() {
            if !ch.is_ascii_uppercase() {
                return Err(LifemapError::Parse(format!(
                    "invalid character {:?} in address {:?}",
                    ch, s
                )));
            }
            let symbol = ch as u8 - b'A';
            if symbol >= LEVELS[level].alphabet {
                return Err(LifemapError::Parse(format!(
                    "symbol {:?} out of range for {} level in address {:?}",
                    ch, LEVELS[level].name, s
                )));
            }
            symbols.push(symbol);
        }
        Ok(TimeAddress { symbols })
    }
}

impl fmt::Display for TimeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &sym in &self.symbols {
            write!(f, "{}", (b'A' + sym) as char)?;
        }
        Ok(())
    }
}

impl FromStr for TimeAddress {
    type Err = LifemapError;

    fn from_str(s: &str) -> Result<Self> {
        TimeAddress::parse(s)
    }
}

// Serialized as the letter encoding, matching the persisted form.
impl serde::Serialize for TimeAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TimeAddress {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TimeAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}
