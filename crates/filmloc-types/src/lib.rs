//! Shared, zero-copy types that mirror the film location catalog format.
//!
//! A catalog line carries a title field with an embedded year marker and a
//! free-text location. Records borrow both fields from the backing text
//! (`&str`); aggregates borrow their keys from the same text so building them
//! over a large catalog stays cheap.
//!
//! Use [`RawRecord`] for extracted lines, [`LineOutcome`] when the caller wants
//! to see skipped lines, [`YearLocationMap`] / [`CountryCountMap`] for the two
//! aggregates and [`Tier`] to bucket a country count for map styling.
//!
//! ```rust
//! use filmloc_types::{RawRecord, Tier};
//!
//! let rec = RawRecord {
//!     title: "\"Some Film\"(1994)",
//!     location: "Paris, France",
//! };
//! assert_eq!(rec.location, "Paris, France");
//! assert_eq!(Tier::for_count(3000), Tier::B);
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// One extracted catalog line: the raw title field and the chosen location column.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RawRecord<'a> {
    /// Title immediately followed by its year marker, e.g. `"Film"(1994)`.
    pub title: &'a str,
    /// Least-specific-last place description, e.g. `City, Region, Country`.
    pub location: &'a str,
}

/// Why a data line did not produce a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SkipReason {
    /// The line split into fewer than two tab-separated columns.
    InsufficientColumns { found: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientColumns { found } => {
                write!(f, "expected at least 2 columns, found {found}")
            }
        }
    }
}

/// Result of parsing a single data line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineOutcome<'a> {
    Parsed(RawRecord<'a>),
    /// `line` is the 1-based line number within the whole file.
    Skipped { line: usize, reason: SkipReason },
}

impl<'a> LineOutcome<'a> {
    /// The parsed record, if any.
    pub fn record(&self) -> Option<RawRecord<'a>> {
        match self {
            LineOutcome::Parsed(rec) => Some(*rec),
            LineOutcome::Skipped { .. } => None,
        }
    }
}

/// Location string -> film names released in the queried year, in encounter order.
pub type YearLocationMap<'a> = BTreeMap<&'a str, Vec<Cow<'a, str>>>;

/// Normalized country name -> number of records across all years.
pub type CountryCountMap<'a> = BTreeMap<&'a str, u64>;

/// Geographic position returned by a geocoder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Upper bound (exclusive) of [`Tier::A`].
pub const TIER_B_MIN: u64 = 3000;
/// Upper bound (inclusive) of [`Tier::B`].
pub const TIER_B_MAX: u64 = 20000;

/// Choropleth bucket for a country's all-time film count.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// `count < 3000`
    A,
    /// `3000 <= count <= 20000`
    B,
    /// `count > 20000`
    C,
}

impl Tier {
    /// Bucket a film count.
    pub fn for_count(count: u64) -> Self {
        if count < TIER_B_MIN {
            Tier::A
        } else if count <= TIER_B_MAX {
            Tier::B
        } else {
            Tier::C
        }
    }

    /// Fill colour used when drawing the country polygon.
    pub fn fill_color(self) -> &'static str {
        match self {
            Tier::A => "green",
            Tier::B => "orange",
            Tier::C => "red",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_edges_are_exact() {
        assert_eq!(Tier::for_count(0), Tier::A);
        assert_eq!(Tier::for_count(2999), Tier::A);
        assert_eq!(Tier::for_count(3000), Tier::B);
        assert_eq!(Tier::for_count(20000), Tier::B);
        assert_eq!(Tier::for_count(20001), Tier::C);
    }

    #[test]
    fn tier_colors() {
        assert_eq!(Tier::A.fill_color(), "green");
        assert_eq!(Tier::B.fill_color(), "orange");
        assert_eq!(Tier::C.fill_color(), "red");
    }

    #[test]
    fn skipped_outcome_has_no_record() {
        let skipped = LineOutcome::Skipped {
            line: 15,
            reason: SkipReason::InsufficientColumns { found: 1 },
        };
        assert_eq!(skipped.record(), None);
        assert_eq!(
            SkipReason::InsufficientColumns { found: 1 }.to_string(),
            "expected at least 2 columns, found 1"
        );
    }
}
