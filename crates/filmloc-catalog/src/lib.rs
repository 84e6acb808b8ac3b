//! Load film location catalogs and aggregate them by year and by country.
//!
//! This crate reads the tab-delimited `locations.list` format: a fixed
//! 14-line header, one `title<TAB>location[<TAB>annotation]` record per line
//! and a 2-line footer. Records and aggregates borrow their text from the
//! loaded buffer. Callers choose between memory-mapped files or owned buffers
//! at runtime via [`LoadMode`].
//!
//! # Features
//! - Tolerant decoding: invalid UTF-8 sequences are dropped, never fatal.
//! - Tagged extraction: malformed lines come back as
//!   [`LineOutcome::Skipped`](filmloc_types::LineOutcome) instead of
//!   disappearing.
//! - Pure aggregation: [`aggregate_by_year`] and [`aggregate_by_country`]
//!   build fresh maps on every call, so a loaded [`Catalog`] can be queried
//!   for any number of years, from any number of threads.
//!
//! # Example
//! ```no_run
//! use filmloc_catalog::{Catalog, LoadMode, count_for};
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalog = Catalog::load_with_mode("locations.list", LoadMode::Mmap)?;
//! let by_year = catalog.locations_for_year(1994);
//! for (location, titles) in &by_year {
//!     println!("{location}: {}", titles.len());
//! }
//! let counts = catalog.country_counts();
//! println!("France: {}", count_for("France", &counts));
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p filmloc-catalog --example stats -- <locations.list>`.

mod aggregate;
mod extract;

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use filmloc_types::{CountryCountMap, LineOutcome, RawRecord, SkipReason, YearLocationMap};
use memmap2::Mmap;

pub use aggregate::{
    aggregate_by_country, aggregate_by_year, count_for, normalize_country, year_marker,
};
pub use extract::{FOOTER_LINES, HEADER_LINES, extract, extract_lines, select_location};

/// Strategy for loading the catalog file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy when the text is valid UTF-8).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Clone, Copy)]
struct TextRef {
    start: usize,
    len: usize,
}

#[derive(Clone, Copy)]
struct RecordRef {
    title: TextRef,
    location: TextRef,
}

/// A data line that produced no record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the file.
    pub line: usize,
    pub reason: SkipReason,
}

/// Immutable, fully extracted catalog backed by mmap or an owned buffer.
pub struct Catalog {
    buffer: Buffer,
    records: Vec<RecordRef>,
    skipped: Vec<SkippedLine>,
    line_count: usize,
}

impl Catalog {
    /// Load a catalog file, memory-mapping it.
    ///
    /// Use [`load_with_mode`](Self::load_with_mode) to force an owned buffer.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a catalog file choosing between mmap and an owned buffer at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("missing catalog file: {}", path.display());
        }

        let buffer = load_file(path, mode)?;
        let valid = std::str::from_utf8(buffer.as_slice()).is_ok();
        let buffer = if valid {
            buffer
        } else {
            Buffer::Owned(decode_text(buffer.as_slice()).into_owned().into_bytes())
        };
        Ok(Self::from_buffer(buffer))
    }

    /// Build a catalog from text already in memory.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_buffer(Buffer::Owned(text.into().into_bytes()))
    }

    /// Build a catalog from raw bytes, dropping invalid UTF-8 sequences.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let cleaned = match decode_text(&bytes) {
            Cow::Borrowed(_) => None,
            Cow::Owned(cleaned) => Some(cleaned.into_bytes()),
        };
        Self::from_buffer(Buffer::Owned(cleaned.unwrap_or(bytes)))
    }

    fn from_buffer(buffer: Buffer) -> Self {
        let (records, skipped, line_count) = {
            let text = std::str::from_utf8(buffer.as_slice()).unwrap_or_default();
            index_lines(text)
        };
        Self {
            buffer,
            records,
            skipped,
            line_count,
        }
    }

    /// Decoded catalog text.
    pub fn text(&self) -> &str {
        // Buffers are validated (or cleaned) before construction.
        std::str::from_utf8(self.buffer.as_slice()).unwrap_or_default()
    }

    /// Iterate over all extracted records in file order.
    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> + '_ {
        let text = self.text();
        self.records.iter().map(move |r| RawRecord {
            title: slice(text, r.title),
            location: slice(text, r.location),
        })
    }

    /// Number of extracted records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Data lines that did not produce a record.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Number of `\n`-separated lines in the file, boilerplate included.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Titles released in `year`, grouped by raw location.
    pub fn locations_for_year(&self, year: i32) -> YearLocationMap<'_> {
        aggregate_by_year(self.records(), year)
    }

    /// All-time record count per normalized country.
    pub fn country_counts(&self) -> CountryCountMap<'_> {
        aggregate_by_country(self.records())
    }
}

/// Decode catalog bytes as UTF-8, silently dropping invalid sequences.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    Cow::Owned(out)
}

fn index_lines(text: &str) -> (Vec<RecordRef>, Vec<SkippedLine>, usize) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for outcome in extract_lines(text) {
        match outcome {
            LineOutcome::Parsed(rec) => records.push(RecordRef {
                title: text_ref(text, rec.title),
                location: text_ref(text, rec.location),
            }),
            LineOutcome::Skipped { line, reason } => skipped.push(SkippedLine { line, reason }),
        }
    }
    (records, skipped, text.split('\n').count())
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let len = file
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            if len == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn text_ref(root: &str, token: &str) -> TextRef {
    let start = token.as_ptr() as usize - root.as_ptr() as usize;
    TextRef {
        start,
        len: token.len(),
    }
}

fn slice(text: &str, r: TextRef) -> &str {
    &text[r.start..r.start + r.len]
}
