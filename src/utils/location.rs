//! Genomic intervals used as spatial matrix rows.

use std::fmt;
use std::str::FromStr;

use crate::error::OncoError;

/// Normalise a chromosome name so that `1`, `X` and `chr1` compare equal.
pub fn format_chr(chr: &str) -> String {
    let chr = chr.trim();
    if chr.starts_with("chr") {
        chr.to_string()
    } else {
        format!("chr{}", chr)
    }
}

/// A closed genomic interval `chr:start-end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicLocation {
    chr: String,
    start: u64,
    end: u64,
}

impl GenomicLocation {
    pub fn new(chr: &str, start: u64, end: u64) -> Self {
        Self {
            chr: format_chr(chr),
            start,
            end,
        }
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// True if both intervals share a chromosome and at least one base.
    pub fn overlaps(&self, other: &GenomicLocation) -> bool {
        self.chr == other.chr && self.start.max(other.start) <= self.end.min(other.end)
    }
}

impl fmt::Display for GenomicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}

impl FromStr for GenomicLocation {
    type Err = OncoError;

    /// Parse `chr1:100-200`. Thousands separators are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OncoError::InvalidLocation(s.to_string());

        let (chr, range) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        let (start, end) = range.split_once('-').ok_or_else(invalid)?;

        let parse = |v: &str| v.trim().replace(',', "").parse::<u64>().map_err(|_| invalid());
        let start = parse(start)?;
        let end = parse(end)?;

        if chr.is_empty() || end < start {
            return Err(invalid());
        }

        Ok(GenomicLocation::new(chr, start, end))
    }
}
