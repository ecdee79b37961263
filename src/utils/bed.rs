use std::fs::File;
use std::io::{BufRead, BufReader};

use super::location::GenomicLocation;
use crate::error::{OncoError, OncoResult};

/// Read the ordered row intervals for a spatial oncoplot.
///
/// Accepts BED-style lines (`chrom<TAB>start<TAB>end[...]`) or one
/// `chr:start-end` location per line. File order is preserved because it
/// becomes the default row order.
pub fn read_locations(path: &str) -> OncoResult<Vec<GenomicLocation>> {
    let file = File::open(path).map_err(|e| {
        OncoError::Io(std::io::Error::other(format!(
            "Error opening locations file {}: {}",
            path, e
        )))
    })?;
    read_locations_from_reader(BufReader::new(file))
}

pub fn read_locations_from_reader<R: BufRead>(reader: R) -> OncoResult<Vec<GenomicLocation>> {
    let mut locations = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("track") {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();

        let loc = if parts.len() >= 3 {
            let start: u64 = parts[1].trim().parse().map_err(|e| {
                OncoError::Parse(format!("Invalid start at line {}: {}", i + 1, e))
            })?;
            let end: u64 = parts[2].trim().parse().map_err(|e| {
                OncoError::Parse(format!("Invalid end at line {}: {}", i + 1, e))
            })?;
            GenomicLocation::new(parts[0], start, end)
        } else if parts.len() == 1 {
            parts[0].parse::<GenomicLocation>()?
        } else {
            return Err(OncoError::Parse(format!(
                "Malformed location line {} (expected 1 or at least 3 columns, got {}): {}",
                i + 1,
                parts.len(),
                line
            )));
        };

        locations.push(loc);
    }
    Ok(locations)
}
