//! Overlap lookup for the spatial join.

use std::collections::{BTreeMap, HashMap};

use super::location::GenomicLocation;

/// Default bin width in bases.
pub const DEFAULT_BIN_SIZE: u64 = 1000;

/// Intervals touching more bins than this are kept in a per-chromosome list
/// and tested directly.
pub const MAX_INTERVAL_BINS: u64 = 10_000;

/// Answers "which of the indexed intervals overlap this query".
///
/// Implementations return indices into the interval list they were built
/// from, ascending and without duplicates.
pub trait OverlapIndex {
    fn overlapping(&self, query: &GenomicLocation) -> Vec<usize>;
}

/// Buckets intervals into fixed-width bins per chromosome.
///
/// An interval is registered in every bin it touches, so a query only has to
/// test the intervals sharing one of its own bins. Queries visit occupied
/// bins only, so their cost does not grow with the query span.
#[derive(Debug, Clone)]
pub struct LocationBinMap {
    bin_size: u64,
    locations: Vec<GenomicLocation>,
    bins: HashMap<String, ChromBins>,
}

#[derive(Debug, Clone, Default)]
struct ChromBins {
    bins: BTreeMap<u64, Vec<usize>>,
    wide: Vec<usize>,
}

impl LocationBinMap {
    pub fn new(locations: &[GenomicLocation]) -> Self {
        Self::with_bin_size(locations, DEFAULT_BIN_SIZE)
    }

    pub fn with_bin_size(locations: &[GenomicLocation], bin_size: u64) -> Self {
        let bin_size = bin_size.max(1);
        let mut bins: HashMap<String, ChromBins> = HashMap::new();

        for (i, loc) in locations.iter().enumerate() {
            let chr_bins = bins.entry(loc.chr().to_string()).or_default();
            let (first, last) = (loc.start() / bin_size, loc.end() / bin_size);
            if last.saturating_sub(first) >= MAX_INTERVAL_BINS {
                chr_bins.wide.push(i);
                continue;
            }
            for b in first..=last {
                chr_bins.bins.entry(b).or_default().push(i);
            }
        }

        Self {
            bin_size,
            locations: locations.to_vec(),
            bins,
        }
    }

    pub fn bin_size(&self) -> u64 {
        self.bin_size
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Overlapping locations themselves rather than their indices.
    pub fn search(&self, query: &GenomicLocation) -> Vec<&GenomicLocation> {
        self.overlapping(query)
            .into_iter()
            .map(|i| &self.locations[i])
            .collect()
    }
}

impl OverlapIndex for LocationBinMap {
    fn overlapping(&self, query: &GenomicLocation) -> Vec<usize> {
        let Some(chr_bins) = self.bins.get(query.chr()) else {
            return Vec::new();
        };

        let first = query.start() / self.bin_size;
        let last = (query.end() / self.bin_size).max(first);
        let mut hits: Vec<usize> = chr_bins
            .bins
            .range(first..=last)
            .flat_map(|(_, candidates)| candidates.iter().copied())
            .chain(chr_bins.wide.iter().copied())
            .filter(|&i| self.locations[i].overlaps(query))
            .collect();

        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locs() -> Vec<GenomicLocation> {
        vec![
            GenomicLocation::new("chr1", 50, 150),
            GenomicLocation::new("chr1", 150, 250),
            GenomicLocation::new("chr1", 5000, 7500),
            GenomicLocation::new("chr2", 100, 200),
        ]
    }

    #[test]
    fn test_overlapping_multiple_rows() {
        let map = LocationBinMap::new(&locs());
        let hits = map.overlapping(&GenomicLocation::new("chr1", 100, 200));
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn test_overlapping_across_bins() {
        // small bins force the query and targets to span several buckets
        let map = LocationBinMap::with_bin_size(&locs(), 100);
        let hits = map.overlapping(&GenomicLocation::new("chr1", 120, 6000));
        assert_eq!(hits, vec![0, 1, 2]);

        let found = map.search(&GenomicLocation::new("chr1", 7000, 7001));
        assert_eq!(found, vec![&GenomicLocation::new("chr1", 5000, 7500)]);
    }

    #[test]
    fn test_no_overlap() {
        let map = LocationBinMap::new(&locs());
        assert!(map.overlapping(&GenomicLocation::new("chr1", 300, 400)).is_empty());
        assert!(map.overlapping(&GenomicLocation::new("chr3", 100, 200)).is_empty());
    }

    #[test]
    fn test_huge_query_span() {
        let map = LocationBinMap::with_bin_size(&locs(), 1);
        let hits = map.overlapping(&GenomicLocation::new("chr1", 0, 1_000_000_000_000_000));
        assert_eq!(hits, vec![0, 1, 2]);
    }

    #[test]
    fn test_huge_interval_is_indexed() {
        let mut locations = locs();
        locations.push(GenomicLocation::new("chr2", 1, 1_000_000_000_000_000));
        let map = LocationBinMap::new(&locations);

        assert_eq!(map.overlapping(&GenomicLocation::new("chr2", 150, 150)), vec![3, 4]);
        assert_eq!(map.overlapping(&GenomicLocation::new("chr2", 5_000_000, 5_000_001)), vec![4]);
        assert!(map.overlapping(&GenomicLocation::new("chr2", 0, 0)).is_empty());
        assert!(map.overlapping(&GenomicLocation::new("chr1", 300, 400)).is_empty());
    }

    #[test]
    fn test_zero_bin_size_is_clamped() {
        let map = LocationBinMap::with_bin_size(&locs(), 0);
        assert_eq!(map.bin_size(), 1);
        assert_eq!(map.overlapping(&GenomicLocation::new("chr2", 200, 200)), vec![3]);
    }
}
