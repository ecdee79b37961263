//! Weighted event multisets for matrix cells and marginals.

use std::collections::BTreeMap;

/// Label returned by [`EventCountMap::max_event`] when nothing was recorded.
pub const NA: &str = "NA";

/// Accumulates weights per event label.
///
/// Used for mutation events in matrix cells as well as for categorical or
/// numeric clinical values, where a label is stored with a single weight.
/// Labels are kept in lexicographic order so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCountMap {
    counts: BTreeMap<String, f64>,
}

impl EventCountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to the running total of `event`, creating it if absent.
    pub fn set(&mut self, event: &str, weight: f64) {
        if let Some(w) = self.counts.get_mut(event) {
            *w += weight;
        } else {
            self.counts.insert(event.to_string(), weight);
        }
    }

    /// Add one unit of `event`.
    pub fn add(&mut self, event: &str) {
        self.set(event, 1.0);
    }

    pub fn get(&self, event: &str) -> Option<f64> {
        self.counts.get(event).copied()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.counts.contains_key(event)
    }

    /// Number of distinct events.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Event labels in lexicographic order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(|k| k.as_str())
    }

    /// All `(event, weight)` entries sorted by label.
    pub fn events(&self) -> Vec<(&str, f64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }

    /// The entry with the largest weight, or `("NA", -1)` if empty.
    ///
    /// Equal weights resolve to the lexicographically smallest label.
    pub fn max_event(&self) -> (&str, f64) {
        let mut best: Option<(&str, f64)> = None;
        for (event, &weight) in &self.counts {
            match best {
                Some((_, w)) if weight <= w => {}
                _ => best = Some((event.as_str(), weight)),
            }
        }
        best.unwrap_or((NA, -1.0))
    }

    /// Total weight across all events.
    pub fn sum(&self) -> f64 {
        self.counts.values().sum()
    }

    /// Project the counts onto `ids`, in `ids` order, as `(id, weight)` pairs.
    ///
    /// Ids without a count get 0. With `keep_zeros` false those zero entries
    /// are dropped, which is what distribution plots want.
    pub fn count_dist(&self, ids: &[String], keep_zeros: bool) -> Vec<(String, f64)> {
        ids.iter()
            .map(|id| (id.clone(), self.counts.get(id).copied().unwrap_or(0.0)))
            .filter(|(_, w)| keep_zeros || *w > 0.0)
            .collect()
    }

    /// Like [`count_dist`](Self::count_dist) but each weight is divided by
    /// [`sum`](Self::sum). A zero total yields all-zero weights.
    pub fn norm_count_dist(&self, ids: &[String], keep_zeros: bool) -> Vec<(String, f64)> {
        let total = self.sum();
        self.count_dist(ids, keep_zeros)
            .into_iter()
            .map(|(id, w)| {
                let norm = if total > 0.0 { w / total } else { 0.0 };
                (id, norm)
            })
            .collect()
    }
}

/// An [`EventCountMap`] tagged with the row and column entity it belongs to.
///
/// Marginals reuse the type with both identities set to the row or column name.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStats {
    row: String,
    col: String,
    counts: EventCountMap,
}

impl CellStats {
    pub fn new(row: impl Into<String>, col: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            col: col.into(),
            counts: EventCountMap::new(),
        }
    }

    /// Marginal for a single entity.
    pub fn marginal(name: &str) -> Self {
        Self::new(name, name)
    }

    pub fn row(&self) -> &str {
        &self.row
    }

    pub fn col(&self) -> &str {
        &self.col
    }

    pub fn counts(&self) -> &EventCountMap {
        &self.counts
    }

    pub fn set(&mut self, event: &str, weight: f64) {
        self.counts.set(event, weight);
    }

    pub fn add(&mut self, event: &str) {
        self.counts.add(event);
    }

    pub fn events(&self) -> Vec<(&str, f64)> {
        self.counts.events()
    }

    pub fn max_event(&self) -> (&str, f64) {
        self.counts.max_event()
    }

    pub fn sum(&self) -> f64 {
        self.counts.sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count_dist(&self, ids: &[String], keep_zeros: bool) -> Vec<(String, f64)> {
        self.counts.count_dist(ids, keep_zeros)
    }

    pub fn norm_count_dist(&self, ids: &[String], keep_zeros: bool) -> Vec<(String, f64)> {
        self.counts.norm_count_dist(ids, keep_zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_accumulates() {
        let mut m = EventCountMap::new();
        m.add("SNP");
        m.add("SNP");
        m.set("DEL", 0.5);

        assert_eq!(m.get("SNP"), Some(2.0));
        assert_eq!(m.get("DEL"), Some(0.5));
        assert_eq!(m.len(), 2);
        assert_eq!(m.sum(), 2.5);
    }

    #[test]
    fn test_events_sorted_and_sum_consistent() {
        let mut m = EventCountMap::new();
        m.add("Nonsense");
        m.set("Frameshift", 3.0);
        m.add("Missense");

        let events = m.events();
        let labels: Vec<&str> = events.iter().map(|e| e.0).collect();
        assert_eq!(labels, vec!["Frameshift", "Missense", "Nonsense"]);

        let total: f64 = events.iter().map(|e| e.1).sum();
        assert_eq!(m.sum(), total);
    }

    #[test]
    fn test_max_event() {
        let mut m = EventCountMap::new();
        assert_eq!(m.max_event(), (NA, -1.0));

        m.add("INS");
        m.set("DEL", 2.0);
        assert_eq!(m.max_event(), ("DEL", 2.0));

        // ties go to the alphabetically first label
        m.set("INS", 1.0);
        assert_eq!(m.max_event(), ("DEL", 2.0));
        m.set("SNP", 2.0);
        m.set("AMP", 2.0);
        assert_eq!(m.max_event(), ("AMP", 2.0));
    }

    #[test]
    fn test_count_dist() {
        let mut m = EventCountMap::new();
        m.set("B", 2.0);
        m.set("C", 1.0);

        let dist = m.count_dist(&ids(&["C", "A", "B"]), true);
        assert_eq!(
            dist,
            vec![("C".to_string(), 1.0), ("A".to_string(), 0.0), ("B".to_string(), 2.0)]
        );

        let dist = m.count_dist(&ids(&["C", "A", "B"]), false);
        assert_eq!(dist, vec![("C".to_string(), 1.0), ("B".to_string(), 2.0)]);
    }

    #[test]
    fn test_norm_count_dist() {
        let mut m = EventCountMap::new();
        m.set("A", 1.0);
        m.set("B", 3.0);

        let dist = m.norm_count_dist(&ids(&["A", "B"]), true);
        assert_eq!(dist, vec![("A".to_string(), 0.25), ("B".to_string(), 0.75)]);
    }

    #[test]
    fn test_norm_count_dist_zero_sum() {
        let m = EventCountMap::new();
        let dist = m.norm_count_dist(&ids(&["A", "B"]), true);
        assert_eq!(dist, vec![("A".to_string(), 0.0), ("B".to_string(), 0.0)]);
        assert!(dist.iter().all(|(_, w)| w.is_finite()));

        assert!(m.norm_count_dist(&ids(&["A"]), false).is_empty());
    }

    #[test]
    fn test_cell_identity() {
        let mut cell = CellStats::new("TP53", "S1");
        assert!(cell.is_empty());
        assert_eq!(cell.sum(), 0.0);
        cell.add("Missense");
        assert_eq!(cell.row(), "TP53");
        assert_eq!(cell.col(), "S1");
        assert_eq!(cell.max_event(), ("Missense", 1.0));

        let m = CellStats::marginal("KRAS");
        assert_eq!(m.row(), m.col());
    }
}
