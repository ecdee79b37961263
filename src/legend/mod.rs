//! Legend construction: which events appear, in what order, in what color.

pub mod color;

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;

pub use color::{Color, NO_ALTERATION_COLOR, OTHER_MUTATION};

use crate::matrix::{CellStats, MULTI_MUTATION, Marginals, MultiMode, OncoMatrix};

/// Every event recorded in any cell or any marginal.
///
/// Cells must be scanned too: a rare event can be diluted out of both
/// marginals, e.g. when its cell collapses to `Multi`.
pub fn events_in_use(matrix: &OncoMatrix, marginals: &Marginals) -> BTreeSet<String> {
    matrix
        .cells()
        .chain(marginals.rows())
        .chain(marginals.cols())
        .flat_map(|stats| stats.counts().labels())
        .map(|e| e.to_string())
        .collect()
}

/// Priority events that are present, in priority order, followed by the
/// remaining present events alphabetically. Each event appears once.
pub fn order_events(present: &BTreeSet<String>, priority: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<String> = Vec::with_capacity(present.len());

    for event in priority {
        if present.contains(event) && seen.insert(event.as_str()) {
            ordered.push(event.clone());
        }
    }

    // BTreeSet iterates alphabetically
    for event in present {
        if seen.insert(event.as_str()) {
            ordered.push(event.clone());
        }
    }

    ordered
}

/// Color for `event`: caller override, then the built-in table, then the
/// `OTHER` color.
pub fn event_color(event: &str, overrides: &HashMap<String, Color>) -> Color {
    overrides
        .get(event)
        .copied()
        .or_else(|| color::default_event_color(event))
        .unwrap_or_else(color::other_color)
}

/// Display label for a cell.
///
/// Empty cells have no label. Unless `mode` is `single`, a cell with more
/// than one distinct event is labelled `Multi`. Otherwise the dominant
/// event is chosen first and then mapped through `aliases`.
pub fn event_label(cell: &CellStats, aliases: &HashMap<String, String>, mode: MultiMode) -> String {
    if cell.is_empty() {
        return String::new();
    }

    if mode != MultiMode::Single && cell.counts().len() > 1 {
        return MULTI_MUTATION.to_string();
    }

    let (event, _) = cell.max_event();
    aliases
        .get(event)
        .cloned()
        .unwrap_or_else(|| event.to_string())
}

/// Ordered event names and their colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    colors: IndexMap<String, Color>,
}

impl Legend {
    /// Order `present` by `priority` and assign each event a color.
    pub fn build(
        present: &BTreeSet<String>,
        priority: &[String],
        overrides: &HashMap<String, Color>,
    ) -> Self {
        let colors = order_events(present, priority)
            .into_iter()
            .map(|event| {
                let c = event_color(&event, overrides);
                (event, c)
            })
            .collect();
        Self { colors }
    }

    /// Legend covering everything in `matrix` and `marginals`.
    pub fn for_matrix(
        matrix: &OncoMatrix,
        marginals: &Marginals,
        priority: &[String],
        overrides: &HashMap<String, Color>,
    ) -> Self {
        Self::build(&events_in_use(matrix, marginals), priority, overrides)
    }

    /// Event names in legend order.
    pub fn names(&self) -> Vec<&str> {
        self.colors.keys().map(|k| k.as_str()).collect()
    }

    pub fn color(&self, event: &str) -> Option<Color> {
        self.colors.get(event).copied()
    }

    /// `(event, color)` pairs in legend order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Color)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
