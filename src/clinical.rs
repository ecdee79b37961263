//! Clinical annotation tracks drawn alongside the mutation matrix.
//!
//! The clinical table has the sample id in its first column. Every other
//! column becomes one track, configured through its header:
//!
//! ```text
//! Age(number:#FF0000)
//! Subtype(Luminal A:#000080/Luminal B|Basal)
//! Treatment(multi=t)
//! ```

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::legend::color::{CLINICAL_TRACK_COLOR, Color, category_color};
use crate::matrix::{EventCountMap, MULTI_MUTATION};
use crate::table::Table;

/// Label of the single entry returned for numeric tracks.
pub const COUNTS_LABEL: &str = "counts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    /// A plain numeric value such as age.
    Number,
    /// A numeric value drawn on a log2 scale.
    Log2Number,
    /// Labels or a distribution over categories.
    Dist,
}

impl TrackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Number => "number",
            TrackType::Log2Number => "log2number",
            TrackType::Dist => "dist",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "number" => TrackType::Number,
            "lognumber" | "log2number" => TrackType::Log2Number,
            _ => TrackType::Dist,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, TrackType::Dist)
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed column header.
#[derive(Debug, Clone, PartialEq)]
struct TrackHeader {
    name: String,
    track_type: TrackType,
    multi: bool,
    /// Track color followed by any declared category colors.
    colors: IndexMap<String, Color>,
    categories: Vec<String>,
}

fn split_values(s: &str) -> impl Iterator<Item = &str> {
    s.split(['/', '|'])
}

/// `^\d+([/|]\d+)*$`
fn is_numeric_dist(s: &str) -> bool {
    !s.is_empty()
        && split_values(s).all(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_header(header: &str) -> TrackHeader {
    let multi = header.to_lowercase().contains("multi=t");

    let name_end = header.find(['(', ')']).unwrap_or(header.len());
    let name = header[..name_end].trim().to_string();

    let mut parsed = TrackHeader {
        name,
        track_type: TrackType::Dist,
        multi,
        colors: IndexMap::new(),
        categories: Vec::new(),
    };

    // a header without a usable name carries no settings
    if name_end == 0 {
        return parsed;
    }

    // parameters run from the first '(' after the name to the last ')'
    let open = header[name_end..].strip_prefix('(');
    let params: Option<&str> = match (open, header.rfind(')')) {
        (Some(rest), Some(close)) if close > name_end + 1 => {
            Some(&rest[..close - name_end - 1])
        }
        _ => None,
    };

    let first_param = params.and_then(|p| p.split(',').next());

    let mut track_color = CLINICAL_TRACK_COLOR;
    if let Some(first) = first_param {
        let mut tokens = first.split(':');
        let kind = tokens.next().unwrap_or_default();
        if let Some(c) = tokens.next().and_then(Color::from_hex) {
            track_color = c;
        }
        parsed.track_type = TrackType::from_token(kind);
    }
    parsed.colors.insert(parsed.name.clone(), track_color);

    if parsed.track_type == TrackType::Dist
        && !multi
        && let Some(first) = first_param
    {
        for id in split_values(first) {
            let mut tokens = id.split(':');
            let event = tokens.next().unwrap_or_default().to_string();
            if let Some(c) = tokens.next().and_then(Color::from_hex) {
                parsed.colors.insert(event.clone(), c);
            }
            parsed.categories.push(event);
        }
    }

    parsed
}

/// One clinical annotation track with per-sample values.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalTrack {
    name: String,
    track_type: TrackType,
    multi: bool,
    categories: Vec<String>,
    samples: BTreeMap<String, EventCountMap>,
    colors: IndexMap<String, Color>,
}

impl ClinicalTrack {
    pub fn new(name: &str, categories: Vec<String>, track_type: TrackType) -> Self {
        let mut colors = IndexMap::new();
        colors.insert(name.to_string(), CLINICAL_TRACK_COLOR);
        Self {
            name: name.to_string(),
            track_type,
            multi: false,
            categories,
            samples: BTreeMap::new(),
            colors,
        }
    }

    /// Track configured from a clinical table header.
    pub fn from_header(header: &str) -> Self {
        let parsed = parse_header(header);
        Self {
            name: parsed.name,
            track_type: parsed.track_type,
            multi: parsed.multi,
            categories: parsed.categories,
            samples: BTreeMap::new(),
            colors: parsed.colors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    /// Whether multiple labels in one value collapse to `Multi`.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Add `count` to `event` for `sample`.
    pub fn set(&mut self, sample: &str, event: &str, count: f64) {
        self.samples
            .entry(sample.to_string())
            .or_default()
            .set(event, count);
    }

    /// Recorded values for `sample`.
    pub fn sample_events(&self, sample: &str) -> Option<&EventCountMap> {
        self.samples.get(sample)
    }

    /// Samples with at least one recorded value, sorted.
    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(|s| s.as_str())
    }

    /// Totals per event across all samples, sorted by event.
    pub fn events(&self) -> Vec<(String, f64)> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for counts in self.samples.values() {
            for (event, w) in counts.events() {
                *totals.entry(event).or_insert(0.0) += w;
            }
        }
        totals.into_iter().map(|(e, w)| (e.to_string(), w)).collect()
    }

    /// Events with a positive total.
    pub fn events_in_use(&self) -> Vec<(String, f64)> {
        self.events().into_iter().filter(|(_, w)| *w > 0.0).collect()
    }

    /// Declared categories, or the observed events sorted when none were
    /// declared.
    pub fn categories(&self) -> Vec<String> {
        if !self.categories.is_empty() {
            return self.categories.clone();
        }
        self.events().into_iter().map(|(e, _)| e).collect()
    }

    /// [`categories`](Self::categories) filtered to those with a positive
    /// total, in category order.
    pub fn categories_in_use(&self) -> Vec<String> {
        let in_use: Vec<String> = self.events_in_use().into_iter().map(|(e, _)| e).collect();
        self.categories()
            .into_iter()
            .filter(|c| in_use.contains(c))
            .collect()
    }

    /// Highest single-sample value across the track.
    pub fn max_event(&self) -> Option<(String, f64)> {
        self.samples
            .values()
            .map(|c| c.max_event())
            .fold(None, |best: Option<(&str, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
            .map(|(e, w)| (e.to_string(), w))
    }

    /// What to draw for `sample`.
    ///
    /// Numeric tracks give the summed value under `counts`, distribution
    /// tracks the normalised weights over all categories, and anything else
    /// the sample's dominant label.
    pub fn clinical_data(&self, sample: &str) -> Vec<(String, f64)> {
        let empty = EventCountMap::new();
        let counts = self.samples.get(sample).unwrap_or(&empty);

        match self.track_type {
            TrackType::Number => vec![(COUNTS_LABEL.to_string(), counts.sum())],
            TrackType::Dist => counts.norm_count_dist(&self.categories(), true),
            TrackType::Log2Number => {
                let (e, w) = counts.max_event();
                vec![(e.to_string(), w)]
            }
        }
    }

    pub fn color(&self, event: &str) -> Option<Color> {
        self.colors.get(event).copied()
    }

    /// Track and category colors in insertion order.
    pub fn colors(&self) -> &IndexMap<String, Color> {
        &self.colors
    }

    fn load_value(&mut self, sample: &str, value: &str) {
        let value = value.trim();

        if self.track_type.is_numeric() {
            // non-numbers and non-finite values are skipped
            if let Ok(n) = value.parse::<f64>()
                && n.is_finite()
            {
                let name = self.name.clone();
                self.set(sample, &name, n);
            }
            return;
        }

        // positional values map onto declared categories only
        if is_numeric_dist(value) {
            let categories = self.categories.clone();
            let mut values: Vec<f64> = split_values(value)
                .map(|t| t.parse::<f64>().unwrap_or(0.0))
                .collect();
            // fewer values than categories: missing entries count as zero
            if values.len() < categories.len() {
                values.resize(categories.len(), 0.0);
            }

            if self.multi && values.len() > 1 {
                self.set(sample, MULTI_MUTATION, 1.0);
            } else {
                for (event, v) in categories.iter().zip(values) {
                    self.set(sample, event, v);
                }
            }
            return;
        }

        for token in split_values(value).map(str::trim).filter(|t| !t.is_empty()) {
            if self.categories.is_empty() || self.categories.iter().any(|c| c == token) {
                self.set(sample, token, 1.0);
            }
        }
    }

    /// Give every category without a color one from the palette, by
    /// category index.
    fn assign_palette(&mut self) {
        if self.track_type != TrackType::Dist {
            return;
        }
        for (i, category) in self.categories().into_iter().enumerate() {
            self.colors.entry(category).or_insert_with(|| category_color(i));
        }
    }
}

/// Build one track per non-sample column of a clinical table.
pub fn make_clinical_tracks(table: &dyn Table) -> Vec<ClinicalTrack> {
    if table.n_cols() < 2 {
        return Vec::new();
    }

    let mut tracks: Vec<ClinicalTrack> = table.col_names()[1..]
        .iter()
        .map(|h| ClinicalTrack::from_header(h))
        .collect();

    for row in 0..table.n_rows() {
        let sample = table.value(row, 0);
        for (ti, track) in tracks.iter_mut().enumerate() {
            track.load_value(sample, table.value(row, ti + 1));
        }
    }

    for track in tracks.iter_mut() {
        track.assign_palette();
        debug!(
            "Clinical track '{}' ({}): {} samples, {} categories",
            track.name,
            track.track_type,
            track.samples.len(),
            track.categories().len()
        );
    }

    tracks
}
