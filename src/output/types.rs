//! Serializable oncoplot document.
//!
//! Rows, columns and cells are written in display order so a renderer can
//! draw the document without re-deriving any ordering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;

use crate::clinical::ClinicalTrack;
use crate::error::OncoResult;
use crate::legend::{NO_ALTERATION_COLOR, event_label};
use crate::matrix::CellStats;
use crate::pipeline::Oncoplot;

/// Top-level oncoplot output
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OncoplotOutput {
    /// Tool version
    pub version: String,

    /// Multi-event policy used for the marginals
    pub mode: String,

    /// Row names (genes or locations) in display order
    pub rows: Vec<String>,

    /// Sample names in display order
    pub columns: Vec<String>,

    /// Non-empty cells, addressed by display position
    pub cells: Vec<CellOutput>,

    /// Per-row totals, parallel to `rows`
    pub row_marginals: Vec<MarginalOutput>,

    /// Per-sample totals, parallel to `columns`
    pub column_marginals: Vec<MarginalOutput>,

    /// Legend entries in display order
    pub legend: Vec<ColorEntry>,

    /// Fill for cells without events
    pub no_alteration_color: String,

    /// Clinical annotation tracks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clinical_tracks: Vec<ClinicalTrackOutput>,
}

/// One non-empty matrix cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CellOutput {
    /// Display row index
    pub row: usize,
    /// Display column index
    pub col: usize,
    /// Display label (dominant event, alias or `Multi`)
    pub label: String,
    /// Event counts
    pub events: BTreeMap<String, f64>,
}

/// Row or column marginal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarginalOutput {
    pub name: String,
    pub sum: f64,
    pub events: BTreeMap<String, f64>,
}

/// Named hex color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorEntry {
    pub name: String,
    pub color: String,
}

/// Weighted value of a clinical track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeightedValue {
    pub label: String,
    pub value: f64,
}

/// Values of one clinical track for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClinicalValueOutput {
    pub sample: String,
    pub values: Vec<WeightedValue>,
}

/// Clinical annotation track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClinicalTrackOutput {
    pub name: String,
    /// `number`, `log2number` or `dist`
    pub track_type: String,
    pub categories: Vec<String>,
    pub colors: Vec<ColorEntry>,
    /// One entry per displayed sample with recorded values
    pub samples: Vec<ClinicalValueOutput>,
}

fn event_map(stats: &CellStats) -> BTreeMap<String, f64> {
    stats
        .events()
        .into_iter()
        .map(|(e, w)| (e.to_string(), w))
        .collect()
}

impl From<&CellStats> for MarginalOutput {
    fn from(stats: &CellStats) -> Self {
        Self {
            name: stats.row().to_string(),
            sum: stats.sum(),
            events: event_map(stats),
        }
    }
}

impl ClinicalTrackOutput {
    /// Track values restricted to `samples`, in that order.
    pub fn from_track(track: &ClinicalTrack, samples: &[&str]) -> Self {
        Self {
            name: track.name().to_string(),
            track_type: track.track_type().to_string(),
            categories: track.categories(),
            colors: track
                .colors()
                .iter()
                .map(|(name, c)| ColorEntry {
                    name: name.clone(),
                    color: c.to_hex(),
                })
                .collect(),
            samples: samples
                .iter()
                .filter(|s| track.sample_events(s).is_some())
                .map(|s| ClinicalValueOutput {
                    sample: s.to_string(),
                    values: track
                        .clinical_data(s)
                        .into_iter()
                        .map(|(label, value)| WeightedValue { label, value })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl OncoplotOutput {
    /// Flatten an oncoplot into its output document.
    pub fn from_oncoplot(plot: &Oncoplot, aliases: &HashMap<String, String>) -> Self {
        let frame = &plot.frame;
        let (n_rows, n_cols) = frame.shape();

        let mut cells = Vec::new();
        for row in 0..n_rows {
            for col in 0..n_cols {
                let cell = frame.data(row, col);
                if cell.is_empty() {
                    continue;
                }
                cells.push(CellOutput {
                    row,
                    col,
                    label: event_label(cell, aliases, plot.mode),
                    events: event_map(cell),
                });
            }
        }

        let columns: Vec<&str> = frame.column_names();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: plot.mode.to_string(),
            rows: frame.row_names().iter().map(|s| s.to_string()).collect(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            cells,
            row_marginals: frame.row_stats().into_iter().map(MarginalOutput::from).collect(),
            column_marginals: frame
                .column_stats()
                .into_iter()
                .map(MarginalOutput::from)
                .collect(),
            legend: plot
                .legend
                .entries()
                .map(|(name, c)| ColorEntry {
                    name: name.to_string(),
                    color: c.to_hex(),
                })
                .collect(),
            no_alteration_color: NO_ALTERATION_COLOR.to_hex(),
            clinical_tracks: plot
                .tracks
                .iter()
                .map(|t| ClinicalTrackOutput::from_track(t, &columns))
                .collect(),
        }
    }

    /// Write this output to a JSON file
    pub fn write_json(&self, path: &str) -> OncoResult<()> {
        if super::schema::should_validate() {
            let value = serde_json::to_value(self).map_err(std::io::Error::other)?;
            if let Err(msg) = super::schema::validate(&value) {
                log::warn!("Schema validation failed for {}: {}", path, msg);
                if cfg!(debug_assertions) {
                    return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, msg).into());
                }
            }
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::other)?;
        Ok(())
    }

    /// Write using the output prefix
    ///
    /// Creates "{prefix}.oncoplot.json" and returns its path.
    pub fn write_to_prefix(&self, prefix: &str) -> OncoResult<String> {
        let path = format!("{}{}", prefix, super::OUTPUT_SUFFIX);
        self.write_json(&path)?;
        Ok(path)
    }

    /// Load an oncoplot document from a JSON file
    pub fn load_json(path: &str) -> OncoResult<Self> {
        let file = File::open(path)?;
        let output: Self = serde_json::from_reader(file).map_err(std::io::Error::other)?;
        Ok(output)
    }

    /// Number of drawn (non-empty) cells
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }
}
