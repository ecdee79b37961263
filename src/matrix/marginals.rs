//! Row and column marginals for the summary bar graphs.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::builder::OncoMatrix;
use super::counts::CellStats;

/// Synthetic event standing for a cell with more than one distinct event.
pub const MULTI_MUTATION: &str = "Multi";

/// How a cell's events are folded into the marginals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiMode {
    /// Fractional stacking; cells are labelled by their dominant event.
    Single,
    /// Each event adds `weight / cell sum`.
    #[serde(alias = "fractional")]
    StackedBar,
    /// Each distinct event adds `1 / event count`.
    EqualBar,
    /// Multi-event cells add one `Multi` unit, single-event cells stack.
    #[default]
    Multi,
}

impl MultiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiMode::Single => "single",
            MultiMode::StackedBar => "stackedbar",
            MultiMode::EqualBar => "equalbar",
            MultiMode::Multi => "multi",
        }
    }
}

impl fmt::Display for MultiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MultiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(MultiMode::Single),
            "stackedbar" | "fractional" => Ok(MultiMode::StackedBar),
            "equalbar" => Ok(MultiMode::EqualBar),
            "multi" => Ok(MultiMode::Multi),
            other => Err(format!("Unknown multi mode: {}", other)),
        }
    }
}

/// The `(event, weight)` shares one cell adds to each of its marginals.
pub fn cell_contribution(cell: &CellStats, mode: MultiMode) -> Vec<(&str, f64)> {
    let events = cell.events();
    if events.is_empty() {
        return Vec::new();
    }

    match mode {
        MultiMode::Multi if events.len() > 1 => vec![(MULTI_MUTATION, 1.0)],
        MultiMode::EqualBar => {
            let share = 1.0 / events.len() as f64;
            events.into_iter().map(|(e, _)| (e, share)).collect()
        }
        _ => {
            let total = cell.sum();
            events.into_iter().map(|(e, w)| (e, w / total)).collect()
        }
    }
}

/// One marginal per matrix row and per matrix column.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginals {
    rows: Vec<CellStats>,
    cols: Vec<CellStats>,
}

impl Marginals {
    /// Empty skeleton shaped to `matrix`.
    pub fn empty(matrix: &OncoMatrix) -> Self {
        Self {
            rows: matrix.row_names().iter().map(|r| CellStats::marginal(r)).collect(),
            cols: matrix.col_names().iter().map(|c| CellStats::marginal(c)).collect(),
        }
    }

    pub fn rows(&self) -> &[CellStats] {
        &self.rows
    }

    pub fn cols(&self) -> &[CellStats] {
        &self.cols
    }

    /// Fold every non-empty cell of `matrix` into the marginals.
    pub fn aggregate(&mut self, matrix: &OncoMatrix, mode: MultiMode) {
        let mut active = 0usize;
        for r in 0..matrix.n_rows() {
            for (c, cell) in matrix.row(r).iter().enumerate() {
                let shares = cell_contribution(cell, mode);
                if shares.is_empty() {
                    continue;
                }
                active += 1;
                for (event, share) in shares {
                    self.rows[r].set(event, share);
                    self.cols[c].set(event, share);
                }
            }
        }
        debug!("Aggregated {} non-empty cells ({} mode)", active, mode);
    }

    /// Keep only the column marginals flagged in `keep`.
    pub fn retain_columns(self, keep: &[bool]) -> Marginals {
        Marginals {
            rows: self.rows,
            cols: self
                .cols
                .into_iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(c, _)| c)
                .collect(),
        }
    }
}

/// Build marginals for `matrix` under `mode` in one step.
pub fn aggregate(matrix: &OncoMatrix, mode: MultiMode) -> Marginals {
    let mut marginals = Marginals::empty(matrix);
    marginals.aggregate(matrix, mode);
    marginals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::builder::MatrixBuilder;

    /// 2 rows x 2 cols with a two-event cell at (0, 0) and a single-event
    /// cell at (1, 1).
    fn matrix() -> OncoMatrix {
        let mut b = MatrixBuilder::new(
            vec!["TP53".into(), "KRAS".into()],
            vec!["S1".into(), "S2".into()],
        );
        b.cell_mut(0, 0).add("Missense");
        b.cell_mut(0, 0).add("Nonsense");
        b.cell_mut(1, 1).add("Missense");
        b.cell_mut(1, 1).add("Missense");
        b.cell_mut(1, 1).add("Frameshift");
        b.finish().0
    }

    #[test]
    fn test_equalbar_splits_evenly() {
        let m = aggregate(&matrix(), MultiMode::EqualBar);

        for stats in [&m.rows()[0], &m.cols()[0]] {
            assert_eq!(stats.counts().get("Missense"), Some(0.5));
            assert_eq!(stats.counts().get("Nonsense"), Some(0.5));
            assert!(!stats.counts().contains(MULTI_MUTATION));
        }
    }

    #[test]
    fn test_multi_flags_multi_event_cells() {
        let m = aggregate(&matrix(), MultiMode::Multi);

        for stats in [&m.rows()[0], &m.cols()[0]] {
            assert_eq!(stats.counts().get(MULTI_MUTATION), Some(1.0));
            assert_eq!(stats.counts().get("Missense"), None);
            assert_eq!(stats.counts().get("Nonsense"), None);
        }
    }

    #[test]
    fn test_multi_falls_back_to_fractional_for_single_event() {
        let mut b = MatrixBuilder::new(vec!["EGFR".into()], vec!["S1".into()]);
        b.cell_mut(0, 0).add("Amp");
        b.cell_mut(0, 0).add("Amp");
        let matrix = b.finish().0;

        let m = aggregate(&matrix, MultiMode::Multi);
        assert_eq!(m.rows()[0].counts().get("Amp"), Some(1.0));
        assert_eq!(m.rows()[0].counts().get(MULTI_MUTATION), None);
    }

    #[test]
    fn test_fractional_weights() {
        let m = aggregate(&matrix(), MultiMode::StackedBar);
        let kras = &m.rows()[1];
        let two_thirds = 2.0 / 3.0;
        assert!((kras.counts().get("Missense").unwrap() - two_thirds).abs() < 1e-12);
        assert!((kras.counts().get("Frameshift").unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_each_cell_contributes_one_unit() {
        let matrix = matrix();
        for mode in [MultiMode::EqualBar, MultiMode::StackedBar, MultiMode::Single] {
            let m = aggregate(&matrix, mode);
            for stats in m.rows().iter().chain(m.cols()) {
                assert!((stats.sum() - 1.0).abs() < 1e-12, "{} {}", mode, stats.row());
            }
        }
    }

    #[test]
    fn test_empty_cells_ignored() {
        let m = aggregate(&matrix(), MultiMode::EqualBar);
        // (0, 1) and (1, 0) are empty, so S2 only sees KRAS
        assert_eq!(m.cols()[1].counts().get("Nonsense"), None);
        assert!(m.rows().iter().all(|r| r.sum().is_finite()));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("EqualBar".parse::<MultiMode>().unwrap(), MultiMode::EqualBar);
        assert_eq!("fractional".parse::<MultiMode>().unwrap(), MultiMode::StackedBar);
        assert!("bars".parse::<MultiMode>().is_err());
        assert_eq!(MultiMode::default(), MultiMode::Multi);
    }
}
