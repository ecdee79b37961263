//! Oncoplot output document
//!
//! This module provides:
//! - `OncoplotOutput`: rows, columns, cells, marginals, legend and clinical
//!   tracks of one oncoplot in display order
//! - JSON Schema generation and validation for that document
//!
//! # Example
//!
//! ```ignore
//! use oncogrid::output::OncoplotOutput;
//!
//! let output = OncoplotOutput::from_oncoplot(&plot, &config.aliases);
//! output.write_to_prefix("results/cohort")?;
//! ```

pub mod schema;
pub mod types;

/// Suffix appended to the output prefix.
pub const OUTPUT_SUFFIX: &str = ".oncoplot.json";

pub use types::{
    CellOutput, ClinicalTrackOutput, ClinicalValueOutput, ColorEntry, MarginalOutput,
    OncoplotOutput, WeightedValue,
};
