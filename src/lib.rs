//! Oncoplot matrix engine.
//!
//! Turns a table of mutation records (and optionally a clinical table)
//! into a gene or genomic-location by sample matrix of event counts, with
//! marginal summaries, a default "memo sort" ordering, a color legend and
//! clinical annotation tracks.

pub mod clinical;
pub mod config;
pub mod error;
pub mod legend;
pub mod matrix;
pub mod output;
pub mod pipeline;
pub mod table;
pub mod utils;

pub use error::{OncoError, OncoResult};
