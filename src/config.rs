//! Configuration for oncoplot construction.
//!
//! Everything is optional in the JSON file; missing fields fall back to the
//! defaults below so an empty object `{}` is a valid configuration.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use crate::error::{OncoError, OncoResult};
use crate::legend::color::Color;
use crate::matrix::MultiMode;
use crate::utils::bin_map::DEFAULT_BIN_SIZE;

// ============================================================================
// Column names
// ============================================================================

/// Header names used to find the mutation table columns.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ColumnNames {
    #[serde(default = "default_sample_col")]
    pub sample: String,
    #[serde(default = "default_chr_col")]
    pub chr: String,
    #[serde(default = "default_start_col")]
    pub start: String,
    #[serde(default = "default_end_col")]
    pub end: String,
    #[serde(default = "default_ref_col")]
    pub ref_allele: String,
    #[serde(default = "default_tum_col")]
    pub tum_allele: String,
    #[serde(default = "default_gene_col")]
    pub gene: String,
    /// Event classification column, e.g. the MAF variant classification.
    #[serde(default = "default_type_col")]
    pub event_type: String,
}

fn default_sample_col() -> String { "Sample".to_string() }
fn default_chr_col() -> String { "Chromosome".to_string() }
fn default_start_col() -> String { "Start_Position".to_string() }
fn default_end_col() -> String { "End_position".to_string() }
fn default_ref_col() -> String { "Reference_Allele".to_string() }
fn default_tum_col() -> String { "Tumor_Seq_Allele2".to_string() }
fn default_gene_col() -> String { "Gene".to_string() }
fn default_type_col() -> String { "Type".to_string() }

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            sample: default_sample_col(),
            chr: default_chr_col(),
            start: default_start_col(),
            end: default_end_col(),
            ref_allele: default_ref_col(),
            tum_allele: default_tum_col(),
            gene: default_gene_col(),
            event_type: default_type_col(),
        }
    }
}

// ============================================================================
// Oncoplot configuration
// ============================================================================

/// Main oncoplot configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OncoConfig {
    #[serde(default)]
    pub columns: ColumnNames,
    /// Events listed first in the legend, in this order.
    #[serde(default)]
    pub plot_order: Vec<String>,
    /// Display names applied to cell labels.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Per-event color overrides as hex strings.
    #[serde(default)]
    pub colors: HashMap<String, Color>,
    #[serde(default)]
    pub multi: MultiMode,
    #[serde(default = "default_true")]
    pub sort: bool,
    #[serde(default = "default_true")]
    pub remove_empty: bool,
    /// Bin width for the location overlap index.
    #[serde(default = "default_bin_size")]
    pub bin_size: u64,
}

fn default_true() -> bool { true }
fn default_bin_size() -> u64 { DEFAULT_BIN_SIZE }

impl Default for OncoConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            plot_order: Vec::new(),
            aliases: HashMap::new(),
            colors: HashMap::new(),
            multi: MultiMode::default(),
            sort: default_true(),
            remove_empty: default_true(),
            bin_size: default_bin_size(),
        }
    }
}

impl OncoConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &str) -> OncoResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: OncoConfig = serde_json::from_reader(reader)
            .map_err(|e| OncoError::InvalidConfig(format!("{}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> OncoResult<Self> {
        let config: OncoConfig =
            serde_json::from_str(json).map_err(|e| OncoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OncoResult<()> {
        if self.bin_size == 0 {
            return Err(OncoError::InvalidConfig("bin_size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = OncoConfig::from_json("{}").unwrap();
        assert_eq!(config, OncoConfig::default());
        assert_eq!(config.columns.end, "End_position");
        assert_eq!(config.columns.tum_allele, "Tumor_Seq_Allele2");
        assert_eq!(config.multi, MultiMode::Multi);
        assert!(config.sort);
        assert!(config.remove_empty);
        assert_eq!(config.bin_size, 1000);
    }

    #[test]
    fn test_partial_config() {
        let json = r##"{
            "columns": {"sample": "Tumor_Sample_Barcode", "gene": "Hugo_Symbol"},
            "plot_order": ["Nonsense", "Missense"],
            "aliases": {"Missense_Mutation": "Missense"},
            "colors": {"Missense": "#00ff00"},
            "multi": "equalbar",
            "sort": false
        }"##;
        let config = OncoConfig::from_json(json).unwrap();
        assert_eq!(config.columns.sample, "Tumor_Sample_Barcode");
        assert_eq!(config.columns.gene, "Hugo_Symbol");
        assert_eq!(config.columns.event_type, "Type");
        assert_eq!(config.plot_order, vec!["Nonsense", "Missense"]);
        assert_eq!(config.aliases["Missense_Mutation"], "Missense");
        assert_eq!(config.colors["Missense"], Color::rgb(0, 255, 0));
        assert_eq!(config.multi, MultiMode::EqualBar);
        assert!(!config.sort);
        assert!(config.remove_empty);
    }

    #[test]
    fn test_fractional_alias() {
        let config = OncoConfig::from_json(r#"{"multi": "fractional"}"#).unwrap();
        assert_eq!(config.multi, MultiMode::StackedBar);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            OncoConfig::from_json(r#"{"colors": {"SNP": "blue"}}"#),
            Err(OncoError::InvalidConfig(_))
        ));
        assert!(matches!(
            OncoConfig::from_json(r#"{"bin_size": 0}"#),
            Err(OncoError::InvalidConfig(_))
        ));
        assert!(matches!(
            OncoConfig::load("/nonexistent/oncogrid.json"),
            Err(OncoError::Io(_))
        ));
    }
}
