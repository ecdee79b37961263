//! End-to-end oncoplot construction: build, aggregate, drop empty samples,
//! sort and derive the legend.

use log::{debug, info};

use crate::clinical::{ClinicalTrack, make_clinical_tracks};
use crate::config::OncoConfig;
use crate::error::OncoResult;
use crate::legend::Legend;
use crate::matrix::{
    GeneColumns, LocationColumns, Marginals, MultiMode, MutationFrame, OncoMatrix,
    build_gene_matrix, build_location_matrix, memo_sort, remove_empty_columns,
};
use crate::table::Table;
use crate::utils::bin_map::LocationBinMap;
use crate::utils::location::GenomicLocation;

/// Everything needed to draw an oncoplot.
#[derive(Debug, Clone)]
pub struct Oncoplot {
    pub frame: MutationFrame,
    pub legend: Legend,
    pub tracks: Vec<ClinicalTrack>,
    pub mode: MultiMode,
}

/// Aggregate, filter, order and label a freshly built matrix.
fn finish(
    matrix: OncoMatrix,
    mut marginals: Marginals,
    config: &OncoConfig,
) -> (MutationFrame, Legend) {
    marginals.aggregate(&matrix, config.multi);

    let (matrix, marginals) = if config.remove_empty {
        remove_empty_columns(matrix, marginals)
    } else {
        (matrix, marginals)
    };

    let mut frame = MutationFrame::new(matrix, marginals);

    if config.sort {
        let (rows, cols) = memo_sort(frame.matrix(), frame.marginals().rows());
        frame = frame.set_row_order(&rows).set_column_order(&cols);
    }

    let legend = Legend::for_matrix(
        frame.matrix(),
        frame.marginals(),
        &config.plot_order,
        &config.colors,
    );

    debug!(
        "Oncoplot frame {:?} with {} legend entries ({} mode)",
        frame.shape(),
        legend.len(),
        config.multi
    );

    (frame, legend)
}

/// Gene x sample oncoplot from a mutation table with gene and type columns.
pub fn make_oncoplot(
    mutations: &dyn Table,
    clinical: Option<&dyn Table>,
    config: &OncoConfig,
) -> OncoResult<(MutationFrame, Legend)> {
    let columns = GeneColumns::resolve(mutations, &config.columns)?;
    let (matrix, marginals) = build_gene_matrix(mutations, clinical, &columns);
    Ok(finish(matrix, marginals, config))
}

/// Location x sample oncoplot; rows follow `locations` before sorting.
pub fn make_location_oncoplot(
    mutations: &dyn Table,
    clinical: Option<&dyn Table>,
    locations: &[GenomicLocation],
    config: &OncoConfig,
) -> OncoResult<(MutationFrame, Legend)> {
    let columns = LocationColumns::resolve(mutations, &config.columns)?;
    let index = LocationBinMap::with_bin_size(locations, config.bin_size);
    let (matrix, marginals) =
        build_location_matrix(mutations, clinical, locations, &index, &columns)?;
    Ok(finish(matrix, marginals, config))
}

/// Collects the inputs for one oncoplot and runs the matching pipeline.
pub struct OncoplotRunner<'a> {
    config: &'a OncoConfig,
    clinical: Option<&'a dyn Table>,
    locations: Option<&'a [GenomicLocation]>,
}

impl<'a> OncoplotRunner<'a> {
    pub fn new(config: &'a OncoConfig) -> Self {
        Self {
            config,
            clinical: None,
            locations: None,
        }
    }

    pub fn with_clinical(mut self, clinical: Option<&'a dyn Table>) -> Self {
        self.clinical = clinical;
        self
    }

    /// Switch to location rows.
    pub fn with_locations(mut self, locations: &'a [GenomicLocation]) -> Self {
        self.locations = Some(locations);
        self
    }

    pub fn run(&self, mutations: &dyn Table) -> OncoResult<Oncoplot> {
        let (frame, legend) = match self.locations {
            Some(locations) => {
                info!("Building location oncoplot over {} locations", locations.len());
                make_location_oncoplot(mutations, self.clinical, locations, self.config)?
            }
            None => {
                info!("Building gene oncoplot");
                make_oncoplot(mutations, self.clinical, self.config)?
            }
        };

        let tracks = self.clinical.map(make_clinical_tracks).unwrap_or_default();

        info!(
            "Oncoplot has {} rows, {} samples, {} clinical tracks",
            frame.shape().0,
            frame.shape().1,
            tracks.len()
        );

        Ok(Oncoplot {
            frame,
            legend,
            tracks,
            mode: self.config.multi,
        })
    }
}
