//! Mutation matrix: cells, construction, marginals, ordering and the
//! display frame.

pub mod builder;
pub mod counts;
pub mod frame;
pub mod marginals;
pub mod order;

pub use builder::{
    GeneColumns, LocationColumns, MatrixBuilder, OncoMatrix, build_gene_matrix,
    build_location_matrix,
};
pub use counts::{CellStats, EventCountMap};
pub use frame::MutationFrame;
pub use marginals::{MULTI_MUTATION, Marginals, MultiMode, aggregate};
pub use order::memo_sort;

/// Drop columns whose marginal is empty, i.e. samples with no events.
pub fn remove_empty_columns(matrix: OncoMatrix, marginals: Marginals) -> (OncoMatrix, Marginals) {
    let keep: Vec<bool> = marginals.cols().iter().map(|c| c.sum() > 0.0).collect();
    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped == 0 {
        return (matrix, marginals);
    }
    log::debug!("Removing {} empty columns", dropped);
    (matrix.retain_columns(&keep), marginals.retain_columns(&keep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_empty_columns() {
        let mut b = MatrixBuilder::new(
            vec!["A".into(), "B".into()],
            vec!["S1".into(), "S2".into(), "S3".into()],
        );
        b.cell_mut(0, 2).add("SNP");
        b.cell_mut(1, 0).add("DEL");
        let (matrix, _) = b.finish();
        let marginals = aggregate(&matrix, MultiMode::Multi);

        let (matrix, marginals) = remove_empty_columns(matrix, marginals);
        assert_eq!(matrix.col_names(), &["S1".to_string(), "S3".to_string()]);
        assert_eq!(marginals.cols().len(), 2);
        assert_eq!(marginals.cols()[1].col(), "S3");
        // rows are never removed
        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.cell(0, 1).max_event(), ("SNP", 1.0));
    }
}
