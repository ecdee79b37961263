//! Dense feature × sample matrix construction.
//!
//! Two joins are supported: a categorical join on gene and sample columns,
//! and a spatial join that assigns each mutation to every row interval it
//! overlaps. Either way every `(row, col)` cell exists, empty or not.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use super::counts::CellStats;
use super::marginals::Marginals;
use crate::config::ColumnNames;
use crate::error::{OncoError, OncoResult};
use crate::table::Table;
use crate::utils::bin_map::OverlapIndex;
use crate::utils::location::GenomicLocation;

/// Event for a mutation whose reference allele is `-`.
pub const INSERTION: &str = "INS";
/// Event for a mutation whose tumour allele is `-`.
pub const DELETION: &str = "DEL";
/// Event for any other allele change.
pub const SUBSTITUTION: &str = "SNP";

/// Frozen row-major arena of cells.
///
/// Never reordered after construction; views reorder through index
/// permutations instead.
#[derive(Debug, Clone, PartialEq)]
pub struct OncoMatrix {
    rows: Vec<String>,
    cols: Vec<String>,
    cells: Vec<CellStats>,
}

impl OncoMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn row_names(&self) -> &[String] {
        &self.rows
    }

    pub fn col_names(&self) -> &[String] {
        &self.cols
    }

    /// Cell at original coordinates. Panics when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &CellStats {
        &self.cells[row * self.cols.len() + col]
    }

    /// Cells of one row in column order.
    pub fn row(&self, row: usize) -> &[CellStats] {
        let n = self.cols.len();
        &self.cells[row * n..(row + 1) * n]
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellStats> {
        self.cells.iter()
    }

    /// Keep only the columns flagged in `keep`, preserving their order.
    pub fn retain_columns(self, keep: &[bool]) -> OncoMatrix {
        let n_cols = self.cols.len();
        let cols = self
            .cols
            .into_iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(c, _)| c)
            .collect();
        let cells = self
            .cells
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep[i % n_cols])
            .map(|(_, cell)| cell)
            .collect();

        OncoMatrix {
            rows: self.rows,
            cols,
            cells,
        }
    }
}

/// Mutable matrix under construction.
pub struct MatrixBuilder {
    rows: Vec<String>,
    cols: Vec<String>,
    row_index: HashMap<String, usize>,
    col_index: HashMap<String, usize>,
    cells: Vec<CellStats>,
}

impl MatrixBuilder {
    /// Allocate every `(row, col)` cell up front.
    pub fn new(rows: Vec<String>, cols: Vec<String>) -> Self {
        let mut cells = Vec::with_capacity(rows.len() * cols.len());
        for row in &rows {
            for col in &cols {
                cells.push(CellStats::new(row.as_str(), col.as_str()));
            }
        }

        let row_index = rows.iter().enumerate().map(|(i, r)| (r.clone(), i)).collect();
        let col_index = cols.iter().enumerate().map(|(i, c)| (c.clone(), i)).collect();

        Self {
            rows,
            cols,
            row_index,
            col_index,
            cells,
        }
    }

    pub fn row_index(&self, name: &str) -> Option<usize> {
        self.row_index.get(name).copied()
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.col_index.get(name).copied()
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut CellStats {
        let n = self.cols.len();
        &mut self.cells[row * n + col]
    }

    /// Freeze the matrix and hand back empty marginals shaped to it.
    pub fn finish(self) -> (OncoMatrix, Marginals) {
        let matrix = OncoMatrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells,
        };
        let marginals = Marginals::empty(&matrix);
        (matrix, marginals)
    }
}

/// Resolved column indices for the categorical join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneColumns {
    pub sample: usize,
    pub gene: usize,
    pub event_type: usize,
}

impl GeneColumns {
    pub fn resolve(table: &dyn Table, names: &ColumnNames) -> OncoResult<Self> {
        Ok(Self {
            sample: table.find_col(&names.sample)?,
            gene: table.find_col(&names.gene)?,
            event_type: table.find_col(&names.event_type)?,
        })
    }
}

/// Resolved column indices for the spatial join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationColumns {
    pub sample: usize,
    pub chr: usize,
    pub start: usize,
    pub end: usize,
    pub ref_allele: usize,
    pub tum_allele: usize,
}

impl LocationColumns {
    pub fn resolve(table: &dyn Table, names: &ColumnNames) -> OncoResult<Self> {
        Ok(Self {
            sample: table.find_col(&names.sample)?,
            chr: table.find_col(&names.chr)?,
            start: table.find_col(&names.start)?,
            end: table.find_col(&names.end)?,
            ref_allele: table.find_col(&names.ref_allele)?,
            tum_allele: table.find_col(&names.tum_allele)?,
        })
    }
}

/// Classify a mutation from its alleles.
pub fn classify_alleles(ref_allele: &str, tum_allele: &str) -> &'static str {
    if ref_allele == "-" {
        INSERTION
    } else if tum_allele == "-" {
        DELETION
    } else {
        SUBSTITUTION
    }
}

/// Sorted union of mutation samples and clinical samples (first column).
pub fn collect_samples(
    mutations: &dyn Table,
    sample_col: usize,
    clinical: Option<&dyn Table>,
) -> Vec<String> {
    let mut samples: BTreeSet<String> = mutations
        .col_values(sample_col)
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    if let Some(clinical) = clinical
        && clinical.n_cols() > 0
    {
        samples.extend(clinical.col_values(0).into_iter().map(|s| s.to_string()));
    }

    samples.into_iter().collect()
}

/// Categorical join: one row per distinct non-empty gene, one column per sample.
pub fn build_gene_matrix(
    mutations: &dyn Table,
    clinical: Option<&dyn Table>,
    columns: &GeneColumns,
) -> (OncoMatrix, Marginals) {
    let samples = collect_samples(mutations, columns.sample, clinical);

    let genes: Vec<String> = mutations
        .col_values(columns.gene)
        .into_iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut builder = MatrixBuilder::new(genes, samples);
    let mut skipped = 0usize;

    for row in 0..mutations.n_rows() {
        let gene = mutations.value(row, columns.gene);
        let sample = mutations.value(row, columns.sample);

        match (builder.row_index(gene), builder.col_index(sample)) {
            (Some(r), Some(c)) => {
                let event = mutations.value(row, columns.event_type);
                builder.cell_mut(r, c).add(event);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} mutation records without a gene", skipped);
    }

    let (matrix, marginals) = builder.finish();
    debug!(
        "Built gene matrix: {} genes x {} samples from {} records",
        matrix.n_rows(),
        matrix.n_cols(),
        mutations.n_rows()
    );
    (matrix, marginals)
}

fn parse_coordinate(table: &dyn Table, row: usize, col: usize) -> OncoResult<u64> {
    let value = table.value(row, col);
    value.trim().parse::<u64>().map_err(|_| OncoError::InvalidValue {
        row,
        column: table.col_names()[col].clone(),
        value: value.to_string(),
    })
}

/// Spatial join: rows are `locations` in the given order, and each mutation
/// increments the cell of every location it overlaps.
pub fn build_location_matrix(
    mutations: &dyn Table,
    clinical: Option<&dyn Table>,
    locations: &[GenomicLocation],
    index: &dyn OverlapIndex,
    columns: &LocationColumns,
) -> OncoResult<(OncoMatrix, Marginals)> {
    let samples = collect_samples(mutations, columns.sample, clinical);
    let rows: Vec<String> = locations.iter().map(|l| l.to_string()).collect();

    let mut builder = MatrixBuilder::new(rows, samples);
    let mut unplaced = 0usize;

    for row in 0..mutations.n_rows() {
        let sample = mutations.value(row, columns.sample);
        let Some(c) = builder.col_index(sample) else {
            continue;
        };

        let start = parse_coordinate(mutations, row, columns.start)?;
        let end = parse_coordinate(mutations, row, columns.end)?;
        let loc = GenomicLocation::new(mutations.value(row, columns.chr), start, end.max(start));

        let event = classify_alleles(
            mutations.value(row, columns.ref_allele),
            mutations.value(row, columns.tum_allele),
        );

        let hits = index.overlapping(&loc);
        if hits.is_empty() {
            unplaced += 1;
            continue;
        }

        for r in hits {
            builder.cell_mut(r, c).add(event);
        }
    }

    if unplaced > 0 {
        warn!(
            "{} of {} mutations did not overlap any location",
            unplaced,
            mutations.n_rows()
        );
    }

    let (matrix, marginals) = builder.finish();
    debug!(
        "Built location matrix: {} locations x {} samples",
        matrix.n_rows(),
        matrix.n_cols()
    );
    Ok((matrix, marginals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::marginals::{MultiMode, aggregate};
    use crate::matrix::order::memo_sort;
    use crate::table::DataTable;
    use crate::utils::bin_map::LocationBinMap;

    fn gene_table() -> DataTable {
        DataTable::from_strs(
            "muts",
            &["Sample", "Gene", "Type"],
            &[
                &["S1", "TP53", "Missense"],
                &["S1", "TP53", "Missense"],
                &["S2", "KRAS", "Nonsense"],
            ],
        )
    }

    fn gene_cols(table: &DataTable) -> GeneColumns {
        GeneColumns::resolve(table, &ColumnNames::default()).unwrap()
    }

    #[test]
    fn test_categorical_join_counts() {
        let table = gene_table();
        let (matrix, marginals) = build_gene_matrix(&table, None, &gene_cols(&table));

        assert_eq!(matrix.row_names(), &["KRAS".to_string(), "TP53".to_string()]);
        assert_eq!(matrix.col_names(), &["S1".to_string(), "S2".to_string()]);

        let tp53_s1 = matrix.cell(1, 0);
        assert_eq!(tp53_s1.sum(), 2.0);
        assert_eq!(tp53_s1.counts().get("Missense"), Some(2.0));
        assert_eq!((tp53_s1.row(), tp53_s1.col()), ("TP53", "S1"));

        let kras_s2 = matrix.cell(0, 1);
        assert_eq!(kras_s2.sum(), 1.0);
        assert_eq!(kras_s2.max_event(), ("Nonsense", 1.0));

        assert_eq!(matrix.cell(1, 1).sum(), 0.0);

        // skeletons are shaped but empty
        assert_eq!(marginals.rows().len(), 2);
        assert_eq!(marginals.cols().len(), 2);
        assert!(marginals.rows().iter().all(|m| m.is_empty()));
    }

    #[test]
    fn test_dense_even_when_inactive() {
        let table = gene_table();
        let clinical = DataTable::from_strs("clin", &["Sample", "Age"], &[&["S9", "40"]]);
        let (matrix, _) =
            build_gene_matrix(&table, Some(&clinical as &dyn Table), &gene_cols(&table));

        assert_eq!(matrix.n_cols(), 3);
        assert_eq!(matrix.col_names()[2], "S9");
        assert_eq!(matrix.cells().count(), matrix.n_rows() * matrix.n_cols());
        for r in 0..matrix.n_rows() {
            assert_eq!(matrix.row(r).len(), 3);
        }
        assert!(matrix.cell(0, 2).is_empty());
    }

    #[test]
    fn test_empty_gene_skipped() {
        let table = DataTable::from_strs(
            "muts",
            &["Sample", "Gene", "Type"],
            &[&["S1", "", "Missense"], &["S1", "EGFR", "Amp"]],
        );
        let (matrix, _) = build_gene_matrix(&table, None, &gene_cols(&table));
        assert_eq!(matrix.row_names(), &["EGFR".to_string()]);
        assert_eq!(matrix.cell(0, 0).sum(), 1.0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let table = gene_table();
        let (ma, _) = build_gene_matrix(&table, None, &gene_cols(&table));
        let (mb, _) = build_gene_matrix(&table, None, &gene_cols(&table));
        assert_eq!(ma, mb);

        let modes = [
            MultiMode::Single,
            MultiMode::StackedBar,
            MultiMode::EqualBar,
            MultiMode::Multi,
        ];
        for mode in modes {
            let sa = aggregate(&ma, mode);
            let sb = aggregate(&mb, mode);
            assert_eq!(sa, sb);
            assert_eq!(memo_sort(&ma, sa.rows()), memo_sort(&mb, sb.rows()));
        }
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let table = DataTable::from_strs("muts", &["Sample", "Hugo_Symbol", "Type"], &[]);
        let err = GeneColumns::resolve(&table, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, OncoError::ColumnNotFound(ref c) if c == "Gene"));
    }

    #[test]
    fn test_classify_alleles() {
        assert_eq!(classify_alleles("-", "A"), INSERTION);
        assert_eq!(classify_alleles("AT", "-"), DELETION);
        assert_eq!(classify_alleles("C", "T"), SUBSTITUTION);
    }

    fn location_table(rows: &[&[&str]]) -> DataTable {
        DataTable::from_strs(
            "muts",
            &[
                "Sample",
                "Chromosome",
                "Start_Position",
                "End_position",
                "Reference_Allele",
                "Tumor_Seq_Allele2",
            ],
            rows,
        )
    }

    #[test]
    fn test_spatial_join_overlaps_multiple_rows() {
        let table = location_table(&[&["S1", "1", "100", "200", "C", "T"]]);
        let locations = vec![
            GenomicLocation::new("chr1", 50, 150),
            GenomicLocation::new("chr1", 150, 250),
            GenomicLocation::new("chr1", 900, 950),
        ];
        let index = LocationBinMap::new(&locations);
        let cols = LocationColumns::resolve(&table, &ColumnNames::default()).unwrap();

        let (matrix, _) = build_location_matrix(&table, None, &locations, &index, &cols).unwrap();

        assert_eq!(matrix.row_names()[0], "chr1:50-150");
        assert_eq!(matrix.cell(0, 0).counts().get(SUBSTITUTION), Some(1.0));
        assert_eq!(matrix.cell(1, 0).counts().get(SUBSTITUTION), Some(1.0));
        assert!(matrix.cell(2, 0).is_empty());
    }

    #[test]
    fn test_spatial_join_event_types_and_row_order() {
        let table = location_table(&[
            &["S1", "chr2", "10", "10", "-", "A"],
            &["S2", "chr2", "12", "14", "ACG", "-"],
            &["S2", "chr7", "500", "500", "G", "A"],
        ]);
        // caller order is kept, not sorted
        let locations = vec![
            GenomicLocation::new("chr7", 1, 1000),
            GenomicLocation::new("chr2", 1, 100),
        ];
        let index = LocationBinMap::new(&locations);
        let cols = LocationColumns::resolve(&table, &ColumnNames::default()).unwrap();
        let (matrix, _) = build_location_matrix(&table, None, &locations, &index, &cols).unwrap();

        assert_eq!(matrix.row_names()[0], "chr7:1-1000");
        assert_eq!(matrix.cell(1, 0).max_event(), (INSERTION, 1.0));
        assert_eq!(matrix.cell(1, 1).max_event(), (DELETION, 1.0));
        assert_eq!(matrix.cell(0, 1).max_event(), (SUBSTITUTION, 1.0));
        assert!(matrix.cell(0, 0).is_empty());
    }

    #[test]
    fn test_spatial_join_bad_coordinate() {
        let table = location_table(&[&["S1", "chr1", "abc", "200", "C", "T"]]);
        let locations = vec![GenomicLocation::new("chr1", 1, 1000)];
        let index = LocationBinMap::new(&locations);
        let cols = LocationColumns::resolve(&table, &ColumnNames::default()).unwrap();

        let err = build_location_matrix(&table, None, &locations, &index, &cols).unwrap_err();
        assert!(err.to_string().contains("Start_Position"));
    }

    #[test]
    fn test_retain_columns() {
        let table = gene_table();
        let (matrix, _) = build_gene_matrix(&table, None, &gene_cols(&table));
        let kept = matrix.retain_columns(&[false, true]);

        assert_eq!(kept.col_names(), &["S2".to_string()]);
        assert_eq!(kept.cell(0, 0).col(), "S2");
        assert_eq!(kept.cell(0, 0).sum(), 1.0);
        assert!(kept.cell(1, 0).is_empty());
    }
}
