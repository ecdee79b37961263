//! Permutation-aware view over a built matrix and its marginals.

use std::collections::HashMap;
use std::sync::Arc;

use super::builder::OncoMatrix;
use super::counts::CellStats;
use super::marginals::Marginals;

/// Everything the frames share. Immutable once built.
#[derive(Debug)]
struct FrameData {
    matrix: OncoMatrix,
    marginals: Marginals,
    row_lookup: HashMap<String, usize>,
    col_lookup: HashMap<String, usize>,
}

/// A mutation matrix as it is displayed: shared cells plus the current row
/// and column order.
///
/// Reordering never touches the cells; it produces a new frame with a
/// different permutation over the same data.
#[derive(Debug, Clone)]
pub struct MutationFrame {
    data: Arc<FrameData>,
    row_order: Vec<usize>,
    col_order: Vec<usize>,
}

impl MutationFrame {
    pub fn new(matrix: OncoMatrix, marginals: Marginals) -> Self {
        let row_lookup = matrix
            .row_names()
            .iter()
            .enumerate()
            .map(|(i, r)| (r.clone(), i))
            .collect();
        let col_lookup = matrix
            .col_names()
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let row_order = (0..matrix.n_rows()).collect();
        let col_order = (0..matrix.n_cols()).collect();

        Self {
            data: Arc::new(FrameData {
                matrix,
                marginals,
                row_lookup,
                col_lookup,
            }),
            row_order,
            col_order,
        }
    }

    /// `(visible rows, visible columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_order.len(), self.col_order.len())
    }

    /// Cell at display position `(row, col)`. Indices are not checked
    /// beyond normal slice indexing.
    pub fn data(&self, row: usize, col: usize) -> &CellStats {
        self.data
            .matrix
            .cell(self.row_order[row], self.col_order[col])
    }

    /// Same frame with a new row permutation. An empty `idx` restores the
    /// construction order.
    pub fn set_row_order(&self, idx: &[usize]) -> MutationFrame {
        let row_order = if idx.is_empty() {
            (0..self.data.matrix.n_rows()).collect()
        } else {
            idx.to_vec()
        };
        MutationFrame {
            data: Arc::clone(&self.data),
            row_order,
            col_order: self.col_order.clone(),
        }
    }

    /// Same frame with a new column permutation. An empty `idx` restores
    /// the construction order.
    pub fn set_column_order(&self, idx: &[usize]) -> MutationFrame {
        let col_order = if idx.is_empty() {
            (0..self.data.matrix.n_cols()).collect()
        } else {
            idx.to_vec()
        };
        MutationFrame {
            data: Arc::clone(&self.data),
            row_order: self.row_order.clone(),
            col_order,
        }
    }

    /// Show the named rows in the given order; unknown names are dropped.
    pub fn set_rows_by_name<S: AsRef<str>>(&self, names: &[S]) -> MutationFrame {
        let idx: Vec<usize> = names
            .iter()
            .filter_map(|n| self.data.row_lookup.get(n.as_ref()).copied())
            .collect();
        self.set_row_order(&idx)
    }

    /// Show the named columns in the given order; unknown names are dropped.
    pub fn set_columns_by_name<S: AsRef<str>>(&self, names: &[S]) -> MutationFrame {
        let idx: Vec<usize> = names
            .iter()
            .filter_map(|n| self.data.col_lookup.get(n.as_ref()).copied())
            .collect();
        self.set_column_order(&idx)
    }

    pub fn reset_row_order(&self) -> MutationFrame {
        self.set_row_order(&[])
    }

    pub fn reset_column_order(&self) -> MutationFrame {
        self.set_column_order(&[])
    }

    pub fn row_order(&self) -> &[usize] {
        &self.row_order
    }

    pub fn column_order(&self) -> &[usize] {
        &self.col_order
    }

    /// Underlying matrix in construction order.
    pub fn matrix(&self) -> &OncoMatrix {
        &self.data.matrix
    }

    /// Underlying marginals in construction order.
    pub fn marginals(&self) -> &Marginals {
        &self.data.marginals
    }

    /// Row marginals in display order.
    pub fn row_stats(&self) -> Vec<&CellStats> {
        self.row_order
            .iter()
            .map(|&i| &self.data.marginals.rows()[i])
            .collect()
    }

    /// Column marginals in display order.
    pub fn column_stats(&self) -> Vec<&CellStats> {
        self.col_order
            .iter()
            .map(|&i| &self.data.marginals.cols()[i])
            .collect()
    }

    pub fn row_names(&self) -> Vec<&str> {
        let names = self.data.matrix.row_names();
        self.row_order.iter().map(|&i| names[i].as_str()).collect()
    }

    pub fn column_names(&self) -> Vec<&str> {
        let names = self.data.matrix.col_names();
        self.col_order.iter().map(|&i| names[i].as_str()).collect()
    }

    /// True when both frames view the same underlying cells.
    pub fn shares_data(&self, other: &MutationFrame) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}
