//! Default row/column ordering ("memo sort").
//!
//! Rows are ranked by how altered they are. Each column then reads its
//! presence/absence pattern down that ranking as a binary number, and
//! columns are sorted by that number, so samples hit in the top rows are
//! pulled to the left and samples sharing a pattern end up adjacent.
//! See <https://gist.github.com/armish/564a65ab874a770e2c26>.

use log::debug;

use super::builder::OncoMatrix;
use super::counts::CellStats;

/// Rows ranked deeper than this all score the lowest bit. Keeps the
/// accumulated score exact.
pub const MAX_MEMO_POWER: u32 = 50;

/// Rank of each row by descending marginal sum. Equal sums keep their
/// construction order.
pub fn row_order_by_sum(row_stats: &[CellStats]) -> Vec<usize> {
    let mut order: Vec<(usize, f64)> = row_stats.iter().map(|s| s.sum()).enumerate().collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));
    order.into_iter().map(|(i, _)| i).collect()
}

/// Bit-pattern score of one column given the row ranking.
pub fn column_score(matrix: &OncoMatrix, row_order: &[usize], col: usize) -> u64 {
    row_order
        .iter()
        .enumerate()
        .filter(|&(_, &r)| matrix.cell(r, col).sum() > 0.0)
        .map(|(rank, _)| 1u64 << MAX_MEMO_POWER.saturating_sub(rank as u32))
        .sum()
}

/// Compute `(row_order, column_order)` for `matrix` without modifying it.
pub fn memo_sort(matrix: &OncoMatrix, row_stats: &[CellStats]) -> (Vec<usize>, Vec<usize>) {
    let row_order = row_order_by_sum(row_stats);

    let mut scored: Vec<(usize, u64)> = (0..matrix.n_cols())
        .map(|c| (c, column_score(matrix, &row_order, c)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    let col_order: Vec<usize> = scored.into_iter().map(|(c, _)| c).collect();

    debug!(
        "memo sort ordered {} rows and {} columns",
        row_order.len(),
        col_order.len()
    );

    (row_order, col_order)
}
