//! An implementation of the standard algorithm with no optimisations.
//!
//! Columns are reduced left to right. The pivot of a column is its lowest non-zero entry,
//! i.e. the one with the largest row index. A column is reduced by adding multiples of
//! earlier columns sharing its pivot until the column is zero or its pivot is new.

use log::trace;
use rustc_hash::FxHashMap;

use crate::{
    columns::SparseVector,
    fields::Field,
    matrices::{ColumnMatrix, MatrixOracle},
    BettiError,
};

/// Result of [`standard_algo`]: `R = D V` with `V` unit upper triangular and
/// the non-zero columns of `R` having distinct pivots.
#[derive(Debug, Clone)]
pub struct StandardReduction<F> {
    reduced: ColumnMatrix<F>,
    reduction_matrix: ColumnMatrix<F>,
    // low_inverse[i]=(j, lambda) means R[j] has lowest non-zero in row i with coefficient lambda
    low_inverse: FxHashMap<usize, (usize, F)>,
}

/// Run the standard algorithm to reduce the provided boundary matrix.
pub fn standard_algo<F: Field>(
    boundary: &ColumnMatrix<F>,
) -> Result<StandardReduction<F>, BettiError> {
    let n_cols = boundary.n_cols();
    let mut r_cols: Vec<SparseVector<F>> = Vec::with_capacity(n_cols);
    let mut v_cols: Vec<SparseVector<F>> = Vec::with_capacity(n_cols);
    let mut low_inverse: FxHashMap<usize, (usize, F)> = FxHashMap::default();

    for (i, column) in boundary.columns().iter().enumerate() {
        // Reduce column i
        let mut r_i = column.clone();
        let mut v_i = SparseVector::unit(i);

        'reduction: loop {
            let Some((pivot_row, pivot_coeff)) = r_i.lastnz() else {
                // Column reduced to 0 -> found cycle -> move onto next column
                break 'reduction;
            };

            // Check if there is a column with the same pivot
            let Some(&(j, j_coeff)) = low_inverse.get(&pivot_row) else {
                // Cannot reduce further -> found boundary -> break and save pivot
                break 'reduction;
            };

            // If so then we add a multiple of that column to cancel out the pivot in r_i
            let col_multiple = -pivot_coeff.try_div(j_coeff)?;
            r_i.axpy(col_multiple, &r_cols[j]);
            v_i.axpy(col_multiple, &v_cols[j]);
        }

        // Save pivot if we have one
        if let Some((pivot_row, pivot_coeff)) = r_i.lastnz() {
            trace!("Column {i} has pivot {pivot_row}");
            low_inverse.insert(pivot_row, (i, pivot_coeff));
        } else {
            trace!("Column {i} is a cycle");
        }

        r_cols.push(r_i);
        v_cols.push(v_i);
    }

    Ok(StandardReduction {
        reduced: ColumnMatrix::from_columns_unchecked(boundary.n_rows(), r_cols),
        reduction_matrix: ColumnMatrix::from_columns_unchecked(n_cols, v_cols),
        low_inverse,
    })
}

impl<F: Field> StandardReduction<F> {
    /// The reduced matrix `R`.
    pub fn reduced(&self) -> &ColumnMatrix<F> {
        &self.reduced
    }

    /// The reduction matrix `V`, with `R = D V`.
    pub fn reduction_matrix(&self) -> &ColumnMatrix<F> {
        &self.reduction_matrix
    }

    /// Column of `R` whose pivot is `row`, if any.
    pub fn pivot_col(&self, row: usize) -> Option<usize> {
        self.low_inverse.get(&row).map(|(col, _)| *col)
    }

    pub fn n_pivots(&self) -> usize {
        self.low_inverse.len()
    }

    /// `(column, pivot row)` for every non-zero column of `R`, by column.
    pub fn pivots(&self) -> Vec<(usize, usize)> {
        let mut pivots: Vec<_> = self
            .low_inverse
            .iter()
            .map(|(row, (col, _))| (*col, *row))
            .collect();
        pivots.sort_unstable();
        pivots
    }

    pub fn is_cycle_col(&self, col: usize) -> bool {
        self.reduced
            .columns()
            .get(col)
            .is_some_and(SparseVector::is_zero)
    }

    /// Remove every entry of `chain` lying on a pivot row, by subtracting multiples of the
    /// columns of `R`. Entries are cancelled from the bottom up, exactly as in the main loop,
    /// so the result is the unique element of `chain + im(R)` with no entry on a pivot row.
    pub fn reduce_chain(&self, chain: &SparseVector<F>) -> Result<SparseVector<F>, BettiError> {
        let mut working = chain.clone();
        let mut bound = usize::MAX;
        loop {
            let next = working
                .iter()
                .rev()
                .filter(|(row, _)| *row < bound)
                .find_map(|(row, coeff)| {
                    self.low_inverse
                        .get(&row)
                        .map(|&(col, col_coeff)| (row, coeff, col, col_coeff))
                });
            let Some((row, coeff, col, col_coeff)) = next else {
                return Ok(working);
            };
            // Column col has nothing below row, so entries past row are untouched
            working.axpy(-coeff.try_div(col_coeff)?, &self.reduced.columns()[col]);
            bound = row;
        }
    }
}
