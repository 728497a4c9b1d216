// ======== Matrix oracle adaptors ============================

use crate::{columns::SparseVector, BettiError};

use super::{MatrixOracle, MatrixRef};

// ====== Consolidator =========================

/// Sum repeated rows and drop zeros, so columns come out sorted by row.
pub fn consolidate<M: MatrixRef>(oracle: M) -> Consolidator<M> {
    Consolidator { oracle }
}

#[derive(Clone, Copy)]
pub struct Consolidator<M: MatrixRef> {
    oracle: M,
}

pub struct ConsolidatorColumn<CF> {
    entries: std::vec::IntoIter<(usize, CF)>,
}

impl<CF> Iterator for ConsolidatorColumn<CF> {
    type Item = (CF, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (row, coeff) = self.entries.next()?;
        Some((coeff, row))
    }
}

impl<M: MatrixRef> MatrixOracle for Consolidator<M> {
    type CoefficientField = M::CoefficientField;

    fn n_rows(&self) -> usize {
        self.oracle.n_rows()
    }

    fn n_cols(&self) -> usize {
        self.oracle.n_cols()
    }

    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError> {
        let column: SparseVector<_> = self.oracle.build_column(col)?;
        Ok(ConsolidatorColumn {
            entries: column.iter().collect::<Vec<_>>().into_iter(),
        })
    }
}

// ====== Permuted =============================

/// View `oracle` with rows and columns listed in a new order.
///
/// Column `j` of the view is column `col_order[j]` of `oracle`, and a row `r` of `oracle`
/// becomes the row `i` of the view with `row_order[i] == r`.
pub fn permute<'a, M: MatrixRef>(
    oracle: M,
    row_order: &'a [usize],
    col_order: &'a [usize],
) -> Result<Permuted<'a, M>, BettiError> {
    check_order(row_order, oracle.n_rows())?;
    check_order(col_order, oracle.n_cols())?;
    let mut row_rank = vec![0; row_order.len()];
    for (new_row, &old_row) in row_order.iter().enumerate() {
        row_rank[old_row] = new_row;
    }
    Ok(Permuted {
        oracle,
        row_rank,
        col_order,
    })
}

fn check_order(order: &[usize], len: usize) -> Result<(), BettiError> {
    if order.len() != len {
        return Err(BettiError::DimensionMismatch {
            expected: len,
            found: order.len(),
        });
    }
    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => return Err(BettiError::InvalidPermutation { index }),
            None => return Err(BettiError::out_of_range("index", index, len)),
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct Permuted<'a, M: MatrixRef> {
    oracle: M,
    row_rank: Vec<usize>,
    col_order: &'a [usize],
}

impl<'a, M: MatrixRef> MatrixOracle for Permuted<'a, M> {
    type CoefficientField = M::CoefficientField;

    fn n_rows(&self) -> usize {
        self.row_rank.len()
    }

    fn n_cols(&self) -> usize {
        self.col_order.len()
    }

    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError> {
        let old_col = *self
            .col_order
            .get(col)
            .ok_or_else(|| BettiError::out_of_range("column", col, self.col_order.len()))?;
        Ok(self
            .oracle
            .column(old_col)?
            .map(|(coeff, row)| (coeff, self.row_rank[row])))
    }
}
