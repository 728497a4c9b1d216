use crate::{columns::SparseVector, fields::Coefficient, BettiError};

pub mod adaptors;
pub mod combinators;
pub mod implementors;

pub use implementors::{ColumnMatrix, CscMatrix};

// ======== Abstract matrix oracle trait =======================

pub trait MatrixOracle {
    type CoefficientField: Coefficient;

    fn n_rows(&self) -> usize;
    fn n_cols(&self) -> usize;

    /// Produce the non-zero entries of column `col` as `(coefficient, row)` pairs.
    /// Entries need not be sorted and a row may repeat; repeated rows are summed.
    /// If `col` is not a column of the matrix, return [`BettiError::OutOfRange`].
    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError>;

    /// Sum the entries of column `col` into canonical form.
    fn build_column(&self, col: usize) -> Result<SparseVector<Self::CoefficientField>, BettiError> {
        Ok(self.column(col)?.map(|(coeff, row)| (row, coeff)).collect())
    }

    /// Checks that the matrices are equal on the specified col, ignoring ordering and repeated rows
    fn eq_on_col<M2>(&self, other: &M2, col: usize) -> bool
    where
        Self: Sized,
        M2: MatrixOracle<CoefficientField = Self::CoefficientField>,
    {
        match (self.build_column(col), other.build_column(col)) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }

    fn is_zero_matrix(&self) -> Result<bool, BettiError> {
        for col in 0..self.n_cols() {
            if !self.build_column(col)?.is_zero() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

// ======== Abstract matrix oracle trait + copyable ============

pub trait MatrixRef: MatrixOracle + Copy {}

impl<M> MatrixRef for M where M: MatrixOracle + Copy {}

impl<'a, M> MatrixOracle for &'a M
where
    M: MatrixOracle,
{
    type CoefficientField = M::CoefficientField;

    fn n_rows(&self) -> usize {
        (*self).n_rows()
    }

    fn n_cols(&self) -> usize {
        (*self).n_cols()
    }

    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError> {
        (*self).column(col)
    }
}
