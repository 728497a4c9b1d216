//! Chain complexes over a field: one boundary matrix per dimension.

use std::ops::Index;

use log::debug;

use crate::{
    columns::SparseVector,
    fields::Coefficient,
    matrices::{combinators::product, ColumnMatrix, MatrixOracle},
    simplicial::SimplicialComplex,
    BettiError,
};

/// The boundary maps `∂_d : C_d → C_{d-1}` for `d = 0..=maxdim`.
///
/// `∂_0` is stored as the `0 x dim(C_0)` matrix so that `self[d].n_cols()` is always `dim(C_d)`.
/// The matrices are owned copies, so later edits to the source complex do not affect this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainComplex<F> {
    boundaries: Vec<ColumnMatrix<F>>,
}

impl<F: Coefficient> Default for ChainComplex<F> {
    fn default() -> Self {
        Self { boundaries: vec![] }
    }
}

impl<F: Coefficient> ChainComplex<F> {
    /// Reduce the integer boundaries of `complex` into `F`.
    pub fn new(complex: &SimplicialComplex) -> Result<Self, BettiError> {
        let boundaries = match complex.maxdim() {
            None => vec![],
            Some(maxdim) => (0..=maxdim)
                .map(|dim| Ok(complex.boundary_csc(dim)?.to_column_matrix::<F>()))
                .collect::<Result<Vec<_>, BettiError>>()?,
        };
        debug!(
            "Built chain complex with dimensions {:?}",
            boundaries.iter().map(|b| b.n_cols()).collect::<Vec<_>>()
        );
        Ok(Self { boundaries })
    }

    /// Build directly from boundary maps, `boundaries[d]` being `∂_d`.
    /// `∂_0` must have no rows and consecutive shapes must compose.
    pub fn from_boundaries(boundaries: Vec<ColumnMatrix<F>>) -> Result<Self, BettiError> {
        if let Some(first) = boundaries.first() {
            if first.n_rows() != 0 {
                return Err(BettiError::DimensionMismatch {
                    expected: 0,
                    found: first.n_rows(),
                });
            }
        }
        for (lower, upper) in boundaries.iter().zip(boundaries.iter().skip(1)) {
            if upper.n_rows() != lower.n_cols() {
                return Err(BettiError::DimensionMismatch {
                    expected: lower.n_cols(),
                    found: upper.n_rows(),
                });
            }
        }
        Ok(Self { boundaries })
    }

    pub fn maxdim(&self) -> Option<usize> {
        self.boundaries.len().checked_sub(1)
    }

    /// Dimension of the chain space `C_dim`.
    pub fn dim(&self, dim: usize) -> usize {
        self.boundaries.get(dim).map_or(0, |b| b.n_cols())
    }

    pub fn boundary(&self, dim: usize) -> Result<&ColumnMatrix<F>, BettiError> {
        self.boundaries
            .get(dim)
            .ok_or_else(|| BettiError::out_of_range("dimension", dim, self.boundaries.len()))
    }

    pub fn boundaries(&self) -> &[ColumnMatrix<F>] {
        &self.boundaries
    }

    /// Checks `∂_{d-1} ∘ ∂_d = 0` in every dimension.
    pub fn is_closed(&self) -> Result<bool, BettiError> {
        for (lower, upper) in self.boundaries.iter().zip(self.boundaries.iter().skip(1)) {
            if !product(lower, upper)?.is_zero_matrix()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_cycle(&self, chain: &SparseVector<F>, dim: usize) -> Result<bool, BettiError> {
        Ok(self.boundary(dim)?.apply(chain)?.is_zero())
    }
}

impl<F> Index<usize> for ChainComplex<F> {
    type Output = ColumnMatrix<F>;

    fn index(&self, dim: usize) -> &Self::Output {
        &self.boundaries[dim]
    }
}
