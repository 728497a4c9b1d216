//! Maps between the cells of two complexes, one integer matrix per dimension.
//!
//! Entry `(i, j)` of the matrix in dimension `d` is the coefficient of target cell `i`
//! in the image of source cell `j`. The shapes are fixed when the map is created
//! and every assignment is checked against them.

use itertools::Itertools;
use log::debug;

use crate::{
    columns::SparseVector,
    fields::Coefficient,
    matrices::{combinators::product, ColumnMatrix, MatrixOracle},
    simplicial::SimplicialComplex,
    BettiError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellularMap {
    maps: Vec<ColumnMatrix<i64>>,
}

impl CellularMap {
    /// The zero map from `source` to `target`, in every dimension of `source`.
    pub fn new(source: &SimplicialComplex, target: &SimplicialComplex) -> Self {
        let maps = match source.maxdim() {
            None => vec![],
            Some(maxdim) => (0..=maxdim)
                .map(|dim| ColumnMatrix::new(target.ncells(dim), source.ncells(dim)))
                .collect(),
        };
        Self { maps }
    }

    /// The chain map induced by sending vertex `v` of `source` to `vertex_map[v]` in `target`.
    ///
    /// A simplex goes to the simplex spanned by its image, with the sign of the permutation
    /// sorting the image, or to zero when two of its vertices are identified.
    pub fn simplicial(
        source: &SimplicialComplex,
        target: &SimplicialComplex,
        vertex_map: &[usize],
    ) -> Result<Self, BettiError> {
        let mut map = Self::new(source, target);
        for (dim, matrix) in map.maps.iter_mut().enumerate() {
            for (col, simplex) in source.cells(dim).enumerate() {
                let image = simplex
                    .iter()
                    .map(|&v| {
                        vertex_map
                            .get(v)
                            .copied()
                            .ok_or_else(|| BettiError::out_of_range("vertex", v, vertex_map.len()))
                    })
                    .collect::<Result<Vec<_>, BettiError>>()?;
                let Some((sign, sorted)) = orient(image) else {
                    // Degenerate image
                    continue;
                };
                let row = target
                    .find_idx(&sorted)
                    .ok_or_else(|| BettiError::MissingFace(sorted.clone()))?;
                matrix.set_col(col, SparseVector::from_unsorted([(row, sign)]))?;
            }
        }
        debug!(
            "Built simplicial map with {} non-zero entries",
            map.maps.iter().map(ColumnMatrix::nnz).sum::<usize>()
        );
        Ok(map)
    }

    /// Highest dimension of the source, `None` if the source is empty.
    pub fn maxdim(&self) -> Option<usize> {
        self.maps.len().checked_sub(1)
    }

    pub fn get(&self, dim: usize) -> Result<&ColumnMatrix<i64>, BettiError> {
        self.maps
            .get(dim)
            .ok_or_else(|| BettiError::out_of_range("dimension", dim, self.maps.len()))
    }

    /// Replace the map in dimension `dim`.
    /// The new matrix must have one row per target cell and one column per source cell.
    pub fn set(&mut self, dim: usize, matrix: ColumnMatrix<i64>) -> Result<(), BettiError> {
        let n_maps = self.maps.len();
        let slot = self
            .maps
            .get_mut(dim)
            .ok_or_else(|| BettiError::out_of_range("dimension", dim, n_maps))?;
        if matrix.n_rows() != slot.n_rows() {
            return Err(BettiError::DimensionMismatch {
                expected: slot.n_rows(),
                found: matrix.n_rows(),
            });
        }
        if matrix.n_cols() != slot.n_cols() {
            return Err(BettiError::DimensionMismatch {
                expected: slot.n_cols(),
                found: matrix.n_cols(),
            });
        }
        *slot = matrix;
        Ok(())
    }

    /// Push a `dim`-chain of the source forward to the target.
    pub fn apply(
        &self,
        dim: usize,
        chain: &SparseVector<i64>,
    ) -> Result<SparseVector<i64>, BettiError> {
        self.get(dim)?.apply(chain)
    }

    /// The same maps with coefficients reduced into `F`.
    pub fn to_field<F: Coefficient>(&self) -> Vec<ColumnMatrix<F>> {
        self.maps.iter().map(|map| map.map_values(F::from)).collect()
    }

    /// Checks that the map commutes with the boundaries of `source` and `target`.
    pub fn is_chain_map(
        &self,
        source: &SimplicialComplex,
        target: &SimplicialComplex,
    ) -> Result<bool, BettiError> {
        for (dim, map) in self.maps.iter().enumerate().skip(1) {
            let source_boundary = source.boundary_csc(dim)?.to_column_matrix::<i64>();
            let lower = &self.maps[dim - 1];
            let pushed_then_bounded = if dim <= target.maxdim().unwrap_or(0) {
                let target_boundary = target.boundary_csc(dim)?.to_column_matrix::<i64>();
                ColumnMatrix::from_oracle(&product(&target_boundary, map)?)?
            } else {
                // Nothing of this dimension in the target, so the map is zero here
                ColumnMatrix::new(lower.n_rows(), map.n_cols())
            };
            let bounded_then_pushed =
                ColumnMatrix::from_oracle(&product(lower, &source_boundary)?)?;
            if pushed_then_bounded != bounded_then_pushed {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Sort `image`, returning the sign of the sorting permutation, or `None` if a vertex repeats.
fn orient(mut image: Vec<usize>) -> Option<(i64, Vec<usize>)> {
    let inversions = image
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a > b)
        .count();
    image.sort_unstable();
    if image.iter().tuple_windows().any(|(a, b)| a == b) {
        return None;
    }
    let sign = if inversions % 2 == 0 { 1 } else { -1 };
    Some((sign, image))
}
