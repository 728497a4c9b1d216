//! Homology of a chain complex, computed by reducing every boundary map.
//!
//! In dimension `d` the cycles are the columns of `R_d` that reduced to zero (their
//! reduction columns `V_d[j]` span the kernel of `∂_d`). A cycle column `j` whose index is the
//! pivot row of some column of `R_{d+1}` is killed by a boundary. The remaining cycle columns,
//! in increasing order, index the homology generators in dimension `d`.

use log::debug;
use rustc_hash::FxHashSet;

use crate::{
    chain::ChainComplex,
    columns::SparseVector,
    fields::Field,
    matrices::{ColumnMatrix, MatrixOracle},
    BettiError,
};

use super::{standard_algo, Diagram, ReductionOptions, StandardReduction};

#[derive(Debug, Clone)]
struct HomologyBasis<F> {
    /// Cycle columns of `R_d` not killed by `R_{d+1}`, ascending
    indices: Vec<usize>,
    /// Preferred representative of each generator, in the order of `indices`
    representatives: Vec<SparseVector<F>>,
}

/// A reduced chain complex. Immutable once built; reduce again after changing the complex.
#[derive(Debug, Clone)]
pub struct ReducedChainComplex<F> {
    // One more than the homology dimensions when the complex continues above the cutoff
    reductions: Vec<StandardReduction<F>>,
    homology: Vec<HomologyBasis<F>>,
}

impl<F: Field> ReducedChainComplex<F> {
    pub fn new(chain: &ChainComplex<F>) -> Result<Self, BettiError> {
        Self::with_options(chain, ReductionOptions::default())
    }

    pub fn with_options(
        chain: &ChainComplex<F>,
        options: ReductionOptions,
    ) -> Result<Self, BettiError> {
        let Some(chain_maxdim) = chain.maxdim() else {
            return Ok(Self {
                reductions: vec![],
                homology: vec![],
            });
        };
        let top = options
            .max_dim
            .map_or(chain_maxdim, |max_dim| max_dim.min(chain_maxdim));
        // Homology in dimension top also needs the image of the next boundary
        let last_reduced = (top + 1).min(chain_maxdim);

        // Dimensions are reduced independently, in increasing order
        let reductions = chain.boundaries()[..=last_reduced]
            .iter()
            .map(standard_algo)
            .collect::<Result<Vec<_>, BettiError>>()?;

        let mut homology = Vec::with_capacity(top + 1);
        for dim in 0..=top {
            let current = &reductions[dim];
            let next = reductions.get(dim + 1);
            let indices: Vec<usize> = (0..current.reduced().n_cols())
                .filter(|&j| current.is_cycle_col(j))
                .filter(|&j| next.map_or(true, |next| next.pivot_col(j).is_none()))
                .collect();
            let representatives = indices
                .iter()
                .map(|&j| {
                    let cycle = &current.reduction_matrix().columns()[j];
                    match next {
                        Some(next) => next.reduce_chain(cycle),
                        None => Ok(cycle.clone()),
                    }
                })
                .collect::<Result<Vec<_>, BettiError>>()?;
            debug!(
                "Reduced dimension {dim}: {} pivots, {} cycles, homology rank {}",
                current.n_pivots(),
                current.reduced().n_cols() - current.n_pivots(),
                indices.len()
            );
            homology.push(HomologyBasis {
                indices,
                representatives,
            });
        }

        Ok(Self {
            reductions,
            homology,
        })
    }

    /// Highest dimension with computed homology, `None` for the empty complex.
    pub fn maxdim(&self) -> Option<usize> {
        self.homology.len().checked_sub(1)
    }

    fn basis(&self, dim: usize) -> Result<&HomologyBasis<F>, BettiError> {
        self.homology
            .get(dim)
            .ok_or_else(|| BettiError::out_of_range("dimension", dim, self.homology.len()))
    }

    fn reduction(&self, dim: usize) -> Result<&StandardReduction<F>, BettiError> {
        self.basis(dim)?;
        Ok(&self.reductions[dim])
    }

    /// Dimension of homology in dimension `dim` (the Betti number).
    pub fn hdim(&self, dim: usize) -> Result<usize, BettiError> {
        Ok(self.basis(dim)?.indices.len())
    }

    pub fn betti_numbers(&self) -> Vec<usize> {
        self.homology.iter().map(|basis| basis.indices.len()).collect()
    }

    /// The reduced boundary `R_dim`.
    pub fn reduced_boundary(&self, dim: usize) -> Result<&ColumnMatrix<F>, BettiError> {
        Ok(self.reduction(dim)?.reduced())
    }

    /// The basis change `V_dim` with `R_dim = ∂_dim V_dim`.
    pub fn basis_change(&self, dim: usize) -> Result<&ColumnMatrix<F>, BettiError> {
        Ok(self.reduction(dim)?.reduction_matrix())
    }

    /// Columns of `R_dim` with a pivot, ascending.
    pub fn pivot_columns(&self, dim: usize) -> Result<Vec<usize>, BettiError> {
        Ok(self
            .reduction(dim)?
            .pivots()
            .into_iter()
            .map(|(col, _)| col)
            .collect())
    }

    /// Columns of `R_dim` that reduced to zero, ascending.
    pub fn cycle_columns(&self, dim: usize) -> Result<Vec<usize>, BettiError> {
        let reduction = self.reduction(dim)?;
        Ok((0..reduction.reduced().n_cols())
            .filter(|&j| reduction.is_cycle_col(j))
            .collect())
    }

    /// The cycle columns indexing homology generators, ascending.
    pub fn homology_indices(&self, dim: usize) -> Result<&[usize], BettiError> {
        Ok(&self.basis(dim)?.indices)
    }

    /// Preferred representative of generator `index` in dimension `dim`.
    pub fn get_preferred_representative(
        &self,
        index: usize,
        dim: usize,
    ) -> Result<&SparseVector<F>, BettiError> {
        let basis = self.basis(dim)?;
        basis
            .representatives
            .get(index)
            .ok_or_else(|| BettiError::out_of_range("generator", index, basis.indices.len()))
    }

    /// Reduce `cycle` against the boundaries into `dim`, giving the preferred representative
    /// of its class. The result is meaningless if `cycle` is not a cycle.
    pub fn find_preferred_representative(
        &self,
        cycle: &SparseVector<F>,
        dim: usize,
    ) -> Result<SparseVector<F>, BettiError> {
        let n_cells = self.reduction(dim)?.reduced().n_cols();
        if let Some((index, _)) = cycle.lastnz().filter(|(index, _)| *index >= n_cells) {
            return Err(BettiError::out_of_range("cell", index, n_cells));
        }
        match self.reductions.get(dim + 1) {
            Some(next) => next.reduce_chain(cycle),
            None => Ok(cycle.clone()),
        }
    }

    /// Coordinates of the class of `cycle` with respect to the preferred representatives.
    /// Fails with [`BettiError::NotACycle`] if `cycle` is not a cycle.
    pub fn homology_coordinates(
        &self,
        cycle: &SparseVector<F>,
        dim: usize,
    ) -> Result<SparseVector<F>, BettiError> {
        let mut working = self.find_preferred_representative(cycle, dim)?;
        let basis = self.basis(dim)?;
        let mut coordinates = vec![];
        while let Some((low, coeff)) = working.lastnz() {
            // The lowest entry of a reduced cycle is always a generator index
            let position = basis
                .indices
                .binary_search(&low)
                .map_err(|_| BettiError::NotACycle { dim })?;
            let representative = &basis.representatives[position];
            let rep_coeff = representative.getval(low);
            let multiple = coeff.try_div(rep_coeff)?;
            working.axpy(-multiple, representative);
            coordinates.push((position, multiple));
        }
        Ok(SparseVector::from_unsorted(coordinates))
    }

    /// Essential classes in dimension `dim`, and the pairs `(dim cell, dim + 1 column)`
    /// where the column kills the cell.
    pub fn diagram(&self, dim: usize) -> Result<Diagram<usize>, BettiError> {
        let essential: FxHashSet<usize> = self.basis(dim)?.indices.iter().copied().collect();
        let pairings: FxHashSet<(usize, usize)> = self
            .reductions
            .get(dim + 1)
            .map(|next| next.pivots().into_iter().map(|(col, row)| (row, col)).collect())
            .unwrap_or_default();
        Ok(Diagram {
            essential,
            pairings,
        })
    }
}

#[cfg(test)]
mod tests {
    use num::One;

    use super::ReducedChainComplex;
    use crate::chain::ChainComplex;
    use crate::columns::SparseVector;
    use crate::fields::{F2, F3, F5};
    use crate::reduction::ReductionOptions;
    use crate::simplicial::SimplicialComplex;
    use crate::BettiError;

    fn complex_from(simplices: &[&[usize]]) -> SimplicialComplex {
        let mut complex = SimplicialComplex::new();
        for simplex in simplices {
            complex.add_recursive(simplex).unwrap();
        }
        complex
    }

    fn hollow_triangle() -> SimplicialComplex {
        complex_from(&[&[0, 1], &[0, 2], &[1, 2]])
    }

    #[test]
    fn test_filled_triangle() {
        let complex = complex_from(&[&[0, 1, 2]]);
        let chain = ChainComplex::<F2>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(reduced.maxdim(), Some(2));
        assert_eq!(reduced.hdim(0).unwrap(), 1);
        assert_eq!(reduced.hdim(1).unwrap(), 0);
        assert_eq!(reduced.hdim(2).unwrap(), 0);
    }

    #[test]
    fn test_hollow_triangle_f2() {
        let complex = hollow_triangle();
        let chain = ChainComplex::<F2>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(reduced.betti_numbers(), vec![1, 1]);
        let rep = reduced.get_preferred_representative(0, 1).unwrap();
        assert_eq!(rep.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(chain.is_cycle(rep, 1).unwrap());
        // Connected, so a single vertex generates H_0
        assert_eq!(
            reduced.get_preferred_representative(0, 0).unwrap(),
            &SparseVector::unit(0)
        );
    }

    #[test]
    fn test_hollow_triangle_f3_signs() {
        let complex = hollow_triangle();
        let chain = ChainComplex::<F3>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        let rep = reduced.get_preferred_representative(0, 1).unwrap();
        // [0,1] - [0,2] + [1,2]
        let edge = |v: &[usize]| complex.find_idx(v).unwrap();
        assert_eq!(rep.getval(edge(&[0, 1])), F3::one());
        assert_eq!(rep.getval(edge(&[0, 2])), -F3::one());
        assert_eq!(rep.getval(edge(&[1, 2])), F3::one());
        assert!(chain.is_cycle(rep, 1).unwrap());
    }

    #[test]
    fn test_ranks_match_formula() {
        // Two hollow triangles sharing a vertex, one of them filled in
        let complex = complex_from(&[&[0, 1], &[0, 2], &[1, 2], &[2, 3, 4], &[5]]);
        let chain = ChainComplex::<F5>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(reduced.betti_numbers(), vec![2, 1, 0]);
        for dim in 0..=2 {
            let cycles = reduced.cycle_columns(dim).unwrap().len();
            let boundaries = if dim < 2 {
                reduced.pivot_columns(dim + 1).unwrap().len()
            } else {
                0
            };
            assert_eq!(reduced.hdim(dim).unwrap(), cycles - boundaries);
        }
    }

    #[test]
    fn test_preferred_representative_is_canonical() {
        // Square with a diagonal, only one triangle filled:
        // both loops around the empty triangle are homologous
        let complex = complex_from(&[&[0, 1, 2], &[0, 2], &[0, 3], &[2, 3]]);
        let chain = ChainComplex::<F3>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(reduced.hdim(1).unwrap(), 1);

        let edge = |v: &[usize]| complex.find_idx(v).unwrap();
        let short_loop: SparseVector<F3> = vec![
            (edge(&[0, 2]), F3::one()),
            (edge(&[2, 3]), F3::one()),
            (edge(&[0, 3]), -F3::one()),
        ]
        .into_iter()
        .collect();
        let long_loop: SparseVector<F3> = vec![
            (edge(&[0, 1]), F3::one()),
            (edge(&[1, 2]), F3::one()),
            (edge(&[2, 3]), F3::one()),
            (edge(&[0, 3]), -F3::one()),
        ]
        .into_iter()
        .collect();
        assert!(chain.is_cycle(&short_loop, 1).unwrap());
        assert!(chain.is_cycle(&long_loop, 1).unwrap());

        let short_rep = reduced.find_preferred_representative(&short_loop, 1).unwrap();
        let long_rep = reduced.find_preferred_representative(&long_loop, 1).unwrap();
        assert_eq!(short_rep, long_rep);

        let preferred = reduced.get_preferred_representative(0, 1).unwrap();
        assert!(short_rep == *preferred || short_rep == -preferred);
        assert_eq!(
            reduced.find_preferred_representative(preferred, 1).unwrap(),
            *preferred
        );
    }

    #[test]
    fn test_homology_coordinates() {
        // Wedge of two circles
        let complex = complex_from(&[&[0, 1], &[1, 2], &[0, 2], &[0, 3], &[3, 4], &[0, 4]]);
        let chain = ChainComplex::<F5>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(reduced.hdim(1).unwrap(), 2);

        let first = reduced.get_preferred_representative(0, 1).unwrap();
        let second = reduced.get_preferred_representative(1, 1).unwrap();
        assert_eq!(
            reduced.homology_coordinates(first, 1).unwrap(),
            SparseVector::unit(0)
        );
        let combination = &first.scaled(F5::new(2)) + &second.scaled(F5::new(3));
        let coordinates = reduced.homology_coordinates(&combination, 1).unwrap();
        assert_eq!(coordinates.getval(0), F5::new(2));
        assert_eq!(coordinates.getval(1), F5::new(3));

        let not_a_cycle = SparseVector::unit(complex.find_idx(&[0, 1]).unwrap());
        assert_eq!(
            reduced.homology_coordinates(&not_a_cycle, 1),
            Err(BettiError::NotACycle { dim: 1 })
        );
    }

    #[test]
    fn test_boundaries_have_zero_coordinates() {
        let complex = complex_from(&[&[0, 1, 2], &[2, 3], &[1, 3]]);
        let chain = ChainComplex::<F3>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        let boundary = chain[2].get_col(0).unwrap();
        assert!(reduced
            .find_preferred_representative(boundary, 1)
            .unwrap()
            .is_zero());
        assert!(reduced
            .homology_coordinates(boundary, 1)
            .unwrap()
            .is_zero());
        // The edge [2,3] alone is not a cycle
        let edge = SparseVector::<F3>::unit(complex.find_idx(&[2, 3]).unwrap());
        assert!(reduced.homology_coordinates(&edge, 1).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let chain = ChainComplex::<F2>::new(&hollow_triangle()).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(
            reduced.hdim(2),
            Err(BettiError::out_of_range("dimension", 2, 2))
        );
        assert!(reduced.get_preferred_representative(1, 1).is_err());
        assert!(reduced
            .find_preferred_representative(&SparseVector::unit(3), 1)
            .is_err());
    }

    #[test]
    fn test_empty_complex() {
        let chain = ChainComplex::<F2>::new(&SimplicialComplex::new()).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(reduced.maxdim(), None);
        assert!(reduced.betti_numbers().is_empty());
        assert!(matches!(
            reduced.hdim(0),
            Err(BettiError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_max_dim_option() {
        // Hollow tetrahedron: H_2 = 1, but stop at dimension 1
        let complex = complex_from(&[&[0, 1, 2], &[0, 1, 3], &[0, 2, 3], &[1, 2, 3]]);
        let chain = ChainComplex::<F2>::new(&complex).unwrap();
        let full = ReducedChainComplex::new(&chain).unwrap();
        assert_eq!(full.betti_numbers(), vec![1, 0, 1]);
        let truncated =
            ReducedChainComplex::with_options(&chain, ReductionOptions::new().max_dim(1)).unwrap();
        assert_eq!(truncated.maxdim(), Some(1));
        assert_eq!(truncated.betti_numbers(), vec![1, 0]);
        assert!(truncated.hdim(2).is_err());
    }

    #[test]
    fn test_diagram() {
        let chain = ChainComplex::<F2>::new(&hollow_triangle()).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        let diagram = reduced.diagram(0).unwrap();
        assert_eq!(diagram.essential.len(), 1);
        assert!(diagram.essential.contains(&0));
        // The first two edges kill the second and third vertices
        assert!(diagram.pairings.contains(&(1, 0)));
        assert!(diagram.pairings.contains(&(2, 1)));
        let diagram = reduced.diagram(1).unwrap();
        assert!(diagram.pairings.is_empty());
        assert!(diagram.essential.contains(&2));
    }

    #[test]
    fn test_basis_change_reduces_boundary() {
        let complex = complex_from(&[&[0, 1, 2], &[1, 3], &[2, 3]]);
        let chain = ChainComplex::<F3>::new(&complex).unwrap();
        let reduced = ReducedChainComplex::new(&chain).unwrap();
        for dim in 0..=2 {
            let v = reduced.basis_change(dim).unwrap();
            let r = reduced.reduced_boundary(dim).unwrap();
            for (j, v_col) in v.columns().iter().enumerate() {
                assert_eq!(&chain[dim].apply(v_col).unwrap(), r.get_col(j).unwrap());
            }
        }
    }
}
