//! Persistent homology of a filtered simplicial complex.
//!
//! Each cell carries a filtration value no smaller than the values of its faces.
//! Within a dimension cells enter in order of (value, insertion index) and each boundary
//! matrix is reduced in that order, so that pivots pair births with deaths.

use itertools::Itertools;
use log::debug;
use ordered_float::NotNan;

use crate::{
    fields::Field,
    matrices::{adaptors::permute, ColumnMatrix},
    reduction::{standard_algo, Diagram},
    simplicial::{normalize, signed_faces, CellInd, SimplicialComplex},
    BettiError,
};

#[derive(Debug, Clone, Default)]
pub struct FilteredComplex {
    complex: SimplicialComplex,
    // values[dim][ind] is the filtration value of CellInd { dim, ind }
    values: Vec<Vec<NotNan<f64>>>,
}

impl FilteredComplex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simplex entering at `value`. Every face must already be present with a value
    /// no larger than `value`; nothing is changed if the simplex is rejected.
    pub fn add(&mut self, vertices: &[usize], value: f64) -> Result<CellInd, BettiError> {
        let value = NotNan::new(value).map_err(|_| BettiError::InvalidFiltrationValue)?;
        let simplex = normalize(vertices)?;
        if simplex.len() > 1 {
            for (_, face) in signed_faces(&simplex) {
                let ind = self
                    .complex
                    .find_idx(&face)
                    .ok_or_else(|| BettiError::MissingFace(face.clone()))?;
                if self.values[face.len() - 1][ind] > value {
                    return Err(BettiError::FiltrationOrder {
                        face,
                        cell: simplex.clone(),
                    });
                }
            }
        }
        let cell = self.complex.add(&simplex)?;
        if cell.dim == self.values.len() {
            self.values.push(vec![]);
        }
        self.values[cell.dim].push(value);
        Ok(cell)
    }

    pub fn complex(&self) -> &SimplicialComplex {
        &self.complex
    }

    pub fn value(&self, cell: CellInd) -> Result<NotNan<f64>, BettiError> {
        self.complex.cell(cell)?;
        Ok(self.values[cell.dim][cell.ind])
    }

    /// Position of every cell of each dimension in filtration order.
    fn filtration_orders(&self) -> Vec<Vec<usize>> {
        self.values
            .iter()
            .map(|values| (0..values.len()).sorted_by_key(|&i| (values[i], i)).collect())
            .collect()
    }

    /// Compute the barcode over `F`.
    pub fn persistence<F: Field>(&self) -> Result<Persistence, BettiError> {
        let Some(maxdim) = self.complex.maxdim() else {
            return Ok(Persistence::default());
        };
        let orders = self.filtration_orders();

        let reductions = (0..=maxdim)
            .map(|dim| {
                let boundary = self.complex.boundary_csc(dim)?.to_column_matrix::<F>();
                let row_order: &[usize] = match dim.checked_sub(1) {
                    Some(lower) => &orders[lower],
                    None => &[],
                };
                let filtered =
                    ColumnMatrix::from_oracle(&permute(&boundary, row_order, &orders[dim])?)?;
                standard_algo(&filtered)
            })
            .collect::<Result<Vec<_>, BettiError>>()?;

        let mut pairs = vec![];
        for dim in 0..=maxdim {
            let next = reductions.get(dim + 1);
            for j in (0..orders[dim].len()).filter(|&j| reductions[dim].is_cycle_col(j)) {
                let birth_cell = CellInd::new(dim, orders[dim][j]);
                let death_cell = next
                    .and_then(|next| next.pivot_col(j))
                    .map(|col| CellInd::new(dim + 1, orders[dim + 1][col]));
                pairs.push(PersistencePair {
                    dim,
                    birth: self.values[dim][birth_cell.ind],
                    death: death_cell.map(|cell| self.values[cell.dim][cell.ind]),
                    birth_cell,
                    death_cell,
                });
            }
            debug!(
                "Dimension {dim}: {} essential classes",
                pairs
                    .iter()
                    .filter(|pair: &&PersistencePair| pair.dim == dim && pair.is_essential())
                    .count()
            );
        }
        Ok(Persistence {
            n_dims: maxdim + 1,
            pairs,
        })
    }
}

/// A bar of the barcode: a class born when `birth_cell` enters and killed when
/// `death_cell` enters, or never for an essential class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistencePair {
    pub dim: usize,
    pub birth: NotNan<f64>,
    pub death: Option<NotNan<f64>>,
    pub birth_cell: CellInd,
    pub death_cell: Option<CellInd>,
}

impl PersistencePair {
    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }
}

/// Every bar of a filtered complex, by dimension and then by birth order.
/// Bars of length zero are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Persistence {
    n_dims: usize,
    pairs: Vec<PersistencePair>,
}

impl Persistence {
    pub fn pairs(&self) -> &[PersistencePair] {
        &self.pairs
    }

    /// `(birth, death)` of every bar in dimension `dim`.
    pub fn barcode(&self, dim: usize) -> Vec<(NotNan<f64>, Option<NotNan<f64>>)> {
        self.pairs
            .iter()
            .filter(|pair| pair.dim == dim)
            .map(|pair| (pair.birth, pair.death))
            .collect()
    }

    pub fn diagram(&self, dim: usize) -> Diagram<CellInd> {
        let mut diagram = Diagram {
            essential: Default::default(),
            pairings: Default::default(),
        };
        for pair in self.pairs.iter().filter(|pair| pair.dim == dim) {
            match pair.death_cell {
                Some(death_cell) => {
                    diagram.pairings.insert((pair.birth_cell, death_cell));
                }
                None => {
                    diagram.essential.insert(pair.birth_cell);
                }
            }
        }
        diagram
    }

    /// Betti numbers of the whole complex, i.e. the number of essential bars per dimension.
    pub fn betti_numbers(&self) -> Vec<usize> {
        let mut betti = vec![0; self.n_dims];
        for pair in self.pairs.iter().filter(|pair| pair.is_essential()) {
            betti[pair.dim] += 1;
        }
        betti
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;

    use super::FilteredComplex;
    use crate::fields::{F2, F3};
    use crate::simplicial::CellInd;
    use crate::BettiError;

    fn nn(value: f64) -> NotNan<f64> {
        NotNan::new(value).unwrap()
    }

    fn filtered_triangle() -> FilteredComplex {
        let mut filtered = FilteredComplex::new();
        for v in 0..3 {
            filtered.add(&[v], 0.0).unwrap();
        }
        filtered.add(&[0, 1], 1.0).unwrap();
        filtered.add(&[1, 2], 1.0).unwrap();
        filtered.add(&[0, 2], 2.0).unwrap();
        filtered.add(&[0, 1, 2], 3.0).unwrap();
        filtered
    }

    #[test]
    fn test_triangle_barcode() {
        let filtered = filtered_triangle();
        let persistence = filtered.persistence::<F2>().unwrap();
        assert_eq!(
            persistence.barcode(0),
            vec![(nn(0.0), None), (nn(0.0), Some(nn(1.0))), (nn(0.0), Some(nn(1.0)))]
        );
        assert_eq!(persistence.barcode(1), vec![(nn(2.0), Some(nn(3.0)))]);
        assert!(persistence.barcode(2).is_empty());
        assert_eq!(persistence.betti_numbers(), vec![1, 0, 0]);
        // Same bars over F3
        let over_f3 = filtered.persistence::<F3>().unwrap();
        assert_eq!(over_f3.barcode(1), persistence.barcode(1));
    }

    #[test]
    fn test_diagram_cells() {
        let filtered = filtered_triangle();
        let persistence = filtered.persistence::<F2>().unwrap();
        let diagram = persistence.diagram(1);
        assert!(diagram.essential.is_empty());
        let edge_02 = filtered.complex().find_idx(&[0, 2]).unwrap();
        assert!(diagram
            .pairings
            .contains(&(CellInd::new(1, edge_02), CellInd::new(2, 0))));
        let diagram = persistence.diagram(0);
        assert!(diagram.essential.contains(&CellInd::new(0, 0)));
        assert_eq!(diagram.pairings.len(), 2);
    }

    #[test]
    fn test_filtration_order_breaks_insertion_order() {
        // The loop closes before the edge inserted first enters
        let mut filtered = FilteredComplex::new();
        for v in 0..3 {
            filtered.add(&[v], 0.0).unwrap();
        }
        filtered.add(&[0, 2], 5.0).unwrap();
        filtered.add(&[0, 1], 1.0).unwrap();
        filtered.add(&[1, 2], 2.0).unwrap();
        let persistence = filtered.persistence::<F2>().unwrap();
        assert_eq!(persistence.barcode(1), vec![(nn(5.0), None)]);
        let loop_pair = persistence.pairs().iter().find(|p| p.dim == 1).unwrap();
        assert_eq!(loop_pair.birth_cell, CellInd::new(1, 0));
        assert!(loop_pair.is_essential());
    }

    #[test]
    fn test_zero_length_bars_are_kept() {
        let mut filtered = FilteredComplex::new();
        filtered.add(&[0], 0.5).unwrap();
        filtered.add(&[1], 0.5).unwrap();
        filtered.add(&[0, 1], 0.5).unwrap();
        let persistence = filtered.persistence::<F2>().unwrap();
        assert_eq!(
            persistence.barcode(0),
            vec![(nn(0.5), None), (nn(0.5), Some(nn(0.5)))]
        );
    }

    #[test]
    fn test_add_errors_leave_complex_unchanged() {
        let mut filtered = FilteredComplex::new();
        filtered.add(&[0], 1.0).unwrap();
        filtered.add(&[1], 3.0).unwrap();
        assert_eq!(
            filtered.add(&[2], f64::NAN),
            Err(BettiError::InvalidFiltrationValue)
        );
        assert_eq!(
            filtered.add(&[1, 0], 2.0),
            Err(BettiError::FiltrationOrder {
                face: vec![1],
                cell: vec![0, 1]
            })
        );
        assert_eq!(
            filtered.add(&[0, 2], 4.0),
            Err(BettiError::MissingFace(vec![2]))
        );
        assert_eq!(filtered.complex().ncells_total(), 2);

        let edge = filtered.add(&[1, 0], 3.0).unwrap();
        assert_eq!(filtered.value(edge).unwrap(), nn(3.0));
        assert!(filtered.value(CellInd::new(1, 1)).is_err());
    }

    #[test]
    fn test_empty() {
        let persistence = FilteredComplex::new().persistence::<F2>().unwrap();
        assert!(persistence.pairs().is_empty());
        assert!(persistence.betti_numbers().is_empty());
    }
}
