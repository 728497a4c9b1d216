//! Simplicial complexes, stored as one table of simplices per dimension.
//!
//! A simplex is a strictly increasing list of vertex labels.
//! Cells are referred to by [`CellInd`], i.e. `(dimension, position within dimension)`.
//! These indices are arena indices: cells are never removed, so they remain valid as the complex grows.

use std::fmt::Display;

use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use crate::{matrices::CscMatrix, BettiError};

/// Reference to a cell of a [`SimplicialComplex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellInd {
    pub dim: usize,
    pub ind: usize,
}

impl CellInd {
    pub fn new(dim: usize, ind: usize) -> Self {
        Self { dim, ind }
    }
}

#[derive(Debug, Clone, Default)]
struct CellTable {
    simplices: Vec<Vec<usize>>,
    lookup: FxHashMap<Vec<usize>, usize>,
}

impl CellTable {
    fn insert(&mut self, simplex: Vec<usize>) -> usize {
        let ind = self.simplices.len();
        self.lookup.insert(simplex.clone(), ind);
        self.simplices.push(simplex);
        ind
    }
}

/// Codimension-1 faces of `simplex`, with the sign `(-1)^k` of deleting the vertex at position `k`.
pub(crate) fn signed_faces(simplex: &[usize]) -> impl Iterator<Item = (i64, Vec<usize>)> + '_ {
    (0..simplex.len()).map(move |k| {
        let sign = if k % 2 == 0 { 1 } else { -1 };
        let face = simplex
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != k)
            .map(|(_, v)| *v)
            .collect();
        (sign, face)
    })
}

/// Sort `vertices` and reject empty or repeated vertex lists.
pub(crate) fn normalize(vertices: &[usize]) -> Result<Vec<usize>, BettiError> {
    if vertices.is_empty() {
        return Err(BettiError::EmptyCell);
    }
    let mut simplex = vertices.to_vec();
    simplex.sort_unstable();
    if simplex.iter().tuple_windows().any(|(a, b)| a == b) {
        return Err(BettiError::DuplicateVertex(simplex));
    }
    Ok(simplex)
}

#[derive(Debug, Clone, Default)]
pub struct SimplicialComplex {
    cells: Vec<CellTable>,
}

impl SimplicialComplex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest dimension containing a cell, `None` if the complex is empty.
    pub fn maxdim(&self) -> Option<usize> {
        self.cells.len().checked_sub(1)
    }

    /// Total number of cells.
    pub fn ncells_total(&self) -> usize {
        self.cells.iter().map(|table| table.simplices.len()).sum()
    }

    /// Number of cells in dimension `dim`, zero above [`maxdim`](Self::maxdim).
    pub fn ncells(&self, dim: usize) -> usize {
        self.cells
            .get(dim)
            .map_or(0, |table| table.simplices.len())
    }

    /// Position of the simplex with exactly these (sorted) vertices within its dimension.
    pub fn find_idx(&self, vertices: &[usize]) -> Option<usize> {
        let dim = vertices.len().checked_sub(1)?;
        self.cells.get(dim)?.lookup.get(vertices).copied()
    }

    pub fn cell(&self, cell: CellInd) -> Result<&[usize], BettiError> {
        self.simplex(cell.dim, cell.ind)
    }

    pub fn simplex(&self, dim: usize, ind: usize) -> Result<&[usize], BettiError> {
        let table = self
            .cells
            .get(dim)
            .ok_or_else(|| BettiError::out_of_range("dimension", dim, self.cells.len()))?;
        table
            .simplices
            .get(ind)
            .map(Vec::as_slice)
            .ok_or_else(|| BettiError::out_of_range("cell", ind, table.simplices.len()))
    }

    /// Simplices of dimension `dim`, in insertion order.
    pub fn cells(&self, dim: usize) -> impl Iterator<Item = &[usize]> + '_ {
        self.cells
            .get(dim)
            .into_iter()
            .flat_map(|table| table.simplices.iter().map(Vec::as_slice))
    }

    /// Add a simplex; its faces must already be present.
    /// The vertices are sorted first, so the orientation is always the increasing order.
    pub fn add(&mut self, vertices: &[usize]) -> Result<CellInd, BettiError> {
        let simplex = normalize(vertices)?;
        if self.find_idx(&simplex).is_some() {
            return Err(BettiError::DuplicateCell(simplex));
        }
        if let Some((_, face)) =
            signed_faces(&simplex).find(|(_, face)| !face.is_empty() && self.find_idx(face).is_none())
        {
            return Err(BettiError::MissingFace(face));
        }
        Ok(self.insert(simplex))
    }

    /// Add a simplex together with any of its faces that are missing.
    /// Returns the existing index if the simplex is already present.
    pub fn add_recursive(&mut self, vertices: &[usize]) -> Result<CellInd, BettiError> {
        let simplex = normalize(vertices)?;
        Ok(self.add_recursive_sorted(simplex))
    }

    fn add_recursive_sorted(&mut self, simplex: Vec<usize>) -> CellInd {
        let dim = simplex.len() - 1;
        if let Some(ind) = self.find_idx(&simplex) {
            return CellInd::new(dim, ind);
        }
        if dim > 0 {
            let faces: Vec<Vec<usize>> = signed_faces(&simplex).map(|(_, face)| face).collect();
            for face in faces {
                self.add_recursive_sorted(face);
            }
        }
        self.insert(simplex)
    }

    fn insert(&mut self, simplex: Vec<usize>) -> CellInd {
        let dim = simplex.len() - 1;
        if self.cells.len() <= dim {
            self.cells.resize_with(dim + 1, CellTable::default);
        }
        let ind = self.cells[dim].insert(simplex);
        CellInd::new(dim, ind)
    }

    /// The integer boundary map from dimension `dim` to `dim - 1`.
    /// Rows are indexed by cells of dimension `dim - 1`, columns by cells of dimension `dim`.
    /// Deleting the vertex at position `k` contributes `(-1)^k`.
    ///
    /// In dimension 0 this is the `0 x ncells(0)` matrix.
    pub fn boundary_csc(&self, dim: usize) -> Result<CscMatrix<i64>, BettiError> {
        let n_dims = self.cells.len();
        if dim >= n_dims {
            return Err(BettiError::out_of_range("dimension", dim, n_dims));
        }
        let n_cols = self.ncells(dim);
        if dim == 0 {
            return Ok(CscMatrix::from_parts_unchecked(
                0,
                n_cols,
                vec![0; n_cols + 1],
                vec![],
                vec![],
            ));
        }
        let faces = &self.cells[dim - 1];
        let mut colptr = Vec::with_capacity(n_cols + 1);
        let mut rowind = Vec::with_capacity(n_cols * (dim + 1));
        let mut values = Vec::with_capacity(n_cols * (dim + 1));
        colptr.push(0);
        for simplex in self.cells[dim].simplices.iter() {
            let mut column = Vec::with_capacity(dim + 1);
            for (sign, face) in signed_faces(simplex) {
                let row = faces
                    .lookup
                    .get(&face)
                    .copied()
                    .ok_or(BettiError::MissingFace(face))?;
                column.push((row, sign));
            }
            column.sort_unstable();
            for (row, sign) in column {
                rowind.push(row);
                values.push(sign);
            }
            colptr.push(rowind.len());
        }
        debug!(
            "Built boundary in dimension {dim}: {} x {n_cols}, {} non-zeros",
            faces.simplices.len(),
            values.len()
        );
        Ok(CscMatrix::from_parts_unchecked(
            faces.simplices.len(),
            n_cols,
            colptr,
            rowind,
            values,
        ))
    }

    /// One line per dimension with the number of cells.
    pub fn summary(&self) -> String {
        let mut output = format!("SimplicialComplex with {} cells", self.ncells_total());
        for (dim, table) in self.cells.iter().enumerate() {
            output.push_str(&format!("\n  dim {dim}: {}", table.simplices.len()));
        }
        output
    }
}

impl Display for SimplicialComplex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for (dim, table) in self.cells.iter().enumerate() {
            for (ind, simplex) in table.simplices.iter().enumerate() {
                writeln!(f, "  ({dim}, {ind}): {simplex:?}")?;
            }
        }
        Ok(())
    }
}
