//! Simplicial homology over small prime fields.
//!
//! The pipeline is
//! [`SimplicialComplex`](simplicial::SimplicialComplex) →
//! [`ChainComplex`](chain::ChainComplex) →
//! [`ReducedChainComplex`](reduction::ReducedChainComplex),
//! after which Betti numbers and preferred cycle representatives can be queried per dimension.
//!
//! ```
//! use betti::{chain::ChainComplex, fields::F2, reduction::ReducedChainComplex, simplicial::SimplicialComplex};
//!
//! let mut complex = SimplicialComplex::new();
//! for simplex in [vec![0], vec![1], vec![2], vec![0, 1], vec![0, 2], vec![1, 2]] {
//!     complex.add(&simplex).unwrap();
//! }
//! let chain = ChainComplex::<F2>::new(&complex).unwrap();
//! let reduced = ReducedChainComplex::new(&chain).unwrap();
//! assert_eq!(reduced.hdim(0).unwrap(), 1);
//! assert_eq!(reduced.hdim(1).unwrap(), 1);
//! ```

use thiserror::Error;

pub mod cellular;
pub mod chain;
pub mod columns;
pub mod fields;
pub mod filtration;
pub mod matrices;
pub mod reduction;
pub mod simplicial;

/// Coarse classification of [`BettiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Arithmetic,
    Construction,
    Topology,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BettiError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("indices must be strictly increasing (violated at position {position})")]
    UnsortedIndices { position: usize },
    #[error("malformed CSC matrix: {0}")]
    MalformedCsc(String),
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("index {index} repeated in permutation")]
    InvalidPermutation { index: usize },
    #[error("filtration values must not be NaN")]
    InvalidFiltrationValue,

    #[error("a cell must contain at least one vertex")]
    EmptyCell,
    #[error("cell {0:?} contains a repeated vertex")]
    DuplicateVertex(Vec<usize>),
    #[error("cell {0:?} is already present")]
    DuplicateCell(Vec<usize>),
    #[error("face {0:?} is missing")]
    MissingFace(Vec<usize>),
    #[error("face {face:?} appears after cell {cell:?} in the filtration")]
    FiltrationOrder { face: Vec<usize>, cell: Vec<usize> },
    #[error("chain in dimension {dim} is not a cycle")]
    NotACycle { dim: usize },

    #[error("{what} {index} out of range (bound {bound})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },
}

impl BettiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BettiError::DivisionByZero => ErrorKind::Arithmetic,
            BettiError::UnsortedIndices { .. }
            | BettiError::MalformedCsc(_)
            | BettiError::DimensionMismatch { .. }
            | BettiError::InvalidPermutation { .. }
            | BettiError::InvalidFiltrationValue => ErrorKind::Construction,
            BettiError::EmptyCell
            | BettiError::DuplicateVertex(_)
            | BettiError::DuplicateCell(_)
            | BettiError::MissingFace(_)
            | BettiError::FiltrationOrder { .. }
            | BettiError::NotACycle { .. } => ErrorKind::Topology,
            BettiError::OutOfRange { .. } => ErrorKind::Range,
        }
    }

    pub(crate) fn out_of_range(what: &'static str, index: usize, bound: usize) -> Self {
        BettiError::OutOfRange { what, index, bound }
    }
}
