//! R=DV reduction of boundary matrices and the homology read off from it.
//!
//! [`standard_algo`] reduces a single matrix; [`ReducedChainComplex`] reduces every
//! boundary map of a [`ChainComplex`](crate::chain::ChainComplex) and tracks a preferred
//! representative for each homology class.

pub mod complex;
pub mod standard;

pub use complex::*;
pub use standard::*;

use rustc_hash::FxHashSet;

/// A persistence diagram, as obtained from a reduction.
#[derive(Debug, Clone)]
pub struct Diagram<T> {
    /// The unpaired or essential columns (infinite bars).
    pub essential: FxHashSet<T>,
    /// The paired columns (finite bars), stored as (birth, death) pairs.
    pub pairings: FxHashSet<(T, T)>,
}

/// Options for [`ReducedChainComplex::with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReductionOptions {
    /// Highest dimension in which homology is computed, `None` for all of them.
    pub max_dim: Option<usize>,
}

impl ReductionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_dim(mut self, max_dim: usize) -> Self {
        self.max_dim = Some(max_dim);
        self
    }
}
