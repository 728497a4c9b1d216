//! Sparse representations of matrix columns, i.e. linear combinations of basis elements.
//!
//! A [`SparseVector`] stores `(index, value)` pairs with strictly increasing indices and non-zero values.
//! All arithmetic is a single merge pass over the two sorted entry lists, so it is linear in the number of non-zeros.
use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use itertools::{merge_join_by, EitherOrBoth, Itertools};

use crate::{fields::Coefficient, BettiError};

#[derive(Clone, PartialEq, Eq)]
pub struct SparseVector<T> {
    entries: Vec<(usize, T)>,
}

impl<T> Default for SparseVector<T> {
    fn default() -> Self {
        Self {
            entries: Vec::default(),
        }
    }
}

impl<T: Coefficient> SparseVector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The basis vector `e_index`.
    pub fn unit(index: usize) -> Self {
        Self {
            entries: vec![(index, T::one())],
        }
    }

    /// Build from parallel index and value sequences.
    /// Indices must be strictly increasing; zero values are dropped.
    pub fn from_parts(indices: &[usize], values: &[T]) -> Result<Self, BettiError> {
        if indices.len() != values.len() {
            return Err(BettiError::DimensionMismatch {
                expected: indices.len(),
                found: values.len(),
            });
        }
        Self::from_sorted_entries(indices.iter().copied().zip(values.iter().copied()).collect())
    }

    /// Build from `(index, value)` pairs with strictly increasing indices; zero values are dropped.
    pub fn from_sorted_entries(entries: Vec<(usize, T)>) -> Result<Self, BettiError> {
        if let Some(position) = entries
            .iter()
            .tuple_windows()
            .position(|((i, _), (j, _))| i >= j)
        {
            return Err(BettiError::UnsortedIndices {
                position: position + 1,
            });
        }
        Ok(Self {
            entries: entries.into_iter().filter(|(_, v)| !v.is_zero()).collect(),
        })
    }

    /// Build from terms in any order, summing the values of repeated indices.
    pub fn from_unsorted(terms: impl IntoIterator<Item = (usize, T)>) -> Self {
        let mut terms: Vec<(usize, T)> = terms.into_iter().collect();
        terms.sort_by_key(|(idx, _)| *idx);
        let entries = terms
            .into_iter()
            .coalesce(|(i, x), (j, y)| if i == j { Ok((i, x + y)) } else { Err(((i, x), (j, y))) })
            .filter(|(_, v)| !v.is_zero())
            .collect();
        Self { entries }
    }

    /// Value at `index`, or zero if not stored.
    pub fn getval(&self, index: usize) -> T {
        match self.entries.binary_search_by_key(&index, |(idx, _)| *idx) {
            Ok(pos) => self.entries[pos].1,
            Err(_) => T::zero(),
        }
    }

    pub fn set(&mut self, index: usize, value: T) {
        match self.entries.binary_search_by_key(&index, |(idx, _)| *idx) {
            Ok(pos) if value.is_zero() => {
                self.entries.remove(pos);
            }
            Ok(pos) => self.entries[pos].1 = value,
            Err(_) if value.is_zero() => {}
            Err(pos) => self.entries.insert(pos, (index, value)),
        }
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, T)> + ExactSizeIterator + '_ {
        self.entries.iter().copied()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(idx, _)| *idx)
    }

    /// The entry with the largest index, i.e. the pivot of a column.
    pub fn lastnz(&self) -> Option<(usize, T)> {
        self.entries.last().copied()
    }

    pub fn firstnz(&self) -> Option<(usize, T)> {
        self.entries.first().copied()
    }

    pub fn scale(&mut self, alpha: T) {
        for entry in self.entries.iter_mut() {
            entry.1 = entry.1 * alpha;
        }
        self.entries.retain(|(_, v)| !v.is_zero());
    }

    pub fn scaled(&self, alpha: T) -> Self {
        let mut output = self.clone();
        output.scale(alpha);
        output
    }

    /// `self += alpha * other`
    pub fn axpy(&mut self, alpha: T, other: &Self) {
        *self = self.merge_with(alpha, other);
    }

    fn merge_with(&self, alpha: T, other: &Self) -> Self {
        let entries = merge_join_by(self.entries.iter(), other.entries.iter(), |(i, _), (j, _)| {
            i.cmp(j)
        })
        .map(|either| match either {
            EitherOrBoth::Left(&(i, x)) => (i, x),
            EitherOrBoth::Right(&(j, y)) => (j, alpha * y),
            EitherOrBoth::Both(&(i, x), &(_, y)) => (i, x + alpha * y),
        })
        .filter(|(_, v)| !v.is_zero())
        .collect();
        Self { entries }
    }

    /// Change the coefficient ring, dropping entries that become zero.
    pub fn map_values<U: Coefficient>(&self, f: impl Fn(T) -> U) -> SparseVector<U> {
        SparseVector {
            entries: self
                .entries
                .iter()
                .map(|&(idx, v)| (idx, f(v)))
                .filter(|(_, v)| !v.is_zero())
                .collect(),
        }
    }
}

impl<T: Coefficient> FromIterator<(usize, T)> for SparseVector<T> {
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        Self::from_unsorted(iter)
    }
}

impl<'a, T: Coefficient> Add<&'a SparseVector<T>> for &'a SparseVector<T> {
    type Output = SparseVector<T>;

    fn add(self, rhs: &'a SparseVector<T>) -> Self::Output {
        self.merge_with(T::one(), rhs)
    }
}

impl<'a, T: Coefficient> Sub<&'a SparseVector<T>> for &'a SparseVector<T> {
    type Output = SparseVector<T>;

    fn sub(self, rhs: &'a SparseVector<T>) -> Self::Output {
        self.merge_with(-T::one(), rhs)
    }
}

impl<T: Coefficient> Add for SparseVector<T> {
    type Output = SparseVector<T>;

    fn add(self, rhs: SparseVector<T>) -> Self::Output {
        &self + &rhs
    }
}

impl<T: Coefficient> Sub for SparseVector<T> {
    type Output = SparseVector<T>;

    fn sub(self, rhs: SparseVector<T>) -> Self::Output {
        &self - &rhs
    }
}

impl<T: Coefficient> Neg for &SparseVector<T> {
    type Output = SparseVector<T>;

    fn neg(self) -> Self::Output {
        self.scaled(-T::one())
    }
}

impl<T: Coefficient> Neg for SparseVector<T> {
    type Output = SparseVector<T>;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<T: Debug> Debug for SparseVector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<T: Display> Display for SparseVector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .entries
            .iter()
            .map(|(idx, v)| format!("{idx}:{v}"))
            .join(" ");
        write!(f, "[{terms}]")
    }
}
