// ======== Default matrix oracles =============================

use std::fmt::{Debug, Display};

use itertools::Itertools;

use crate::{columns::SparseVector, fields::Coefficient, BettiError};

use super::MatrixOracle;

// ====== ColumnMatrix =========================

/// A matrix stored as a list of sparse columns, each of height `n_rows`.
#[derive(Clone, PartialEq, Eq)]
pub struct ColumnMatrix<T> {
    n_rows: usize,
    columns: Vec<SparseVector<T>>,
}

fn check_height<T: Coefficient>(n_rows: usize, column: &SparseVector<T>) -> Result<(), BettiError> {
    match column.lastnz() {
        Some((row, _)) if row >= n_rows => Err(BettiError::DimensionMismatch {
            expected: n_rows,
            found: row + 1,
        }),
        _ => Ok(()),
    }
}

impl<T: Coefficient> ColumnMatrix<T> {
    /// The `n_rows` by `n_cols` zero matrix.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            columns: vec![SparseVector::new(); n_cols],
        }
    }

    pub fn from_columns(n_rows: usize, columns: Vec<SparseVector<T>>) -> Result<Self, BettiError> {
        for column in columns.iter() {
            check_height(n_rows, column)?;
        }
        Ok(Self { n_rows, columns })
    }

    /// Caller guarantees every column fits in `n_rows`.
    pub(crate) fn from_columns_unchecked(n_rows: usize, columns: Vec<SparseVector<T>>) -> Self {
        debug_assert!(columns.iter().all(|c| check_height(n_rows, c).is_ok()));
        Self { n_rows, columns }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            columns: (0..n).map(SparseVector::unit).collect(),
        }
    }

    /// Materialise every column of `oracle`.
    pub fn from_oracle<M>(oracle: &M) -> Result<Self, BettiError>
    where
        M: MatrixOracle<CoefficientField = T>,
    {
        let columns = (0..oracle.n_cols())
            .map(|col| oracle.build_column(col))
            .collect::<Result<Vec<_>, BettiError>>()?;
        Self::from_columns(oracle.n_rows(), columns)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn get_col(&self, col: usize) -> Result<&SparseVector<T>, BettiError> {
        self.columns
            .get(col)
            .ok_or_else(|| BettiError::out_of_range("column", col, self.columns.len()))
    }

    /// Replace column `col`. The matrix is untouched if the new column does not fit.
    pub fn set_col(&mut self, col: usize, column: SparseVector<T>) -> Result<(), BettiError> {
        check_height(self.n_rows, &column)?;
        let n_cols = self.columns.len();
        let slot = self
            .columns
            .get_mut(col)
            .ok_or_else(|| BettiError::out_of_range("column", col, n_cols))?;
        *slot = column;
        Ok(())
    }

    pub fn push_col(&mut self, column: SparseVector<T>) -> Result<(), BettiError> {
        check_height(self.n_rows, &column)?;
        self.columns.push(column);
        Ok(())
    }

    pub fn getval(&self, row: usize, col: usize) -> Result<T, BettiError> {
        if row >= self.n_rows {
            return Err(BettiError::out_of_range("row", row, self.n_rows));
        }
        Ok(self.get_col(col)?.getval(row))
    }

    pub fn columns(&self) -> &[SparseVector<T>] {
        &self.columns
    }

    pub fn nnz(&self) -> usize {
        self.columns.iter().map(SparseVector::nnz).sum()
    }

    /// Matrix-vector product `self * x`.
    pub fn apply(&self, x: &SparseVector<T>) -> Result<SparseVector<T>, BettiError> {
        if let Some((col, _)) = x.lastnz().filter(|(col, _)| *col >= self.columns.len()) {
            return Err(BettiError::out_of_range("column", col, self.columns.len()));
        }
        Ok(x.iter()
            .flat_map(|(col, x_coeff)| {
                self.columns[col]
                    .iter()
                    .map(move |(row, coeff)| (row, coeff * x_coeff))
            })
            .collect())
    }

    /// Change the coefficient ring entrywise, dropping entries that become zero.
    pub fn map_values<U: Coefficient>(&self, f: impl Fn(T) -> U) -> ColumnMatrix<U> {
        ColumnMatrix {
            n_rows: self.n_rows,
            columns: self.columns.iter().map(|c| c.map_values(&f)).collect(),
        }
    }
}

impl<T: Coefficient> MatrixOracle for ColumnMatrix<T> {
    type CoefficientField = T;

    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn n_cols(&self) -> usize {
        self.columns.len()
    }

    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError> {
        Ok(self.get_col(col)?.iter().map(|(row, coeff)| (coeff, row)))
    }

    fn build_column(&self, col: usize) -> Result<SparseVector<T>, BettiError> {
        self.get_col(col).cloned()
    }
}

impl<T: Debug> Debug for ColumnMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnMatrix")
            .field("n_rows", &self.n_rows)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<T: Display> Display for ColumnMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} x {} ColumnMatrix", self.n_rows, self.columns.len())?;
        for (idx, column) in self.columns.iter().enumerate() {
            writeln!(f, "  {idx}: {column}")?;
        }
        Ok(())
    }
}

// ====== CscMatrix ============================

/// Compressed sparse column matrix.
///
/// Column `j` occupies `rowind[colptr[j]..colptr[j + 1]]` (row indices, strictly increasing)
/// and the matching range of `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscMatrix<T> {
    n_rows: usize,
    n_cols: usize,
    colptr: Vec<usize>,
    rowind: Vec<usize>,
    values: Vec<T>,
}

impl<T: Coefficient> CscMatrix<T> {
    pub fn from_parts(
        n_rows: usize,
        n_cols: usize,
        colptr: Vec<usize>,
        rowind: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, BettiError> {
        let n_ptrs = n_cols
            .checked_add(1)
            .ok_or_else(|| BettiError::MalformedCsc(format!("too many columns: {n_cols}")))?;
        if colptr.len() != n_ptrs {
            return Err(BettiError::MalformedCsc(format!(
                "expected {n_ptrs} column pointers, found {}",
                colptr.len()
            )));
        }
        if colptr[0] != 0 {
            return Err(BettiError::MalformedCsc(
                "first column pointer must be 0".to_string(),
            ));
        }
        if let Some(col) = colptr.iter().tuple_windows().position(|(a, b)| a > b) {
            return Err(BettiError::MalformedCsc(format!(
                "column pointers decrease at column {col}"
            )));
        }
        if rowind.len() != values.len() {
            return Err(BettiError::MalformedCsc(format!(
                "{} row indices but {} values",
                rowind.len(),
                values.len()
            )));
        }
        if colptr[n_cols] != rowind.len() {
            return Err(BettiError::MalformedCsc(format!(
                "last column pointer is {} but there are {} entries",
                colptr[n_cols],
                rowind.len()
            )));
        }
        if let Some(&row) = rowind.iter().find(|&&row| row >= n_rows) {
            return Err(BettiError::MalformedCsc(format!(
                "row index {row} exceeds height {n_rows}"
            )));
        }
        for (col, (&start, &end)) in colptr.iter().tuple_windows().enumerate() {
            if rowind[start..end].iter().tuple_windows().any(|(a, b)| a >= b) {
                return Err(BettiError::MalformedCsc(format!(
                    "row indices of column {col} are not strictly increasing"
                )));
            }
        }
        Ok(Self {
            n_rows,
            n_cols,
            colptr,
            rowind,
            values,
        })
    }

    /// Caller guarantees the CSC invariants.
    pub(crate) fn from_parts_unchecked(
        n_rows: usize,
        n_cols: usize,
        colptr: Vec<usize>,
        rowind: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        Self {
            n_rows,
            n_cols,
            colptr,
            rowind,
            values,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn colptr(&self) -> &[usize] {
        &self.colptr
    }

    pub fn rowind(&self) -> &[usize] {
        &self.rowind
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    fn col_range(&self, col: usize) -> Result<std::ops::Range<usize>, BettiError> {
        if col >= self.n_cols {
            return Err(BettiError::out_of_range("column", col, self.n_cols));
        }
        Ok(self.colptr[col]..self.colptr[col + 1])
    }

    /// Entry `(row, col)`, found by binary search within the column; absent entries are zero.
    pub fn getval(&self, row: usize, col: usize) -> Result<T, BettiError> {
        if row >= self.n_rows {
            return Err(BettiError::out_of_range("row", row, self.n_rows));
        }
        let range = self.col_range(col)?;
        Ok(match self.rowind[range.clone()].binary_search(&row) {
            Ok(offset) => self.values[range.start + offset],
            Err(_) => T::zero(),
        })
    }

    /// Convert each column into a [`SparseVector`] over `U`, e.g. reduce integer entries into a field.
    pub fn to_column_matrix<U>(&self) -> ColumnMatrix<U>
    where
        U: Coefficient + From<T>,
    {
        let columns = self
            .colptr
            .iter()
            .tuple_windows()
            .map(|(&start, &end)| {
                SparseVector::from_unsorted(
                    (start..end).map(|k| (self.rowind[k], U::from(self.values[k]))),
                )
            })
            .collect();
        ColumnMatrix::from_columns_unchecked(self.n_rows, columns)
    }
}

impl<T: Coefficient> MatrixOracle for CscMatrix<T> {
    type CoefficientField = T;

    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError> {
        let range = self.col_range(col)?;
        Ok(range.map(move |k| (self.values[k], self.rowind[k])))
    }
}

impl<T: Display> Display for CscMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} x {} CscMatrix", self.n_rows, self.n_cols)?;
        for (col, (&start, &end)) in self.colptr.iter().tuple_windows().enumerate() {
            let terms = (start..end)
                .map(|k| format!("{}:{}", self.rowind[k], self.values[k]))
                .join(" ");
            writeln!(f, "  {col}: [{terms}]")?;
        }
        Ok(())
    }
}
