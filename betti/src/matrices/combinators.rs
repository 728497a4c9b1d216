// ======== Combinators ========================================

// ====== Product ==============================

use crate::BettiError;

use super::{MatrixOracle, MatrixRef};

/// Lazy product `left * right`, columns are computed on request.
pub fn product<M1: MatrixRef, M2: MatrixRef>(
    left: M1,
    right: M2,
) -> Result<Product<M1, M2>, BettiError>
where
    M2: MatrixOracle<CoefficientField = M1::CoefficientField>,
{
    if left.n_cols() != right.n_rows() {
        return Err(BettiError::DimensionMismatch {
            expected: left.n_cols(),
            found: right.n_rows(),
        });
    }
    Ok(Product { left, right })
}

#[derive(Clone, Copy)]
pub struct Product<M1: MatrixRef, M2: MatrixRef> {
    left: M1,
    right: M2,
}

impl<M1: MatrixRef, M2: MatrixRef> MatrixOracle for Product<M1, M2>
where
    M2: MatrixOracle<CoefficientField = M1::CoefficientField>,
{
    type CoefficientField = M1::CoefficientField;

    fn n_rows(&self) -> usize {
        self.left.n_rows()
    }

    fn n_cols(&self) -> usize {
        self.right.n_cols()
    }

    fn column(
        &self,
        col: usize,
    ) -> Result<impl Iterator<Item = (Self::CoefficientField, usize)>, BettiError> {
        // Pull out right col
        // This tells us what linear combination of columns in the left matrix
        // should be formed to yield the product column
        let mut terms = vec![];
        for (right_coeff, right_row_index) in self.right.column(col)? {
            terms.extend(
                self.left
                    .column(right_row_index)?
                    .map(|(left_coeff, left_row_index)| (left_coeff * right_coeff, left_row_index)),
            );
        }
        Ok(terms.into_iter())
    }
}
