//! Dense matrix helpers with explicit dimension checks.

use na::{DMatrix, RealField};
use nalgebra as na;

use crate::error::{Error, Result};

/// A `rows x cols` matrix of zeros.
pub fn zeros<N: RealField + Copy>(rows: usize, cols: usize) -> DMatrix<N> {
    DMatrix::zeros(rows, cols)
}

/// Matrix product `lhs * rhs`.
///
/// The product is only defined when `lhs` has as many columns as `rhs` has rows, otherwise
/// [`Error::DimensionMismatch`] reports the shape `rhs` should have had.
pub fn multiply<N: RealField + Copy>(lhs: &DMatrix<N>, rhs: &DMatrix<N>) -> Result<DMatrix<N>> {
    if lhs.ncols() != rhs.nrows() {
        return Err(Error::DimensionMismatch {
            expected: (lhs.ncols(), rhs.ncols()),
            found: rhs.shape(),
        });
    }
    Ok(lhs * rhs)
}
