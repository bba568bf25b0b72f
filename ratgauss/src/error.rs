use thiserror::Error;

/// Errors raised by rational arithmetic and the linear algebra built on it
///
/// Every variant is terminal for the operation that produced it. Composite operations (dot products,
/// elimination, ...) return the first error raised by any of their steps unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatError {
    #[error("division by zero")]
    DivisionByZero,

    /// A numerator or denominator does not fit in an `i64`
    ///
    /// The representable range is symmetric, so a result whose reduced numerator would be `i64::MIN`
    /// (i.e. `-2^63`) is also reported as an overflow, even though that integer is itself
    /// representable. This keeps [`Rational::abs`](crate::Rational::abs) and negation total.
    #[error("64-bit integer overflow")]
    Overflow,

    #[error("cannot convert NaN to a rational")]
    InvalidNumber,

    #[error("cannot convert an infinite value to a rational")]
    InfiniteNumber,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquareMatrix { rows: usize, cols: usize },

    #[error("singular matrix encountered")]
    SingularMatrix,
}

/// Checks that `got` matches `expected`, returning [`RatError::DimensionMismatch`] otherwise
#[inline]
pub(crate) fn check_dims(expected: usize, got: usize) -> Result<(), RatError> {
    if expected == got {
        Ok(())
    } else {
        Err(RatError::DimensionMismatch { expected, got })
    }
}

/// Checks that `index < len`, returning [`RatError::IndexOutOfBounds`] otherwise
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), RatError> {
    if index < len {
        Ok(())
    } else {
        Err(RatError::IndexOutOfBounds { index, len })
    }
}
