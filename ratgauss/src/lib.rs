//! `ratgauss` is a Rust library for doing exact linear algebra over the rationals. Some features include:
//! - fractions of two `i64`s, kept in lowest terms, with every arithmetic step checked for overflow
//! - best rational approximations of floats via continued fractions
//! - elementwise vector arithmetic, dot products, lexicographic and norm comparison
//! - matrix multiplication and transpose
//! - Gaussian elimination with partial pivoting and related methods (e.g. determinant, solving linear
//!   systems, rank and inverse)
//!
//! The main data structures provided by this crate are:
//! - [`Rational`]: an exact fraction. Operations which could overflow return a `Result`, failing with
//!   [`RatError::Overflow`] rather than wrapping around
//! - [`RatVec`]: a vector of rationals, dereferencing to a [`RatSlice`] which carries the arithmetic
//! - [`RatMatrix`]: a two-dimensional matrix based on `RatVec`, which implements basic linear
//!   algebraic operations
//!
//! # Examples
//!
//! ```
//! use ratgauss::{RatMatrix, RatVec, Rational};
//!
//! let a = RatMatrix::from_int_vec(&[vec![2, 1], vec![1, 3]]).unwrap();
//! let b = RatVec::from_int_vec(&[1, 2]).unwrap();
//! let x = a.solve(&b).unwrap();
//! assert_eq!(x.to_string(), "[1/5, 3/5]");
//! assert_eq!(a.determinant().unwrap(), Rational::from(5));
//! ```

#![allow(
    clippy::needless_range_loop,
    clippy::uninlined_format_args,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]
pub mod error;
pub mod rational;
pub mod ratmatrix;
pub mod ratvec;

pub use error::RatError;
pub use rational::{Mixed, Rational, DEFAULT_MAX_DENOMINATOR};
pub use ratmatrix::{RatMatrix, RowOps};
pub use ratvec::{RatSlice, RatVec};
