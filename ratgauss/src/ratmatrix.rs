use crate::error::{check_dims, check_index, RatError};
use crate::rational::Rational;
use crate::ratvec::{RatSlice, RatVec};
use rand::Rng;
use std::{cmp::Ordering, fmt, iter, mem, ops::Index};
use tracing::{debug, trace};

/// A dense matrix of [`Rational`]s, stored as a vector of rows
///
/// Every row is a [`RatVec`] of length `cols`, and there are exactly `rows` of them. The row storage can
/// only be replaced through [`RatMatrix::set_row`] and [`RatMatrix::replace_rows`], which check the
/// dimensions of the new rows.
///
/// Operations which need to transform the matrix (e.g. [`RatMatrix::determinant`] and
/// [`RatMatrix::solve`]) work on a private copy, so the caller's matrix is never modified and no
/// intermediate state survives a failed call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RatMatrix {
    /// the number of rows in the matrix
    rows: usize,

    /// the number of columns in the matrix, i.e. the length of every row
    cols: usize,

    /// the rows of the matrix, each of length `cols`
    data: Vec<RatVec>,
}

/// Elementary row operations, used to replay the steps of gaussian elimination on a second matrix
///
/// Implementations may panic if a row index is out of range.
pub trait RowOps {
    fn swap_rows(&mut self, from: usize, to: usize);
    fn add_scaled_row(&mut self, factor: &Rational, from: usize, to: usize)
        -> Result<(), RatError>;
    fn scale_row(&mut self, factor: &Rational, row: usize) -> Result<(), RatError>;
}

impl RatMatrix {
    /// Creates a `rows` x `cols` matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        RatMatrix {
            rows,
            cols,
            data: (0..rows).map(|_| RatVec::zeros(cols)).collect(),
        }
    }

    /// Creates the `size` x `size` identity matrix
    pub fn identity(size: usize) -> Self {
        Self::build(size, size, |i, j| {
            if i == j {
                Rational::ONE
            } else {
                Rational::ZERO
            }
        })
    }

    /// Builds a matrix whose entry `(i, j)` is `f(i, j)`
    pub fn build(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Rational) -> Self {
        let data = (0..rows)
            .map(|i| RatVec::build(cols, |j| f(i, j)))
            .collect();
        RatMatrix { rows, cols, data }
    }

    /// Creates a matrix from a vector of rows
    ///
    /// The number of columns is taken from the first row. An empty vector gives a 0 x 0 matrix.
    ///
    /// # Errors
    ///
    /// [`RatError::DimensionMismatch`] if the rows do not all have the same length
    pub fn from_rows(data: Vec<RatVec>) -> Result<Self, RatError> {
        let cols = data.first().map_or(0, |row| row.len());
        for row in &data {
            check_dims(cols, row.len())?;
        }
        Ok(RatMatrix {
            rows: data.len(),
            cols,
            data,
        })
    }

    /// Creates a matrix of integers from a vector of rows
    ///
    /// # Errors
    ///
    /// [`RatError::DimensionMismatch`] for ragged input, [`RatError::Overflow`] for `i64::MIN` entries
    pub fn from_int_vec(data: &[Vec<i64>]) -> Result<Self, RatError> {
        let rows = data
            .iter()
            .map(|row| RatVec::from_int_vec(row))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    /// Creates a random matrix, with entries as in [`Rational::random`]
    pub fn random(rng: &mut impl Rng, rows: usize, cols: usize, bound: u32) -> Self {
        Self::build(rows, cols, |_, _| Rational::random(rng, bound))
    }

    /// Creates a random integer matrix with determinant `1` or `-1`
    ///
    /// The matrix is the product `LU` of a random unit lower-triangular matrix and a random upper-triangular
    /// matrix with `1` or `-1` on the diagonal. All off-diagonal factor entries are in `{-1, 0, 1}`, so the
    /// entries of the product are bounded by `size` in absolute value.
    pub fn random_invertible(rng: &mut impl Rng, size: usize) -> Self {
        let mut lower = vec![vec![0i32; size]; size];
        let mut upper = vec![vec![0i32; size]; size];
        for i in 0..size {
            lower[i][i] = 1;
            upper[i][i] = if rng.random::<bool>() { 1 } else { -1 };
            for j in 0..i {
                lower[i][j] = rng.random_range(-1..=1);
                upper[j][i] = rng.random_range(-1..=1);
            }
        }

        Self::build(size, size, |i, j| {
            let entry: i32 = (0..=usize::min(i, j))
                .map(|k| lower[i][k] * upper[k][j])
                .sum();
            Rational::from(entry)
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns a reference to the entry at `(i, j)`
    ///
    /// # Errors
    ///
    /// [`RatError::IndexOutOfBounds`] if `i` or `j` is out of range
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> Result<&Rational, RatError> {
        check_index(i, self.rows)?;
        self.data[i].get(j)
    }

    /// Returns a mutable reference to the entry at `(i, j)`
    ///
    /// # Errors
    ///
    /// [`RatError::IndexOutOfBounds`] if `i` or `j` is out of range
    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize) -> Result<&mut Rational, RatError> {
        check_index(i, self.rows)?;
        check_index(j, self.cols)?;
        Ok(&mut self.data[i][j])
    }

    /// Returns the row at index `i`
    #[inline]
    pub fn row(&self, i: usize) -> Result<&RatVec, RatError> {
        check_index(i, self.rows)?;
        Ok(&self.data[i])
    }

    /// Returns an iterator over the rows of the matrix
    #[inline]
    pub fn row_iter(&self) -> impl Iterator<Item = &RatVec> {
        self.data.iter()
    }

    /// Replaces the row at index `i`, returning the old row
    ///
    /// # Errors
    ///
    /// [`RatError::IndexOutOfBounds`] if `i` is out of range, [`RatError::DimensionMismatch`] if `row`
    /// does not have length `cols`. The matrix is unchanged on error.
    pub fn set_row(&mut self, i: usize, row: RatVec) -> Result<RatVec, RatError> {
        check_index(i, self.rows)?;
        check_dims(self.cols, row.len())?;
        Ok(mem::replace(&mut self.data[i], row))
    }

    /// Replaces all rows of the matrix at once, returning the old rows
    ///
    /// # Errors
    ///
    /// [`RatError::DimensionMismatch`] unless there are exactly `rows` new rows, each of length `cols`.
    /// The matrix is unchanged on error.
    pub fn replace_rows(&mut self, data: Vec<RatVec>) -> Result<Vec<RatVec>, RatError> {
        check_dims(self.rows, data.len())?;
        for row in &data {
            check_dims(self.cols, row.len())?;
        }
        Ok(mem::replace(&mut self.data, data))
    }

    #[inline]
    fn check_square(&self) -> Result<(), RatError> {
        if self.is_square() {
            Ok(())
        } else {
            Err(RatError::NotSquareMatrix {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Computes the matrix-vector product `self * v`
    ///
    /// # Errors
    ///
    /// [`RatError::DimensionMismatch`] if `v` does not have length `cols`, or any overflow raised while
    /// computing the dot products
    pub fn try_mul_vector(&self, v: &RatSlice) -> Result<RatVec, RatError> {
        check_dims(self.cols, v.len())?;
        self.data.iter().map(|row| row.dot(v)).collect()
    }

    /// Computes the matrix product `self * rhs`
    ///
    /// # Errors
    ///
    /// [`RatError::DimensionMismatch`] if `self.cols() != rhs.rows()`, or any overflow raised while
    /// accumulating an entry
    pub fn try_mul(&self, rhs: &RatMatrix) -> Result<RatMatrix, RatError> {
        check_dims(self.cols, rhs.rows)?;
        let mut res = RatMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = Rational::ZERO;
                for k in 0..self.cols {
                    acc = acc.try_add(&self.data[i][k].try_mul(&rhs.data[k][j])?)?;
                }
                res.data[i][j] = acc;
            }
        }
        Ok(res)
    }

    /// Returns a transposed copy of the matrix
    pub fn transposed(&self) -> Self {
        Self::build(self.cols, self.rows, |i, j| self.data[j][i])
    }

    /// Concatenates `rhs` to the right of this matrix
    ///
    /// # Errors
    ///
    /// [`RatError::DimensionMismatch`] if the matrices have different numbers of rows
    pub fn hstack(&self, rhs: &RatMatrix) -> Result<Self, RatError> {
        check_dims(self.rows, rhs.rows)?;
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(l, r)| l.iter().chain(r.iter()).copied().collect())
            .collect();
        Ok(RatMatrix {
            rows: self.rows,
            cols: self.cols + rhs.cols,
            data,
        })
    }

    /// Returns the row in `from..rows` with the largest absolute value in column `col`, or `None` if all
    /// of these entries are zero
    ///
    /// Ties are broken in favour of the first row found.
    fn select_pivot(&self, col: usize, from: usize) -> Result<Option<usize>, RatError> {
        if from >= self.rows {
            return Ok(None);
        }

        let mut best = from;
        let mut best_value = self.data[from][col].abs();
        for i in (from + 1)..self.rows {
            let value = self.data[i][col].abs();
            if value.try_cmp(&best_value)? == Ordering::Greater {
                best = i;
                best_value = value;
            }
        }

        trace!(col, row = best, pivot = %best_value, "selected pivot");
        Ok(if best_value.is_zero() { None } else { Some(best) })
    }

    /// Perform gaussian elimination while also performing matching row operations on `proxy`
    /// and returning a vector of pivot columns
    ///
    /// Pivots are normalized to `1`. If `full` is true, entries above the pivots are eliminated as well.
    fn gauss_helper(&mut self, full: bool, proxy: &mut impl RowOps) -> Result<Vec<usize>, RatError> {
        let mut row = 0;
        let mut pcols = vec![];
        for pcol in 0..self.cols {
            if row == self.rows {
                break;
            }

            let Some(row1) = self.select_pivot(pcol, row)? else {
                continue;
            };
            if row != row1 {
                self.swap_rows(row, row1);
                proxy.swap_rows(row, row1);
            }

            let inv = self.data[row][pcol].try_recip()?;
            self.scale_row(&inv, row)?;
            proxy.scale_row(&inv, row)?;

            for i in (row + 1)..self.rows {
                let entry = self.data[i][pcol];
                if !entry.is_zero() {
                    let factor = entry.try_neg()?;
                    self.add_scaled_row(&factor, row, i)?;
                    proxy.add_scaled_row(&factor, row, i)?;
                }
            }

            pcols.push(pcol);
            row += 1;
        }

        if full {
            for (row, &pcol) in pcols.iter().enumerate().rev() {
                for i in 0..row {
                    let entry = self.data[i][pcol];
                    if !entry.is_zero() {
                        let factor = entry.try_neg()?;
                        self.add_scaled_row(&factor, row, i)?;
                        proxy.add_scaled_row(&factor, row, i)?;
                    }
                }
            }
        }

        Ok(pcols)
    }

    /// Perform gaussian elimination, returning the pivot columns
    ///
    /// Produces row echelon form with every pivot equal to `1`. If `full` is true, then perform full
    /// Gauss-Jordan to produce reduced echelon form. On error the matrix is left unchanged.
    pub fn gauss(&mut self, full: bool) -> Result<Vec<usize>, RatError> {
        let mut reduced = self.clone();
        let pcols = reduced.gauss_helper(full, &mut ())?;
        *self = reduced;
        Ok(pcols)
    }

    /// Compute the rank of the matrix using gaussian elimination
    pub fn rank(&self) -> Result<usize, RatError> {
        Ok(self.clone().gauss_helper(false, &mut ())?.len())
    }

    /// Compute the inverse of an invertible matrix
    ///
    /// # Errors
    ///
    /// [`RatError::NotSquareMatrix`], [`RatError::SingularMatrix`], or any overflow raised during
    /// elimination
    pub fn inverse(&self) -> Result<Self, RatError> {
        self.check_square()?;
        let mut inv = RatMatrix::identity(self.cols);
        let pcols = self.clone().gauss_helper(true, &mut inv)?;

        if pcols.len() != self.cols {
            debug!(rank = pcols.len(), size = self.cols, "matrix is not invertible");
            return Err(RatError::SingularMatrix);
        }

        Ok(inv)
    }

    /// Computes the determinant by gaussian elimination with partial pivoting
    ///
    /// A column with no non-zero pivot candidate means the matrix is singular, in which case the
    /// determinant is exactly zero. The empty matrix has determinant `1`.
    ///
    /// # Errors
    ///
    /// [`RatError::NotSquareMatrix`] if the matrix is not square, or any overflow raised during
    /// elimination or when multiplying out the diagonal
    ///
    /// # Examples
    ///
    /// ```
    /// use ratgauss::{RatMatrix, Rational};
    ///
    /// let m = RatMatrix::from_int_vec(&[vec![2, -3, 1], vec![2, 0, -1], vec![1, 4, 5]]).unwrap();
    /// assert_eq!(m.determinant().unwrap(), Rational::from(49));
    /// ```
    pub fn determinant(&self) -> Result<Rational, RatError> {
        self.check_square()?;
        let n = self.rows;
        let mut m = self.clone();
        let mut negate = false;

        for k in 0..n {
            let Some(p) = m.select_pivot(k, k)? else {
                debug!(col = k, "no non-zero pivot, determinant is zero");
                return Ok(Rational::ZERO);
            };
            if p != k {
                m.swap_rows(k, p);
                negate = !negate;
            }

            let pivot = m.data[k][k];
            for i in (k + 1)..n {
                let entry = m.data[i][k];
                if !entry.is_zero() {
                    let factor = entry.try_div(&pivot)?.try_neg()?;
                    m.add_scaled_row(&factor, k, i)?;
                }
            }
        }

        let mut det = if negate {
            Rational::from(-1)
        } else {
            Rational::ONE
        };
        for k in 0..n {
            det = det.try_mul(&m.data[k][k])?;
        }
        Ok(det)
    }

    /// Solves the linear system `self * x = b`
    ///
    /// Runs forward elimination with partial pivoting on the augmented matrix `[self | b]`, normalizing
    /// every pivot to `1`, then back-substitutes from the last row up.
    ///
    /// # Errors
    ///
    /// - [`RatError::NotSquareMatrix`] if the matrix is not square
    /// - [`RatError::DimensionMismatch`] if `b` does not have length `rows`
    /// - [`RatError::SingularMatrix`] if the system has no unique solution
    /// - [`RatError::Overflow`] if any intermediate value does not fit
    ///
    /// # Examples
    ///
    /// ```
    /// use ratgauss::{RatMatrix, RatVec};
    ///
    /// let a = RatMatrix::from_int_vec(&[vec![2, 1, -1], vec![-3, -1, 2], vec![-2, 1, 2]]).unwrap();
    /// let b = RatVec::from_int_vec(&[8, -11, -3]).unwrap();
    /// assert_eq!(a.solve(&b).unwrap(), RatVec::from_int_vec(&[2, 3, -1]).unwrap());
    /// ```
    pub fn solve(&self, b: &RatSlice) -> Result<RatVec, RatError> {
        self.check_square()?;
        check_dims(self.rows, b.len())?;
        let n = self.rows;

        let mut aug = RatMatrix {
            rows: n,
            cols: n + 1,
            data: self
                .data
                .iter()
                .zip(b.iter())
                .map(|(row, bi)| row.iter().chain(iter::once(bi)).copied().collect())
                .collect(),
        };

        for k in 0..n {
            let Some(p) = aug.select_pivot(k, k)? else {
                debug!(col = k, "no non-zero pivot, system is singular");
                return Err(RatError::SingularMatrix);
            };
            if p != k {
                aug.swap_rows(k, p);
            }

            let inv = aug.data[k][k].try_recip()?;
            aug.scale_row(&inv, k)?;

            for i in (k + 1)..n {
                let entry = aug.data[i][k];
                if !entry.is_zero() {
                    aug.add_scaled_row(&entry.try_neg()?, k, i)?;
                }
            }
        }

        let mut x = RatVec::zeros(n);
        for i in (0..n).rev() {
            let row = &aug.data[i];
            let sum = row[(i + 1)..n].dot(&x[(i + 1)..n])?;
            x[i] = row[n].try_sub(&sum)?;
        }

        Ok(x)
    }
}

impl RowOps for () {
    #[inline]
    fn swap_rows(&mut self, _: usize, _: usize) {}

    #[inline]
    fn add_scaled_row(&mut self, _: &Rational, _: usize, _: usize) -> Result<(), RatError> {
        Ok(())
    }

    #[inline]
    fn scale_row(&mut self, _: &Rational, _: usize) -> Result<(), RatError> {
        Ok(())
    }
}

impl RowOps for RatMatrix {
    #[inline]
    fn swap_rows(&mut self, from: usize, to: usize) {
        trace!(from, to, "swap rows");
        self.data.swap(from, to);
    }

    /// Adds `factor` times row `from` to row `to`
    fn add_scaled_row(
        &mut self,
        factor: &Rational,
        from: usize,
        to: usize,
    ) -> Result<(), RatError> {
        let (source, target) = match from.cmp(&to) {
            Ordering::Less => {
                let (head, tail) = self.data.split_at_mut(to);
                (&head[from], &mut tail[0])
            }
            Ordering::Greater => {
                let (head, tail) = self.data.split_at_mut(from);
                (&tail[0], &mut head[to])
            }
            Ordering::Equal => {
                let source = self.data[from].clone();
                return self.data[to].add_scaled(factor, &source);
            }
        };
        target.add_scaled(factor, source)
    }

    #[inline]
    fn scale_row(&mut self, factor: &Rational, row: usize) -> Result<(), RatError> {
        self.data[row].scale_mut(factor)
    }
}

impl Index<(usize, usize)> for RatMatrix {
    type Output = Rational;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.data[index.0][index.1]
    }
}

impl fmt::Display for RatMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row)?;
        }
        write!(f, "]")
    }
}
