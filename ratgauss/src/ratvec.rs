use crate::error::{check_dims, check_index, RatError};
use crate::rational::Rational;
use rand::Rng;
use ref_cast::RefCast;
use std::{
    cmp::Ordering,
    fmt,
    ops::{Deref, DerefMut, Index, IndexMut, Range},
};

/// A fixed-length vector of [`Rational`]s which owns its storage.
///
/// All arithmetic and comparison methods are implemented on [`RatSlice`], which `RatVec`
/// dereferences to. This means the same operations are available on sub-ranges of a vector,
/// obtained by indexing with a range.
///
/// # Examples
///
/// ```
/// use ratgauss::{RatVec, Rational};
///
/// let v = RatVec::from_int_vec(&[1, 2, 3]).unwrap();
/// let w = RatVec::from_int_vec(&[4, 5, 6]).unwrap();
/// assert_eq!(v.dot(&w).unwrap(), Rational::from(32));
///
/// // dot product of the last two components only
/// assert_eq!(v[1..3].dot(&w[1..3]).unwrap(), Rational::from(28));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct RatVec(Vec<Rational>);

/// A borrowed range of [`Rational`]s, represented as a slice.
///
/// Provides bounds-checked access, elementwise arithmetic, dot products and comparisons. Methods that
/// combine two slices fail with [`RatError::DimensionMismatch`] if their lengths differ, and pass on
/// any [`RatError::Overflow`] raised by the underlying rational arithmetic.
#[derive(RefCast, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct RatSlice([Rational]);

impl RatSlice {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if every component is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(Rational::is_zero)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Rational> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Rational] {
        &self.0
    }

    /// Returns a copy of the range as a [`RatVec`].
    #[inline]
    pub fn to_vec(&self) -> RatVec {
        RatVec(self.0.to_vec())
    }

    /// Returns the component at `index`, or [`RatError::IndexOutOfBounds`]
    #[inline]
    pub fn get(&self, index: usize) -> Result<&Rational, RatError> {
        check_index(index, self.len())?;
        Ok(&self.0[index])
    }

    /// Sets the component at `index`, or fails with [`RatError::IndexOutOfBounds`]
    #[inline]
    pub fn set(&mut self, index: usize, value: Rational) -> Result<(), RatError> {
        check_index(index, self.len())?;
        self.0[index] = value;
        Ok(())
    }

    /// Elementwise sum
    pub fn try_add(&self, rhs: &RatSlice) -> Result<RatVec, RatError> {
        check_dims(self.len(), rhs.len())?;
        self.iter().zip(rhs.iter()).map(|(a, b)| a.try_add(b)).collect()
    }

    /// Elementwise difference
    pub fn try_sub(&self, rhs: &RatSlice) -> Result<RatVec, RatError> {
        check_dims(self.len(), rhs.len())?;
        self.iter().zip(rhs.iter()).map(|(a, b)| a.try_sub(b)).collect()
    }

    /// Multiplies every component by `factor`
    pub fn scale(&self, factor: &Rational) -> Result<RatVec, RatError> {
        self.iter().map(|a| a.try_mul(factor)).collect()
    }

    /// Computes the dot product of two ranges of the same length.
    pub fn dot(&self, rhs: &RatSlice) -> Result<Rational, RatError> {
        check_dims(self.len(), rhs.len())?;
        self.iter()
            .zip(rhs.iter())
            .try_fold(Rational::ZERO, |acc, (a, b)| acc.try_add(&a.try_mul(b)?))
    }

    /// Compares two ranges lexicographically, component by component
    pub fn lex_cmp(&self, rhs: &RatSlice) -> Result<Ordering, RatError> {
        check_dims(self.len(), rhs.len())?;
        for (a, b) in self.iter().zip(rhs.iter()) {
            match a.try_cmp(b)? {
                Ordering::Equal => {}
                ord => return Ok(ord),
            }
        }
        Ok(Ordering::Equal)
    }

    /// Compares the Euclidean norms of two ranges, via their squared norms
    ///
    /// The ranges may have different lengths.
    pub fn norm_cmp(&self, rhs: &RatSlice) -> Result<Ordering, RatError> {
        let lhs = self.dot(self)?;
        let rhs = rhs.dot(rhs)?;
        lhs.try_cmp(&rhs)
    }

    /// Adds `factor * source` to this range.
    ///
    /// All new components are computed before any is written, so on failure the range is left
    /// unchanged.
    pub fn add_scaled(&mut self, factor: &Rational, source: &RatSlice) -> Result<(), RatError> {
        check_dims(self.len(), source.len())?;
        let updated = self
            .iter()
            .zip(source.iter())
            .map(|(a, b)| a.try_add(&factor.try_mul(b)?))
            .collect::<Result<Vec<_>, _>>()?;
        self.0.copy_from_slice(&updated);
        Ok(())
    }

    /// Multiplies this range by `factor` in place, leaving it unchanged on failure
    pub fn scale_mut(&mut self, factor: &Rational) -> Result<(), RatError> {
        let updated = self
            .iter()
            .map(|a| a.try_mul(factor))
            .collect::<Result<Vec<_>, _>>()?;
        self.0.copy_from_slice(&updated);
        Ok(())
    }
}

impl Index<usize> for RatSlice {
    type Output = Rational;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

impl IndexMut<usize> for RatSlice {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.0.index_mut(index)
    }
}

impl Index<Range<usize>> for RatSlice {
    type Output = RatSlice;

    #[inline]
    fn index(&self, index: Range<usize>) -> &Self::Output {
        RatSlice::ref_cast(&self.0[index])
    }
}

impl IndexMut<Range<usize>> for RatSlice {
    #[inline]
    fn index_mut(&mut self, index: Range<usize>) -> &mut Self::Output {
        RatSlice::ref_cast_mut(&mut self.0[index])
    }
}

impl<'a> IntoIterator for &'a RatSlice {
    type Item = &'a Rational;
    type IntoIter = std::slice::Iter<'a, Rational>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl RatVec {
    /// Creates a vector of `len` zeros
    #[inline]
    pub fn zeros(len: usize) -> Self {
        RatVec(vec![Rational::ZERO; len])
    }

    /// Copies the given values into a new vector
    #[inline]
    pub fn from_slice(values: &[Rational]) -> Self {
        RatVec(values.to_vec())
    }

    /// Builds a vector of length `len` whose `i`-th component is `f(i)`
    pub fn build(len: usize, f: impl FnMut(usize) -> Rational) -> Self {
        (0..len).map(f).collect()
    }

    /// Creates a vector of integers
    ///
    /// # Errors
    ///
    /// [`RatError::Overflow`] if a value is `i64::MIN`
    pub fn from_int_vec(values: &[i64]) -> Result<Self, RatError> {
        values.iter().map(|&v| Rational::from_int(v)).collect()
    }

    /// Creates a vector of `len` random rationals, see [`Rational::random`]
    pub fn random(rng: &mut impl Rng, len: usize, bound: u32) -> Self {
        (0..len).map(|_| Rational::random(rng, bound)).collect()
    }
}

impl Deref for RatVec {
    type Target = RatSlice;

    fn deref(&self) -> &Self::Target {
        RatSlice::ref_cast(&self.0)
    }
}

impl DerefMut for RatVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        RatSlice::ref_cast_mut(&mut self.0)
    }
}

impl From<Vec<Rational>> for RatVec {
    fn from(value: Vec<Rational>) -> Self {
        RatVec(value)
    }
}

impl From<RatVec> for Vec<Rational> {
    fn from(value: RatVec) -> Self {
        value.0
    }
}

impl FromIterator<Rational> for RatVec {
    fn from_iter<T: IntoIterator<Item = Rational>>(iter: T) -> Self {
        RatVec(Vec::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a RatVec {
    type Item = &'a Rational;
    type IntoIter = std::slice::Iter<'a, Rational>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for RatSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, r) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", r)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for RatVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.deref(), f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn zeros_and_copies() {
        let v = RatVec::zeros(4);
        assert_eq!(v.len(), 4);
        assert!(v.is_zero());

        let values = vec![r(1, 2), r(-3, 4)];
        let mut w = RatVec::from_slice(&values);
        w[0] = r(5, 1);
        assert_eq!(values[0], r(1, 2));
        assert_eq!(w.as_slice(), &[r(5, 1), r(-3, 4)]);
    }

    #[test]
    fn get_set() {
        let mut v = RatVec::zeros(3);
        v.set(1, r(2, 3)).unwrap();
        assert_eq!(*v.get(1).unwrap(), r(2, 3));
        assert_eq!(
            v.get(3),
            Err(RatError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert_eq!(
            v.set(7, Rational::ONE),
            Err(RatError::IndexOutOfBounds { index: 7, len: 3 })
        );
    }

    #[test]
    fn add_sub_scale() {
        let v: RatVec = vec![r(1, 2), r(1, 3)].into();
        let w: RatVec = vec![r(1, 2), r(-2, 3)].into();
        assert_eq!(v.try_add(&w).unwrap(), RatVec::from(vec![r(1, 1), r(-1, 3)]));
        assert_eq!(v.try_sub(&w).unwrap(), RatVec::from(vec![Rational::ZERO, r(1, 1)]));
        assert_eq!(v.scale(&r(6, 1)).unwrap(), RatVec::from(vec![r(3, 1), r(2, 1)]));

        let short = RatVec::zeros(1);
        assert_eq!(
            v.try_add(&short),
            Err(RatError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
        assert!(matches!(
            v.try_sub(&short),
            Err(RatError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn dot_product() {
        let v: RatVec = vec![r(1, 2), r(3, 4)].into();
        let w: RatVec = vec![r(1, 3), r(2, 5)].into();
        // 1/6 + 3/10
        assert_eq!(v.dot(&w).unwrap(), r(7, 15));
        assert!(matches!(
            v.dot(&RatVec::zeros(3)),
            Err(RatError::DimensionMismatch { .. })
        ));
        assert_eq!(RatVec::zeros(0).dot(&RatVec::zeros(0)).unwrap(), Rational::ZERO);
    }

    #[test]
    fn overflow_propagates() {
        let v: RatVec = vec![r(i64::MAX, 1), r(1, 1)].into();
        let w = RatVec::from_int_vec(&[1, i64::MAX]).unwrap();
        assert_eq!(v.dot(&w), Err(RatError::Overflow));
        assert_eq!(v.scale(&r(2, 1)), Err(RatError::Overflow));
        assert_eq!(v.norm_cmp(&w), Err(RatError::Overflow));
    }

    #[test]
    fn comparisons() {
        let a = RatVec::from_int_vec(&[1, 2, 3]).unwrap();
        let b = RatVec::from_int_vec(&[1, 3, 0]).unwrap();
        assert_eq!(a.lex_cmp(&b).unwrap(), Ordering::Less);
        assert_eq!(b.lex_cmp(&a).unwrap(), Ordering::Greater);
        assert_eq!(a.lex_cmp(&a.clone()).unwrap(), Ordering::Equal);
        assert!(matches!(
            a.lex_cmp(&RatVec::zeros(2)),
            Err(RatError::DimensionMismatch { .. })
        ));

        // |a|^2 = 14, |b|^2 = 10
        assert_eq!(a.norm_cmp(&b).unwrap(), Ordering::Greater);
        assert_eq!(b.norm_cmp(&a).unwrap(), Ordering::Less);
        let c = RatVec::from_int_vec(&[3, 1]).unwrap();
        assert_eq!(c.norm_cmp(&b).unwrap(), Ordering::Equal);

        assert_ne!(a, RatVec::from_int_vec(&[1, 2]).unwrap());
        assert_eq!(a, RatVec::from_int_vec(&[1, 2, 3]).unwrap());
    }

    #[test]
    fn add_scaled_is_atomic() {
        let mut v = RatVec::from_int_vec(&[1, 1]).unwrap();
        let w = RatVec::from_int_vec(&[2, 4]).unwrap();
        v.add_scaled(&r(-1, 2), &w).unwrap();
        assert_eq!(v, RatVec::from_int_vec(&[0, -1]).unwrap());

        let before = v.clone();
        let huge = RatVec::from_int_vec(&[1, i64::MAX]).unwrap();
        assert_eq!(v.add_scaled(&r(2, 1), &huge), Err(RatError::Overflow));
        assert_eq!(v, before);

        v.scale_mut(&r(-3, 1)).unwrap();
        assert_eq!(v, RatVec::from_int_vec(&[0, 3]).unwrap());
    }

    #[test]
    fn sub_ranges() {
        let mut rng = SmallRng::seed_from_u64(1);
        let v = RatVec::random(&mut rng, 10, 20);
        let w = RatVec::random(&mut rng, 10, 20);
        let partial = v[3..8].dot(&w[3..8]).unwrap();

        let mut expected = Rational::ZERO;
        for i in 3..8 {
            expected = expected.try_add(&v[i].try_mul(&w[i]).unwrap()).unwrap();
        }
        assert_eq!(partial, expected);

        let mut u = v.clone();
        u[0..2].scale_mut(&Rational::ZERO).unwrap();
        assert!(u[0..2].is_zero());
        assert_eq!(u[2..10], v[2..10]);
    }

    #[test]
    fn display() {
        let v: RatVec = vec![r(1, 2), r(-3, 1)].into();
        assert_eq!(v.to_string(), "[1/2, -3/1]");
        assert_eq!(RatVec::zeros(0).to_string(), "[]");
    }
}
