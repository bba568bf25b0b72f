use crate::error::RatError;
use rand::Rng;
use std::{cmp::Ordering, fmt};

/// Largest denominator tried by `TryFrom<f64>` when approximating a float
pub const DEFAULT_MAX_DENOMINATOR: i64 = 1_000_000;

/// `2^63` as a float. Any float at or above this magnitude does not fit in the rational range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// An exact fraction of two 64-bit integers
///
/// Values are always kept in canonical form:
/// - the denominator is strictly positive, the sign lives in the numerator
/// - numerator and denominator are coprime, and zero is stored as `0/1`
/// - the numerator is never `i64::MIN`, so the representable range is symmetric around zero
///
/// Because the form is canonical, the derived structural equality is also mathematical equality.
///
/// Every arithmetic operation is checked: if an intermediate product or sum does not fit in an
/// `i64`, the operation fails with [`RatError::Overflow`] instead of wrapping.
///
/// # Examples
///
/// ```
/// use ratgauss::Rational;
///
/// let a = Rational::new(2, -4).unwrap();
/// assert_eq!((a.numer(), a.denom()), (-1, 2));
///
/// let b = Rational::new(1, 3).unwrap();
/// assert_eq!(a.try_add(&b).unwrap(), Rational::new(-1, 6).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rational {
    numer: i64,
    denom: i64,
}

#[inline]
fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[inline]
fn mul_i64(a: i64, b: i64) -> Result<i64, RatError> {
    a.checked_mul(b).ok_or(RatError::Overflow)
}

#[inline]
fn add_i64(a: i64, b: i64) -> Result<i64, RatError> {
    a.checked_add(b).ok_or(RatError::Overflow)
}

/// Computes the convergent `(m0 + a * m1, n0 + a * n1)`, or `None` if it does not fit in an `i64`
#[inline]
fn next_convergent(a: i64, (m0, n0): (i64, i64), (m1, n1): (i64, i64)) -> Option<(i64, i64)> {
    let m = m0.checked_add(a.checked_mul(m1)?)?;
    let n = n0.checked_add(a.checked_mul(n1)?)?;
    Some((m, n))
}

impl Rational {
    /// The rational `0/1`
    pub const ZERO: Rational = Rational { numer: 0, denom: 1 };

    /// The rational `1/1`
    pub const ONE: Rational = Rational { numer: 1, denom: 1 };

    /// Creates the normalized fraction `numer/denom`
    ///
    /// # Errors
    ///
    /// - [`RatError::DivisionByZero`] if `denom` is zero
    /// - [`RatError::Overflow`] if moving the sign to the numerator overflows, or if the reduced
    ///   numerator is `i64::MIN`
    pub fn new(numer: i64, denom: i64) -> Result<Self, RatError> {
        if denom == 0 {
            return Err(RatError::DivisionByZero);
        }
        if denom < 0 {
            let numer = numer.checked_neg().ok_or(RatError::Overflow)?;
            let denom = denom.checked_neg().ok_or(RatError::Overflow)?;
            return Self::new(numer, denom);
        }

        let r = Self::reduce_positive(numer, denom);
        if r.numer == i64::MIN {
            return Err(RatError::Overflow);
        }
        Ok(r)
    }

    /// Reduces `numer/denom` by their gcd, assuming `denom > 0`
    #[inline]
    fn reduce_positive(numer: i64, denom: i64) -> Self {
        // gcd(0, 0) only arises for a zero denominator, but keep `0/1` well-formed regardless
        let g = gcd(numer.unsigned_abs(), denom.unsigned_abs()).max(1);

        // g divides denom > 0, so it fits in an i64
        let g = g as i64;
        Rational {
            numer: numer / g,
            denom: denom / g,
        }
    }

    /// Creates the rational `value/1`
    ///
    /// # Errors
    ///
    /// [`RatError::Overflow`] if `value` is `i64::MIN`
    #[inline]
    pub fn from_int(value: i64) -> Result<Self, RatError> {
        Self::new(value, 1)
    }

    /// Finds the best rational approximation of `value` with denominator at most `max_denominator`
    ///
    /// Runs the continued fraction expansion of `|value|`, keeping the convergent with the smallest
    /// absolute error among all convergents whose denominators fit under `max_denominator`. The
    /// expansion stops as soon as the remainder becomes exactly zero. A `max_denominator` below 1
    /// is treated as 1.
    ///
    /// Floats with no fractional part are converted exactly.
    ///
    /// # Errors
    ///
    /// - [`RatError::InvalidNumber`] if `value` is NaN
    /// - [`RatError::InfiniteNumber`] if `value` is infinite
    /// - [`RatError::Overflow`] if `value` is an integer outside the representable range
    ///
    /// # Examples
    ///
    /// ```
    /// use ratgauss::Rational;
    ///
    /// let pi = Rational::from_f64(std::f64::consts::PI, 1000).unwrap();
    /// assert_eq!((pi.numer(), pi.denom()), (355, 113));
    /// ```
    pub fn from_f64(value: f64, max_denominator: i64) -> Result<Self, RatError> {
        if value.is_nan() {
            return Err(RatError::InvalidNumber);
        }
        if value.is_infinite() {
            return Err(RatError::InfiniteNumber);
        }
        if value == 0.0 {
            return Ok(Self::ZERO);
        }
        if value.fract() == 0.0 {
            if value.abs() >= I64_BOUND {
                return Err(RatError::Overflow);
            }
            return Self::from_int(value as i64);
        }

        let max_denominator = max_denominator.max(1);
        let target = value.abs();

        // (m0, n0) and (m1, n1) are the two most recent convergents
        let mut prev = (0, 1);
        let mut last = (1, 0);
        let mut best = (0, 1);
        let mut best_err = f64::INFINITY;
        let mut remainder = target;

        loop {
            let a = remainder.floor();
            if a >= I64_BOUND {
                break;
            }
            let a = a as i64;

            let Some((m, n)) = next_convergent(a, prev, last) else {
                break;
            };
            if n > max_denominator {
                break;
            }

            let err = (m as f64 / n as f64 - target).abs();
            if err < best_err {
                best = (m, n);
                best_err = err;
            }

            prev = last;
            last = (m, n);

            let frac = remainder - a as f64;
            if frac == 0.0 {
                break;
            }
            remainder = frac.recip();
        }

        let (m, n) = best;
        Self::new(if value < 0.0 { -m } else { m }, n)
    }

    /// Creates a random rational with numerator in `[-bound, bound]` and denominator in `[1, bound]`
    ///
    /// A `bound` of zero is treated as 1.
    pub fn random(rng: &mut impl Rng, bound: u32) -> Self {
        let bound = i64::from(bound.max(1));
        let numer = rng.random_range(-bound..=bound);
        let denom = rng.random_range(1..=bound);
        Self::reduce_positive(numer, denom)
    }

    #[inline]
    pub fn numer(&self) -> i64 {
        self.numer
    }

    #[inline]
    pub fn denom(&self) -> i64 {
        self.denom
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.denom == 1
    }

    /// Returns `-1`, `0` or `1` according to the sign of the rational
    #[inline]
    pub fn signum(&self) -> i64 {
        self.numer.signum()
    }

    /// Checked addition
    pub fn try_add(&self, other: &Rational) -> Result<Self, RatError> {
        let numer = add_i64(
            mul_i64(self.numer, other.denom)?,
            mul_i64(other.numer, self.denom)?,
        )?;
        let denom = mul_i64(self.denom, other.denom)?;
        Self::new(numer, denom)
    }

    /// Checked subtraction, computed as `self + (-other)`
    #[inline]
    pub fn try_sub(&self, other: &Rational) -> Result<Self, RatError> {
        self.try_add(&other.try_neg()?)
    }

    /// Checked multiplication
    pub fn try_mul(&self, other: &Rational) -> Result<Self, RatError> {
        let numer = mul_i64(self.numer, other.numer)?;
        let denom = mul_i64(self.denom, other.denom)?;
        Self::new(numer, denom)
    }

    /// Checked division
    ///
    /// # Errors
    ///
    /// [`RatError::DivisionByZero`] if `other` is zero, [`RatError::Overflow`] if an intermediate
    /// product overflows
    pub fn try_div(&self, other: &Rational) -> Result<Self, RatError> {
        if other.is_zero() {
            return Err(RatError::DivisionByZero);
        }
        let numer = mul_i64(self.numer, other.denom)?;
        let denom = mul_i64(self.denom, other.numer)?;
        Self::new(numer, denom)
    }

    /// Returns `1/self`, failing with [`RatError::DivisionByZero`] on zero
    #[inline]
    pub fn try_recip(&self) -> Result<Self, RatError> {
        Self::new(self.denom, self.numer)
    }

    /// Checked negation
    #[inline]
    pub fn try_neg(&self) -> Result<Self, RatError> {
        let numer = self.numer.checked_neg().ok_or(RatError::Overflow)?;
        Ok(Rational {
            numer,
            denom: self.denom,
        })
    }

    /// Absolute value
    ///
    /// This cannot fail: the numerator is never `i64::MIN`, so its absolute value always fits.
    #[inline]
    pub fn abs(&self) -> Self {
        Rational {
            numer: self.numer.abs(),
            denom: self.denom,
        }
    }

    /// Compares two rationals by cross-multiplying, failing if either product overflows
    pub fn try_cmp(&self, other: &Rational) -> Result<Ordering, RatError> {
        let lhs = mul_i64(self.numer, other.denom)?;
        let rhs = mul_i64(other.numer, self.denom)?;
        Ok(lhs.cmp(&rhs))
    }

    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Returns a display adapter rendering the value as a mixed number, e.g. `-3 1/2`
    #[inline]
    pub fn mixed(&self) -> Mixed<'_> {
        Mixed(self)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Rational {
            numer: i64::from(value),
            denom: 1,
        }
    }
}

impl TryFrom<i64> for Rational {
    type Error = RatError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_int(value)
    }
}

impl TryFrom<f64> for Rational {
    type Error = RatError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value, DEFAULT_MAX_DENOMINATOR)
    }
}

impl From<Rational> for f64 {
    fn from(value: Rational) -> Self {
        value.to_f64()
    }
}

/// Formats the rational as `numer/denom`
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

/// Mixed-number rendering of a [`Rational`], see [`Rational::mixed`]
pub struct Mixed<'a>(&'a Rational);

impl fmt::Display for Mixed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        if r.is_zero() {
            return write!(f, "0");
        }

        let whole = r.numer / r.denom;
        let rem = (r.numer % r.denom).abs();
        let sign = if r.numer < 0 { "-" } else { "" };
        match (whole, rem) {
            (whole, 0) => write!(f, "{}", whole),
            (0, rem) => write!(f, "{}{}/{}", sign, rem, r.denom),
            (whole, rem) => write!(f, "{}{} {}/{}", sign, whole.abs(), rem, r.denom),
        }
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
    fn normalization() {
        assert_eq!((r(6, 8).numer(), r(6, 8).denom()), (3, 4));
        assert_eq!((r(3, -9).numer(), r(3, -9).denom()), (-1, 3));
        assert_eq!((r(-4, -2).numer(), r(-4, -2).denom()), (2, 1));
        assert_eq!(r(0, -7), Rational::ZERO);
        assert_eq!(r(0, 12).denom(), 1);
        assert_eq!(r(i64::MIN, 2), r(-(1 << 62), 1));
    }

    #[test]
    fn construction_errors() {
        assert_eq!(Rational::new(1, 0), Err(RatError::DivisionByZero));
        assert_eq!(Rational::new(0, 0), Err(RatError::DivisionByZero));
        assert_eq!(Rational::new(1, i64::MIN), Err(RatError::Overflow));
        assert_eq!(Rational::new(i64::MIN, 1), Err(RatError::Overflow));
        assert_eq!(Rational::from_int(i64::MIN), Err(RatError::Overflow));
        assert_eq!(Rational::from_int(i64::MAX).unwrap().numer(), i64::MAX);
    }

    #[test]
    fn arithmetic() {
        let a = r(1, 2);
        let b = r(-2, 3);
        assert_eq!(a.try_add(&b).unwrap(), r(-1, 6));
        assert_eq!(a.try_sub(&b).unwrap(), r(7, 6));
        assert_eq!(a.try_mul(&b).unwrap(), r(-1, 3));
        assert_eq!(a.try_div(&b).unwrap(), r(-3, 4));
        assert_eq!(b.try_neg().unwrap(), r(2, 3));
        assert_eq!(b.abs(), r(2, 3));
        assert_eq!(b.try_recip().unwrap(), r(-3, 2));
        assert_eq!(a.try_sub(&a).unwrap(), Rational::ZERO);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(r(1, 2).try_div(&Rational::ZERO), Err(RatError::DivisionByZero));
        assert_eq!(Rational::ZERO.try_recip(), Err(RatError::DivisionByZero));
    }

    #[test]
    fn overflow_is_reported() {
        let big = r(i64::MAX, 2);
        assert_eq!(big.try_mul(&r(2, 1)), Err(RatError::Overflow));

        let max = r(i64::MAX, 1);
        assert_eq!(max.try_add(&Rational::ONE), Err(RatError::Overflow));
        assert_eq!(max.try_neg().unwrap().try_sub(&r(2, 1)), Err(RatError::Overflow));

        // cross-multiplying the denominators overflows even though the sum is small
        let p = r(1, 3_037_000_507);
        let q = r(1, 3_037_000_493);
        assert_eq!(p.try_add(&q), Err(RatError::Overflow));
        assert_eq!(p.try_cmp(&r(i64::MAX, 1)), Err(RatError::Overflow));
    }

    #[test]
    fn most_negative_value_is_excluded() {
        // -2^63 fits in an i64 but is not a valid numerator
        let half_min = r(-(1 << 62), 1);
        assert_eq!(half_min.try_add(&half_min), Err(RatError::Overflow));
        assert_eq!(half_min.try_mul(&r(2, 1)), Err(RatError::Overflow));
        assert_eq!(Rational::new(i64::MIN, 1), Err(RatError::Overflow));

        let min = r(-i64::MAX, 1);
        assert_eq!(min.abs(), r(i64::MAX, 1));
        assert_eq!(min.try_neg().unwrap(), r(i64::MAX, 1));
        assert_eq!(min.try_sub(&Rational::ONE), Err(RatError::Overflow));
    }

    #[test]
    fn ordering() {
        assert_eq!(r(1, 3).try_cmp(&r(1, 2)).unwrap(), Ordering::Less);
        assert_eq!(r(-1, 3).try_cmp(&r(-1, 2)).unwrap(), Ordering::Greater);
        assert_eq!(r(2, 4).try_cmp(&r(1, 2)).unwrap(), Ordering::Equal);
        assert_eq!(r(5, 1).try_cmp(&r(-5, 1)).unwrap(), Ordering::Greater);
    }

    #[test]
    fn float_conversion() {
        assert_eq!(Rational::from_f64(0.5, 100).unwrap(), r(1, 2));
        assert_eq!(Rational::from_f64(3.141592653589793, 1000).unwrap(), r(355, 113));
        assert_eq!(Rational::from_f64(-2.5, 10).unwrap(), r(-5, 2));
        assert_eq!(Rational::from_f64(0.0, 10).unwrap(), Rational::ZERO);
        assert_eq!(Rational::from_f64(-0.0, 10).unwrap(), Rational::ZERO);
        assert_eq!(Rational::from_f64(-42.0, 10).unwrap(), r(-42, 1));
        assert_eq!(Rational::from_f64(0.1, 1).unwrap(), Rational::ZERO);
        assert_eq!(Rational::from_f64(0.75, 0).unwrap(), Rational::ONE);
        assert_eq!(Rational::from_f64(f64::NAN, 10), Err(RatError::InvalidNumber));
        assert_eq!(Rational::from_f64(f64::INFINITY, 10), Err(RatError::InfiniteNumber));
        assert_eq!(Rational::from_f64(f64::NEG_INFINITY, 10), Err(RatError::InfiniteNumber));
        assert_eq!(Rational::from_f64(1e19, 10), Err(RatError::Overflow));
        assert_eq!(Rational::try_from(0.125).unwrap(), r(1, 8));
        assert_eq!(r(-3, 4).to_f64(), -0.75);
    }

    #[test]
    fn denominator_cutoff() {
        // the float nearest 0.3 expands as [0; 3, 2, 1, ...], with convergents 1/3, 2/7, 3/10
        assert_eq!(Rational::from_f64(0.3, 6).unwrap(), r(1, 3));
        assert_eq!(Rational::from_f64(0.3, 9).unwrap(), r(2, 7));
        assert_eq!(Rational::from_f64(0.3, 10).unwrap(), r(3, 10));
        assert_eq!(Rational::from_f64(0.3, 1_000_000).unwrap(), r(3, 10));
        assert_eq!(Rational::from_f64(-1.0 / 3.0, 1_000_000).unwrap(), r(-1, 3));
    }

    #[test]
    fn display() {
        assert_eq!(r(3, 1).to_string(), "3/1");
        assert_eq!(r(-1, 2).to_string(), "-1/2");
        assert_eq!(Rational::ZERO.mixed().to_string(), "0");
        assert_eq!(r(7, 2).mixed().to_string(), "3 1/2");
        assert_eq!(r(-7, 2).mixed().to_string(), "-3 1/2");
        assert_eq!(r(-6, 2).mixed().to_string(), "-3");
        assert_eq!(r(-1, 2).mixed().to_string(), "-1/2");
        assert_eq!(r(2, 5).mixed().to_string(), "2/5");
    }

    #[test]
    fn random_is_normalized() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let q = Rational::random(&mut rng, 50);
            assert!(q.denom() > 0);
            assert!(q.denom() <= 50 && q.numer().abs() <= 50);
            assert_eq!(gcd(q.numer().unsigned_abs(), q.denom() as u64), 1);
        }
    }
}
