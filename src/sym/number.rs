//! Exact and floating-point numbers for the symbolic backend.
//!
//! Numbers are exact rationals unless a float enters the computation, in which
//! case the result is a float. Floats compare by bit pattern so that numbers
//! can be used as ordered map keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A numeric literal.
#[derive(Clone, Debug)]
pub enum Number {
    /// Exact rational
    Rational(BigRational),
    /// Inexact float
    Float(f64),
}

impl Number {
    pub fn zero() -> Self {
        Number::Rational(BigRational::zero())
    }

    pub fn one() -> Self {
        Number::Rational(BigRational::one())
    }

    pub fn from_i64(value: i64) -> Self {
        Number::Rational(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn from_bigint(value: BigInt) -> Self {
        Number::Rational(BigRational::from_integer(value))
    }

    /// Build p/q. Returns `None` when q is zero.
    pub fn rational(p: i64, q: i64) -> Option<Self> {
        if q == 0 {
            return None;
        }
        Some(Number::Rational(BigRational::new(BigInt::from(p), BigInt::from(q))))
    }

    pub fn from_f64(value: f64) -> Self {
        Number::Float(value)
    }

    /// Parse a decimal literal such as `2.5` or `1e-3` into an exact rational.
    pub fn from_decimal(text: &str) -> Option<Self> {
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(pos) => (&text[..pos], text[pos + 1..].parse::<i32>().ok()?),
            None => (text, 0),
        };
        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let digits = format!("{}{}", int_part, frac_part);
        let numer: BigInt = if digits.is_empty() {
            BigInt::zero()
        } else {
            digits.parse().ok()?
        };
        let scale = exponent - frac_part.len() as i32;
        let ten = BigInt::from(10);
        let value = if scale >= 0 {
            BigRational::from_integer(numer * num_traits::pow(ten, scale as usize))
        } else {
            BigRational::new(numer, num_traits::pow(ten, (-scale) as usize))
        };
        Some(Number::Rational(value))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_one(),
            Number::Float(f) => *f == 1.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_negative(),
            Number::Float(f) => *f < 0.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_positive(),
            Number::Float(f) => *f > 0.0,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Number::Float(f) if f.is_nan())
    }

    /// True for exact integers.
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Rational(r) if r.is_integer())
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Number::Rational(r) => Some(r),
            Number::Float(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            Number::Rational(r) if r.is_integer() => Some(r.to_integer()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|i| i.to_i64())
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Rational(r) => r.to_f64().unwrap_or(f64::NAN),
            Number::Float(f) => *f,
        }
    }

    pub fn abs(&self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(r.abs()),
            Number::Float(f) => Number::Float(f.abs()),
        }
    }

    /// Reciprocal, `None` for zero.
    pub fn recip(&self) -> Option<Number> {
        if self.is_zero() {
            return None;
        }
        Some(match self {
            Number::Rational(r) => Number::Rational(r.recip()),
            Number::Float(f) => Number::Float(1.0 / f),
        })
    }

    /// Integer power. `None` for a zero base with a negative exponent.
    pub fn powi(&self, exponent: i64) -> Option<Number> {
        match self {
            Number::Rational(r) => {
                if r.is_zero() && exponent < 0 {
                    return None;
                }
                let e = i32::try_from(exponent).ok()?;
                Some(Number::Rational(r.pow(e)))
            }
            Number::Float(f) => Some(Number::Float(f.powi(exponent as i32))),
        }
    }

    /// Floor for exact rationals.
    pub fn floor(&self) -> Option<BigInt> {
        match self {
            Number::Rational(r) => Some(r.floor().to_integer()),
            Number::Float(_) => None,
        }
    }

    /// Numerator and denominator of an exact rational.
    pub fn numer_denom(&self) -> Option<(BigInt, BigInt)> {
        self.as_rational()
            .map(|r| (r.numer().clone(), r.denom().clone()))
    }

    /// Convert an exact rational to a float.
    pub fn to_float(&self) -> Number {
        Number::Float(self.to_f64())
    }

    /// Convert a float to the closest simple rational.
    pub fn to_rational(&self) -> Number {
        match self {
            Number::Rational(_) => self.clone(),
            Number::Float(f) => approximate_rational(*f)
                .map(Number::Rational)
                .unwrap_or_else(|| self.clone()),
        }
    }
}

/// Continued-fraction approximation of a float with a bounded denominator.
fn approximate_rational(value: f64) -> Option<BigRational> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 {
        return BigRational::from_float(value);
    }
    let (mut h0, mut h1) = (0i128, 1i128);
    let (mut k0, mut k1) = (1i128, 0i128);
    let mut x = value;
    for _ in 0..40 {
        let a = x.floor();
        let ai = a as i128;
        let h2 = ai.checked_mul(h1)?.checked_add(h0)?;
        let k2 = ai.checked_mul(k1)?.checked_add(k0)?;
        h0 = h1;
        h1 = h2;
        k0 = k1;
        k1 = k2;
        let approx = h1 as f64 / k1 as f64;
        if (approx - value).abs() <= value.abs() * 1e-12 || k1 > 1_000_000_000_000 {
            break;
        }
        let frac = x - a;
        if frac.abs() < 1e-15 {
            break;
        }
        x = 1.0 / frac;
    }
    Some(BigRational::new(BigInt::from(h1), BigInt::from(k1)))
}

/// Greatest common divisor of two exact rationals' numerators over the lcm of
/// their denominators.
pub fn rational_gcd(a: &BigRational, b: &BigRational) -> BigRational {
    let numer = a.numer().gcd(b.numer());
    let denom = a.denom().lcm(b.denom());
    if numer.is_zero() {
        return BigRational::one();
    }
    BigRational::new(numer, denom)
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => a.cmp(b),
            (Number::Float(a), Number::Float(b)) => a.total_cmp(b),
            (Number::Rational(_), Number::Float(_)) => Ordering::Less,
            (Number::Float(_), Number::Rational(_)) => Ordering::Greater,
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Rational(r) => {
                0u8.hash(state);
                r.hash(state);
            }
            Number::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a + b),
            (a, b) => Number::Float(a.to_f64() + b.to_f64()),
        }
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        self + (-rhs)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a * b),
            (a, b) => Number::Float(a.to_f64() * b.to_f64()),
        }
    }
}

impl Div for Number {
    type Output = Number;

    /// Division by an exact zero yields a float infinity or NaN.
    fn div(self, rhs: Number) -> Number {
        match rhs.recip() {
            Some(r) => self * r,
            None => Number::Float(self.to_f64() / 0.0),
        }
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(-r),
            Number::Float(f) => Number::Float(-f),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::from_i64(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Rational(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Number::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_is_exact() {
        let n = Number::from_decimal("2.5").unwrap();
        assert_eq!(n, Number::rational(5, 2).unwrap());
        let m = Number::from_decimal("1e-3").unwrap();
        assert_eq!(m, Number::rational(1, 1000).unwrap());
        let k = Number::from_decimal("4.7e3").unwrap();
        assert_eq!(k, Number::from_i64(4700));
    }

    #[test]
    fn test_mixed_arithmetic_becomes_float() {
        let a = Number::rational(1, 2).unwrap();
        let b = Number::from_f64(0.25);
        assert!((a + b).is_float());
    }

    #[test]
    fn test_rational_approximation() {
        let n = Number::from_f64(0.75).to_rational();
        assert_eq!(n, Number::rational(3, 4).unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::rational(-3, 4).unwrap().to_string(), "-3/4");
        assert_eq!(Number::from_i64(12).to_string(), "12");
    }
}
