//! Univariate polynomials with symbolic coefficients.

use std::fmt;

use num_complex::Complex64;

use super::evalf;
use super::expand::expand;
use super::node::{Node, Sym};
use super::rational::tidy;
use super::symbol::Symbol;

/// Coefficients below this magnitude (relative to the largest) are treated
/// as zero when the polynomial is numeric and inexact.
const FLOAT_TOLERANCE: f64 = 1e-12;

/// A polynomial in one variable. Coefficients are stored lowest degree
/// first and never have trailing zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly {
    var: Symbol,
    coeffs: Vec<Sym>,
}

impl Poly {
    /// Build from coefficients, lowest degree first.
    pub fn new(var: Symbol, coeffs: Vec<Sym>) -> Self {
        let mut p = Poly { var, coeffs };
        p.trim();
        p
    }

    /// Build from coefficients, highest degree first.
    pub fn from_high_first(var: Symbol, mut coeffs: Vec<Sym>) -> Self {
        coeffs.reverse();
        Poly::new(var, coeffs)
    }

    pub fn zero(var: Symbol) -> Self {
        Poly {
            var,
            coeffs: Vec::new(),
        }
    }

    pub fn constant(var: Symbol, c: Sym) -> Self {
        Poly::new(var, vec![c])
    }

    /// The monomial `var`.
    pub fn monomial(var: Symbol) -> Self {
        Poly::new(var, vec![Sym::zero(), Sym::one()])
    }

    /// View `x` as a polynomial in `var`. Returns `None` if any term has a
    /// negative or non-integer power of `var` or `var` inside a function.
    pub fn from_sym(x: &Sym, var: &Symbol) -> Option<Poly> {
        let expanded = expand(x);
        let mut buckets: Vec<Vec<Sym>> = Vec::new();
        for term in expanded.terms() {
            let (k, c) = split_monomial(&term, var)?;
            if buckets.len() <= k {
                buckets.resize(k + 1, Vec::new());
            }
            buckets[k].push(c);
        }
        let coeffs = buckets.into_iter().map(|b| tidy(Sym::sum(b))).collect();
        Some(Poly::new(var.clone(), coeffs))
    }

    fn trim(&mut self) {
        let scale = self.float_scale();
        while let Some(last) = self.coeffs.last() {
            if is_negligible(last, scale) {
                self.coeffs.pop();
            } else {
                break;
            }
        }
    }

    /// Largest coefficient magnitude if any coefficient is a float.
    fn float_scale(&self) -> Option<f64> {
        let mut any_float = false;
        let mut scale: f64 = 0.0;
        for c in &self.coeffs {
            if let Some(n) = c.as_number() {
                any_float |= n.is_float();
                scale = scale.max(n.to_f64().abs());
            }
        }
        any_float.then_some(scale)
    }

    pub fn var(&self) -> &Symbol {
        &self.var
    }

    /// Coefficients, lowest degree first.
    pub fn coeffs(&self) -> &[Sym] {
        &self.coeffs
    }

    /// Coefficients, highest degree first.
    pub fn all_coeffs(&self) -> Vec<Sym> {
        if self.coeffs.is_empty() {
            return vec![Sym::zero()];
        }
        self.coeffs.iter().rev().cloned().collect()
    }

    pub fn coeff(&self, k: usize) -> Sym {
        self.coeffs.get(k).cloned().unwrap_or_else(Sym::zero)
    }

    /// Degree, `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    pub fn leading(&self) -> Sym {
        self.coeffs.last().cloned().unwrap_or_else(Sym::zero)
    }

    /// Lowest power with a nonzero coefficient.
    pub fn lowest_degree(&self) -> Option<usize> {
        self.coeffs.iter().position(|c| !c.is_zero())
    }

    pub fn to_sym(&self) -> Sym {
        let x = Sym::from(&self.var);
        Sym::sum(
            self.coeffs
                .iter()
                .enumerate()
                .map(|(k, c)| c * x.powi(k as i64))
                .collect::<Vec<_>>(),
        )
    }

    /// True if every coefficient is a number.
    pub fn is_numeric(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_number())
    }

    /// True if every coefficient is an exact rational.
    pub fn is_rational(&self) -> bool {
        self.coeffs
            .iter()
            .all(|c| matches!(c.as_number(), Some(n) if !n.is_float()))
    }

    /// Coefficients as complex floats (lowest first) when all are constant.
    pub fn to_complex(&self) -> Option<Vec<Complex64>> {
        self.coeffs.iter().map(evalf::to_complex).collect()
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let n = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..n)
            .map(|k| tidy(self.coeff(k) + other.coeff(k)))
            .collect();
        Poly::new(self.var.clone(), coeffs)
    }

    pub fn sub(&self, other: &Poly) -> Poly {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Poly {
        self.scale(&Sym::minus_one())
    }

    pub fn scale(&self, c: &Sym) -> Poly {
        let coeffs = self.coeffs.iter().map(|a| tidy(a * c)).collect();
        Poly::new(self.var.clone(), coeffs)
    }

    pub fn mul(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero(self.var.clone());
        }
        let mut out = vec![Vec::new(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j].push(a * b);
            }
        }
        let coeffs = out.into_iter().map(|v| tidy(Sym::sum(v))).collect();
        Poly::new(self.var.clone(), coeffs)
    }

    pub fn pow(&self, k: u32) -> Poly {
        let mut acc = Poly::constant(self.var.clone(), Sym::one());
        for _ in 0..k {
            acc = acc.mul(self);
        }
        acc
    }

    /// Long division. Returns `None` when dividing by zero.
    ///
    /// The top term is removed on each step even if coefficient
    /// simplification fails to produce an exact zero.
    pub fn divrem(&self, divisor: &Poly) -> Option<(Poly, Poly)> {
        let dd = divisor.degree()?;
        let lc = divisor.leading();
        let mut rem = self.coeffs.clone();
        if rem.len() <= dd {
            return Some((Poly::zero(self.var.clone()), self.clone()));
        }
        let mut quot = vec![Sym::zero(); rem.len() - dd];
        while rem.len() > dd {
            let k = rem.len() - 1 - dd;
            let Some(top) = rem.last() else { break };
            let c = tidy(top / &lc);
            for (i, dc) in divisor.coeffs.iter().enumerate() {
                rem[k + i] = tidy(&rem[k + i] - &c * dc);
            }
            quot[k] = c;
            rem.pop();
            let scale = Poly::new(self.var.clone(), rem.clone()).float_scale();
            while rem.last().map(|c| is_negligible(c, scale)).unwrap_or(false) {
                rem.pop();
            }
        }
        Some((
            Poly::new(self.var.clone(), quot),
            Poly::new(self.var.clone(), rem),
        ))
    }

    /// Division that must leave no remainder.
    pub fn exact_div(&self, divisor: &Poly) -> Option<Poly> {
        let (q, r) = self.divrem(divisor)?;
        r.is_zero().then_some(q)
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &Poly) -> Poly {
        let (mut a, mut b) = if self.degree() >= other.degree() {
            (self.clone(), other.clone())
        } else {
            (other.clone(), self.clone())
        };
        for _ in 0..64 {
            if b.is_zero() {
                break;
            }
            let r = match a.divrem(&b) {
                Some((_, r)) => r,
                None => break,
            };
            a = b;
            b = r;
        }
        if a.is_zero() {
            return a;
        }
        a.monic()
    }

    /// Divide by the leading coefficient.
    pub fn monic(&self) -> Poly {
        let lc = self.leading();
        if lc.is_zero() || lc.is_one() {
            return self.clone();
        }
        let inv = lc.recip();
        self.scale(&inv)
    }

    /// Evaluate at `x` by Horner's rule.
    pub fn eval(&self, x: &Sym) -> Sym {
        let mut acc = Sym::zero();
        for c in self.coeffs.iter().rev() {
            acc = tidy(acc * x + c);
        }
        acc
    }

    /// The polynomial `p(var + a)`.
    pub fn shift(&self, a: &Sym) -> Poly {
        let lin = Poly::new(self.var.clone(), vec![a.clone(), Sym::one()]);
        let mut acc = Poly::zero(self.var.clone());
        for c in self.coeffs.iter().rev() {
            acc = acc.mul(&lin).add(&Poly::constant(self.var.clone(), c.clone()));
        }
        acc
    }

    pub fn derivative(&self) -> Poly {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| tidy(c * Sym::int(k as i64)))
            .collect();
        Poly::new(self.var.clone(), coeffs)
    }

    /// Drop the `k` lowest coefficients (divide by `var^k`).
    pub fn shift_down(&self, k: usize) -> Poly {
        Poly::new(
            self.var.clone(),
            self.coeffs.iter().skip(k).cloned().collect(),
        )
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sym())
    }
}

fn is_negligible(c: &Sym, float_scale: Option<f64>) -> bool {
    if c.is_zero() {
        return true;
    }
    match (c.as_number(), float_scale) {
        (Some(n), Some(scale)) if n.is_float() => n.to_f64().abs() <= FLOAT_TOLERANCE * scale.max(1e-300),
        _ => false,
    }
}

/// Split a product into `(power of var, coefficient)`.
fn split_monomial(term: &Sym, var: &Symbol) -> Option<(usize, Sym)> {
    let mut k = 0usize;
    let mut rest = Vec::new();
    for factor in term.factors() {
        match factor.node() {
            Node::Symbol(s) if s == var => k += 1,
            Node::Pow(b, e) if b.as_symbol() == Some(var) => {
                let p = e.as_i64()?;
                if p < 0 {
                    return None;
                }
                k += p as usize;
            }
            _ => {
                if factor.has_symbol(var) {
                    return None;
                }
                rest.push(factor);
            }
        }
    }
    Some((k, Sym::product(rest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    fn s() -> (Symbol, Sym) {
        let v = symbol::s();
        (v.clone(), Sym::from(v))
    }

    #[test]
    fn test_from_sym_coefficients() {
        let (v, s) = s();
        let p = Poly::from_sym(&(s.powi(2) * Sym::int(3) + Sym::int(2)), &v).unwrap();
        assert_eq!(p.degree(), Some(2));
        assert_eq!(p.all_coeffs(), vec![Sym::int(3), Sym::zero(), Sym::int(2)]);
        assert!(Poly::from_sym(&s.recip(), &v).is_none());
    }

    #[test]
    fn test_divrem() {
        let (v, s) = s();
        let a = Poly::from_sym(&(s.powi(2) + Sym::int(3) * s.clone() + Sym::int(2)), &v).unwrap();
        let b = Poly::from_sym(&(s.clone() + Sym::one()), &v).unwrap();
        let (q, r) = a.divrem(&b).unwrap();
        assert!(r.is_zero());
        assert_eq!(q.to_sym(), s + Sym::int(2));
    }

    #[test]
    fn test_gcd_symbolic_coefficients() {
        let (v, s) = s();
        let r = Sym::symbol("R");
        let a = Poly::from_sym(&(r.clone() * s.clone() + Sym::one()), &v).unwrap();
        let b = Poly::from_sym(&(s.clone() * (r.clone() * s.clone() + Sym::one())), &v).unwrap();
        let g = a.gcd(&b);
        assert_eq!(g.to_sym(), s + r.recip());
    }

    #[test]
    fn test_shift_and_eval() {
        let (v, s) = s();
        let p = Poly::from_sym(&s.powi(2), &v).unwrap();
        let shifted = p.shift(&Sym::one());
        assert_eq!(shifted.eval(&Sym::int(2)), Sym::int(9));
    }
}
