//! Polynomial root finding.
//!
//! Exact for linear and quadratic factors and for rational roots of
//! rational polynomials. Anything left over with constant coefficients is
//! handed to a Durand-Kerner iteration; symbolic polynomials of higher
//! degree are not solved.

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::complex;
use super::node::Sym;
use super::number::Number;
use super::poly::Poly;
use super::rational::{self, simplify};

/// Assumed damping of quadratic factors with symbolic coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damping {
    /// Real distinct roots.
    Over,
    /// Complex conjugate roots.
    Under,
    /// Repeated real root.
    Critical,
}

impl Damping {
    pub fn from_name(name: &str) -> Option<Damping> {
        match name {
            "over" => Some(Damping::Over),
            "under" => Some(Damping::Under),
            "critical" => Some(Damping::Critical),
            _ => None,
        }
    }
}

const MAX_ITERATIONS: usize = 500;
const CONVERGENCE: f64 = 1e-14;
const CLUSTER: f64 = 1e-6;
const MAX_DIVISOR_SEARCH: u64 = 1_000_000_000_000;

/// Roots of `p` with multiplicities, or `None` if they cannot be found.
pub fn roots(p: &Poly, damping: Option<Damping>) -> Option<Vec<(Sym, usize)>> {
    let mut found: Vec<(Sym, usize)> = Vec::new();
    let Some(degree) = p.degree() else {
        return Some(found);
    };
    if degree == 0 {
        return Some(found);
    }

    let mut rest = p.clone();
    if let Some(k) = rest.lowest_degree() {
        if k > 0 {
            push_root(&mut found, Sym::zero(), k);
            rest = rest.shift_down(k);
        }
    }

    if rest.is_rational() {
        rest = strip_rational_roots(&rest, &mut found);
    }

    match rest.degree() {
        None | Some(0) => {}
        Some(1) => {
            let r = simplify(&(-rest.coeff(0) / rest.coeff(1)));
            push_root(&mut found, r, 1);
        }
        Some(2) => {
            for (r, m) in quadratic(&rest.coeff(2), &rest.coeff(1), &rest.coeff(0), damping) {
                push_root(&mut found, r, m);
            }
        }
        Some(_) => {
            let coeffs = rest.to_complex()?;
            log::debug!("numeric root finding for degree {:?} polynomial", rest.degree());
            for (r, m) in durand_kerner(&coeffs)? {
                push_root(&mut found, complex_to_sym(r), m);
            }
        }
    }
    Some(found)
}

/// Roots repeated according to multiplicity.
pub fn roots_flat(p: &Poly, damping: Option<Damping>) -> Option<Vec<Sym>> {
    let rs = roots(p, damping)?;
    Some(
        rs.into_iter()
            .flat_map(|(r, m)| std::iter::repeat(r).take(m))
            .collect(),
    )
}

fn push_root(found: &mut Vec<(Sym, usize)>, r: Sym, m: usize) {
    if let Some(entry) = found
        .iter_mut()
        .find(|(existing, _)| rational::is_zero(&(existing.clone() - &r)))
    {
        entry.1 += m;
    } else {
        found.push((r, m));
    }
}

fn quadratic(a: &Sym, b: &Sym, c: &Sym, damping: Option<Damping>) -> Vec<(Sym, usize)> {
    let two_a = Sym::int(2) * a;
    let centre = simplify(&(-b / &two_a));
    let disc = simplify(&(b.powi(2) - Sym::int(4) * a * c));
    if rational::is_zero(&disc) || damping == Some(Damping::Critical) {
        return vec![(centre, 2)];
    }
    let under = damping == Some(Damping::Under) || complex::is_negative(&disc);
    if under {
        let w = simplify(&((-disc).sqrt() / &two_a));
        let j = Sym::i();
        return vec![
            (&centre - &j * &w, 1),
            (&centre + &j * &w, 1),
        ];
    }
    let root_disc = disc.sqrt();
    vec![
        (simplify(&((-b - &root_disc) / &two_a)), 1),
        (simplify(&((-b + &root_disc) / &two_a)), 1),
    ]
}

/// Divide out every rational root, returning the deflated polynomial.
fn strip_rational_roots(p: &Poly, found: &mut Vec<(Sym, usize)>) -> Poly {
    let Some(ints) = integer_coeffs(p) else {
        return p.clone();
    };
    let (Some(a0), Some(an)) = (ints.first(), ints.last()) else {
        return p.clone();
    };
    let (Some(ps), Some(qs)) = (divisors(a0), divisors(an)) else {
        return p.clone();
    };

    let mut rest = p.clone();
    for q in &qs {
        for num in &ps {
            if num.gcd(q) != 1 {
                continue;
            }
            for sign in [1i64, -1] {
                let Some(candidate) = Number::rational(sign * *num as i64, *q as i64) else {
                    continue;
                };
                let r = Sym::number(candidate);
                let factor = Poly::new(p.var().clone(), vec![-r.clone(), Sym::one()]);
                let mut multiplicity = 0;
                while rest.degree().unwrap_or(0) > 0 && rest.eval(&r).is_zero() {
                    match rest.exact_div(&factor) {
                        Some(quotient) => {
                            rest = quotient;
                            multiplicity += 1;
                        }
                        None => break,
                    }
                }
                if multiplicity > 0 {
                    push_root(found, r, multiplicity);
                }
                if rest.degree().unwrap_or(0) == 0 {
                    return rest;
                }
            }
        }
    }
    rest
}

fn integer_coeffs(p: &Poly) -> Option<Vec<BigInt>> {
    let rats: Vec<_> = p
        .coeffs()
        .iter()
        .map(|c| c.as_number().and_then(|n| n.as_rational().cloned()))
        .collect::<Option<Vec<_>>>()?;
    let lcm = rats
        .iter()
        .fold(BigInt::one(), |acc, r| acc.lcm(r.denom()));
    Some(
        rats.iter()
            .map(|r| (r * num_rational::BigRational::from_integer(lcm.clone())).to_integer())
            .collect(),
    )
}

/// Positive divisors of `n`, or `None` if `n` is too large to factor.
fn divisors(n: &BigInt) -> Option<Vec<u64>> {
    if n.is_zero() {
        return None;
    }
    let n = n.abs().to_u64()?;
    if n > MAX_DIVISOR_SEARCH {
        return None;
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d != n / d {
                large.push(n / d);
            }
        }
        d += 1;
    }
    large.reverse();
    small.extend(large);
    Some(small)
}

/// Simultaneous iteration on all roots. `coeffs` are lowest degree first.
fn durand_kerner(coeffs: &[Complex64]) -> Option<Vec<(Complex64, usize)>> {
    let n = coeffs.len().checked_sub(1)?;
    let lead = *coeffs.last()?;
    if lead.norm() == 0.0 {
        return None;
    }
    let monic: Vec<Complex64> = coeffs.iter().map(|c| c / lead).collect();
    let eval = |x: Complex64| monic.iter().rev().fold(Complex64::new(0.0, 0.0), |acc, c| acc * x + c);

    let seed = Complex64::new(0.4, 0.9);
    let mut zs: Vec<Complex64> = (0..n).map(|k| seed.powu(k as u32)).collect();
    for _ in 0..MAX_ITERATIONS {
        let mut delta: f64 = 0.0;
        for i in 0..n {
            let mut denom = Complex64::new(1.0, 0.0);
            for j in 0..n {
                if i != j {
                    denom *= zs[i] - zs[j];
                }
            }
            if denom.norm() == 0.0 {
                denom = Complex64::new(CONVERGENCE, 0.0);
            }
            let step = eval(zs[i]) / denom;
            zs[i] -= step;
            delta = delta.max(step.norm());
        }
        if delta < CONVERGENCE {
            break;
        }
    }

    let mut clustered: Vec<(Complex64, usize)> = Vec::new();
    for z in zs {
        let scale = z.norm().max(1.0);
        match clustered
            .iter_mut()
            .find(|(c, m)| ((*c / *m as f64) - z).norm() < CLUSTER.sqrt() * scale)
        {
            Some((c, m)) => {
                *c += z;
                *m += 1;
            }
            None => clustered.push((z, 1)),
        }
    }
    Some(
        clustered
            .into_iter()
            .map(|(c, m)| (c / m as f64, m))
            .collect(),
    )
}

pub(crate) fn complex_to_sym(z: Complex64) -> Sym {
    let scale = z.norm().max(1.0);
    let re = if z.re.abs() < CLUSTER * scale { 0.0 } else { z.re };
    let im = if z.im.abs() < CLUSTER * scale { 0.0 } else { z.im };
    if im == 0.0 {
        Sym::float(re)
    } else {
        Sym::float(re) + Sym::float(im) * Sym::i()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::evalf;
    use crate::sym::symbol;
    use approx::assert_relative_eq;

    fn poly(coeffs_high_first: &[i64]) -> Poly {
        Poly::from_high_first(
            symbol::s(),
            coeffs_high_first.iter().map(|c| Sym::int(*c)).collect(),
        )
    }

    #[test]
    fn test_rational_roots_with_multiplicity() {
        // (s + 1)^2 (s - 2)
        let p = poly(&[1, 0, -3, -2]);
        let rs = roots(&p, None).unwrap();
        assert!(rs.contains(&(Sym::int(-1), 2)));
        assert!(rs.contains(&(Sym::int(2), 1)));
    }

    #[test]
    fn test_zero_roots_extracted() {
        let p = poly(&[1, 3, 0, 0]);
        let rs = roots(&p, None).unwrap();
        assert!(rs.contains(&(Sym::zero(), 2)));
        assert!(rs.contains(&(Sym::int(-3), 1)));
    }

    #[test]
    fn test_complex_quadratic() {
        // s^2 + 2s + 5 -> -1 +- 2j
        let p = poly(&[1, 2, 5]);
        let rs = roots(&p, None).unwrap();
        let expected = Sym::int(-1) + Sym::int(2) * Sym::i();
        assert!(rs.iter().any(|(r, m)| *m == 1 && rational::is_zero(&(r.clone() - &expected))));
    }

    #[test]
    fn test_symbolic_quadratic_damping() {
        let s = symbol::s();
        let a = Sym::symbol("a");
        let p = Poly::new(s, vec![a.powi(2), Sym::int(2) * a.clone(), Sym::one()]);
        let rs = roots(&p, Some(Damping::Critical)).unwrap();
        assert_eq!(rs, vec![(-a, 2)]);
    }

    #[test]
    fn test_numeric_cubic() {
        // s^3 + s + 1 has one real root near -0.6823
        let p = poly(&[1, 0, 1, 1]);
        let rs = roots(&p, None).unwrap();
        assert_eq!(rs.len(), 3);
        let real: Vec<f64> = rs.iter().filter_map(|(r, _)| evalf::to_f64(r)).collect();
        assert_eq!(real.len(), 1);
        assert_relative_eq!(real[0], -0.682_327_803_828_019_3, epsilon = 1e-9);
    }

    #[test]
    fn test_damping_names() {
        assert_eq!(Damping::from_name("under"), Some(Damping::Under));
        assert_eq!(Damping::from_name("wobbly"), None);
    }
}
