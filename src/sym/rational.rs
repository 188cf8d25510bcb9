//! Rational normal form: numerator/denominator split, common-factor
//! cancellation and the zero test built on it.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::evalf;
use super::expand::expand;
use super::node::{Constant, Node, Sym};
use super::number::Number;
use super::poly::Poly;
use super::subs;

/// Relative tolerance of the zero test on expressions with floats.
const FLOAT_TOLERANCE: f64 = 1e-9;

/// Number of sample points of the numeric zero test.
const ZERO_SAMPLES: usize = 3;

/// Split `x` into numerator and denominator without expanding.
pub fn numer_denom(x: &Sym) -> (Sym, Sym) {
    match x.node() {
        Node::Number(Number::Rational(r)) => (
            Sym::integer(r.numer().clone()),
            Sym::integer(r.denom().clone()),
        ),
        Node::Mul(fs) => {
            let mut nums = Vec::with_capacity(fs.len());
            let mut dens = Vec::new();
            for f in fs {
                let (n, d) = numer_denom(f);
                nums.push(n);
                if !d.is_one() {
                    dens.push(d);
                }
            }
            (Sym::product(nums), Sym::product(dens))
        }
        Node::Pow(b, e) => {
            if let Some(en) = e.as_number() {
                if en.is_negative() {
                    if let Some(k) = en.as_i64() {
                        let (nb, db) = numer_denom(b);
                        return (db.powi(-k), nb.powi(-k));
                    }
                    return (Sym::one(), Sym::pow(b.clone(), -e));
                }
                if let Some(k) = en.as_i64() {
                    let (nb, db) = numer_denom(b);
                    return (nb.powi(k), db.powi(k));
                }
                return (x.clone(), Sym::one());
            }
            if e.as_coeff_mul().0.is_negative() {
                return (Sym::one(), Sym::pow(b.clone(), -e));
            }
            (x.clone(), Sym::one())
        }
        Node::Add(ts) => combine_over_lcm(ts),
        _ => (x.clone(), Sym::one()),
    }
}

/// Factorization of a denominator into integer content and base powers.
fn denom_factors(d: &Sym) -> (BigInt, BTreeMap<Sym, i64>) {
    let mut content = BigInt::one();
    let mut bases = BTreeMap::new();
    for f in d.factors() {
        match f.node() {
            Node::Number(n) => match n.as_integer() {
                Some(i) => content *= i.abs(),
                None => *bases.entry(f.clone()).or_insert(0) += 1,
            },
            _ => {
                let (b, e) = f.as_base_exp();
                match e.as_i64() {
                    Some(k) if k > 0 => *bases.entry(b).or_insert(0) += k,
                    _ => *bases.entry(f.clone()).or_insert(0) += 1,
                }
            }
        }
    }
    (content, bases)
}

fn combine_over_lcm(terms: &[Sym]) -> (Sym, Sym) {
    let parts: Vec<(Sym, Sym)> = terms.iter().map(numer_denom).collect();
    if parts.iter().all(|(_, d)| d.is_one()) {
        return (Sym::sum(terms.to_vec()), Sym::one());
    }

    let factored: Vec<(BigInt, BTreeMap<Sym, i64>)> =
        parts.iter().map(|(_, d)| denom_factors(d)).collect();
    let mut lcm_content = BigInt::one();
    let mut lcm_bases: BTreeMap<Sym, i64> = BTreeMap::new();
    for (content, bases) in &factored {
        lcm_content = lcm_content.lcm(content);
        for (b, k) in bases {
            let entry = lcm_bases.entry(b.clone()).or_insert(0);
            *entry = (*entry).max(*k);
        }
    }

    let mut numer_terms = Vec::with_capacity(parts.len());
    for ((n, _), (content, bases)) in parts.iter().zip(factored.iter()) {
        let mut factors = vec![n.clone(), Sym::integer(&lcm_content / content)];
        for (b, k) in &lcm_bases {
            let have = bases.get(b).copied().unwrap_or(0);
            if *k > have {
                factors.push(b.powi(k - have));
            }
        }
        numer_terms.push(Sym::product(factors));
    }

    let mut denom_factors = vec![Sym::integer(lcm_content)];
    for (b, k) in lcm_bases {
        denom_factors.push(b.powi(k));
    }
    (Sym::sum(numer_terms), Sym::product(denom_factors))
}

/// `n / d` as a single quotient, without cancellation.
pub fn together(x: &Sym) -> Sym {
    let (n, d) = numer_denom(x);
    n * d.recip()
}

/// Cheap normalization for polynomial coefficients.
pub(crate) fn tidy(c: Sym) -> Sym {
    if c.is_number() {
        return c;
    }
    if c.free_symbols().is_empty() {
        return expand(&c);
    }
    cancel(&c)
}

/// Rational normal form: expanded numerator over expanded denominator with
/// common factors removed.
pub fn cancel(x: &Sym) -> Sym {
    match x.node() {
        Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => return x.clone(),
        _ => {}
    }
    let (n, d) = numer_denom(x);
    let n = expand(&n);
    if n.is_zero() {
        return Sym::zero();
    }
    let d = expand(&d);
    if d.is_one() {
        return n;
    }
    if d.is_number() {
        return n * d.recip();
    }
    let (n, d) = cancel_pair(n, d);
    if d.is_one() {
        return n;
    }
    n * d.recip()
}

/// Numerator and denominator after cancellation, both expanded.
pub fn cancel_parts(x: &Sym) -> (Sym, Sym) {
    let (n, d) = numer_denom(x);
    let n = expand(&n);
    let d = expand(&d);
    if n.is_zero() {
        return (Sym::zero(), Sym::one());
    }
    if d.is_number() {
        return (expand(&(n * d.recip())), Sym::one());
    }
    cancel_pair(n, d)
}

fn cancel_pair(n: Sym, d: Sym) -> (Sym, Sym) {
    let (mut n, mut d) = remove_numeric_content(n, d);
    let (n2, d2) = remove_monomial_content(n, d);
    n = n2;
    d = d2;

    let symbols: Vec<_> = d.free_symbols().into_iter().collect();
    for var in symbols {
        if !n.has_symbol(&var) || !d.has_symbol(&var) {
            continue;
        }
        let (Some(pn), Some(pd)) = (Poly::from_sym(&n, &var), Poly::from_sym(&d, &var)) else {
            continue;
        };
        if pd.is_constant() || pn.is_constant() {
            continue;
        }
        let g = pn.gcd(&pd);
        if g.degree().unwrap_or(0) == 0 {
            continue;
        }
        let (Some(qn), Some(qd)) = (pn.exact_div(&g), pd.exact_div(&g)) else {
            continue;
        };
        let ratio = qn.to_sym() * qd.to_sym().recip();
        let (rn, rd) = numer_denom(&ratio);
        n = expand(&rn);
        d = expand(&rd);
        let (n3, d3) = remove_monomial_content(n, d);
        n = n3;
        d = d3;
    }

    let (n, d) = remove_numeric_content(n, d);
    normalize_sign(n, d)
}

/// Scale numerator and denominator so that all coefficients are coprime
/// integers.
fn remove_numeric_content(n: Sym, d: Sym) -> (Sym, Sym) {
    let mut coeffs: Vec<BigRational> = Vec::new();
    for term in n.terms().iter().chain(d.terms().iter()) {
        match term.as_coeff_mul().0 {
            Number::Rational(r) => coeffs.push(r),
            Number::Float(_) => return (n, d),
        }
    }
    let mut lcm = BigInt::one();
    for c in &coeffs {
        lcm = lcm.lcm(c.denom());
    }
    let mut gcd = BigInt::zero();
    for c in &coeffs {
        let scaled = (c * BigRational::from_integer(lcm.clone())).to_integer();
        gcd = gcd.gcd(&scaled);
    }
    if gcd.is_zero() {
        return (n, d);
    }
    let scale = BigRational::new(lcm, gcd);
    if scale.is_one() {
        return (n, d);
    }
    let s = Sym::number(Number::Rational(scale));
    (expand(&(&n * &s)), expand(&(&d * &s)))
}

/// Positive integer powers of bases shared by every term.
fn monomial_content(terms: &[Sym]) -> BTreeMap<Sym, i64> {
    let mut common: Option<BTreeMap<Sym, i64>> = None;
    for term in terms {
        let mut here = BTreeMap::new();
        for f in term.factors() {
            if f.is_number() {
                continue;
            }
            let (b, e) = f.as_base_exp();
            if let Some(k) = e.as_i64() {
                if k > 0 {
                    *here.entry(b).or_insert(0) += k;
                }
            }
        }
        common = Some(match common {
            None => here,
            Some(prev) => prev
                .into_iter()
                .filter_map(|(b, k)| here.get(&b).map(|h| (b, k.min(*h))))
                .collect(),
        });
        if common.as_ref().map(|c| c.is_empty()).unwrap_or(false) {
            break;
        }
    }
    common.unwrap_or_default()
}

fn remove_monomial_content(n: Sym, d: Sym) -> (Sym, Sym) {
    let mut all = n.terms();
    all.extend(d.terms());
    let common = monomial_content(&all);
    if common.is_empty() {
        return (n, d);
    }
    let divisor = Sym::product(
        common
            .into_iter()
            .map(|(b, k)| b.powi(-k))
            .collect::<Vec<_>>(),
    );
    (expand(&(&n * &divisor)), expand(&(&d * &divisor)))
}

/// Total degree of a term in its free symbols.
fn term_degree(term: &Sym) -> i64 {
    term.factors()
        .iter()
        .map(|f| match f.node() {
            Node::Symbol(_) => 1,
            Node::Pow(b, e) if b.as_symbol().is_some() => e.as_i64().unwrap_or(0),
            _ => 0,
        })
        .sum()
}

/// Make the leading term of the denominator positive.
fn normalize_sign(n: Sym, d: Sym) -> (Sym, Sym) {
    let terms = d.terms();
    let leading = terms.iter().max_by(|a, b| {
        term_degree(a)
            .cmp(&term_degree(b))
            .then_with(|| b.cmp(a))
    });
    match leading {
        Some(t) if t.as_coeff_mul().0.is_negative() => (expand(&-n), expand(&-d)),
        _ => (n, d),
    }
}

/// Semantic zero test: the expanded numerator vanishes. Expressions with
/// floats are tested numerically instead.
pub fn is_zero(x: &Sym) -> bool {
    if x.is_zero() {
        return true;
    }
    if has_float(x) {
        if let Some(zero) = numeric_zero(x) {
            return zero;
        }
    }
    let (n, _) = numer_denom(x);
    expand(&n).is_zero()
}

/// Simplify function arguments, then cancel. Expressions with complex
/// floats (numerically found roots, say) only have their constant parts
/// collapsed.
pub fn simplify(x: &Sym) -> Sym {
    match x.node() {
        Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => x.clone(),
        _ if has_complex_float(x) => evalf::evalf(x),
        _ => cancel(&x.map_args(simplify)),
    }
}

pub(crate) fn has_float(x: &Sym) -> bool {
    x.any(&|y| matches!(y.as_number(), Some(n) if n.is_float()))
}

fn has_complex_float(x: &Sym) -> bool {
    has_float(x) && x.any(&|y| matches!(y.node(), Node::Constant(Constant::I)))
}

/// Evaluate `x` at a few complex points and compare against the size of
/// its terms. `None` if some term cannot be evaluated.
fn numeric_zero(x: &Sym) -> Option<bool> {
    let symbols: Vec<_> = x.free_symbols().into_iter().collect();
    for k in 0..ZERO_SAMPLES {
        let pairs: Vec<_> = symbols
            .iter()
            .enumerate()
            .map(|(i, var)| {
                let re = 0.5 + 0.731 * (k + 1) as f64 + 0.17 * i as f64;
                let im = 0.3 + 0.413 * ((k + 1) * (i + 1)) as f64;
                (var.clone(), Sym::float(re) + Sym::float(im) * Sym::i())
            })
            .collect();
        let y = subs::subs_many(x, &pairs);
        let mut total = num_complex::Complex64::new(0.0, 0.0);
        let mut scale: f64 = 1.0;
        for term in y.terms() {
            let c = evalf::to_complex(&term)?;
            total += c;
            scale = scale.max(c.norm());
        }
        if !(total.norm() <= FLOAT_TOLERANCE * scale) {
            return Some(false);
        }
    }
    Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    fn s() -> Sym {
        Sym::from(symbol::s())
    }

    #[test]
    fn test_numer_denom_of_sum() {
        let x = Sym::one() / s() + Sym::one() / (s() + Sym::one());
        let (n, d) = numer_denom(&x);
        assert_eq!(expand(&n), Sym::int(2) * s() + Sym::one());
        assert_eq!(expand(&d), s().powi(2) + s());
    }

    #[test]
    fn test_cancel_common_factor() {
        let x = (s() + Sym::one()) / (s().powi(2) + Sym::int(3) * s() + Sym::int(2));
        assert_eq!(cancel(&x), (s() + Sym::int(2)).recip());
    }

    #[test]
    fn test_cancel_symbolic() {
        let r = Sym::symbol("R");
        let c = Sym::symbol("C");
        let x = (r.clone() * c.clone() * s() + Sym::one()) / (r.clone() * c.clone() * s().powi(2) + s());
        assert_eq!(cancel(&x), s().recip());
    }

    #[test]
    fn test_is_zero() {
        let x = Sym::one() / (s() + Sym::one()) - Sym::one() / (Sym::one() + s());
        assert!(is_zero(&x));
        let y = Sym::int(2) / (Sym::int(2) * s()) - s().recip();
        assert!(is_zero(&y));
    }

    #[test]
    fn test_is_zero_with_complex_floats() {
        let p = Sym::float(0.5) + Sym::float(1.25) * Sym::i();
        let q = Sym::float(0.5) - Sym::float(1.25) * Sym::i();
        let x = Sym::one() / (s() - &p) + Sym::one() / (s() - &q);
        let y = (Sym::int(2) * s() - Sym::int(1)) / (s().powi(2) - s() + Sym::float(1.8125));
        assert!(is_zero(&(x.clone() - y)));
        assert!(!is_zero(&(x - (s() + Sym::one()).recip())));
        assert!(is_zero(&(Sym::float(0.1) + Sym::float(0.2) - Sym::float(0.3))));
    }

    #[test]
    fn test_sign_normalized() {
        let x = Sym::one() / (-s() - Sym::one());
        assert_eq!(cancel(&x), -(s() + Sym::one()).recip());
    }
}
