//! Sign, reality and real/imaginary decomposition.
//!
//! The predicates here answer "known to be" questions: `false` means
//! "not known", never "known not to be".

use super::func::Func;
use super::node::{Constant, Node, Sym};

/// True if `x` is known to be real.
pub fn is_real(x: &Sym) -> bool {
    match x.node() {
        Node::Number(n) => !n.is_nan(),
        Node::Constant(c) => matches!(c, Constant::Pi | Constant::E | Constant::Infinity),
        Node::Symbol(s) => s.is_real(),
        Node::Add(xs) | Node::Mul(xs) => xs.iter().all(is_real),
        Node::Pow(b, e) => (is_real(b) && e.is_integer()) || (is_positive(b) && is_real(e)),
        Node::Apply(func, args) => match func {
            Func::Exp | Func::Sin | Func::Cos | Func::Tan | Func::Atan => is_real(&args[0]),
            Func::Log => is_positive(&args[0]),
            Func::Atan2 => args.iter().all(is_real),
            Func::Abs | Func::Re | Func::Im | Func::Arg => true,
            Func::Sign | Func::Conjugate => is_real(&args[0]),
            Func::Heaviside | Func::DiracDelta | Func::UnitImpulse => is_real(&args[0]),
            Func::Undefined(_) => false,
        },
        Node::Integral {
            integrand,
            lower,
            upper,
            ..
        } => is_real(integrand) && is_real(lower) && is_real(upper),
        Node::Derivative { expr, .. } => is_real(expr),
    }
}

/// True if `x` is known to be strictly positive.
pub fn is_positive(x: &Sym) -> bool {
    match x.node() {
        Node::Number(n) => n.is_positive(),
        Node::Constant(c) => matches!(c, Constant::Pi | Constant::E | Constant::Infinity),
        Node::Symbol(s) => s.is_positive(),
        Node::Add(xs) => xs.iter().all(is_positive),
        Node::Mul(xs) => sign_of_product(xs) == Some(true),
        Node::Pow(b, e) => {
            if is_positive(b) && is_real(e) {
                return true;
            }
            match e.as_i64() {
                Some(k) if k % 2 == 0 => is_positive(b) || is_negative(b),
                Some(_) => is_positive(b),
                None => false,
            }
        }
        Node::Apply(Func::Exp, args) => is_real(&args[0]),
        _ => false,
    }
}

/// True if `x` is known to be strictly negative.
pub fn is_negative(x: &Sym) -> bool {
    match x.node() {
        Node::Number(n) => n.is_negative(),
        Node::Add(xs) => xs.iter().all(is_negative),
        Node::Mul(xs) => sign_of_product(xs) == Some(false),
        Node::Pow(b, e) => match e.as_i64() {
            Some(k) if k % 2 != 0 => is_negative(b),
            _ => false,
        },
        _ => false,
    }
}

/// `Some(true)` for a known positive product, `Some(false)` for a known
/// negative one.
fn sign_of_product(xs: &[Sym]) -> Option<bool> {
    let mut positive = true;
    for x in xs {
        if is_positive(x) {
            continue;
        }
        if is_negative(x) {
            positive = !positive;
            continue;
        }
        return None;
    }
    Some(positive)
}

/// True if a part produced by [`split_complex`] has no unresolved `re`/`im`.
pub fn is_resolved(x: &Sym) -> bool {
    !x.any(&|y| matches!(y.node(), Node::Apply(Func::Re | Func::Im, _)))
}

/// Split `x` into real and imaginary parts.
///
/// Parts that cannot be separated are returned as unevaluated `re(..)` and
/// `im(..)` applications.
pub fn split_complex(x: &Sym) -> (Sym, Sym) {
    if is_real(x) {
        return (x.clone(), Sym::zero());
    }
    match x.node() {
        Node::Constant(Constant::I) => (Sym::zero(), Sym::one()),
        Node::Add(ts) => {
            let mut re = Vec::with_capacity(ts.len());
            let mut im = Vec::with_capacity(ts.len());
            for t in ts {
                let (r, i) = split_complex(t);
                re.push(r);
                im.push(i);
            }
            (Sym::sum(re), Sym::sum(im))
        }
        Node::Mul(fs) => {
            let mut re = Sym::one();
            let mut im = Sym::zero();
            for f in fs {
                let (c, d) = split_complex(f);
                let new_re = &re * &c - &im * &d;
                let new_im = &re * &d + &im * &c;
                re = new_re;
                im = new_im;
            }
            (re, im)
        }
        Node::Pow(b, e) => match e.as_i64() {
            Some(k) if k != 0 && k.abs() <= 16 => {
                let (br, bi) = split_complex(b);
                let mut re = Sym::one();
                let mut im = Sym::zero();
                for _ in 0..k.abs() {
                    let new_re = &re * &br - &im * &bi;
                    let new_im = &re * &bi + &im * &br;
                    re = new_re;
                    im = new_im;
                }
                if k < 0 {
                    let denom = re.powi(2) + im.powi(2);
                    (&re / &denom, -(&im / &denom))
                } else {
                    (re, im)
                }
            }
            _ => unresolved(x),
        },
        Node::Apply(Func::Exp, args) => {
            let (ar, ai) = split_complex(&args[0]);
            if ai.is_zero() {
                return (x.clone(), Sym::zero());
            }
            let mag = Sym::exp(ar);
            (&mag * Sym::cos(ai.clone()), &mag * Sym::sin(ai))
        }
        Node::Apply(Func::Conjugate, args) => {
            let (r, i) = split_complex(&args[0]);
            (r, -i)
        }
        _ => unresolved(x),
    }
}

fn unresolved(x: &Sym) -> (Sym, Sym) {
    (
        Sym::apply_raw(Func::Re, vec![x.clone()]),
        Sym::apply_raw(Func::Im, vec![x.clone()]),
    )
}

/// Complex conjugate.
pub fn conjugate(x: &Sym) -> Sym {
    if is_real(x) {
        return x.clone();
    }
    match x.node() {
        Node::Constant(Constant::I) => -Sym::i(),
        Node::Add(_) | Node::Mul(_) => x.map_args(conjugate),
        Node::Pow(b, e) if is_real(e) => Sym::pow(conjugate(b), e.clone()),
        Node::Apply(func @ (Func::Exp | Func::Sin | Func::Cos | Func::Tan), args) => {
            Sym::apply(func.clone(), vec![conjugate(&args[0])])
        }
        Node::Apply(Func::Conjugate, args) => args[0].clone(),
        _ => Sym::apply_raw(Func::Conjugate, vec![x.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    #[test]
    fn test_sign_predicates() {
        let r = Sym::symbol("R");
        assert!(is_positive(&r));
        assert!(is_negative(&(-r.clone())));
        assert!(is_positive(&(r.clone() * r.clone() + Sym::one())));
        let t = Sym::from(symbol::t());
        assert!(!is_positive(&t));
        assert!(is_real(&t));
    }

    #[test]
    fn test_split_rational_complex() {
        let w = Sym::symbol("w");
        // 1 / (1 + j w)
        let x = (Sym::one() + Sym::i() * w.clone()).recip();
        let (re, im) = split_complex(&x);
        let denom = Sym::one() + w.powi(2);
        assert_eq!(re, denom.recip());
        assert_eq!(im, -(w / denom));
    }

    #[test]
    fn test_split_complex_symbol_unresolved() {
        let s = Sym::from(symbol::s());
        let (re, _) = split_complex(&s);
        assert!(!is_resolved(&re));
    }

    #[test]
    fn test_conjugate() {
        let x = Sym::int(2) + Sym::int(3) * Sym::i();
        assert_eq!(conjugate(&x), Sym::int(2) - Sym::int(3) * Sym::i());
    }
}
