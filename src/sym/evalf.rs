//! Floating-point evaluation of constant expressions.

use num_complex::Complex64;

use super::func::Func;
use super::node::{Constant, Node, Sym};
use super::number::Number;

/// Evaluate an expression without free symbols to a complex float.
pub fn to_complex(x: &Sym) -> Option<Complex64> {
    let value = match x.node() {
        Node::Number(n) => Complex64::new(n.to_f64(), 0.0),
        Node::Constant(c) => match c {
            Constant::Pi => Complex64::new(std::f64::consts::PI, 0.0),
            Constant::E => Complex64::new(std::f64::consts::E, 0.0),
            Constant::I => Complex64::new(0.0, 1.0),
            Constant::Infinity => Complex64::new(f64::INFINITY, 0.0),
            Constant::NaN => return None,
        },
        Node::Symbol(_) => return None,
        Node::Add(ts) => {
            let mut acc = Complex64::new(0.0, 0.0);
            for t in ts {
                acc += to_complex(t)?;
            }
            acc
        }
        Node::Mul(fs) => {
            let mut acc = Complex64::new(1.0, 0.0);
            for f in fs {
                acc *= to_complex(f)?;
            }
            acc
        }
        Node::Pow(b, e) => {
            let base = to_complex(b)?;
            match e.as_i64() {
                Some(k) if k.abs() < i32::MAX as i64 => base.powi(k as i32),
                _ => {
                    let exp = to_complex(e)?;
                    if exp.im == 0.0 && base.im == 0.0 && base.re >= 0.0 {
                        Complex64::new(base.re.powf(exp.re), 0.0)
                    } else {
                        base.powc(exp)
                    }
                }
            }
        }
        Node::Apply(func, args) => {
            let a = to_complex(args.first()?)?;
            match func {
                Func::Exp => a.exp(),
                Func::Log => a.ln(),
                Func::Sin => a.sin(),
                Func::Cos => a.cos(),
                Func::Tan => a.tan(),
                Func::Atan => a.atan(),
                Func::Atan2 => {
                    let x = to_complex(args.get(1)?)?;
                    Complex64::new(a.re.atan2(x.re), 0.0)
                }
                Func::Abs => Complex64::new(a.norm(), 0.0),
                Func::Re => Complex64::new(a.re, 0.0),
                Func::Im => Complex64::new(a.im, 0.0),
                Func::Arg => Complex64::new(a.arg(), 0.0),
                Func::Conjugate => a.conj(),
                Func::Sign => Complex64::new(
                    if a.re > 0.0 {
                        1.0
                    } else if a.re < 0.0 {
                        -1.0
                    } else {
                        0.0
                    },
                    0.0,
                ),
                Func::Heaviside => Complex64::new(if a.re >= 0.0 { 1.0 } else { 0.0 }, 0.0),
                Func::DiracDelta => {
                    if a.re == 0.0 {
                        return None;
                    }
                    Complex64::new(0.0, 0.0)
                }
                Func::UnitImpulse => Complex64::new(if a.re == 0.0 { 1.0 } else { 0.0 }, 0.0),
                Func::Undefined(_) => return None,
            }
        }
        Node::Integral { .. } | Node::Derivative { .. } => return None,
    };
    Some(value)
}

/// Evaluate a constant expression to a real float.
pub fn to_f64(x: &Sym) -> Option<f64> {
    let c = to_complex(x)?;
    if c.im.abs() <= 1e-12 * c.re.abs().max(1.0) {
        Some(c.re)
    } else {
        None
    }
}

/// Replace exact numbers and constants by floats, leaving symbols alone.
pub fn evalf(x: &Sym) -> Sym {
    match x.node() {
        Node::Number(n) => Sym::number(n.to_float()),
        Node::Constant(Constant::Pi) => Sym::float(std::f64::consts::PI),
        Node::Constant(Constant::E) => Sym::float(std::f64::consts::E),
        Node::Constant(_) | Node::Symbol(_) => x.clone(),
        Node::Pow(b, e) if e.is_integer() => Sym::pow(evalf(b), e.clone()),
        _ => {
            if x.free_symbols().is_empty() {
                if let Some(c) = to_complex(x) {
                    if c.im == 0.0 {
                        return Sym::float(c.re);
                    }
                    return Sym::float(c.re) + Sym::float(c.im) * Sym::i();
                }
            }
            x.map_args(evalf)
        }
    }
}

/// Replace floats by nearby rationals.
pub fn floatrat(x: &Sym) -> Sym {
    match x.node() {
        Node::Number(n @ Number::Float(_)) => Sym::number(n.to_rational()),
        Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => x.clone(),
        _ => x.map_args(floatrat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_complex() {
        let x = Sym::int(2).sqrt() * Sym::pi();
        let c = to_complex(&x).unwrap();
        assert_relative_eq!(c.re, 2f64.sqrt() * std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(c.im, 0.0);
    }

    #[test]
    fn test_evalf_keeps_symbols() {
        let x = Sym::symbol("x");
        let e = evalf(&(Sym::half() * x.clone()));
        assert_eq!(e, Sym::float(0.5) * x);
    }

    #[test]
    fn test_floatrat() {
        let e = floatrat(&Sym::float(0.25));
        assert_eq!(e, Sym::rational(1, 4));
    }
}
