//! Elementary and generalized functions.
//!
//! [`Sym::apply`] evaluates a function application where a closed value is
//! known (`sin(0) = 0`, `Heaviside(3) = 1`, `exp(j*pi) = -1`, ...) and
//! otherwise returns the unevaluated application.

use std::sync::Arc;

use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::complex;
use super::node::{Constant, Node, Sym};
use super::number::Number;

/// Function heads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    Exp,
    Log,
    Sin,
    Cos,
    Tan,
    Atan,
    Atan2,
    Abs,
    Re,
    Im,
    Arg,
    Conjugate,
    Sign,
    Heaviside,
    /// Dirac delta; an optional second argument gives the derivative order.
    DiracDelta,
    /// Discrete unit impulse
    UnitImpulse,
    /// Undefined function such as `v(t)`
    Undefined(Arc<str>),
}

impl Func {
    pub fn name(&self) -> &str {
        match self {
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Atan => "atan",
            Func::Atan2 => "atan2",
            Func::Abs => "Abs",
            Func::Re => "re",
            Func::Im => "im",
            Func::Arg => "arg",
            Func::Conjugate => "conjugate",
            Func::Sign => "sign",
            Func::Heaviside => "Heaviside",
            Func::DiracDelta => "DiracDelta",
            Func::UnitImpulse => "UnitImpulse",
            Func::Undefined(name) => name,
        }
    }

    /// Look up a known function by any of its accepted spellings.
    pub fn from_name(name: &str) -> Option<Func> {
        let func = match name {
            "exp" => Func::Exp,
            "log" | "ln" => Func::Log,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "atan" | "arctan" => Func::Atan,
            "atan2" => Func::Atan2,
            "abs" | "Abs" => Func::Abs,
            "re" | "Re" => Func::Re,
            "im" | "Im" => Func::Im,
            "arg" | "angle" => Func::Arg,
            "conjugate" | "conj" => Func::Conjugate,
            "sign" => Func::Sign,
            "Heaviside" | "u" | "H" => Func::Heaviside,
            "DiracDelta" | "delta" => Func::DiracDelta,
            "UnitImpulse" | "unitimpulse" | "ui" => Func::UnitImpulse,
            _ => return None,
        };
        Some(func)
    }

    pub fn undefined(name: &str) -> Func {
        Func::Undefined(Arc::from(name))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Func::Undefined(_))
    }

    /// Generalized functions that are not ordinary pointwise functions.
    pub fn is_singular(&self) -> bool {
        matches!(self, Func::DiracDelta | Func::Heaviside | Func::UnitImpulse)
    }
}

impl Sym {
    /// Apply a function, evaluating where possible.
    pub fn apply(func: Func, args: Vec<Sym>) -> Sym {
        let evaluated = match (&func, args.as_slice()) {
            (Func::Exp, [x]) => eval_exp(x),
            (Func::Log, [x]) => eval_log(x),
            (Func::Sin, [x]) => eval_sin(x),
            (Func::Cos, [x]) => eval_cos(x),
            (Func::Tan, [x]) => eval_tan(x),
            (Func::Atan, [x]) => eval_atan(x),
            (Func::Atan2, [y, x]) => eval_atan2(y, x),
            (Func::Abs, [x]) => eval_abs(x),
            (Func::Re, [x]) => Some(complex::split_complex(x).0),
            (Func::Im, [x]) => Some(complex::split_complex(x).1),
            (Func::Arg, [x]) => eval_arg(x),
            (Func::Conjugate, [x]) => Some(complex::conjugate(x)),
            (Func::Sign, [x]) => eval_sign(x),
            (Func::Heaviside, [x]) => eval_heaviside(x),
            (Func::DiracDelta, [x]) => eval_delta(x),
            (Func::DiracDelta, [x, k]) => {
                if k.is_zero() {
                    return Sym::apply(Func::DiracDelta, vec![x.clone()]);
                }
                eval_delta(x)
            }
            (Func::UnitImpulse, [x]) => eval_unit_impulse(x),
            _ => None,
        };
        evaluated.unwrap_or_else(|| Sym::apply_raw(func, args))
    }

    /// Unevaluated application.
    pub(crate) fn apply_raw(func: Func, args: Vec<Sym>) -> Sym {
        Sym::from_node(Node::Apply(func, args))
    }

    pub fn exp(x: Sym) -> Sym {
        Sym::apply(Func::Exp, vec![x])
    }

    pub fn log(x: Sym) -> Sym {
        Sym::apply(Func::Log, vec![x])
    }

    pub fn sin(x: Sym) -> Sym {
        Sym::apply(Func::Sin, vec![x])
    }

    pub fn cos(x: Sym) -> Sym {
        Sym::apply(Func::Cos, vec![x])
    }

    pub fn atan2(y: Sym, x: Sym) -> Sym {
        Sym::apply(Func::Atan2, vec![y, x])
    }

    pub fn abs(x: Sym) -> Sym {
        Sym::apply(Func::Abs, vec![x])
    }

    pub fn re(x: Sym) -> Sym {
        Sym::apply(Func::Re, vec![x])
    }

    pub fn im(x: Sym) -> Sym {
        Sym::apply(Func::Im, vec![x])
    }

    pub fn heaviside(x: Sym) -> Sym {
        Sym::apply(Func::Heaviside, vec![x])
    }

    pub fn dirac_delta(x: Sym) -> Sym {
        Sym::apply(Func::DiracDelta, vec![x])
    }

    /// k-th derivative of the Dirac delta.
    pub fn dirac_delta_deriv(x: Sym, k: u32) -> Sym {
        if k == 0 {
            return Sym::dirac_delta(x);
        }
        Sym::apply(Func::DiracDelta, vec![x, Sym::int(k as i64)])
    }

    pub fn unit_impulse(x: Sym) -> Sym {
        Sym::apply(Func::UnitImpulse, vec![x])
    }

    /// Application of an undefined function such as `v(t)`.
    pub fn undefined(name: &str, args: Vec<Sym>) -> Sym {
        Sym::apply_raw(Func::undefined(name), args)
    }
}

fn as_float(x: &Sym) -> Option<f64> {
    match x.as_number() {
        Some(Number::Float(f)) => Some(*f),
        _ => None,
    }
}

/// Rational q such that `x = q * pi`.
fn pi_multiple(x: &Sym) -> Option<BigRational> {
    if x.is_zero() {
        return Some(BigRational::from_integer(0.into()));
    }
    let (c, rest) = x.as_coeff_mul();
    if rest != Sym::pi() {
        return None;
    }
    c.as_rational().cloned()
}

/// `true` if the numeric coefficient of `x` is negative.
fn has_negative_coeff(x: &Sym) -> bool {
    x.as_coeff_mul().0.is_negative()
}

fn eval_exp(x: &Sym) -> Option<Sym> {
    if x.is_zero() {
        return Some(Sym::one());
    }
    if *x == Sym::oo() {
        return Some(Sym::oo());
    }
    if *x == -Sym::oo() {
        return Some(Sym::zero());
    }
    if let Some(f) = as_float(x) {
        return Some(Sym::float(f.exp()));
    }
    if let Node::Apply(Func::Log, args) = x.node() {
        return Some(args[0].clone());
    }
    // exp(j*pi*q) for q a multiple of 1/2
    let (c, rest) = x.as_coeff_mul();
    if rest == Sym::pi() * Sym::i() {
        let q = c.as_rational()?;
        let twice = q * BigRational::from_integer(2.into());
        if twice.is_integer() {
            let k = twice.to_integer().to_i64()?.rem_euclid(4);
            return Some(match k {
                0 => Sym::one(),
                1 => Sym::i(),
                2 => Sym::minus_one(),
                _ => -Sym::i(),
            });
        }
    }
    None
}

fn eval_log(x: &Sym) -> Option<Sym> {
    if x.is_one() {
        return Some(Sym::zero());
    }
    if *x == Sym::e() {
        return Some(Sym::one());
    }
    if let Some(f) = as_float(x) {
        if f > 0.0 {
            return Some(Sym::float(f.ln()));
        }
    }
    if let Node::Apply(Func::Exp, args) = x.node() {
        if complex::is_real(&args[0]) {
            return Some(args[0].clone());
        }
    }
    None
}

/// sin(k * pi / 12) for the multiples with a compact closed form.
fn sin_twelfths(k: i64) -> Option<Sym> {
    let k = k.rem_euclid(24);
    if k >= 12 {
        return sin_twelfths(k - 12).map(|v| -v);
    }
    let half = Sym::half();
    Some(match k {
        0 | 12 => Sym::zero(),
        2 | 10 => half,
        3 | 9 => Sym::int(2).sqrt() * half,
        4 | 8 => Sym::int(3).sqrt() * half,
        6 => Sym::one(),
        _ => return None,
    })
}

fn twelfths(q: &BigRational) -> Option<i64> {
    let k = q * BigRational::from_integer(12.into());
    if k.is_integer() {
        k.to_integer().to_i64()
    } else {
        None
    }
}

fn eval_sin(x: &Sym) -> Option<Sym> {
    if let Some(f) = as_float(x) {
        return Some(Sym::float(f.sin()));
    }
    if let Some(q) = pi_multiple(x) {
        if let Some(k) = twelfths(&q) {
            if let Some(v) = sin_twelfths(k) {
                return Some(v);
            }
        }
    }
    if has_negative_coeff(x) {
        return Some(-Sym::sin(-x));
    }
    None
}

fn eval_cos(x: &Sym) -> Option<Sym> {
    if let Some(f) = as_float(x) {
        return Some(Sym::float(f.cos()));
    }
    if let Some(q) = pi_multiple(x) {
        if let Some(k) = twelfths(&q) {
            if let Some(v) = sin_twelfths(k + 6) {
                return Some(v);
            }
        }
    }
    if has_negative_coeff(x) {
        return Some(Sym::cos(-x));
    }
    None
}

fn eval_tan(x: &Sym) -> Option<Sym> {
    if x.is_zero() {
        return Some(Sym::zero());
    }
    if let Some(f) = as_float(x) {
        return Some(Sym::float(f.tan()));
    }
    if has_negative_coeff(x) {
        return Some(-Sym::apply(Func::Tan, vec![-x]));
    }
    None
}

fn eval_atan(x: &Sym) -> Option<Sym> {
    if x.is_zero() {
        return Some(Sym::zero());
    }
    if x.is_one() {
        return Some(Sym::pi() / Sym::int(4));
    }
    if *x == Sym::oo() {
        return Some(Sym::pi() / Sym::int(2));
    }
    if let Some(f) = as_float(x) {
        return Some(Sym::float(f.atan()));
    }
    if has_negative_coeff(x) {
        return Some(-Sym::apply(Func::Atan, vec![-x]));
    }
    None
}

fn eval_atan2(y: &Sym, x: &Sym) -> Option<Sym> {
    if y.is_zero() {
        if complex::is_positive(x) {
            return Some(Sym::zero());
        }
        if complex::is_negative(x) {
            return Some(Sym::pi());
        }
    }
    if x.is_zero() {
        if complex::is_positive(y) {
            return Some(Sym::pi() / Sym::int(2));
        }
        if complex::is_negative(y) {
            return Some(-Sym::pi() / Sym::int(2));
        }
    }
    if let (Some(yn), Some(xn)) = (y.as_number(), x.as_number()) {
        if yn.is_float() || xn.is_float() {
            return Some(Sym::float(yn.to_f64().atan2(xn.to_f64())));
        }
    }
    if complex::is_positive(x) {
        return Some(Sym::apply(Func::Atan, vec![y / x]));
    }
    None
}

fn eval_abs(x: &Sym) -> Option<Sym> {
    if let Some(n) = x.as_number() {
        return Some(Sym::number(n.abs()));
    }
    if complex::is_positive(x) {
        return Some(x.clone());
    }
    if complex::is_negative(x) {
        return Some(-x);
    }
    match x.node() {
        Node::Constant(Constant::I) => return Some(Sym::one()),
        Node::Mul(fs) => {
            return Some(Sym::product(
                fs.iter().map(|f| Sym::abs(f.clone())).collect::<Vec<_>>(),
            ))
        }
        Node::Pow(b, e) if complex::is_real(e) => return Some(Sym::pow(Sym::abs(b.clone()), e.clone())),
        Node::Apply(Func::Exp, args) => return Some(Sym::exp(Sym::re(args[0].clone()))),
        _ => {}
    }
    if x.free_symbols().is_empty() && !x.has_func(&|f| f.is_undefined()) {
        let (re, im) = complex::split_complex(x);
        if complex::is_resolved(&re) && complex::is_resolved(&im) {
            return Some((re.powi(2) + im.powi(2)).sqrt());
        }
    }
    None
}

fn eval_arg(x: &Sym) -> Option<Sym> {
    if complex::is_positive(x) {
        return Some(Sym::zero());
    }
    if complex::is_negative(x) {
        return Some(Sym::pi());
    }
    let (re, im) = complex::split_complex(x);
    if complex::is_resolved(&re) && complex::is_resolved(&im) {
        return Some(Sym::atan2(im, re));
    }
    None
}

fn eval_sign(x: &Sym) -> Option<Sym> {
    if x.is_zero() {
        return Some(Sym::zero());
    }
    if complex::is_positive(x) {
        return Some(Sym::one());
    }
    if complex::is_negative(x) {
        return Some(Sym::minus_one());
    }
    None
}

fn eval_heaviside(x: &Sym) -> Option<Sym> {
    if complex::is_positive(x) {
        return Some(Sym::one());
    }
    if complex::is_negative(x) {
        return Some(Sym::zero());
    }
    None
}

fn eval_delta(x: &Sym) -> Option<Sym> {
    if complex::is_positive(x) || complex::is_negative(x) {
        return Some(Sym::zero());
    }
    None
}

fn eval_unit_impulse(x: &Sym) -> Option<Sym> {
    if x.is_zero() {
        return Some(Sym::one());
    }
    if x.is_integer() || complex::is_positive(x) || complex::is_negative(x) {
        return Some(Sym::zero());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    #[test]
    fn test_trig_special_values() {
        assert_eq!(Sym::sin(Sym::zero()), Sym::zero());
        assert_eq!(Sym::cos(Sym::zero()), Sym::one());
        assert_eq!(Sym::sin(Sym::pi() / Sym::int(2)), Sym::one());
        assert_eq!(Sym::cos(Sym::pi()), Sym::minus_one());
    }

    #[test]
    fn test_trig_parity() {
        let x = Sym::symbol("x");
        assert_eq!(Sym::sin(-x.clone()), -Sym::sin(x.clone()));
        assert_eq!(Sym::cos(-x.clone()), Sym::cos(x));
    }

    #[test]
    fn test_exp_of_imaginary_pi() {
        assert_eq!(Sym::exp(Sym::i() * Sym::pi()), Sym::minus_one());
        assert_eq!(Sym::exp(Sym::i() * Sym::pi() / Sym::int(2)), Sym::i());
    }

    #[test]
    fn test_heaviside_values() {
        assert_eq!(Sym::heaviside(Sym::int(3)), Sym::one());
        assert_eq!(Sym::heaviside(Sym::int(-3)), Sym::zero());
        // H(0) is left unevaluated
        assert!(matches!(
            Sym::heaviside(Sym::zero()).node(),
            Node::Apply(Func::Heaviside, _)
        ));
        let t = Sym::from(symbol::t());
        assert!(matches!(Sym::heaviside(t).node(), Node::Apply(Func::Heaviside, _)));
    }

    #[test]
    fn test_unit_impulse_values() {
        assert_eq!(Sym::unit_impulse(Sym::zero()), Sym::one());
        assert_eq!(Sym::unit_impulse(Sym::int(2)), Sym::zero());
    }

    #[test]
    fn test_abs_of_positive_symbol() {
        let r = Sym::symbol("R");
        assert_eq!(Sym::abs(-r.clone()), r);
        assert_eq!(Sym::abs(Sym::int(3) + Sym::int(4) * Sym::i()), Sym::int(5));
    }
}
