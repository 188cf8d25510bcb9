//! Fourier transform pairs, in ordinary (`f`) and angular (`omega`)
//! frequency.
//!
//! Sinusoids and constants map to Dirac deltas. Causal decaying signals go
//! through the Laplace table with `s = j 2 pi f`.

use crate::error::{Result, SymCircuitError};
use crate::expr::Assumptions;
use crate::ratfun::{self, PoleTerm, Ratfun};
use crate::sym::{calculus, complex, expand::expand, rational, subs, symbol, Func, Node, Sym, Symbol};

use super::laplace::{self, pole_signal};
use super::{as_undefined, conjugate_name, normalize_deltas, split_const};

const FORWARD: &str = "Fourier transform";
const INVERSE: &str = "inverse Fourier transform";

fn j2pi() -> Sym {
    Sym::int(2) * Sym::pi() * Sym::i()
}

/// Fourier transform of `x(t)`.
pub fn fourier_transform(x: &Sym, t: &Symbol, f: &Symbol) -> Result<Sym> {
    let mut out = Vec::new();
    for term in expand(x).terms() {
        out.push(transform_term(&term, t, f)?);
    }
    Ok(Sym::sum(out))
}

fn transform_term(term: &Sym, t: &Symbol, f: &Symbol) -> Result<Sym> {
    let fail = |message: &str| SymCircuitError::transform_undefined(FORWARD, term, message);
    let fv = Sym::from(f);
    let (c, rest) = split_const(term, t);
    if rest.is_one() {
        return Ok(c * Sym::dirac_delta(fv));
    }

    let factors = rest.factors();
    if let Some(i) = factors
        .iter()
        .position(|g| matches!(g.as_apply(), Some((Func::DiracDelta, args)) if args.len() == 1))
    {
        let (a, b) = calculus::linear_coeffs(&factors[i].args()[0], t)
            .ok_or_else(|| fail("impulse argument is not linear in t"))?;
        let root = rational::simplify(&(-b / &a));
        let others = Sym::product(
            factors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, g)| g.clone())
                .collect::<Vec<_>>(),
        );
        let value = subs::subs(&others, t, &root);
        return Ok(c * value * Sym::exp(-(j2pi() * fv * root)) / Sym::abs(a));
    }

    if let Some((name, arg)) = as_undefined(&rest) {
        let (a, b) = calculus::linear_coeffs(arg, t)
            .ok_or_else(|| fail("argument is not linear in t"))?;
        let image = Sym::undefined(&conjugate_name(name, true), vec![fv.clone() / &a]);
        let shift = Sym::exp(j2pi() * fv * b / &a);
        return Ok(c * image * shift / Sym::abs(a));
    }

    let step = Sym::heaviside(Sym::from(t));
    if rest == step {
        let s = Sym::half() * Sym::dirac_delta(fv.clone()) + (j2pi() * fv).recip();
        return Ok(c * s);
    }

    if !rest.has_func(&|g: &Func| g.is_singular()) {
        let exps = euler(&factors, t).ok_or_else(|| fail("no table entry"))?;
        let mut out = Vec::new();
        for (k, alpha) in exps {
            let (re, im) = complex::split_complex(&alpha);
            if !rational::is_zero(&re) {
                return Err(fail("not absolutely integrable, use causal=true"));
            }
            let f0 = rational::simplify(&(im / (Sym::int(2) * Sym::pi())));
            out.push(k * Sym::dirac_delta(&fv - f0));
        }
        return Ok(c * Sym::sum(out));
    }

    // Causal signals with decaying poles have an absolutely convergent
    // Laplace transform whose j-axis restriction is the Fourier transform.
    let s = symbol::s();
    let image = laplace::laplace_transform(&rest, t, &s)?;
    let (_, d) = ratfun::as_n_d(&image, &s, false);
    let rf = Ratfun::from_sym(&(Sym::one() / d), &s).ok_or_else(|| fail("no table entry"))?;
    let poles = rf.poles(None).ok_or_else(|| fail("cannot find the poles"))?;
    if !poles.iter().all(|(p, _)| complex::is_negative(&complex::split_complex(p).0)) {
        return Err(fail("Laplace transform does not converge on the imaginary axis"));
    }
    let result = subs::subs(&image, &s, &(j2pi() * fv));
    Ok(rational::cancel(&(c * result)))
}

/// Products of exponentials and sinusoids as a sum of `k exp(alpha t)`.
fn euler(factors: &[Sym], t: &Symbol) -> Option<Vec<(Sym, Sym)>> {
    let mut acc = vec![(Sym::one(), Sym::zero())];
    for g in factors {
        let (func, args) = g.as_apply()?;
        let (p, q) = calculus::linear_coeffs(&args[0], t)?;
        let j = Sym::i();
        let pieces = match func {
            Func::Exp => vec![(Sym::exp(q), p)],
            Func::Cos => vec![
                (Sym::half() * Sym::exp(&j * &q), &j * &p),
                (Sym::half() * Sym::exp(-(&j * &q)), -(&j * &p)),
            ],
            Func::Sin => {
                let k = (Sym::int(2) * &j).recip();
                vec![
                    (&k * Sym::exp(&j * &q), &j * &p),
                    (-(k * Sym::exp(-(&j * &q))), -(&j * &p)),
                ]
            }
            _ => return None,
        };
        acc = acc
            .iter()
            .flat_map(|(k, a)| pieces.iter().map(move |(kp, ap)| (k * kp, a + ap)))
            .collect();
    }
    Some(acc)
}

/// Inverse Fourier transform of `x(f)`.
///
/// Deltas, linear-phase exponentials and undefined functions are matched
/// term by term; the remaining rational part is split by the half plane of
/// its poles, giving causal, two-sided and anticausal pieces.
pub fn inverse_fourier_transform(x: &Sym, f: &Symbol, t: &Symbol) -> Result<Sym> {
    let fail = |message: &str| SymCircuitError::transform_undefined(INVERSE, x, message);
    let tv = Sym::from(t);
    let mut out = Vec::new();
    let mut rational_part = Vec::new();
    for term in expand(x).terms() {
        let (c, rest) = split_const(&term, f);
        if rest.is_one() {
            out.push(c * Sym::dirac_delta(tv.clone()));
            continue;
        }
        if let Some(y) = inverse_table(&rest, f, t) {
            out.push(c * y);
            continue;
        }
        rational_part.push(term);
    }
    if rational_part.is_empty() {
        return Ok(Sym::sum(out));
    }

    let s = symbol::s();
    let in_s = subs::subs(&Sym::sum(rational_part), f, &(Sym::from(&s) / j2pi()));
    let rf = Ratfun::from_sym(&rational::cancel(&in_s), &s)
        .ok_or_else(|| fail("not a rational function of f"))?;
    if rf.has_delay() {
        return Err(fail("no table entry"));
    }
    let (quotient, poles) = rf.pole_terms(None).ok_or_else(|| fail("cannot find the poles"))?;
    for (k, q) in quotient.coeffs().iter().enumerate() {
        if !q.is_zero() {
            out.push(q * Sym::dirac_delta_deriv(tv.clone(), k as u32));
        }
    }

    let mut left = Vec::new();
    let mut axis = Vec::new();
    let mut right = Vec::new();
    for term in poles {
        let re = rational::simplify(&complex::split_complex(&term.pole).0);
        if complex::is_negative(&re) {
            left.push(term);
        } else if rational::is_zero(&re) && term.order == 1 {
            axis.push(term);
        } else if complex::is_positive(&re) {
            right.push(term);
        } else {
            return Err(fail("cannot classify the poles"));
        }
    }
    let group = |terms: &[PoleTerm]| (!terms.is_empty()).then(|| pole_signal(terms, t));
    if let Some(y) = group(&left) {
        out.push(y * Sym::heaviside(tv.clone()));
    }
    if let Some(y) = group(&axis) {
        out.push(y * Sym::apply(Func::Sign, vec![tv.clone()]) / Sym::int(2));
    }
    if let Some(y) = group(&right) {
        out.push(-(y * Sym::heaviside(-tv)));
    }
    Ok(Sym::sum(out))
}

fn inverse_table(rest: &Sym, f: &Symbol, t: &Symbol) -> Option<Sym> {
    let tv = Sym::from(t);
    if let Some((Func::DiracDelta, args)) = rest.as_apply() {
        if args.len() != 1 {
            return None;
        }
        let (a, b) = calculus::linear_coeffs(&args[0], f)?;
        let f0 = rational::simplify(&(-b / &a));
        return Some(Sym::exp(j2pi() * f0 * tv) / Sym::abs(a));
    }

    // V(f) exp(-j 2 pi f T) and plain exp(-j 2 pi f T).
    let mut delay = Sym::zero();
    let mut scale = Sym::one();
    let mut signal: Option<Sym> = None;
    for g in rest.factors() {
        match g.node() {
            Node::Apply(Func::Exp, args) => {
                let (p, q) = calculus::linear_coeffs(&args[0], f)?;
                delay = delay - p / j2pi();
                scale = scale * Sym::exp(q);
            }
            Node::Apply(Func::Undefined(_), _) if signal.is_none() => {
                let (name, arg) = as_undefined(&g)?;
                if arg.as_symbol() != Some(f) {
                    return None;
                }
                signal = Some(Sym::undefined(&conjugate_name(name, false), vec![tv.clone()]));
            }
            _ => return None,
        }
    }
    let delay = rational::simplify(&delay);
    let y = match signal {
        Some(v) => subs::subs(&v, t, &(&tv - &delay)),
        None => Sym::dirac_delta(&tv - &delay),
    };
    Some(scale * y)
}

/// Angular Fourier transform, `X(omega) = X_f(omega / 2 pi)`.
pub fn angular_fourier_transform(x: &Sym, t: &Symbol, omega: &Symbol) -> Result<Sym> {
    let f = symbol::f();
    let image = fourier_transform(x, t, &f)?;
    let w = Sym::from(omega) / (Sym::int(2) * Sym::pi());
    Ok(normalize_deltas(&subs::subs(&image, &f, &w), omega))
}

pub fn inverse_angular_fourier_transform(x: &Sym, omega: &Symbol, t: &Symbol) -> Result<Sym> {
    let f = symbol::f();
    let w = Sym::int(2) * Sym::pi() * Sym::from(&f);
    let in_f = normalize_deltas(&subs::subs(x, omega, &w), &f);
    inverse_fourier_transform(&in_f, &f, t)
}

/// A signal known to be causal but written without its step, such as
/// `exp(-t)` with `causal=true`, gets the step made explicit.
pub fn gate_causal(x: &Sym, assumptions: &Assumptions) -> Sym {
    if assumptions.causal != Some(true) || x.has_func(&|g: &Func| *g == Func::Heaviside) {
        return x.clone();
    }
    let t = symbol::t();
    if !x.has_symbol(&t) {
        return x.clone();
    }
    x * Sym::heaviside(Sym::from(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::parse::parse;

    fn ft(text: &str) -> Sym {
        fourier_transform(&parse(text).unwrap(), &symbol::t(), &symbol::f()).unwrap()
    }

    fn ift(text: &str) -> Sym {
        inverse_fourier_transform(&parse(text).unwrap(), &symbol::f(), &symbol::t()).unwrap()
    }

    fn same(a: &Sym, text: &str) -> bool {
        rational::is_zero(&rational::simplify(&(a - parse(text).unwrap())))
    }

    #[test]
    fn test_constants_and_impulses() {
        assert!(same(&ft("3"), "3 * delta(f)"));
        assert!(same(&ft("delta(t)"), "1"));
        assert!(same(&ft("delta(t - 2)"), "exp(-4 * j * pi * f)"));
    }

    #[test]
    fn test_sinusoids() {
        assert!(same(&ft("cos(2 * pi * t)"), "delta(f - 1) / 2 + delta(f + 1) / 2"));
        assert!(same(
            &ft("sin(2 * pi * t)"),
            "-j * delta(f - 1) / 2 + j * delta(f + 1) / 2"
        ));
        assert!(same(&ft("exp(j * 6 * pi * t)"), "delta(f - 3)"));
    }

    #[test]
    fn test_step_and_decay() {
        assert!(same(&ft("u(t)"), "delta(f) / 2 + 1 / (2 * j * pi * f)"));
        assert!(same(&ft("exp(-t) * u(t)"), "1 / (2 * j * pi * f + 1)"));
        let growing = parse("exp(t) * u(t)").unwrap();
        assert!(fourier_transform(&growing, &symbol::t(), &symbol::f()).is_err());
    }

    #[test]
    fn test_inverse_pairs() {
        assert!(same(&ift("1"), "delta(t)"));
        assert!(same(&ift("delta(f - 1)"), "exp(2 * j * pi * t)"));
        assert!(same(&ift("exp(-2 * j * pi * f)"), "delta(t - 1)"));
        assert!(same(&ift("V(f)"), "v(t)"));
        assert!(same(&ift("1 / (2 * j * pi * f + 1)"), "exp(-t) * u(t)"));
    }

    #[test]
    fn test_inverse_anticausal() {
        assert!(same(&ift("1 / (1 - 2 * j * pi * f)"), "exp(t) * u(-t)"));
    }

    #[test]
    fn test_angular_scaling() {
        let x = parse("1").unwrap();
        let y = angular_fourier_transform(&x, &symbol::t(), &symbol::omega()).unwrap();
        assert!(same(&y, "2 * pi * delta(omega)"));
        let back = inverse_angular_fourier_transform(&y, &symbol::omega(), &symbol::t()).unwrap();
        assert!(same(&back, "1"));
    }

    #[test]
    fn test_causal_gating() {
        let x = parse("exp(-2 * t)").unwrap();
        let causal = Assumptions::new().with_causal(true);
        let gated = gate_causal(&x, &causal);
        let image = fourier_transform(&gated, &symbol::t(), &symbol::f()).unwrap();
        assert!(same(&image, "1 / (2 * j * pi * f + 2)"));
        assert_eq!(gate_causal(&x, &Assumptions::new()), x);
        assert!(fourier_transform(&x, &symbol::t(), &symbol::f()).is_err());
    }
}
