//! Unilateral Laplace transform pairs (lower limit `0-`).

use crate::error::{Result, SymCircuitError};
use crate::expr::Assumptions;
use crate::ratfun::{self, conjugate_partner, factorial, PoleTerm, Ratfun};
use crate::sym::{calculus, complex, expand::expand, rational, subs, Func, Node, Sym, Symbol};

use super::{advance, as_undefined, conjugate_name, split_const};

const FORWARD: &str = "Laplace transform";
const INVERSE: &str = "inverse Laplace transform";

/// Laplace transform of `x(t)`, term by term.
pub fn laplace_transform(x: &Sym, t: &Symbol, s: &Symbol) -> Result<Sym> {
    let mut out = Vec::new();
    for term in expand(x).terms() {
        out.push(transform_term(&term, t, s)?);
    }
    Ok(Sym::sum(out))
}

fn undefined(x: &Sym, message: &str) -> SymCircuitError {
    SymCircuitError::transform_undefined(FORWARD, x, message)
}

fn transform_term(term: &Sym, t: &Symbol, s: &Symbol) -> Result<Sym> {
    let (c, rest) = split_const(term, t);
    if rest.is_one() {
        return Ok(c / Sym::from(s));
    }

    let factors = rest.factors();
    for (i, f) in factors.iter().enumerate() {
        let others = || {
            Sym::product(
                factors
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, g)| g.clone())
                    .collect::<Vec<_>>(),
            )
        };
        match f.node() {
            Node::Apply(Func::DiracDelta, args) => {
                return Ok(c * impulse(args, &others(), t, s, term)?);
            }
            Node::Apply(Func::Heaviside, args) if args.len() == 1 => {
                return Ok(c * step(&args[0], &others(), t, s, term)?);
            }
            _ => {}
        }
    }

    if let Some((name, arg)) = as_undefined(&rest) {
        let (a, b) = calculus::linear_coeffs(arg, t)
            .ok_or_else(|| undefined(term, "argument is not linear in t"))?;
        if !rational::is_zero(&b) {
            return Err(undefined(term, "shifted signal is unknown before the origin"));
        }
        let image = Sym::undefined(
            &conjugate_name(name, true),
            vec![Sym::from(s) / &a],
        );
        return Ok(c * image / a);
    }

    if let Node::Derivative { expr, var, order } = rest.node() {
        if var == t && *order == 1 {
            if let Some((name, arg)) = as_undefined(expr) {
                if arg.as_symbol() == Some(t) {
                    let image = Sym::undefined(&conjugate_name(name, true), vec![Sym::from(s)]);
                    let initial = Sym::undefined(name, vec![Sym::zero()]);
                    return Ok(c * (Sym::from(s) * image - initial));
                }
            }
        }
        return Err(undefined(term, "only first derivatives of signals are supported"));
    }

    let image = elementary(&factors, t, s).ok_or_else(|| undefined(term, "no table entry"))?;
    Ok(rational::cancel(&(c * image)))
}

/// `δ(a t + b)` and its derivatives, sifting the other factors `g`.
fn impulse(args: &[Sym], g: &Sym, t: &Symbol, s: &Symbol, term: &Sym) -> Result<Sym> {
    let (a, b) = calculus::linear_coeffs(&args[0], t)
        .ok_or_else(|| undefined(term, "impulse argument is not linear in t"))?;
    let root = rational::simplify(&(-b / &a));
    if complex::is_negative(&root) {
        return Ok(Sym::zero());
    }
    let sv = Sym::from(s);
    let delay = Sym::exp(-(&sv * &root));
    let order = args.get(1).and_then(Sym::as_i64).unwrap_or(0);
    if order == 0 {
        let value = subs::subs(g, t, &root);
        return Ok(value * delay / Sym::abs(a));
    }
    if g.has_symbol(t) {
        return Err(undefined(term, "impulse derivative times a signal"));
    }
    Ok(g * sv.powi(order) * delay / (a.powi(order) * Sym::abs(a)))
}

/// `u(a t + b) g(t)`: a delayed transform of the advanced signal.
fn step(arg: &Sym, g: &Sym, t: &Symbol, s: &Symbol, term: &Sym) -> Result<Sym> {
    let (a, b) = calculus::linear_coeffs(arg, t)
        .ok_or_else(|| undefined(term, "step argument is not linear in t"))?;
    if !complex::is_positive(&a) {
        return Err(undefined(term, "time-reversed step"));
    }
    let root = rational::simplify(&(-b / a));
    if root.is_zero() || complex::is_negative(&root) {
        return laplace_transform(g, t, s);
    }
    let advanced = advance(g, t, &root);
    Ok(Sym::exp(-(Sym::from(s) * &root)) * laplace_transform(&advanced, t, s)?)
}

/// `t^k exp(a t) trig(w t + phi)` with at most one sinusoid.
fn elementary(factors: &[Sym], t: &Symbol, s: &Symbol) -> Option<Sym> {
    let mut k = 0u32;
    let mut a = Sym::zero();
    let mut scale = Sym::one();
    let mut trig: Option<(Func, Sym, Sym)> = None;

    for f in factors {
        match f.node() {
            Node::Symbol(v) if v == t => k += 1,
            Node::Pow(base, e) if base.as_symbol() == Some(t) => {
                k += u32::try_from(e.as_i64()?).ok()?;
            }
            Node::Apply(Func::Exp, args) => {
                let (p, q) = calculus::linear_coeffs(&args[0], t)?;
                a = a + p;
                scale = scale * Sym::exp(q);
            }
            Node::Apply(func @ (Func::Sin | Func::Cos), args) if trig.is_none() => {
                let (w, phi) = calculus::linear_coeffs(&args[0], t)?;
                trig = Some((func.clone(), w, phi));
            }
            Node::Pow(base, e) if !base.has_symbol(t) => {
                let (p, q) = calculus::linear_coeffs(e, t)?;
                a = a + p * Sym::log(base.clone());
                scale = scale * Sym::pow(base.clone(), q);
            }
            _ => return None,
        }
    }

    let shifted = Sym::from(s) - a;
    let mut image = match trig {
        None => shifted.recip(),
        Some((func, w, phi)) => {
            let den = shifted.powi(2) + w.powi(2);
            let num = if func == Func::Cos {
                &shifted * Sym::cos(phi.clone()) - &w * Sym::sin(phi)
            } else {
                &shifted * Sym::sin(phi.clone()) + &w * Sym::cos(phi)
            };
            num / den
        }
    };
    for _ in 0..k {
        image = -calculus::diff(&image, s);
    }
    Some(scale * image)
}

/// Inverse Laplace transform of `x(s)`.
///
/// The polynomial part becomes impulses. The proper part is expanded in
/// partial fractions; it is only known for all time if the signal is DC
/// (a single pole at the origin) or AC (simple imaginary poles), and is
/// otherwise gated by a step, which requires `causal`.
pub fn inverse_laplace_transform(
    x: &Sym,
    s: &Symbol,
    t: &Symbol,
    assumptions: &Assumptions,
) -> Result<Sym> {
    let fail = |message: &str| SymCircuitError::transform_undefined(INVERSE, x, message);
    if rational::is_zero(x) {
        return Ok(Sym::zero());
    }
    if !x.has_symbol(s) {
        return Ok(x * Sym::dirac_delta(Sym::from(t)));
    }

    let (n, d) = ratfun::as_n_d(x, s, false);
    let mut groups: Vec<(Sym, Vec<Sym>)> = Vec::new();
    let mut out = Vec::new();
    for term in expand(&n).terms() {
        let (delay, rest) = split_delay(&term, s).ok_or_else(|| fail("delay is not linear in s"))?;
        if complex::is_negative(&delay) {
            return Err(fail("signal advanced in time"));
        }
        if rest.has_func(&|f: &Func| f.is_undefined()) {
            out.push(inverse_undefined(&rest, &d, &delay, s, t).ok_or_else(|| fail("no table entry"))?);
            continue;
        }
        match groups.iter_mut().find(|(k, _)| *k == delay) {
            Some((_, terms)) => terms.push(rest),
            None => groups.push((delay, vec![rest])),
        }
    }

    let tv = Sym::from(t);
    for (delay, terms) in groups {
        let group = Sym::sum(terms) / &d;
        let rf = Ratfun::from_sym(&group, s).ok_or_else(|| fail("not a rational function of s"))?;
        let (quotient, poles) = rf
            .pole_terms(None)
            .ok_or_else(|| fail("cannot find the poles"))?;

        let mut parts = Vec::new();
        let mut steady_ac = false;
        if !poles.is_empty() {
            let signal = pole_signal(&poles, t);
            let delayed = !delay.is_zero();
            if assumptions.causal == Some(true) {
                parts.push(signal * Sym::heaviside(tv.clone()));
            } else if !delayed && assumptions.dc == Some(true) && is_dc(&poles) {
                parts.push(signal);
            } else if !delayed && assumptions.ac == Some(true) && is_ac(&poles) {
                steady_ac = true;
                parts.push(signal);
            } else {
                return Err(fail("unknown for t < 0, use causal=true"));
            }
        }

        // A sinusoidal steady state has no impulses.
        if !steady_ac {
            for (k, q) in quotient.coeffs().iter().enumerate() {
                if !q.is_zero() {
                    parts.push(q * Sym::dirac_delta_deriv(tv.clone(), k as u32));
                }
            }
        }

        let part = Sym::sum(parts);
        if delay.is_zero() {
            out.push(part);
        } else {
            out.push(subs::subs(&part, t, &(&tv - &delay)));
        }
    }
    Ok(Sym::sum(out))
}

/// `(T, rest)` where the term is `rest · exp(-s T)`.
fn split_delay(term: &Sym, s: &Symbol) -> Option<(Sym, Sym)> {
    let mut delay = Sym::zero();
    let mut rest = Vec::new();
    for f in term.factors() {
        match f.node() {
            Node::Apply(Func::Exp, args) if args[0].has_symbol(s) => {
                let (p, q) = calculus::linear_coeffs(&args[0], s)?;
                delay = delay - p;
                rest.push(Sym::exp(q));
            }
            _ => rest.push(f),
        }
    }
    Some((rational::simplify(&delay), Sym::product(rest)))
}

/// `c · V(a s) exp(-s T)` over a denominator free of `s`.
fn inverse_undefined(rest: &Sym, d: &Sym, delay: &Sym, s: &Symbol, t: &Symbol) -> Option<Sym> {
    if d.has_symbol(s) {
        return None;
    }
    let (c, f) = split_const(rest, s);
    let (name, arg) = as_undefined(&f)?;
    let (a, b) = calculus::linear_coeffs(arg, s)?;
    if !rational::is_zero(&b) {
        return None;
    }
    let tv = Sym::from(t);
    let signal = Sym::undefined(&conjugate_name(name, false), vec![(&tv - delay) / &a]);
    Some(c * signal / (a * d))
}

fn is_dc(poles: &[PoleTerm]) -> bool {
    poles.iter().all(|p| p.order == 1 && p.pole.is_zero())
}

fn is_ac(poles: &[PoleTerm]) -> bool {
    poles.iter().all(|p| {
        let (re, im) = complex::split_complex(&p.pole);
        p.order == 1 && rational::is_zero(&re) && !rational::is_zero(&im)
    })
}

/// Time signal of a partial-fraction expansion, with complex-conjugate
/// pairs written as damped sinusoids.
pub(crate) fn pole_signal(poles: &[PoleTerm], t: &Symbol) -> Sym {
    let tv = Sym::from(t);
    let mut out = Vec::new();
    let mut done = vec![false; poles.len()];
    for i in 0..poles.len() {
        if done[i] {
            continue;
        }
        done[i] = true;
        if let Some(j) = conjugate_partner(poles, &done, i) {
            done[j] = true;
            let upper = if complex::is_negative(&complex::split_complex(&poles[i].pole).1) {
                &poles[j]
            } else {
                &poles[i]
            };
            let (sigma, omega) = complex::split_complex(&upper.pole);
            let (ar, ai) = complex::split_complex(&upper.coeff);
            let ar = rational::simplify(&ar);
            let ai = rational::simplify(&ai);
            let envelope = Sym::exp(sigma * &tv);
            let wt = omega * &tv;
            out.push(
                Sym::int(2) * envelope * (ar * Sym::cos(wt.clone()) - ai * Sym::sin(wt)),
            );
            continue;
        }
        let term = &poles[i];
        let k = term.order - 1;
        out.push(
            &term.coeff * tv.powi(k as i64) / factorial(k) * Sym::exp(&term.pole * &tv),
        );
    }
    Sym::sum(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::parse::parse;
    use crate::sym::symbol;

    fn lt(text: &str) -> Sym {
        laplace_transform(&parse(text).unwrap(), &symbol::t(), &symbol::s()).unwrap()
    }

    fn same(a: &Sym, text: &str) -> bool {
        rational::is_zero(&rational::simplify(&(a - parse(text).unwrap())))
    }

    fn causal() -> Assumptions {
        Assumptions::new().with_causal(true)
    }

    fn ilt(text: &str, a: &Assumptions) -> Result<Sym> {
        inverse_laplace_transform(&parse(text).unwrap(), &symbol::s(), &symbol::t(), a)
    }

    #[test]
    fn test_table_entries() {
        assert!(same(&lt("3"), "3 / s"));
        assert!(same(&lt("t"), "1 / s^2"));
        assert!(same(&lt("t^2"), "2 / s^3"));
        assert!(same(&lt("exp(-2 * t)"), "1 / (s + 2)"));
        assert!(same(&lt("cos(3 * t)"), "s / (s^2 + 9)"));
        assert!(same(&lt("sin(3 * t)"), "3 / (s^2 + 9)"));
        assert!(same(&lt("exp(-t) * sin(2 * t)"), "2 / ((s + 1)^2 + 4)"));
        assert!(same(&lt("t * exp(-a * t)"), "1 / (s + a)^2"));
    }

    #[test]
    fn test_impulses_and_steps() {
        assert!(same(&lt("delta(t)"), "1"));
        assert!(same(&lt("delta(t - 2)"), "exp(-2 * s)"));
        assert!(same(&lt("delta(t + 2)"), "0"));
        assert!(same(&lt("u(t)"), "1 / s"));
        assert!(same(&lt("u(t - 1)"), "exp(-s) / s"));
        assert!(same(&lt("exp(-t) * u(t - 1)"), "exp(-1) * exp(-s) / (s + 1)"));
    }

    #[test]
    fn test_undefined_signals() {
        assert!(same(&lt("v(t)"), "V(s)"));
        assert!(same(&lt("3 * v(2 * t)"), "3 * V(s / 2) / 2"));
        let err = laplace_transform(&parse("v(t - 1)").unwrap(), &symbol::t(), &symbol::s());
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_signal_fails() {
        let x = parse("log(t)").unwrap();
        assert!(matches!(
            laplace_transform(&x, &symbol::t(), &symbol::s()),
            Err(SymCircuitError::TransformUndefined { .. })
        ));
    }

    #[test]
    fn test_inverse_impulses_need_no_assumptions() {
        let none = Assumptions::new();
        assert!(same(&ilt("5", &none).unwrap(), "5 * delta(t)"));
        assert!(same(&ilt("2 * s + 1", &none).unwrap(), "2 * DiracDelta(t, 1) + delta(t)"));
        assert!(same(&ilt("exp(-3 * s)", &none).unwrap(), "delta(t - 3)"));
    }

    #[test]
    fn test_inverse_partial_fractions() {
        let x = ilt("1 / (s * (s + 1))", &causal()).unwrap();
        assert!(same(&x, "(1 - exp(-t)) * u(t)"));
        let y = ilt("(s + 1) / ((s + 1)^2 + 4)", &causal()).unwrap();
        assert!(same(&y, "exp(-t) * cos(2 * t) * u(t)"));
    }

    #[test]
    fn test_inverse_delayed() {
        let x = ilt("exp(-2 * s) / (s + 1)", &causal()).unwrap();
        assert!(same(&x, "exp(-(t - 2)) * u(t - 2)"));
        assert!(ilt("exp(-2 * s) / s", &Assumptions::new().with_dc(true)).is_err());
    }

    #[test]
    fn test_inverse_undefined() {
        let none = Assumptions::new();
        assert!(same(&ilt("V(s)", &none).unwrap(), "v(t)"));
        assert!(same(&ilt("2 * V(s) * exp(-s)", &none).unwrap(), "2 * v(t - 1)"));
    }

    #[test]
    fn test_inverse_dc_and_ac() {
        let dc = Assumptions::new().with_dc(true);
        assert!(same(&ilt("4 / s", &dc).unwrap(), "4"));
        assert!(ilt("1 / (s + 1)", &dc).is_err());
        let ac = Assumptions::new().with_ac(true);
        assert!(same(&ilt("3 / (s^2 + 9)", &ac).unwrap(), "sin(3 * t)"));
    }

    #[test]
    fn test_inverse_ac_drops_impulses() {
        let ac = Assumptions::new().with_ac(true);
        let x = ilt("2 * s^2 / (s^2 + 9)", &ac).unwrap();
        assert!(same(&x, "-6 * sin(3 * t)"));
        assert!(!x.has_func(&|f: &Func| matches!(f, Func::DiracDelta)));
        let y = ilt("2 * s^2 / (s^2 + 9)", &causal()).unwrap();
        assert!(same(&y, "2 * delta(t) - 6 * sin(3 * t) * u(t)"));
    }
}
