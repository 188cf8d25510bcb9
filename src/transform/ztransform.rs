//! Unilateral z-transform pairs.

use crate::error::{Result, SymCircuitError};
use crate::expr::Assumptions;
use crate::ratfun::{factorial, Ratfun};
use crate::sym::{calculus, complex, expand::expand, rational, Func, Node, Sym, Symbol};

use super::{advance, as_undefined, conjugate_name, split_const};

const FORWARD: &str = "z-transform";
const INVERSE: &str = "inverse z-transform";

/// z-transform of the sequence `x[n]`.
pub fn ztransform(x: &Sym, n: &Symbol, z: &Symbol) -> Result<Sym> {
    let mut out = Vec::new();
    for term in expand(x).terms() {
        out.push(transform_term(&term, n, z)?);
    }
    Ok(Sym::sum(out))
}

fn transform_term(term: &Sym, n: &Symbol, z: &Symbol) -> Result<Sym> {
    let fail = |message: &str| SymCircuitError::transform_undefined(FORWARD, term, message);
    let zv = Sym::from(z);
    let (c, rest) = split_const(term, n);
    if rest.is_one() {
        return Ok(c * &zv / (&zv - Sym::one()));
    }

    let factors = rest.factors();
    for (i, g) in factors.iter().enumerate() {
        let Some((func, args)) = g.as_apply() else {
            continue;
        };
        if args.len() != 1 || !matches!(func, Func::UnitImpulse | Func::DiracDelta | Func::Heaviside) {
            continue;
        }
        let k = shift_of(&args[0], n).ok_or_else(|| fail("argument must be n - k"))?;
        let others = Sym::product(
            factors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, h)| h.clone())
                .collect::<Vec<_>>(),
        );
        if *func == Func::Heaviside {
            if !complex::is_positive(&k) {
                return Ok(c * ztransform(&others, n, z)?);
            }
            let advanced = advance(&others, n, &k);
            return Ok(c * zv.pow_sym(&(-&k)) * ztransform(&advanced, n, z)?);
        }
        let value = crate::sym::subs::subs(&others, n, &k);
        return Ok(c * value * zv.pow_sym(&(-k)));
    }

    if let Some((name, arg)) = as_undefined(&rest) {
        let image = conjugate_name(name, true);
        if let Some(k) = shift_of(arg, n) {
            return Ok(c * Sym::undefined(&image, vec![zv.clone()]) * zv.pow_sym(&(-k)));
        }
        let (a, b) = calculus::linear_coeffs(arg, n).ok_or_else(|| fail("argument is not linear in n"))?;
        let m = rational::simplify(&a.recip());
        if rational::is_zero(&b) && m.is_integer() && complex::is_positive(&m) {
            return Ok(c * Sym::undefined(&image, vec![zv.pow_sym(&m)]));
        }
        return Err(fail("argument must be n - k or n / m"));
    }

    let image = elementary(&factors, n, z).ok_or_else(|| fail("no table entry"))?;
    Ok(rational::cancel(&(c * image)))
}

/// `k` where `arg` is `n - k`.
fn shift_of(arg: &Sym, n: &Symbol) -> Option<Sym> {
    let (a, b) = calculus::linear_coeffs(arg, n)?;
    a.is_one().then(|| rational::simplify(&-b))
}

/// `n^k r^n trig(w n + phi)` with at most one sinusoid.
fn elementary(factors: &[Sym], n: &Symbol, z: &Symbol) -> Option<Sym> {
    let mut k = 0u32;
    let mut r = Sym::one();
    let mut scale = Sym::one();
    let mut trig: Option<(Func, Sym, Sym)> = None;

    for g in factors {
        match g.node() {
            Node::Symbol(v) if v == n => k += 1,
            Node::Pow(base, e) if base.as_symbol() == Some(n) => {
                k += u32::try_from(e.as_i64()?).ok()?;
            }
            Node::Pow(base, e) if !base.has_symbol(n) => {
                let (p, q) = calculus::linear_coeffs(e, n)?;
                r = r * base.pow_sym(&p);
                scale = scale * base.pow_sym(&q);
            }
            Node::Apply(Func::Exp, args) => {
                let (p, q) = calculus::linear_coeffs(&args[0], n)?;
                r = r * Sym::exp(p);
                scale = scale * Sym::exp(q);
            }
            Node::Apply(func @ (Func::Sin | Func::Cos), args) if trig.is_none() => {
                let (w, phi) = calculus::linear_coeffs(&args[0], n)?;
                trig = Some((func.clone(), w, phi));
            }
            _ => return None,
        }
    }

    let zv = Sym::from(z);
    let mut image = match trig {
        None => &zv / (&zv - &r),
        Some((func, w, phi)) => {
            let den = zv.powi(2) - Sym::int(2) * &r * &zv * Sym::cos(w.clone()) + r.powi(2);
            let lag = w - &phi;
            let num = if func == Func::Cos {
                zv.powi(2) * Sym::cos(phi) - &r * &zv * Sym::cos(lag)
            } else {
                zv.powi(2) * Sym::sin(phi) + &r * &zv * Sym::sin(lag)
            };
            num / den
        }
    };
    for _ in 0..k {
        image = -(&zv * calculus::diff(&image, z));
    }
    Some(scale * image)
}

/// Inverse z-transform of `x(z)`.
///
/// Laurent monomials become unit impulses and `V(z) z^-k` a delayed
/// sequence. The rest is expanded as partial fractions of `x(z) / z`; the
/// geometric sequences that result are gated by a step, which requires
/// `causal` unless the sequence is a known DC value.
pub fn inverse_ztransform(x: &Sym, z: &Symbol, n: &Symbol, assumptions: &Assumptions) -> Result<Sym> {
    let fail = |message: &str| SymCircuitError::transform_undefined(INVERSE, x, message);
    let nv = Sym::from(n);
    let mut out = Vec::new();
    let mut remaining = Vec::new();
    for term in expand(x).terms() {
        let (c, rest) = split_const(&term, z);
        if let Some(k) = laurent_power(&rest, z) {
            out.push(c * Sym::unit_impulse(&nv + Sym::int(k)));
            continue;
        }
        if let Some(y) = delayed_signal(&rest, z, n) {
            out.push(c * y);
            continue;
        }
        remaining.push(term);
    }
    if remaining.is_empty() {
        return Ok(Sym::sum(out));
    }

    let zv = Sym::from(z);
    let rf = Ratfun::from_sym(&(Sym::sum(remaining) / &zv), z)
        .ok_or_else(|| fail("not a rational function of z"))?;
    if rf.has_delay() {
        return Err(fail("no table entry"));
    }
    let (quotient, poles) = rf.pole_terms(None).ok_or_else(|| fail("cannot find the poles"))?;
    for (k, q) in quotient.coeffs().iter().enumerate() {
        if !q.is_zero() {
            out.push(q * Sym::unit_impulse(&nv + Sym::int(k as i64 + 1)));
        }
    }

    let dc = assumptions.dc == Some(true)
        && poles.iter().all(|p| p.order == 1 && (p.pole.is_one() || p.pole.is_zero()));
    let causal = assumptions.causal == Some(true);
    for term in poles {
        let m = term.order as i64;
        if term.pole.is_zero() {
            out.push(term.coeff * Sym::unit_impulse(&nv - Sym::int(m - 1)));
            continue;
        }
        let binomial = Sym::product((0..m - 1).map(|i| &nv - Sym::int(i))) / factorial(term.order - 1);
        let geometric = term.pole.pow_sym(&(&nv - Sym::int(m - 1)));
        let sequence = term.coeff * binomial * geometric;
        if dc {
            out.push(sequence);
        } else if causal {
            out.push(sequence * Sym::heaviside(nv.clone()));
        } else {
            return Err(fail("unknown for n < 0, use causal=true"));
        }
    }
    Ok(Sym::sum(out))
}

/// `k` where `rest` is `z^k`.
fn laurent_power(rest: &Sym, z: &Symbol) -> Option<i64> {
    if rest.is_one() {
        return Some(0);
    }
    match rest.node() {
        Node::Symbol(v) if v == z => Some(1),
        Node::Pow(base, e) if base.as_symbol() == Some(z) => e.as_i64(),
        _ => None,
    }
}

/// `V(z) z^-k` as `v(n - k)`.
fn delayed_signal(rest: &Sym, z: &Symbol, n: &Symbol) -> Option<Sym> {
    let mut power = 0;
    let mut signal = None;
    for g in rest.factors() {
        if let Some(k) = laurent_power(&g, z) {
            power += k;
            continue;
        }
        let (name, arg) = as_undefined(&g)?;
        if signal.is_some() || arg.as_symbol() != Some(z) {
            return None;
        }
        signal = Some(conjugate_name(name, false));
    }
    let name = signal?;
    Some(Sym::undefined(&name, vec![Sym::from(n) + Sym::int(power)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::parse::parse;
    use crate::sym::symbol;

    fn zt(text: &str) -> Sym {
        ztransform(&parse(text).unwrap(), &symbol::n(), &symbol::z()).unwrap()
    }

    fn izt(text: &str, a: &Assumptions) -> Result<Sym> {
        inverse_ztransform(&parse(text).unwrap(), &symbol::z(), &symbol::n(), a)
    }

    fn same(a: &Sym, text: &str) -> bool {
        rational::is_zero(&rational::simplify(&(a - parse(text).unwrap())))
    }

    fn causal() -> Assumptions {
        Assumptions::new().with_causal(true)
    }

    #[test]
    fn test_table_entries() {
        assert!(same(&zt("1"), "z / (z - 1)"));
        assert!(same(&zt("n"), "z / (z - 1)^2"));
        assert!(same(&zt("a^n"), "z / (z - a)"));
        assert!(same(&zt("unitimpulse(n - 3)"), "z^(-3)"));
        assert!(same(&zt("u(n - 2)"), "1 / (z * (z - 1))"));
        assert!(same(&zt("u(n + 2)"), "z / (z - 1)"));
    }

    #[test]
    fn test_sinusoids() {
        assert!(same(
            &zt("cos(w * n)"),
            "(z^2 - z * cos(w)) / (z^2 - 2 * z * cos(w) + 1)"
        ));
        assert!(same(&zt("sin(w * n)"), "z * sin(w) / (z^2 - 2 * z * cos(w) + 1)"));
    }

    #[test]
    fn test_undefined_sequences() {
        assert!(same(&zt("v(n)"), "V(z)"));
        assert!(same(&zt("v(n - 3)"), "V(z) / z^3"));
        assert!(same(&zt("v(n / 3)"), "V(z^3)"));
        assert!(same(&izt("V(z) / z^3", &Assumptions::new()).unwrap(), "v(n - 3)"));
    }

    #[test]
    fn test_inverse_impulses() {
        let none = Assumptions::new();
        assert!(same(&izt("z^(-1)", &none).unwrap(), "unitimpulse(n - 1)"));
        assert!(same(&izt("3 + z^2", &none).unwrap(), "3 * unitimpulse(n) + unitimpulse(n + 2)"));
    }

    #[test]
    fn test_inverse_geometric() {
        assert!(same(&izt("1 / (1 - a * z^(-1))", &causal()).unwrap(), "a^n * u(n)"));
        assert!(same(&izt("z / (z - a)^2", &causal()).unwrap(), "n * a^(n - 1) * u(n)"));
        assert!(izt("z / (z - a)", &Assumptions::new()).is_err());
    }

    #[test]
    fn test_inverse_dc() {
        let dc = Assumptions::new().with_dc(true);
        assert!(same(&izt("4 * z / (z - 1)", &dc).unwrap(), "4"));
    }
}
