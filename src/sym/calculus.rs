//! Differentiation, integration and limits.

use std::cmp::Ordering;

use super::evalf;
use super::expand::expand;
use super::func::Func;
use super::node::{Node, Sym};
use super::poly::Poly;
use super::rational::{self, numer_denom, simplify};
use super::subs::{subs, xreplace};
use super::symbol::{symbol_with, Symbol, SymbolFlags};
use super::complex;

/// Side from which a finite limit point is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From above (`x0+`)
    Plus,
    /// From below (`x0-`)
    Minus,
}

// ============ Differentiation ============

/// Derivative of `x` with respect to `var`.
pub fn diff(x: &Sym, var: &Symbol) -> Sym {
    if !x.has_symbol(var) {
        return Sym::zero();
    }
    match x.node() {
        Node::Symbol(s) => {
            if s == var {
                Sym::one()
            } else {
                Sym::zero()
            }
        }
        Node::Add(ts) => Sym::sum(ts.iter().map(|t| diff(t, var)).collect::<Vec<_>>()),
        Node::Mul(fs) => {
            let mut terms = Vec::with_capacity(fs.len());
            for (i, f) in fs.iter().enumerate() {
                let df = diff(f, var);
                if df.is_zero() {
                    continue;
                }
                let mut factors = fs.clone();
                factors[i] = df;
                terms.push(Sym::product(factors));
            }
            Sym::sum(terms)
        }
        Node::Pow(b, e) => {
            if !e.has_symbol(var) {
                e * Sym::pow(b.clone(), e - Sym::one()) * diff(b, var)
            } else {
                x * (diff(e, var) * Sym::log(b.clone()) + e * diff(b, var) / b)
            }
        }
        Node::Apply(func, args) => diff_apply(x, func, args, var),
        Node::Integral {
            integrand,
            var: bound,
            lower,
            upper,
        } => {
            let mut parts = Vec::new();
            if upper.has_symbol(var) {
                parts.push(subs(integrand, bound, upper) * diff(upper, var));
            }
            if lower.has_symbol(var) {
                parts.push(-(subs(integrand, bound, lower) * diff(lower, var)));
            }
            if integrand.has_symbol(var) {
                parts.push(Sym::integral(
                    diff(integrand, var),
                    bound.clone(),
                    lower.clone(),
                    upper.clone(),
                ));
            }
            Sym::sum(parts)
        }
        Node::Derivative { .. } => Sym::derivative(x.clone(), var.clone(), 1),
        Node::Number(_) | Node::Constant(_) => Sym::zero(),
    }
}

fn diff_apply(x: &Sym, func: &Func, args: &[Sym], var: &Symbol) -> Sym {
    let a = &args[0];
    let da = diff(a, var);
    let outer = match func {
        Func::Exp => x.clone(),
        Func::Log => a.recip(),
        Func::Sin => Sym::cos(a.clone()),
        Func::Cos => -Sym::sin(a.clone()),
        Func::Tan => Sym::one() + x.powi(2),
        Func::Atan => (Sym::one() + a.powi(2)).recip(),
        Func::Abs => Sym::apply(Func::Sign, vec![a.clone()]),
        Func::Heaviside => Sym::dirac_delta(a.clone()),
        Func::DiracDelta => {
            let order = args.get(1).and_then(|k| k.as_i64()).unwrap_or(0);
            Sym::dirac_delta_deriv(a.clone(), order as u32 + 1)
        }
        Func::Re => return Sym::re(da),
        Func::Im => return Sym::im(da),
        Func::Conjugate => return complex::conjugate(&da),
        _ => return Sym::derivative(x.clone(), var.clone(), 1),
    };
    outer * da
}

/// n-th derivative.
pub fn diff_n(x: &Sym, var: &Symbol, n: u32) -> Sym {
    (0..n).fold(x.clone(), |acc, _| diff(&acc, var))
}

// ============ Integration ============

/// `(slope, offset)` if `a` is linear in `var` with nonzero slope.
pub fn linear_coeffs(a: &Sym, var: &Symbol) -> Option<(Sym, Sym)> {
    let slope = simplify(&diff(a, var));
    if slope.is_zero() || slope.has_symbol(var) {
        return None;
    }
    let offset = simplify(&subs(a, var, &Sym::zero()));
    Some((slope, offset))
}

/// Indefinite integral, `None` when no closed form is known.
pub fn integrate(x: &Sym, var: &Symbol) -> Option<Sym> {
    if !x.has_symbol(var) {
        return Some(x * Sym::from(var));
    }
    if let Node::Add(ts) = x.node() {
        let parts: Option<Vec<Sym>> = ts.iter().map(|t| integrate(t, var)).collect();
        return parts.map(Sym::sum);
    }
    let (indep, dep): (Vec<Sym>, Vec<Sym>) =
        x.factors().into_iter().partition(|f| !f.has_symbol(var));
    let result = integrate_product(&dep, var)?;
    Some(Sym::product(indep) * result)
}

fn integrate_product(factors: &[Sym], var: &Symbol) -> Option<Sym> {
    let v = Sym::from(var);

    // Sifting and gating first.
    for (i, f) in factors.iter().enumerate() {
        if let Some((Func::DiracDelta, [a])) = f.as_apply() {
            let (k, b) = linear_coeffs(a, var)?;
            let root = simplify(&(-b / &k));
            let rest = Sym::product(without(factors, i));
            let at_root = simplify(&subs(&rest, var, &root));
            return Some(at_root * Sym::heaviside(a.clone()) / k);
        }
    }
    for (i, f) in factors.iter().enumerate() {
        if let Some((Func::Heaviside, [a])) = f.as_apply() {
            let (k, b) = linear_coeffs(a, var)?;
            if !complex::is_positive(&k) {
                return None;
            }
            let root = simplify(&(-b / &k));
            let rest = Sym::product(without(factors, i));
            let g = integrate(&rest, var)?;
            let g_root = subs(&g, var, &root);
            return Some(Sym::heaviside(a.clone()) * (g - g_root));
        }
    }

    let mut power: i64 = 0;
    let mut exp_arg: Option<Sym> = None;
    let mut trig: Option<(Func, Sym)> = None;
    for f in factors {
        match f.node() {
            Node::Symbol(_) if *f == v => power += 1,
            Node::Pow(b, e) if *b == v => {
                let Some(k) = e.as_i64() else {
                    return integrate_power(f, var);
                };
                power += k;
            }
            Node::Apply(Func::Exp, args) if exp_arg.is_none() => exp_arg = Some(args[0].clone()),
            Node::Apply(func @ (Func::Sin | Func::Cos), args) if trig.is_none() => {
                trig = Some((func.clone(), args[0].clone()))
            }
            _ => return integrate_expanded(factors, var),
        }
    }

    match (exp_arg, trig) {
        (None, None) => integrate_power(&v.powi(power), var),
        (Some(p), None) if power >= 0 => integrate_poly_exp(power as u32, &p, var),
        (None, Some((func, q))) if power >= 0 => integrate_poly_trig(power as u32, &func, &q, var),
        (Some(p), Some((func, q))) if power == 0 => {
            let (a, _) = linear_coeffs(&p, var)?;
            let (b, _) = linear_coeffs(&q, var)?;
            let denom = a.powi(2) + b.powi(2);
            let e = Sym::exp(p);
            let (sin_q, cos_q) = (Sym::sin(q.clone()), Sym::cos(q));
            let body = match func {
                Func::Sin => &a * &sin_q - &b * &cos_q,
                _ => &a * &cos_q + &b * &sin_q,
            };
            Some(e * body / denom)
        }
        _ => None,
    }
}

fn without(factors: &[Sym], index: usize) -> Vec<Sym> {
    factors
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != index)
        .map(|(_, f)| f.clone())
        .collect()
}

fn integrate_power(f: &Sym, var: &Symbol) -> Option<Sym> {
    let v = Sym::from(var);
    let (b, e) = f.as_base_exp();
    if b != v || e.has_symbol(var) {
        return None;
    }
    if e == Sym::minus_one() {
        return Some(Sym::log(v));
    }
    let e1 = e + Sym::one();
    Some(v.pow_sym(&e1) / e1)
}

/// Expand the product and integrate term by term.
fn integrate_expanded(factors: &[Sym], var: &Symbol) -> Option<Sym> {
    let product = Sym::product(factors.to_vec());
    let expanded = expand(&product);
    if expanded == product || !matches!(expanded.node(), Node::Add(_)) {
        return None;
    }
    integrate(&expanded, var)
}

/// ∫ v^n exp(p) dv by repeated integration by parts.
fn integrate_poly_exp(n: u32, p: &Sym, var: &Symbol) -> Option<Sym> {
    let (k, _) = linear_coeffs(p, var)?;
    let v = Sym::from(var);
    let e = Sym::exp(p.clone());
    if n == 0 {
        return Some(e / k);
    }
    let rest = integrate_poly_exp(n - 1, p, var)?;
    Some(v.powi(n as i64) * &e / &k - Sym::int(n as i64) / &k * rest)
}

/// ∫ v^n sin(q) dv or ∫ v^n cos(q) dv by parts.
fn integrate_poly_trig(n: u32, func: &Func, q: &Sym, var: &Symbol) -> Option<Sym> {
    let (k, _) = linear_coeffs(q, var)?;
    let v = Sym::from(var);
    let (sin_q, cos_q) = (Sym::sin(q.clone()), Sym::cos(q.clone()));
    match func {
        Func::Sin => {
            if n == 0 {
                return Some(-cos_q / k);
            }
            let rest = integrate_poly_trig(n - 1, &Func::Cos, q, var)?;
            Some(-(v.powi(n as i64) * cos_q) / &k + Sym::int(n as i64) / &k * rest)
        }
        _ => {
            if n == 0 {
                return Some(sin_q / k);
            }
            let rest = integrate_poly_trig(n - 1, &Func::Sin, q, var)?;
            Some(v.powi(n as i64) * sin_q / &k - Sym::int(n as i64) / &k * rest)
        }
    }
}

/// Definite integral. Falls back to an unevaluated integral.
pub fn integrate_definite(x: &Sym, var: &Symbol, lower: &Sym, upper: &Sym) -> Sym {
    if let Some(antideriv) = integrate(x, var) {
        let hi = bound_value(&antideriv, var, upper, Direction::Plus);
        let lo = bound_value(&antideriv, var, lower, Direction::Minus);
        if let (Some(hi), Some(lo)) = (hi, lo) {
            return simplify(&(hi - lo));
        }
    }
    Sym::integral(x.clone(), var.clone(), lower.clone(), upper.clone())
}

fn bound_value(f: &Sym, var: &Symbol, bound: &Sym, dir: Direction) -> Option<Sym> {
    if bound.is_infinite() || bound.is_number() {
        limit(f, var, bound, dir)
    } else {
        Some(subs(f, var, bound))
    }
}

// ============ Limits ============

fn is_pos_oo(x: &Sym) -> bool {
    *x == Sym::oo()
}

fn is_neg_oo(x: &Sym) -> bool {
    *x == -Sym::oo()
}

/// Limit of `x` as `var` approaches `x0` from direction `dir`.
///
/// Returns `None` if the limit cannot be determined.
pub fn limit(x: &Sym, var: &Symbol, x0: &Sym, dir: Direction) -> Option<Sym> {
    if !x.has_symbol(var) {
        return Some(x.clone());
    }
    let infinite = is_pos_oo(x0) || is_neg_oo(x0);
    let x = resolve_singular(x, var, x0, dir);
    if !x.has_symbol(var) {
        return Some(simplify(&x));
    }

    if !infinite && !x.has_func(&Func::is_singular) {
        let c = rational::cancel(&x);
        let (n, d) = numer_denom(&c);
        let dv = simplify(&subs(&d, var, x0));
        if !rational::is_zero(&dv) && !dv.is_infinite() {
            let r = simplify(&(subs(&n, var, x0) / dv));
            if !r.is_infinite() {
                return Some(r);
            }
        }
    }

    let eps_sym = symbol_with("epsilon_lim", SymbolFlags::POSITIVE);
    let eps = Sym::from(&eps_sym);
    let sub = if is_pos_oo(x0) {
        eps.recip()
    } else if is_neg_oo(x0) {
        -eps.recip()
    } else {
        match dir {
            Direction::Plus => x0 + &eps,
            Direction::Minus => x0 - &eps,
        }
    };
    let y = subs(&x, var, &sub);
    let (n, d) = numer_denom(&y);
    let n = expand(&n);
    if rational::is_zero(&n) {
        return Some(Sym::zero());
    }
    let d = expand(&d);
    let ln = leading(&n, &eps_sym)?;
    let ld = leading(&d, &eps_sym)?;

    let ratio = || simplify(&(&ln.coeff / &ld.coeff));
    let infinite_with_sign = |r: Sym| -> Option<Sym> {
        if complex::is_positive(&r) {
            Some(Sym::oo())
        } else if complex::is_negative(&r) {
            Some(-Sym::oo())
        } else {
            match evalf::to_f64(&r) {
                Some(v) if v > 0.0 => Some(Sym::oo()),
                Some(v) if v < 0.0 => Some(-Sym::oo()),
                _ => None,
            }
        }
    };
    match cmp_sym(&ln.rate, &ld.rate)? {
        Ordering::Greater => infinite_with_sign(ratio()),
        Ordering::Less => Some(Sym::zero()),
        Ordering::Equal => match ln.power.cmp(&ld.power) {
            Ordering::Less => infinite_with_sign(ratio()),
            Ordering::Greater => Some(Sym::zero()),
            Ordering::Equal => Some(ratio()),
        },
    }
}

/// Replace step and impulse functions whose value at the limit point is
/// determined by the approach direction.
fn resolve_singular(x: &Sym, var: &Symbol, x0: &Sym, dir: Direction) -> Sym {
    let mut out = x.clone();
    let mut targets = Vec::new();
    collect_singular(x, var, &mut targets);
    for target in targets {
        let Some((func, args)) = target.as_apply() else {
            continue;
        };
        let a = &args[0];
        let Some((slope, _)) = linear_coeffs(a, var) else {
            continue;
        };
        let toward_positive = if is_pos_oo(x0) {
            Some(complex::is_positive(&slope))
        } else if is_neg_oo(x0) {
            Some(complex::is_negative(&slope))
        } else {
            let at = simplify(&subs(a, var, x0));
            if complex::is_positive(&at) {
                Some(true)
            } else if complex::is_negative(&at) {
                Some(false)
            } else if at.is_zero() {
                let up = dir == Direction::Plus;
                if complex::is_positive(&slope) {
                    Some(up)
                } else if complex::is_negative(&slope) {
                    Some(!up)
                } else {
                    None
                }
            } else {
                None
            }
        };
        let Some(positive) = toward_positive else {
            continue;
        };
        let value = match func {
            Func::Heaviside => {
                if positive {
                    Sym::one()
                } else {
                    Sym::zero()
                }
            }
            _ => Sym::zero(),
        };
        out = xreplace(&out, &target, &value);
    }
    out
}

fn collect_singular(x: &Sym, var: &Symbol, out: &mut Vec<Sym>) {
    if let Node::Apply(Func::Heaviside | Func::DiracDelta, args) = x.node() {
        if args[0].has_symbol(var) && !out.contains(x) {
            out.push(x.clone());
        }
        return;
    }
    for a in x.args() {
        collect_singular(&a, var, out);
    }
}

/// Dominant behaviour of a sum as eps -> 0+: `coeff * eps^power * exp(rate/eps)`.
struct Lead {
    rate: Sym,
    power: i64,
    coeff: Sym,
}

fn leading(x: &Sym, eps: &Symbol) -> Option<Lead> {
    let mut groups: Vec<(Sym, i64, Vec<Sym>)> = Vec::new();
    for term in x.terms() {
        let (rate, power, coeff) = term_behaviour(&term, eps)?;
        let existing = groups
            .iter_mut()
            .find(|(r, p, _)| *p == power && rational::is_zero(&(r.clone() - &rate)));
        match existing {
            Some((_, _, cs)) => cs.push(coeff),
            None => groups.push((rate, power, vec![coeff])),
        }
    }

    let mut summed: Vec<Lead> = Vec::with_capacity(groups.len());
    for (rate, power, cs) in groups {
        let coeff = simplify(&Sym::sum(cs));
        if rational::is_zero(&coeff) {
            continue;
        }
        summed.push(Lead { rate, power, coeff });
    }

    let mut best: Option<Lead> = None;
    for cand in summed {
        best = Some(match best {
            None => cand,
            Some(cur) => match cmp_sym(&cand.rate, &cur.rate)? {
                Ordering::Greater => cand,
                Ordering::Less => cur,
                Ordering::Equal => {
                    if cand.power < cur.power {
                        cand
                    } else {
                        cur
                    }
                }
            },
        });
    }
    best
}

fn term_behaviour(term: &Sym, eps: &Symbol) -> Option<(Sym, i64, Sym)> {
    let eps_s = Sym::from(eps);
    let mut rate = Vec::new();
    let mut power: i64 = 0;
    let mut coeff = Vec::new();
    let mut queue = term.factors();
    let mut guard = 0;
    while let Some(f) = queue.pop() {
        guard += 1;
        if guard > 256 {
            return None;
        }
        if !f.has_symbol(eps) {
            coeff.push(f);
            continue;
        }
        if f == eps_s {
            power += 1;
            continue;
        }
        match f.node() {
            Node::Pow(b, e) if *b == eps_s => power += e.as_i64()?,
            Node::Apply(Func::Exp, args) => {
                for t in expand(&args[0]).terms() {
                    let scaled = simplify(&(&t * &eps_s));
                    if !scaled.has_symbol(eps) {
                        rate.push(scaled);
                    } else if !t.has_symbol(eps) {
                        coeff.push(Sym::exp(t));
                    } else {
                        let at_zero = simplify(&subs(&t, eps, &Sym::zero()));
                        if at_zero.is_infinite() || at_zero.has_symbol(eps) {
                            return None;
                        }
                        coeff.push(Sym::exp(at_zero));
                    }
                }
            }
            Node::Apply(Func::Sin | Func::Tan | Func::Atan, args)
                if rational::is_zero(&subs(&args[0], eps, &Sym::zero())) =>
            {
                queue.push(args[0].clone());
            }
            Node::Pow(b, e) => {
                let (c, m) = lowest_term(b, eps)?;
                let total = Sym::int(m) * e;
                power += total.as_i64()?;
                coeff.push(Sym::pow(c, e.clone()));
            }
            Node::Add(_) => {
                let (c, m) = lowest_term(&f, eps)?;
                power += m;
                coeff.push(c);
            }
            _ => {
                let at_zero = simplify(&subs(&f, eps, &Sym::zero()));
                if at_zero.is_infinite() || rational::is_zero(&at_zero) || at_zero.has_symbol(eps) {
                    return None;
                }
                coeff.push(at_zero);
            }
        }
    }
    Some((Sym::sum(rate), power, Sym::product(coeff)))
}

/// Lowest-order term `c * eps^m` of a polynomial in eps.
fn lowest_term(x: &Sym, eps: &Symbol) -> Option<(Sym, i64)> {
    let p = Poly::from_sym(x, eps)?;
    let m = p.lowest_degree()?;
    Some((p.coeff(m), m as i64))
}

/// Compare two expressions by the sign of their difference.
fn cmp_sym(a: &Sym, b: &Sym) -> Option<Ordering> {
    let d = simplify(&(a - b));
    if d.is_zero() {
        return Some(Ordering::Equal);
    }
    if complex::is_positive(&d) {
        return Some(Ordering::Greater);
    }
    if complex::is_negative(&d) {
        return Some(Ordering::Less);
    }
    let v = evalf::to_f64(&d)?;
    v.partial_cmp(&0.0)
}

impl Sym {
    /// Power with a symbolic exponent.
    pub fn pow_sym(&self, e: &Sym) -> Sym {
        Sym::pow(self.clone(), e.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    fn t() -> (Symbol, Sym) {
        let v = symbol::t();
        (v.clone(), Sym::from(v))
    }

    #[test]
    fn test_diff_product_and_chain() {
        let (v, t) = t();
        let e = t.clone() * Sym::exp(Sym::int(2) * t.clone());
        let d = diff(&e, &v);
        let expected = Sym::exp(Sym::int(2) * t.clone()) * (Sym::one() + Sym::int(2) * t);
        assert!(rational::is_zero(&(d - expected)));
    }

    #[test]
    fn test_diff_heaviside_gives_delta() {
        let (v, t) = t();
        assert_eq!(diff(&Sym::heaviside(t.clone()), &v), Sym::dirac_delta(t));
    }

    #[test]
    fn test_integrate_polynomial() {
        let (v, t) = t();
        let r = integrate(&(t.powi(2)), &v).unwrap();
        assert_eq!(r, t.powi(3) / Sym::int(3));
    }

    #[test]
    fn test_definite_exponential() {
        let (v, t) = t();
        let e = Sym::exp(-t);
        let r = integrate_definite(&e, &v, &Sym::zero(), &Sym::oo());
        assert_eq!(r, Sym::one());
    }

    #[test]
    fn test_delta_sifting() {
        let (v, t) = t();
        let e = Sym::dirac_delta(t.clone() - Sym::int(2)) * t.powi(2);
        let r = integrate_definite(&e, &v, &-Sym::oo(), &Sym::oo());
        assert_eq!(r, Sym::int(4));
    }

    #[test]
    fn test_limit_rational_at_infinity() {
        let s = symbol::s();
        let x = Sym::from(&s);
        let e = (Sym::int(3) * x.powi(2) + Sym::one()) / (x.powi(2) + x.clone());
        assert_eq!(limit(&e, &s, &Sym::oo(), Direction::Plus), Some(Sym::int(3)));
    }

    #[test]
    fn test_limit_removable_singularity() {
        let s = symbol::s();
        let x = Sym::from(&s);
        let e = x.clone() / (x.clone() * (x + Sym::one()));
        assert_eq!(limit(&e, &s, &Sym::zero(), Direction::Plus), Some(Sym::one()));
    }

    #[test]
    fn test_limit_exponential_decay() {
        let (v, t) = t();
        let e = Sym::one() - Sym::exp(-t);
        assert_eq!(limit(&e, &v, &Sym::oo(), Direction::Plus), Some(Sym::one()));
    }

    #[test]
    fn test_limit_step_sides() {
        let (v, t) = t();
        let e = Sym::heaviside(t);
        assert_eq!(limit(&e, &v, &Sym::zero(), Direction::Plus), Some(Sym::one()));
        assert_eq!(limit(&e, &v, &Sym::zero(), Direction::Minus), Some(Sym::zero()));
    }
}
