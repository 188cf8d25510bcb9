//! Rational functions of a domain variable.
//!
//! [`Ratfun`] splits an expression into numerator and denominator
//! polynomials plus a multiplicative delay factor `exp(-k·var)`. The
//! second half of this module adds the rational-function operations to
//! [`Expr`]; expressions that are not rational in their domain variable
//! come back unchanged from every operation except [`Expr::coeffs`].

use std::fmt;

use num_bigint::BigInt;
use num_traits::One;

use crate::error::{Result, SymCircuitError};
use crate::expr::Expr;
use crate::sym::{
    calculus, complex, evalf, expand::expand, rational, roots, subs, symbol, Damping, Func, Node, Poly,
    Sym, Symbol,
};

/// Guard against runaway continued-fraction expansions.
const MAX_FRACTION_TERMS: usize = 64;

/// Order of a polynomial or rational function. The zero polynomial has
/// degree minus infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Degree {
    NegInfinity,
    Finite(usize),
}

impl Degree {
    fn of(p: &Poly) -> Degree {
        p.degree().map(Degree::Finite).unwrap_or(Degree::NegInfinity)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degree::NegInfinity => write!(f, "-oo"),
            Degree::Finite(k) => write!(f, "{}", k),
        }
    }
}

/// Numerator and denominator of `x` with the denominator polynomial in
/// `var` where possible. Delay factors are kept in the numerator. With
/// `monic` the denominator is scaled to a unit leading coefficient.
pub fn as_n_d(x: &Sym, var: &Symbol, monic: bool) -> (Sym, Sym) {
    let (mut n, mut d) = rational::cancel_parts(x);

    if !matches!(d.node(), Node::Add(_)) {
        let mut kept = Vec::new();
        for f in d.factors() {
            match f.node() {
                Node::Apply(Func::Exp, args) if args.len() == 1 && args[0].has_symbol(var) => {
                    n = n * Sym::exp(-&args[0]);
                }
                _ => kept.push(f),
            }
        }
        d = Sym::product(kept);
    }

    if monic {
        if let Some(p) = Poly::from_sym(&d, var) {
            let lc = p.leading();
            if !lc.is_zero() && !lc.is_one() {
                n = expand(&(n * lc.recip()));
                d = p.monic().to_sym();
            }
        }
    }
    (n, d)
}

/// Split a term into its delay (exp factors depending on `var`) and the
/// rest.
fn split_term_delay(term: &Sym, var: &Symbol) -> (Sym, Sym) {
    let mut delay = Vec::new();
    let mut rest = Vec::new();
    for f in term.factors() {
        match f.node() {
            Node::Apply(Func::Exp, args) if args.len() == 1 && args[0].has_symbol(var) => {
                delay.push(f)
            }
            _ => rest.push(f),
        }
    }
    (Sym::product(delay), Sym::product(rest))
}

/// Split a numerator into a delay common to all of its terms and the rest.
/// Terms with differing delays leave the numerator whole.
fn split_delay(n: &Sym, var: &Symbol) -> (Sym, Sym) {
    let mut terms = n.terms().into_iter();
    let Some(first) = terms.next() else {
        return (Sym::one(), n.clone());
    };
    let (delay, head) = split_term_delay(&first, var);
    let mut rest = vec![head];
    for term in terms {
        let (d, r) = split_term_delay(&term, var);
        if d != delay {
            return (Sym::one(), n.clone());
        }
        rest.push(r);
    }
    (delay, Sym::sum(rest))
}

pub(crate) fn factorial(k: usize) -> Sym {
    let mut acc = BigInt::one();
    for i in 2..=k {
        acc *= i;
    }
    Sym::integer(acc)
}

/// Rational function `delay · N(var) / D(var)`.
#[derive(Debug, Clone)]
pub struct Ratfun {
    var: Symbol,
    n: Poly,
    d: Poly,
    delay: Sym,
}

impl Ratfun {
    /// View `x` as a rational function of `var`. Returns `None` when the
    /// numerator or denominator is not polynomial once delays are set aside.
    pub fn from_sym(x: &Sym, var: &Symbol) -> Option<Ratfun> {
        let (n, d) = as_n_d(x, var, false);
        let (delay, n) = split_delay(&n, var);
        // Factors shared with the denominator only show once the delay is out.
        let (n, d) = if delay.is_one() {
            (n, d)
        } else {
            rational::cancel_parts(&(n * d.recip()))
        };
        let n = Poly::from_sym(&n, var)?;
        let d = Poly::from_sym(&d, var)?;
        if d.is_zero() {
            return None;
        }
        Some(Ratfun {
            var: var.clone(),
            n,
            d,
            delay,
        })
    }

    pub fn var(&self) -> &Symbol {
        &self.var
    }

    pub fn numerator_poly(&self) -> &Poly {
        &self.n
    }

    pub fn denominator_poly(&self) -> &Poly {
        &self.d
    }

    pub fn delay(&self) -> &Sym {
        &self.delay
    }

    pub fn has_delay(&self) -> bool {
        !self.delay.is_one()
    }

    fn x(&self) -> Sym {
        Sym::from(&self.var)
    }

    fn quotient(&self, n: Sym, d: Sym) -> Sym {
        Sym::product([self.delay.clone(), n, d.recip()])
    }

    /// Numerator including the delay.
    pub fn numerator(&self) -> Sym {
        &self.delay * self.n.to_sym()
    }

    pub fn denominator(&self) -> Sym {
        self.d.to_sym()
    }

    pub fn to_sym(&self) -> Sym {
        self.quotient(self.n.to_sym(), self.d.to_sym())
    }

    /// Ratio of the leading coefficients.
    pub fn gain(&self) -> Sym {
        rational::simplify(&(self.n.leading() / self.d.leading()))
    }

    pub fn is_strictly_proper(&self) -> bool {
        Degree::of(&self.n) < Degree::of(&self.d)
    }

    pub fn degree(&self) -> Degree {
        Degree::of(&self.n).max(Degree::of(&self.d))
    }

    /// Monic denominator; with `factor_const` the numerator is made monic
    /// too and its gain pulled out in front.
    pub fn canonical(&self, factor_const: bool) -> Sym {
        let lc = self.d.leading();
        let d = self.d.monic();
        let n = self.n.scale(&lc.recip());
        if factor_const && !n.is_zero() {
            let k = n.leading();
            let n = n.monic();
            return Sym::product([k, self.quotient(n.to_sym(), d.to_sym())]);
        }
        self.quotient(n.to_sym(), d.to_sym())
    }

    pub fn general(&self) -> Sym {
        self.to_sym()
    }

    /// Polynomial quotient plus strictly proper remainder.
    pub fn standard(&self) -> Option<Sym> {
        let (q, r) = self.n.divrem(&self.d)?;
        let proper = Sym::product([r.to_sym(), self.d.to_sym().recip()]);
        Some(Sym::product([
            self.delay.clone(),
            Sym::sum([q.to_sym(), proper]),
        ]))
    }

    /// Numerator and denominator scaled so that the lowest power of the
    /// denominator has a unit coefficient.
    pub fn timeconst(&self) -> Sym {
        let low = self.d.lowest_degree().unwrap_or(0);
        let c = self.d.coeff(low);
        if c.is_one() {
            return self.to_sym();
        }
        let inv = c.recip();
        self.quotient(self.n.scale(&inv).to_sym(), self.d.scale(&inv).to_sym())
    }

    /// Each numerator term over the monic denominator.
    pub fn expandcanonical(&self) -> Sym {
        let lc = self.d.leading();
        let d = self.d.monic().to_sym().recip();
        let n = expand(&(self.n.to_sym() * lc.recip()));
        let terms = n
            .terms()
            .into_iter()
            .map(|t| Sym::product([self.delay.clone(), t, d.clone()]))
            .collect::<Vec<_>>();
        Sym::sum(terms)
    }

    pub fn zeros(&self, damping: Option<Damping>) -> Option<Vec<(Sym, usize)>> {
        complete_roots(&self.n, damping)
    }

    pub fn poles(&self, damping: Option<Damping>) -> Option<Vec<(Sym, usize)>> {
        complete_roots(&self.d, damping)
    }

    /// Gain, zeros and poles as a product of first-order factors.
    pub fn zpk(&self, damping: Option<Damping>) -> Option<Sym> {
        let x = self.x();
        let zeros = self.zeros(damping)?;
        let poles = self.poles(damping)?;
        let mut factors = vec![self.delay.clone(), self.gain()];
        for (z, m) in zeros {
            factors.push((&x - &z).powi(m as i64));
        }
        for (p, m) in poles {
            factors.push((&x - &p).powi(-(m as i64)));
        }
        Some(Sym::product(factors))
    }

    /// Polynomial quotient and the pole terms of the strictly proper
    /// remainder. Returns `None` when the poles cannot all be found.
    pub fn pole_terms(&self, damping: Option<Damping>) -> Option<(Poly, Vec<PoleTerm>)> {
        let (q, r) = self.n.divrem(&self.d)?;
        let mut terms = Vec::new();
        if r.is_zero() {
            return Some((q, terms));
        }
        let poles = self.poles(damping)?;
        let lc = self.d.leading();
        let rem = r.to_sym();
        for i in 0..poles.len() {
            let (p, m) = &poles[i];
            for (k, coeff) in self.residues(&rem, &lc, &poles, i).into_iter().enumerate() {
                if rational::is_zero(&coeff) {
                    continue;
                }
                terms.push(PoleTerm {
                    pole: p.clone(),
                    order: *m - k,
                    coeff,
                });
            }
        }
        Some((q, terms))
    }

    /// Partial-fraction expansion. Returns `None` when the poles cannot
    /// all be found.
    pub fn partfrac(&self, combine_conjugates: bool, damping: Option<Damping>) -> Option<Sym> {
        let (q, terms) = self.pole_terms(damping)?;
        let x = self.x();
        let mut out = vec![q.to_sym()];
        let mut done = vec![false; terms.len()];
        for i in 0..terms.len() {
            if done[i] {
                continue;
            }
            done[i] = true;
            let term = &terms[i];
            if combine_conjugates {
                if let Some(j) = conjugate_partner(&terms, &done, i) {
                    done[j] = true;
                    let other = &terms[j];
                    let num = rational::simplify(&expand(
                        &(&term.coeff * (&x - &other.pole) + &other.coeff * (&x - &term.pole)),
                    ));
                    let den =
                        rational::simplify(&expand(&((&x - &term.pole) * (&x - &other.pole))));
                    out.push(Sym::product([num, den.recip()]));
                    continue;
                }
            }
            out.push(term.to_sym(&x));
        }
        Some(Sym::product([self.delay.clone(), Sym::sum(out)]))
    }

    /// Coefficients of `1/(x-p)^(m-k)` for `k` in `0..m`, for the pole at
    /// index `i`, by repeated differentiation of the reduced remainder.
    fn residues(&self, rem: &Sym, lc: &Sym, poles: &[(Sym, usize)], i: usize) -> Vec<Sym> {
        let x = self.x();
        let (p, m) = &poles[i];
        let others = Sym::product(
            poles
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (pj, mj))| (&x - pj).powi(*mj as i64))
                .collect::<Vec<_>>(),
        );
        let g = rem / &(lc * &others);
        let numeric = rational::has_float(p);
        (0..*m)
            .map(|k| {
                let dk = calculus::diff_n(&g, &self.var, k as u32);
                let at = subs::subs(&dk, &self.var, p) / factorial(k);
                // Poles found numerically give numeric residues.
                match evalf::to_complex(&at) {
                    Some(z) if numeric => roots::complex_to_sym(z),
                    _ => rational::simplify(&at),
                }
            })
            .collect()
    }
}

/// One term `coeff / (var - pole)^order` of a partial-fraction expansion.
#[derive(Debug, Clone)]
pub struct PoleTerm {
    pub pole: Sym,
    pub order: usize,
    pub coeff: Sym,
}

impl PoleTerm {
    pub fn to_sym(&self, x: &Sym) -> Sym {
        Sym::product([self.coeff.clone(), (x - &self.pole).powi(-(self.order as i64))])
    }
}

/// Index of the first-order term whose pole is the complex conjugate of
/// the pole of term `i`.
pub(crate) fn conjugate_partner(terms: &[PoleTerm], done: &[bool], i: usize) -> Option<usize> {
    let term = &terms[i];
    if term.order != 1 || complex::is_real(&term.pole) {
        return None;
    }
    let pc = complex::conjugate(&term.pole);
    (i + 1..terms.len()).find(|&j| {
        !done[j] && terms[j].order == 1 && rational::is_zero(&(&terms[j].pole - &pc))
    })
}

/// Roots with multiplicities, only if they account for the full degree.
fn complete_roots(p: &Poly, damping: Option<Damping>) -> Option<Vec<(Sym, usize)>> {
    let found = roots::roots(p, damping)?;
    let total: usize = found.iter().map(|(_, m)| m).sum();
    (total == p.degree().unwrap_or(0)).then_some(found)
}

/// Leading (or, for `trailing`, lowest-order) term of a polynomial as a
/// monomial `(coefficient, power)`.
fn end_term(p: &Poly, trailing: bool) -> Option<(Sym, usize)> {
    let k = if trailing { p.lowest_degree()? } else { p.degree()? };
    Some((p.coeff(k), k))
}

/// Euclidean-style expansion alternating between `N/D` and `D/remainder`.
fn fraction_coeffs(n: Poly, d: Poly, trailing: bool) -> Vec<Sym> {
    let var = n.var().clone();
    let x = Sym::from(&var);
    let mut coeffs = Vec::new();

    let (mut n, mut d) = (n, d);
    let swap = match (end_term(&n, trailing), end_term(&d, trailing)) {
        (Some((_, kn)), Some((_, kd))) if trailing => kn > kd,
        (Some((_, kn)), Some((_, kd))) => kd > kn,
        _ => false,
    };
    if swap {
        coeffs.push(Sym::zero());
        std::mem::swap(&mut n, &mut d);
    }

    for _ in 0..MAX_FRACTION_TERMS {
        let (Some((cn, kn)), Some((cd, kd))) = (end_term(&n, trailing), end_term(&d, trailing))
        else {
            break;
        };
        let q = rational::simplify(&(cn / cd)) * x.powi(kn as i64 - kd as i64);
        coeffs.push(q.clone());
        let rest = expand(&(n.to_sym() - q * d.to_sym()));
        let Some(rest) = Poly::from_sym(&rest, &var) else {
            log::debug!("continued fraction stopped: remainder {} is not polynomial", rest);
            break;
        };
        if rest.is_zero() {
            break;
        }
        n = d;
        d = rest;
    }
    coeffs
}

fn nest_fraction(coeffs: &[Sym]) -> Sym {
    match coeffs.split_first() {
        None => Sym::zero(),
        Some((c, [])) => c.clone(),
        Some((c, rest)) => c + nest_fraction(rest).recip(),
    }
}

impl Expr {
    /// Numerator and denominator, the denominator polynomial in the domain
    /// variable where possible.
    fn n_d(&self, monic: bool) -> (Sym, Sym) {
        match self.var() {
            Some(var) => as_n_d(&self.sym, &var, monic),
            None => rational::cancel_parts(&self.sym),
        }
    }

    pub fn numerator(&self) -> Expr {
        self.rewrap(self.n_d(false).0)
    }

    pub fn denominator(&self) -> Expr {
        self.rewrap(self.n_d(false).1)
    }

    /// Numerator and denominator as a pair, optionally with a monic
    /// denominator.
    pub fn as_n_d(&self, monic_denominator: bool) -> (Expr, Expr) {
        let (n, d) = self.n_d(monic_denominator);
        (self.rewrap(n), self.rewrap(d))
    }

    pub fn is_rational_function(&self) -> bool {
        self.ratfun().is_some()
    }

    /// True if the numerator degree is lower than the denominator degree.
    pub fn is_strictly_proper(&self) -> bool {
        self.ratfun().map(Ratfun::is_strictly_proper).unwrap_or(false)
    }

    /// Leading-coefficient ratio.
    pub fn gain(&self) -> Expr {
        match self.ratfun() {
            Some(r) => Expr::constant(r.gain()),
            None => self.clone(),
        }
    }

    fn with_ratfun(&self, f: impl FnOnce(&Ratfun) -> Option<Sym>) -> Expr {
        match self.ratfun().and_then(f) {
            Some(sym) => self.rewrap(sym),
            None => self.clone(),
        }
    }

    /// Polynomial form with a unit leading coefficient in the denominator.
    pub fn canonical(&self) -> Expr {
        self.canonical_with(false)
    }

    pub fn canonical_with(&self, factor_const: bool) -> Expr {
        match self.var() {
            Some(var) if self.sym.has_symbol(&var) => {
                self.with_ratfun(|r| Some(r.canonical(factor_const)))
            }
            _ => self.clone(),
        }
    }

    /// Expanded numerator over expanded denominator.
    pub fn general(&self) -> Expr {
        self.with_ratfun(|r| Some(r.general()))
    }

    pub fn partfrac(&self) -> Expr {
        self.partfrac_with(false, None)
    }

    /// Partial-fraction expansion. Expressions that are not a single
    /// rational function (sums of delayed terms, for example) are split
    /// into terms first.
    pub fn partfrac_with(&self, combine_conjugates: bool, damping: Option<Damping>) -> Expr {
        if let Some(sym) = self
            .ratfun()
            .and_then(|r| r.partfrac(combine_conjugates, damping))
        {
            return self.rewrap(sym);
        }
        let Some(var) = self.var() else {
            return self.clone();
        };
        log::debug!("partial fractions of {} term by term", self);
        let terms = self
            .as_sum()
            .sym
            .terms()
            .into_iter()
            .map(|term| {
                Ratfun::from_sym(&term, &var)
                    .and_then(|r| r.partfrac(combine_conjugates, damping))
                    .unwrap_or(term)
            })
            .collect::<Vec<_>>();
        self.rewrap(Sym::sum(terms))
    }

    /// Partial fractions in `1/var`, for expansions about infinity.
    pub fn recippartfrac(&self) -> Expr {
        self.recippartfrac_with(false, None)
    }

    pub fn recippartfrac_with(&self, combine_conjugates: bool, damping: Option<Damping>) -> Expr {
        let Some(var) = self.var() else {
            return self.clone();
        };
        let tmp = symbol::symbol("qtmp");
        let q = Sym::from(&tmp);
        let inverted = subs::subs(&self.sym, &var, &q.recip());
        let Some(expanded) =
            Ratfun::from_sym(&inverted, &tmp).and_then(|r| r.partfrac(combine_conjugates, damping))
        else {
            return self.clone();
        };
        self.rewrap(subs::subs(&expanded, &tmp, &Sym::from(&var).recip()))
    }

    /// Polynomial part plus strictly proper remainder.
    pub fn standard(&self) -> Expr {
        self.with_ratfun(Ratfun::standard)
    }

    pub fn mixedfrac(&self) -> Expr {
        self.standard()
    }

    /// Time-constant form: unit lowest-order denominator coefficient.
    pub fn timeconst(&self) -> Expr {
        self.with_ratfun(|r| Some(r.timeconst()))
    }

    /// Time-constant form of each additive term.
    pub fn timeconst_terms(&self) -> Expr {
        let Some(var) = self.var() else {
            return self.clone();
        };
        let terms = self
            .sym
            .terms()
            .into_iter()
            .map(|t| Ratfun::from_sym(&t, &var).map(|r| r.timeconst()).unwrap_or(t))
            .collect::<Vec<_>>();
        self.rewrap(Sym::sum(terms))
    }

    /// Zero-pole-gain form.
    pub fn zpk(&self) -> Expr {
        self.zpk_with(None)
    }

    pub fn zpk_with(&self, damping: Option<Damping>) -> Expr {
        self.with_ratfun(|r| r.zpk(damping))
    }

    pub fn factored(&self) -> Expr {
        self.zpk()
    }

    /// Canonical form split into one term per numerator power.
    pub fn expandcanonical(&self) -> Expr {
        self.with_ratfun(|r| Some(r.expandcanonical()))
    }

    /// Polynomial coefficients, highest power first.
    pub fn coeffs(&self) -> Result<Vec<Expr>> {
        self.coeffs_with(false)
    }

    /// Coefficients divided by the leading coefficient.
    pub fn normcoeffs(&self) -> Result<Vec<Expr>> {
        self.coeffs_with(true)
    }

    pub fn coeffs_with(&self, norm: bool) -> Result<Vec<Expr>> {
        let not_rational = || SymCircuitError::NotRational {
            expr: self.to_string(),
        };
        let var = self.var().ok_or_else(not_rational)?;
        let poly = Poly::from_sym(&self.sym, &var).ok_or_else(not_rational)?;
        let coeffs = poly.all_coeffs();
        let lead = coeffs.first().cloned().unwrap_or_else(Sym::one);
        Ok(coeffs
            .into_iter()
            .map(|c| {
                if norm && !lead.is_zero() {
                    Expr::constant(rational::simplify(&(c / &lead)))
                } else {
                    Expr::constant(c)
                }
            })
            .collect())
    }

    /// Zeros (roots of the numerator) with their multiplicities.
    pub fn roots(&self) -> Vec<(Expr, usize)> {
        self.zeros_with(None)
    }

    pub fn zeros(&self) -> Vec<(Expr, usize)> {
        self.zeros_with(None)
    }

    pub fn zeros_with(&self, damping: Option<Damping>) -> Vec<(Expr, usize)> {
        let found = self.ratfun().and_then(|r| r.zeros(damping));
        tag_roots(found)
    }

    pub fn poles(&self) -> Vec<(Expr, usize)> {
        self.poles_with(None)
    }

    pub fn poles_with(&self, damping: Option<Damping>) -> Vec<(Expr, usize)> {
        let found = self.ratfun().and_then(|r| r.poles(damping));
        tag_roots(found)
    }

    /// Zeros repeated according to multiplicity.
    pub fn zeros_list(&self) -> Vec<Expr> {
        flatten_roots(self.zeros())
    }

    pub fn poles_list(&self) -> Vec<Expr> {
        flatten_roots(self.poles())
    }

    /// Larger of the numerator and denominator degrees. Expressions that
    /// are not rational functions have degree 1.
    pub fn degree(&self) -> Degree {
        self.ratfun()
            .map(Ratfun::degree)
            .unwrap_or(Degree::Finite(1))
    }

    pub fn n_degree(&self) -> Degree {
        self.ratfun()
            .map(|r| Degree::of(&r.n))
            .unwrap_or(Degree::Finite(1))
    }

    pub fn d_degree(&self) -> Degree {
        self.ratfun()
            .map(|r| Degree::of(&r.d))
            .unwrap_or(Degree::Finite(1))
    }

    /// Keep powers of the domain variable up to `degree` in a polynomial.
    pub fn prune_hot(&self, degree: usize) -> Expr {
        let Some(var) = self.var() else {
            return self.clone();
        };
        let Some(poly) = Poly::from_sym(&self.sym, &var) else {
            return self.clone();
        };
        if poly.degree().map(|k| k <= degree).unwrap_or(true) {
            return self.clone();
        }
        let kept = Poly::new(var, poly.coeffs().iter().take(degree + 1).cloned().collect());
        self.rewrap(kept.to_sym())
    }

    /// Each numerator term over the common denominator.
    pub fn as_sum(&self) -> Expr {
        let (n, d) = self.n_d(false);
        let inv = d.recip();
        let terms = expand(&n)
            .terms()
            .into_iter()
            .map(|t| Sym::product([t, inv.clone()]))
            .collect::<Vec<_>>();
        self.rewrap(Sym::sum(terms))
    }

    /// Rewrite each term with a monic denominator.
    pub fn as_monic_terms(&self) -> Expr {
        self.map_terms_n_d(true)
    }

    /// Rewrite each term with its denominator as found.
    pub fn as_nonmonic_terms(&self) -> Expr {
        self.map_terms_n_d(false)
    }

    fn map_terms_n_d(&self, monic: bool) -> Expr {
        let Some(var) = self.var() else {
            return self.clone();
        };
        let terms = self
            .sym
            .terms()
            .into_iter()
            .map(|t| {
                let (n, d) = as_n_d(&t, &var, monic);
                Sym::product([n, d.recip()])
            })
            .collect::<Vec<_>>();
        self.rewrap(Sym::sum(terms))
    }

    fn fraction_parts(&self) -> Option<(Poly, Poly)> {
        let var = self.var()?;
        let (n, d) = rational::cancel_parts(&self.sym);
        Some((Poly::from_sym(&n, &var)?, Poly::from_sym(&d, &var)?))
    }

    /// Terms of the continued-fraction expansion about infinity.
    pub fn continued_fraction_coeffs(&self) -> Vec<Expr> {
        match self.fraction_parts() {
            Some((n, d)) => fraction_coeffs(n, d, false)
                .into_iter()
                .map(|c| self.rewrap(c))
                .collect(),
            None => vec![self.clone()],
        }
    }

    /// `c0 + 1/(c1 + 1/(c2 + ...))`.
    pub fn as_continued_fraction(&self) -> Expr {
        match self.fraction_parts() {
            Some((n, d)) => self.rewrap(nest_fraction(&fraction_coeffs(n, d, false))),
            None => self.clone(),
        }
    }

    /// Terms of the continued-fraction expansion about zero.
    pub fn continued_fraction_inverse_coeffs(&self) -> Vec<Expr> {
        match self.fraction_parts() {
            Some((n, d)) => fraction_coeffs(n, d, true)
                .into_iter()
                .map(|c| self.rewrap(c))
                .collect(),
            None => vec![self.clone()],
        }
    }

    pub fn as_continued_fraction_inverse(&self) -> Expr {
        match self.fraction_parts() {
            Some((n, d)) => self.rewrap(nest_fraction(&fraction_coeffs(n, d, true))),
            None => self.clone(),
        }
    }

    /// Divide numerator and denominator by `factor`, expanding both.
    pub fn divide_top_and_bottom(&self, factor: &Expr) -> Expr {
        let (n, d) = self.n_d(false);
        let n = expand(&(n / &factor.sym));
        let d = expand(&(d / &factor.sym));
        self.rewrap(Sym::product([n, d.recip()]))
    }

    pub fn multiply_top_and_bottom(&self, factor: &Expr) -> Expr {
        let (n, d) = self.n_d(false);
        let n = expand(&(n * &factor.sym));
        let d = expand(&(d * &factor.sym));
        self.rewrap(Sym::product([n, d.recip()]))
    }

    /// Split `self = c · r` where `c` is free of the domain variable.
    pub fn factor_const(&self) -> (Expr, Expr) {
        let var = self.var();
        let (c, r): (Vec<Sym>, Vec<Sym>) = self
            .sym
            .factors()
            .into_iter()
            .partition(|f| var.as_ref().map(|v| !f.has_symbol(v)).unwrap_or(true));
        (Expr::constant(Sym::product(c)), self.rewrap(Sym::product(r)))
    }

    /// Split `self = c + r` where `c` is free of the domain variable.
    pub fn term_const(&self) -> (Expr, Expr) {
        let var = self.var();
        let (c, r): (Vec<Sym>, Vec<Sym>) = expand(&self.sym)
            .terms()
            .into_iter()
            .partition(|t| var.as_ref().map(|v| !t.has_symbol(v)).unwrap_or(true));
        (Expr::constant(Sym::sum(c)), self.rewrap(Sym::sum(r)))
    }
}

fn tag_roots(found: Option<Vec<(Sym, usize)>>) -> Vec<(Expr, usize)> {
    found
        .unwrap_or_default()
        .into_iter()
        .map(|(r, m)| (Expr::constant(r), m))
        .collect()
}

fn flatten_roots(found: Vec<(Expr, usize)>) -> Vec<Expr> {
    found
        .into_iter()
        .flat_map(|(r, m)| std::iter::repeat(r).take(m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{expr, Domain};

    #[test]
    fn test_common_factor_cancels() {
        let h = expr("(s + 1) / (s^2 + 3 * s + 2)").unwrap();
        assert!(h.is_rational_function());
        assert_eq!(h.poles_list().len(), 1);
        assert!(h.poles_list()[0] == -2);
        assert!(h.zeros().is_empty());
    }

    #[test]
    fn test_partfrac_simple_poles() {
        let h = expr("1 / (s * (s + 1))").unwrap();
        let pf = h.partfrac();
        assert_eq!(pf.sym().terms().len(), 2);
        assert!(pf.equals(expr("1 / s - 1 / (s + 1)").unwrap()));
        assert!(pf.equals(&h));
    }

    #[test]
    fn test_partfrac_repeated_pole() {
        let h = expr("1 / (s * (s + 1)^2)").unwrap();
        let pf = h.partfrac();
        assert_eq!(pf.sym().terms().len(), 3);
        assert!(pf.equals(expr("1 / s - 1 / (s + 1) - 1 / (s + 1)^2").unwrap()));
    }

    #[test]
    fn test_partfrac_improper() {
        let h = expr("(s^2 + 2) / (s + 1)").unwrap();
        assert!(h.partfrac().equals(expr("s - 1 + 3 / (s + 1)").unwrap()));
        assert!(h.standard().equals(&h));
    }

    #[test]
    fn test_delay_kept_in_numerator() {
        let h = expr("exp(-s * T) / (s + 1)").unwrap();
        assert!(h.is_rational_function());
        assert!(h.denominator().equals(expr("s + 1").unwrap()));
        assert!(h.partfrac().equals(&h));
        assert_eq!(h.d_degree(), Degree::Finite(1));
    }

    #[test]
    fn test_delay_times_polynomial_numerator() {
        let h = expr("(s + 1) * exp(-2 * s) / (2 * s^2 + 6 * s + 4)").unwrap();
        assert!(h.is_rational_function());
        assert_eq!(h.poles_list().len(), 1);
        assert!(h.poles_list()[0] == -2);
        assert_eq!(h.d_degree(), Degree::Finite(1));
        assert!(h.canonical().equals(expr("exp(-2 * s) / (2 * (s + 2))").unwrap()));

        let g = expr("(s + 3) * exp(-s) / (s^2 + 3 * s + 2)").unwrap();
        assert!(g.is_rational_function());
        assert_eq!(g.n_degree(), Degree::Finite(1));
        assert_eq!(g.poles_list().len(), 2);
        let pf = g.partfrac();
        assert!(pf.equals(&g));
        assert!(pf.equals(expr("2 * exp(-s) / (s + 1) - exp(-s) / (s + 2)").unwrap()));
    }

    #[test]
    fn test_partfrac_falls_back_to_terms() {
        let h = expr("1 / s - exp(-s) / s").unwrap();
        assert!(!h.is_rational_function());
        assert!(h.partfrac().equals(&h));
    }

    #[test]
    fn test_partfrac_irrational_cubic() {
        let h = expr("1 / (s^3 + 2 * s^2 + 3 * s + 1)").unwrap();
        assert_eq!(h.poles_list().len(), 3);
        let pf = h.partfrac();
        assert!(pf.equals(&h));
        assert!(!pf.equals(&expr("1 / (s^3 + 2 * s^2 + 3 * s + 2)").unwrap()));
    }

    #[test]
    fn test_coeffs() {
        let p = expr("s^2 + 2 * s + 3").unwrap();
        let c = p.coeffs().unwrap();
        assert_eq!(c.len(), 3);
        assert!(c[0] == 1 && c[1] == 2 && c[2] == 3);

        let q = expr("2 * s + 4").unwrap();
        let n = q.normcoeffs().unwrap();
        assert!(n[0] == 1 && n[1] == 2);

        let h = expr("1 / (s + 1)").unwrap();
        assert!(matches!(h.coeffs(), Err(SymCircuitError::NotRational { .. })));
    }

    #[test]
    fn test_degrees() {
        let h = expr("(s + 1) / (s^2 + 1)").unwrap();
        assert_eq!(h.n_degree(), Degree::Finite(1));
        assert_eq!(h.d_degree(), Degree::Finite(2));
        assert_eq!(h.degree(), Degree::Finite(2));
        assert!(h.is_strictly_proper());
        let zero = Expr::domain_var(Domain::Laplace).unwrap().multiply(0).unwrap();
        assert_eq!(zero.n_degree(), Degree::NegInfinity);
    }

    #[test]
    fn test_zpk_and_canonical_agree() {
        let h = expr("(2 * s + 2) / (s^2 + 5 * s + 6)").unwrap();
        let zpk = h.zpk();
        assert!(matches!(zpk.sym().node(), Node::Mul(_)));
        assert!(zpk.equals(&h));
        assert!(h.canonical().equals(&h));
        assert!(h.canonical_with(true).equals(&h));
        assert!(h.timeconst().equals(&h));
        assert!(h.expandcanonical().equals(&h));
        assert!(h.gain() == 2);
    }

    #[test]
    fn test_continued_fraction() {
        let z = expr("(s^3 + 2 * s) / (s^2 + 1)").unwrap();
        let c = z.continued_fraction_coeffs();
        assert_eq!(c.len(), 3);
        assert!(c.iter().all(|k| k.equals(expr("s").unwrap())));
        assert!(z.as_continued_fraction().equals(&z));
    }

    #[test]
    fn test_continued_fraction_inverse() {
        let z = expr("(s^3 + 2 * s) / (s^2 + 1)").unwrap();
        let c = z.continued_fraction_inverse_coeffs();
        assert_eq!(c.len(), 4);
        assert!(c[0].is_zero());
        assert!(z.as_continued_fraction_inverse().equals(&z));
    }

    #[test]
    fn test_prune_hot() {
        let p = expr("1 + s + s^2 + s^3").unwrap();
        assert!(p.prune_hot(1).equals(expr("1 + s").unwrap()));
    }

    #[test]
    fn test_const_splits() {
        let h = expr("4 * R / (s + 1)").unwrap();
        let (c, r) = h.factor_const();
        assert!(c.equals(expr("4 * R").unwrap()));
        assert!(r.equals(expr("1 / (s + 1)").unwrap()));

        let x = expr("3 + a + s").unwrap();
        let (c, r) = x.term_const();
        assert!(c.equals(expr("3 + a").unwrap()));
        assert!(r.equals(expr("s").unwrap()));
    }

    #[test]
    fn test_non_rational_degrades() {
        let x = expr("sin(s)").unwrap();
        assert!(x.partfrac().equals(&x));
        assert!(x.poles().is_empty());
        assert_eq!(x.degree(), Degree::Finite(1));
        assert!(x.coeffs().is_err());
    }
}
