//! Domain transforms.
//!
//! The backend-level transforms in [`laplace`], [`fourier`] and
//! [`ztransform`] are table driven: each additive term is matched against a
//! small set of standard pairs and anything else is reported as
//! [`SymCircuitError::TransformUndefined`]. This module wires them up to
//! [`Expr`], taking care of assumption inference and of the kind of the
//! result.

pub mod fourier;
pub mod laplace;
pub mod ztransform;

use crate::error::{Result, SymCircuitError};
use crate::expr::{Assumptions, Domain, Expr, Kind};
use crate::sym::{calculus, expand::expand, subs, symbol, Func, Node, Sym, Symbol};

/// Split a term into the factor free of `var` and the rest.
pub(crate) fn split_const(term: &Sym, var: &Symbol) -> (Sym, Sym) {
    let (c, rest): (Vec<Sym>, Vec<Sym>) =
        term.factors().into_iter().partition(|f| !f.has_symbol(var));
    (Sym::product(c), Sym::product(rest))
}

/// Swap the case of the first letter of an undefined function name, so
/// that `v(t)` pairs with `V(s)`.
pub(crate) fn conjugate_name(name: &str, upper: bool) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The undefined-function application `rest`, if it is one with a single
/// argument.
pub(crate) fn as_undefined(rest: &Sym) -> Option<(&str, &Sym)> {
    match rest.node() {
        Node::Apply(Func::Undefined(name), args) if args.len() == 1 => Some((name, &args[0])),
        _ => None,
    }
}

/// Rescale Dirac deltas of `var` to unit slope: `δ(a x + b)` becomes
/// `δ(x + b/a) / |a|`.
pub(crate) fn normalize_deltas(x: &Sym, var: &Symbol) -> Sym {
    match x.node() {
        Node::Apply(Func::DiracDelta, args) if args.len() == 1 => {
            match calculus::linear_coeffs(&args[0], var) {
                Some((a, b)) if !a.is_one() => {
                    let shifted = Sym::dirac_delta(Sym::from(var) + b / &a);
                    shifted * Sym::abs(a).recip()
                }
                _ => x.clone(),
            }
        }
        Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => x.clone(),
        _ => x.map_args(|a| normalize_deltas(a, var)),
    }
}

/// `x(var + by)`, expanded.
pub(crate) fn advance(x: &Sym, var: &Symbol, by: &Sym) -> Sym {
    expand(&subs::subs(x, var, &(Sym::from(var) + by)))
}

/// Keep only the signal-class keys of an assumption set.
fn signal_class(a: &Assumptions) -> Assumptions {
    Assumptions {
        causal: a.causal,
        dc: a.dc,
        ac: a.ac,
        nid: a.nid.clone(),
        ..Assumptions::default()
    }
}

fn wrong_domain(transform: &str, x: &Expr) -> SymCircuitError {
    SymCircuitError::transform_undefined(
        transform,
        x,
        format!("not defined for {} expressions", x.domain().name()),
    )
}

impl Expr {
    /// Assumptions of the source signal: inferred, then overridden.
    fn source_assumptions(&self, overrides: &Assumptions) -> Assumptions {
        let mut inferred = self.infer_assumptions().assumptions().clone();
        if self.domain() == Domain::Constant && inferred.dc.is_none() {
            inferred.dc = Some(true);
        }
        inferred.merge(overrides)
    }

    fn forward(
        &self,
        name: &str,
        source: Domain,
        target: Kind,
        overrides: &Assumptions,
        f: impl FnOnce(&Sym, &Assumptions) -> Result<Sym>,
    ) -> Result<Expr> {
        match self.domain() {
            d if d == target.domain => return Ok(self.clone()),
            d if d == source || d == Domain::Constant || d == Domain::Generic => {}
            _ => return Err(wrong_domain(name, self)),
        }
        let assumptions = self.source_assumptions(overrides);
        let result = f(&self.sym, &assumptions)?;
        log::debug!("{} of {} is {}", name, self, result);
        Ok(Expr::from_parts(result, target, signal_class(&assumptions)))
    }

    fn inverse(
        &self,
        name: &str,
        source: Domain,
        target: Kind,
        overrides: &Assumptions,
        f: impl FnOnce(&Sym, &Assumptions) -> Result<Sym>,
    ) -> Result<Expr> {
        match self.domain() {
            d if d == target.domain => return Ok(self.clone()),
            d if d == source || d == Domain::Constant || d == Domain::Generic => {}
            _ => return Err(wrong_domain(name, self)),
        }
        let assumptions = self.assumptions.merge(overrides);
        let result = f(&self.sym, &assumptions)?;
        log::debug!("{} of {} is {}", name, self, result);
        Expr::with_assumptions(result, target, signal_class(&assumptions))
    }

    /// Kind of the transform of this expression into `domain`, given the
    /// conjugate map of the transform.
    fn conjugate_kind(&self, source: Domain, conjugate: impl Fn(Kind) -> Kind) -> Kind {
        conjugate(self.kind.with_domain(source))
    }

    /// Unilateral Laplace transform with `0-` as the lower limit.
    pub fn laplace(&self) -> Result<Expr> {
        self.laplace_with(&Assumptions::new())
    }

    pub fn laplace_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::Time, Kind::laplace_conjugate);
        self.forward("Laplace transform", Domain::Time, target, overrides, |x, _| {
            laplace::laplace_transform(x, &symbol::t(), &symbol::s())
        })
    }

    /// Inverse Laplace transform. Terms that are not impulses need the
    /// signal to be known causal, DC or AC.
    pub fn inverse_laplace(&self) -> Result<Expr> {
        self.inverse_laplace_with(&Assumptions::new())
    }

    pub fn inverse_laplace_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::Laplace, Kind::laplace_conjugate);
        self.inverse(
            "inverse Laplace transform",
            Domain::Laplace,
            target,
            overrides,
            |x, a| laplace::inverse_laplace_transform(x, &symbol::s(), &symbol::t(), a),
        )
    }

    /// Fourier transform in ordinary frequency `f`.
    pub fn fourier(&self) -> Result<Expr> {
        self.fourier_with(&Assumptions::new())
    }

    pub fn fourier_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::Time, Kind::fourier_conjugate);
        self.forward("Fourier transform", Domain::Time, target, overrides, |x, a| {
            fourier::fourier_transform(&fourier::gate_causal(x, a), &symbol::t(), &symbol::f())
        })
    }

    pub fn inverse_fourier(&self) -> Result<Expr> {
        self.inverse_fourier_with(&Assumptions::new())
    }

    pub fn inverse_fourier_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::Fourier, Kind::fourier_conjugate);
        self.inverse(
            "inverse Fourier transform",
            Domain::Fourier,
            target,
            overrides,
            |x, _| fourier::inverse_fourier_transform(x, &symbol::f(), &symbol::t()),
        )
    }

    /// Fourier transform in angular frequency `omega`.
    pub fn angular_fourier(&self) -> Result<Expr> {
        self.angular_fourier_with(&Assumptions::new())
    }

    pub fn angular_fourier_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::Time, Kind::angular_fourier_conjugate);
        self.forward(
            "angular Fourier transform",
            Domain::Time,
            target,
            overrides,
            |x, a| {
                let x = fourier::gate_causal(x, a);
                fourier::angular_fourier_transform(&x, &symbol::t(), &symbol::omega())
            },
        )
    }

    pub fn inverse_angular_fourier(&self) -> Result<Expr> {
        self.inverse_angular_fourier_with(&Assumptions::new())
    }

    pub fn inverse_angular_fourier_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::AngularFourier, Kind::angular_fourier_conjugate);
        self.inverse(
            "inverse angular Fourier transform",
            Domain::AngularFourier,
            target,
            overrides,
            |x, _| fourier::inverse_angular_fourier_transform(x, &symbol::omega(), &symbol::t()),
        )
    }

    /// Unilateral z-transform.
    pub fn ztransform(&self) -> Result<Expr> {
        self.ztransform_with(&Assumptions::new())
    }

    pub fn ztransform_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::DiscreteTime, Kind::z_conjugate);
        self.forward("z-transform", Domain::DiscreteTime, target, overrides, |x, _| {
            ztransform::ztransform(x, &symbol::n(), &symbol::z())
        })
    }

    /// Inverse z-transform. Terms that are not unit impulses need the
    /// sequence to be known causal.
    pub fn inverse_ztransform(&self) -> Result<Expr> {
        self.inverse_ztransform_with(&Assumptions::new())
    }

    pub fn inverse_ztransform_with(&self, overrides: &Assumptions) -> Result<Expr> {
        let target = self.conjugate_kind(Domain::Z, Kind::z_conjugate);
        self.inverse(
            "inverse z-transform",
            Domain::Z,
            target,
            overrides,
            |x, a| ztransform::inverse_ztransform(x, &symbol::z(), &symbol::n(), a),
        )
    }

    /// Transform to the domain of `arg`, or substitute it.
    ///
    /// A bare domain variable selects a transform (`x.transform(s)` is the
    /// Laplace transform of a time-domain `x`, `H.transform(omega)` the
    /// frequency response of a Laplace-domain `H`). Any other expression is
    /// substituted for the domain variable.
    pub fn transform(&self, arg: &Expr) -> Result<Expr> {
        let Some(target) = bare_domain(arg) else {
            return self.subs_var(arg);
        };
        let source = self.domain();
        if source == target {
            return Ok(self.clone());
        }
        use Domain::*;
        match (source, target) {
            (Time | Constant | Generic, Laplace) => self.laplace(),
            (Time | Constant | Generic, Fourier) => self.fourier(),
            (Time | Constant | Generic, AngularFourier) => self.angular_fourier(),
            (DiscreteTime | Constant | Generic, Z) => self.ztransform(),
            (Laplace, Time) => self.inverse_laplace(),
            (Fourier, Time) => self.inverse_fourier(),
            (AngularFourier, Time) => self.inverse_angular_fourier(),
            (Z, DiscreteTime) => self.inverse_ztransform(),
            (Laplace, Fourier) => self.subs_var(&frequency_response(Fourier)?),
            (Laplace, AngularFourier) => self.subs_var(&frequency_response(AngularFourier)?),
            (Fourier, AngularFourier) => {
                let f = Expr::domain_var(AngularFourier)
                    .map(|w| w.sym / (Sym::int(2) * Sym::pi()))
                    .ok_or_else(|| wrong_domain("angular Fourier transform", self))?;
                self.subs_var(&Expr::from_parts(
                    f,
                    Kind::of(AngularFourier),
                    Assumptions::new(),
                ))
            }
            (AngularFourier, Fourier) => {
                let w = Expr::domain_var(Fourier)
                    .map(|f| Sym::int(2) * Sym::pi() * f.sym)
                    .ok_or_else(|| wrong_domain("Fourier transform", self))?;
                self.subs_var(&Expr::from_parts(w, Kind::of(Fourier), Assumptions::new()))
            }
            (Fourier | AngularFourier, Laplace) => self.transform(&time_var()?)?.laplace(),
            _ => Err(
                SymCircuitError::transform_undefined(
                    format!("{} to {} transform", source.name(), target.name()),
                    self,
                    "no transform between these domains",
                ),
            ),
        }
    }

    /// Call syntax: same as [`Expr::transform`].
    pub fn call(&self, arg: &Expr) -> Result<Expr> {
        self.transform(arg)
    }
}

fn time_var() -> Result<Expr> {
    Expr::domain_var(Domain::Time)
        .ok_or_else(|| SymCircuitError::invalid_argument("transform", "no time variable"))
}

/// `j 2 pi f` or `j omega`, to substitute for `s`.
fn frequency_response(domain: Domain) -> Result<Expr> {
    let var = Expr::domain_var(domain)
        .ok_or_else(|| SymCircuitError::invalid_argument("transform", "no domain variable"))?;
    let scale = match domain {
        Domain::Fourier => Sym::int(2) * Sym::pi() * Sym::i(),
        _ => Sym::i(),
    };
    Ok(Expr::from_parts(
        scale * var.sym,
        Kind::of(domain),
        Assumptions::new(),
    ))
}

/// Domain of `arg` if it is exactly that domain's variable.
fn bare_domain(arg: &Expr) -> Option<Domain> {
    let symbol = arg.sym().as_symbol()?;
    let domain = Domain::from_var_name(symbol.name())?;
    (arg.domain() == domain).then_some(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{expr, nexpr, sexpr, texpr, zexpr, Quantity};

    #[test]
    fn test_laplace_wraps_conjugate_kind() {
        let v = texpr("exp(-2 * t) * u(t)").unwrap().as_voltage();
        let vs = v.laplace().unwrap();
        assert_eq!(vs.kind(), Kind::new(Domain::Laplace, Quantity::Voltage));
        assert!(vs.is_causal());
        assert!(vs.equals(sexpr("1 / (s + 2)").unwrap()));

        let h = texpr("exp(-t) * u(t)")
            .unwrap()
            .as_quantity(Quantity::ImpulseResponse);
        assert_eq!(h.laplace().unwrap().quantity(), Quantity::TransferFunction);
    }

    #[test]
    fn test_causal_round_trips() {
        for text in ["exp(-3 * t) * u(t)", "sin(2 * t) * u(t)", "t * exp(-t) * u(t)"] {
            let x = texpr(text).unwrap();
            let back = x.laplace().unwrap().inverse_laplace().unwrap();
            assert!(back.equals(&x), "{} came back as {}", text, back);
        }
    }

    #[test]
    fn test_dc_and_ac_inverse_without_causality() {
        let x = texpr("4").unwrap();
        let back = x.laplace().unwrap().inverse_laplace().unwrap();
        assert!(back.equals(4));

        let y = texpr("cos(3 * t)").unwrap();
        let back = y.laplace().unwrap().inverse_laplace().unwrap();
        assert!(back.equals(&y));
    }

    #[test]
    fn test_inverse_laplace_needs_signal_class() {
        let x = sexpr("1 / (s + 1)").unwrap();
        assert!(matches!(
            x.inverse_laplace(),
            Err(SymCircuitError::TransformUndefined { .. })
        ));
        let causal = x
            .inverse_laplace_with(&Assumptions::new().with_causal(true))
            .unwrap();
        assert!(causal.equals(texpr("exp(-t) * u(t)").unwrap()));
    }

    #[test]
    fn test_constant_laplace() {
        let x = expr("5").unwrap();
        assert!(x.laplace().unwrap().equals(sexpr("5 / s").unwrap()));
    }

    #[test]
    fn test_transform_dispatch() {
        let s = Expr::domain_var(Domain::Laplace).unwrap();
        let omega = Expr::domain_var(Domain::AngularFourier).unwrap();
        let x = texpr("exp(-t) * u(t)").unwrap();
        assert!(x.transform(&s).unwrap().equals(sexpr("1 / (s + 1)").unwrap()));

        let h = sexpr("1 / (s + 1)").unwrap().as_transfer();
        let hw = h.call(&omega).unwrap();
        assert_eq!(hw.domain(), Domain::AngularFourier);
        assert_eq!(hw.quantity(), Quantity::TransferFunction);
        assert!(hw.equals(expr("1 / (j * omega + 1)").unwrap()));
    }

    #[test]
    fn test_transform_substitutes_other_arguments() {
        let h = sexpr("1 / (s + 1)").unwrap();
        let two = expr("2").unwrap();
        assert!(h.transform(&two).unwrap().equals(Sym::rational(1, 3)));
    }

    #[test]
    fn test_ztransform_scenarios() {
        let one = nexpr("1").unwrap().ztransform().unwrap();
        assert_eq!(one.domain(), Domain::Z);
        assert!(one.equals(zexpr("z / (z - 1)").unwrap()));
        assert!(nexpr("unitimpulse(n)").unwrap().ztransform().unwrap().equals(1));
        assert!(nexpr("unitimpulse(n - 2)")
            .unwrap()
            .ztransform()
            .unwrap()
            .equals(zexpr("1 / z^2").unwrap()));
        let back = zexpr("z^(-1)").unwrap().inverse_ztransform().unwrap();
        assert_eq!(back.domain(), Domain::DiscreteTime);
        assert!(back.equals(nexpr("unitimpulse(n - 1)").unwrap()));
    }

    #[test]
    fn test_wrong_domain_is_rejected() {
        let x = zexpr("z / (z - 1)").unwrap();
        assert!(x.laplace().is_err());
    }

    #[test]
    fn test_normalize_deltas() {
        let w = symbol::omega();
        let x = Sym::dirac_delta(Sym::from(&w) / (Sym::int(2) * Sym::pi()) - Sym::one());
        let y = normalize_deltas(&x, &w);
        let expected = Sym::int(2)
            * Sym::pi()
            * Sym::dirac_delta(Sym::from(&w) - Sym::int(2) * Sym::pi());
        assert!(crate::sym::rational::is_zero(&(y - expected)));
    }
}
