//! The domain-tagged expression type.

use std::collections::BTreeSet;
use std::fmt;

use num_complex::Complex64;
use num_rational::BigRational;
use once_cell::unsync::OnceCell;

use crate::error::{Result, SymCircuitError};
use crate::ratfun::Ratfun;
use crate::sym::{
    calculus, complex, evalf, expand, number, parse, printer, rational, subs, symbol, Direction,
    Func, Node, Number, Sym, Symbol,
};

use super::assumptions::Assumptions;
use super::kind::{Domain, Kind, Quantity};

/// Which part of a complex quantity an expression represents. Only used
/// for labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Real,
    Imaginary,
    Magnitude,
    Phase,
}

impl Part {
    fn name(self) -> &'static str {
        match self {
            Part::Real => "real part",
            Part::Imaginary => "imaginary part",
            Part::Magnitude => "magnitude",
            Part::Phase => "phase",
        }
    }
}

/// A symbolic expression tagged with a domain, a physical quantity and a
/// set of assumptions.
///
/// Expressions are immutable: every operation returns a new value. The
/// rational-function view (numerator and denominator polynomials in the
/// domain variable) is computed on first use and cached.
#[derive(Clone)]
pub struct Expr {
    pub(crate) sym: Sym,
    pub(crate) assumptions: Assumptions,
    pub(crate) kind: Kind,
    part: Option<Part>,
    units: Option<String>,
    ratfun: OnceCell<Option<Ratfun>>,
}

impl Expr {
    /// Wrap a backend expression without checking the domain guard.
    pub(crate) fn from_parts(sym: Sym, kind: Kind, assumptions: Assumptions) -> Expr {
        let mut assumptions = assumptions;
        if assumptions.causal.is_none() {
            let causal_kind = kind.domain == Domain::Laplace
                && matches!(
                    kind.quantity,
                    Quantity::Impedance | Quantity::Admittance | Quantity::TransferFunction
                );
            if sym.is_zero() || causal_kind {
                assumptions.set_causal(true);
            }
        }
        if kind.domain.is_real_signal() && assumptions.real.is_none() {
            assumptions.real = Some(true);
        }
        Expr {
            sym,
            assumptions,
            kind,
            part: None,
            units: None,
            ratfun: OnceCell::new(),
        }
    }

    /// Wrap a backend expression as the given kind.
    ///
    /// Fails if a continuous time-domain expression depends on `s` or `f`
    /// outside an unevaluated integral.
    pub fn new(sym: Sym, kind: Kind) -> Result<Expr> {
        Expr::with_assumptions(sym, kind, Assumptions::new())
    }

    pub fn with_assumptions(sym: Sym, kind: Kind, assumptions: Assumptions) -> Result<Expr> {
        check_domain_variables(&sym, kind)?;
        Ok(Expr::from_parts(sym, kind, assumptions))
    }

    /// Parse `text` as an expression of the given kind. Only the `real` and
    /// `complex` assumptions reach the parser.
    pub fn parse(text: &str, kind: Kind, assumptions: Assumptions) -> Result<Expr> {
        let sym = parse::parse_with(text, assumptions.backend_flags())?;
        Expr::with_assumptions(sym, kind, assumptions)
    }

    /// Copy an expression, replacing its assumptions if `assumptions` is
    /// not empty.
    pub fn from_expr(other: &Expr, assumptions: Assumptions) -> Expr {
        let mut copy = other.clone();
        if !assumptions.is_empty() {
            copy.assumptions = assumptions;
        }
        copy
    }

    /// An untyped expression.
    pub fn generic(sym: Sym) -> Expr {
        Expr::from_parts(sym, Kind::GENERIC, Assumptions::new())
    }

    /// A constant (no domain variable) expression.
    pub fn constant(sym: Sym) -> Expr {
        Expr::from_parts(sym, Kind::CONSTANT, Assumptions::new())
    }

    pub fn zero() -> Expr {
        Expr::constant(Sym::zero())
    }

    pub fn one() -> Expr {
        Expr::constant(Sym::one())
    }

    /// The domain variable as an expression, e.g. `s`.
    pub fn domain_var(domain: Domain) -> Option<Expr> {
        domain
            .var()
            .map(|v| Expr::from_parts(Sym::from(v), Kind::of(domain), Assumptions::new()))
    }

    /// Same expression and assumptions, different backend value.
    pub(crate) fn rewrap(&self, sym: Sym) -> Expr {
        Expr::from_parts(sym, self.kind, self.assumptions.clone())
    }

    /// Same kind, different value, assumptions inferred afresh.
    pub(crate) fn rewrap_fresh(&self, sym: Sym) -> Expr {
        Expr::from_parts(sym, self.kind, self.assumptions.without_signal_class())
    }

    // ============ Accessors ============

    /// The wrapped backend expression.
    pub fn sym(&self) -> &Sym {
        &self.sym
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn domain(&self) -> Domain {
        self.kind.domain
    }

    pub fn quantity(&self) -> Quantity {
        self.kind.quantity
    }

    /// Domain variable, if any.
    pub fn var(&self) -> Option<Symbol> {
        self.kind.var()
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn part(&self) -> Option<Part> {
        self.part
    }

    pub(crate) fn with_part(mut self, part: Part) -> Expr {
        self.part = Some(part);
        self
    }

    /// Override the units used in labels.
    pub fn with_units(mut self, units: impl Into<String>) -> Expr {
        self.units = Some(units.into());
        self
    }

    pub fn units(&self) -> String {
        if let Some(units) = &self.units {
            return units.clone();
        }
        match self.part {
            Some(Part::Phase) => "rad".to_string(),
            _ => self.kind.units().to_string(),
        }
    }

    /// Replace the assumptions, keeping any key not set in `overrides`.
    pub fn with_assumptions_merged(&self, overrides: &Assumptions) -> Expr {
        let mut copy = self.clone();
        copy.assumptions = self.assumptions.merge(overrides);
        copy
    }

    pub(crate) fn ratfun(&self) -> Option<&Ratfun> {
        self.ratfun
            .get_or_init(|| {
                let var = self.var()?;
                Ratfun::from_sym(&self.sym, &var)
            })
            .as_ref()
    }

    // ============ Kind casts ============

    /// Reinterpret as another kind.
    pub fn as_kind(&self, kind: Kind) -> Result<Expr> {
        Expr::with_assumptions(self.sym.clone(), kind, self.assumptions.clone())
    }

    /// Reinterpret as another quantity in the same domain.
    pub fn as_quantity(&self, quantity: Quantity) -> Expr {
        Expr::from_parts(
            self.sym.clone(),
            self.kind.with_quantity(quantity),
            self.assumptions.clone(),
        )
    }

    pub fn as_expr(&self) -> Expr {
        self.as_quantity(Quantity::Expression)
    }

    pub fn as_voltage(&self) -> Expr {
        self.as_quantity(Quantity::Voltage)
    }

    pub fn as_current(&self) -> Expr {
        self.as_quantity(Quantity::Current)
    }

    pub fn as_impedance(&self) -> Expr {
        self.as_quantity(Quantity::Impedance)
    }

    pub fn as_admittance(&self) -> Expr {
        self.as_quantity(Quantity::Admittance)
    }

    pub fn as_transfer(&self) -> Expr {
        self.as_quantity(Quantity::TransferFunction)
    }

    // ============ Signal class ============

    pub fn is_causal(&self) -> bool {
        match self.assumptions.causal {
            Some(causal) => causal,
            None => self.inferred_assumptions().causal == Some(true),
        }
    }

    pub fn is_dc(&self) -> bool {
        match self.assumptions.dc {
            Some(dc) => dc,
            None => self.inferred_assumptions().dc == Some(true),
        }
    }

    pub fn is_ac(&self) -> bool {
        match self.assumptions.ac {
            Some(ac) => ac,
            None => self.inferred_assumptions().ac == Some(true),
        }
    }

    pub fn is_complex(&self) -> bool {
        self.assumptions.complex == Some(true)
    }

    /// True if the expression does not depend on its domain variable.
    pub fn is_constant(&self) -> bool {
        match self.var() {
            Some(var) => !self.sym.has_symbol_named(var.name()),
            None => true,
        }
    }

    /// True if the expression has no free symbols.
    pub fn is_number(&self) -> bool {
        self.sym.free_symbols().is_empty()
    }

    pub fn is_zero(&self) -> bool {
        rational::is_zero(&self.sym)
    }

    // ============ Structure ============

    pub fn simplify(&self) -> Expr {
        self.rewrap(rational::simplify(&self.sym))
    }

    /// Simplify each additive term separately.
    pub fn simplify_terms(&self) -> Expr {
        let terms = self.sym.terms().iter().map(rational::simplify).collect::<Vec<_>>();
        self.rewrap(Sym::sum(terms))
    }

    pub fn expand(&self) -> Expr {
        self.rewrap(expand::expand(&self.sym))
    }

    /// True if `other` occurs as a subexpression.
    pub fn has(&self, other: &Expr) -> bool {
        self.sym.contains(&other.sym)
    }

    /// True if a free symbol with this name occurs.
    pub fn has_symbol(&self, name: &str) -> bool {
        self.sym.has_symbol_named(name)
    }

    /// Names of the free symbols.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.sym
            .free_symbols()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Find a free symbol by name.
    pub(crate) fn find_symbol(&self, name: &str) -> Option<Symbol> {
        self.sym.free_symbols().into_iter().find(|s| s.name() == name)
    }

    // ============ Derived quantities ============

    pub fn real(&self) -> Expr {
        let (re, _) = complex::split_complex(&self.sym);
        self.rewrap_fresh(rational::simplify(&re)).with_part(Part::Real)
    }

    pub fn imag(&self) -> Expr {
        let (_, im) = complex::split_complex(&self.sym);
        self.rewrap_fresh(rational::simplify(&im)).with_part(Part::Imaginary)
    }

    /// Real and imaginary parts.
    pub fn real_imag(&self) -> (Expr, Expr) {
        (self.real(), self.imag())
    }

    /// Rewrite `N / D` so that `D` is real, by multiplying top and bottom
    /// by the conjugate of `D`.
    pub fn rationalize_denominator(&self) -> Expr {
        let (n, d) = rational::numer_denom(&self.sym);
        let dc = complex::conjugate(&d);
        if dc == d {
            return self.clone();
        }
        let n = expand::expand(&(&n * &dc));
        let d = expand::expand(&(&d * &dc));
        self.rewrap(n / d)
    }

    pub fn magnitude(&self) -> Expr {
        let r = self.rationalize_denominator();
        let (n, d) = rational::numer_denom(&r.sym);
        let (re, im) = complex::split_complex(&n);
        let num = if rational::is_zero(&im) {
            Sym::abs(rational::simplify(&re))
        } else {
            rational::simplify(&(re.powi(2) + im.powi(2))).sqrt()
        };
        let den = if complex::is_positive(&d) {
            d
        } else {
            Sym::abs(d)
        };
        self.rewrap_fresh(num / den).with_part(Part::Magnitude)
    }

    /// Alias for [`Expr::magnitude`].
    pub fn abs(&self) -> Expr {
        self.magnitude()
    }

    /// Phase in radians.
    ///
    /// A real numerator gives 0 (or pi when known negative); otherwise the
    /// real and imaginary parts of the rationalized numerator are divided
    /// by the gcd of their numeric coefficients before taking `atan2`.
    pub fn phase(&self) -> Expr {
        let r = self.rationalize_denominator();
        let (n, _) = rational::numer_denom(&r.sym);
        let (re, im) = complex::split_complex(&n);
        let re = rational::simplify(&re);
        let im = rational::simplify(&im);
        let phase = if rational::is_zero(&im) {
            if complex::is_negative(&re) {
                Sym::pi()
            } else {
                Sym::zero()
            }
        } else {
            let (re, im) = if rational::is_zero(&re) {
                (re, im)
            } else {
                divide_numeric_gcd(re, im)
            };
            Sym::atan2(im, re)
        };
        let kind = self.kind.with_quantity(Quantity::Expression);
        Expr::from_parts(phase, kind, Assumptions::new()).with_part(Part::Phase)
    }

    pub fn phase_degrees(&self) -> Expr {
        let phase = self.phase();
        let degrees = &phase.sym * Sym::int(180) / Sym::pi();
        phase.rewrap(degrees).with_units("degrees")
    }

    /// Magnitude in decibels.
    pub fn db(&self) -> Expr {
        let mag = self.magnitude();
        let db = Sym::int(20) * Sym::log(mag.sym.clone()) / Sym::log(Sym::int(10));
        Expr::from_parts(db, self.kind.with_quantity(Quantity::Expression), Assumptions::new())
            .with_part(Part::Magnitude)
            .with_units("dB")
    }

    /// Polar form `|x| exp(j arg x)`.
    pub fn polar(&self) -> Expr {
        let mag = self.magnitude();
        let phase = self.phase();
        self.rewrap(mag.sym * Sym::exp(Sym::i() * phase.sym))
    }

    /// Cartesian form `re + j im`.
    pub fn cartesian(&self) -> Expr {
        let (re, im) = self.real_imag();
        self.rewrap(re.sym + Sym::i() * im.sym)
    }

    pub fn conjugate(&self) -> Expr {
        self.rewrap(complex::conjugate(&self.sym))
    }

    pub fn sign(&self) -> Expr {
        self.rewrap_fresh(Sym::apply(Func::Sign, vec![self.sym.clone()]))
    }

    // ============ Substitution ============

    /// Substitute `new` for `old`.
    ///
    /// Replacing the domain variable adopts the kind of `new`, moved to
    /// another domain if the pair appears in the promotion table; any
    /// other substitution keeps the kind of `self`.
    pub fn subs(&self, old: &Expr, new: &Expr) -> Result<Expr> {
        let own_var = match (self.var(), old.sym.as_symbol()) {
            (Some(var), Some(old_sym)) => var.name() == old_sym.name(),
            _ => false,
        };
        let kind = if own_var {
            self.kind.subs_promotion(new.kind).unwrap_or(new.kind)
        } else {
            self.kind.subs_promotion(new.kind).unwrap_or(self.kind)
        };
        let value = self.replace_sym(&old.sym, &new.sym);
        let assumptions = if kind == self.kind {
            self.assumptions.without_signal_class()
        } else {
            new.assumptions.without_signal_class()
        };
        Expr::with_assumptions(value, kind, assumptions)
    }

    /// Substitute for the domain variable.
    pub fn subs_var(&self, new: &Expr) -> Result<Expr> {
        match Expr::domain_var(self.domain()) {
            Some(var) => self.subs(&var, new),
            None => Ok(self.clone()),
        }
    }

    /// Substitute a sequence of pairs in order.
    pub fn subs_map(&self, pairs: &[(Expr, Expr)]) -> Result<Expr> {
        let mut acc = self.clone();
        for (old, new) in pairs {
            acc = acc.subs(old, new)?;
        }
        Ok(acc)
    }

    /// Substitute a plain value for a symbol, keeping the kind.
    pub fn subs_value(&self, name: &str, value: Sym) -> Result<Expr> {
        match self.find_symbol(name) {
            Some(var) => Expr::with_assumptions(
                subs::subs(&self.sym, &var, &value),
                self.kind,
                self.assumptions.without_signal_class(),
            ),
            None => Ok(self.clone()),
        }
    }

    /// Replace `old` (matched by name when it is a symbol) by `new`.
    fn replace_sym(&self, old: &Sym, new: &Sym) -> Sym {
        match old.as_symbol() {
            Some(var) => match self.find_symbol(var.name()) {
                Some(found) => subs::subs(&self.sym, &found, new),
                None => self.sym.clone(),
            },
            None => subs::replace(&self.sym, old, new),
        }
    }

    // ============ Calculus ============

    /// Limit as the symbol named `var` approaches `value`.
    ///
    /// The symbol is matched by name; if it does not occur the expression
    /// is returned unchanged.
    pub fn limit(&self, var: &str, value: &Sym, dir: Direction) -> Result<Expr> {
        let Some(symbol) = self.find_symbol(var) else {
            return Ok(self.clone());
        };
        match calculus::limit(&self.sym, &symbol, value, dir) {
            Some(result) => Ok(self.rewrap(result)),
            None => Err(SymCircuitError::LimitUndefined {
                expr: self.sym.to_string(),
                var: var.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Derivative with respect to the domain variable.
    pub fn differentiate(&self) -> Expr {
        match self.var() {
            Some(var) => self.rewrap_fresh(calculus::diff(&self.sym, &var)),
            None => self.rewrap(Sym::zero()),
        }
    }

    /// Derivative with respect to the symbol named `var`.
    pub fn differentiate_wrt(&self, var: &str) -> Expr {
        match self.find_symbol(var) {
            Some(symbol) => self.rewrap_fresh(calculus::diff(&self.sym, &symbol)),
            None => self.rewrap(Sym::zero()),
        }
    }

    /// Indefinite integral with respect to the domain variable.
    ///
    /// Without a closed form the result is the running integral from
    /// minus infinity, left unevaluated.
    pub fn integrate(&self) -> Result<Expr> {
        let var = self.var().ok_or_else(|| {
            SymCircuitError::invalid_argument("integrate", "expression has no domain variable")
        })?;
        let result = match calculus::integrate(&self.sym, &var) {
            Some(antiderivative) => antiderivative,
            None => {
                let tau = symbol::tau();
                Sym::integral(
                    subs::subs(&self.sym, &var, &Sym::from(&tau)),
                    tau,
                    -Sym::oo(),
                    Sym::from(var),
                )
            }
        };
        Ok(self.rewrap_fresh(result))
    }

    /// Definite integral over the domain variable.
    pub fn integrate_between(&self, lower: &Sym, upper: &Sym) -> Result<Expr> {
        let var = self.var().ok_or_else(|| {
            SymCircuitError::invalid_argument("integrate", "expression has no domain variable")
        })?;
        let result = calculus::integrate_definite(&self.sym, &var, lower, upper);
        Ok(Expr::from_parts(
            result,
            Kind::new(Domain::Constant, self.quantity()),
            Assumptions::new(),
        ))
    }

    // ============ Numbers ============

    /// Value as a real float. Fails if free symbols remain or the value is
    /// complex.
    pub fn fval(&self) -> Result<f64> {
        let c = self.cval()?;
        if c.im.abs() > 1e-12 * c.re.abs().max(1.0) {
            return Err(SymCircuitError::evaluation(
                &self.sym,
                format!("value {} is complex", c),
            ));
        }
        Ok(c.re)
    }

    /// Value as a complex float.
    pub fn cval(&self) -> Result<Complex64> {
        let free = self.sym.free_symbols();
        if !free.is_empty() {
            return Err(SymCircuitError::UndefinedSymbol {
                symbols: free.iter().map(|s| s.name().to_string()).collect(),
                expr: self.sym.to_string(),
            });
        }
        evalf::to_complex(&self.sym)
            .ok_or_else(|| SymCircuitError::evaluation(&self.sym, "no numeric value"))
    }

    /// Numeric constants evaluated to floats.
    pub fn evalf(&self) -> Expr {
        self.rewrap(evalf::evalf(&self.sym))
    }

    /// Exact rationals replaced by floats.
    pub fn ratfloat(&self) -> Expr {
        self.rewrap(ratfloat(&self.sym))
    }

    /// Floats replaced by nearby rationals.
    pub fn floatrat(&self) -> Expr {
        self.rewrap(evalf::floatrat(&self.sym))
    }

    // ============ Printing ============

    pub fn latex(&self) -> String {
        printer::latex(&self.sym)
    }

    pub fn pretty(&self) -> String {
        printer::pretty(&self.sym)
    }

    /// Axis label such as `Voltage (V)`.
    pub fn label(&self) -> String {
        let mut label = match (self.kind.quantity_label(), self.part) {
            (Some(q), Some(part)) => format!("{} {}", q, part.name()),
            (Some(q), None) => q.to_string(),
            (None, Some(part)) => capitalize(part.name()),
            (None, None) => String::new(),
        };
        let units = self.units();
        if !units.is_empty() {
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(&format!("({})", units));
        }
        label
    }

    /// Label for the domain variable axis, such as `Time (s)`.
    pub fn domain_label(&self) -> String {
        let name = match self.domain() {
            Domain::Time => "Time",
            Domain::Laplace => "s",
            Domain::Fourier => "Frequency",
            Domain::AngularFourier => "Angular frequency",
            Domain::DiscreteTime => "Sample",
            Domain::Z => "z",
            Domain::Generic | Domain::Constant => return String::new(),
        };
        let units = self.domain().units();
        if units.is_empty() {
            name.to_string()
        } else {
            format!("{} ({})", name, units)
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Continuous time-domain expressions cannot depend on `s` or `f`,
/// except as the dummy variable of an unevaluated integral.
pub(crate) fn check_domain_variables(sym: &Sym, kind: Kind) -> Result<()> {
    if kind.domain != Domain::Time || sym.has_integral() {
        return Ok(());
    }
    for var in ["s", "f"] {
        if sym.has_symbol_named(var) {
            return Err(SymCircuitError::InvalidDomainVariable {
                domain: kind.domain.name().to_string(),
                expr: sym.to_string(),
                var: var.to_string(),
            });
        }
    }
    Ok(())
}

/// Divide both parts by the gcd of their numeric coefficients.
fn divide_numeric_gcd(re: Sym, im: Sym) -> (Sym, Sym) {
    let content = |x: &Sym| -> Option<BigRational> {
        let mut acc: Option<BigRational> = None;
        for term in x.terms() {
            let (c, _) = term.as_coeff_mul();
            let r = c.as_rational()?.clone();
            acc = Some(match acc {
                Some(a) => number::rational_gcd(&a, &r),
                None => num_traits::Signed::abs(&r),
            });
        }
        acc
    };
    match (content(&re), content(&im)) {
        (Some(a), Some(b)) => {
            let g = Sym::number(Number::Rational(number::rational_gcd(&a, &b)));
            (&re / &g, &im / &g)
        }
        _ => (re, im),
    }
}

fn ratfloat(x: &Sym) -> Sym {
    match x.node() {
        Node::Number(n) => Sym::number(n.to_float()),
        Node::Constant(_) | Node::Symbol(_) => x.clone(),
        _ => x.map_args(ratfloat),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.sym, f)
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.sym)
    }
}

impl From<Sym> for Expr {
    fn from(sym: Sym) -> Self {
        Expr::generic(sym)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::constant(Sym::int(value))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(Sym::float(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::expr;
    use approx::assert_relative_eq;

    #[test]
    fn test_time_domain_rejects_laplace_variable() {
        let result = Expr::parse("s * t", Kind::of(Domain::Time), Assumptions::new());
        assert!(matches!(
            result,
            Err(SymCircuitError::InvalidDomainVariable { .. })
        ));
    }

    #[test]
    fn test_zero_is_causal() {
        assert!(Expr::zero().is_causal());
        assert_eq!(Expr::zero().assumptions().dc, Some(false));
    }

    #[test]
    fn test_laplace_impedance_is_causal_by_construction() {
        let z = expr("1 / (s + 1)").unwrap().as_impedance();
        assert!(z.is_causal());
    }

    #[test]
    fn test_from_expr_overrides_only_when_not_empty() {
        let x = expr("exp(-t)").unwrap();
        let kept = Expr::from_expr(&x, Assumptions::new());
        assert_eq!(kept.assumptions(), x.assumptions());
        let causal = Expr::from_expr(&x, Assumptions::new().with_causal(true));
        assert!(causal.is_causal());
    }

    #[test]
    fn test_phase_policy() {
        assert!(expr("3").unwrap().phase().is_zero());
        assert_eq!(expr("-3").unwrap().phase().sym().clone(), Sym::pi());

        let h = expr("1 / (j * omega + 1)").unwrap();
        let at_two = h.subs_value("omega", Sym::int(2)).unwrap();
        let phase = at_two.phase().fval().unwrap();
        assert_relative_eq!(phase, (-2.0f64).atan2(1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_magnitude_and_db() {
        let h = expr("1 / (j * omega + 1)").unwrap();
        let mag = h.magnitude().subs_value("omega", Sym::int(1)).unwrap();
        assert_relative_eq!(mag.fval().unwrap(), 0.5f64.sqrt(), epsilon = 1e-12);
        let db = h.db().subs_value("omega", Sym::int(0)).unwrap();
        assert_relative_eq!(db.fval().unwrap(), 0.0, epsilon = 1e-12);
        assert_eq!(h.db().units(), "dB");
    }

    #[test]
    fn test_subs_promotes_laplace_transfer_function() {
        let h = expr("1 / (s + 1)").unwrap().as_transfer();
        let jw = expr("j * omega").unwrap();
        let hw = h.subs_var(&jw).unwrap();
        assert_eq!(
            hw.kind(),
            Kind::new(Domain::AngularFourier, Quantity::TransferFunction)
        );
    }

    #[test]
    fn test_limit_matches_symbols_by_name() {
        let x = expr("(1 - exp(-t)) * u(t)").unwrap();
        let final_value = x.limit("t", &Sym::oo(), Direction::Minus).unwrap();
        assert!(final_value.equals(1));
        let unchanged = x.limit("q", &Sym::zero(), Direction::Plus).unwrap();
        assert_eq!(unchanged.sym(), x.sym());
    }

    #[test]
    fn test_labels() {
        let v = expr("exp(-t)").unwrap().as_voltage();
        assert_eq!(v.label(), "Voltage (V)");
        assert_eq!(v.domain_label(), "Time (s)");
        assert_eq!(v.magnitude().label(), "Voltage magnitude (V)");
    }

    #[test]
    fn test_fval_reports_free_symbols() {
        let x = expr("R * 2").unwrap();
        assert!(matches!(
            x.fval(),
            Err(SymCircuitError::UndefinedSymbol { .. })
        ));
    }
}
