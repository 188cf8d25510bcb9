//! Per-domain constructors and behaviour: assumption inference, initial
//! and final values, causality forcing and convolution.

use crate::error::{Result, SymCircuitError};
use crate::sym::{
    calculus, complex, evalf, rational, subs, symbol, Direction, Func, Node, Sym, Symbol,
};

use super::assumptions::Assumptions;
use super::base::Expr;
use super::kind::{Domain, Kind, Quantity};

/// Parse a time-domain expression.
pub fn texpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::of(Domain::Time), Assumptions::new())
}

/// Parse a Laplace-domain expression.
pub fn sexpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::of(Domain::Laplace), Assumptions::new())
}

/// Parse a Fourier-domain expression.
pub fn fexpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::of(Domain::Fourier), Assumptions::new())
}

/// Parse an angular-Fourier-domain expression.
pub fn omegaexpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::of(Domain::AngularFourier), Assumptions::new())
}

/// Parse a discrete-time expression.
pub fn nexpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::of(Domain::DiscreteTime), Assumptions::new())
}

/// Parse a z-domain expression.
pub fn zexpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::of(Domain::Z), Assumptions::new())
}

/// Parse a constant expression.
pub fn cexpr(text: &str) -> Result<Expr> {
    Expr::parse(text, Kind::CONSTANT, Assumptions::new())
}

impl Expr {
    /// Parse an expression of the given domain and quantity.
    pub fn typed(text: &str, domain: Domain, quantity: Quantity) -> Result<Expr> {
        Expr::parse(text, Kind::new(domain, quantity), Assumptions::new())
    }

    /// Assumptions deduced from the structure of the expression.
    ///
    /// For time and discrete-time signals exactly one of `dc`, `ac` and
    /// `causal` is set, checked in that order. Other domains infer nothing
    /// beyond what construction already fixed.
    pub fn inferred_assumptions(&self) -> Assumptions {
        let mut inferred = self.assumptions.clone();
        if !self.domain().is_real_signal() {
            return inferred;
        }
        let Some(var) = self.var() else {
            return inferred;
        };
        inferred.causal = Some(false);
        inferred.dc = Some(false);
        inferred.ac = Some(false);
        if is_dc(&self.sym, &var) {
            inferred.dc = Some(true);
        } else if is_ac(&self.sym, &var) {
            inferred.ac = Some(true);
        } else if is_causal(&self.sym, &var) {
            inferred.causal = Some(true);
        }
        inferred
    }

    /// Copy with unset assumptions filled in by inference. Keys set
    /// explicitly are kept.
    pub fn infer_assumptions(&self) -> Expr {
        let inferred = self.inferred_assumptions();
        let mut assumptions = inferred.merge(&self.assumptions);
        if self.assumptions.causal == Some(true) {
            assumptions.set_causal(true);
        }
        Expr::from_parts(self.sym.clone(), self.kind, assumptions)
    }

    fn require_var(&self, operation: &str) -> Result<Symbol> {
        self.var().ok_or_else(|| {
            SymCircuitError::invalid_argument(operation, "expression has no domain variable")
        })
    }

    /// Value at the origin of the domain variable.
    ///
    /// In the Laplace domain this is the initial value theorem,
    /// `lim s->oo s X(s)`, giving a time-domain value.
    pub fn initial_value(&self) -> Result<Expr> {
        let var = self.require_var("initial_value")?;
        if self.domain() == Domain::Laplace {
            return self.laplace_limit(&var, &Sym::oo(), "initial value");
        }
        self.subs_value(var.name(), Sym::zero())
    }

    /// Value just before the origin.
    pub fn pre_initial_value(&self) -> Result<Expr> {
        let var = self.require_var("pre_initial_value")?;
        self.limit(var.name(), &Sym::zero(), Direction::Minus)
    }

    /// Value just after the origin.
    pub fn post_initial_value(&self) -> Result<Expr> {
        let var = self.require_var("post_initial_value")?;
        self.limit(var.name(), &Sym::zero(), Direction::Plus)
    }

    /// Value as the domain variable tends to infinity.
    ///
    /// In the Laplace domain this is the final value theorem,
    /// `lim s->0 s X(s)`.
    pub fn final_value(&self) -> Result<Expr> {
        let var = self.require_var("final_value")?;
        if self.domain() == Domain::Laplace {
            return self.laplace_limit(&var, &Sym::zero(), "final value");
        }
        self.limit(var.name(), &Sym::oo(), Direction::Minus)
    }

    fn laplace_limit(&self, var: &Symbol, point: &Sym, what: &str) -> Result<Expr> {
        let scaled = rational::cancel(&(Sym::from(var) * &self.sym));
        let value = calculus::limit(&scaled, var, point, Direction::Plus).ok_or_else(|| {
            SymCircuitError::transform_undefined(what, &self.sym, "limit does not exist")
        })?;
        Ok(Expr::from_parts(
            value,
            self.kind.laplace_conjugate(),
            Assumptions::new(),
        ))
    }

    /// Multiply by the unit step unless already known to be causal.
    pub fn force_causal(&self) -> Result<Expr> {
        if self.is_causal() {
            return Ok(self.clone());
        }
        let var = self.require_var("force_causal")?;
        let gated = &self.sym * Sym::heaviside(Sym::from(var));
        let assumptions = self.assumptions.clone().with_causal(true);
        Ok(Expr::from_parts(gated, self.kind, assumptions))
    }

    /// Convolution `integral f1(t - tau) f2(tau) dtau` over the real line,
    /// left unevaluated. With `commutate` the operands are swapped.
    ///
    /// The result quantity follows the operands (a voltage convolved with
    /// an admittance is a current).
    pub fn convolve(&self, other: &Expr, commutate: bool) -> Result<Expr> {
        if self.domain() != Domain::Time || other.domain() != Domain::Time {
            return Err(SymCircuitError::invalid_argument(
                "convolve",
                format!("expecting time-domain operands, got {} and {}", self.kind, other.kind),
            ));
        }
        let t = symbol::t();
        let tau = symbol::tau();
        let (f1, f2) = if commutate {
            (&other.sym, &self.sym)
        } else {
            (&self.sym, &other.sym)
        };
        let shifted = subs::subs(f1, &t, &(Sym::from(&t) - Sym::from(&tau)));
        let dummy = subs::subs(f2, &t, &Sym::from(&tau));
        let integral = Sym::integral(shifted * dummy, tau, -Sym::oo(), Sym::oo());
        let quantity = convolution_quantity(self.quantity(), other.quantity());
        Expr::new(integral, self.kind.with_quantity(quantity))
    }

    /// Evaluate unevaluated integrals where a closed form exists.
    pub fn doit(&self) -> Expr {
        self.rewrap_fresh(doit(&self.sym))
    }
}

fn convolution_quantity(p: Quantity, q: Quantity) -> Quantity {
    use Quantity::*;
    match (p, q) {
        (Voltage, Admittance) | (Admittance, Voltage) => Current,
        (Current, Impedance) | (Impedance, Current) => Voltage,
        (ImpulseResponse, x) => x,
        (x, _) => x,
    }
}

fn doit(x: &Sym) -> Sym {
    match x.node() {
        Node::Integral {
            integrand,
            var,
            lower,
            upper,
        } => calculus::integrate_definite(&doit(integrand), var, lower, upper),
        Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => x.clone(),
        _ => x.map_args(doit),
    }
}

// ============ Signal classification ============

/// Independent of the domain variable.
pub(crate) fn is_dc(x: &Sym, var: &Symbol) -> bool {
    !x.has_symbol_named(var.name())
}

/// A sum of sinusoids `A cos(w var + phi)` with nonzero `w`.
pub(crate) fn is_ac(x: &Sym, var: &Symbol) -> bool {
    let terms = x.terms();
    !terms.is_empty() && terms.iter().all(|term| is_sinusoid(term, var))
}

fn is_sinusoid(term: &Sym, var: &Symbol) -> bool {
    let mut trig = 0;
    for factor in term.factors() {
        if !factor.has_symbol(var) {
            continue;
        }
        match factor.as_apply() {
            Some((Func::Sin | Func::Cos, [arg])) => match calculus::linear_coeffs(arg, var) {
                Some((slope, _)) if !rational::is_zero(&slope) => trig += 1,
                _ => return false,
            },
            _ => return false,
        }
    }
    trig == 1
}

/// Every term is gated by a step or impulse that starts at or after the
/// origin.
pub(crate) fn is_causal(x: &Sym, var: &Symbol) -> bool {
    if rational::is_zero(x) {
        return true;
    }
    x.terms().iter().all(|term| is_gated(term, var))
}

fn is_gated(x: &Sym, var: &Symbol) -> bool {
    match x.node() {
        Node::Apply(Func::Heaviside | Func::DiracDelta | Func::UnitImpulse, args) => {
            starts_after_origin(&args[0], var)
        }
        Node::Add(terms) => terms.iter().all(|t| is_gated(t, var)),
        Node::Mul(factors) => factors.iter().any(|f| is_gated(f, var)),
        Node::Pow(base, exp) => {
            matches!(exp.as_i64(), Some(k) if k > 0) && is_gated(base, var)
        }
        _ => false,
    }
}

/// `arg` is `a var + b` with `a > 0` and root `-b/a >= 0`.
fn starts_after_origin(arg: &Sym, var: &Symbol) -> bool {
    let Some((slope, offset)) = calculus::linear_coeffs(arg, var) else {
        return false;
    };
    if !complex::is_positive(&slope) {
        return false;
    }
    if rational::is_zero(&offset) || complex::is_negative(&offset) {
        return true;
    }
    matches!(evalf::to_f64(&(-offset / slope)), Some(root) if root >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::parse::parse;

    fn t() -> Symbol {
        symbol::t()
    }

    #[test]
    fn test_classification() {
        assert!(is_dc(&parse("3 * R").unwrap(), &t()));
        assert!(is_ac(&parse("3 * cos(2 * t) + sin(5 * t + 1)").unwrap(), &t()));
        assert!(!is_ac(&parse("3 + cos(2 * t)").unwrap(), &t()));
        assert!(is_causal(&parse("exp(-t) * u(t)").unwrap(), &t()));
        assert!(is_causal(&parse("u(t - 2) + delta(t)").unwrap(), &t()));
        assert!(!is_causal(&parse("u(t + 2)").unwrap(), &t()));
        assert!(!is_causal(&parse("exp(-t)").unwrap(), &t()));
    }

    #[test]
    fn test_inferred_assumptions_are_exclusive() {
        let x = texpr("cos(3 * t)").unwrap();
        let a = x.inferred_assumptions();
        assert_eq!(a.ac, Some(true));
        assert_eq!(a.dc, Some(false));
        assert_eq!(a.causal, Some(false));
        assert!(texpr("5").unwrap().is_dc());
        assert!(texpr("t * u(t)").unwrap().is_causal());
    }

    #[test]
    fn test_explicit_assumptions_survive_inference() {
        let x = Expr::parse(
            "v(t)",
            Kind::of(Domain::Time),
            Assumptions::new().with_causal(true),
        )
        .unwrap();
        assert!(x.is_causal());
        assert_eq!(x.infer_assumptions().assumptions().causal, Some(true));
    }

    #[test]
    fn test_initial_and_final_values() {
        let x = texpr("(1 - exp(-t)) * u(t)").unwrap();
        assert!(x.final_value().unwrap().equals(1));
        assert!(x.post_initial_value().unwrap().equals(0));

        let step = texpr("u(t)").unwrap();
        assert!(step.pre_initial_value().unwrap().equals(0));
        assert!(step.post_initial_value().unwrap().equals(1));

        let xs = sexpr("1 / (s * (s + 2))").unwrap();
        assert!(xs.final_value().unwrap().equals(Sym::rational(1, 2)));
        assert!(xs.initial_value().unwrap().equals(0));
    }

    #[test]
    fn test_force_causal() {
        let x = texpr("exp(-t)").unwrap();
        let y = x.force_causal().unwrap();
        assert!(y.is_causal());
        assert!(y.equals(texpr("exp(-t) * u(t)").unwrap()));
    }

    #[test]
    fn test_convolution_is_unevaluated_until_doit() {
        let x = texpr("exp(-t) * u(t)").unwrap().as_voltage();
        let h = texpr("delta(t)")
            .unwrap()
            .as_quantity(Quantity::ImpulseResponse);
        let y = x.convolve(&h, false).unwrap();
        assert!(y.sym().has_integral());
        assert_eq!(y.quantity(), Quantity::Voltage);

        let closed = y.doit();
        assert!(!closed.sym().has_integral());
        assert!(closed.equals(&x));
    }

    #[test]
    fn test_convolve_rejects_other_domains() {
        let x = texpr("u(t)").unwrap();
        let h = sexpr("1 / s").unwrap();
        assert!(x.convolve(&h, false).is_err());
    }
}
