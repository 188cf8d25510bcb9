//! Arithmetic and comparison with domain compatibility checks.
//!
//! Every binary operation first resolves the kind of its result. Products,
//! quotients and powers use the multiplicative ladder, sums, differences
//! and comparisons the stricter additive ladder. Operands that are not
//! expressions (plain numbers or backend values) take the kind of the
//! expression they are combined with.

use std::ops::{Add, BitOr, Div, Mul, Neg, Sub};

use crate::error::{Result, SymCircuitError};
use crate::sym::{evalf, rational, Sym};

use super::assumptions::Assumptions;
use super::base::Expr;
use super::kind::{Domain, Kind, Quantity};

/// Right-hand operand of an expression operation.
#[derive(Debug, Clone)]
pub enum Operand {
    Expr(Expr),
    /// Untyped backend value, adopts the other operand's kind
    Value(Sym),
    /// Missing value: unequal to everything, ordered below everything
    Nothing,
}

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(e)
    }
}

impl From<&Expr> for Operand {
    fn from(e: &Expr) -> Self {
        Operand::Expr(e.clone())
    }
}

impl From<Sym> for Operand {
    fn from(s: Sym) -> Self {
        Operand::Value(s)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Value(Sym::int(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Value(Sym::int(i64::from(v)))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Value(Sym::float(v))
    }
}

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Operand::Nothing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Parallel,
    Compare(&'static str),
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "**",
            Op::Parallel => "|",
            Op::Compare(s) => s,
        }
    }
}

/// Resolved operation: result kind, both backend operands and the
/// assumptions of the result.
struct Resolved {
    kind: Kind,
    lhs: Sym,
    rhs: Sym,
    assumptions: Assumptions,
}

impl Expr {
    fn incompatible(&self, rhs: &Expr, op: Op) -> SymCircuitError {
        SymCircuitError::IncompatibleDomain {
            lhs_kind: self.kind.to_string(),
            lhs: self.sym.to_string(),
            rhs_kind: rhs.kind.to_string(),
            rhs: rhs.sym.to_string(),
            op: op.symbol().to_string(),
        }
    }

    fn laplace_pair(&self, x: &Expr) -> bool {
        self.domain() == Domain::Laplace && x.domain() == Domain::Laplace
    }

    /// Result kind for `*`, `/` and `**`.
    fn compat_mul(&self, rhs: &Operand, op: Op) -> Result<Resolved> {
        let x = match rhs {
            Operand::Expr(x) => x,
            Operand::Value(v) => {
                return Ok(Resolved {
                    kind: self.kind,
                    lhs: self.sym.clone(),
                    rhs: v.clone(),
                    assumptions: Assumptions::new(),
                })
            }
            Operand::Nothing => {
                return Err(SymCircuitError::invalid_argument(
                    op.symbol(),
                    "missing operand",
                ))
            }
        };

        let mut assumptions = Assumptions::new();
        if self.laplace_pair(x) {
            if self.is_causal() || x.is_causal() {
                assumptions = Assumptions::new().with_causal(true);
            } else if (self.is_dc() && x.is_dc()) || (self.is_ac() && x.is_ac()) {
                assumptions = self.assumptions.clone();
            } else if (self.is_ac() && x.is_dc()) || (self.is_dc() && x.is_ac()) {
                assumptions = Assumptions::new().with_ac(true);
            }
        }

        self.check_convolution(x, op)?;

        let (a, b) = (self.kind, x.kind);
        let kind = if a == b {
            a
        } else if a.domain == Domain::AngularFourier && b.domain == Domain::Time {
            // omega * t is treated as a time-domain expression
            b
        } else if a.domain == Domain::Time && b.domain == Domain::AngularFourier {
            a
        } else if b.is_untyped() {
            a
        } else if a.is_untyped() {
            b
        } else if b.is_subtype_of(a) {
            b
        } else if a.is_subtype_of(b) {
            a
        } else if a.domain == b.domain
            && matches!(
                a.domain,
                Domain::Time
                    | Domain::Fourier
                    | Domain::Laplace
                    | Domain::AngularFourier
                    | Domain::DiscreteTime
                    | Domain::Z
            )
        {
            a
        } else {
            return Err(self.incompatible(x, op));
        };

        let kind = match op {
            Op::Mul | Op::Div => quantity_algebra(a, b, op).map_or(kind, |q| kind.with_quantity(q)),
            _ => kind,
        };

        Ok(Resolved {
            kind,
            lhs: self.sym.clone(),
            rhs: x.sym.clone(),
            assumptions,
        })
    }

    /// Time-domain voltage times admittance (and the like) is a
    /// convolution, not a product.
    fn check_convolution(&self, x: &Expr, op: Op) -> Result<()> {
        if self.domain() != Domain::Time || x.domain() != Domain::Time {
            return Ok(());
        }
        use Quantity::*;
        let (p, q) = (self.quantity(), x.quantity());
        let refused = match op {
            Op::Mul => matches!((p, q), (Voltage, Admittance) | (Current, Impedance)),
            Op::Div => matches!((p, q), (Voltage, Impedance) | (Current, Admittance)),
            _ => false,
        };
        if !refused {
            return Ok(());
        }
        let (lhs_kind, lhs, rhs_kind, rhs) = (
            self.kind.to_string(),
            self.sym.to_string(),
            x.kind.to_string(),
            x.sym.to_string(),
        );
        Err(if op == Op::Mul {
            SymCircuitError::ConvolutionRequired {
                lhs_kind,
                lhs,
                rhs_kind,
                rhs,
            }
        } else {
            SymCircuitError::DeconvolutionRequired {
                lhs_kind,
                lhs,
                rhs_kind,
                rhs,
            }
        })
    }

    /// Result kind for `+`, `-`, `|` and comparisons.
    fn compat_add(&self, rhs: &Operand, op: Op) -> Result<Resolved> {
        let x = match rhs {
            Operand::Expr(x) => x,
            Operand::Value(v) => {
                return Ok(Resolved {
                    kind: self.kind,
                    lhs: self.sym.clone(),
                    rhs: v.clone(),
                    assumptions: Assumptions::new(),
                })
            }
            Operand::Nothing => {
                return Err(SymCircuitError::invalid_argument(
                    op.symbol(),
                    "missing operand",
                ))
            }
        };

        let mut assumptions = Assumptions::new();
        if self.laplace_pair(x) {
            if self.is_causal() && x.is_causal() {
                assumptions = Assumptions::new().with_causal(true);
            } else if (self.is_dc() && x.is_dc()) || (self.is_ac() && x.is_ac()) {
                assumptions = self.assumptions.clone();
            }
        }

        let (a, b) = (self.kind, x.kind);
        let immittance = matches!(a.quantity, Quantity::Impedance | Quantity::Admittance);
        let kind = if a == b || a.is_subtype_of(b) {
            a
        } else if b.is_subtype_of(a) {
            b
        } else if b.is_untyped() {
            a
        } else if a.is_untyped() {
            b
        } else if a.domain == Domain::Generic && immittance && b.domain == Domain::AngularFourier {
            a
        } else {
            return Err(self.incompatible(x, op));
        };

        Ok(Resolved {
            kind,
            lhs: self.sym.clone(),
            rhs: x.sym.clone(),
            assumptions,
        })
    }

    /// Different voltage (or current) kinds are added as the generic kind.
    fn promote_superkind(&self, rhs: &Operand) -> Option<(Expr, Operand)> {
        let Operand::Expr(x) = rhs else {
            return None;
        };
        match (self.kind.superkind(), x.kind.superkind()) {
            (Some(p), Some(q)) if p == q && self.kind != x.kind => {
                let generic = Kind::superkind_kind(p);
                let lhs = Expr::from_parts(self.sym.clone(), generic, self.assumptions.clone());
                let rhs = Expr::from_parts(x.sym.clone(), generic, x.assumptions.clone());
                Some((lhs, Operand::Expr(rhs)))
            }
            _ => None,
        }
    }

    fn finish(resolved: Resolved, value: Sym) -> Result<Expr> {
        Expr::with_assumptions(value, resolved.kind, resolved.assumptions)
    }

    // ============ Named arithmetic ============

    pub fn add(&self, rhs: impl Into<Operand>) -> Result<Expr> {
        let rhs = rhs.into();
        if let Some((lhs, rhs)) = self.promote_superkind(&rhs) {
            return lhs.add(rhs);
        }
        let r = self.compat_add(&rhs, Op::Add)?;
        let value = &r.lhs + &r.rhs;
        Expr::finish(r, value)
    }

    pub fn subtract(&self, rhs: impl Into<Operand>) -> Result<Expr> {
        let rhs = rhs.into();
        if let Some((lhs, rhs)) = self.promote_superkind(&rhs) {
            return lhs.subtract(rhs);
        }
        let r = self.compat_add(&rhs, Op::Sub)?;
        let value = &r.lhs - &r.rhs;
        Expr::finish(r, value)
    }

    pub fn multiply(&self, rhs: impl Into<Operand>) -> Result<Expr> {
        let r = self.compat_mul(&rhs.into(), Op::Mul)?;
        let value = &r.lhs * &r.rhs;
        Expr::finish(r, value)
    }

    pub fn divide(&self, rhs: impl Into<Operand>) -> Result<Expr> {
        let r = self.compat_mul(&rhs.into(), Op::Div)?;
        let value = &r.lhs / &r.rhs;
        Expr::finish(r, value)
    }

    pub fn power(&self, rhs: impl Into<Operand>) -> Result<Expr> {
        let r = self.compat_mul(&rhs.into(), Op::Pow)?;
        let value = Sym::pow(r.lhs.clone(), r.rhs.clone());
        Expr::finish(r, value)
    }

    pub fn negate(&self) -> Expr {
        self.rewrap(-&self.sym)
    }

    /// Parallel combination `a * b / (a + b)`.
    pub fn parallel(&self, rhs: impl Into<Operand>) -> Result<Expr> {
        let r = self.compat_add(&rhs.into(), Op::Parallel)?;
        let value = rational::cancel(&(&r.lhs * &r.rhs / (&r.lhs + &r.rhs)));
        Expr::finish(r, value)
    }

    // ============ Comparison ============

    /// Semantic equality: the difference simplifies to zero. Incompatible
    /// kinds and missing values compare unequal.
    pub fn equals(&self, rhs: impl Into<Operand>) -> bool {
        let rhs = rhs.into();
        if matches!(rhs, Operand::Nothing) {
            return false;
        }
        match self.compat_add(&rhs, Op::Compare("==")) {
            Ok(r) => {
                let diff = &r.lhs - &r.rhs;
                // Float differences are compared numerically as they stand.
                if rational::has_float(&diff) {
                    rational::is_zero(&diff)
                } else {
                    rational::is_zero(&rational::simplify(&diff))
                }
            }
            Err(_) => false,
        }
    }

    pub fn not_equals(&self, rhs: impl Into<Operand>) -> bool {
        !self.equals(rhs)
    }

    /// Numeric difference `self - rhs`, `None` for a missing operand.
    fn compare(&self, rhs: Operand, op: &'static str) -> Result<Option<f64>> {
        if matches!(rhs, Operand::Nothing) {
            return Ok(None);
        }
        let r = self.compat_add(&rhs, Op::Compare(op))?;
        let diff = rational::simplify(&(&r.lhs - &r.rhs));
        evalf::to_f64(&diff).map(Some).ok_or_else(|| {
            SymCircuitError::invalid_argument(
                op,
                format!("cannot order {} and {}", r.lhs, r.rhs),
            )
        })
    }

    pub fn gt(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.compare(rhs.into(), ">")?.map_or(true, |d| d > 0.0))
    }

    pub fn ge(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.compare(rhs.into(), ">=")?.map_or(true, |d| d >= 0.0))
    }

    pub fn lt(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.compare(rhs.into(), "<")?.map_or(true, |d| d < 0.0))
    }

    pub fn le(&self, rhs: impl Into<Operand>) -> Result<bool> {
        Ok(self.compare(rhs.into(), "<=")?.map_or(true, |d| d <= 0.0))
    }
}

/// Physical quantity of a product or quotient of two quantities, outside
/// the time domain where these are convolutions.
fn quantity_algebra(a: Kind, b: Kind, op: Op) -> Option<Quantity> {
    use Quantity::*;
    if a.domain.is_real_signal() || b.domain.is_real_signal() {
        return None;
    }
    let (p, q) = (a.quantity, b.quantity);
    if p == Expression || q == Expression {
        return None;
    }
    match op {
        Op::Mul => match (p, q) {
            (Voltage, Admittance) | (Admittance, Voltage) => Some(Current),
            (Current, Impedance) | (Impedance, Current) => Some(Voltage),
            (Impedance, Admittance) | (Admittance, Impedance) => Some(TransferFunction),
            (TransferFunction, x) | (x, TransferFunction) => Some(x),
            _ => None,
        },
        Op::Div => match (p, q) {
            (Voltage, Impedance) => Some(Current),
            (Current, Admittance) => Some(Voltage),
            (Voltage, Current) => Some(Impedance),
            (Current, Voltage) => Some(Admittance),
            (x, TransferFunction) => Some(x),
            (x, y) if x == y => Some(TransferFunction),
            _ => None,
        },
        _ => None,
    }
}

// ============ Operator sugar ============

macro_rules! impl_expr_binop {
    ($trait:ident, $method:ident, $named:ident) => {
        impl<T: Into<Operand>> $trait<T> for &Expr {
            type Output = Result<Expr>;

            fn $method(self, rhs: T) -> Result<Expr> {
                self.$named(rhs)
            }
        }

        impl<T: Into<Operand>> $trait<T> for Expr {
            type Output = Result<Expr>;

            fn $method(self, rhs: T) -> Result<Expr> {
                (&self).$named(rhs)
            }
        }
    };
}

impl_expr_binop!(Add, add, add);
impl_expr_binop!(Sub, sub, subtract);
impl_expr_binop!(Mul, mul, multiply);
impl_expr_binop!(Div, div, divide);
impl_expr_binop!(BitOr, bitor, parallel);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.negate()
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.negate()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Expr) -> bool {
        self.equals(other)
    }
}

impl PartialEq<i64> for Expr {
    fn eq(&self, other: &i64) -> bool {
        self.equals(*other)
    }
}

impl PartialEq<i32> for Expr {
    fn eq(&self, other: &i32) -> bool {
        self.equals(*other)
    }
}

impl PartialEq<f64> for Expr {
    fn eq(&self, other: &f64) -> bool {
        self.equals(*other)
    }
}

impl PartialEq<Option<Expr>> for Expr {
    fn eq(&self, other: &Option<Expr>) -> bool {
        self.equals(other.clone())
    }
}

impl PartialEq<Vec<Expr>> for Expr {
    fn eq(&self, _other: &Vec<Expr>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{expr, Assumptions};

    fn kind_of(domain: Domain, quantity: Quantity) -> Kind {
        Kind::new(domain, quantity)
    }

    fn typed(text: &str, domain: Domain, quantity: Quantity) -> Expr {
        Expr::parse(text, kind_of(domain, quantity), Assumptions::new()).unwrap()
    }

    #[test]
    fn test_same_kind_add_preserves_kind() {
        let a = typed("exp(-t)", Domain::Time, Quantity::Voltage);
        let b = typed("3 * t", Domain::Time, Quantity::Voltage);
        let sum = (&a + &b).unwrap();
        assert_eq!(sum.kind(), a.kind());
        let back = (&sum - &b).unwrap();
        assert!(back.equals(&a));
    }

    #[test]
    fn test_voltage_plus_current_fails() {
        let v = typed("exp(-t)", Domain::Time, Quantity::Voltage);
        let i = typed("exp(-t)", Domain::Time, Quantity::Current);
        assert!(matches!(
            &v + &i,
            Err(SymCircuitError::IncompatibleDomain { .. })
        ));
    }

    #[test]
    fn test_time_voltage_times_admittance_needs_convolution() {
        let v = typed("exp(-t)", Domain::Time, Quantity::Voltage);
        let y = typed("delta(t)", Domain::Time, Quantity::Admittance);
        assert!(matches!(
            &v * &y,
            Err(SymCircuitError::ConvolutionRequired { .. })
        ));
        let z = typed("delta(t)", Domain::Time, Quantity::Impedance);
        assert!(matches!(
            &v / &z,
            Err(SymCircuitError::DeconvolutionRequired { .. })
        ));
    }

    #[test]
    fn test_laplace_quantity_algebra() {
        let v = typed("1 / s", Domain::Laplace, Quantity::Voltage);
        let z = typed("s + 2", Domain::Laplace, Quantity::Impedance);
        let i = (&v / &z).unwrap();
        assert_eq!(i.quantity(), Quantity::Current);
        let back = (&i * &z).unwrap();
        assert_eq!(back.quantity(), Quantity::Voltage);
        assert!(back.equals(&v));
    }

    #[test]
    fn test_scalar_keeps_kind() {
        let v = typed("1 / s", Domain::Laplace, Quantity::Voltage);
        let half = (&v / 2).unwrap();
        assert_eq!(half.kind(), v.kind());
        assert!(half.equals(expr("1 / (2 * s)").unwrap()));
    }

    #[test]
    fn test_constant_adopts_other_kind() {
        let r = expr("R").unwrap();
        let z = typed("s * L", Domain::Laplace, Quantity::Impedance);
        assert_eq!((&r * &z).unwrap().kind(), z.kind());
        assert_eq!((&z + &r).unwrap().kind(), z.kind());
    }

    #[test]
    fn test_omega_times_t_is_time_domain() {
        let w = expr("omega").unwrap();
        let t = expr("t").unwrap();
        assert_eq!((&w * &t).unwrap().domain(), Domain::Time);
        assert_eq!((&t * &w).unwrap().domain(), Domain::Time);
    }

    #[test]
    fn test_incompatible_domains_in_product() {
        let s = expr("s").unwrap();
        let f = expr("f").unwrap();
        assert!(matches!(
            &s * &f,
            Err(SymCircuitError::IncompatibleDomain { .. })
        ));
    }

    #[test]
    fn test_superkind_promotion() {
        let vt = typed("3", Domain::Time, Quantity::Voltage);
        let vs = typed("2", Domain::Laplace, Quantity::Voltage);
        let sum = (&vt + &vs).unwrap();
        assert_eq!(sum.kind(), Kind::new(Domain::Generic, Quantity::Voltage));
        assert!(sum.equals(5));
    }

    #[test]
    fn test_laplace_product_merges_causality() {
        let h = typed("1 / (s + 1)", Domain::Laplace, Quantity::TransferFunction);
        let v = typed("1 / s", Domain::Laplace, Quantity::Voltage);
        assert!((&h * &v).unwrap().is_causal());
    }

    fn laplace(text: &str, quantity: Quantity, assumptions: Assumptions) -> Expr {
        Expr::parse(text, kind_of(Domain::Laplace, quantity), assumptions).unwrap()
    }

    #[test]
    fn test_laplace_product_signal_class() {
        let not_causal = Assumptions::new().with_causal(false);
        let h_dc = laplace("3", Quantity::TransferFunction, not_causal.clone().with_dc(true));
        let h_ac = laplace("3", Quantity::TransferFunction, not_causal.with_ac(true));
        let v_dc = laplace("5 / s", Quantity::Voltage, Assumptions::new().with_dc(true));
        let v_ac = laplace("s / (s^2 + 4)", Quantity::Voltage, Assumptions::new().with_ac(true));

        let mixed = (&h_dc * &v_ac).unwrap();
        assert!(mixed.is_ac());
        assert!(!mixed.is_dc());
        assert!(!mixed.is_causal());
        assert!((&v_ac * &h_dc).unwrap().is_ac());

        let dc = (&h_dc * &v_dc).unwrap();
        assert!(dc.is_dc());
        assert!(!dc.is_ac());

        let ac = (&h_ac * &v_ac).unwrap();
        assert!(ac.is_ac());
        assert!(!ac.is_dc());
    }

    #[test]
    fn test_laplace_sum_causal_only_if_both_are() {
        let causal = Assumptions::new().with_causal(true);
        let a = laplace("1 / (s + 1)", Quantity::Voltage, causal.clone());
        let b = laplace("2 / (s + 3)", Quantity::Voltage, causal);
        let v_dc = laplace("5 / s", Quantity::Voltage, Assumptions::new().with_dc(true));
        let w_dc = laplace("2 / s", Quantity::Voltage, Assumptions::new().with_dc(true));

        assert!((&a + &b).unwrap().is_causal());
        let mixed = (&a + &v_dc).unwrap();
        assert!(!mixed.is_causal());
        assert!(!mixed.is_dc());
        assert!((&v_dc + &w_dc).unwrap().is_dc());
    }

    #[test]
    fn test_parallel() {
        let a = typed("2", Domain::Laplace, Quantity::Impedance);
        let b = typed("2", Domain::Laplace, Quantity::Impedance);
        let c = typed("1", Domain::Laplace, Quantity::Impedance);
        assert!((&a | &b).unwrap().equals(1));
        let left = ((&a | &b).unwrap() | &c).unwrap();
        let right = (&a | (&b | &c).unwrap()).unwrap();
        assert!(left.equals(&right));
    }

    #[test]
    fn test_comparisons() {
        let x = expr("3").unwrap();
        assert!(x == 3);
        assert!(x != Some(expr("4").unwrap()));
        assert!(x != None);
        assert!(x != vec![expr("3").unwrap()]);
        assert!(x.gt(2).unwrap());
        assert!(x.le(3.0).unwrap());
        assert!(x.gt(None::<Expr>).unwrap());
        let v = typed("1", Domain::Time, Quantity::Voltage);
        let i = typed("1", Domain::Time, Quantity::Current);
        assert!(!v.equals(&i));
    }
}
