//! Domain-aware expressions.
//!
//! [`Expr`] wraps a backend expression together with its [`Kind`] (domain
//! and physical quantity) and its [`Assumptions`]. Arithmetic checks that
//! the operand kinds are compatible and works out the kind of the result,
//! so that, for example, a Laplace-domain voltage divided by an impedance
//! is a current while a time-domain voltage plus a current is an error.

pub mod assumptions;
pub mod base;
pub mod domains;
pub mod kind;
pub mod ops;

pub use self::assumptions::Assumptions;
pub use self::base::{Expr, Part};
pub use self::domains::{cexpr, fexpr, nexpr, omegaexpr, sexpr, texpr, zexpr};
pub use self::kind::{Domain, Kind, Quantity};
pub use self::ops::Operand;

use crate::error::Result;
use crate::sym::parse;

/// Domain variables in detection order.
const DETECTION_ORDER: [Domain; 6] = [
    Domain::Time,
    Domain::Laplace,
    Domain::Fourier,
    Domain::AngularFourier,
    Domain::DiscreteTime,
    Domain::Z,
];

/// Parse an expression, picking the domain from the domain variable it
/// contains. Expressions without one are constants.
pub fn expr(text: &str) -> Result<Expr> {
    expr_with(text, Assumptions::new())
}

/// Parse with assumptions. Only `real` and `complex` affect how new
/// symbols are created.
pub fn expr_with(text: &str, assumptions: Assumptions) -> Result<Expr> {
    let sym = parse::parse_with(text, assumptions.backend_flags())?;
    let domain = DETECTION_ORDER
        .iter()
        .copied()
        .find(|d| d.var().is_some_and(|v| sym.has_symbol_named(v.name())))
        .unwrap_or(Domain::Constant);
    Expr::with_assumptions(sym, Kind::of(domain), assumptions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_detection() {
        assert_eq!(expr("exp(-t)").unwrap().domain(), Domain::Time);
        assert_eq!(expr("1 / (s + a)").unwrap().domain(), Domain::Laplace);
        assert_eq!(expr("j * omega").unwrap().domain(), Domain::AngularFourier);
        assert_eq!(expr("z / (z - 1)").unwrap().domain(), Domain::Z);
        assert_eq!(expr("R1 + R2").unwrap().domain(), Domain::Constant);
    }

    #[test]
    fn test_complex_assumption_reaches_parser() {
        let x = expr_with("q_complex", Assumptions::new().with_complex(true)).unwrap();
        let symbol = x.find_symbol("q_complex").unwrap();
        assert!(!symbol.is_real());
    }
}
