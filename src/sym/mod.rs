//! Symbolic backend.
//!
//! A small computer-algebra core: exact numbers, a global symbol registry,
//! canonical expression trees and the handful of algorithms the expression
//! layer needs (rational normal form, polynomials and their roots, calculus,
//! numeric evaluation and printing).
//!
//! Expressions are immutable and reference counted; every constructor
//! returns a canonical form, so structural equality is a cheap first test
//! and [`rational::is_zero`] the semantic one.

pub mod calculus;
pub mod complex;
pub mod evalf;
pub mod expand;
pub mod func;
pub mod node;
pub mod number;
pub mod parse;
pub mod poly;
pub mod printer;
pub mod rational;
pub mod roots;
pub mod subs;
pub mod symbol;

pub use calculus::Direction;
pub use func::Func;
pub use node::{Constant, Node, Sym};
pub use number::Number;
pub use poly::Poly;
pub use roots::Damping;
pub use symbol::{Symbol, SymbolFlags};
