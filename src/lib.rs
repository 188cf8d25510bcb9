//! # Symcircuit
//!
//! Symbolic circuit analysis with domain-tagged expressions.
//!
//! This library provides:
//! - Expressions that know their domain (time, Laplace, Fourier, angular
//!   Fourier, discrete time, z) and physical quantity
//! - Table-driven Laplace, Fourier and z-transforms and their inverses
//! - Rational-function forms: canonical, partial fraction, ZPK, time
//!   constant and friends
//! - Numeric evaluation of generalized functions
//! - One-port networks and nodal analysis of netlists
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`sym`] - Minimal symbolic backend (trees, rationals, roots, calculus)
//! - [`expr`] - Domain-aware expressions and arithmetic rules
//! - [`ratfun`] - Rational functions of the domain variable
//! - [`transform`] - Domain transforms
//! - [`numeric`] - Bytecode evaluator for numeric sampling
//! - [`container`] - Lists, tuples, dictionaries and matrices of expressions
//! - [`network`] - One-port networks and their equivalents
//! - [`dsl`] - Parser for the netlist language
//! - [`circuit`] - Circuit graph representation and validation
//! - [`components`] - Netlist element models
//! - [`nodal`] - Nodal analysis
//!
//! ## Usage
//!
//! ### Library
//!
//! ```ignore
//! use symcircuit::expr::texpr;
//!
//! let x = texpr("exp(-2 * t) * u(t)")?;
//! let xs = x.laplace()?;              // 1 / (s + 2)
//! let back = xs.inverse_laplace()?;   // exp(-2 t) u(t)
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! symcircuit expr "1 / (s + 1)" --op inverse-laplace --causal
//! symcircuit nodal divider.net --solve
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmExpr } from 'symcircuit';
//!
//! const x = new WasmExpr('1 / (s^2 + 3*s + 2)');
//! console.log(x.partfrac().to_latex());
//! ```

pub mod circuit;
pub mod components;
pub mod container;
pub mod dsl;
pub mod error;
pub mod expr;
pub mod network;
pub mod nodal;
pub mod numeric;
pub mod ratfun;
pub mod sym;
pub mod transform;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use container::{ExprDict, ExprList, ExprMatrix, ExprTuple};
pub use error::{Result, SymCircuitError};
pub use expr::{expr, Assumptions, Domain, Expr, Kind, Quantity};
pub use network::OnePort;
pub use nodal::NodalAnalysis;
pub use numeric::{EvaluatorConfig, NumericEvaluator};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmExpr;
