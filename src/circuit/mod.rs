//! Circuit graph representation and validation.
//!
//! This module provides the internal representation of a netlist after
//! parsing. The [`Circuit`] struct holds all components, nodes and their
//! connections in a form suitable for nodal analysis.

mod graph;
mod types;
mod validate;

pub use graph::{Circuit, DEFAULT_NODE_PREFIX};
pub use types::*;
pub use validate::validate_circuit;
