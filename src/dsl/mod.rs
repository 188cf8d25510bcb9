//! Netlist language parser.
//!
//! A SPICE-flavoured, line-oriented description of linear circuits whose
//! element values may be symbolic.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = ".node" node | ".prefix" identifier
//! component   = name node node [keyword] [value [value]]
//!
//! name        = ('R' | 'G' | 'L' | 'C' | 'V' | 'I') { letter | digit | '_' }
//! node        = identifier | number | "0" | "gnd"
//! keyword     = "dc" | "ac" | "step" | "s"
//! value       = number [unit_suffix] | identifier | '{' expression '}'
//!
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! ```
//!
//! # Components
//!
//! | Prefix | Description | Syntax |
//! |--------|-------------|--------|
//! | R | Resistor | `R<name> <n1> <n2> [value]` |
//! | G | Conductor | `G<name> <n1> <n2> [value]` |
//! | L | Inductor | `L<name> <n1> <n2> [value [i0]]` |
//! | C | Capacitor | `C<name> <n1> <n2> [value [v0]]` |
//! | V | Voltage source | `V<name> <n+> <n-> [keyword] [value [phase]]` |
//! | I | Current source | `I<name> <n+> <n-> [keyword] [value [phase]]` |
//!
//! An omitted value is the component name as a symbol. Source current
//! flows from `n+` through the source to `n-`. A second value is the
//! initial value of an inductor or capacitor, or the phase of an `ac`
//! source.
//!
//! # Example
//!
//! ```text
//! # RC low-pass filter
//! V1 in 0 step 10
//! R1 in out 10k
//! C1 out 0 100n
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::SymCircuitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
