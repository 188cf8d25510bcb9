//! Error types for symcircuit.
//!
//! This module provides a unified error type [`SymCircuitError`] that covers
//! expression construction and arithmetic, rational-function manipulation,
//! domain transforms, numeric evaluation, netlist parsing and nodal analysis.

use thiserror::Error;

/// Result type alias using [`SymCircuitError`].
pub type Result<T> = std::result::Result<T, SymCircuitError>;

/// Unified error type for all symcircuit operations.
#[derive(Error, Debug)]
pub enum SymCircuitError {
    // ============ Expression Errors ============
    /// Operands cannot be combined by the attempted operator
    #[error("Cannot combine {lhs_kind}({lhs}) with {rhs_kind}({rhs}) for {op}")]
    IncompatibleDomain {
        lhs_kind: String,
        lhs: String,
        rhs_kind: String,
        rhs: String,
        op: String,
    },

    /// Time-domain product that is really a convolution
    #[error("Need to convolve expressions: {lhs_kind}({lhs}) * {rhs_kind}({rhs})")]
    ConvolutionRequired {
        lhs_kind: String,
        lhs: String,
        rhs_kind: String,
        rhs: String,
    },

    /// Time-domain quotient that is really a deconvolution
    #[error("Need to deconvolve expressions: {lhs_kind}({lhs}) / {rhs_kind}({rhs})")]
    DeconvolutionRequired {
        lhs_kind: String,
        lhs: String,
        rhs_kind: String,
        rhs: String,
    },

    /// Expression depends on a variable its domain forbids
    #[error("{domain}-domain expression {expr} cannot depend on {var}")]
    InvalidDomainVariable {
        domain: String,
        expr: String,
        var: String,
    },

    /// Invalid argument passed to an expression operation
    #[error("Invalid argument for {operation}: {message}")]
    InvalidArgument { operation: String, message: String },

    // ============ Rational Function Errors ============
    /// Coefficient extraction on a genuine rational function
    #[error("Expression {expr} is not a polynomial; use .N or .D to specify numerator or denominator of rational function")]
    NotRational { expr: String },

    /// Rational-function manipulation could not be completed
    #[error("Cannot {operation} {expr}: {message}")]
    RationalFunction {
        operation: String,
        expr: String,
        message: String,
    },

    // ============ Transform Errors ============
    /// Requested transform has no closed form for the assumption state
    #[error("Cannot determine {transform} of {expr}: {message}")]
    TransformUndefined {
        transform: String,
        expr: String,
        message: String,
    },

    /// Limit could not be determined
    #[error("Cannot determine limit of {expr} as {var} -> {value}")]
    LimitUndefined {
        expr: String,
        var: String,
        value: String,
    },

    // ============ Evaluation Errors ============
    /// Free symbols remain besides the evaluation variable
    #[error("Undefined symbols {symbols:?} in expression {expr}")]
    UndefinedSymbol { symbols: Vec<String>, expr: String },

    /// Numeric evaluation failed
    #[error("Cannot evaluate expression {expr}: {cause}")]
    Evaluation { expr: String, cause: String },

    // ============ Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    // ============ Circuit Errors ============
    /// Node not found in circuit
    #[error("Node '{node}' not found in circuit")]
    NodeNotFound { node: String },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    /// Linear system has no unique solution
    #[error("Singular system of equations - circuit may have a voltage source loop or floating node")]
    SingularSystem,

    // ============ I/O Errors ============
    /// Error reading netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SymCircuitError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a transform error
    pub fn transform_undefined(
        transform: impl Into<String>,
        expr: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::TransformUndefined {
            transform: transform.into(),
            expr: expr.to_string(),
            message: message.into(),
        }
    }

    /// Create an evaluation error
    pub fn evaluation(expr: impl ToString, cause: impl Into<String>) -> Self {
        Self::Evaluation {
            expr: expr.to_string(),
            cause: cause.into(),
        }
    }

    /// Create a rational-function error
    pub fn rational_function(
        operation: impl Into<String>,
        expr: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::RationalFunction {
            operation: operation.into(),
            expr: expr.to_string(),
            message: message.into(),
        }
    }
}
