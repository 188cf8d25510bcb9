//! Numeric evaluation of expressions.
//!
//! An expression is compiled once into a small stack program over
//! [`Complex64`] and then run for each value of its domain variable.
//! Generalized functions get pointwise values: the Dirac delta is infinite
//! at the origin and zero elsewhere, the Heaviside step is one for
//! non-negative arguments and the unit impulse is one only at zero.

use num_complex::Complex64;

use crate::error::{Result, SymCircuitError};
use crate::expr::Expr;
use crate::sym::{Constant, Func, Node, Sym, Symbol};

/// Default bound on the real and imaginary parts of an `exp` argument.
pub const DEFAULT_EXP_CLIP: f64 = 500.0;

/// Default tolerance below which imaginary parts are dropped.
pub const DEFAULT_IMAG_TOLERANCE: f64 = 1e-12;

/// Configuration for the numeric evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Arguments of `exp` are clipped to this magnitude, per component.
    pub exp_clip: f64,
    /// Results whose imaginary parts are all within this bound are real.
    pub imag_tolerance: f64,
    /// Return zero for negative arguments of causal expressions without
    /// running the program.
    pub causal_shortcut: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            exp_clip: DEFAULT_EXP_CLIP,
            imag_tolerance: DEFAULT_IMAG_TOLERANCE,
            causal_shortcut: true,
        }
    }
}

impl EvaluatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clip applied to `exp` arguments.
    pub fn with_exp_clip(mut self, exp_clip: f64) -> Self {
        self.exp_clip = exp_clip;
        self
    }

    /// Set the tolerance for collapsing results to real values.
    pub fn with_imag_tolerance(mut self, imag_tolerance: f64) -> Self {
        self.imag_tolerance = imag_tolerance;
        self
    }

    /// Enable or disable the causal short-circuit.
    pub fn with_causal_shortcut(mut self, causal_shortcut: bool) -> Self {
        self.causal_shortcut = causal_shortcut;
        self
    }
}

/// A scalar result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Real(f64),
    Complex(Complex64),
}

impl Value {
    /// Real part (the value itself for real results).
    pub fn re(&self) -> f64 {
        match self {
            Value::Real(x) => *x,
            Value::Complex(c) => c.re,
        }
    }

    pub fn to_complex(&self) -> Complex64 {
        match self {
            Value::Real(x) => Complex64::new(*x, 0.0),
            Value::Complex(c) => *c,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Value::Real(_))
    }
}

/// Results of evaluating at many points. Either every value is real or
/// all are kept complex.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Real(v) => v.len(),
            Values::Complex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Values::Real(v) => v.get(index).copied().map(Value::Real),
            Values::Complex(v) => v.get(index).copied().map(Value::Complex),
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Push(Complex64),
    Var,
    /// Pop n values, push their sum
    Add(usize),
    /// Pop n values, push their product
    Mul(usize),
    PowInt(i32),
    /// Pop exponent then base
    Pow,
    Apply(Func),
    /// Pop x then y, push atan2(y, x)
    Atan2,
}

/// Compiled expression of (at most) one variable.
#[derive(Debug, Clone)]
pub struct NumericEvaluator {
    program: Vec<Op>,
    var: Option<Symbol>,
    causal: bool,
    config: EvaluatorConfig,
    /// Source text, for error messages
    source: String,
}

impl NumericEvaluator {
    /// Compile `x` as a function of `var` with default configuration.
    pub fn new(x: &Sym, var: Option<Symbol>) -> Result<Self> {
        Self::with_config(x, var, EvaluatorConfig::default())
    }

    /// Compile `x` as a function of `var` with custom configuration.
    pub fn with_config(x: &Sym, var: Option<Symbol>, config: EvaluatorConfig) -> Result<Self> {
        let symbols = x.free_symbols();
        // A lone free symbol is the variable when none is given.
        let var = match var {
            None if symbols.len() == 1 => symbols.iter().next().cloned(),
            var => var,
        };
        let extra: Vec<String> = symbols
            .into_iter()
            .filter(|s| !same_name(s, var.as_ref()))
            .map(|s| s.name().to_string())
            .collect();
        if !extra.is_empty() {
            return Err(SymCircuitError::UndefinedSymbol {
                symbols: extra,
                expr: x.to_string(),
            });
        }

        let mut program = Vec::new();
        compile(x, var.as_ref(), &mut program)
            .map_err(|cause| SymCircuitError::evaluation(x, cause))?;
        log::debug!("compiled {} into {} ops", x, program.len());
        Ok(Self {
            program,
            var,
            causal: false,
            config,
            source: x.to_string(),
        })
    }

    /// Treat the expression as causal: zero for negative arguments.
    pub fn causal(mut self, causal: bool) -> Self {
        self.causal = causal;
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate at a complex argument.
    pub fn eval_complex(&self, arg: Complex64) -> Result<Complex64> {
        if self.causal && self.config.causal_shortcut && arg.im == 0.0 && arg.re < 0.0 {
            return Ok(Complex64::new(0.0, 0.0));
        }
        let mut stack: Vec<Complex64> = Vec::with_capacity(self.program.len());
        for op in &self.program {
            match op {
                Op::Push(c) => stack.push(*c),
                Op::Var => stack.push(arg),
                Op::Add(n) => {
                    let at = self.split_point(&stack, *n)?;
                    let sum: Complex64 = stack.drain(at..).sum();
                    stack.push(sum);
                }
                Op::Mul(n) => {
                    let at = self.split_point(&stack, *n)?;
                    let product: Complex64 = stack.drain(at..).product();
                    stack.push(product);
                }
                Op::PowInt(k) => {
                    let base = self.pop(&mut stack)?;
                    stack.push(base.powi(*k));
                }
                Op::Pow => {
                    let exp = self.pop(&mut stack)?;
                    let base = self.pop(&mut stack)?;
                    stack.push(power(base, exp));
                }
                Op::Apply(func) => {
                    let a = self.pop(&mut stack)?;
                    stack.push(self.apply(func, a));
                }
                Op::Atan2 => {
                    let x = self.pop(&mut stack)?;
                    let y = self.pop(&mut stack)?;
                    stack.push(Complex64::new(y.re.atan2(x.re), 0.0));
                }
            }
        }
        match stack.as_slice() {
            [result] => Ok(*result),
            _ => Err(SymCircuitError::evaluation(&self.source, "malformed program")),
        }
    }

    /// Evaluate at a real argument, collapsing to a real value when the
    /// imaginary part is negligible.
    pub fn eval(&self, arg: f64) -> Result<Value> {
        let c = self.eval_complex(Complex64::new(arg, 0.0))?;
        Ok(self.collapse(c))
    }

    /// Evaluate without an argument; only valid if the expression does not
    /// depend on its variable.
    pub fn eval_const(&self) -> Result<Value> {
        if self.program.iter().any(|op| matches!(op, Op::Var)) {
            let var = self.var.as_ref().map(|v| v.name().to_string()).unwrap_or_default();
            return Err(SymCircuitError::evaluation(
                &self.source,
                format!("a value for {} is required", var),
            ));
        }
        self.eval(0.0)
    }

    /// Evaluate elementwise.
    pub fn eval_many(&self, args: &[f64]) -> Result<Values> {
        let values = args
            .iter()
            .map(|&x| self.eval_complex(Complex64::new(x, 0.0)))
            .collect::<Result<Vec<_>>>()?;
        let tol = self.config.imag_tolerance;
        if values.iter().all(|c| c.im.abs() <= tol) {
            Ok(Values::Real(values.iter().map(|c| c.re).collect()))
        } else {
            Ok(Values::Complex(values))
        }
    }

    fn collapse(&self, c: Complex64) -> Value {
        if c.im.abs() <= self.config.imag_tolerance {
            Value::Real(c.re)
        } else {
            Value::Complex(c)
        }
    }

    fn pop(&self, stack: &mut Vec<Complex64>) -> Result<Complex64> {
        stack
            .pop()
            .ok_or_else(|| SymCircuitError::evaluation(&self.source, "stack underflow"))
    }

    fn split_point(&self, stack: &[Complex64], n: usize) -> Result<usize> {
        stack
            .len()
            .checked_sub(n)
            .ok_or_else(|| SymCircuitError::evaluation(&self.source, "stack underflow"))
    }

    fn apply(&self, func: &Func, a: Complex64) -> Complex64 {
        let real = |x: f64| Complex64::new(x, 0.0);
        match func {
            Func::Exp => {
                Complex64::new(a.re.min(self.config.exp_clip), a.im).exp()
            }
            Func::Log => a.ln(),
            Func::Sin => a.sin(),
            Func::Cos => a.cos(),
            Func::Tan => a.tan(),
            Func::Atan => a.atan(),
            Func::Abs => real(a.norm()),
            Func::Re => real(a.re),
            Func::Im => real(a.im),
            Func::Arg => real(a.arg()),
            Func::Conjugate => a.conj(),
            Func::Sign => real(if a.re > 0.0 {
                1.0
            } else if a.re < 0.0 {
                -1.0
            } else {
                0.0
            }),
            Func::Heaviside => real(if a.re >= 0.0 { 1.0 } else { 0.0 }),
            Func::DiracDelta => real(if a.re == 0.0 { f64::INFINITY } else { 0.0 }),
            Func::UnitImpulse => real(if a.re == 0.0 { 1.0 } else { 0.0 }),
            // Rejected at compile time.
            Func::Atan2 | Func::Undefined(_) => real(f64::NAN),
        }
    }
}

/// Real powers of non-negative reals stay real; negative reals are
/// promoted to the principal complex value.
fn power(base: Complex64, exp: Complex64) -> Complex64 {
    if base.im == 0.0 && exp.im == 0.0 && base.re >= 0.0 {
        Complex64::new(base.re.powf(exp.re), 0.0)
    } else {
        base.powc(exp)
    }
}

fn same_name(s: &Symbol, var: Option<&Symbol>) -> bool {
    var.map_or(false, |v| v.name() == s.name())
}

fn compile(x: &Sym, var: Option<&Symbol>, out: &mut Vec<Op>) -> std::result::Result<(), String> {
    match x.node() {
        Node::Number(n) => out.push(Op::Push(Complex64::new(n.to_f64(), 0.0))),
        Node::Constant(c) => {
            let value = match c {
                Constant::Pi => Complex64::new(std::f64::consts::PI, 0.0),
                Constant::E => Complex64::new(std::f64::consts::E, 0.0),
                Constant::I => Complex64::new(0.0, 1.0),
                Constant::Infinity => Complex64::new(f64::INFINITY, 0.0),
                Constant::NaN => Complex64::new(f64::NAN, 0.0),
            };
            out.push(Op::Push(value));
        }
        Node::Symbol(s) if same_name(s, var) => out.push(Op::Var),
        Node::Symbol(s) => return Err(format!("undefined symbol {}", s.name())),
        Node::Add(terms) => {
            for t in terms {
                compile(t, var, out)?;
            }
            out.push(Op::Add(terms.len()));
        }
        Node::Mul(factors) => {
            for f in factors {
                compile(f, var, out)?;
            }
            out.push(Op::Mul(factors.len()));
        }
        Node::Pow(base, e) => {
            compile(base, var, out)?;
            match e.as_i64().and_then(|k| i32::try_from(k).ok()) {
                Some(k) => out.push(Op::PowInt(k)),
                None => {
                    compile(e, var, out)?;
                    out.push(Op::Pow);
                }
            }
        }
        Node::Apply(Func::Atan2, args) => {
            let [y, x] = args.as_slice() else {
                return Err("atan2 takes two arguments".to_string());
            };
            compile(y, var, out)?;
            compile(x, var, out)?;
            out.push(Op::Atan2);
        }
        Node::Apply(Func::Undefined(name), _) => {
            return Err(format!("undefined function {}", name));
        }
        Node::Apply(func, args) => {
            // Derivatives of the Dirac delta share its support.
            let arg = args.first().ok_or_else(|| format!("{} without argument", func.name()))?;
            compile(arg, var, out)?;
            out.push(Op::Apply(func.clone()));
        }
        Node::Integral { .. } => return Err("unevaluated integral".to_string()),
        Node::Derivative { .. } => return Err("unevaluated derivative".to_string()),
    }
    Ok(())
}

impl Expr {
    /// Compile this expression for repeated numeric evaluation.
    pub fn evaluator(&self) -> Result<NumericEvaluator> {
        self.evaluator_with(EvaluatorConfig::default())
    }

    pub fn evaluator_with(&self, config: EvaluatorConfig) -> Result<NumericEvaluator> {
        let causal = self.is_causal();
        Ok(NumericEvaluator::with_config(self.sym(), self.var(), config)?.causal(causal))
    }

    /// Numeric value of an expression that does not depend on its domain
    /// variable.
    pub fn evaluate(&self) -> Result<Value> {
        self.evaluator()?.eval_const()
    }

    /// Numeric value at `arg`.
    pub fn evaluate_at(&self, arg: f64) -> Result<Value> {
        self.evaluator()?.eval(arg)
    }

    /// Numeric values at each of `args`.
    pub fn evaluate_many(&self, args: &[f64]) -> Result<Values> {
        self.evaluator()?.eval_many(args)
    }

    /// Numeric value at a complex argument, e.g. a Laplace-domain
    /// expression at a point of the s plane.
    pub fn evaluate_complex(&self, arg: Complex64) -> Result<Complex64> {
        self.evaluator()?.eval_complex(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{expr, omegaexpr, sexpr, texpr};
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_evaluation() {
        let x = texpr("3 * exp(-2 * t)").unwrap();
        assert_relative_eq!(x.evaluate_at(0.5).unwrap().re(), 3.0 * (-1.0f64).exp(), epsilon = 1e-12);
        assert!(x.evaluate_at(1.0).unwrap().is_real());
    }

    #[test]
    fn test_constant_evaluation() {
        let x = expr("sqrt(2) * pi").unwrap();
        assert_relative_eq!(
            x.evaluate().unwrap().re(),
            2f64.sqrt() * std::f64::consts::PI,
            epsilon = 1e-12
        );
        assert!(texpr("t").unwrap().evaluate().is_err());
    }

    #[test]
    fn test_vector_collapses_to_real() {
        let x = texpr("cos(t)").unwrap();
        let v = x.evaluate_many(&[0.0, std::f64::consts::PI]).unwrap();
        match v {
            Values::Real(v) => {
                assert_relative_eq!(v[0], 1.0, epsilon = 1e-12);
                assert_relative_eq!(v[1], -1.0, epsilon = 1e-12);
            }
            Values::Complex(_) => panic!("expected real values"),
        }
    }

    #[test]
    fn test_complex_results_stay_complex() {
        let h = sexpr("1 / (s + 1)").unwrap();
        let w = h.evaluate_complex(Complex64::new(0.0, 1.0)).unwrap();
        assert_relative_eq!(w.re, 0.5, epsilon = 1e-12);
        assert_relative_eq!(w.im, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_generalized_functions() {
        let step = texpr("u(t)").unwrap();
        assert_eq!(step.evaluate_at(0.0).unwrap(), Value::Real(1.0));
        assert_eq!(step.evaluate_at(-1.0).unwrap(), Value::Real(0.0));
        let delta = texpr("delta(t)").unwrap();
        assert!(delta.evaluate_at(0.0).unwrap().re().is_infinite());
        assert_eq!(delta.evaluate_at(1.0).unwrap(), Value::Real(0.0));
    }

    #[test]
    fn test_causal_shortcut() {
        let x = texpr("exp(-t) * u(t)").unwrap();
        let ev = x.evaluator().unwrap();
        assert_eq!(ev.eval(-2.0).unwrap(), Value::Real(0.0));
    }

    #[test]
    fn test_exp_is_clipped() {
        let x = texpr("exp(t)").unwrap();
        let big = x.evaluate_at(1e6).unwrap().re();
        assert!(big.is_finite());
        let config = EvaluatorConfig::new().with_exp_clip(1.0);
        let clipped = x.evaluator_with(config).unwrap().eval(5.0).unwrap().re();
        assert_relative_eq!(clipped, std::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn test_exp_keeps_phase_and_decay() {
        let x = omegaexpr("exp(j * omega)").unwrap();
        match x.evaluate_at(600.0).unwrap() {
            Value::Complex(c) => {
                assert_relative_eq!(c.re, 600f64.cos(), epsilon = 1e-12);
                assert_relative_eq!(c.im, 600f64.sin(), epsilon = 1e-12);
            }
            Value::Real(_) => panic!("expected complex value"),
        }
        let y = texpr("exp(t)").unwrap();
        assert_relative_eq!(y.evaluate_at(-600.0).unwrap().re(), 0.0, epsilon = 1e-200);
    }

    #[test]
    fn test_lone_symbol_is_the_variable() {
        let x = expr("x^2").unwrap();
        assert_relative_eq!(x.evaluate_at(3.0).unwrap().re(), 9.0, epsilon = 1e-12);
        let y = expr("x * y").unwrap();
        assert!(matches!(
            y.evaluate_at(1.0),
            Err(SymCircuitError::UndefinedSymbol { .. })
        ));
    }

    #[test]
    fn test_sqrt_of_negative_is_complex() {
        let x = texpr("sqrt(t)").unwrap();
        match x.evaluate_at(-4.0).unwrap() {
            Value::Complex(c) => assert_relative_eq!(c.im, 2.0, epsilon = 1e-12),
            Value::Real(_) => panic!("expected complex value"),
        }
    }

    #[test]
    fn test_undefined_symbols() {
        let x = texpr("a * t").unwrap();
        assert!(matches!(
            x.evaluate_at(1.0),
            Err(SymCircuitError::UndefinedSymbol { .. })
        ));
        let v = texpr("v(t)").unwrap();
        assert!(matches!(v.evaluate_at(1.0), Err(SymCircuitError::Evaluation { .. })));
    }
}
