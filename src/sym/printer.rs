//! Text, unicode and LaTeX rendering.

use std::cmp::Reverse;
use std::fmt;

use num_traits::{One, Signed};

use super::func::Func;
use super::node::{Constant, Node, Sym};
use super::number::Number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Text,
    Pretty,
    Latex,
}

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

const GREEK: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("zeta", "ζ"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("omega", "ω"),
    ("Omega", "Ω"),
];

struct Printer {
    style: Style,
}

/// Degree of a term in its symbols, used to order sums for display.
fn display_degree(term: &Sym) -> i64 {
    term.factors()
        .iter()
        .map(|f| match f.node() {
            Node::Symbol(_) => 1,
            Node::Pow(b, e) if b.as_symbol().is_some() => e.as_i64().unwrap_or(0),
            _ => 0,
        })
        .sum()
}

fn precedence(x: &Sym) -> u8 {
    match x.node() {
        Node::Add(_) => PREC_ADD,
        Node::Mul(_) => PREC_MUL,
        Node::Number(n) => {
            if n.is_negative() || (!n.is_integer() && !n.is_float()) {
                PREC_MUL
            } else {
                PREC_ATOM
            }
        }
        Node::Pow(..) => PREC_POW,
        _ => PREC_ATOM,
    }
}

fn superscript(text: &str) -> Option<String> {
    text.chars()
        .map(|c| match c {
            '0' => Some('⁰'),
            '1' => Some('¹'),
            '2' => Some('²'),
            '3' => Some('³'),
            '4' => Some('⁴'),
            '5' => Some('⁵'),
            '6' => Some('⁶'),
            '7' => Some('⁷'),
            '8' => Some('⁸'),
            '9' => Some('⁹'),
            '-' => Some('⁻'),
            _ => None,
        })
        .collect()
}

impl Printer {
    fn print(&self, x: &Sym) -> String {
        match x.node() {
            Node::Number(n) => self.number(n),
            Node::Constant(c) => self.constant(*c).to_string(),
            Node::Symbol(s) => self.symbol_name(s.name()),
            Node::Add(ts) => self.add(ts),
            Node::Mul(_) => self.mul(x),
            Node::Pow(b, e) => self.pow(b, e),
            Node::Apply(func, args) => self.apply(func, args),
            Node::Integral {
                integrand,
                var,
                lower,
                upper,
            } => {
                let v = self.symbol_name(var.name());
                let body = self.print(integrand);
                let (lo, hi) = (self.print(lower), self.print(upper));
                match self.style {
                    Style::Text => format!("Integral({}, ({}, {}, {}))", body, v, lo, hi),
                    Style::Pretty => format!("∫_{{{}}}^{{{}}} {} d{}", lo, hi, body, v),
                    Style::Latex => format!("\\int_{{{}}}^{{{}}} {}\\, d{}", lo, hi, body, v),
                }
            }
            Node::Derivative { expr, var, order } => {
                let v = self.symbol_name(var.name());
                let body = self.print(expr);
                match (self.style, *order) {
                    (Style::Latex, 1) => format!("\\frac{{d}}{{d {}}} {}", v, body),
                    (Style::Latex, k) => format!("\\frac{{d^{{{}}}}}{{d {}^{{{}}}}} {}", k, v, k, body),
                    (_, 1) => format!("Derivative({}, {})", body, v),
                    (_, k) => format!("Derivative({}, ({}, {}))", body, v, k),
                }
            }
        }
    }

    fn paren(&self, x: &Sym, min_prec: u8) -> String {
        let inner = self.print(x);
        if precedence(x) < min_prec {
            self.wrap(&inner)
        } else {
            inner
        }
    }

    fn wrap(&self, inner: &str) -> String {
        match self.style {
            Style::Latex => format!("\\left({}\\right)", inner),
            _ => format!("({})", inner),
        }
    }

    fn number(&self, n: &Number) -> String {
        if self.style == Style::Latex {
            if let Some((p, q)) = n.numer_denom() {
                if !q.is_one() {
                    let sign = if p.is_negative() { "-" } else { "" };
                    let p = if sign.is_empty() { p } else { -p };
                    return format!("{}\\frac{{{}}}{{{}}}", sign, p, q);
                }
            }
        }
        n.to_string()
    }

    fn constant(&self, c: Constant) -> &'static str {
        match (self.style, c) {
            (Style::Latex, Constant::Pi) => "\\pi",
            (Style::Latex, Constant::E) => "e",
            (Style::Latex, Constant::I) => "\\mathrm{j}",
            (Style::Latex, Constant::Infinity) => "\\infty",
            (Style::Latex, Constant::NaN) => "\\mathrm{NaN}",
            (Style::Pretty, Constant::Pi) => "π",
            (Style::Pretty, Constant::E) => "ℯ",
            (Style::Pretty, Constant::I) => "ⅉ",
            (Style::Pretty, Constant::Infinity) => "∞",
            (_, Constant::Pi) => "pi",
            (_, Constant::E) => "E",
            (_, Constant::I) => "j",
            (_, Constant::Infinity) => "oo",
            (_, Constant::NaN) => "nan",
        }
    }

    fn symbol_name(&self, name: &str) -> String {
        match self.style {
            Style::Text => name.to_string(),
            Style::Pretty => {
                let (base, sub) = match name.split_once('_') {
                    Some((b, s)) => (b, Some(s)),
                    None => (name, None),
                };
                let base = GREEK
                    .iter()
                    .find(|(n, _)| *n == base)
                    .map(|(_, g)| g.to_string())
                    .unwrap_or_else(|| base.to_string());
                match sub {
                    Some(s) => format!("{}_{}", base, s),
                    None => base,
                }
            }
            Style::Latex => {
                let (base, sub) = match name.split_once('_') {
                    Some((b, s)) => (b, Some(s)),
                    None => (name, None),
                };
                let base = if GREEK.iter().any(|(n, _)| *n == base) {
                    format!("\\{}", base)
                } else if base.chars().count() > 1 {
                    format!("\\mathrm{{{}}}", base)
                } else {
                    base.to_string()
                };
                match sub {
                    Some(s) => format!("{}_{{{}}}", base, s),
                    None => base,
                }
            }
        }
    }

    fn add(&self, terms: &[Sym]) -> String {
        let mut ordered: Vec<&Sym> = terms.iter().collect();
        ordered.sort_by_key(|t| Reverse(display_degree(t)));
        let mut out = String::new();
        for (i, term) in ordered.iter().enumerate() {
            let negative = term.as_coeff_mul().0.is_negative();
            let body = if negative {
                self.print(&-(*term).clone())
            } else {
                self.print(term)
            };
            match (i, negative) {
                (0, true) => {
                    out.push('-');
                    out.push_str(&body);
                }
                (0, false) => out.push_str(&body),
                (_, true) => {
                    out.push_str(" - ");
                    out.push_str(&body);
                }
                (_, false) => {
                    out.push_str(" + ");
                    out.push_str(&body);
                }
            }
        }
        out
    }

    fn mul(&self, x: &Sym) -> String {
        let (coeff, rest) = x.as_coeff_mul();
        let negative = coeff.is_negative();
        let coeff = coeff.abs();

        let mut num: Vec<String> = Vec::new();
        let mut den: Vec<String> = Vec::new();
        let mut den_count = 0;

        match coeff.numer_denom() {
            Some((p, q)) => {
                if !p.is_one() {
                    num.push(p.to_string());
                }
                if !q.is_one() {
                    den.push(q.to_string());
                    den_count += 1;
                }
            }
            None => {
                if !coeff.is_one() {
                    num.push(coeff.to_string());
                }
            }
        }

        for f in rest.factors() {
            if f.is_one() {
                continue;
            }
            match f.node() {
                Node::Pow(b, e) if e.as_number().map(|n| n.is_negative()).unwrap_or(false) => {
                    let flipped = Sym::pow(b.clone(), -e);
                    den.push(self.paren(&flipped, PREC_MUL + 1));
                    den_count += 1;
                }
                _ => num.push(self.paren(&f, PREC_MUL + 1)),
            }
        }

        let sign = if negative { "-" } else { "" };
        let joiner = match self.style {
            Style::Text => "*",
            Style::Pretty => "⋅",
            Style::Latex => " ",
        };
        let numerator = if num.is_empty() {
            "1".to_string()
        } else {
            num.join(joiner)
        };
        if den.is_empty() {
            return format!("{}{}", sign, numerator);
        }
        let denominator = den.join(joiner);
        match self.style {
            Style::Latex => format!("{}\\frac{{{}}}{{{}}}", sign, numerator, denominator),
            _ => {
                let denominator = if den_count > 1 {
                    self.wrap(&denominator)
                } else {
                    denominator
                };
                format!("{}{}/{}", sign, numerator, denominator)
            }
        }
    }

    fn pow(&self, b: &Sym, e: &Sym) -> String {
        if *e == Sym::half() {
            let inner = self.print(b);
            return match self.style {
                Style::Text => format!("sqrt({})", inner),
                Style::Pretty => format!("√{}", self.paren(b, PREC_ATOM)),
                Style::Latex => format!("\\sqrt{{{}}}", inner),
            };
        }
        if e.as_number().map(|n| n.is_negative()).unwrap_or(false) {
            let flipped = Sym::pow(b.clone(), -e);
            return match self.style {
                Style::Latex => format!("\\frac{{1}}{{{}}}", self.print(&flipped)),
                _ => format!("1/{}", self.paren(&flipped, PREC_POW)),
            };
        }
        let base = self.paren(b, PREC_ATOM);
        match self.style {
            Style::Text => format!("{}^{}", base, self.paren(e, PREC_ATOM)),
            Style::Pretty => match e.as_i64().map(|k| k.to_string()).and_then(|k| superscript(&k)) {
                Some(sup) => format!("{}{}", base, sup),
                None => format!("{}^{}", base, self.paren(e, PREC_ATOM)),
            },
            Style::Latex => format!("{}^{{{}}}", base, self.print(e)),
        }
    }

    fn args(&self, args: &[Sym]) -> String {
        args.iter()
            .map(|a| self.print(a))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn apply(&self, func: &Func, args: &[Sym]) -> String {
        let inner = self.args(args);
        match self.style {
            Style::Latex => self.apply_latex(func, args, &inner),
            _ => {
                let name = match func {
                    Func::Heaviside => "u",
                    Func::DiracDelta if self.style == Style::Pretty => "δ",
                    Func::DiracDelta => "delta",
                    Func::UnitImpulse => "ui",
                    Func::Abs if self.style == Style::Pretty => {
                        return format!("│{}│", inner);
                    }
                    Func::Abs => "abs",
                    other => other.name(),
                };
                format!("{}({})", name, inner)
            }
        }
    }

    fn apply_latex(&self, func: &Func, args: &[Sym], inner: &str) -> String {
        let first = args.first().map(|a| self.print(a)).unwrap_or_default();
        match func {
            Func::Exp => format!("e^{{{}}}", first),
            Func::Abs => format!("\\left|{}\\right|", first),
            Func::Conjugate => format!("\\overline{{{}}}", first),
            Func::Heaviside => format!("u\\left({}\\right)", first),
            Func::UnitImpulse => format!("\\delta\\left[{}\\right]", first),
            Func::DiracDelta => match args.get(1).and_then(|k| k.as_i64()) {
                Some(k) => format!("\\delta^{{\\left({}\\right)}}\\left({}\\right)", k, first),
                None => format!("\\delta\\left({}\\right)", first),
            },
            Func::Sin | Func::Cos | Func::Tan | Func::Log | Func::Arg => {
                format!("\\{}{{\\left({}\\right)}}", func.name(), first)
            }
            Func::Re => format!("\\operatorname{{Re}}\\left({}\\right)", first),
            Func::Im => format!("\\operatorname{{Im}}\\left({}\\right)", first),
            Func::Undefined(name) => format!("{}\\left({}\\right)", self.symbol_name(name), inner),
            other => format!("\\operatorname{{{}}}\\left({}\\right)", other.name(), inner),
        }
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer { style: Style::Text };
        f.write_str(&printer.print(self))
    }
}

/// Unicode rendering.
pub fn pretty(x: &Sym) -> String {
    Printer {
        style: Style::Pretty,
    }
    .print(x)
}

/// LaTeX rendering.
pub fn latex(x: &Sym) -> String {
    Printer {
        style: Style::Latex,
    }
    .print(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    fn s() -> Sym {
        Sym::from(symbol::s())
    }

    #[test]
    fn test_polynomial_in_descending_order() {
        let e = Sym::int(5) + Sym::int(2) * s() + s().powi(2);
        assert_eq!(e.to_string(), "s^2 + 2*s + 5");
    }

    #[test]
    fn test_negative_terms_and_fractions() {
        let e = s() / Sym::int(2) - Sym::one();
        assert_eq!(e.to_string(), "s/2 - 1");
        let r = (s() + Sym::one()).recip();
        assert_eq!(r.to_string(), "1/(s + 1)");
    }

    #[test]
    fn test_generalized_functions() {
        let t = Sym::from(symbol::t());
        let e = Sym::exp(-t.clone()) * Sym::heaviside(t);
        assert_eq!(e.to_string(), "exp(-t)*u(t)");
    }

    #[test]
    fn test_imaginary_unit() {
        let omega = Sym::from(symbol::omega());
        assert_eq!((Sym::i() * omega.clone()).to_string(), "j*omega");
        assert_eq!(pretty(&(Sym::i() * omega)), "ⅉ⋅ω");
    }

    #[test]
    fn test_latex() {
        let e = (s() + Sym::one()).recip();
        assert_eq!(latex(&e), "\\frac{1}{s + 1}");
        assert_eq!(latex(&s().powi(2)), "s^{2}");
    }

    #[test]
    fn test_pretty_superscript() {
        assert_eq!(pretty(&s().powi(3)), "s³");
    }
}
