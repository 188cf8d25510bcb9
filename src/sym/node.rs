//! Expression tree and canonicalizing constructors.
//!
//! A [`Sym`] is an immutable, reference-counted node. All constructors
//! canonicalize their result so that structural equality is a cheap and
//! reasonably strong equivalence:
//!
//! - sums are flattened, numbers summed and like terms collected
//! - products are flattened, numbers multiplied and equal bases merged
//! - powers of numbers are evaluated exactly where possible
//! - arguments of sums and products are kept sorted

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::complex;
use super::func::Func;
use super::number::Number;
use super::symbol::Symbol;

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    /// Imaginary unit (printed as `j`)
    I,
    /// Positive infinity
    Infinity,
    NaN,
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Number(Number),
    Constant(Constant),
    Symbol(Symbol),
    Add(Vec<Sym>),
    Mul(Vec<Sym>),
    Pow(Sym, Sym),
    Apply(Func, Vec<Sym>),
    /// Unevaluated definite integral
    Integral {
        integrand: Sym,
        var: Symbol,
        lower: Sym,
        upper: Sym,
    },
    /// Unevaluated derivative
    Derivative { expr: Sym, var: Symbol, order: u32 },
}

/// A symbolic expression.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sym(Arc<Node>);

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Symbol> for Sym {
    fn from(symbol: Symbol) -> Self {
        Sym::from_node(Node::Symbol(symbol))
    }
}

impl From<&Symbol> for Sym {
    fn from(symbol: &Symbol) -> Self {
        Sym::from_node(Node::Symbol(symbol.clone()))
    }
}

impl From<i64> for Sym {
    fn from(value: i64) -> Self {
        Sym::int(value)
    }
}

impl From<Number> for Sym {
    fn from(value: Number) -> Self {
        Sym::number(value)
    }
}

impl Sym {
    /// Wrap a node without canonicalization.
    pub(crate) fn from_node(node: Node) -> Sym {
        Sym(Arc::new(node))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    // ============ Atoms ============

    pub fn number(value: Number) -> Sym {
        if let Number::Float(f) = value {
            if f.is_nan() {
                return Sym::nan();
            }
            if f.is_infinite() {
                return if f > 0.0 { Sym::oo() } else { -Sym::oo() };
            }
        }
        Sym::from_node(Node::Number(value))
    }

    pub fn int(value: i64) -> Sym {
        Sym::number(Number::from_i64(value))
    }

    pub fn integer(value: BigInt) -> Sym {
        Sym::number(Number::from_bigint(value))
    }

    /// Exact p/q; NaN when q is zero.
    pub fn rational(p: i64, q: i64) -> Sym {
        match Number::rational(p, q) {
            Some(n) => Sym::number(n),
            None => Sym::nan(),
        }
    }

    pub fn float(value: f64) -> Sym {
        Sym::number(Number::from_f64(value))
    }

    pub fn zero() -> Sym {
        Sym::int(0)
    }

    pub fn one() -> Sym {
        Sym::int(1)
    }

    pub fn minus_one() -> Sym {
        Sym::int(-1)
    }

    pub fn half() -> Sym {
        Sym::rational(1, 2)
    }

    pub fn pi() -> Sym {
        Sym::from_node(Node::Constant(Constant::Pi))
    }

    pub fn e() -> Sym {
        Sym::from_node(Node::Constant(Constant::E))
    }

    pub fn i() -> Sym {
        Sym::from_node(Node::Constant(Constant::I))
    }

    pub fn oo() -> Sym {
        Sym::from_node(Node::Constant(Constant::Infinity))
    }

    pub fn nan() -> Sym {
        Sym::from_node(Node::Constant(Constant::NaN))
    }

    /// A user symbol with default flags.
    pub fn symbol(name: &str) -> Sym {
        Sym::from(super::symbol::symbol(name))
    }

    /// Unevaluated definite integral.
    pub fn integral(integrand: Sym, var: Symbol, lower: Sym, upper: Sym) -> Sym {
        if integrand.is_zero() {
            return Sym::zero();
        }
        Sym::from_node(Node::Integral {
            integrand,
            var,
            lower,
            upper,
        })
    }

    /// Unevaluated derivative.
    pub fn derivative(expr: Sym, var: Symbol, order: u32) -> Sym {
        if order == 0 {
            return expr;
        }
        if !expr.has_symbol(&var) {
            return Sym::zero();
        }
        if let Node::Derivative {
            expr: inner,
            var: v,
            order: k,
        } = expr.node()
        {
            if *v == var {
                return Sym::derivative(inner.clone(), var, order + k);
            }
        }
        Sym::from_node(Node::Derivative { expr, var, order })
    }

    // ============ Queries ============

    pub fn as_number(&self) -> Option<&Number> {
        match self.node() {
            Node::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self.node(), Node::Number(_))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.node(), Node::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self.node(), Node::Number(n) if n.is_one())
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.node(), Node::Number(n) if n.is_integer())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(|n| n.as_i64())
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.node(), Node::Constant(Constant::NaN))
    }

    pub fn is_imaginary_unit(&self) -> bool {
        matches!(self.node(), Node::Constant(Constant::I))
    }

    /// True if the expression contains infinity or NaN anywhere.
    pub fn is_infinite(&self) -> bool {
        self.any(&|x| {
            matches!(
                x.node(),
                Node::Constant(Constant::Infinity) | Node::Constant(Constant::NaN)
            )
        })
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            Node::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_apply(&self) -> Option<(&Func, &[Sym])> {
        match self.node() {
            Node::Apply(func, args) => Some((func, args.as_slice())),
            _ => None,
        }
    }

    /// Terms of a sum (or the expression itself).
    pub fn terms(&self) -> Vec<Sym> {
        match self.node() {
            Node::Add(ts) => ts.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Factors of a product (or the expression itself).
    pub fn factors(&self) -> Vec<Sym> {
        match self.node() {
            Node::Mul(fs) => fs.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Direct children.
    pub fn args(&self) -> Vec<Sym> {
        match self.node() {
            Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => Vec::new(),
            Node::Add(xs) | Node::Mul(xs) | Node::Apply(_, xs) => xs.clone(),
            Node::Pow(b, e) => vec![b.clone(), e.clone()],
            Node::Integral {
                integrand,
                lower,
                upper,
                ..
            } => vec![integrand.clone(), lower.clone(), upper.clone()],
            Node::Derivative { expr, .. } => vec![expr.clone()],
        }
    }

    /// Split into numeric coefficient and the remaining product.
    pub fn as_coeff_mul(&self) -> (Number, Sym) {
        match self.node() {
            Node::Number(n) => (n.clone(), Sym::one()),
            Node::Mul(fs) => match fs.first().map(|f| f.node()) {
                Some(Node::Number(n)) => {
                    let rest = if fs.len() == 2 {
                        fs[1].clone()
                    } else {
                        Sym::from_node(Node::Mul(fs[1..].to_vec()))
                    };
                    (n.clone(), rest)
                }
                _ => (Number::one(), self.clone()),
            },
            _ => (Number::one(), self.clone()),
        }
    }

    /// Split into base and exponent.
    pub fn as_base_exp(&self) -> (Sym, Sym) {
        match self.node() {
            Node::Pow(b, e) => (b.clone(), e.clone()),
            _ => (self.clone(), Sym::one()),
        }
    }

    /// True if `pred` holds for this node or any descendant.
    pub fn any(&self, pred: &dyn Fn(&Sym) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        self.args().iter().any(|a| a.any(pred))
    }

    /// True if `needle` occurs as a subtree.
    pub fn contains(&self, needle: &Sym) -> bool {
        self.any(&|x| x == needle)
    }

    pub fn has_func(&self, pred: &dyn Fn(&Func) -> bool) -> bool {
        self.any(&|x| matches!(x.node(), Node::Apply(f, _) if pred(f)))
    }

    pub fn has_integral(&self) -> bool {
        self.any(&|x| matches!(x.node(), Node::Integral { .. }))
    }

    /// Free symbols; integration variables are bound.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self.node() {
            Node::Symbol(s) => {
                out.insert(s.clone());
            }
            Node::Integral {
                integrand,
                var,
                lower,
                upper,
            } => {
                let mut inner = BTreeSet::new();
                integrand.collect_symbols(&mut inner);
                inner.remove(var);
                out.extend(inner);
                lower.collect_symbols(out);
                upper.collect_symbols(out);
            }
            _ => {
                for a in self.args() {
                    a.collect_symbols(out);
                }
            }
        }
    }

    pub fn has_symbol(&self, symbol: &Symbol) -> bool {
        self.free_symbols().contains(symbol)
    }

    /// True if any free symbol has the given name.
    pub fn has_symbol_named(&self, name: &str) -> bool {
        self.free_symbols().iter().any(|s| s.name() == name)
    }

    /// Rebuild this node with transformed children.
    pub fn map_args(&self, mut f: impl FnMut(&Sym) -> Sym) -> Sym {
        match self.node() {
            Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => self.clone(),
            Node::Add(ts) => Sym::sum(ts.iter().map(&mut f).collect::<Vec<_>>()),
            Node::Mul(fs) => Sym::product(fs.iter().map(&mut f).collect::<Vec<_>>()),
            Node::Pow(b, e) => {
                let b = f(b);
                let e = f(e);
                Sym::pow(b, e)
            }
            Node::Apply(func, args) => {
                let args = args.iter().map(&mut f).collect();
                Sym::apply(func.clone(), args)
            }
            Node::Integral {
                integrand,
                var,
                lower,
                upper,
            } => {
                let integrand = f(integrand);
                let lower = f(lower);
                let upper = f(upper);
                Sym::integral(integrand, var.clone(), lower, upper)
            }
            Node::Derivative { expr, var, order } => Sym::derivative(f(expr), var.clone(), *order),
        }
    }

    // ============ Canonical constructors ============

    /// Canonical sum.
    pub fn sum(terms: impl IntoIterator<Item = Sym>) -> Sym {
        let mut stack: Vec<Sym> = terms.into_iter().collect();
        let mut number = Number::zero();
        let mut collected: BTreeMap<Sym, Number> = BTreeMap::new();
        let mut nan = false;

        while let Some(term) = stack.pop() {
            match term.node() {
                Node::Add(inner) => stack.extend(inner.iter().cloned()),
                Node::Number(n) => number = number + n.clone(),
                Node::Constant(Constant::NaN) => nan = true,
                _ => {
                    let (c, rest) = term.as_coeff_mul();
                    let entry = collected.entry(rest).or_insert_with(Number::zero);
                    *entry = entry.clone() + c;
                }
            }
        }

        if nan || number.is_nan() {
            return Sym::nan();
        }
        if let Some(c) = collected.get(&Sym::oo()) {
            return if c.is_positive() {
                Sym::oo()
            } else if c.is_negative() {
                -Sym::oo()
            } else {
                Sym::nan()
            };
        }

        let mut out = Vec::with_capacity(collected.len() + 1);
        if !number.is_zero() {
            out.push(Sym::number(number));
        }
        for (rest, c) in collected {
            if c.is_zero() {
                continue;
            }
            out.push(coeff_times(c, rest));
        }
        match out.len() {
            0 => Sym::zero(),
            1 => out.remove(0),
            _ => {
                out.sort();
                Sym::from_node(Node::Add(out))
            }
        }
    }

    /// Canonical product.
    pub fn product(factors: impl IntoIterator<Item = Sym>) -> Sym {
        let mut pending: Vec<Sym> = factors.into_iter().collect();
        let mut coeff = Number::one();
        let mut out: Vec<Sym> = Vec::new();

        for round in 0..4 {
            let mut powers: BTreeMap<Sym, Vec<Sym>> = BTreeMap::new();
            let mut exp_args = Vec::new();
            let mut stack = std::mem::take(&mut pending);
            while let Some(factor) = stack.pop() {
                match factor.node() {
                    Node::Mul(inner) => stack.extend(inner.iter().cloned()),
                    Node::Number(n) => coeff = coeff * n.clone(),
                    Node::Apply(Func::Exp, args) if args.len() == 1 => exp_args.push(args[0].clone()),
                    _ => {
                        let (b, e) = factor.as_base_exp();
                        powers.entry(b).or_default().push(e);
                    }
                }
            }

            let mut again = false;
            out.clear();
            if !exp_args.is_empty() {
                let e = Sym::exp(Sym::sum(exp_args));
                if !matches!(e.node(), Node::Apply(Func::Exp, _)) {
                    again = true;
                }
                out.push(e);
            }
            for (base, exps) in powers {
                let p = Sym::pow(base, Sym::sum(exps));
                if matches!(
                    p.node(),
                    Node::Number(_) | Node::Mul(_) | Node::Apply(Func::Exp, _)
                ) {
                    again = true;
                }
                out.push(p);
            }
            if !again || round == 3 {
                break;
            }
            pending = std::mem::take(&mut out);
        }

        // Absorb anything left unflattened by the round limit.
        let mut factors = Vec::with_capacity(out.len());
        for f in out {
            match f.node() {
                Node::Number(n) => coeff = coeff * n.clone(),
                Node::Mul(inner) => factors.extend(inner.iter().cloned()),
                _ => factors.push(f),
            }
        }

        if coeff.is_nan() || factors.iter().any(|f| f.is_nan()) {
            return Sym::nan();
        }
        let has_inf = factors.iter().any(|f| *f == Sym::oo());
        if coeff.is_zero() {
            return if has_inf { Sym::nan() } else { Sym::zero() };
        }
        if has_inf {
            coeff = if coeff.is_negative() {
                Number::from_i64(-1)
            } else {
                Number::one()
            };
        }
        factors.retain(|f| !f.is_one());

        if !coeff.is_one() && factors.len() == 1 {
            if let Node::Add(terms) = factors[0].node() {
                let c = Sym::number(coeff);
                return Sym::sum(
                    terms
                        .iter()
                        .map(|t| Sym::product([c.clone(), t.clone()]))
                        .collect::<Vec<_>>(),
                );
            }
        }

        if !coeff.is_one() {
            factors.push(Sym::number(coeff));
        }
        match factors.len() {
            0 => Sym::one(),
            1 => factors.remove(0),
            _ => {
                factors.sort();
                Sym::from_node(Node::Mul(factors))
            }
        }
    }

    /// Canonical power.
    pub fn pow(base: Sym, exp: Sym) -> Sym {
        if exp.is_zero() {
            return Sym::one();
        }
        if exp.is_one() {
            return base;
        }
        if base.is_one() {
            return Sym::one();
        }
        if base.is_nan() || exp.is_nan() {
            return Sym::nan();
        }
        if let Node::Constant(Constant::E) = base.node() {
            return Sym::exp(exp);
        }

        if let Node::Number(e) = exp.node() {
            if base.is_zero() {
                return if e.is_positive() { Sym::zero() } else { Sym::oo() };
            }
            match base.node() {
                Node::Number(b) => return number_pow(b, e),
                Node::Constant(Constant::I) => {
                    if let Some(k) = e.as_integer() {
                        return i_power(&k);
                    }
                }
                Node::Constant(Constant::Infinity) => {
                    return if e.is_positive() { Sym::oo() } else { Sym::zero() };
                }
                Node::Pow(b2, e2) => {
                    if e.is_integer() || (complex::is_positive(b2) && complex::is_real(e2)) {
                        return Sym::pow(b2.clone(), Sym::product([e2.clone(), exp.clone()]));
                    }
                }
                Node::Mul(fs) => {
                    if e.is_integer() {
                        return Sym::product(
                            fs.iter()
                                .map(|f| Sym::pow(f.clone(), exp.clone()))
                                .collect::<Vec<_>>(),
                        );
                    }
                    let (pos, rest): (Vec<Sym>, Vec<Sym>) =
                        fs.iter().cloned().partition(complex::is_positive);
                    if !pos.is_empty() {
                        let mut out: Vec<Sym> = pos
                            .into_iter()
                            .map(|f| Sym::pow(f, exp.clone()))
                            .collect();
                        if !rest.is_empty() {
                            out.push(Sym::pow(Sym::product(rest), exp.clone()));
                        }
                        return Sym::product(out);
                    }
                }
                Node::Apply(Func::Exp, args) => {
                    if e.is_integer() || complex::is_real(&args[0]) {
                        return Sym::exp(Sym::product([args[0].clone(), exp.clone()]));
                    }
                }
                _ => {}
            }
        }
        Sym::from_node(Node::Pow(base, exp))
    }

    pub fn powi(&self, exponent: i64) -> Sym {
        Sym::pow(self.clone(), Sym::int(exponent))
    }

    pub fn sqrt(&self) -> Sym {
        Sym::pow(self.clone(), Sym::half())
    }

    pub fn recip(&self) -> Sym {
        Sym::pow(self.clone(), Sym::minus_one())
    }
}

/// `c * rest` where `rest` has no numeric coefficient.
fn coeff_times(c: Number, rest: Sym) -> Sym {
    if c.is_one() {
        return rest;
    }
    match rest.node() {
        Node::Mul(fs) => {
            let mut v = Vec::with_capacity(fs.len() + 1);
            v.push(Sym::number(c));
            v.extend(fs.iter().cloned());
            Sym::from_node(Node::Mul(v))
        }
        Node::Add(_) => Sym::product([Sym::number(c), rest]),
        _ if rest.is_one() => Sym::number(c),
        _ => Sym::from_node(Node::Mul(vec![Sym::number(c), rest])),
    }
}

/// Powers of the imaginary unit.
fn i_power(k: &BigInt) -> Sym {
    let r = k.mod_floor(&BigInt::from(4)).to_i64().unwrap_or(0);
    match r {
        0 => Sym::one(),
        1 => Sym::i(),
        2 => Sym::minus_one(),
        _ => Sym::from_node(Node::Mul(vec![Sym::minus_one(), Sym::i()])),
    }
}

fn number_pow(b: &Number, e: &Number) -> Sym {
    match (b, e) {
        (Number::Rational(br), Number::Rational(er)) => rational_pow(br, er),
        _ => {
            let bf = b.to_f64();
            let ef = e.to_f64();
            if bf >= 0.0 || ef.fract() == 0.0 {
                Sym::float(bf.powf(ef))
            } else {
                let mag = bf.abs().powf(ef);
                let angle = std::f64::consts::PI * ef;
                Sym::float(mag * angle.cos()) + Sym::float(mag * angle.sin()) * Sym::i()
            }
        }
    }
}

fn rational_pow(b: &BigRational, e: &BigRational) -> Sym {
    let raw = || {
        Sym::from_node(Node::Pow(
            Sym::number(Number::Rational(b.clone())),
            Sym::number(Number::Rational(e.clone())),
        ))
    };

    if e.is_integer() {
        return match e.to_integer().to_i32() {
            Some(k) if k.abs() <= 10_000 => Sym::number(Number::Rational(b.pow(k))),
            _ => raw(),
        };
    }

    let p = e.numer().clone();
    let q = e.denom().clone();
    if b.is_negative() {
        if q == BigInt::from(2) {
            return Sym::product([i_power(&p), rational_pow(&-b.clone(), e)]);
        }
        return raw();
    }

    let q_small = match q.to_u32() {
        Some(q) if q <= 64 => q,
        _ => return raw(),
    };
    let k = e.floor().to_integer();
    let r = match (&p - &k * &q).to_u32() {
        Some(r) => r,
        None => return raw(),
    };
    let k = match k.to_i32() {
        Some(k) if k.abs() <= 10_000 => k,
        _ => return raw(),
    };

    let bn = b.numer().clone();
    let bd = b.denom().clone();
    let m = num_traits::pow(bn, r as usize) * num_traits::pow(bd.clone(), (q_small - r) as usize);
    let (a, c) = extract_root(m, q_small);
    let coeff = b.pow(k) * BigRational::new(a, bd);
    if c.is_one() {
        return Sym::number(Number::Rational(coeff));
    }
    let root = Sym::from_node(Node::Pow(
        Sym::integer(c),
        Sym::number(Number::Rational(BigRational::new(
            BigInt::one(),
            BigInt::from(q_small),
        ))),
    ));
    if coeff.is_one() {
        return root;
    }
    let mut v = vec![Sym::number(Number::Rational(coeff)), root];
    v.sort();
    Sym::from_node(Node::Mul(v))
}

/// Write `m = a^q * c` pulling out q-th powers of small primes.
fn extract_root(m: BigInt, q: u32) -> (BigInt, BigInt) {
    let mut rest = m;
    let mut a = BigInt::one();
    let mut c = BigInt::one();
    let mut p = BigInt::from(2);
    let limit = BigInt::from(100_000);
    while &p * &p <= rest && p < limit {
        let mut count = 0u32;
        while (&rest % &p).is_zero() {
            rest /= &p;
            count += 1;
        }
        if count > 0 {
            a *= num_traits::pow(p.clone(), (count / q) as usize);
            c *= num_traits::pow(p.clone(), (count % q) as usize);
        }
        p += if p == BigInt::from(2) { 1 } else { 2 };
    }
    c *= rest;
    (a, c)
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $func:ident) => {
        impl std::ops::$trait<Sym> for Sym {
            type Output = Sym;
            fn $method(self, rhs: Sym) -> Sym {
                $func(self, rhs)
            }
        }

        impl<'a> std::ops::$trait<&'a Sym> for Sym {
            type Output = Sym;
            fn $method(self, rhs: &'a Sym) -> Sym {
                $func(self, rhs.clone())
            }
        }

        impl<'a> std::ops::$trait<Sym> for &'a Sym {
            type Output = Sym;
            fn $method(self, rhs: Sym) -> Sym {
                $func(self.clone(), rhs)
            }
        }

        impl<'a, 'b> std::ops::$trait<&'b Sym> for &'a Sym {
            type Output = Sym;
            fn $method(self, rhs: &'b Sym) -> Sym {
                $func(self.clone(), rhs.clone())
            }
        }
    };
}

fn sym_add(a: Sym, b: Sym) -> Sym {
    Sym::sum([a, b])
}

fn sym_sub(a: Sym, b: Sym) -> Sym {
    Sym::sum([a, -b])
}

fn sym_mul(a: Sym, b: Sym) -> Sym {
    Sym::product([a, b])
}

fn sym_div(a: Sym, b: Sym) -> Sym {
    Sym::product([a, b.recip()])
}

impl_binop!(Add, add, sym_add);
impl_binop!(Sub, sub, sym_sub);
impl_binop!(Mul, mul, sym_mul);
impl_binop!(Div, div, sym_div);

impl std::ops::Neg for Sym {
    type Output = Sym;
    fn neg(self) -> Sym {
        Sym::product([Sym::minus_one(), self])
    }
}

impl<'a> std::ops::Neg for &'a Sym {
    type Output = Sym;
    fn neg(self) -> Sym {
        Sym::product([Sym::minus_one(), self.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Sym {
        Sym::symbol("x")
    }

    #[test]
    fn test_collect_like_terms() {
        let e = x() + x() + Sym::int(3) - Sym::int(1);
        assert_eq!(e, Sym::int(2) * x() + Sym::int(2));
        assert_eq!(x() - x(), Sym::zero());
    }

    #[test]
    fn test_merge_powers() {
        let e = x() * x() / x();
        assert_eq!(e, x());
        assert_eq!(x().powi(2) * x().powi(-2), Sym::one());
    }

    #[test]
    fn test_number_distributes_over_sum() {
        let e = Sym::int(2) * (x() + Sym::one());
        assert_eq!(e, Sym::int(2) * x() + Sym::int(2));
    }

    #[test]
    fn test_exact_roots() {
        assert_eq!(Sym::int(4).sqrt(), Sym::int(2));
        assert_eq!(Sym::int(8).sqrt(), Sym::int(2) * Sym::int(2).sqrt());
        assert_eq!(Sym::int(-1).sqrt(), Sym::i());
        assert_eq!(Sym::int(2).sqrt() * Sym::int(2).sqrt(), Sym::int(2));
    }

    #[test]
    fn test_imaginary_unit_cycles() {
        assert_eq!(Sym::i() * Sym::i(), Sym::minus_one());
        assert_eq!(Sym::i().powi(4), Sym::one());
    }

    #[test]
    fn test_exp_merging() {
        let a = Sym::exp(x());
        let b = Sym::exp(-x());
        assert_eq!(a * b, Sym::one());
    }

    #[test]
    fn test_infinity_arithmetic() {
        assert_eq!(Sym::oo() + Sym::int(3), Sym::oo());
        assert!((Sym::oo() - Sym::oo()).is_nan());
        assert_eq!(Sym::one() / Sym::zero(), Sym::oo());
    }
}
