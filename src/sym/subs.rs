//! Substitution.

use super::node::{Node, Sym};
use super::symbol::Symbol;

/// Replace every free occurrence of `var` by `value`.
pub fn subs(x: &Sym, var: &Symbol, value: &Sym) -> Sym {
    if !x.has_symbol(var) {
        return x.clone();
    }
    match x.node() {
        Node::Symbol(s) if s == var => value.clone(),
        Node::Integral {
            integrand,
            var: bound,
            lower,
            upper,
        } if bound == var => Sym::integral(
            integrand.clone(),
            bound.clone(),
            subs(lower, var, value),
            subs(upper, var, value),
        ),
        _ => x.map_args(|a| subs(a, var, value)),
    }
}

/// Apply several substitutions in order.
pub fn subs_many(x: &Sym, pairs: &[(Symbol, Sym)]) -> Sym {
    pairs
        .iter()
        .fold(x.clone(), |acc, (var, value)| subs(&acc, var, value))
}

/// Replace exact occurrences of the subtree `from` by `to`.
pub fn xreplace(x: &Sym, from: &Sym, to: &Sym) -> Sym {
    if x == from {
        return to.clone();
    }
    if !x.contains(from) {
        return x.clone();
    }
    x.map_args(|a| xreplace(a, from, to))
}

/// Replace an arbitrary expression `old` by `new`: symbols by substitution,
/// anything else structurally.
pub fn replace(x: &Sym, old: &Sym, new: &Sym) -> Sym {
    match old.as_symbol() {
        Some(var) => subs(x, var, new),
        None => xreplace(x, old, new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    #[test]
    fn test_subs_recanonicalizes() {
        let x = symbol::symbol("x");
        let e = Sym::from(&x) * Sym::int(2) + Sym::one();
        assert_eq!(subs(&e, &x, &Sym::int(3)), Sym::int(7));
    }

    #[test]
    fn test_bound_variable_untouched() {
        let tau = symbol::tau();
        let t = symbol::t();
        let integrand = Sym::from(&tau) * Sym::from(&t);
        let e = Sym::integral(integrand.clone(), tau.clone(), Sym::zero(), Sym::from(&t));
        let r = subs(&e, &tau, &Sym::int(5));
        assert_eq!(r, e);
    }
}
