//! Distribution of products over sums.

use super::node::{Node, Sym};

/// Largest integer power of a sum that is multiplied out.
const MAX_EXPAND_POWER: i64 = 30;

/// Fully expand products and integer powers of sums.
pub fn expand(x: &Sym) -> Sym {
    match x.node() {
        Node::Number(_) | Node::Constant(_) | Node::Symbol(_) => x.clone(),
        Node::Add(_) => x.map_args(expand),
        Node::Mul(fs) => {
            let parts: Vec<Sym> = fs.iter().map(expand).collect();
            distribute(&parts)
        }
        Node::Pow(b, e) => {
            let base = expand(b);
            match e.as_i64() {
                Some(k) if (2..=MAX_EXPAND_POWER).contains(&k) => {
                    if matches!(base.node(), Node::Add(_)) {
                        let parts = vec![base; k as usize];
                        distribute(&parts)
                    } else {
                        Sym::pow(base, e.clone())
                    }
                }
                Some(k) if (-MAX_EXPAND_POWER..=-2).contains(&k) => {
                    if matches!(base.node(), Node::Add(_)) {
                        let parts = vec![base; (-k) as usize];
                        distribute(&parts).recip()
                    } else {
                        Sym::pow(base, e.clone())
                    }
                }
                _ => Sym::pow(base, expand(e)),
            }
        }
        _ => x.map_args(expand),
    }
}

/// Multiply a list of already expanded factors term by term.
fn distribute(parts: &[Sym]) -> Sym {
    let mut acc: Vec<Sym> = vec![Sym::one()];
    for part in parts {
        let terms = part.terms();
        if terms.len() == 1 {
            for a in acc.iter_mut() {
                *a = &*a * &terms[0];
            }
            continue;
        }
        let mut next = Vec::with_capacity(acc.len() * terms.len());
        for a in &acc {
            for t in &terms {
                next.push(a * t);
            }
        }
        // Collect like terms early to keep intermediate sums small.
        acc = Sym::sum(next).terms();
    }
    Sym::sum(acc)
}

/// Expand only the top-level product, leaving function arguments untouched.
pub fn expand_mul(x: &Sym) -> Sym {
    match x.node() {
        Node::Mul(fs) => distribute(fs),
        Node::Add(_) => x.map_args(expand_mul),
        _ => x.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_binomial() {
        let x = Sym::symbol("x");
        let e = expand(&(x.clone() + Sym::one()).powi(2));
        assert_eq!(
            e,
            x.powi(2) + Sym::int(2) * x.clone() + Sym::one()
        );
    }

    #[test]
    fn test_expand_cancels() {
        let x = Sym::symbol("x");
        let y = Sym::symbol("y");
        let e = (x.clone() + y.clone()) * (x.clone() - y.clone()) - x.powi(2) + y.powi(2);
        assert!(expand(&e).is_zero());
    }
}
