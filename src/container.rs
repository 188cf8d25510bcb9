//! Containers of expressions.
//!
//! These exist so that substitution, simplification and evaluation can be
//! applied in bulk. A dictionary substitutes into both keys and values but
//! only simplifies its values.

use std::fmt;
use std::ops::Index;

use crate::error::{Result, SymCircuitError};
use crate::expr::{Expr, Kind};
use crate::numeric::Values;
use crate::sym::{rational, Sym};

macro_rules! expr_sequence {
    ($name:ident, $open:expr, $close:expr) => {
        #[derive(Clone, Default)]
        pub struct $name(Vec<Expr>);

        impl $name {
            pub fn new(items: Vec<Expr>) -> Self {
                Self(items)
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn get(&self, index: usize) -> Option<&Expr> {
                self.0.get(index)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
                self.0.iter()
            }

            pub fn into_vec(self) -> Vec<Expr> {
                self.0
            }

            /// Apply a fallible map to every element.
            pub fn try_map(&self, f: impl FnMut(&Expr) -> Result<Expr>) -> Result<Self> {
                Ok(Self(self.0.iter().map(f).collect::<Result<Vec<_>>>()?))
            }

            pub fn subs(&self, old: &Expr, new: &Expr) -> Result<Self> {
                self.try_map(|e| e.subs(old, new))
            }

            pub fn subs_map(&self, pairs: &[(Expr, Expr)]) -> Result<Self> {
                self.try_map(|e| e.subs_map(pairs))
            }

            pub fn simplify(&self) -> Self {
                Self(self.0.iter().map(Expr::simplify).collect())
            }

            /// Transform (or substitute into) every element.
            pub fn transform(&self, arg: &Expr) -> Result<Self> {
                self.try_map(|e| e.transform(arg))
            }

            /// Evaluate every element at `arg`.
            pub fn evaluate_at(&self, arg: f64) -> Result<Values> {
                let values = self
                    .0
                    .iter()
                    .map(|e| e.evaluate_at(arg).map(|v| v.to_complex()))
                    .collect::<Result<Vec<_>>>()?;
                if values.iter().all(|c| c.im == 0.0) {
                    Ok(Values::Real(values.iter().map(|c| c.re).collect()))
                } else {
                    Ok(Values::Complex(values))
                }
            }
        }

        impl From<Vec<Expr>> for $name {
            fn from(items: Vec<Expr>) -> Self {
                Self(items)
            }
        }

        impl FromIterator<Expr> for $name {
            fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a Expr;
            type IntoIter = std::slice::Iter<'a, Expr>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = Expr;

            fn index(&self, index: usize) -> &Expr {
                &self.0[index]
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.len() == other.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", $open)?;
                for (i, e) in self.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "{}", $close)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

expr_sequence!(ExprList, "[", "]");
expr_sequence!(ExprTuple, "(", ")");

impl ExprList {
    pub fn push(&mut self, e: Expr) {
        self.0.push(e);
    }
}

impl Expr {
    /// Substitute each element of `args` in turn, keeping the list shape.
    pub fn call_list(&self, args: &ExprList) -> Result<ExprList> {
        args.iter().map(|a| self.transform(a)).collect()
    }

    /// Substitute each element of `args` in turn, keeping the tuple shape.
    pub fn call_tuple(&self, args: &ExprTuple) -> Result<ExprTuple> {
        args.iter().map(|a| self.transform(a)).collect()
    }
}

/// Ordered mapping between expressions.
#[derive(Clone, Default)]
pub struct ExprDict(Vec<(Expr, Expr)>);

impl ExprDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace the value for `key`. Keys match by structure.
    pub fn insert(&mut self, key: Expr, value: Expr) {
        match self.0.iter_mut().find(|(k, _)| k.sym() == key.sym()) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &Expr) -> Option<&Expr> {
        self.0.iter().find(|(k, _)| k.sym() == key.sym()).map(|(_, v)| v)
    }

    /// Look up by the text of a key, e.g. a node name.
    pub fn get_by_name(&self, name: &str) -> Option<&Expr> {
        self.0.iter().find(|(k, _)| k.to_string() == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Expr> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Expr> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// Substitute into keys and values.
    pub fn subs(&self, old: &Expr, new: &Expr) -> Result<Self> {
        let entries = self
            .0
            .iter()
            .map(|(k, v)| Ok((k.subs(old, new)?, v.subs(old, new)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(entries))
    }

    /// Simplify the values; keys are left alone.
    pub fn simplify(&self) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), v.simplify())).collect())
    }
}

impl FromIterator<(Expr, Expr)> for ExprDict {
    fn from_iter<I: IntoIterator<Item = (Expr, Expr)>>(iter: I) -> Self {
        let mut dict = ExprDict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

impl fmt::Display for ExprDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for ExprDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Dense row-major matrix of expressions.
#[derive(Clone)]
pub struct ExprMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Expr>,
}

impl ExprMatrix {
    /// A `rows` x `cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Expr::zero(); rows * cols],
        }
    }

    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(SymCircuitError::invalid_argument("matrix", "ragged rows"));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &Expr {
        &self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Expr) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> ExprList {
        self.data[row * self.cols..(row + 1) * self.cols].iter().cloned().collect()
    }

    pub fn subs(&self, old: &Expr, new: &Expr) -> Result<Self> {
        let data = self.data.iter().map(|e| e.subs(old, new)).collect::<Result<Vec<_>>>()?;
        Ok(Self { data, ..self.clone() })
    }

    pub fn simplify(&self) -> Self {
        Self {
            data: self.data.iter().map(Expr::simplify).collect(),
            ..self.clone()
        }
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, x: &ExprList) -> Result<ExprList> {
        if x.len() != self.cols {
            return Err(SymCircuitError::invalid_argument("matrix product", "dimension mismatch"));
        }
        (0..self.rows)
            .map(|i| {
                let mut acc: Option<Expr> = None;
                for j in 0..self.cols {
                    let term = self.get(i, j).multiply(&x[j])?;
                    acc = Some(match acc {
                        Some(a) => a.add(&term)?,
                        None => term,
                    });
                }
                Ok(acc.unwrap_or_else(Expr::zero))
            })
            .collect()
    }

    fn syms(&self) -> Vec<Vec<Sym>> {
        (0..self.rows)
            .map(|i| (0..self.cols).map(|j| self.get(i, j).sym().clone()).collect())
            .collect()
    }

    /// Determinant by fraction-free elimination.
    pub fn det(&self) -> Result<Expr> {
        if self.rows != self.cols {
            return Err(SymCircuitError::invalid_argument("determinant", "matrix is not square"));
        }
        let mut a = self.syms();
        let n = self.rows;
        let mut sign = Sym::one();
        let mut prev = Sym::one();
        for k in 0..n {
            let Some(p) = (k..n).find(|&i| !rational::is_zero(&a[i][k])) else {
                return Ok(Expr::zero());
            };
            if p != k {
                a.swap(p, k);
                sign = -sign;
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let num = &a[i][j] * &a[k][k] - &a[i][k] * &a[k][j];
                    a[i][j] = rational::cancel(&(num / &prev));
                }
            }
            prev = a[k][k].clone();
        }
        let d = if n == 0 { Sym::one() } else { sign * &a[n - 1][n - 1] };
        Ok(self
            .data
            .first()
            .map_or_else(Expr::one, |e| e.rewrap_fresh(rational::cancel(&d))))
    }

    /// Solve `A x = b` by Gaussian elimination. The solution takes the kind
    /// of `b[i] / A[i][i]`, e.g. voltages for admittances and currents.
    pub fn solve(&self, b: &ExprList) -> Result<ExprList> {
        if self.rows != self.cols || b.len() != self.rows {
            return Err(SymCircuitError::invalid_argument("solve", "dimension mismatch"));
        }
        let x = solve_syms(self.syms(), b.iter().map(|e| e.sym().clone()).collect())?;
        let kind = self.solution_kind(b);
        Ok(x.into_iter()
            .map(|xi| Expr::from_parts(xi, kind, Default::default()))
            .collect())
    }

    fn solution_kind(&self, b: &ExprList) -> Kind {
        (0..self.rows)
            .find_map(|i| b[i].divide(self.get(i, i)).ok().map(|e| e.kind()))
            .unwrap_or(Kind::GENERIC)
    }
}

/// Gaussian elimination with partial (first nonzero) pivoting.
pub(crate) fn solve_syms(mut a: Vec<Vec<Sym>>, mut b: Vec<Sym>) -> Result<Vec<Sym>> {
    let n = b.len();
    for k in 0..n {
        let p = (k..n)
            .find(|&i| !rational::is_zero(&a[i][k]))
            .ok_or(SymCircuitError::SingularSystem)?;
        a.swap(p, k);
        b.swap(p, k);
        for i in k + 1..n {
            if rational::is_zero(&a[i][k]) {
                continue;
            }
            let factor = rational::cancel(&(&a[i][k] / &a[k][k]));
            for j in k..n {
                let v = &a[i][j] - &factor * &a[k][j];
                a[i][j] = rational::cancel(&v);
            }
            let v = &b[i] - &factor * &b[k];
            b[i] = rational::cancel(&v);
        }
    }
    let mut x = vec![Sym::zero(); n];
    for i in (0..n).rev() {
        let mut acc = b[i].clone();
        for j in i + 1..n {
            acc = acc - &a[i][j] * &x[j];
        }
        x[i] = rational::cancel(&(acc / &a[i][i]));
    }
    Ok(x)
}

impl Index<(usize, usize)> for ExprMatrix {
    type Output = Expr;

    fn index(&self, (row, col): (usize, usize)) -> &Expr {
        self.get(row, col)
    }
}

impl fmt::Display for ExprMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.row(i))?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for ExprMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{expr, sexpr, texpr, Domain};

    #[test]
    fn test_list_substitution_keeps_shape() {
        let list = ExprList::new(vec![texpr("a * t").unwrap(), texpr("t + 1").unwrap()]);
        let out = list.subs(&expr("a").unwrap(), &expr("2").unwrap()).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].equals(texpr("2 * t").unwrap()));
    }

    #[test]
    fn test_call_list_and_tuple() {
        let h = sexpr("1 / (s + 1)").unwrap();
        let args = ExprList::new(vec![expr("0").unwrap(), expr("1").unwrap()]);
        let out = h.call_list(&args).unwrap();
        assert!(out[0].equals(1));
        assert!(out[1].equals(expr("1/2").unwrap()));

        let tuple = ExprTuple::new(vec![expr("3").unwrap()]);
        let out = h.call_tuple(&tuple).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].equals(expr("1/4").unwrap()));
    }

    #[test]
    fn test_dict_substitutes_keys_but_simplifies_values_only() {
        let mut d = ExprDict::new();
        d.insert(expr("a + a").unwrap(), expr("b + b").unwrap());
        let simplified = d.simplify();
        let (k, v) = simplified.iter().next().unwrap();
        assert!(v.equals(expr("2 * b").unwrap()));
        assert_eq!(k.sym(), expr("a + a").unwrap().sym());

        let substituted = d.subs(&expr("a").unwrap(), &expr("1").unwrap()).unwrap();
        assert!(substituted.keys().next().unwrap().equals(2));
    }

    #[test]
    fn test_matrix_solve() {
        let a = ExprMatrix::from_rows(vec![
            vec![expr("2").unwrap(), expr("1").unwrap()],
            vec![expr("1").unwrap(), expr("3").unwrap()],
        ])
        .unwrap();
        let b = ExprList::new(vec![expr("3").unwrap(), expr("5").unwrap()]);
        let x = a.solve(&b).unwrap();
        assert!(x[0].equals(expr("4/5").unwrap()));
        assert!(x[1].equals(expr("7/5").unwrap()));
        assert!(a.det().unwrap().equals(5));
    }

    #[test]
    fn test_singular_matrix() {
        let a = ExprMatrix::from_rows(vec![
            vec![expr("1").unwrap(), expr("2").unwrap()],
            vec![expr("2").unwrap(), expr("4").unwrap()],
        ])
        .unwrap();
        let b = ExprList::new(vec![expr("1").unwrap(), expr("1").unwrap()]);
        assert!(matches!(a.solve(&b), Err(SymCircuitError::SingularSystem)));
        assert!(a.det().unwrap().is_zero());
    }

    #[test]
    fn test_symbolic_solve_keeps_domain() {
        let a = ExprMatrix::from_rows(vec![vec![sexpr("s + 1").unwrap()]]).unwrap();
        let b = ExprList::new(vec![sexpr("1").unwrap()]);
        let x = a.solve(&b).unwrap();
        assert_eq!(x[0].domain(), Domain::Laplace);
        assert!(x[0].equals(sexpr("1 / (s + 1)").unwrap()));
    }
}
