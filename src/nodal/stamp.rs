//! Symbolic nodal system assembly.

use crate::sym::{rational, Sym};

/// Nodal system `A y = b` with one row per non-ground node.
///
/// A row is either a KCL row, summing the currents leaving the node, or
/// a constraint row fixing the voltage across a voltage source.
#[derive(Debug)]
pub struct NodalSystem {
    /// System matrix A
    pub a: Vec<Vec<Sym>>,
    /// Source vector b
    pub b: Vec<Sym>,
    /// Rows taken by voltage-source constraints
    constraint: Vec<bool>,
    size: usize,
}

impl NodalSystem {
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![vec![Sym::zero(); size]; size],
            b: vec![Sym::zero(); size],
            constraint: vec![false; size],
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_constraint(&self, row: usize) -> bool {
        self.constraint[row]
    }

    /// Add to matrix element at (row, col) of a KCL row.
    fn add(&mut self, row: usize, col: usize, value: &Sym) {
        if !self.constraint[row] {
            self.a[row][col] = &self.a[row][col] + value;
        }
    }

    /// Add to source vector element of a KCL row.
    fn add_source(&mut self, row: usize, value: &Sym) {
        if !self.constraint[row] {
            self.b[row] = &self.b[row] + value;
        }
    }

    /// Stamp an admittance between two nodes.
    /// For an admittance Y between nodes n1 and n2:
    ///   A[n1,n1] += Y
    ///   A[n2,n2] += Y
    ///   A[n1,n2] -= Y
    ///   A[n2,n1] -= Y
    pub fn stamp_admittance(&mut self, n1: Option<usize>, n2: Option<usize>, y: &Sym) {
        let minus = -y;
        if let Some(i) = n1 {
            self.add(i, i, y);
        }
        if let Some(j) = n2 {
            self.add(j, j, y);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, &minus);
            self.add(j, i, &minus);
        }
    }

    /// Stamp a current source between two nodes.
    /// Current flows from n+ through the source to n-.
    pub fn stamp_current_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: &Sym) {
        // Current leaves n+ and enters n-
        if let Some(i) = n_pos {
            self.add_source(i, &-current);
        }
        if let Some(j) = n_neg {
            self.add_source(j, current);
        }
    }

    /// Turn `row` into the constraint V[n+] - V[n-] = E.
    pub fn stamp_voltage_source(
        &mut self,
        row: usize,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        voltage: &Sym,
    ) {
        self.constraint[row] = true;
        self.a[row] = vec![Sym::zero(); self.size];
        if let Some(i) = n_pos {
            self.a[row][i] = Sym::one();
        }
        if let Some(j) = n_neg {
            self.a[row][j] = Sym::minus_one();
        }
        self.b[row] = voltage.clone();
    }

    /// Cancel common factors in every entry.
    pub fn simplify(&mut self) {
        for row in &mut self.a {
            for entry in row.iter_mut() {
                *entry = rational::cancel(entry);
            }
        }
        for entry in &mut self.b {
            *entry = rational::cancel(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_admittance() {
        let mut sys = NodalSystem::new(2);
        let y = Sym::symbol("Y");
        sys.stamp_admittance(Some(0), Some(1), &y);
        sys.stamp_admittance(Some(1), None, &y);
        sys.simplify();
        assert_eq!(sys.a[0][0], y);
        assert_eq!(sys.a[0][1], -&y);
        assert_eq!(sys.a[1][1], rational::cancel(&(Sym::int(2) * &y)));
    }

    #[test]
    fn test_constraint_rows_ignore_stamps() {
        let mut sys = NodalSystem::new(2);
        sys.stamp_voltage_source(0, Some(0), None, &Sym::int(5));
        sys.stamp_admittance(Some(0), Some(1), &Sym::int(3));
        sys.stamp_current_source(Some(0), Some(1), &Sym::int(2));
        assert!(sys.is_constraint(0));
        assert_eq!(sys.a[0], vec![Sym::one(), Sym::zero()]);
        assert_eq!(sys.b[0], Sym::int(5));
        assert_eq!(sys.a[1][1], Sym::int(3));
        assert_eq!(sys.b[1], Sym::int(2));
    }
}
