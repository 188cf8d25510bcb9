//! Nodal analysis.
//!
//! One equation per non-ground node, in terms of the node voltages
//! `v<prefix><node>(t)` (or `V<prefix><node>(s)` in the Laplace domain):
//!
//! - a node touching a voltage source is fixed by that source,
//!   `v[n+] - v[n-] = V`;
//! - any other node sums the currents leaving it through its elements
//!   (Kirchhoff's current law).
//!
//! In the Laplace domain the equations are linear and are assembled into
//! the matrix form `A y = b`:
//!
//! ```text
//! [ Y11 Y12 ... ] [ V1 ]   [ I1 ]
//! [ 1   -1  ... ] [ V2 ] = [ E  ]
//! [ ...         ] [ .. ]   [ .. ]
//! ```
//!
//! which can be solved for the node voltages. Time-domain equations may
//! contain derivatives and integrals and are only available as equations.

mod stamp;

pub use stamp::NodalSystem;

use std::fmt;

use crate::circuit::{Circuit, ComponentId, NodeId};
use crate::components::Component;
use crate::container::{solve_syms, ExprDict, ExprList, ExprMatrix};
use crate::error::{Result, SymCircuitError};
use crate::expr::{Assumptions, Domain, Expr, Kind, Quantity};
use crate::network::OnePort;
use crate::sym::{rational, symbol, Sym};

/// A nodal equation `lhs = rhs`.
#[derive(Debug, Clone)]
pub struct NodalEquation {
    /// Node the equation belongs to
    pub node: String,
    pub lhs: Expr,
    pub rhs: Expr,
}

impl fmt::Display for NodalEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// Nodal analysis of a circuit in the time or Laplace domain.
pub struct NodalAnalysis<'a> {
    circuit: &'a Circuit,
    domain: Domain,
    /// Voltage source fixing each node, `None` for KCL nodes
    sources: Vec<Option<ComponentId>>,
    unknowns: Vec<Sym>,
    assumptions: Assumptions,
}

impl<'a> NodalAnalysis<'a> {
    /// Set up nodal analysis in `domain`, which must be the time or the
    /// Laplace domain.
    pub fn new(circuit: &'a Circuit, domain: Domain) -> Result<Self> {
        if !matches!(domain, Domain::Time | Domain::Laplace) {
            return Err(SymCircuitError::invalid_argument(
                "nodal analysis",
                format!("unsupported domain {:?}", domain),
            ));
        }

        let (var, initial) = if domain == Domain::Time {
            (symbol::t(), "v")
        } else {
            (symbol::s(), "V")
        };
        let unknowns = circuit
            .nodes()
            .map(|node| {
                let name = format!("{}{}{}", initial, circuit.node_prefix, circuit.node_name(node));
                Sym::undefined(&name, vec![Sym::from(&var)])
            })
            .collect();

        let whole = OnePort::parallel(circuit.components.iter().map(Component::oneport));
        let analysis = NodalAnalysis {
            circuit,
            domain,
            sources: assign_sources(circuit)?,
            unknowns,
            assumptions: whole.signal_class().assumptions(),
        };
        log::debug!(
            "nodal analysis of {} nodes in the {:?} domain",
            analysis.unknowns.len(),
            domain
        );
        Ok(analysis)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Node-voltage unknowns, one per non-ground node.
    pub fn unknowns(&self) -> ExprList {
        self.unknowns
            .iter()
            .map(|u| self.wrap(u.clone(), Quantity::Voltage))
            .collect()
    }

    /// Voltage of `node` in terms of the unknowns; zero for ground.
    fn node_voltage(&self, node: NodeId) -> Sym {
        node.row().map_or_else(Sym::zero, |row| self.unknowns[row].clone())
    }

    fn wrap(&self, sym: Sym, quantity: Quantity) -> Expr {
        Expr::from_parts(sym, Kind::new(self.domain, quantity), Assumptions::new())
    }

    /// Assemble the Laplace-domain system `A y = b`.
    pub fn system(&self) -> Result<NodalSystem> {
        if self.domain != Domain::Laplace {
            return Err(SymCircuitError::invalid_argument(
                "nodal matrix",
                "matrix form is only available in the Laplace domain",
            ));
        }
        let mut sys = NodalSystem::new(self.unknowns.len());
        for (row, source) in self.sources.iter().enumerate() {
            if let Some(id) = source {
                if let Component::VoltageSource(vs) = &self.circuit[*id] {
                    sys.stamp_voltage_source(row, vs.nodes[0].row(), vs.nodes[1].row(), vs.voltage());
                }
            }
        }
        for component in &self.circuit.components {
            let [n1, n2] = component.nodes();
            match component {
                Component::VoltageSource(_) => {}
                Component::CurrentSource(cs) => {
                    sys.stamp_current_source(n1.row(), n2.row(), cs.current());
                }
                _ => {
                    let port = component.oneport();
                    let y = port.admittance()?.sym().clone();
                    sys.stamp_admittance(n1.row(), n2.row(), &y);
                    let isc = port.isc()?.sym().clone();
                    if !rational::is_zero(&isc) {
                        sys.stamp_current_source(n1.row(), n2.row(), &-isc);
                    }
                }
            }
        }
        sys.simplify();
        Ok(sys)
    }

    /// One equation per non-ground node.
    pub fn nodal_equations(&self) -> Result<Vec<NodalEquation>> {
        let mut out = Vec::with_capacity(self.unknowns.len());
        let system = if self.domain == Domain::Laplace {
            Some(self.system()?)
        } else {
            None
        };
        for (row, node) in self.circuit.nodes().enumerate() {
            let node_name = self.circuit.node_name(node).to_string();
            let (lhs, rhs, quantity) = match &system {
                Some(sys) => {
                    let lhs = Sym::sum(
                        sys.a[row]
                            .iter()
                            .zip(&self.unknowns)
                            .map(|(coeff, y)| coeff * y),
                    );
                    let quantity = if sys.is_constraint(row) {
                        Quantity::Voltage
                    } else {
                        Quantity::Current
                    };
                    (lhs, sys.b[row].clone(), quantity)
                }
                None => self.time_equation(row, node)?,
            };
            out.push(NodalEquation {
                node: node_name,
                lhs: self.wrap(lhs, quantity),
                rhs: self.wrap(rhs, quantity),
            });
        }
        Ok(out)
    }

    fn time_equation(&self, row: usize, node: NodeId) -> Result<(Sym, Sym, Quantity)> {
        if let Some(id) = self.sources[row] {
            if let Component::VoltageSource(vs) = &self.circuit[id] {
                let lhs = self.node_voltage(vs.nodes[0]) - self.node_voltage(vs.nodes[1]);
                return Ok((lhs, vs.source.time_signal()?, Quantity::Voltage));
            }
        }

        let mut currents = Vec::new();
        for component in self.circuit.connected(node) {
            let [n1, n2] = component.nodes();
            if n1 == n2 {
                continue;
            }
            let other = if n1 == node { n2 } else { n1 };
            let v = self.node_voltage(node) - self.node_voltage(other);
            match component {
                Component::CurrentSource(cs) => {
                    let i = cs.source.time_signal()?;
                    currents.push(if n1 == node { i } else { -i });
                }
                _ => {
                    if let Some(i) = component.time_current(&v) {
                        currents.push(i);
                    }
                }
            }
        }
        Ok((Sym::sum(currents), Sym::zero(), Quantity::Current))
    }

    /// The matrix `A` and vector `b`.
    pub fn matrix_equations(&self) -> Result<(ExprMatrix, ExprList)> {
        let sys = self.system()?;
        let kind = Kind::of(Domain::Laplace);
        let rows: Vec<Vec<Expr>> = sys
            .a
            .iter()
            .map(|row| {
                row.iter()
                    .map(|x| Expr::from_parts(x.clone(), kind, Assumptions::new()))
                    .collect()
            })
            .collect();
        let b: ExprList = sys
            .b
            .iter()
            .map(|x| Expr::from_parts(x.clone(), kind, Assumptions::new()))
            .collect();
        Ok((ExprMatrix::from_rows(rows)?, b))
    }

    /// The matrix form rendered as `A * y = b`.
    pub fn equations(&self) -> Result<String> {
        let (a, b) = self.matrix_equations()?;
        Ok(format!("{} * {} = {}", a, self.unknowns(), b))
    }

    /// Solve for the Laplace-domain node voltages.
    pub fn solve(&self) -> Result<ExprDict> {
        let sys = self.system()?;
        let solution = solve_syms(sys.a, sys.b)?;
        let mut out = ExprDict::new();
        for (unknown, value) in self.unknowns.iter().zip(solution) {
            let value = Expr::from_parts(
                rational::cancel(&value),
                Kind::new(Domain::Laplace, Quantity::Voltage),
                self.assumptions.clone(),
            );
            out.insert(self.wrap(unknown.clone(), Quantity::Voltage), value);
        }
        Ok(out)
    }

    /// Laplace-domain voltage of a node relative to ground.
    pub fn voltage(&self, node: &str) -> Result<Expr> {
        let id = self
            .circuit
            .find_node(node)
            .ok_or_else(|| SymCircuitError::NodeNotFound {
                node: node.to_string(),
            })?;
        let Some(row) = id.row() else {
            return Ok(Expr::from_parts(
                Sym::zero(),
                Kind::new(Domain::Laplace, Quantity::Voltage),
                self.assumptions.clone(),
            ));
        };
        let solution = self.solve()?;
        let key = self.wrap(self.unknowns[row].clone(), Quantity::Voltage);
        solution.get(&key).cloned().ok_or_else(|| SymCircuitError::NodeNotFound {
            node: node.to_string(),
        })
    }
}

/// Pick the voltage source that fixes each node. Every voltage source
/// must fix exactly one node.
fn assign_sources(circuit: &Circuit) -> Result<Vec<Option<ComponentId>>> {
    let mut used = vec![false; circuit.components.len()];
    let mut sources = Vec::new();
    for node in circuit.nodes() {
        let touching: Vec<ComponentId> = circuit
            .connected(node)
            .filter(|c| c.is_voltage_source())
            .map(Component::id)
            .collect();
        match touching.iter().copied().find(|id| !used[id.0]) {
            Some(id) => {
                used[id.0] = true;
                sources.push(Some(id));
            }
            None if touching.is_empty() => sources.push(None),
            None => {
                return Err(SymCircuitError::InvalidTopology {
                    message: format!(
                        "node '{}' is fixed by voltage sources already in use",
                        circuit.node_name(node)
                    ),
                })
            }
        }
    }
    if let Some(loop_source) = circuit
        .components
        .iter()
        .find(|c| c.is_voltage_source() && !used[c.id().0])
    {
        return Err(SymCircuitError::InvalidTopology {
            message: format!("voltage source {} forms a loop", loop_source.name()),
        });
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{sexpr, texpr};

    fn divider() -> Circuit {
        Circuit::from_netlist("V1 1 0 dc V\nR1 1 2 R\nR2 2 0 R").unwrap()
    }

    #[test]
    fn test_unknowns() {
        let circuit = divider();
        let na = NodalAnalysis::new(&circuit, Domain::Laplace).unwrap();
        let y = na.unknowns();
        assert_eq!(y.len(), 2);
        assert!(y[0].equals(&sexpr("V1(s)").unwrap()));
    }

    #[test]
    fn test_divider() {
        let circuit = divider();
        let na = NodalAnalysis::new(&circuit, Domain::Laplace).unwrap();
        let v2 = na.voltage("2").unwrap();
        assert!(v2.equals(&sexpr("V / (2 * s)").unwrap()));
        assert!(v2.is_dc());
        assert!(v2.inverse_laplace().unwrap().equals(&texpr("V / 2").unwrap()));
        assert!(na.voltage("0").unwrap().is_zero());
    }

    #[test]
    fn test_matrix_form() {
        let circuit = divider();
        let na = NodalAnalysis::new(&circuit, Domain::Laplace).unwrap();
        let (a, b) = na.matrix_equations().unwrap();
        assert_eq!((a.rows(), a.cols()), (2, 2));
        assert!(a[(0, 0)].equals(1));
        assert!(a[(0, 1)].is_zero());
        assert!(a[(1, 1)].equals(&sexpr("2 / R").unwrap()));
        assert!(b[0].equals(&sexpr("V / s").unwrap()));
        assert!(b[1].is_zero());
        assert!(na.equations().unwrap().contains(" = "));
    }

    #[test]
    fn test_current_source_into_resistor() {
        // Source current flows from node 0 through the source into node 1
        let circuit = Circuit::from_netlist("I1 0 1 s {2 / s}\nR1 1 0 3").unwrap();
        let na = NodalAnalysis::new(&circuit, Domain::Laplace).unwrap();
        assert!(na.voltage("1").unwrap().equals(&sexpr("6 / s").unwrap()));
    }

    #[test]
    fn test_time_domain_equations() {
        let circuit = Circuit::from_netlist("V1 1 0 step 10\nR1 1 2 R\nC1 2 0 C").unwrap();
        let na = NodalAnalysis::new(&circuit, Domain::Time).unwrap();
        let eqs = na.nodal_equations().unwrap();
        assert_eq!(eqs.len(), 2);
        assert_eq!(eqs[0].node, "1");
        assert!(eqs[0].rhs.equals(&texpr("10 * u(t)").unwrap()));
        assert!(eqs[1].rhs.is_zero());
        assert!(eqs[1].lhs.sym().has_symbol_named("C"));
        assert!(na.matrix_equations().is_err());
    }

    #[test]
    fn test_rc_step_response() {
        let circuit = Circuit::from_netlist("V1 1 0 step 1\nR1 1 2 1\nC1 2 0 1").unwrap();
        let na = NodalAnalysis::new(&circuit, Domain::Laplace).unwrap();
        let v2 = na.voltage("2").unwrap();
        assert!(v2.is_causal());
        let expected = texpr("(1 - exp(-t)) * u(t)").unwrap();
        assert!(v2.inverse_laplace().unwrap().equals(&expected));
    }

    #[test]
    fn test_voltage_source_loop() {
        let circuit = Circuit::from_netlist("V1 1 0 dc 1\nV2 1 0 dc 2\nR1 1 0 1").unwrap();
        assert!(matches!(
            NodalAnalysis::new(&circuit, Domain::Laplace),
            Err(SymCircuitError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_unsupported_domain() {
        let circuit = divider();
        assert!(NodalAnalysis::new(&circuit, Domain::Fourier).is_err());
    }
}
