//! Circuit validation.

use std::collections::VecDeque;

use crate::error::{Result, SymCircuitError};

use super::{Circuit, NodeId};

/// Validate a circuit for nodal analysis.
///
/// Checks:
/// - The circuit has at least one component
/// - Some component connects to ground
/// - Every node has a path to ground
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    if circuit.components.is_empty() {
        return Err(SymCircuitError::InvalidTopology {
            message: "Circuit has no components".to_string(),
        });
    }

    if circuit.connected(NodeId::GROUND).next().is_none() {
        return Err(SymCircuitError::InvalidTopology {
            message: "No component connects to ground".to_string(),
        });
    }

    let mut reached = vec![false; circuit.num_nodes];
    let mut queue = VecDeque::from([NodeId::GROUND]);
    reached[0] = true;
    while let Some(node) = queue.pop_front() {
        for component in circuit.connected(node) {
            for next in component.nodes() {
                if !reached[next.0] {
                    reached[next.0] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    if let Some(node) = circuit.nodes().find(|n| !reached[n.0]) {
        return Err(SymCircuitError::InvalidTopology {
            message: format!("Node '{}' has no path to ground", circuit.node_name(node)),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::circuit::Circuit;
    use crate::error::SymCircuitError;

    #[test]
    fn test_floating_node() {
        let result = Circuit::from_netlist("R1 1 0 5\nR2 2 3 5");
        assert!(matches!(result, Err(SymCircuitError::InvalidTopology { .. })));
    }

    #[test]
    fn test_no_ground() {
        let result = Circuit::from_netlist("R1 1 2 5");
        assert!(matches!(result, Err(SymCircuitError::InvalidTopology { .. })));
    }

    #[test]
    fn test_empty() {
        assert!(Circuit::from_netlist("# nothing\n").is_err());
    }
}
