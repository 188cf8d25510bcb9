//! Circuit graph structure.

use std::collections::HashMap;
use std::ops::Index;

use super::types::{ComponentId, NodeId};
use super::validate::validate_circuit;
use crate::components::Component;
use crate::dsl::{self, NetlistAst};
use crate::error::{Result, SymCircuitError};

/// Default prefix of node-voltage unknowns.
pub const DEFAULT_NODE_PREFIX: &str = "";

/// A complete circuit ready for analysis.
#[derive(Debug)]
pub struct Circuit {
    /// All components in netlist order
    pub components: Vec<Component>,

    /// Mapping from node names to node IDs
    pub node_map: HashMap<String, NodeId>,

    /// Reverse mapping from node IDs to names
    pub node_names: Vec<String>,

    /// Number of nodes (including ground)
    pub num_nodes: usize,

    /// Prefix of node-voltage unknowns, as in `v<prefix><node>(t)`
    pub node_prefix: String,
}

impl Circuit {
    /// Parse, build and validate a netlist.
    pub fn from_netlist(input: &str) -> Result<Self> {
        let circuit = Circuit::from_ast(dsl::parse(input)?)?;
        validate_circuit(&circuit)?;
        Ok(circuit)
    }

    /// Build a circuit from a parsed AST.
    pub fn from_ast(ast: NetlistAst) -> Result<Self> {
        let mut node_map = HashMap::new();
        let mut node_names = Vec::with_capacity(ast.nodes.len() + 1);

        // Ground is always node 0
        node_map.insert("0".to_string(), NodeId::GROUND);
        node_names.push("0".to_string());

        for name in &ast.nodes {
            if !node_map.contains_key(name) {
                node_map.insert(name.clone(), NodeId(node_names.len()));
                node_names.push(name.clone());
            }
        }
        let num_nodes = node_names.len();

        let mut components = Vec::with_capacity(ast.components.len());
        for (idx, def) in ast.components.iter().enumerate() {
            let lookup = |name: &String| {
                node_map
                    .get(name)
                    .copied()
                    .ok_or_else(|| SymCircuitError::NodeNotFound { node: name.clone() })
            };
            let nodes = [lookup(&def.nodes[0])?, lookup(&def.nodes[1])?];
            if nodes[0] == nodes[1] {
                log::warn!("{} is shorted: both terminals on node {}", def.name, def.nodes[0]);
            }
            components.push(Component::from_def(ComponentId(idx), def, nodes)?);
        }

        log::debug!(
            "built circuit with {} components and {} nodes",
            components.len(),
            num_nodes
        );

        Ok(Circuit {
            components,
            node_map,
            node_names,
            num_nodes,
            node_prefix: ast
                .node_prefix
                .unwrap_or_else(|| DEFAULT_NODE_PREFIX.to_string()),
        })
    }

    /// Find a node ID by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        let name = if dsl::is_ground(name) { "0" } else { name };
        self.node_map.get(name).copied()
    }

    /// Get the name of a node.
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_names[node.0]
    }

    /// Non-ground nodes in order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (1..self.num_nodes).map(NodeId)
    }

    /// Find a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Components with a terminal on `node`.
    pub fn connected(&self, node: NodeId) -> impl Iterator<Item = &Component> {
        self.components
            .iter()
            .filter(move |c| c.nodes().contains(&node))
    }
}

impl Index<ComponentId> for Circuit {
    type Output = Component;

    fn index(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_netlist() {
        let circuit = Circuit::from_netlist("V1 1 0 dc 10\nR1 1 2 R\nR2 2 gnd R").unwrap();
        assert_eq!(circuit.num_nodes, 3);
        assert_eq!(circuit.find_node("2"), Some(NodeId(2)));
        assert_eq!(circuit.find_node("GND"), Some(NodeId::GROUND));
        assert_eq!(circuit.node_name(NodeId(1)), "1");
        assert_eq!(circuit.connected(NodeId(2)).count(), 2);
        assert!(circuit.component("R2").is_some());
        assert_eq!(circuit[ComponentId(1)].name(), "R1");
        assert_eq!(circuit.node_prefix, "");
    }

    #[test]
    fn test_node_prefix() {
        let circuit = Circuit::from_netlist(".prefix n\nR1 1 0").unwrap();
        assert_eq!(circuit.node_prefix, "n");
    }
}
