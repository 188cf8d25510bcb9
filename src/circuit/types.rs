//! Node and component handles.

use std::fmt;

/// Index of a node in [`Circuit`](super::Circuit). Node 0 is ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const GROUND: NodeId = NodeId(0);

    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }

    /// Row of the node in nodal equations; ground has none.
    pub fn row(&self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "ground")
        } else {
            write!(f, "node #{}", self.0)
        }
    }
}

/// Position of a component in netlist order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        assert_eq!(NodeId::GROUND.row(), None);
        assert_eq!(NodeId(3).row(), Some(2));
        assert_eq!(NodeId::GROUND.to_string(), "ground");
        assert_eq!(NodeId(3).to_string(), "node #3");
    }
}
