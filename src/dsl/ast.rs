//! Abstract Syntax Tree types for the netlist language.

use crate::sym::Sym;

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct NetlistAst {
    /// All component instances, in netlist order
    pub components: Vec<ComponentDef>,
    /// All referenced node names in order of first appearance, ground
    /// excluded
    pub nodes: Vec<String>,
    /// Prefix for the names of node-voltage unknowns
    pub node_prefix: Option<String>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&mut self, name: &str) {
        if !is_ground(name) && !self.nodes.iter().any(|n| n == name) {
            self.nodes.push(name.to_string());
        }
    }
}

/// Ground aliases.
pub fn is_ground(name: &str) -> bool {
    name == "0" || name.eq_ignore_ascii_case("gnd")
}

/// A component definition from the netlist.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// Connected node names, positive terminal first
    pub nodes: Vec<String>,
    /// Component value; the component name as a symbol when omitted
    pub value: Sym,
    /// Signal class keyword of a source
    pub source: SourceKeyword,
    /// Initial value of a reactive element or phase of an AC source
    pub extra: Option<Sym>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Component types supported by the netlist language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Resistor,
    Conductor,
    Inductor,
    Capacitor,
    VoltageSource,
    CurrentSource,
}

impl ComponentType {
    /// Parse a component type from its name prefix.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'R' => Some(Self::Resistor),
            'G' => Some(Self::Conductor),
            'L' => Some(Self::Inductor),
            'C' => Some(Self::Capacitor),
            'V' => Some(Self::VoltageSource),
            'I' => Some(Self::CurrentSource),
            _ => None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Self::VoltageSource | Self::CurrentSource)
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, Self::Inductor | Self::Capacitor)
    }
}

/// Source keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKeyword {
    /// No keyword: a time-domain value, or Laplace-domain if it uses `s`
    #[default]
    Arbitrary,
    Dc,
    Ac,
    Step,
    /// Laplace-domain value
    Laplace,
}

impl SourceKeyword {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "dc" => Some(Self::Dc),
            "ac" => Some(Self::Ac),
            "step" => Some(Self::Step),
            "s" => Some(Self::Laplace),
            _ => None,
        }
    }
}
