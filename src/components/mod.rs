//! Component models for netlists.
//!
//! This module provides the supported two-terminal elements:
//! - Linear: Resistor, Conductor, Inductor, Capacitor
//! - Sources: Voltage Source, Current Source
//!
//! Every component maps onto a [`OnePort`] for Laplace-domain analysis.

mod linear;
mod sources;

pub use linear::{Capacitor, Conductor, Inductor, Resistor};
pub use sources::{CurrentSource, VoltageSource};

use crate::circuit::{ComponentId, NodeId};
use crate::dsl::{ComponentDef, ComponentType};
use crate::error::Result;
use crate::network::OnePort;
use crate::sym::Sym;

/// A circuit component.
#[derive(Debug, Clone)]
pub enum Component {
    Resistor(Resistor),
    Conductor(Conductor),
    Inductor(Inductor),
    Capacitor(Capacitor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
}

impl Component {
    /// Create a component from a netlist definition.
    pub fn from_def(id: ComponentId, def: &ComponentDef, nodes: [NodeId; 2]) -> Result<Self> {
        let name = def.name.clone();
        let value = def.value.clone();
        let extra = def.extra.clone();
        Ok(match def.component_type {
            ComponentType::Resistor => Component::Resistor(Resistor::new(id, name, nodes, value)),
            ComponentType::Conductor => Component::Conductor(Conductor::new(id, name, nodes, value)),
            ComponentType::Inductor => {
                Component::Inductor(Inductor::new(id, name, nodes, value, extra))
            }
            ComponentType::Capacitor => {
                Component::Capacitor(Capacitor::new(id, name, nodes, value, extra))
            }
            ComponentType::VoltageSource => Component::VoltageSource(VoltageSource::new(
                id, name, nodes, def.source, value, extra,
            )?),
            ComponentType::CurrentSource => Component::CurrentSource(CurrentSource::new(
                id, name, nodes, def.source, value, extra,
            )?),
        })
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(c) => &c.name,
            Component::Conductor(c) => &c.name,
            Component::Inductor(c) => &c.name,
            Component::Capacitor(c) => &c.name,
            Component::VoltageSource(c) => &c.name,
            Component::CurrentSource(c) => &c.name,
        }
    }

    pub fn id(&self) -> ComponentId {
        match self {
            Component::Resistor(c) => c.id,
            Component::Conductor(c) => c.id,
            Component::Inductor(c) => c.id,
            Component::Capacitor(c) => c.id,
            Component::VoltageSource(c) => c.id,
            Component::CurrentSource(c) => c.id,
        }
    }

    /// Get the nodes this component connects to, positive first.
    pub fn nodes(&self) -> [NodeId; 2] {
        match self {
            Component::Resistor(c) => c.nodes,
            Component::Conductor(c) => c.nodes,
            Component::Inductor(c) => c.nodes,
            Component::Capacitor(c) => c.nodes,
            Component::VoltageSource(c) => c.nodes,
            Component::CurrentSource(c) => c.nodes,
        }
    }

    /// Laplace-domain one-port model.
    pub fn oneport(&self) -> OnePort {
        match self {
            Component::Resistor(c) => c.oneport(),
            Component::Conductor(c) => c.oneport(),
            Component::Inductor(c) => c.oneport(),
            Component::Capacitor(c) => c.oneport(),
            Component::VoltageSource(c) => c.oneport(),
            Component::CurrentSource(c) => c.oneport(),
        }
    }

    /// Time-domain current through a passive element for terminal
    /// voltage `v(t)`; `None` for sources.
    pub fn time_current(&self, v: &Sym) -> Option<Sym> {
        match self {
            Component::Resistor(c) => Some(c.current(v)),
            Component::Conductor(c) => Some(c.current(v)),
            Component::Inductor(c) => Some(c.current(v)),
            Component::Capacitor(c) => Some(c.current(v)),
            Component::VoltageSource(_) | Component::CurrentSource(_) => None,
        }
    }

    pub fn is_voltage_source(&self) -> bool {
        matches!(self, Component::VoltageSource(_))
    }
}
