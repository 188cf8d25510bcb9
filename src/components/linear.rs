//! Linear passive components: Resistor, Conductor, Inductor, Capacitor.
//!
//! Each element knows its Laplace-domain one-port model and the
//! time-domain current it draws for a given terminal voltage.

use crate::circuit::{ComponentId, NodeId};
use crate::network::OnePort;
use crate::sym::{calculus, subs, symbol, Sym};

/// A resistor component.
#[derive(Debug, Clone)]
pub struct Resistor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    pub resistance: Sym,
}

impl Resistor {
    pub fn new(id: ComponentId, name: String, nodes: [NodeId; 2], resistance: Sym) -> Self {
        Self {
            id,
            name,
            nodes,
            resistance,
        }
    }

    pub fn oneport(&self) -> OnePort {
        OnePort::Resistor(self.resistance.clone())
    }

    /// Current for terminal voltage `v(t)`.
    pub fn current(&self, v: &Sym) -> Sym {
        v / &self.resistance
    }
}

/// A conductor component.
#[derive(Debug, Clone)]
pub struct Conductor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub conductance: Sym,
}

impl Conductor {
    pub fn new(id: ComponentId, name: String, nodes: [NodeId; 2], conductance: Sym) -> Self {
        Self {
            id,
            name,
            nodes,
            conductance,
        }
    }

    pub fn oneport(&self) -> OnePort {
        OnePort::Conductor(self.conductance.clone())
    }

    pub fn current(&self, v: &Sym) -> Sym {
        &self.conductance * v
    }
}

/// An inductor component with optional initial current.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub inductance: Sym,
    pub initial_current: Option<Sym>,
}

impl Inductor {
    pub fn new(
        id: ComponentId,
        name: String,
        nodes: [NodeId; 2],
        inductance: Sym,
        initial_current: Option<Sym>,
    ) -> Self {
        Self {
            id,
            name,
            nodes,
            inductance,
            initial_current,
        }
    }

    pub fn oneport(&self) -> OnePort {
        OnePort::Inductor {
            value: self.inductance.clone(),
            initial: self.initial_current.clone(),
        }
    }

    /// `(1 / L) ∫ v(tau) dtau` from `-oo` to `t`.
    pub fn current(&self, v: &Sym) -> Sym {
        let (t, tau) = (symbol::t(), symbol::tau());
        let integrand = subs::subs(v, &t, &Sym::from(&tau));
        Sym::integral(integrand, tau, -Sym::oo(), Sym::from(t)) / &self.inductance
    }
}

/// A capacitor component with optional initial voltage.
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub capacitance: Sym,
    pub initial_voltage: Option<Sym>,
}

impl Capacitor {
    pub fn new(
        id: ComponentId,
        name: String,
        nodes: [NodeId; 2],
        capacitance: Sym,
        initial_voltage: Option<Sym>,
    ) -> Self {
        Self {
            id,
            name,
            nodes,
            capacitance,
            initial_voltage,
        }
    }

    pub fn oneport(&self) -> OnePort {
        OnePort::Capacitor {
            value: self.capacitance.clone(),
            initial: self.initial_voltage.clone(),
        }
    }

    /// `C dv/dt`.
    pub fn current(&self, v: &Sym) -> Sym {
        &self.capacitance * calculus::diff(v, &symbol::t())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::parse::parse;
    use crate::sym::rational;

    fn nodes() -> [NodeId; 2] {
        [NodeId(1), NodeId::GROUND]
    }

    #[test]
    fn test_resistor_current() {
        let r = Resistor::new(ComponentId(0), "R1".into(), nodes(), Sym::int(4));
        let i = r.current(&parse("8 * t").unwrap());
        assert!(rational::is_zero(&(i - parse("2 * t").unwrap())));
        assert!(r.oneport().impedance().unwrap().equals(4));
    }

    #[test]
    fn test_capacitor_current() {
        let c = Capacitor::new(ComponentId(0), "C1".into(), nodes(), Sym::int(3), None);
        let i = c.current(&parse("t^2").unwrap());
        assert!(rational::is_zero(&rational::simplify(&(i - parse("6 * t").unwrap()))));
        assert!(!c.oneport().is_ivp());
    }

    #[test]
    fn test_inductor_model() {
        let l = Inductor::new(ComponentId(0), "L1".into(), nodes(), Sym::symbol("L1"), Some(Sym::int(2)));
        assert!(l.oneport().is_ivp());
        assert!(l.current(&parse("v(t)").unwrap()).has_integral());
    }
}
