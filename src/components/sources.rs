//! Independent voltage and current sources.

use crate::circuit::{ComponentId, NodeId};
use crate::dsl::SourceKeyword;
use crate::error::Result;
use crate::network::{OnePort, Source};
use crate::sym::Sym;

/// Build the source for a keyword and its values.
fn make_source(
    names: [&'static str; 4],
    keyword: SourceKeyword,
    value: Sym,
    phase: Option<Sym>,
) -> Result<Source> {
    let [plain, dc, ac, step] = names;
    Ok(match keyword {
        SourceKeyword::Dc => Source::dc(dc, value),
        SourceKeyword::Ac => Source::ac(ac, value, phase.unwrap_or_else(Sym::zero)),
        SourceKeyword::Step => Source::step(step, value),
        SourceKeyword::Arbitrary | SourceKeyword::Laplace => Source::arbitrary(plain, value)?,
    })
}

/// A voltage source component.
///
/// Enforces `V+ - V- = V_source`.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    pub source: Source,
}

impl VoltageSource {
    pub fn new(
        id: ComponentId,
        name: String,
        nodes: [NodeId; 2],
        keyword: SourceKeyword,
        value: Sym,
        phase: Option<Sym>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            name,
            nodes,
            source: make_source(["V", "Vdc", "Vac", "Vstep"], keyword, value, phase)?,
        })
    }

    pub fn oneport(&self) -> OnePort {
        OnePort::Voltage(self.source.clone())
    }

    /// Laplace-domain voltage.
    pub fn voltage(&self) -> &Sym {
        self.source.laplace()
    }
}

/// A current source component.
///
/// Current flows from `n+` through the source to `n-`.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub source: Source,
}

impl CurrentSource {
    pub fn new(
        id: ComponentId,
        name: String,
        nodes: [NodeId; 2],
        keyword: SourceKeyword,
        value: Sym,
        phase: Option<Sym>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            name,
            nodes,
            source: make_source(["I", "Idc", "Iac", "Istep"], keyword, value, phase)?,
        })
    }

    pub fn oneport(&self) -> OnePort {
        OnePort::Current(self.source.clone())
    }

    /// Laplace-domain current.
    pub fn current(&self) -> &Sym {
        self.source.laplace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SignalClass;

    fn nodes() -> [NodeId; 2] {
        [NodeId(1), NodeId::GROUND]
    }

    #[test]
    fn test_keyword_classes() {
        let make = |keyword| {
            VoltageSource::new(ComponentId(0), "V1".into(), nodes(), keyword, Sym::int(5), None)
                .unwrap()
                .source
                .class()
        };
        assert_eq!(make(SourceKeyword::Dc), SignalClass::Dc);
        assert_eq!(make(SourceKeyword::Ac), SignalClass::Ac);
        assert_eq!(make(SourceKeyword::Step), SignalClass::Causal);
        assert_eq!(make(SourceKeyword::Arbitrary), SignalClass::Dc);
    }

    #[test]
    fn test_current_source_display() {
        let i = CurrentSource::new(
            ComponentId(1),
            "I1".into(),
            nodes(),
            SourceKeyword::Step,
            Sym::symbol("Is"),
            None,
        )
        .unwrap();
        assert_eq!(i.oneport().to_string(), "Istep(Is)");
    }
}
