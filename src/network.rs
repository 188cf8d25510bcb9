//! One-port networks.
//!
//! A [`OnePort`] is a two-terminal network built from elements (R, G, L,
//! C, independent sources and generic immittances) joined in series with
//! `+` and in parallel with `|`:
//!
//! ```ignore
//! let a = OnePort::vdc(4)? + OnePort::c(2)?;
//! assert!(a.is_dc());
//! ```
//!
//! Every network reduces to a Thevenin or a Norton equivalent in the
//! Laplace domain, from which the impedance, admittance, open-circuit
//! voltage and short-circuit current are read off.

use std::fmt;
use std::ops::{Add, BitOr};

use crate::error::{Result, SymCircuitError};
use crate::expr::{Assumptions, Domain, Expr, Kind, Quantity};
use crate::sym::{parse, rational, symbol, Sym};
use crate::transform::laplace;

/// Angular frequency of AC sources.
pub const AC_FREQUENCY: &str = "omega0";

/// Values accepted by the element constructors.
pub trait IntoValue {
    fn into_value(self) -> Result<Sym>;
}

impl IntoValue for i32 {
    fn into_value(self) -> Result<Sym> {
        Ok(Sym::int(i64::from(self)))
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Result<Sym> {
        Ok(Sym::int(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Result<Sym> {
        Ok(Sym::float(self))
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Result<Sym> {
        parse::parse(self)
    }
}

impl IntoValue for Sym {
    fn into_value(self) -> Result<Sym> {
        Ok(self)
    }
}

impl IntoValue for &Expr {
    fn into_value(self) -> Result<Sym> {
        Ok(self.sym().clone())
    }
}

/// Signal class of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass {
    Dc,
    Ac,
    Causal,
    Generic,
}

impl SignalClass {
    pub(crate) fn assumptions(self) -> Assumptions {
        match self {
            SignalClass::Dc => Assumptions::new().with_dc(true),
            SignalClass::Ac => Assumptions::new().with_ac(true),
            SignalClass::Causal => Assumptions::new().with_causal(true),
            SignalClass::Generic => Assumptions::new(),
        }
    }
}

/// An independent source.
#[derive(Debug, Clone)]
pub struct Source {
    name: &'static str,
    value: Sym,
    time: Option<Sym>,
    laplace: Sym,
    class: SignalClass,
}

impl Source {
    pub(crate) fn dc(name: &'static str, value: Sym) -> Self {
        let s = Sym::from(symbol::s());
        Source {
            name,
            laplace: &value / s,
            time: Some(value.clone()),
            value,
            class: SignalClass::Dc,
        }
    }

    pub(crate) fn ac(name: &'static str, value: Sym, phase: Sym) -> Self {
        let s = Sym::from(symbol::s());
        let w = Sym::from(symbol::symbol(AC_FREQUENCY));
        let t = Sym::from(symbol::t());
        let laplace = &value * (&s * Sym::cos(phase.clone()) - &w * Sym::sin(phase.clone()))
            / (s.powi(2) + w.powi(2));
        Source {
            name,
            time: Some(&value * Sym::cos(w * t + phase)),
            laplace,
            value,
            class: SignalClass::Ac,
        }
    }

    pub(crate) fn step(name: &'static str, value: Sym) -> Self {
        let s = Sym::from(symbol::s());
        Source {
            name,
            time: Some(&value * Sym::heaviside(Sym::from(symbol::t()))),
            laplace: &value / s,
            value,
            class: SignalClass::Causal,
        }
    }

    /// A source given by an arbitrary expression: a Laplace-domain value
    /// when it depends on `s`, otherwise a time-domain signal whose class
    /// is inferred from its structure.
    pub(crate) fn arbitrary(name: &'static str, value: Sym) -> Result<Self> {
        let (s, t) = (symbol::s(), symbol::t());
        if value.has_symbol(&s) {
            return Ok(Source {
                name,
                time: None,
                laplace: value.clone(),
                value,
                class: SignalClass::Causal,
            });
        }
        let class = if crate::expr::domains::is_dc(&value, &t) {
            SignalClass::Dc
        } else if crate::expr::domains::is_ac(&value, &t) {
            SignalClass::Ac
        } else if crate::expr::domains::is_causal(&value, &t) {
            SignalClass::Causal
        } else {
            SignalClass::Generic
        };
        Ok(Source {
            name,
            laplace: rational::cancel(&laplace::laplace_transform(&value, &t, &s)?),
            time: Some(value.clone()),
            value,
            class,
        })
    }

    pub fn class(&self) -> SignalClass {
        self.class
    }

    /// Laplace-domain value.
    pub fn laplace(&self) -> &Sym {
        &self.laplace
    }

    /// Time-domain value.
    pub fn time_signal(&self) -> Result<Sym> {
        match &self.time {
            Some(x) => Ok(x.clone()),
            None => laplace::inverse_laplace_transform(
                &self.laplace,
                &symbol::s(),
                &symbol::t(),
                &Assumptions::new().with_causal(true),
            ),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.value)
    }
}

/// A two-terminal network.
#[derive(Debug, Clone)]
pub enum OnePort {
    Resistor(Sym),
    Conductor(Sym),
    Inductor { value: Sym, initial: Option<Sym> },
    Capacitor { value: Sym, initial: Option<Sym> },
    /// Generic impedance, may depend on `s`
    Impedance(Sym),
    /// Generic admittance, may depend on `s`
    Admittance(Sym),
    Voltage(Source),
    Current(Source),
    Series(Vec<OnePort>),
    Parallel(Vec<OnePort>),
}

/// Reduced form of a network in the Laplace domain.
#[derive(Debug, Clone)]
enum Equivalent {
    Thevenin { z: Sym, voc: Sym },
    Norton { y: Sym, isc: Sym },
}

impl Equivalent {
    /// Thevenin form unless this is an ideal current source.
    fn into_thevenin(self) -> Equivalent {
        match self {
            Equivalent::Norton { y, isc } if !rational::is_zero(&y) => Equivalent::Thevenin {
                voc: rational::cancel(&(isc / &y)),
                z: rational::cancel(&y.recip()),
            },
            other => other,
        }
    }

    /// Norton form unless this is an ideal voltage source.
    fn into_norton(self) -> Equivalent {
        match self {
            Equivalent::Thevenin { z, voc } if !rational::is_zero(&z) => Equivalent::Norton {
                isc: rational::cancel(&(voc / &z)),
                y: rational::cancel(&z.recip()),
            },
            other => other,
        }
    }
}

impl OnePort {
    pub fn r(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Resistor(value.into_value()?))
    }

    pub fn g(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Conductor(value.into_value()?))
    }

    pub fn l(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Inductor {
            value: value.into_value()?,
            initial: None,
        })
    }

    /// Inductor with initial current `i0`.
    pub fn l_with_initial(value: impl IntoValue, i0: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Inductor {
            value: value.into_value()?,
            initial: Some(i0.into_value()?),
        })
    }

    pub fn c(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Capacitor {
            value: value.into_value()?,
            initial: None,
        })
    }

    /// Capacitor with initial voltage `v0`.
    pub fn c_with_initial(value: impl IntoValue, v0: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Capacitor {
            value: value.into_value()?,
            initial: Some(v0.into_value()?),
        })
    }

    pub fn z(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Impedance(value.into_value()?))
    }

    pub fn y(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Admittance(value.into_value()?))
    }

    /// Voltage source: Laplace domain if the value depends on `s`,
    /// otherwise a time-domain signal.
    pub fn v(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Voltage(Source::arbitrary("V", value.into_value()?)?))
    }

    pub fn vdc(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Voltage(Source::dc("Vdc", value.into_value()?)))
    }

    /// Voltage `value cos(omega0 t)`.
    pub fn vac(value: impl IntoValue) -> Result<Self> {
        OnePort::vac_with_phase(value, 0)
    }

    pub fn vac_with_phase(value: impl IntoValue, phase: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Voltage(Source::ac(
            "Vac",
            value.into_value()?,
            phase.into_value()?,
        )))
    }

    pub fn vstep(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Voltage(Source::step("Vstep", value.into_value()?)))
    }

    pub fn i(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Current(Source::arbitrary("I", value.into_value()?)?))
    }

    pub fn idc(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Current(Source::dc("Idc", value.into_value()?)))
    }

    pub fn iac(value: impl IntoValue) -> Result<Self> {
        OnePort::iac_with_phase(value, 0)
    }

    pub fn iac_with_phase(value: impl IntoValue, phase: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Current(Source::ac(
            "Iac",
            value.into_value()?,
            phase.into_value()?,
        )))
    }

    pub fn istep(value: impl IntoValue) -> Result<Self> {
        Ok(OnePort::Current(Source::step("Istep", value.into_value()?)))
    }

    /// Series combination.
    pub fn series(parts: impl IntoIterator<Item = OnePort>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                OnePort::Series(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        OnePort::Series(flat)
    }

    /// Parallel combination.
    pub fn parallel(parts: impl IntoIterator<Item = OnePort>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                OnePort::Parallel(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        OnePort::Parallel(flat)
    }

    fn equivalent(&self) -> Result<Equivalent> {
        let s = Sym::from(symbol::s());
        let eq = match self {
            OnePort::Resistor(r) | OnePort::Impedance(r) => Equivalent::Thevenin {
                z: r.clone(),
                voc: Sym::zero(),
            },
            OnePort::Conductor(g) | OnePort::Admittance(g) => Equivalent::Norton {
                y: g.clone(),
                isc: Sym::zero(),
            },
            OnePort::Inductor { value, initial } => Equivalent::Thevenin {
                z: &s * value,
                voc: initial.as_ref().map_or_else(Sym::zero, |i0| -(value * i0)),
            },
            OnePort::Capacitor { value, initial } => Equivalent::Thevenin {
                z: (&s * value).recip(),
                voc: initial.as_ref().map_or_else(Sym::zero, |v0| v0 / &s),
            },
            OnePort::Voltage(source) => Equivalent::Thevenin {
                z: Sym::zero(),
                voc: source.laplace.clone(),
            },
            OnePort::Current(source) => Equivalent::Norton {
                y: Sym::zero(),
                isc: source.laplace.clone(),
            },
            OnePort::Series(parts) => series_equivalent(parts)?,
            OnePort::Parallel(parts) => parallel_equivalent(parts)?,
        };
        Ok(eq)
    }

    fn laplace_expr(&self, sym: Sym, quantity: Quantity, assumptions: Assumptions) -> Expr {
        Expr::from_parts(
            rational::cancel(&sym),
            Kind::new(Domain::Laplace, quantity),
            assumptions,
        )
    }

    /// Laplace-domain impedance.
    pub fn impedance(&self) -> Result<Expr> {
        let z = match self.equivalent()? {
            Equivalent::Thevenin { z, .. } => z,
            Equivalent::Norton { y, .. } if !rational::is_zero(&y) => y.recip(),
            Equivalent::Norton { .. } => {
                return Err(SymCircuitError::invalid_argument(
                    "impedance",
                    format!("{} has infinite impedance", self),
                ))
            }
        };
        Ok(self.laplace_expr(z, Quantity::Impedance, Assumptions::new()))
    }

    /// Laplace-domain admittance.
    pub fn admittance(&self) -> Result<Expr> {
        let y = match self.equivalent()? {
            Equivalent::Norton { y, .. } => y,
            Equivalent::Thevenin { z, .. } if !rational::is_zero(&z) => z.recip(),
            Equivalent::Thevenin { .. } => {
                return Err(SymCircuitError::invalid_argument(
                    "admittance",
                    format!("{} has infinite admittance", self),
                ))
            }
        };
        Ok(self.laplace_expr(y, Quantity::Admittance, Assumptions::new()))
    }

    /// Laplace-domain open-circuit voltage.
    pub fn voc(&self) -> Result<Expr> {
        let voc = match self.equivalent()?.into_thevenin() {
            Equivalent::Thevenin { voc, .. } => voc,
            Equivalent::Norton { .. } => {
                return Err(SymCircuitError::invalid_argument(
                    "open-circuit voltage",
                    format!("{} is an ideal current source", self),
                ))
            }
        };
        Ok(self.laplace_expr(voc, Quantity::Voltage, self.signal_assumptions()))
    }

    /// Laplace-domain short-circuit current.
    pub fn isc(&self) -> Result<Expr> {
        let isc = match self.equivalent()?.into_norton() {
            Equivalent::Norton { isc, .. } => isc,
            Equivalent::Thevenin { .. } => {
                return Err(SymCircuitError::invalid_argument(
                    "short-circuit current",
                    format!("{} is an ideal voltage source", self),
                ))
            }
        };
        Ok(self.laplace_expr(isc, Quantity::Current, self.signal_assumptions()))
    }

    /// Time-domain open-circuit voltage.
    pub fn voc_t(&self) -> Result<Expr> {
        self.voc()?.inverse_laplace()
    }

    /// Time-domain short-circuit current.
    pub fn isc_t(&self) -> Result<Expr> {
        self.isc()?.inverse_laplace()
    }

    /// Impedance as a function of `s`.
    pub fn zs(&self) -> Result<Expr> {
        self.impedance()
    }

    /// Admittance as a function of `s`.
    pub fn ys(&self) -> Result<Expr> {
        self.admittance()
    }

    /// Impedance as a function of `omega`.
    pub fn zw(&self) -> Result<Expr> {
        to_angular(&self.impedance()?)
    }

    /// Admittance as a function of `omega`.
    pub fn yw(&self) -> Result<Expr> {
        to_angular(&self.admittance()?)
    }

    pub fn resistance(&self) -> Result<Expr> {
        Ok(self.zw()?.real())
    }

    pub fn reactance(&self) -> Result<Expr> {
        Ok(self.zw()?.imag())
    }

    pub fn conductance(&self) -> Result<Expr> {
        Ok(self.yw()?.real())
    }

    pub fn susceptance(&self) -> Result<Expr> {
        Ok(self.yw()?.imag().negate())
    }

    /// Voltage source in series with the impedance.
    pub fn thevenin(&self) -> Result<OnePort> {
        let z = self.impedance()?.sym().clone();
        let voc = self.voc()?.sym().clone();
        if rational::is_zero(&voc) {
            return Ok(OnePort::Impedance(z));
        }
        let source = self.equivalent_source("V", voc);
        if rational::is_zero(&z) {
            return Ok(OnePort::Voltage(source));
        }
        Ok(OnePort::Voltage(source) + OnePort::Impedance(z))
    }

    /// Current source in parallel with the admittance.
    pub fn norton(&self) -> Result<OnePort> {
        let y = self.admittance()?.sym().clone();
        let isc = self.isc()?.sym().clone();
        if rational::is_zero(&isc) {
            return Ok(OnePort::Admittance(y));
        }
        let source = self.equivalent_source("I", isc);
        if rational::is_zero(&y) {
            return Ok(OnePort::Current(source));
        }
        Ok(OnePort::Current(source) | OnePort::Admittance(y))
    }

    fn equivalent_source(&self, name: &'static str, laplace: Sym) -> Source {
        Source {
            name,
            value: laplace.clone(),
            time: None,
            laplace,
            class: self.signal_class(),
        }
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a OnePort)) {
        f(self);
        if let OnePort::Series(parts) | OnePort::Parallel(parts) = self {
            for part in parts {
                part.visit(f);
            }
        }
    }

    /// Independent sources, depth first.
    pub fn sources(&self) -> Vec<&Source> {
        let mut out = Vec::new();
        self.visit(&mut |part| {
            if let OnePort::Voltage(source) | OnePort::Current(source) = part {
                out.push(source);
            }
        });
        out
    }

    /// Some reactive element has an initial value.
    pub fn is_ivp(&self) -> bool {
        let mut ivp = false;
        self.visit(&mut |part| {
            if let OnePort::Inductor { initial: Some(_), .. } | OnePort::Capacitor { initial: Some(_), .. } =
                part
            {
                ivp = true;
            }
        });
        ivp
    }

    fn all_sources(&self, class: SignalClass) -> bool {
        let sources = self.sources();
        !sources.is_empty() && sources.iter().all(|s| s.class == class)
    }

    /// Only DC sources and no initial values.
    pub fn is_dc(&self) -> bool {
        !self.is_ivp() && self.all_sources(SignalClass::Dc)
    }

    /// Only AC sources and no initial values.
    pub fn is_ac(&self) -> bool {
        !self.is_ivp() && self.all_sources(SignalClass::Ac)
    }

    /// Every source is zero for `t < 0`. Initial values count as steps.
    pub fn is_causal(&self) -> bool {
        self.sources().iter().all(|s| s.class == SignalClass::Causal)
    }

    pub fn signal_class(&self) -> SignalClass {
        if self.is_dc() {
            SignalClass::Dc
        } else if self.is_ac() {
            SignalClass::Ac
        } else if self.is_causal() {
            SignalClass::Causal
        } else {
            SignalClass::Generic
        }
    }

    fn signal_assumptions(&self) -> Assumptions {
        self.signal_class().assumptions()
    }
}

fn series_equivalent(parts: &[OnePort]) -> Result<Equivalent> {
    let mut z = Vec::new();
    let mut voc = Vec::new();
    let mut current: Option<Sym> = None;
    for part in parts {
        match part.equivalent()?.into_thevenin() {
            Equivalent::Thevenin { z: zk, voc: vk } => {
                z.push(zk);
                voc.push(vk);
            }
            Equivalent::Norton { isc, .. } => {
                if current.is_some() {
                    return Err(SymCircuitError::InvalidTopology {
                        message: "current sources in series".to_string(),
                    });
                }
                current = Some(isc);
            }
        }
    }
    Ok(match current {
        Some(isc) => Equivalent::Norton { y: Sym::zero(), isc },
        None => Equivalent::Thevenin {
            z: rational::cancel(&Sym::sum(z)),
            voc: rational::cancel(&Sym::sum(voc)),
        },
    })
}

fn parallel_equivalent(parts: &[OnePort]) -> Result<Equivalent> {
    let mut y = Vec::new();
    let mut isc = Vec::new();
    let mut voltage: Option<Sym> = None;
    for part in parts {
        match part.equivalent()?.into_norton() {
            Equivalent::Norton { y: yk, isc: ik } => {
                y.push(yk);
                isc.push(ik);
            }
            Equivalent::Thevenin { voc, .. } => {
                if voltage.is_some() {
                    return Err(SymCircuitError::InvalidTopology {
                        message: "voltage sources in parallel".to_string(),
                    });
                }
                voltage = Some(voc);
            }
        }
    }
    Ok(match voltage {
        Some(voc) => Equivalent::Thevenin { z: Sym::zero(), voc },
        None => Equivalent::Norton {
            y: rational::cancel(&Sym::sum(y)),
            isc: rational::cancel(&Sym::sum(isc)),
        },
    })
}

/// Substitute `s = j omega`.
fn to_angular(x: &Expr) -> Result<Expr> {
    let jw = Sym::i() * Sym::from(symbol::omega());
    let sym = rational::cancel(&crate::sym::subs::subs(x.sym(), &symbol::s(), &jw));
    Expr::with_assumptions(
        sym,
        x.kind().with_domain(Domain::AngularFourier),
        Assumptions::new(),
    )
}

impl Add for OnePort {
    type Output = OnePort;

    fn add(self, rhs: OnePort) -> OnePort {
        OnePort::series([self, rhs])
    }
}

impl BitOr for OnePort {
    type Output = OnePort;

    fn bitor(self, rhs: OnePort) -> OnePort {
        OnePort::parallel([self, rhs])
    }
}

impl fmt::Display for OnePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = |f: &mut fmt::Formatter<'_>, name: &str, value: &Sym, initial: &Option<Sym>| match initial {
            Some(x) => write!(f, "{}({}, {})", name, value, x),
            None => write!(f, "{}({})", name, value),
        };
        match self {
            OnePort::Resistor(x) => write!(f, "R({})", x),
            OnePort::Conductor(x) => write!(f, "G({})", x),
            OnePort::Impedance(x) => write!(f, "Z({})", x),
            OnePort::Admittance(x) => write!(f, "Y({})", x),
            OnePort::Inductor { value, initial } => element(f, "L", value, initial),
            OnePort::Capacitor { value, initial } => element(f, "C", value, initial),
            OnePort::Voltage(source) | OnePort::Current(source) => write!(f, "{}", source),
            OnePort::Series(parts) | OnePort::Parallel(parts) => {
                let sep = if matches!(self, OnePort::Series(_)) { " + " } else { " | " };
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    if matches!(part, OnePort::Series(_) | OnePort::Parallel(_)) {
                        write!(f, "({})", part)?;
                    } else {
                        write!(f, "{}", part)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ac_network() {
        let a = OnePort::vac(4).unwrap() | OnePort::r(2).unwrap();
        assert!(a.is_ac());
        assert!(!a.is_dc());
    }

    #[test]
    fn test_dc_network() {
        let a = OnePort::vdc(4).unwrap() + OnePort::c(2).unwrap();
        assert!(a.is_dc());
        assert!(!a.is_ivp());
        assert!(a.voc_t().unwrap().equals(4));
    }

    #[test]
    fn test_initial_value_network() {
        let a = OnePort::vdc(4).unwrap() + OnePort::c_with_initial(2, 0).unwrap();
        assert!(a.is_ivp());
        assert!(!a.is_dc());
    }

    #[test]
    fn test_causal_network() {
        let a = OnePort::vstep(10).unwrap() + OnePort::c("C1").unwrap();
        assert!(a.is_causal());
        assert!(a.isc().unwrap().is_causal());
        assert!(a.voc().unwrap().equals(&crate::expr::sexpr("10 / s").unwrap()));

        let b = OnePort::vstep(10).unwrap() + OnePort::c_with_initial("C1", 5).unwrap();
        assert!(b.is_ivp());
        assert!(b.voc().unwrap().equals(&crate::expr::sexpr("15 / s").unwrap()));
    }

    #[test]
    fn test_series_parallel_impedance() {
        let a = OnePort::r(1).unwrap() + OnePort::v(2).unwrap() + OnePort::r(3).unwrap();
        assert!(a.impedance().unwrap().equals(4));
        assert!(a.admittance().unwrap().equals(&Expr::constant(Sym::rational(1, 4))));

        let b = (OnePort::r(1).unwrap() + OnePort::v(2).unwrap()) | OnePort::r(3).unwrap();
        assert!(b.impedance().unwrap().equals(&Expr::constant(Sym::rational(3, 4))));
        assert!(b.admittance().unwrap().equals(&Expr::constant(Sym::rational(4, 3))));
    }

    #[test]
    fn test_ideal_sources() {
        let v = OnePort::vdc(5).unwrap();
        assert!(v.impedance().unwrap().is_zero());
        assert!(v.admittance().is_err());
        assert!(v.isc().is_err());

        let both = OnePort::idc(1).unwrap() + OnePort::idc(2).unwrap();
        assert!(matches!(both.impedance(), Err(SymCircuitError::InvalidTopology { .. })));
    }

    #[test]
    fn test_ac_short_circuit_current() {
        let a = (OnePort::vac(1).unwrap() + OnePort::c(2).unwrap()) | OnePort::r(3).unwrap();
        let isc = a.norton().unwrap().isc_t().unwrap();
        assert!(isc.equals(&crate::expr::texpr("-2 * omega0 * sin(omega0 * t)").unwrap()));
    }

    #[test]
    fn test_thevenin_norton() {
        let a = OnePort::vdc(6).unwrap() + OnePort::r(3).unwrap();
        let n = a.norton().unwrap();
        assert!(n.isc().unwrap().equals(&crate::expr::sexpr("2 / s").unwrap()));
        assert!(n.impedance().unwrap().equals(3));

        let t = n.thevenin().unwrap();
        assert!(t.voc().unwrap().equals(&crate::expr::sexpr("6 / s").unwrap()));
        assert!(t.is_dc());
    }

    #[test]
    fn test_immittance_parts() {
        let a = OnePort::r(2).unwrap() + OnePort::l(3).unwrap();
        assert!(a.resistance().unwrap().equals(2));
        assert!(a.reactance().unwrap().equals(&crate::expr::omegaexpr("3 * omega").unwrap()));
        assert_eq!(a.zw().unwrap().domain(), Domain::AngularFourier);

        let g = OnePort::g(5).unwrap();
        assert!(g.conductance().unwrap().equals(5));
        assert!(g.susceptance().unwrap().is_zero());
    }

    #[test]
    fn test_display() {
        let a = (OnePort::r(1).unwrap() + OnePort::vdc(2).unwrap()) | OnePort::c("C1").unwrap();
        assert_eq!(a.to_string(), "(R(1) + Vdc(2)) | C(C1)");
    }
}
