//! Expression kinds: the (domain, quantity) pair and its static tables.

use std::fmt;

use crate::sym::{symbol, Symbol};

/// The space an expression lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// No particular domain
    Generic,
    /// Independent of any domain variable
    Constant,
    Time,
    Laplace,
    Fourier,
    AngularFourier,
    DiscreteTime,
    Z,
}

/// The physical quantity an expression represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Expression,
    Voltage,
    Current,
    Impedance,
    Admittance,
    TransferFunction,
    ImpulseResponse,
}

/// Concrete expression kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    pub domain: Domain,
    pub quantity: Quantity,
}

impl Kind {
    pub const GENERIC: Kind = Kind::new(Domain::Generic, Quantity::Expression);
    pub const CONSTANT: Kind = Kind::new(Domain::Constant, Quantity::Expression);

    pub const fn new(domain: Domain, quantity: Quantity) -> Self {
        Kind { domain, quantity }
    }

    /// The plain expression kind of a domain.
    pub const fn of(domain: Domain) -> Self {
        Kind::new(domain, Quantity::Expression)
    }

    pub fn with_quantity(self, quantity: Quantity) -> Self {
        Kind::new(self.domain, quantity)
    }

    pub fn with_domain(self, domain: Domain) -> Self {
        Kind::new(domain, self.quantity)
    }

    /// Generic or constant plain expression: adopts the other operand's
    /// kind in arithmetic.
    pub fn is_untyped(self) -> bool {
        self == Kind::GENERIC || self == Kind::CONSTANT
    }

    /// Domain variable, if the kind has one.
    pub fn var(self) -> Option<Symbol> {
        self.domain.var()
    }

    pub fn quantity_label(self) -> Option<&'static str> {
        match self.quantity {
            Quantity::Expression => None,
            Quantity::Voltage => Some("Voltage"),
            Quantity::Current => Some("Current"),
            Quantity::Impedance => Some("Impedance"),
            Quantity::Admittance => Some("Admittance"),
            Quantity::TransferFunction => Some("Transfer function"),
            Quantity::ImpulseResponse => Some("Impulse response"),
        }
    }

    /// Units of the quantity in this domain.
    pub fn units(self) -> &'static str {
        use Domain::*;
        use Quantity::*;
        match (self.domain, self.quantity) {
            (_, Expression) | (_, TransferFunction) => "",
            (Time, Voltage) | (Generic, Voltage) | (DiscreteTime, Voltage) => "V",
            (Time, Current) | (Generic, Current) | (DiscreteTime, Current) => "A",
            (Time, Impedance) => "ohms/s",
            (Time, Admittance) => "siemens/s",
            (Time, ImpulseResponse) => "1/s",
            (Laplace, Voltage) => "V/s",
            (Laplace, Current) => "A/s",
            (Fourier, Voltage) => "V/Hz",
            (Fourier, Current) => "A/Hz",
            (AngularFourier, Voltage) => "V/rad/s",
            (AngularFourier, Current) => "A/rad/s",
            (_, Impedance) => "ohms",
            (_, Admittance) => "siemens",
            _ => "",
        }
    }

    /// Voltage and current flavours share a superkind; different kinds
    /// with the same superkind are promoted to it on addition.
    pub fn superkind(self) -> Option<Quantity> {
        match self.quantity {
            Quantity::Voltage | Quantity::Current => Some(self.quantity),
            _ => None,
        }
    }

    /// Generic kind of a superkind.
    pub fn superkind_kind(quantity: Quantity) -> Kind {
        Kind::new(Domain::Generic, quantity)
    }

    /// True if `self` is `other` or a refinement of it.
    pub fn is_subtype_of(self, other: Kind) -> bool {
        self == other
            || other == Kind::GENERIC
            || (other.domain == self.domain && other.quantity == Quantity::Expression)
    }

    /// Kind produced by the Laplace transform (or its inverse).
    pub fn laplace_conjugate(self) -> Kind {
        match self.domain {
            Domain::Laplace => Kind::new(Domain::Time, self.quantity.to_time()),
            _ => Kind::new(Domain::Laplace, self.quantity.to_transform()),
        }
    }

    /// Kind produced by the Fourier transform (or its inverse).
    pub fn fourier_conjugate(self) -> Kind {
        match self.domain {
            Domain::Fourier | Domain::AngularFourier => {
                Kind::new(Domain::Time, self.quantity.to_time())
            }
            _ => Kind::new(Domain::Fourier, self.quantity.to_transform()),
        }
    }

    /// Kind produced by the angular Fourier transform.
    pub fn angular_fourier_conjugate(self) -> Kind {
        match self.domain {
            Domain::Fourier | Domain::AngularFourier => {
                Kind::new(Domain::Time, self.quantity.to_time())
            }
            _ => Kind::new(Domain::AngularFourier, self.quantity.to_transform()),
        }
    }

    /// Kind produced by the z-transform (or its inverse).
    pub fn z_conjugate(self) -> Kind {
        match self.domain {
            Domain::Z => Kind::new(Domain::DiscreteTime, self.quantity.to_time()),
            _ => Kind::new(Domain::Z, self.quantity.to_transform()),
        }
    }

    /// Kind after substituting an expression of kind `new` for a variable.
    ///
    /// Frequency-domain quantities substituted with a Fourier or angular
    /// Fourier expression move to that domain, and generic immittances
    /// take the domain of the substituted expression. Returns `None` when
    /// the pair is not in the table.
    pub fn subs_promotion(self, new: Kind) -> Option<Kind> {
        use Domain::*;
        use Quantity::*;
        if new.quantity != Expression {
            return None;
        }
        let movable = matches!(
            self.quantity,
            TransferFunction | Current | Voltage | Admittance | Impedance
        );
        let immittance = matches!(self.quantity, Admittance | Impedance);
        let target = match (self.domain, new.domain) {
            (Laplace, AngularFourier) | (Fourier, AngularFourier) if movable => AngularFourier,
            (Laplace, Fourier) | (AngularFourier, Fourier) if movable => Fourier,
            (Generic, AngularFourier) if immittance => AngularFourier,
            (Generic, Fourier) if immittance => Fourier,
            (Generic, Laplace) if immittance => Laplace,
            _ => return None,
        };
        Some(Kind::new(target, self.quantity))
    }
}

impl Quantity {
    fn to_time(self) -> Quantity {
        match self {
            Quantity::TransferFunction => Quantity::ImpulseResponse,
            q => q,
        }
    }

    fn to_transform(self) -> Quantity {
        match self {
            Quantity::ImpulseResponse => Quantity::TransferFunction,
            q => q,
        }
    }
}

impl Domain {
    /// Domain variable symbol.
    pub fn var(self) -> Option<Symbol> {
        match self {
            Domain::Generic | Domain::Constant => None,
            Domain::Time => Some(symbol::t()),
            Domain::Laplace => Some(symbol::s()),
            Domain::Fourier => Some(symbol::f()),
            Domain::AngularFourier => Some(symbol::omega()),
            Domain::DiscreteTime => Some(symbol::n()),
            Domain::Z => Some(symbol::z()),
        }
    }

    /// Domain whose variable has the given name.
    pub fn from_var_name(name: &str) -> Option<Domain> {
        match name {
            "t" => Some(Domain::Time),
            "s" => Some(Domain::Laplace),
            "f" => Some(Domain::Fourier),
            "omega" => Some(Domain::AngularFourier),
            "n" => Some(Domain::DiscreteTime),
            "z" => Some(Domain::Z),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::Generic => "Generic",
            Domain::Constant => "Constant",
            Domain::Time => "Time",
            Domain::Laplace => "Laplace",
            Domain::Fourier => "Fourier",
            Domain::AngularFourier => "Angular Fourier",
            Domain::DiscreteTime => "Discrete time",
            Domain::Z => "Z",
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            Domain::Time => "s",
            Domain::Laplace | Domain::AngularFourier => "rad/s",
            Domain::Fourier => "Hz",
            _ => "",
        }
    }

    /// Real-valued signal domains.
    pub fn is_real_signal(self) -> bool {
        matches!(self, Domain::Time | Domain::DiscreteTime)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain = match self.domain {
            Domain::Generic => "",
            Domain::Constant => "Constant",
            Domain::Time => "TimeDomain",
            Domain::Laplace => "LaplaceDomain",
            Domain::Fourier => "FourierDomain",
            Domain::AngularFourier => "AngularFourierDomain",
            Domain::DiscreteTime => "DiscreteTimeDomain",
            Domain::Z => "ZDomain",
        };
        let quantity = match (self.domain, self.quantity) {
            (Domain::Generic, Quantity::Expression) => "Expr",
            (_, Quantity::Expression) => "Expression",
            (_, Quantity::Voltage) => "Voltage",
            (_, Quantity::Current) => "Current",
            (_, Quantity::Impedance) => "Impedance",
            (_, Quantity::Admittance) => "Admittance",
            (_, Quantity::TransferFunction) => "TransferFunction",
            (_, Quantity::ImpulseResponse) => "ImpulseResponse",
        };
        write!(f, "{}{}", domain, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjugates_swap_transfer_function_and_impulse_response() {
        let h = Kind::new(Domain::Time, Quantity::ImpulseResponse);
        assert_eq!(
            h.laplace_conjugate(),
            Kind::new(Domain::Laplace, Quantity::TransferFunction)
        );
        assert_eq!(h.laplace_conjugate().laplace_conjugate(), h);
        let v = Kind::new(Domain::DiscreteTime, Quantity::Voltage);
        assert_eq!(v.z_conjugate(), Kind::new(Domain::Z, Quantity::Voltage));
    }

    #[test]
    fn test_subtype() {
        let vs = Kind::new(Domain::Laplace, Quantity::Voltage);
        assert!(vs.is_subtype_of(Kind::of(Domain::Laplace)));
        assert!(vs.is_subtype_of(Kind::GENERIC));
        assert!(!Kind::of(Domain::Laplace).is_subtype_of(vs));
        assert!(!vs.is_subtype_of(Kind::of(Domain::Time)));
    }

    #[test]
    fn test_subs_promotion_table() {
        let h = Kind::new(Domain::Laplace, Quantity::TransferFunction);
        assert_eq!(
            h.subs_promotion(Kind::of(Domain::AngularFourier)),
            Some(Kind::new(Domain::AngularFourier, Quantity::TransferFunction))
        );
        let z = Kind::new(Domain::Generic, Quantity::Impedance);
        assert_eq!(
            z.subs_promotion(Kind::of(Domain::Laplace)),
            Some(Kind::new(Domain::Laplace, Quantity::Impedance))
        );
        assert_eq!(Kind::of(Domain::Laplace).subs_promotion(Kind::of(Domain::Fourier)), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            Kind::new(Domain::Laplace, Quantity::Voltage).to_string(),
            "LaplaceDomainVoltage"
        );
        assert_eq!(Kind::GENERIC.to_string(), "Expr");
        assert_eq!(Kind::new(Domain::Generic, Quantity::Impedance).to_string(), "Impedance");
    }
}
