//! Symbols and the global symbol registry.
//!
//! Every symbol created by name goes through the registry so that repeated
//! creation with the same name and flags yields equal symbols. Registering an
//! existing name with different flags is allowed but logged: the two symbols
//! compare unequal, which is a common source of surprising results.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

/// Assumption flags carried by a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolFlags {
    pub real: bool,
    pub positive: bool,
}

impl SymbolFlags {
    pub const COMPLEX: SymbolFlags = SymbolFlags {
        real: false,
        positive: false,
    };
    pub const REAL: SymbolFlags = SymbolFlags {
        real: true,
        positive: false,
    };
    pub const POSITIVE: SymbolFlags = SymbolFlags {
        real: true,
        positive: true,
    };

    /// Flags for a user symbol given optional real/complex requests.
    pub fn from_request(real: Option<bool>, complex: Option<bool>) -> Self {
        match (real, complex) {
            (_, Some(true)) | (Some(false), _) => Self::COMPLEX,
            (Some(true), _) => Self::REAL,
            _ => Self::POSITIVE,
        }
    }
}

/// A named symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub name: Arc<str>,
    pub flags: SymbolFlags,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_real(&self) -> bool {
        self.flags.real
    }

    pub fn is_positive(&self) -> bool {
        self.flags.positive
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

static REGISTRY: Lazy<Mutex<HashMap<String, SymbolFlags>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (name, flags) in DOMAIN_SYMBOLS {
        map.insert(name.to_string(), *flags);
    }
    Mutex::new(map)
});

/// Names reserved for domain variables, with their flags.
const DOMAIN_SYMBOLS: &[(&str, SymbolFlags)] = &[
    ("t", SymbolFlags::REAL),
    ("s", SymbolFlags::COMPLEX),
    ("f", SymbolFlags::REAL),
    ("omega", SymbolFlags::REAL),
    ("n", SymbolFlags::REAL),
    ("z", SymbolFlags::COMPLEX),
    ("tau", SymbolFlags::REAL),
];

/// Create (or fetch) a symbol with explicit flags.
pub fn symbol_with(name: &str, flags: SymbolFlags) -> Symbol {
    let mut registry = match REGISTRY.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    match registry.get(name) {
        Some(existing) if *existing != flags => {
            log::warn!(
                "symbol '{}' redefined with different assumptions ({:?} vs {:?})",
                name,
                existing,
                flags
            );
        }
        Some(_) => {}
        None => {
            registry.insert(name.to_string(), flags);
        }
    }
    Symbol {
        name: Arc::from(name),
        flags,
    }
}

/// Fetch a symbol by name, using the registered flags if the name is known
/// and `default` otherwise.
pub fn symbol_or(name: &str, default: SymbolFlags) -> Symbol {
    let flags = {
        let registry = match REGISTRY.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.get(name).copied()
    };
    symbol_with(name, flags.unwrap_or(default))
}

/// Fetch a symbol by name with default (positive) flags.
pub fn symbol(name: &str) -> Symbol {
    symbol_or(name, SymbolFlags::POSITIVE)
}

/// True if `name` is one of the domain variable names.
pub fn is_domain_name(name: &str) -> bool {
    DOMAIN_SYMBOLS
        .iter()
        .any(|(n, _)| *n == name && *n != "tau")
}

pub fn t() -> Symbol {
    symbol_or("t", SymbolFlags::REAL)
}

pub fn s() -> Symbol {
    symbol_or("s", SymbolFlags::COMPLEX)
}

pub fn f() -> Symbol {
    symbol_or("f", SymbolFlags::REAL)
}

pub fn omega() -> Symbol {
    symbol_or("omega", SymbolFlags::REAL)
}

pub fn n() -> Symbol {
    symbol_or("n", SymbolFlags::REAL)
}

pub fn z() -> Symbol {
    symbol_or("z", SymbolFlags::COMPLEX)
}

/// Dummy integration variable used by convolution.
pub fn tau() -> Symbol {
    symbol_or("tau", SymbolFlags::REAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_flags_equal() {
        let a = symbol("R1");
        let b = symbol("R1");
        assert_eq!(a, b);
        assert!(a.is_positive());
    }

    #[test]
    fn test_domain_symbols_flags() {
        assert!(t().is_real());
        assert!(!t().is_positive());
        assert!(!s().is_real());
        assert!(is_domain_name("omega"));
        assert!(!is_domain_name("tau"));
    }

    #[test]
    fn test_conflicting_flags_unequal() {
        let a = symbol_with("x_conflict", SymbolFlags::POSITIVE);
        let b = symbol_with("x_conflict", SymbolFlags::COMPLEX);
        assert_ne!(a, b);
    }
}
