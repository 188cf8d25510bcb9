//! Assumption sets attached to expressions.

use crate::sym::SymbolFlags;

/// Tri-state assumptions about an expression.
///
/// `causal`, `dc` and `ac` steer the transforms (the inverse Laplace
/// transform in particular); `real` and `complex` are the only keys handed
/// on to the symbolic backend when parsing. `nid` tags noise sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assumptions {
    pub causal: Option<bool>,
    pub dc: Option<bool>,
    pub ac: Option<bool>,
    pub real: Option<bool>,
    pub complex: Option<bool>,
    pub nid: Option<String>,
}

impl Assumptions {
    /// Create an empty assumption set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set causality. A causal signal is neither DC nor AC.
    pub fn with_causal(mut self, causal: bool) -> Self {
        self.set_causal(causal);
        self
    }

    pub fn with_dc(mut self, dc: bool) -> Self {
        self.dc = Some(dc);
        self
    }

    pub fn with_ac(mut self, ac: bool) -> Self {
        self.ac = Some(ac);
        self
    }

    pub fn with_real(mut self, real: bool) -> Self {
        self.real = Some(real);
        self
    }

    pub fn with_complex(mut self, complex: bool) -> Self {
        self.complex = Some(complex);
        self
    }

    /// Tag with a noise identifier.
    pub fn with_nid(mut self, nid: impl Into<String>) -> Self {
        self.nid = Some(nid.into());
        self
    }

    pub fn set_causal(&mut self, causal: bool) {
        self.causal = Some(causal);
        if causal {
            self.dc = Some(false);
            self.ac = Some(false);
        }
    }

    /// True if no key is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True once the signal-class keys have been decided.
    pub fn is_inferred(&self) -> bool {
        self.causal.is_some() && self.dc.is_some() && self.ac.is_some()
    }

    /// Copy of `self` with every key set in `overrides` replaced.
    pub fn merge(&self, overrides: &Assumptions) -> Assumptions {
        let mut merged = self.clone();
        if let Some(c) = overrides.causal {
            merged.set_causal(c);
        }
        if overrides.dc.is_some() {
            merged.dc = overrides.dc;
        }
        if overrides.ac.is_some() {
            merged.ac = overrides.ac;
        }
        if overrides.real.is_some() {
            merged.real = overrides.real;
        }
        if overrides.complex.is_some() {
            merged.complex = overrides.complex;
        }
        if overrides.nid.is_some() {
            merged.nid = overrides.nid.clone();
        }
        merged
    }

    /// Drop the signal-class keys so they are inferred afresh.
    pub fn without_signal_class(&self) -> Assumptions {
        Assumptions {
            causal: None,
            dc: None,
            ac: None,
            ..self.clone()
        }
    }

    /// Flags for new symbols created while parsing. Only `real` and
    /// `complex` take part; the remaining keys never reach the backend.
    pub fn backend_flags(&self) -> SymbolFlags {
        SymbolFlags::from_request(self.real, self.complex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_causal_clears_dc_and_ac() {
        let a = Assumptions::new().with_dc(true).with_ac(true).with_causal(true);
        assert_eq!(a.dc, Some(false));
        assert_eq!(a.ac, Some(false));
    }

    #[test]
    fn test_merge_overrides_only_set_keys() {
        let base = Assumptions::new().with_dc(true).with_real(true);
        let merged = base.merge(&Assumptions::new().with_ac(true));
        assert_eq!(merged.dc, Some(true));
        assert_eq!(merged.ac, Some(true));
        assert_eq!(merged.real, Some(true));
    }

    #[test]
    fn test_backend_flags_ignore_signal_keys() {
        let a = Assumptions::new().with_causal(true).with_nid("n1");
        assert_eq!(a.backend_flags(), SymbolFlags::POSITIVE);
        let b = Assumptions::new().with_complex(true);
        assert_eq!(b.backend_flags(), SymbolFlags::COMPLEX);
    }
}
