//! Resolved flag results.
//!
//! `ResolvedFlag` is what [`Registry::resolve`](crate::Registry::resolve)
//! returns: the effective value plus where it came from. Useful when
//! debugging why a user sees a particular value.

use crate::name::FlagName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "variant", rename_all = "snake_case")]
pub enum ValueSource {
    /// No active variant targeted the flag.
    Base,
    /// The identifier of the variant that supplied the value.
    Variant(String),
}

/// A resolved flag value with its provenance.
///
/// # Examples
///
/// ```rust
/// use variantly::{FlagName, ResolvedFlag, ValueSource};
/// use serde_json::json;
///
/// let resolved = ResolvedFlag::new(FlagName::new("x"), json!(1));
/// assert_eq!(resolved.source, ValueSource::Base);
/// assert!(resolved.active_variants.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFlag {
    /// The flag that was resolved.
    pub flag: FlagName,

    /// The effective value.
    pub value: Value,

    /// Where `value` came from.
    pub source: ValueSource,

    /// Identifiers of every variant that was active during resolution,
    /// in registration order, whether or not it targets this flag.
    pub active_variants: Vec<String>,
}

impl ResolvedFlag {
    /// A result carrying the flag's base value.
    pub fn new(flag: FlagName, base_value: Value) -> Self {
        Self {
            flag,
            value: base_value,
            source: ValueSource::Base,
            active_variants: Vec::new(),
        }
    }

    /// Record an override; a later call replaces an earlier one.
    pub fn apply(&mut self, variant: &str, value: &Value) {
        self.value = value.clone();
        self.source = ValueSource::Variant(variant.to_owned());
    }

    /// Whether a variant supplied the value.
    pub fn is_overridden(&self) -> bool {
        matches!(self.source, ValueSource::Variant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_overrides_in_order() {
        let mut resolved = ResolvedFlag::new(FlagName::new("x"), json!(1));
        assert!(!resolved.is_overridden());

        resolved.apply("a", &json!(2));
        resolved.apply("b", &json!(3));
        assert_eq!(resolved.value, json!(3));
        assert_eq!(resolved.source, ValueSource::Variant("b".to_owned()));
        assert!(resolved.is_overridden());
    }

    #[test]
    fn test_serializes_source() {
        let mut resolved = ResolvedFlag::new(FlagName::new("x"), json!(1));
        resolved.apply("a", &json!(true));
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["source"], json!({"kind": "variant", "variant": "a"}));
    }
}
