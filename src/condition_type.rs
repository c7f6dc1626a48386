//! Condition type registry.
//!
//! Maps condition-type identifiers (as written in configuration) to the
//! [`ConditionSpec`]s that build live conditions from parameters.

use crate::builtin::builtin_specs;
use crate::condition::{Condition, ConditionSpec};
use crate::error::{Result, VariantError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier-keyed table of condition specs.
///
/// A new table already holds [`RANDOM`](crate::builtin::RANDOM) and
/// [`MOD_RANGE`](crate::builtin::MOD_RANGE). Identifiers are registered
/// once; nothing can be replaced or removed.
///
/// # Examples
///
/// ```rust
/// use variantly::{Condition, ConditionTypeRegistry};
/// use serde_json::{json, Value};
///
/// let mut types = ConditionTypeRegistry::new();
/// types
///     .register("PLATFORM", |params: &Value| {
///         let wanted = params.clone();
///         Ok(Condition::from_fn(move |ctx: Option<&Value>| {
///             ctx.map(|c| c["platform"] == wanted).unwrap_or(false)
///         }))
///     })
///     .unwrap();
///
/// let ios = types.build("PLATFORM", &json!("ios")).unwrap();
/// assert!(ios.evaluate(Some(&json!({"platform": "ios"}))));
/// ```
#[derive(Clone)]
pub struct ConditionTypeRegistry {
    specs: HashMap<String, ConditionSpec>,
}

impl ConditionTypeRegistry {
    /// Create a table holding the built-in condition types.
    pub fn new() -> Self {
        Self {
            specs: builtin_specs()
                .into_iter()
                .map(|(id, spec)| (id.to_owned(), spec))
                .collect(),
        }
    }

    /// Register a condition type.
    ///
    /// # Errors
    ///
    /// `DuplicateConditionType` if `identifier` is taken, `MalformedConfig`
    /// if it is empty. The table is unchanged on error.
    pub fn register<F>(&mut self, identifier: impl Into<String>, spec: F) -> Result<()>
    where
        F: Fn(&Value) -> Result<Condition> + Send + Sync + 'static,
    {
        self.register_spec(identifier, Arc::new(spec))
    }

    /// Register an already-shared spec.
    pub fn register_spec(&mut self, identifier: impl Into<String>, spec: ConditionSpec) -> Result<()> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(VariantError::malformed(
                "condition type identifier must not be empty",
            ));
        }
        if self.specs.contains_key(&identifier) {
            return Err(VariantError::DuplicateConditionType(identifier));
        }
        self.specs.insert(identifier, spec);
        Ok(())
    }

    /// Build a condition of type `identifier` from `params`.
    ///
    /// # Errors
    ///
    /// `UnknownConditionType` if nothing is registered under `identifier`;
    /// otherwise whatever the spec returns.
    pub fn build(&self, identifier: &str, params: &Value) -> Result<Condition> {
        let spec = self
            .specs
            .get(identifier)
            .ok_or_else(|| VariantError::UnknownConditionType(identifier.to_owned()))?;
        spec(params)
    }

    /// Whether `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.specs.contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.specs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered condition types, built-ins included.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no condition type is registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for ConditionTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConditionTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionTypeRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{MOD_RANGE, RANDOM};
    use serde_json::json;

    #[test]
    fn test_builtins_present() {
        let types = ConditionTypeRegistry::new();
        assert!(types.contains(RANDOM));
        assert!(types.contains(MOD_RANGE));
        assert_eq!(types.identifiers(), vec![MOD_RANGE.to_owned(), RANDOM.to_owned()]);
    }

    #[test]
    fn test_builtins_cannot_be_replaced() {
        let mut types = ConditionTypeRegistry::new();
        let err = types
            .register(RANDOM, |_: &Value| Ok(Condition::never()))
            .unwrap_err();
        assert_eq!(err, VariantError::DuplicateConditionType(RANDOM.to_owned()));

        // Still the real RANDOM: probability 1 is always active.
        let condition = types.build(RANDOM, &json!(1.0)).unwrap();
        assert!(condition.evaluate(None));
    }

    #[test]
    fn test_custom_type_registered_once() {
        let mut types = ConditionTypeRegistry::new();
        types
            .register("ALWAYS", |_: &Value| Ok(Condition::always()))
            .unwrap();
        assert!(types.build("ALWAYS", &Value::Null).unwrap().evaluate(None));

        let err = types
            .register("ALWAYS", |_: &Value| Ok(Condition::never()))
            .unwrap_err();
        assert!(matches!(err, VariantError::DuplicateConditionType(_)));
        assert!(types.build("ALWAYS", &Value::Null).unwrap().evaluate(None));
    }

    #[test]
    fn test_unknown_type() {
        let types = ConditionTypeRegistry::new();
        let err = types.build("GEO", &Value::Null).unwrap_err();
        assert_eq!(err, VariantError::UnknownConditionType("GEO".to_owned()));
    }

    #[test]
    fn test_spec_errors_pass_through() {
        let types = ConditionTypeRegistry::new();
        let err = types.build(MOD_RANGE, &json!("nope")).unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let mut types = ConditionTypeRegistry::new();
        let before = types.len();
        assert!(types.register("", |_: &Value| Ok(Condition::always())).is_err());
        assert_eq!(types.len(), before);
    }
}
