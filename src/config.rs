//! Configuration records.
//!
//! These are the plain serde shapes of a configuration payload. They carry
//! no invariants of their own: the registry validates them and turns them
//! into [`Flag`](crate::Flag)s and [`Variant`](crate::Variant)s during a
//! load. Keys are camelCase; the snake_case spellings are accepted as
//! aliases.
//!
//! ```json
//! {
//!   "flags": [{ "name": "x", "description": "demo", "baseValue": 1 }],
//!   "variants": [{
//!     "identifier": "half",
//!     "operator": "AND",
//!     "conditions": [{ "type": "MOD_RANGE", "params": { "modulus": 10, "range": [0, 5] } }],
//!     "mods": [{ "flagName": "x", "value": 2 }]
//!   }]
//! }
//! ```

use crate::error::{Result, VariantError};
use crate::variant::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Top-level configuration payload.
///
/// # Examples
///
/// ```rust
/// use variantly::config::RegistryConfig;
///
/// let config = RegistryConfig::from_slice(br#"{
///     "flags": [{ "name": "max_items", "baseValue": 10 }],
///     "variants": []
/// }"#).unwrap();
///
/// assert_eq!(config.flags.len(), 1);
/// assert!(config.variants.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Flag definitions.
    #[serde(default, alias = "flag_defs")]
    pub flags: Vec<FlagRecord>,

    /// Variants, in precedence order (later entries override earlier ones).
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

impl RegistryConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if the bytes are not JSON or do not have the
    /// expected shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Map an already-parsed JSON value onto the configuration records.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if the value does not have the expected shape.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(VariantError::malformed(
                "configuration must be a JSON object",
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Add a flag definition.
    pub fn with_flag(mut self, flag: FlagRecord) -> Self {
        self.flags.push(flag);
        self
    }

    /// Append a variant.
    pub fn with_variant(mut self, variant: VariantRecord) -> Self {
        self.variants.push(variant);
        self
    }
}

impl FromStr for RegistryConfig {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

/// A flag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRecord {
    /// Unique, non-empty flag name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Value served when no active variant overrides the flag.
    #[serde(default, alias = "base_value")]
    pub base_value: Value,
}

impl FlagRecord {
    /// A flag record with an empty description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::config::FlagRecord;
    /// use serde_json::json;
    ///
    /// let record = FlagRecord::new("max_items", 10).with_description("Page size");
    /// assert_eq!(record.base_value, json!(10));
    /// assert_eq!(record.description, "Page size");
    /// ```
    pub fn new(name: impl Into<String>, base_value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            base_value: base_value.into(),
        }
    }

    /// Set the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A variant definition.
///
/// The operator is kept as raw JSON so that anything other than `"AND"` or
/// `"OR"`, including a non-string, is reported as `InvalidOperator` by the
/// registry rather than as a generic deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    #[serde(alias = "id")]
    pub identifier: String,

    /// `"AND"` or `"OR"`; `"AND"` when absent.
    #[serde(default = "default_operator", alias = "condition_operator")]
    pub operator: Value,

    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,

    /// Must be non-empty once loaded.
    pub mods: Vec<ModRecord>,
}

fn default_operator() -> Value {
    Value::from(Operator::And.as_str())
}

impl VariantRecord {
    /// A variant record with no conditions and no mods yet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::config::VariantRecord;
    /// use variantly::Operator;
    ///
    /// let record = VariantRecord::new("beta", Operator::Or)
    ///     .with_condition("RANDOM", 0.1)
    ///     .with_mod("new_ui", true);
    ///
    /// assert_eq!(record.operator, "OR");
    /// assert_eq!(record.conditions.len(), 1);
    /// assert_eq!(record.mods[0].flag_name, "new_ui");
    /// ```
    pub fn new(identifier: impl Into<String>, operator: Operator) -> Self {
        Self {
            identifier: identifier.into(),
            operator: Value::from(operator.as_str()),
            conditions: Vec::new(),
            mods: Vec::new(),
        }
    }

    /// Append a condition of type `condition_type`.
    pub fn with_condition(
        mut self,
        condition_type: impl Into<String>,
        params: impl Into<Value>,
    ) -> Self {
        self.conditions.push(ConditionRecord {
            condition_type: condition_type.into(),
            params: params.into(),
        });
        self
    }

    /// Append a mod. Earlier mods for the same flag take priority.
    pub fn with_mod(mut self, flag_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.mods.push(ModRecord {
            flag_name: flag_name.into(),
            value: value.into(),
        });
        self
    }
}

/// A condition reference: a registered condition type plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    /// Identifier of a registered condition type.
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Passed unchanged to the condition type's spec.
    #[serde(default, alias = "value")]
    pub params: Value,
}

/// A flag override. Both keys are required; an explicit `null` is a
/// valid override value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModRecord {
    #[serde(alias = "flag_name", alias = "flag")]
    pub flag_name: String,

    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_filled_in() {
        let config = RegistryConfig::from_value(json!({
            "flags": [{ "name": "x" }],
            "variants": [{ "identifier": "v", "mods": [{ "flagName": "x", "value": 2 }] }]
        }))
        .unwrap();

        assert_eq!(config.flags[0].description, "");
        assert_eq!(config.flags[0].base_value, Value::Null);
        assert_eq!(config.variants[0].operator, "AND");
        assert!(config.variants[0].conditions.is_empty());
    }

    #[test]
    fn test_snake_case_aliases() {
        let config = RegistryConfig::from_value(json!({
            "flag_defs": [{ "name": "x", "base_value": 1 }],
            "variants": [{
                "id": "v",
                "condition_operator": "OR",
                "conditions": [{ "type": "RANDOM", "value": 0.5 }],
                "mods": [{ "flag": "x", "value": 2 }]
            }]
        }))
        .unwrap();

        assert_eq!(config.flags[0].base_value, json!(1));
        let variant = &config.variants[0];
        assert_eq!(variant.identifier, "v");
        assert_eq!(variant.operator, "OR");
        assert_eq!(variant.conditions[0].params, json!(0.5));
        assert_eq!(variant.mods[0].flag_name, "x");
    }

    #[test]
    fn test_missing_required_key_is_malformed() {
        let err = RegistryConfig::from_value(json!({ "flags": [{ "description": "no name" }] }))
            .unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));

        let err = RegistryConfig::from_value(json!({ "variants": [{ "identifier": "v" }] }))
            .unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));

        let err = RegistryConfig::from_value(json!({
            "variants": [{ "identifier": "v", "mods": [{ "flagName": "x" }] }]
        }))
        .unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));
    }

    #[test]
    fn test_explicit_null_mod_value_is_kept() {
        let config = RegistryConfig::from_value(json!({
            "variants": [{ "identifier": "v", "mods": [{ "flagName": "x", "value": null }] }]
        }))
        .unwrap();
        assert_eq!(config.variants[0].mods[0].value, Value::Null);
    }

    #[test]
    fn test_operator_is_kept_raw() {
        let config = RegistryConfig::from_value(json!({
            "variants": [{ "identifier": "v", "operator": 5, "mods": [{ "flagName": "x", "value": 1 }] }]
        }))
        .unwrap();
        assert_eq!(config.variants[0].operator, json!(5));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let err = RegistryConfig::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));

        let err = "not json".parse::<RegistryConfig>().unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));
    }

    #[test]
    fn test_builders_match_parsed_form() {
        let built = RegistryConfig::new()
            .with_flag(FlagRecord::new("x", 1).with_description("demo"))
            .with_variant(
                VariantRecord::new("v", Operator::Or)
                    .with_condition("RANDOM", 0.25)
                    .with_mod("x", 2),
            );

        let parsed = RegistryConfig::from_value(json!({
            "flags": [{ "name": "x", "description": "demo", "baseValue": 1 }],
            "variants": [{
                "identifier": "v",
                "operator": "OR",
                "conditions": [{ "type": "RANDOM", "params": 0.25 }],
                "mods": [{ "flagName": "x", "value": 2 }]
            }]
        }))
        .unwrap();

        assert_eq!(built, parsed);
    }
}
