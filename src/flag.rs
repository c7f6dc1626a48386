//! Flag module.
//!
//! A `Flag` is a named value with a default. Variants may override the
//! default through mods; when none applies, the base value is returned.

use crate::config::FlagRecord;
use crate::error::{Result, VariantError};
use crate::name::FlagName;
use serde::Serialize;
use serde_json::Value;

/// A named setting with a base value.
///
/// Flags are immutable once built. A configuration reload replaces them
/// wholesale.
///
/// # Examples
///
/// ```rust
/// use variantly::Flag;
/// use serde_json::json;
///
/// let flag = Flag::new("max_items", "Items shown per page", json!(10)).unwrap();
/// assert_eq!(flag.name().as_str(), "max_items");
/// assert_eq!(flag.base_value(), &json!(10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flag {
    name: FlagName,
    description: String,
    base_value: Value,
}

impl Flag {
    /// Create a flag directly.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if `name` is empty or whitespace.
    pub fn new(
        name: impl Into<FlagName>,
        description: impl Into<String>,
        base_value: impl Into<Value>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_blank() {
            return Err(VariantError::malformed("flag name must not be empty"));
        }
        Ok(Self {
            name,
            description: description.into(),
            base_value: base_value.into(),
        })
    }

    /// Create a flag from a configuration record.
    ///
    /// Equivalent to calling [`Flag::new`] with the record's fields.
    pub fn from_record(record: FlagRecord) -> Result<Self> {
        Self::new(record.name, record.description, record.base_value)
    }

    /// The flag's unique name.
    pub fn name(&self) -> &FlagName {
        &self.name
    }

    /// Human-readable description; empty when none was given.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The value returned when no active variant overrides this flag.
    pub fn base_value(&self) -> &Value {
        &self.base_value
    }
}

impl TryFrom<FlagRecord> for Flag {
    type Error = VariantError;

    fn try_from(record: FlagRecord) -> Result<Self> {
        Self::from_record(record)
    }
}
