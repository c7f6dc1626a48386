//! Mods: the flag overrides a variant applies while it is active.

use crate::config::ModRecord;
use crate::error::{Result, VariantError};
use crate::name::FlagName;
use serde::Serialize;
use serde_json::Value;

/// A `(flag name, replacement value)` pair.
///
/// The flag name does not have to exist in the registry. A mod for an
/// unknown flag is inert.
///
/// # Examples
///
/// ```rust
/// use variantly::Mod;
/// use serde_json::json;
///
/// let m = Mod::new("max_items", json!(25)).unwrap();
/// assert_eq!(m.flag_name().as_str(), "max_items");
/// assert_eq!(m.value(), &json!(25));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mod {
    flag_name: FlagName,
    value: Value,
}

impl Mod {
    /// Create a mod setting `flag_name` to `value`.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if `flag_name` is empty.
    pub fn new(flag_name: impl Into<FlagName>, value: impl Into<Value>) -> Result<Self> {
        let flag_name = flag_name.into();
        if flag_name.is_blank() {
            return Err(VariantError::malformed("mod flag name must not be empty"));
        }
        Ok(Self {
            flag_name,
            value: value.into(),
        })
    }

    /// Create a mod from a configuration record.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if the record's flag name is empty.
    pub fn from_record(record: ModRecord) -> Result<Self> {
        Self::new(record.flag_name, record.value)
    }

    /// The flag this mod overrides.
    pub fn flag_name(&self) -> &FlagName {
        &self.flag_name
    }

    /// The override value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}
