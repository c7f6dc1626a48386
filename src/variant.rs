//! Variants module.
//!
//! A variant is a named rule: conditions, the operator combining them,
//! and the mods it applies while active.

use crate::condition::Condition;
use crate::condition_type::ConditionTypeRegistry;
use crate::config::VariantRecord;
use crate::error::{Result, VariantError};
use crate::modifier::Mod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// How a variant combines its conditions.
///
/// Written as `"AND"` or `"OR"` in configuration; nothing else parses.
///
/// # Examples
///
/// ```rust
/// use variantly::Operator;
///
/// assert_eq!("AND".parse::<Operator>().unwrap(), Operator::And);
/// assert_eq!("OR".parse::<Operator>().unwrap(), Operator::Or);
/// assert!("and".parse::<Operator>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    /// Every condition must hold.
    #[default]
    #[serde(rename = "AND")]
    And,
    /// At least one condition must hold.
    #[serde(rename = "OR")]
    Or,
}

impl Operator {
    /// The configuration spelling, `"AND"` or `"OR"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl FromStr for Operator {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AND" => Ok(Operator::And),
            "OR" => Ok(Operator::Or),
            other => Err(VariantError::InvalidOperator(other.to_owned())),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named rule applying mods when its conditions hold.
///
/// # Examples
///
/// ```rust
/// use variantly::{Condition, Mod, Operator, Variant};
/// use serde_json::json;
///
/// let variant = Variant::new(
///     "big_pages",
///     Operator::And,
///     vec![Condition::always()],
///     vec![Mod::new("max_items", json!(50)).unwrap()],
/// )
/// .unwrap();
///
/// assert!(variant.evaluate(None));
/// assert_eq!(variant.value_for_flag("max_items"), Some(&json!(50)));
/// assert_eq!(variant.value_for_flag("other"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Variant {
    identifier: String,
    operator: Operator,
    conditions: Vec<Condition>,
    mods: Vec<Mod>,
}

impl Variant {
    /// Create a variant directly.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if `identifier` is empty; `InvalidVariant` if
    /// `mods` is empty.
    pub fn new(
        identifier: impl Into<String>,
        operator: Operator,
        conditions: Vec<Condition>,
        mods: Vec<Mod>,
    ) -> Result<Self> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(VariantError::malformed("variant identifier must not be empty"));
        }
        if mods.is_empty() {
            return Err(VariantError::InvalidVariant(identifier));
        }
        Ok(Self {
            identifier,
            operator,
            conditions,
            mods,
        })
    }

    /// Build a variant from its configuration record, materializing each
    /// condition through `condition_types`.
    ///
    /// # Errors
    ///
    /// `InvalidOperator`, `UnknownConditionType`, any error raised by a
    /// condition spec, `MalformedConfig` for an empty identifier or mod
    /// flag name, and `InvalidVariant` for an empty mod list.
    pub fn from_record(
        record: VariantRecord,
        condition_types: &ConditionTypeRegistry,
    ) -> Result<Self> {
        let operator: Operator = match &record.operator {
            Value::String(s) => s.parse()?,
            other => return Err(VariantError::InvalidOperator(other.to_string())),
        };
        let conditions = record
            .conditions
            .iter()
            .map(|c| condition_types.build(&c.condition_type, &c.params))
            .collect::<Result<Vec<_>>>()?;
        let mods = record
            .mods
            .into_iter()
            .map(Mod::from_record)
            .collect::<Result<Vec<_>>>()?;
        Self::new(record.identifier, operator, conditions, mods)
    }

    /// Whether this variant is active for `context`.
    ///
    /// A variant without conditions is always active. Otherwise `And`
    /// requires every condition and `Or` any condition, evaluated in list
    /// order and short-circuiting.
    pub fn evaluate(&self, context: Option<&Value>) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match self.operator {
            Operator::And => self.conditions.iter().all(|c| c.evaluate(context)),
            Operator::Or => self.conditions.iter().any(|c| c.evaluate(context)),
        }
    }

    /// The value this variant assigns to `flag_name`, if any.
    ///
    /// When several mods target the same flag, the first one listed wins.
    pub fn value_for_flag(&self, flag_name: &str) -> Option<&Value> {
        self.mods
            .iter()
            .find(|m| m.flag_name().as_str() == flag_name)
            .map(Mod::value)
    }

    /// The variant's unique identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// How the conditions are combined.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The conditions, in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The mods, in listed order.
    pub fn mods(&self) -> &[Mod] {
        &self.mods
    }
}
