//! Error types for configuration loading and flag resolution.
//!
//! Every fallible operation in the crate returns a `VariantError`.

use crate::name::FlagName;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = VariantError> = std::result::Result<T, E>;

/// Errors that can occur while registering condition types, loading
/// configuration, or resolving flags.
///
/// # Examples
///
/// ```rust
/// use variantly::{ErrorKind, FlagName, VariantError};
///
/// let err = VariantError::UnknownFlag(FlagName::new("missing"));
/// assert_eq!(err.to_string(), "Unknown flag: missing");
/// assert_eq!(err.kind(), ErrorKind::UnknownFlag);
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VariantError {
    /// A record is missing required fields or has the wrong shape.
    #[error("Malformed configuration: {0}")]
    MalformedConfig(String),

    /// A condition type was registered under an identifier that is
    /// already taken (built-ins included).
    #[error("Condition type already registered: {0}")]
    DuplicateConditionType(String),

    /// A variant references a condition type that was never registered.
    #[error("Unknown condition type: {0}")]
    UnknownConditionType(String),

    /// A variant operator is neither `AND` nor `OR`.
    #[error("Invalid operator: {0:?} (expected \"AND\" or \"OR\")")]
    InvalidOperator(String),

    /// A variant carries no mods.
    #[error("Invalid variant {0}: a variant needs at least one mod")]
    InvalidVariant(String),

    /// A flag was queried that the registry does not know.
    #[error("Unknown flag: {0}")]
    UnknownFlag(FlagName),
}

/// The kind of a [`VariantError`], without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedConfig,
    DuplicateConditionType,
    UnknownConditionType,
    InvalidOperator,
    InvalidVariant,
    UnknownFlag,
}

impl VariantError {
    /// Shorthand for building a `MalformedConfig` error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedConfig(message.into())
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedConfig(_) => ErrorKind::MalformedConfig,
            Self::DuplicateConditionType(_) => ErrorKind::DuplicateConditionType,
            Self::UnknownConditionType(_) => ErrorKind::UnknownConditionType,
            Self::InvalidOperator(_) => ErrorKind::InvalidOperator,
            Self::InvalidVariant(_) => ErrorKind::InvalidVariant,
            Self::UnknownFlag(_) => ErrorKind::UnknownFlag,
        }
    }
}

impl From<serde_json::Error> for VariantError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedConfig(err.to_string())
    }
}
