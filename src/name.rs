//! Flag name module.
//!
//! Provides the `FlagName` type, an interned string identifier for
//! flags and mod targets. Uses `Arc<str>` so names are cheap to clone
//! into snapshots, mods, and errors.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::sync::Arc;

/// Interned string identifier for flags.
///
/// # Examples
///
/// ```rust
/// use variantly::FlagName;
///
/// let a = FlagName::new("enable_dark_mode");
/// let b: FlagName = "enable_dark_mode".into();
/// let c: FlagName = String::from("enable_dark_mode").into();
///
/// assert_eq!(a, b);
/// assert_eq!(a, c);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlagName(Arc<str>);

impl Serialize for FlagName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FlagName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(FlagName::from(s))
    }
}

impl FlagName {
    /// Create a new `FlagName` from a string slice.
    ///
    /// No validation happens here; emptiness is checked by the
    /// constructors of [`Flag`](crate::Flag) and [`Mod`](crate::Mod).
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the string representation of this name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::FlagName;
    ///
    /// assert_eq!(FlagName::new("max_items").as_str(), "max_items");
    /// ```
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for FlagName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FlagName {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl Borrow<str> for FlagName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FlagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FlagName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl std::fmt::Display for FlagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_flag_name_creation() {
        let a = FlagName::new("x");
        let b = FlagName::new("x");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "x");
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(FlagName::new("timeout_ms"), 30);
        assert_eq!(map.get("timeout_ms"), Some(&30));
    }

    #[test]
    fn test_blank_names() {
        assert!(FlagName::new("").is_blank());
        assert!(FlagName::new("   ").is_blank());
        assert!(!FlagName::new("a").is_blank());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let name = FlagName::new("beta");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"beta\"");
        let back: FlagName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
