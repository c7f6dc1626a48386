//! # variantly - Declarative Feature Flags and Experiment Variants
//!
//! An evaluation engine for feature flags, A/B tests, and staged rollouts:
//! - **Flags** carry a base value
//! - **Variants** override flag values while their conditions hold
//! - **Condition types** are an open, identifier-keyed set of predicate
//!   factories (`RANDOM` and `MOD_RANGE` are built in)
//! - **Reloads** are atomic: readers see the old configuration or the new
//!   one, never a mix
//!
//! ## Core Concepts
//!
//! ```text
//! [Registry] -> [Variant] -> [Condition]*   (is the variant active?)
//!                         -> [Mod]*         (what does it change?)
//! ```
//!
//! For `flag_value(name, context)` the registry scans variants in
//! configuration order. Among the active variants that carry a mod for
//! `name`, the last one wins. When none does, the flag's base value is
//! returned.
//!
//! ## Example
//!
//! ```rust
//! use variantly::*;
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry
//!     .load_config_from_slice(br#"{
//!         "flags": [
//!             { "name": "checkout_flow", "description": "Checkout UI", "baseValue": "classic" }
//!         ],
//!         "variants": [{
//!             "identifier": "half_of_users",
//!             "operator": "AND",
//!             "conditions": [{ "type": "MOD_RANGE", "params": { "modulus": 100, "range": [0, 50] } }],
//!             "mods": [{ "flagName": "checkout_flow", "value": "one_page" }]
//!         }]
//!     }"#)
//!     .unwrap();
//!
//! let user = json!("user-8812");
//! let first = registry.flag_value("checkout_flow", Some(&user)).unwrap();
//! let again = registry.flag_value("checkout_flow", Some(&user)).unwrap();
//! assert_eq!(first, again); // MOD_RANGE is sticky per context
//!
//! // Without a context MOD_RANGE fails closed and the base value applies.
//! assert_eq!(registry.flag_value_without_context("checkout_flow").unwrap(), json!("classic"));
//! ```
//!
//! ## Modules
//!
//! - [`registry`] - Flag registry, resolution, and configuration loading
//! - [`variant`] - Variants and their operator
//! - [`condition`] - Condition predicates and specs
//! - [`condition_type`] - Identifier-keyed condition spec table
//! - [`builtin`] - The `RANDOM` and `MOD_RANGE` condition types
//! - [`modifier`] - Mods (flag overrides)
//! - [`flag`] - Flags
//! - [`config`] - Configuration records
//! - [`resolved`] - Resolution results with provenance
//! - [`name`] - Flag name type
//! - [`error`] - Error types

pub mod builtin;
pub mod condition;
pub mod condition_type;
pub mod config;
pub mod error;
pub mod flag;
pub mod modifier;
pub mod name;
pub mod registry;
pub mod resolved;
pub mod variant;

// Re-export main types for convenience
pub use condition::{Condition, ConditionSpec, Evaluator};
pub use condition_type::ConditionTypeRegistry;
pub use config::RegistryConfig;
pub use error::{ErrorKind, VariantError};
pub use flag::Flag;
pub use modifier::Mod;
pub use name::FlagName;
pub use registry::{Registry, RegistryChanged};
pub use resolved::{ResolvedFlag, ValueSource};
pub use variant::{Operator, Variant};

// Re-export built-in condition types
pub use builtin::{ModRangeCondition, RandomCondition, MOD_RANGE, RANDOM};
