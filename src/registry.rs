//! Registry module.
//!
//! Provides the `Registry` type, the main entry point of the crate. It
//! owns flags, variants, and condition types, resolves flag values, and
//! swaps in new configurations atomically.

use crate::condition::{Condition, ConditionSpec};
use crate::condition_type::ConditionTypeRegistry;
use crate::config::RegistryConfig;
use crate::error::{Result, VariantError};
use crate::flag::Flag;
use crate::name::FlagName;
use crate::resolved::ResolvedFlag;
use crate::variant::Variant;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Buffered change events per subscriber before it starts lagging.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Published after every successful configuration load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryChanged {
    /// [`Registry::id`] of the registry that changed.
    pub registry_id: u64,
}

/// One complete configuration: flags plus variants in precedence order.
#[derive(Debug, Default)]
struct Snapshot {
    flags: HashMap<FlagName, Flag>,
    variants: Vec<Variant>,
}

impl Snapshot {
    fn build(config: &RegistryConfig, condition_types: &ConditionTypeRegistry) -> Result<Self> {
        let mut flags = HashMap::with_capacity(config.flags.len());
        for record in &config.flags {
            let flag = Flag::from_record(record.clone())?;
            if flags.contains_key(flag.name()) {
                return Err(VariantError::malformed(format!(
                    "duplicate flag name: {}",
                    flag.name()
                )));
            }
            flags.insert(flag.name().clone(), flag);
        }

        let mut seen = HashSet::with_capacity(config.variants.len());
        let mut variants = Vec::with_capacity(config.variants.len());
        for record in &config.variants {
            let variant = Variant::from_record(record.clone(), condition_types)?;
            if !seen.insert(variant.identifier().to_owned()) {
                return Err(VariantError::malformed(format!(
                    "duplicate variant identifier: {}",
                    variant.identifier()
                )));
            }
            variants.push(variant);
        }

        Ok(Self { flags, variants })
    }
}

/// Flag registry and resolver.
///
/// Resolution scans variants in registration order. Among the active
/// variants that carry a mod for the requested flag, the last one wins;
/// with none, the flag's base value is returned.
///
/// All methods take `&self`; share a registry across threads with `Arc`.
/// Readers never observe a partially loaded configuration.
///
/// # Examples
///
/// ```rust
/// use variantly::Registry;
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry
///     .load_config_from_value(json!({
///         "flags": [{ "name": "max_items", "baseValue": 10 }],
///         "variants": [{
///             "identifier": "everyone",
///             "operator": "AND",
///             "conditions": [{ "type": "RANDOM", "params": 1.0 }],
///             "mods": [{ "flagName": "max_items", "value": 25 }]
///         }]
///     }))
///     .unwrap();
///
/// assert_eq!(registry.flag_value_without_context("max_items").unwrap(), json!(25));
/// ```
pub struct Registry {
    id: u64,
    condition_types: RwLock<ConditionTypeRegistry>,
    snapshot: RwLock<Arc<Snapshot>>,
    load_lock: Mutex<()>,
    changes: broadcast::Sender<RegistryChanged>,
}

impl Registry {
    /// Create an empty registry holding only the built-in condition types.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            condition_types: RwLock::new(ConditionTypeRegistry::new()),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            load_lock: Mutex::new(()),
            changes,
        }
    }

    /// Process-unique identifier, carried by [`RegistryChanged`].
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Resolve the effective value of a flag.
    ///
    /// # Errors
    ///
    /// `UnknownFlag` if no flag named `name` is loaded.
    pub fn flag_value(&self, name: &str, context: Option<&Value>) -> Result<Value> {
        self.resolve(name, context).map(|resolved| resolved.value)
    }

    /// Same as [`flag_value`](Self::flag_value) with no context.
    pub fn flag_value_without_context(&self, name: &str) -> Result<Value> {
        self.flag_value(name, None)
    }

    /// Resolve a flag and report which variant supplied the value.
    ///
    /// Applies the same precedence as [`flag_value`](Self::flag_value).
    ///
    /// # Errors
    ///
    /// `UnknownFlag` if no flag named `name` is loaded.
    pub fn resolve(&self, name: &str, context: Option<&Value>) -> Result<ResolvedFlag> {
        let snapshot = self.current();
        let flag = snapshot
            .flags
            .get(name)
            .ok_or_else(|| VariantError::UnknownFlag(FlagName::new(name)))?;

        let mut resolved = ResolvedFlag::new(flag.name().clone(), flag.base_value().clone());
        for variant in &snapshot.variants {
            if !variant.evaluate(context) {
                continue;
            }
            resolved.active_variants.push(variant.identifier().to_owned());
            if let Some(value) = variant.value_for_flag(name) {
                resolved.apply(variant.identifier(), value);
            }
        }

        trace!(flag = name, source = ?resolved.source, "flag resolved");
        Ok(resolved)
    }

    /// Register a condition type usable by subsequent loads.
    ///
    /// # Errors
    ///
    /// `DuplicateConditionType` if `identifier` is taken, built-ins
    /// included. The registry is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::{Condition, Registry, VariantError};
    /// use serde_json::Value;
    ///
    /// let registry = Registry::new();
    /// registry
    ///     .register_condition_type("ALWAYS", |_: &Value| Ok(Condition::always()))
    ///     .unwrap();
    ///
    /// let err = registry
    ///     .register_condition_type("RANDOM", |_: &Value| Ok(Condition::never()))
    ///     .unwrap_err();
    /// assert!(matches!(err, VariantError::DuplicateConditionType(_)));
    /// ```
    pub fn register_condition_type<F>(&self, identifier: impl Into<String>, spec: F) -> Result<()>
    where
        F: Fn(&Value) -> Result<Condition> + Send + Sync + 'static,
    {
        self.register_condition_spec(identifier, Arc::new(spec))
    }

    /// Register an already-shared condition spec.
    pub fn register_condition_spec(
        &self,
        identifier: impl Into<String>,
        spec: ConditionSpec,
    ) -> Result<()> {
        let identifier = identifier.into();
        self.condition_types
            .write()
            .register_spec(identifier.clone(), spec)?;
        debug!(registry = self.id, condition_type = %identifier, "condition type registered");
        Ok(())
    }

    /// Replace all flags and variants with those described by `config`.
    ///
    /// The new configuration is built and validated in full before it is
    /// installed; on any error the previous configuration stays in place.
    /// On success one [`RegistryChanged`] event is published.
    ///
    /// # Errors
    ///
    /// `MalformedConfig`, `UnknownConditionType`, `InvalidOperator`, or
    /// `InvalidVariant`.
    pub fn load_config(&self, config: &RegistryConfig) -> Result<()> {
        let _guard = self.load_lock.lock();

        let snapshot = {
            let condition_types = self.condition_types.read();
            Snapshot::build(config, &condition_types)
        }
        .inspect_err(|err| warn!(registry = self.id, error = %err, "configuration rejected"))?;

        let (flags, variants) = (snapshot.flags.len(), snapshot.variants.len());
        *self.snapshot.write() = Arc::new(snapshot);
        debug!(registry = self.id, flags, variants, "configuration loaded");

        // Having no subscribers is not an error.
        let _ = self.changes.send(RegistryChanged {
            registry_id: self.id,
        });
        Ok(())
    }

    /// Parse JSON bytes and load them.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if the bytes do not parse, otherwise as
    /// [`load_config`](Self::load_config).
    pub fn load_config_from_slice(&self, bytes: &[u8]) -> Result<()> {
        let config = RegistryConfig::from_slice(bytes)
            .inspect_err(|err| warn!(registry = self.id, error = %err, "configuration rejected"))?;
        self.load_config(&config)
    }

    /// Load an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// As [`load_config_from_slice`](Self::load_config_from_slice).
    pub fn load_config_from_value(&self, value: Value) -> Result<()> {
        let config = RegistryConfig::from_value(value)
            .inspect_err(|err| warn!(registry = self.id, error = %err, "configuration rejected"))?;
        self.load_config(&config)
    }

    /// Subscribe to change events.
    ///
    /// Events are published without waiting on subscribers; one that falls
    /// more than a few events behind receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryChanged> {
        self.changes.subscribe()
    }

    /// A loaded flag by name.
    pub fn flag(&self, name: &str) -> Option<Flag> {
        self.current().flags.get(name).cloned()
    }

    /// Names of all loaded flags, sorted.
    pub fn flag_names(&self) -> Vec<FlagName> {
        let mut names: Vec<FlagName> = self.current().flags.keys().cloned().collect();
        names.sort();
        names
    }

    /// Identifiers of all loaded variants, in registration order.
    pub fn variant_identifiers(&self) -> Vec<String> {
        self.current()
            .variants
            .iter()
            .map(|v| v.identifier().to_owned())
            .collect()
    }

    /// Whether a condition type is registered under `identifier`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::{Registry, MOD_RANGE};
    ///
    /// let registry = Registry::new();
    /// assert!(registry.has_condition_type(MOD_RANGE));
    /// assert!(!registry.has_condition_type("COUNTRY"));
    /// ```
    pub fn has_condition_type(&self, identifier: &str) -> bool {
        self.condition_types.read().contains(identifier)
    }

    /// Registered condition type identifiers, sorted.
    pub fn condition_type_identifiers(&self) -> Vec<String> {
        self.condition_types.read().identifiers()
    }

    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current();
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("flags", &snapshot.flags.len())
            .field("variants", &snapshot.variants.len())
            .field("condition_types", &self.condition_types.read().identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlagRecord, VariantRecord};
    use crate::variant::Operator;
    use serde_json::json;

    fn config() -> RegistryConfig {
        RegistryConfig::new()
            .with_flag(FlagRecord::new("x", 1))
            .with_flag(FlagRecord::new("y", "base"))
    }

    #[test]
    fn test_base_value_fallback() {
        let registry = Registry::new();
        registry.load_config(&config()).unwrap();
        assert_eq!(registry.flag_value_without_context("x").unwrap(), json!(1));
    }

    #[test]
    fn test_unknown_flag() {
        let registry = Registry::new();
        registry.load_config(&config()).unwrap();
        assert_eq!(
            registry.flag_value_without_context("does_not_exist").unwrap_err(),
            VariantError::UnknownFlag(FlagName::new("does_not_exist"))
        );
    }

    #[test]
    fn test_last_active_variant_wins() {
        let registry = Registry::new();
        let config = config()
            .with_variant(VariantRecord::new("a", Operator::And).with_mod("x", 2))
            .with_variant(VariantRecord::new("b", Operator::And).with_mod("x", 3));
        registry.load_config(&config).unwrap();

        let resolved = registry.resolve("x", None).unwrap();
        assert_eq!(resolved.value, json!(3));
        assert_eq!(resolved.active_variants, vec!["a", "b"]);
        assert_eq!(registry.flag_value("x", None).unwrap(), json!(3));
    }

    #[test]
    fn test_inactive_variant_is_skipped() {
        let registry = Registry::new();
        let config = config()
            .with_variant(VariantRecord::new("a", Operator::And).with_mod("x", 2))
            .with_variant(
                VariantRecord::new("off", Operator::And)
                    .with_condition("RANDOM", 0.0)
                    .with_mod("x", 3),
            );
        registry.load_config(&config).unwrap();
        assert_eq!(registry.flag_value("x", None).unwrap(), json!(2));
        assert_eq!(registry.flag_value("y", None).unwrap(), json!("base"));
    }

    #[test]
    fn test_flag_value_matches_resolve() {
        let registry = Registry::new();
        let config = config().with_variant(
            VariantRecord::new("half", Operator::And)
                .with_condition("MOD_RANGE", json!({ "modulus": 2, "range": [0, 1] }))
                .with_mod("x", 2),
        );
        registry.load_config(&config).unwrap();

        for i in 0..50 {
            let context = json!(format!("user-{i}"));
            assert_eq!(
                registry.flag_value("x", Some(&context)).unwrap(),
                registry.resolve("x", Some(&context)).unwrap().value
            );
        }
        assert_eq!(
            registry.flag_value("missing", None).unwrap_err(),
            registry.resolve("missing", None).unwrap_err()
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let registry = Registry::new();
        let err = registry
            .load_config(&config().with_flag(FlagRecord::new("x", 9)))
            .unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));

        let err = registry
            .load_config(
                &config()
                    .with_variant(VariantRecord::new("v", Operator::And).with_mod("x", 2))
                    .with_variant(VariantRecord::new("v", Operator::Or).with_mod("x", 3)),
            )
            .unwrap_err();
        assert!(matches!(err, VariantError::MalformedConfig(_)));
        assert!(registry.flag_names().is_empty());
    }

    #[test]
    fn test_queries() {
        let registry = Registry::new();
        let config = config()
            .with_variant(VariantRecord::new("second", Operator::And).with_mod("x", 2))
            .with_variant(VariantRecord::new("first", Operator::And).with_mod("y", 2));
        registry.load_config(&config).unwrap();

        assert_eq!(registry.flag_names(), vec![FlagName::new("x"), FlagName::new("y")]);
        assert_eq!(registry.variant_identifiers(), vec!["second", "first"]);
        assert_eq!(registry.flag("y").unwrap().base_value(), &json!("base"));
        assert!(registry.flag("z").is_none());
        assert!(registry.has_condition_type("MOD_RANGE"));
        assert_eq!(registry.condition_type_identifiers(), vec!["MOD_RANGE", "RANDOM"]);
    }

    #[test]
    fn test_registry_ids_are_distinct() {
        assert_ne!(Registry::new().id(), Registry::new().id());
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
        assert_send_sync::<Variant>();
    }
}
