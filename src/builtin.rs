//! Built-in condition types.
//!
//! Every registry starts with two condition types:
//!
//! - [`RANDOM`]: active with probability `p`, re-drawn on every evaluation.
//! - [`MOD_RANGE`]: hashes the context into one of `m` buckets and is
//!   active when the bucket falls inside `[lo, hi)`. Sticky: the same
//!   context always lands in the same bucket.

use crate::condition::{Condition, ConditionSpec, Evaluator};
use crate::error::{Result, VariantError};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::trace;

/// Identifier of the probabilistic condition type.
pub const RANDOM: &str = "RANDOM";

/// Identifier of the hash-bucket condition type.
pub const MOD_RANGE: &str = "MOD_RANGE";

/// The built-in condition types, in registration order.
pub(crate) fn builtin_specs() -> [(&'static str, ConditionSpec); 2] {
    let random: ConditionSpec =
        Arc::new(|params: &Value| RandomCondition::from_params(params).map(Condition::new));
    let mod_range: ConditionSpec =
        Arc::new(|params: &Value| ModRangeCondition::from_params(params).map(Condition::new));
    [(RANDOM, random), (MOD_RANGE, mod_range)]
}

/// Active with a fixed probability, independent of context.
///
/// Parameters: a bare number, or `{"probability": p}`, with `p` in `[0, 1]`.
///
/// # Examples
///
/// ```rust
/// use variantly::builtin::RandomCondition;
/// use variantly::Evaluator;
///
/// let always = RandomCondition::new(1.0).unwrap();
/// assert!(always.evaluate(None));
///
/// assert!(RandomCondition::new(1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomCondition {
    probability: f64,
}

impl RandomCondition {
    /// A condition holding with chance `probability` on each evaluation.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` unless `probability` is a finite number in `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(VariantError::malformed(format!(
                "{RANDOM} probability must be within [0, 1], got {probability}"
            )));
        }
        Ok(Self { probability })
    }

    /// Parse `RANDOM` parameters: a bare number or `{"probability": p}`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::RandomCondition;
    /// use serde_json::json;
    ///
    /// let a = RandomCondition::from_params(&json!(0.25)).unwrap();
    /// let b = RandomCondition::from_params(&json!({ "probability": 0.25 })).unwrap();
    /// assert_eq!(a.probability(), b.probability());
    /// assert!(RandomCondition::from_params(&json!("half")).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// `MalformedConfig` for any other shape or an out-of-range probability.
    pub fn from_params(params: &Value) -> Result<Self> {
        let probability = match params {
            Value::Number(n) => n.as_f64(),
            Value::Object(map) => map.get("probability").and_then(Value::as_f64),
            _ => None,
        }
        .ok_or_else(|| {
            VariantError::malformed(format!(
                "{RANDOM} expects a probability number, got {params}"
            ))
        })?;
        Self::new(probability)
    }

    /// The chance, in `[0, 1]`, that an evaluation holds.
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Evaluator for RandomCondition {
    fn evaluate(&self, _context: Option<&Value>) -> bool {
        rand::rng().random::<f64>() < self.probability
    }

    fn describe(&self) -> String {
        format!("{RANDOM}({})", self.probability)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModRangeParams {
    Named {
        modulus: u64,
        range: [u64; 2],
        #[serde(default)]
        key: Option<String>,
    },
    Positional(u64, u64, u64),
}

/// Deterministic hash-bucket condition.
///
/// Parameters: `{"modulus": m, "range": [lo, hi]}` with an optional
/// `"key"` naming a field of an object context, or `[m, lo, hi]`.
/// Requires `m >= 1` and `lo <= hi <= m`.
///
/// The context (or the keyed field) is hashed with SHA-256; the first
/// eight digest bytes, big-endian, modulo `m` give the bucket. Strings
/// hash their raw UTF-8 bytes, every other value its compact JSON form.
/// An absent or `null` context, a non-object context when a key is set,
/// or a missing key all evaluate to `false`.
///
/// # Examples
///
/// ```rust
/// use variantly::builtin::ModRangeCondition;
/// use variantly::Evaluator;
/// use serde_json::json;
///
/// let everyone = ModRangeCondition::new(10, 0, 10).unwrap();
/// assert!(everyone.evaluate(Some(&json!("user-42"))));
/// assert!(!everyone.evaluate(None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRangeCondition {
    modulus: u64,
    start: u64,
    end: u64,
    key: Option<String>,
}

impl ModRangeCondition {
    /// Bucket the whole context into `modulus` buckets, active for `[start, end)`.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` if `modulus` is zero or the range is not
    /// `start <= end <= modulus`.
    pub fn new(modulus: u64, start: u64, end: u64) -> Result<Self> {
        if modulus == 0 {
            return Err(VariantError::malformed(format!(
                "{MOD_RANGE} modulus must be at least 1"
            )));
        }
        if start > end || end > modulus {
            return Err(VariantError::malformed(format!(
                "{MOD_RANGE} range [{start}, {end}) does not fit modulus {modulus}"
            )));
        }
        Ok(Self {
            modulus,
            start,
            end,
            key: None,
        })
    }

    /// Bucket on one field of an object context instead of the whole context.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Parse `MOD_RANGE` parameters.
    ///
    /// Accepts `{"modulus": m, "range": [lo, hi], "key": k}` (with `key`
    /// optional) or the positional form `[m, lo, hi]`.
    ///
    /// # Errors
    ///
    /// `MalformedConfig` for any other shape or for bounds rejected by
    /// [`ModRangeCondition::new`].
    pub fn from_params(params: &Value) -> Result<Self> {
        let parsed = ModRangeParams::deserialize(params).map_err(|_| {
            VariantError::malformed(format!(
                "{MOD_RANGE} expects {{\"modulus\": m, \"range\": [lo, hi]}} or [m, lo, hi], got {params}"
            ))
        })?;
        match parsed {
            ModRangeParams::Named {
                modulus,
                range: [start, end],
                key,
            } => {
                let condition = Self::new(modulus, start, end)?;
                Ok(match key {
                    Some(key) => condition.with_key(key),
                    None => condition,
                })
            }
            ModRangeParams::Positional(modulus, start, end) => Self::new(modulus, start, end),
        }
    }

    /// The bucket a value hashes into.
    ///
    /// The SHA-256 input is the raw UTF-8 of a string, and compact JSON with
    /// object keys sorted at every depth for anything else. The first eight
    /// digest bytes, read big-endian, are reduced modulo `modulus`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use variantly::ModRangeCondition;
    /// use serde_json::json;
    ///
    /// let condition = ModRangeCondition::new(100, 0, 50).unwrap();
    /// assert_eq!(condition.bucket(&json!("user-42")), 29);
    /// assert_eq!(
    ///     condition.bucket(&json!({ "a": "x", "b": 2 })),
    ///     condition.bucket(&json!({ "b": 2, "a": "x" })),
    /// );
    /// ```
    pub fn bucket(&self, value: &Value) -> u64 {
        let mut hasher = Sha256::new();
        match value {
            Value::String(s) => hasher.update(s.as_bytes()),
            other => hash_canonical(&mut hasher, other),
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix) % self.modulus
    }

    fn subject<'a>(&self, context: Option<&'a Value>) -> Option<&'a Value> {
        let context = context?;
        let subject = match &self.key {
            Some(key) => context.as_object()?.get(key)?,
            None => context,
        };
        (!subject.is_null()).then_some(subject)
    }
}

/// Feed `value` to `hasher` as compact JSON with object keys sorted.
///
/// The output is the same whether or not serde_json's `preserve_order`
/// feature is enabled.
fn hash_canonical(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Array(items) => {
            hasher.update(b"[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                hash_canonical(hasher, item);
            }
            hasher.update(b"]");
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            hasher.update(b"{");
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                hasher.update(Value::from(key.as_str()).to_string().as_bytes());
                hasher.update(b":");
                hash_canonical(hasher, item);
            }
            hasher.update(b"}");
        }
        scalar => hasher.update(scalar.to_string().as_bytes()),
    }
}

impl Evaluator for ModRangeCondition {
    fn evaluate(&self, context: Option<&Value>) -> bool {
        let Some(subject) = self.subject(context) else {
            trace!(condition = %self.describe(), "no usable context, failing closed");
            return false;
        };
        let bucket = self.bucket(subject);
        self.start <= bucket && bucket < self.end
    }

    fn describe(&self) -> String {
        match &self.key {
            Some(key) => format!(
                "{MOD_RANGE}({key} % {} in [{}, {}))",
                self.modulus, self.start, self.end
            ),
            None => format!(
                "{MOD_RANGE}(% {} in [{}, {}))",
                self.modulus, self.start, self.end
            ),
        }
    }
}
