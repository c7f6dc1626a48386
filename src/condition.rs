//! Conditions module.
//!
//! A condition is a single predicate over an optional context value. The
//! variant that owns it decides, through its operator, how several
//! conditions combine. Conditions are produced from configuration by a
//! [`ConditionSpec`] registered under a condition-type identifier.

use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Trait for condition predicates.
///
/// Implementations must be cheap, must not block, and must not panic on
/// any input: a context they cannot use is answered with `false`.
///
/// Any `Fn(Option<&Value>) -> bool + Send + Sync` is an evaluator.
///
/// # Examples
///
/// ```rust
/// use variantly::Evaluator;
/// use serde_json::{json, Value};
///
/// let is_admin = |ctx: Option<&Value>| ctx.and_then(|v| v["role"].as_str()) == Some("admin");
///
/// assert!(is_admin.evaluate(Some(&json!({"role": "admin"}))));
/// assert!(!is_admin.evaluate(None));
/// ```
pub trait Evaluator: Send + Sync {
    /// Test the predicate against a context (`None` when the caller gave none).
    fn evaluate(&self, context: Option<&Value>) -> bool;

    /// Human-readable description, shown in `Debug` output.
    fn describe(&self) -> String {
        String::from("custom")
    }
}

impl<F> Evaluator for F
where
    F: Fn(Option<&Value>) -> bool + Send + Sync,
{
    fn evaluate(&self, context: Option<&Value>) -> bool {
        self(context)
    }
}

/// Builds a [`Condition`] from configuration parameters.
///
/// Specs must be pure: the registry calls them once per condition entry
/// on every configuration load. A spec that cannot use its parameters
/// returns `MalformedConfig`.
pub type ConditionSpec = Arc<dyn Fn(&Value) -> Result<Condition> + Send + Sync>;

/// A materialized predicate owned by a variant.
///
/// Cloning a condition shares the underlying predicate.
///
/// # Examples
///
/// ```rust
/// use variantly::Condition;
/// use serde_json::{json, Value};
///
/// let has_context = Condition::from_fn(|ctx: Option<&Value>| ctx.is_some());
///
/// assert!(has_context.evaluate(Some(&json!(42))));
/// assert!(!has_context.evaluate(None));
/// ```
#[derive(Clone)]
pub struct Condition {
    evaluator: Arc<dyn Evaluator>,
}

impl Condition {
    /// Wrap an evaluator.
    pub fn new(evaluator: impl Evaluator + 'static) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }

    /// Wrap a closure.
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self::new(predicate)
    }

    /// A condition that always holds.
    pub fn always() -> Self {
        Self::new(Constant(true))
    }

    /// A condition that never holds.
    pub fn never() -> Self {
        Self::new(Constant(false))
    }

    /// Test this condition against a context.
    pub fn evaluate(&self, context: Option<&Value>) -> bool {
        self.evaluator.evaluate(context)
    }

    /// A short label for logs and `Debug` output.
    pub fn describe(&self) -> String {
        self.evaluator.describe()
    }
}

impl std::fmt::Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition")
            .field("evaluator", &format!("<{}>", self.evaluator.describe()))
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Constant(bool);

impl Evaluator for Constant {
    fn evaluate(&self, _context: Option<&Value>) -> bool {
        self.0
    }

    fn describe(&self) -> String {
        format!("constant {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_constant_conditions() {
        assert!(Condition::always().evaluate(None));
        assert!(Condition::always().evaluate(Some(&json!("user-1"))));
        assert!(!Condition::never().evaluate(None));
        assert!(!Condition::never().evaluate(Some(&json!("user-1"))));
    }

    #[test]
    fn test_closure_sees_context() {
        let even = Condition::from_fn(|ctx: Option<&Value>| {
            ctx.and_then(Value::as_u64).is_some_and(|n| n % 2 == 0)
        });
        assert!(even.evaluate(Some(&json!(4))));
        assert!(!even.evaluate(Some(&json!(5))));
        assert!(!even.evaluate(Some(&json!("four"))));
        assert!(!even.evaluate(None));
    }

    #[test]
    fn test_clone_shares_predicate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let condition = Condition::from_fn(move |_: Option<&Value>| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let copy = condition.clone();

        condition.evaluate(None);
        copy.evaluate(None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_uses_description() {
        let debug = format!("{:?}", Condition::never());
        assert!(debug.contains("constant false"));
    }
}
