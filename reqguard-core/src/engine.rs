// reqguard-core/src/engine.rs
//! Defines the `CustomRule` trait and the record context handed to it.
//!
//! Custom rules are the caller's extension point into a field's check chain.
//! They are opaque to the compiler: it stores them, the runner awaits them, and
//! nothing else is known about them. Every custom rule sees the value of the
//! field it is attached to plus read access to the whole record, so it can
//! implement cross-field logic the built-in rules do not cover.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Read-only view of the record being validated.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    record: &'a Map<String, Value>,
    field: &'a str,
}

impl<'a> RecordContext<'a> {
    pub fn new(record: &'a Map<String, Value>, field: &'a str) -> Self {
        Self { record, field }
    }

    /// The field the current rule is attached to.
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Looks up any field of the record by name.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.record.get(name)
    }

    /// The full record, after transforms such as `default` have been applied.
    pub fn record(&self) -> &'a Map<String, Value> {
        self.record
    }
}

/// A caller-supplied predicate integrated into a field's check chain.
///
/// Returning `Ok(false)` records the generic `"<field> is invalid"` message.
/// Returning `Err(e)` records `e.to_string()`, so implementations can report a
/// precise reason by failing with a message.
#[async_trait]
pub trait CustomRule: Send + Sync {
    /// Evaluates the rule. `value` is `None` when the field was not submitted.
    async fn check(&self, value: Option<&Value>, ctx: &RecordContext<'_>) -> Result<bool>;

    /// A short name used in debug logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Shared handle to a custom rule, cheap to clone into many field specs.
pub type CustomRuleRef = Arc<dyn CustomRule>;

/// Adapter turning a synchronous closure into a `CustomRule`.
pub struct FnRule<F> {
    name: String,
    func: F,
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> CustomRule for FnRule<F>
where
    F: Fn(Option<&Value>, &RecordContext<'_>) -> Result<bool> + Send + Sync,
{
    async fn check(&self, value: Option<&Value>, ctx: &RecordContext<'_>) -> Result<bool> {
        (self.func)(value, ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wraps a closure as a shareable custom rule.
///
/// ```rust
/// use reqguard_core::engine::rule_fn;
///
/// let not_admin = rule_fn("not_admin", |value, _ctx| {
///     Ok(value.and_then(|v| v.as_str()) != Some("admin"))
/// });
/// assert_eq!(not_admin.name(), "not_admin");
/// ```
pub fn rule_fn<F>(name: impl Into<String>, func: F) -> CustomRuleRef
where
    F: Fn(Option<&Value>, &RecordContext<'_>) -> Result<bool> + Send + Sync + 'static,
{
    Arc::new(FnRule {
        name: name.into(),
        func,
    })
}
