//! checks.rs - Executable steps produced by the rule compiler.
//!
//! Every check honours the same contract: given the field name, the field's
//! current value and the record context, it either passes or yields exactly
//! one human-readable message. The message wording is part of the public
//! contract; callers parse it.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::engine::{CustomRuleRef, RecordContext};
use crate::rules::parser::{Condition, TypeRule};
use crate::sanitizer::Sanitizer;
use crate::validators;

/// What a bound rule measures, decided once per field from its tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// String length in characters (element count for arrays).
    Length,
    /// Numeric value.
    Numeric,
}

impl Measure {
    fn measure(&self, value: Option<&Value>) -> Option<f64> {
        let value = value?;
        match self {
            Measure::Length => validators::value_length(value).map(|len| len as f64),
            Measure::Numeric => validators::value_as_number(value),
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Measure::Length => " characters",
            Measure::Numeric => "",
        }
    }
}

/// One entry of a field's rule chain. The runner walks these in declaration
/// order, so a transform only affects the steps after it.
#[derive(Debug, Clone)]
pub enum Step {
    /// The value must be non-empty; a failure ends the field.
    Required,
    Transform(Transform),
    Check(Check),
}

/// Steps that rewrite the field value for the steps that follow.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Substitutes the literal when the value is missing, null or `""`.
    Default(String),
    /// Cleans every string inside the value.
    Sanitize(Sanitizer),
}

impl Transform {
    /// Returns the new value, or the message to report when the transform fails.
    pub fn apply(&self, field: &str, value: Option<Value>) -> Result<Option<Value>, String> {
        match self {
            Transform::Default(literal) => {
                if validators::is_empty(value.as_ref()) {
                    Ok(Some(Value::String(literal.clone())))
                } else {
                    Ok(value)
                }
            }
            Transform::Sanitize(sanitizer) => match value {
                Some(v) => sanitizer
                    .sanitize(&v)
                    .map(Some)
                    .map_err(|e| {
                        debug!(
                            target: "reqguard_core::runner",
                            "Sanitizing '{}' failed: {}",
                            field,
                            e
                        );
                        format!("{} is nested too deeply", field)
                    }),
                None => Ok(None),
            },
        }
    }
}

/// Parameterized predicates on the field's own value.
#[derive(Debug, Clone)]
pub enum BoundCheck {
    Min { measure: Measure, limit: f64 },
    Max { measure: Measure, limit: f64 },
    Between { measure: Measure, min: f64, max: f64 },
    Length { min: f64, max: f64 },
    In(Vec<String>),
    Regex(Regex),
}

/// Predicates that consult another field of the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossFieldCheck {
    Same(String),
    RequiredIf(Condition),
    RequiredUnless(Condition),
    ProhibitedIf(Condition),
}

/// One step of a field's check chain.
#[derive(Clone)]
pub enum Check {
    Builtin(TypeRule),
    Bound(BoundCheck),
    CrossField(CrossFieldCheck),
    Custom(CustomRuleRef),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Builtin(rule) => f.debug_tuple("Builtin").field(rule).finish(),
            Check::Bound(bound) => f.debug_tuple("Bound").field(bound).finish(),
            Check::CrossField(cross) => f.debug_tuple("CrossField").field(cross).finish(),
            Check::Custom(rule) => f.debug_tuple("Custom").field(&rule.name()).finish(),
        }
    }
}

impl Check {
    /// Runs the check. `None` means it passed.
    pub async fn evaluate(
        &self,
        field: &str,
        value: Option<&Value>,
        ctx: &RecordContext<'_>,
    ) -> Option<String> {
        match self {
            Check::Builtin(rule) => {
                let passed = value.is_some_and(|v| rule.accepts(v));
                (!passed).then(|| rule.message(field))
            }
            Check::Bound(bound) => bound.evaluate(field, value),
            Check::CrossField(cross) => cross.evaluate(field, value, ctx),
            Check::Custom(rule) => match rule.check(value, ctx).await {
                Ok(true) => None,
                Ok(false) => Some(format!("{} is invalid", field)),
                Err(e) => {
                    debug!(
                        target: "reqguard_core::runner",
                        "Custom rule '{}' on '{}' rejected: {}",
                        rule.name(),
                        field,
                        e
                    );
                    Some(e.to_string())
                }
            },
        }
    }
}

impl TypeRule {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            TypeRule::String => validators::is_string(value),
            TypeRule::Integer => validators::is_integer(value),
            TypeRule::Numeric => validators::is_numeric(value),
            TypeRule::Boolean => validators::is_boolean(value),
            TypeRule::Email => validators::is_email(value),
            TypeRule::Url => validators::is_url(value),
            TypeRule::Array => validators::is_array(value),
            TypeRule::Object => validators::is_object(value),
            TypeRule::Json => validators::is_json(value),
            TypeRule::Uuid => validators::is_uuid(value),
            TypeRule::Alpha => validators::is_alpha(value),
            TypeRule::Alphanumeric => validators::is_alphanumeric(value),
            TypeRule::Date => validators::is_date(value),
        }
    }

    pub fn message(&self, field: &str) -> String {
        let constraint = match self {
            TypeRule::String => "a string",
            TypeRule::Integer => "an integer",
            TypeRule::Numeric => "a number",
            TypeRule::Boolean => "a boolean",
            TypeRule::Email => "a valid email",
            TypeRule::Url => "a valid URL",
            TypeRule::Array => "an array",
            TypeRule::Object => "an object",
            TypeRule::Json => "valid JSON",
            TypeRule::Uuid => "a valid UUID",
            TypeRule::Alpha => "alphabetic",
            TypeRule::Alphanumeric => "alphanumeric",
            TypeRule::Date => "a valid date",
        };
        format!("{} must be {}", field, constraint)
    }
}

impl BoundCheck {
    fn evaluate(&self, field: &str, value: Option<&Value>) -> Option<String> {
        match self {
            BoundCheck::Min { measure, limit } => {
                let passed = measure.measure(value).is_some_and(|n| n >= *limit);
                (!passed).then(|| format!("{} must be at least {}{}", field, limit, measure.unit()))
            }
            BoundCheck::Max { measure, limit } => {
                let passed = measure.measure(value).is_some_and(|n| n <= *limit);
                (!passed).then(|| format!("{} must be at most {}{}", field, limit, measure.unit()))
            }
            BoundCheck::Between { measure, min, max } => {
                let passed = measure.measure(value).is_some_and(|n| n >= *min && n <= *max);
                (!passed).then(|| {
                    format!("{} must be between {} and {}{}", field, min, max, measure.unit())
                })
            }
            BoundCheck::Length { min, max } => {
                let passed = Measure::Length
                    .measure(value)
                    .is_some_and(|n| n >= *min && n <= *max);
                (!passed).then(|| {
                    format!("{} must be between {} and {} characters", field, min, max)
                })
            }
            BoundCheck::In(allowed) => {
                let passed = value
                    .and_then(validators::value_as_text)
                    .is_some_and(|text| allowed.iter().any(|a| a == text.as_ref()));
                (!passed).then(|| format!("{} must be one of: {}", field, allowed.join(", ")))
            }
            BoundCheck::Regex(regex) => {
                let passed = value
                    .and_then(validators::value_as_text)
                    .is_some_and(|text| regex.is_match(&text));
                (!passed).then(|| format!("{} format is invalid", field))
            }
        }
    }
}

impl CrossFieldCheck {
    fn evaluate(
        &self,
        field: &str,
        value: Option<&Value>,
        ctx: &RecordContext<'_>,
    ) -> Option<String> {
        match self {
            CrossFieldCheck::Same(other) => {
                let passed = value == ctx.get(other);
                (!passed).then(|| format!("{} must match {}", field, other))
            }
            CrossFieldCheck::RequiredIf(cond) => {
                let violated = condition_holds(cond, ctx) && validators::is_empty(value);
                violated.then(|| {
                    format!("{} is required when {} is {}", field, cond.field, cond.value)
                })
            }
            CrossFieldCheck::RequiredUnless(cond) => {
                let violated = !condition_holds(cond, ctx) && validators::is_empty(value);
                violated.then(|| {
                    format!("{} is required unless {} is {}", field, cond.field, cond.value)
                })
            }
            CrossFieldCheck::ProhibitedIf(cond) => {
                let violated = condition_holds(cond, ctx) && !validators::is_empty(value);
                violated.then(|| {
                    format!("{} is not allowed when {} is {}", field, cond.field, cond.value)
                })
            }
        }
    }
}

/// True when the other field's submitted text equals the condition value.
fn condition_holds(cond: &Condition, ctx: &RecordContext<'_>) -> bool {
    ctx.get(&cond.field)
        .and_then(validators::value_as_text)
        .is_some_and(|text| text == cond.value)
}
