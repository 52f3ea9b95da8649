// File: reqguard-core/src/validators.rs
//! Programmatic predicates for the built-in type and format rules.
//!
//! Every function here takes a submitted JSON value and answers a single yes/no
//! question. Request data frequently arrives as strings (query strings, form
//! posts), so the numeric and boolean predicates accept the textual forms of
//! those types as well as the native JSON ones.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url regex is valid"));

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex is valid")
});

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("integer regex is valid"));

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("numeric regex is valid")
});

static BOOLEAN_STRINGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(["true", "false", "1", "0"]);
    set
});

/// A value is empty when it is missing, `null`, or the empty string.
///
/// This is the notion of "not provided" shared by `required`, `default` and the
/// conditional presence rules.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Renders a scalar as the text a client would have submitted.
///
/// Containers and `null` have no textual form and yield `None`.
pub fn value_as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Interprets a value as a finite number, accepting numeric strings.
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if NUMERIC_RE.is_match(s) => {
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// Integral JSON numbers (including `3.0`) or strings of digits with an optional sign.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        Value::String(s) => INTEGER_RE.is_match(s),
        _ => false,
    }
}

pub fn is_numeric(value: &Value) -> bool {
    value_as_number(value).is_some()
}

/// Booleans, plus the conventional `"true"`/`"false"`/`"1"`/`"0"` and `0`/`1` encodings.
pub fn is_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => BOOLEAN_STRINGS.contains(s.as_str()),
        Value::Number(n) => matches!(n.as_u64(), Some(0) | Some(1)),
        _ => false,
    }
}

pub fn is_email(value: &Value) -> bool {
    value.as_str().is_some_and(|s| EMAIL_RE.is_match(s))
}

pub fn is_url(value: &Value) -> bool {
    value.as_str().is_some_and(|s| URL_RE.is_match(s))
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

/// A string holding a well-formed JSON document.
pub fn is_json(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| serde_json::from_str::<Value>(s).is_ok())
}

/// Hyphenated UUID text of any version.
pub fn is_uuid(value: &Value) -> bool {
    value.as_str().is_some_and(|s| UUID_RE.is_match(s))
}

pub fn is_alpha(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()))
}

pub fn is_alphanumeric(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Calendar dates (`2024-02-29`) or RFC 3339 timestamps.
pub fn is_date(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(s).is_ok()
}

/// Size used by the length-flavoured bounds: chars for strings, elements for arrays.
pub fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}
