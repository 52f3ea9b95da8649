// reqguard-core/src/outcome.rs
//! Result types of a validation run and helpers for logging submitted values.
//!
//! Submitted values are user data and may contain personal information, so
//! debug logs only show them in full when `REQGUARD_ALLOW_DEBUG_PII=true`.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Status code conventionally used to report a rejected record.
pub const UNPROCESSABLE_ENTITY: u16 = 422;

lazy_static! {
    /// Whether submitted values may appear verbatim in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("REQGUARD_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn loggable_value(value: Option<&Value>) -> String {
    match value {
        None => "<missing>".to_string(),
        Some(v) if *PII_DEBUG_ALLOWED => v.to_string(),
        Some(v) => redact_sensitive(&v.to_string()),
    }
}

pub(crate) fn log_field_failure(field: &str, value: Option<&Value>, message: &str) {
    debug!(
        target: "reqguard_core::runner",
        "Field '{}' failed with value {}: {}",
        field,
        loggable_value(value),
        message
    );
}

/// The result of running a schema against one record.
///
/// The record is the transformed copy (defaults filled in, sanitized fields
/// cleaned) and is available whether or not validation passed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationOutcome {
    pub(crate) record: Map<String, Value>,
    pub(crate) errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages in field order, then rule order within a field.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    pub fn into_record(self) -> Map<String, Value> {
        self.record
    }

    /// Accepted records come back as `Ok`; rejected ones as a `ValidationFailure`.
    pub fn into_result(self) -> Result<Map<String, Value>, ValidationFailure> {
        if self.errors.is_empty() {
            Ok(self.record)
        } else {
            Err(ValidationFailure {
                status: UNPROCESSABLE_ENTITY,
                errors: self.errors,
            })
        }
    }
}

/// Client-facing description of a rejected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Validation failed: {}", .errors.join("; "))]
pub struct ValidationFailure {
    pub status: u16,
    pub errors: Vec<String>,
}

impl ValidationFailure {
    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}
