//! errors.rs - Custom error types for the reqguard-core library.
//!
//! This module defines a structured error enum for the library. Per-record
//! validation failures are never represented here: they are ordinary messages
//! inside a `ValidationOutcome`. The variants below cover configuration
//! mistakes that must fail fast at compile time and sanitizer resource limits.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `reqguard-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReqguardError {
    #[error("Field '{field}': failed to compile regex rule '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Field '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Field '{field}': invalid parameter for rule '{rule}': {reason}")]
    InvalidParameter {
        field: String,
        rule: String,
        reason: String,
    },

    #[error("Field '{field}': unknown rule '{rule}'")]
    UnknownRule { field: String, rule: String },

    #[error("Field '{field}': rule '{rule}' expects 'otherField,value' but got '{raw}'")]
    MalformedCrossField {
        field: String,
        rule: String,
        raw: String,
    },

    #[error("Value nesting exceeds the maximum sanitizer depth of {0}")]
    DepthExceeded(usize),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
