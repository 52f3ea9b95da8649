// File: reqguard-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot, synchronous use.
//!
//! The runner is async because custom rules may be. Callers without a runtime
//! (scripts, the CLI's simple paths, tests) can use these helpers, which drive
//! the runner on a private current-thread `tokio` runtime.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::config::RuleConfig;
use crate::outcome::ValidationOutcome;
use crate::request::RequestParts;
use crate::rules::compiler::{get_or_compile_schema, Schema};
use crate::sanitizer::Sanitizer;

/// Runs `schema.validate` to completion on the current thread.
///
/// Must not be called from inside an async runtime.
pub fn validate_blocking(
    schema: &Schema,
    record: &Map<String, Value>,
) -> Result<ValidationOutcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start a runtime for blocking validation")?;
    Ok(runtime.block_on(schema.validate(record)))
}

/// Compiles (or fetches from cache) the schema for `config` and validates one record.
pub fn headless_validate(
    config: &RuleConfig,
    record: &Map<String, Value>,
) -> Result<ValidationOutcome> {
    let schema = get_or_compile_schema(config)?;
    validate_blocking(&schema, record)
}

/// Sanitizes every part of a request, merges them and validates the result.
pub fn headless_validate_request(
    config: &RuleConfig,
    parts: &RequestParts,
    sanitizer: Option<&Sanitizer>,
) -> Result<ValidationOutcome> {
    let record = match sanitizer {
        Some(sanitizer) => parts.sanitized(sanitizer)?.merged(),
        None => parts.merged(),
    };
    headless_validate(config, &record)
}
