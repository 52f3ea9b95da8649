// reqguard-core/src/lib.rs
//! # reqguard Core Library
//!
//! `reqguard-core` turns compact rule strings such as `"required|string|min:3"`
//! into field validators, runs them against request records, and provides a
//! recursive sanitizer for untrusted nested data.
//!
//! The library does no I/O beyond loading rule files: HTTP routing and body
//! parsing belong to the caller, which hands over a map of field name to
//! submitted value and receives either an accepted record or a list of
//! messages.
//!
//! ## Modules
//!
//! * `config`: `RuleSpec`/`RuleToken` for programmatic rules, `RuleConfig` for rule files.
//! * `rules`: the token parser, the two-pass compiler and the executable checks.
//! * `runner`: executes a compiled `Schema` against one record.
//! * `engine`: the `CustomRule` trait for caller-supplied async predicates.
//! * `sanitizer`: `clean` and the recursive `Sanitizer`.
//! * `request`: body/query/params handling.
//! * `outcome`: `ValidationOutcome` and the client-facing `ValidationFailure`.
//! * `headless`: synchronous one-shot helpers.
//!
//! ## Usage Example
//!
//! ```rust
//! use reqguard_core::{compile_schema, sanitize_value, CompileOptions};
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let schema = compile_schema(
//!     [
//!         ("password", "required|string|min:6"),
//!         ("confirmPassword", "required|same:password"),
//!         ("nickname", "default:Guest"),
//!     ],
//!     CompileOptions::default(),
//! )?;
//!
//! let body = sanitize_value(&json!({"password": "secret", "confirmPassword": "wrong"}))?;
//! let record = body.as_object().cloned().unwrap_or_default();
//! let outcome = schema.validate(&record).await;
//!
//! assert_eq!(outcome.errors(), ["confirmPassword must match password"]);
//! assert_eq!(outcome.record()["nickname"], "Guest");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Configuration mistakes (bad regex, non-numeric bounds, and in strict mode
//! unknown rules) fail at compile time with a `ReqguardError`. Per-record
//! failures are never errors; they are messages in the `ValidationOutcome`.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod engine;
pub mod errors;
pub mod headless;
pub mod outcome;
pub mod request;
pub mod rules;
pub mod runner;
pub mod sanitizer;
pub mod validators;

/// Re-exports the rule description and configuration types.
pub use config::{CompileOptions, RuleConfig, RuleSource, RuleSpec, RuleToken, MAX_PATTERN_LENGTH};

/// Re-exports the custom error type for clear error reporting.
pub use errors::ReqguardError;

/// Re-exports the extension point for caller-supplied predicates.
pub use engine::{rule_fn, CustomRule, CustomRuleRef, RecordContext};

/// Re-exports the compiler entry points and compiled types.
pub use rules::checks::{Check, Step, Transform};
pub use rules::compiler::{
    compile_field, compile_schema, get_or_compile_schema, FieldValidator, Schema,
};
pub use rules::parser::{parse_rule, ParsedRule};

/// Re-exports the results of a validation run.
pub use outcome::{ValidationFailure, ValidationOutcome, UNPROCESSABLE_ENTITY};

/// Re-exports the sanitizer.
pub use sanitizer::{clean, sanitize_value, Sanitizer, DEFAULT_MAX_DEPTH};

pub use request::RequestParts;

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_validate, headless_validate_request, validate_blocking};
