// reqguard/src/cli.rs
//! Command-line interface definition for the `reqguard` binary.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "reqguard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate and sanitize JSON request records",
    long_about = "reqguard checks a JSON record against a rule file written in the compact `required|string|min:3` notation, and can strip markup and script vectors from arbitrary JSON documents before they reach an application.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for the reqguard crates)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validates a JSON record against a rule file.
    #[command(about = "Validate a JSON record (or request) against a rule file.")]
    Validate(ValidateCommand),

    /// Sanitizes a JSON document.
    #[command(about = "Strip tags, script URLs and inline handlers from every string in a JSON document.")]
    Sanitize(SanitizeCommand),
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// Rule file (YAML, or JSON when the extension is `.json`).
    #[arg(long, short = 'r', value_name = "FILE", env = "REQGUARD_RULES", help = "Path to the rule file (YAML or JSON).")]
    pub rules: PathBuf,

    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the record from a file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Treat the input as `{"body": .., "query": .., "params": ..}`.
    #[arg(long, help = "Treat the input as a request with body, query and params parts.")]
    pub request: bool,

    /// Sanitize the input before validating it.
    #[arg(long, short = 's', help = "Sanitize the input before validating it.")]
    pub sanitize: bool,

    /// Fail on unknown rules and malformed cross-field parameters.
    #[arg(long, help = "Reject unknown rules instead of ignoring them.")]
    pub strict: bool,

    /// Print a machine-readable failure document on stdout.
    #[arg(long, help = "Report rejections as a JSON document on stdout.")]
    pub json: bool,
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input: Option<PathBuf>,

    #[arg(long, value_name = "N", default_value_t = reqguard_core::DEFAULT_MAX_DEPTH, help = "Maximum nesting depth accepted.")]
    pub max_depth: usize,
}
