// reqguard/src/commands/validate.rs
//! `reqguard validate`: check one record (or request) against a rule file.

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info, warn};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};
use std::io::{self, Write};

use reqguard_core::{get_or_compile_schema, RequestParts, RuleConfig, Sanitizer, ValidationOutcome};

use crate::cli::ValidateCommand;
use crate::commands::read_json_input;

/// Runs the command. Returns `Ok(true)` when the record was accepted.
pub async fn run_validate(cmd: &ValidateCommand) -> Result<bool> {
    let mut config = RuleConfig::load_from_file(&cmd.rules)?;
    if cmd.strict {
        config.strict = true;
    }
    let schema = get_or_compile_schema(&config)
        .with_context(|| format!("Failed to compile rules from {}", cmd.rules.display()))?;
    for diagnostic in schema.diagnostics() {
        warn!("{}", diagnostic);
    }

    let input = read_json_input(cmd.input.as_deref())?;
    let record = build_record(input, cmd.request, cmd.sanitize)?;
    debug!("Validating a record with {} field(s).", record.len());

    let outcome = schema.validate(&record).await;
    report(outcome, cmd.json)
}

/// Turns the raw input into the flat record the schema runs against.
fn build_record(input: Value, request: bool, sanitize: bool) -> Result<Map<String, Value>> {
    let sanitizer = Sanitizer::default();
    if request {
        let mut parts: RequestParts =
            serde_json::from_value(input).context("Request input must be an object with body, query and params")?;
        if sanitize {
            parts = parts.sanitized(&sanitizer)?;
        }
        return Ok(parts.merged());
    }

    let input = if sanitize { sanitizer.sanitize(&input)? } else { input };
    match input {
        Value::Object(map) => Ok(map),
        other => bail!("Input must be a JSON object, got {}", type_name(&other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn report(outcome: ValidationOutcome, json: bool) -> Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match outcome.into_result() {
        Ok(record) => {
            info!("Record accepted.");
            let rendered = serde_json::to_string_pretty(&Value::Object(record))?;
            writeln!(out, "{}", rendered)?;
            Ok(true)
        }
        Err(failure) => {
            info!("Record rejected with {} message(s).", failure.errors.len());
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&failure)?)?;
            } else {
                let stderr = io::stderr();
                let colored = stderr.is_terminal();
                let mut err = stderr.lock();
                for message in &failure.errors {
                    if colored {
                        writeln!(err, "{} {}", "error:".red().bold(), message)?;
                    } else {
                        writeln!(err, "error: {}", message)?;
                    }
                }
            }
            Ok(false)
        }
    }
}
