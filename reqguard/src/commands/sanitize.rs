// reqguard/src/commands/sanitize.rs
//! `reqguard sanitize`: clean every string in a JSON document.

use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{self, Write};

use reqguard_core::Sanitizer;

use crate::cli::SanitizeCommand;
use crate::commands::read_json_input;

pub fn run_sanitize(cmd: &SanitizeCommand) -> Result<()> {
    info!("Starting sanitize operation.");
    let input = read_json_input(cmd.input.as_deref())?;
    let sanitizer = Sanitizer::new().with_max_depth(cmd.max_depth);
    debug!("Sanitizing with max depth {}.", sanitizer.max_depth());

    let cleaned = sanitizer.sanitize(&input).context("Sanitization failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&cleaned)?)?;
    Ok(())
}
