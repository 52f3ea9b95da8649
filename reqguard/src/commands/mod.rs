// reqguard/src/commands/mod.rs
pub mod sanitize;
pub mod validate;

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

use serde_json::Value;

/// Reads and parses a JSON document from `path`, or stdin when `None`.
pub fn read_json_input(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&text).context("Input is not valid JSON")
}
