//! Configuration management for `reqguard-core`.
//!
//! This module defines how a caller describes the rules for each field, both
//! programmatically (`RuleSpec`, which may carry custom rules) and as a
//! serializable rule file (`RuleConfig`, YAML or JSON). It handles loading
//! and basic integrity checks of rule files.
//!
//! License: MIT OR Apache-2.0

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::engine::CustomRuleRef;

/// Maximum allowed length for a `regex:` rule pattern.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Serializable rules for one field: a pipe-delimited string or a token list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RuleSource {
    Pipe(String),
    List(Vec<String>),
}

/// One element of a field's rule sequence.
#[derive(Clone)]
pub enum RuleToken {
    /// A rule token such as `"min:3"`.
    Rule(String),
    /// A caller-supplied predicate, always run after the string rules.
    Custom(CustomRuleRef),
}

impl fmt::Debug for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::Rule(token) => f.debug_tuple("Rule").field(token).finish(),
            RuleToken::Custom(rule) => f.debug_tuple("Custom").field(&rule.name()).finish(),
        }
    }
}

impl From<&str> for RuleToken {
    fn from(token: &str) -> Self {
        RuleToken::Rule(token.to_string())
    }
}

impl From<String> for RuleToken {
    fn from(token: String) -> Self {
        RuleToken::Rule(token)
    }
}

impl From<CustomRuleRef> for RuleToken {
    fn from(rule: CustomRuleRef) -> Self {
        RuleToken::Custom(rule)
    }
}

/// One field's raw rule description as handed to the compiler.
#[derive(Debug, Clone)]
pub enum RuleSpec {
    /// `"required|string|min:3"`
    Pipe(String),
    /// A sequence of rule tokens, possibly mixed with custom rules.
    Tokens(Vec<RuleToken>),
}

impl RuleSpec {
    pub fn tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleToken>,
    {
        RuleSpec::Tokens(tokens.into_iter().map(Into::into).collect())
    }

    /// Splits the spec into its string tokens and its custom rules.
    ///
    /// Order is preserved within each partition. Empty string tokens (from
    /// `"a||b"` or a trailing pipe) are dropped.
    pub fn partition(&self) -> (Vec<&str>, Vec<CustomRuleRef>) {
        match self {
            RuleSpec::Pipe(text) => (
                text.split('|').map(str::trim).filter(|t| !t.is_empty()).collect(),
                Vec::new(),
            ),
            RuleSpec::Tokens(tokens) => {
                let mut rules = Vec::new();
                let mut customs = Vec::new();
                for token in tokens {
                    match token {
                        RuleToken::Rule(text) => {
                            let text = text.trim();
                            if !text.is_empty() {
                                rules.push(text);
                            }
                        }
                        RuleToken::Custom(rule) => customs.push(rule.clone()),
                    }
                }
                (rules, customs)
            }
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(text: &str) -> Self {
        RuleSpec::Pipe(text.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(text: String) -> Self {
        RuleSpec::Pipe(text)
    }
}

impl From<Vec<RuleToken>> for RuleSpec {
    fn from(tokens: Vec<RuleToken>) -> Self {
        RuleSpec::Tokens(tokens)
    }
}

impl From<RuleSource> for RuleSpec {
    fn from(source: RuleSource) -> Self {
        match source {
            RuleSource::Pipe(text) => RuleSpec::Pipe(text),
            RuleSource::List(items) => RuleSpec::tokens(items),
        }
    }
}

/// Options controlling how tolerant the compiler is of rule mistakes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject unknown rules and malformed cross-field parameters instead of
    /// ignoring them.
    pub strict: bool,
}

impl CompileOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Top-level rule file: an ordered mapping of field name to rules.
///
/// ```yaml
/// strict: false
/// fields:
///   username: "required|string|min:3"
///   age: ["optional", "integer", "min:18"]
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub fields: IndexMap<String, RuleSource>,
}

impl Hash for RuleConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.strict.hash(state);
        for (field, source) in &self.fields {
            field.hash(state);
            source.hash(state);
        }
    }
}

impl RuleConfig {
    /// Loads a rule file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
        .with_context(|| format!("Failed to parse rules file {}", path.display()))?;

        info!("Loaded rules for {} field(s) from {}.", config.fields.len(), path.display());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: RuleConfig =
            serde_yml::from_str(text).context("Invalid YAML rule configuration")?;
        validate_fields(&config)?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: RuleConfig =
            serde_json::from_str(text).context("Invalid JSON rule configuration")?;
        validate_fields(&config)?;
        Ok(config)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions { strict: self.strict }
    }

    /// The fields as compiler input, in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = (&str, RuleSpec)> + '_ {
        self.fields
            .iter()
            .map(|(field, source)| (field.as_str(), RuleSpec::from(source.clone())))
    }
}

/// Structural checks that do not need the compiler: empty names and empty rule sets.
fn validate_fields(config: &RuleConfig) -> Result<()> {
    let mut errors = Vec::new();

    for (field, source) in &config.fields {
        if field.trim().is_empty() {
            errors.push("A field has an empty name.".to_string());
            continue;
        }
        let empty = match source {
            RuleSource::Pipe(text) => text.trim().is_empty(),
            RuleSource::List(items) => items.iter().all(|t| t.trim().is_empty()),
        };
        if empty {
            debug!("Field '{}' declares no rules; it will always pass.", field);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Rule configuration is invalid:\n{}", errors.join("\n")))
    }
}
