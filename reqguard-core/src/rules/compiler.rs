//! compiler.rs - Compiles per-field rule specifications into validators.
//!
//! Compilation is two-pass. The first pass tokenizes every rule of a field and
//! collects the full tag set; the second pass interprets each token against
//! that set. This is what lets `min`, `max` and `between` mean a numeric bound
//! when the field is also `integer`/`numeric` and a length bound otherwise,
//! regardless of token order.
//!
//! Compiled schemas built from a `RuleConfig` are kept in a thread-safe,
//! global cache keyed by a hash of the configuration.
//!
//! License: MIT OR APACHE 2.0

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::RegexBuilder;

use crate::config::{CompileOptions, RuleConfig, RuleSpec, MAX_PATTERN_LENGTH};
use crate::errors::ReqguardError;
use crate::rules::checks::{BoundCheck, Check, CrossFieldCheck, Measure, Step, Transform};
use crate::rules::parser::{parse_rule, split_token, ParsedRule, RuleIssue};
use crate::sanitizer::Sanitizer;

/// The compiled rule chain for one field, in declaration order.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    pub(crate) field: String,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) required: bool,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
    pub(crate) steps: Vec<Step>,
}

impl FieldValidator {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Every tag declared for the field, known or not.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn checks(&self) -> impl Iterator<Item = &Check> + '_ {
        self.steps.iter().filter_map(|step| match step {
            Step::Check(check) => Some(check),
            _ => None,
        })
    }

    pub fn transforms(&self) -> impl Iterator<Item = &Transform> + '_ {
        self.steps.iter().filter_map(|step| match step {
            Step::Transform(transform) => Some(transform),
            _ => None,
        })
    }
}

/// All field validators for one rule configuration, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub(crate) fields: Vec<FieldValidator>,
    pub(crate) diagnostics: Vec<String>,
}

impl Schema {
    pub fn fields(&self) -> &[FieldValidator] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValidator> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Rule tokens that were ignored while compiling in lenient mode.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}

/// A cached schema together with the configuration it was compiled from.
type CacheEntry = (RuleConfig, Arc<Schema>);

lazy_static! {
    /// A thread-safe, global cache for compiled schemas, keyed by a hash of
    /// the `RuleConfig`. Entries are never evicted, so the cache grows with
    /// every distinct configuration seen by the process. A hit only counts
    /// when the stored configuration equals the requested one; on a hash
    /// collision the newer configuration replaces the older entry.
    static ref COMPILED_SCHEMA_CACHE: RwLock<HashMap<u64, CacheEntry>> =
        RwLock::new(HashMap::new());
}

fn hash_config(config: &RuleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.hash(&mut hasher);
    hasher.finish()
}

/// Compiles the rules of a single field.
///
/// Returns the validator together with the diagnostics for tokens that were
/// skipped under lenient parsing.
pub fn compile_field(
    field: &str,
    spec: &RuleSpec,
    options: CompileOptions,
) -> Result<(FieldValidator, Vec<String>), ReqguardError> {
    let (tokens, customs) = spec.partition();

    // Pass 1: the full tag set decides how bounds are interpreted.
    let tags: BTreeSet<String> = tokens
        .iter()
        .map(|token| split_token(token).0.to_string())
        .collect();
    let measure = if tags.contains("integer") || tags.contains("numeric") {
        Measure::Numeric
    } else {
        Measure::Length
    };

    let mut validator = FieldValidator {
        field: field.to_string(),
        tags,
        required: false,
        optional: false,
        nullable: false,
        steps: Vec::new(),
    };
    let mut diagnostics = Vec::new();

    // Pass 2: interpret each token in declaration order.
    for token in tokens {
        let parsed = match parse_rule(token) {
            Ok(parsed) => parsed,
            Err(RuleIssue::InvalidParameter(reason)) => {
                return Err(ReqguardError::InvalidParameter {
                    field: field.to_string(),
                    rule: token.to_string(),
                    reason,
                });
            }
            Err(issue) if options.strict => return Err(strict_error(field, token, issue)),
            Err(issue) => {
                let note = format!("Field '{}': ignoring rule '{}' ({})", field, token, issue);
                warn!(target: "reqguard_core::compiler", "{}", note);
                diagnostics.push(note);
                continue;
            }
        };

        let step = match parsed {
            ParsedRule::Required => {
                validator.required = true;
                Step::Required
            }
            ParsedRule::Optional => {
                validator.optional = true;
                continue;
            }
            ParsedRule::Nullable => {
                validator.nullable = true;
                continue;
            }
            ParsedRule::Sanitize => Step::Transform(Transform::Sanitize(Sanitizer::default())),
            ParsedRule::Default(literal) => Step::Transform(Transform::Default(literal)),
            ParsedRule::Type(rule) => Step::Check(Check::Builtin(rule)),
            ParsedRule::Min(limit) => Step::Check(Check::Bound(BoundCheck::Min { measure, limit })),
            ParsedRule::Max(limit) => Step::Check(Check::Bound(BoundCheck::Max { measure, limit })),
            ParsedRule::Between { min, max } => {
                Step::Check(Check::Bound(BoundCheck::Between { measure, min, max }))
            }
            ParsedRule::Length { min, max } => {
                Step::Check(Check::Bound(BoundCheck::Length { min, max }))
            }
            ParsedRule::In(allowed) => Step::Check(Check::Bound(BoundCheck::In(allowed))),
            ParsedRule::Regex(pattern) => {
                let regex = compile_pattern(field, &pattern)?;
                Step::Check(Check::Bound(BoundCheck::Regex(regex)))
            }
            ParsedRule::Same(other) => Step::Check(Check::CrossField(CrossFieldCheck::Same(other))),
            ParsedRule::RequiredIf(cond) => {
                Step::Check(Check::CrossField(CrossFieldCheck::RequiredIf(cond)))
            }
            ParsedRule::RequiredUnless(cond) => {
                Step::Check(Check::CrossField(CrossFieldCheck::RequiredUnless(cond)))
            }
            ParsedRule::ProhibitedIf(cond) => {
                Step::Check(Check::CrossField(CrossFieldCheck::ProhibitedIf(cond)))
            }
        };
        validator.steps.push(step);
    }

    // Custom rules always run after the string-derived rules.
    validator
        .steps
        .extend(customs.into_iter().map(|rule| Step::Check(Check::Custom(rule))));

    debug!(
        target: "reqguard_core::compiler",
        "Field '{}' compiled: {} step(s), bounds measured as {:?}.",
        field,
        validator.steps.len(),
        measure
    );
    Ok((validator, diagnostics))
}

fn strict_error(field: &str, token: &str, issue: RuleIssue) -> ReqguardError {
    let (tag, params) = split_token(token);
    match issue {
        RuleIssue::MalformedCondition => ReqguardError::MalformedCrossField {
            field: field.to_string(),
            rule: tag.to_string(),
            raw: params.unwrap_or_default().to_string(),
        },
        RuleIssue::InvalidParameter(reason) => ReqguardError::InvalidParameter {
            field: field.to_string(),
            rule: token.to_string(),
            reason,
        },
        RuleIssue::Unknown => ReqguardError::UnknownRule {
            field: field.to_string(),
            rule: token.to_string(),
        },
    }
}

fn compile_pattern(field: &str, pattern: &str) -> Result<regex::Regex, ReqguardError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(ReqguardError::PatternLengthExceeded(
            field.to_string(),
            pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }
    RegexBuilder::new(pattern)
        .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
        .build()
        .map_err(|source| ReqguardError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// Compiles every field of a rule set, in the order given.
///
/// All fields are attempted; when several fail, the failures are reported
/// together.
pub fn compile_schema<I, K, S>(specs: I, options: CompileOptions) -> Result<Schema, ReqguardError>
where
    I: IntoIterator<Item = (K, S)>,
    K: AsRef<str>,
    S: Into<RuleSpec>,
{
    let mut schema = Schema::default();
    let mut compilation_errors = Vec::new();

    for (field, spec) in specs {
        let field = field.as_ref();
        match compile_field(field, &spec.into(), options) {
            Ok((validator, diagnostics)) => {
                schema.fields.push(validator);
                schema.diagnostics.extend(diagnostics);
            }
            Err(e) => compilation_errors.push(e),
        }
    }

    match compilation_errors.len() {
        0 => {
            debug!("Finished compiling schema. Total fields: {}.", schema.fields.len());
            Ok(schema)
        }
        1 => Err(compilation_errors.remove(0)),
        n => {
            let error_message = compilation_errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join("\n");
            Err(ReqguardError::Fatal(format!(
                "Failed to compile {} field(s):\n{}",
                n, error_message
            )))
        }
    }
}

/// Gets a compiled `Schema` from the cache or compiles it if not found.
pub fn get_or_compile_schema(config: &RuleConfig) -> Result<Arc<Schema>> {
    let cache_key = hash_config(config);

    {
        let cache = COMPILED_SCHEMA_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_config, schema)) = cache.get(&cache_key) {
            if cached_config == config {
                debug!("Serving compiled schema from cache for key: {}", cache_key);
                return Ok(Arc::clone(schema));
            }
            warn!("Schema cache key {} collided with a different configuration.", cache_key);
        }
    }

    debug!("Compiled schema not found in cache. Compiling now.");
    let compiled = Arc::new(compile_schema(config.specs(), config.compile_options())?);

    COMPILED_SCHEMA_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(cache_key, (config.clone(), Arc::clone(&compiled)));

    debug!("Successfully compiled and cached schema for key: {}", cache_key);
    Ok(compiled)
}
