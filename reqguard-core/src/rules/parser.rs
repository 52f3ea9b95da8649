//! parser.rs - Decodes single rule tokens into a typed AST.
//!
//! A token without `:` is a basic rule looked up by exact name. A token with
//! `:` is split on the first colon into a tag and a raw parameter string,
//! which is then decoded according to the tag. The parser knows nothing about
//! the other rules of the field; context-dependent interpretation (numeric vs
//! length bounds) happens in the compiler.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;

/// Type and format predicates that need no parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRule {
    String,
    Integer,
    Numeric,
    Boolean,
    Email,
    Url,
    Array,
    Object,
    Json,
    Uuid,
    Alpha,
    Alphanumeric,
    Date,
}

impl TypeRule {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let rule = match tag {
            "string" => TypeRule::String,
            "integer" => TypeRule::Integer,
            "numeric" => TypeRule::Numeric,
            "boolean" => TypeRule::Boolean,
            "email" => TypeRule::Email,
            "url" => TypeRule::Url,
            "array" => TypeRule::Array,
            "object" => TypeRule::Object,
            "json" => TypeRule::Json,
            "uuid" => TypeRule::Uuid,
            "alpha" => TypeRule::Alpha,
            "alphanumeric" => TypeRule::Alphanumeric,
            "date" => TypeRule::Date,
            _ => return None,
        };
        Some(rule)
    }
}

/// `otherField,value` parameter of the conditional presence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub value: String,
}

impl Condition {
    /// Splits on the first comma only, so `value` cannot itself contain a comma.
    fn parse(raw: &str) -> Option<Self> {
        let (field, value) = raw.split_once(',')?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// A single decoded rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRule {
    Required,
    Optional,
    Nullable,
    Sanitize,
    Type(TypeRule),
    Min(f64),
    Max(f64),
    Between { min: f64, max: f64 },
    Length { min: f64, max: f64 },
    In(Vec<String>),
    /// Pattern with any `/…/` delimiters already removed.
    Regex(String),
    Same(String),
    Default(String),
    RequiredIf(Condition),
    RequiredUnless(Condition),
    ProhibitedIf(Condition),
}

/// Why a token did not produce a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleIssue {
    /// The tag is not a known rule.
    Unknown,
    /// A conditional rule without the `otherField,value` comma.
    MalformedCondition,
    /// A parameter that can never be meaningful, such as `min:abc`.
    InvalidParameter(String),
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleIssue::Unknown => write!(f, "unknown rule"),
            RuleIssue::MalformedCondition => write!(f, "expected 'otherField,value'"),
            RuleIssue::InvalidParameter(reason) => write!(f, "{}", reason),
        }
    }
}

/// Splits a token into its tag and raw parameter string.
pub fn split_token(token: &str) -> (&str, Option<&str>) {
    match token.split_once(':') {
        Some((tag, params)) => (tag.trim(), Some(params)),
        None => (token.trim(), None),
    }
}

/// Decodes one token.
pub fn parse_rule(token: &str) -> Result<ParsedRule, RuleIssue> {
    match split_token(token) {
        (tag, None) => parse_basic(tag),
        (tag, Some(params)) => parse_parameterized(tag, params),
    }
}

fn parse_basic(tag: &str) -> Result<ParsedRule, RuleIssue> {
    match tag {
        "required" => Ok(ParsedRule::Required),
        "optional" => Ok(ParsedRule::Optional),
        "nullable" => Ok(ParsedRule::Nullable),
        "sanitize" => Ok(ParsedRule::Sanitize),
        _ => TypeRule::from_tag(tag).map(ParsedRule::Type).ok_or(RuleIssue::Unknown),
    }
}

fn parse_parameterized(tag: &str, params: &str) -> Result<ParsedRule, RuleIssue> {
    match tag {
        "min" => parse_number(params).map(ParsedRule::Min),
        "max" => parse_number(params).map(ParsedRule::Max),
        "between" => parse_pair(params).map(|(min, max)| ParsedRule::Between { min, max }),
        "length" => parse_pair(params).map(|(min, max)| ParsedRule::Length { min, max }),
        "in" => Ok(ParsedRule::In(
            params.split(',').map(|v| v.trim().to_string()).collect(),
        )),
        "regex" => Ok(ParsedRule::Regex(strip_delimiters(params).to_string())),
        "same" => {
            let other = params.trim();
            if other.is_empty() {
                return Err(RuleIssue::InvalidParameter("missing field name".to_string()));
            }
            Ok(ParsedRule::Same(other.to_string()))
        }
        "default" => Ok(ParsedRule::Default(params.to_string())),
        "required_if" => Condition::parse(params)
            .map(ParsedRule::RequiredIf)
            .ok_or(RuleIssue::MalformedCondition),
        "required_unless" => Condition::parse(params)
            .map(ParsedRule::RequiredUnless)
            .ok_or(RuleIssue::MalformedCondition),
        "prohibited_if" => Condition::parse(params)
            .map(ParsedRule::ProhibitedIf)
            .ok_or(RuleIssue::MalformedCondition),
        _ => Err(RuleIssue::Unknown),
    }
}

fn parse_number(raw: &str) -> Result<f64, RuleIssue> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RuleIssue::InvalidParameter(format!("'{}' is not a number", raw.trim())))
}

fn parse_pair(raw: &str) -> Result<(f64, f64), RuleIssue> {
    let mut parts = raw.split(',');
    let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RuleIssue::InvalidParameter(format!(
            "expected two comma-separated numbers, got '{}'",
            raw
        )));
    };
    Ok((parse_number(min)?, parse_number(max)?))
}

/// `/^a+$/` becomes `^a+$`; anything else is returned unchanged.
fn strip_delimiters(pattern: &str) -> &str {
    if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        &pattern[1..pattern.len() - 1]
    } else {
        pattern
    }
}
