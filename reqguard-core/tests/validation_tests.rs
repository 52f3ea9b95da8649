// reqguard-core/tests/validation_tests.rs
//! End-to-end behaviour of compiled schemas: presence rules, bound
//! interpretation, cross-field rules, defaults and message ordering.

use anyhow::Result;
use serde_json::{json, Map, Value};

use reqguard_core::{compile_schema, CompileOptions, ReqguardError, RuleSpec, Schema};

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("test records must be objects, got {other}"),
    }
}

fn schema(rules: &[(&str, &str)]) -> Result<Schema, ReqguardError> {
    compile_schema(rules.iter().copied(), CompileOptions::default())
}

async fn errors_for(rules: &[(&str, &str)], data: Value) -> Result<Vec<String>> {
    let outcome = schema(rules)?.validate(&record(data)).await;
    Ok(outcome.errors().to_vec())
}

#[test_log::test(tokio::test)]
async fn required_missing_or_empty_yields_exactly_one_message() -> Result<()> {
    let rules = [("name", "required|string|min:3|alpha")];
    for data in [json!({}), json!({"name": ""}), json!({"name": null})] {
        let errors = errors_for(&rules, data).await?;
        assert_eq!(errors, vec!["name is required"]);
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn required_position_does_not_matter() -> Result<()> {
    let errors = errors_for(&[("name", "string|min:3|required")], json!({})).await?;
    assert_eq!(errors, vec!["name is required"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn optional_missing_field_yields_nothing() -> Result<()> {
    let rules = [("age", "integer|min:18|optional|in:20,30")];
    assert!(errors_for(&rules, json!({})).await?.is_empty());
    // Present values are still checked.
    assert_eq!(
        errors_for(&rules, json!({"age": "abc"})).await?,
        vec![
            "age must be an integer",
            "age must be at least 18",
            "age must be one of: 20, 30"
        ]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn nullable_accepts_explicit_null_only() -> Result<()> {
    let rules = [("bio", "nullable|string")];
    assert!(errors_for(&rules, json!({"bio": null})).await?.is_empty());
    assert_eq!(errors_for(&rules, json!({"bio": 5})).await?, vec!["bio must be a string"]);
    assert_eq!(errors_for(&rules, json!({})).await?, vec!["bio must be a string"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn min_compares_numerically_with_numeric_tags() -> Result<()> {
    for tags in ["integer|min:10", "min:10|numeric"] {
        let rules = [("qty", tags)];
        assert_eq!(errors_for(&rules, json!({"qty": 9})).await?, vec!["qty must be at least 10"]);
        assert!(errors_for(&rules, json!({"qty": 10})).await?.is_empty());
        assert!(errors_for(&rules, json!({"qty": 11})).await?.is_empty());
        assert!(errors_for(&rules, json!({"qty": "11"})).await?.is_empty());
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn min_compares_length_without_numeric_tags() -> Result<()> {
    let rules = [("code", "string|min:3")];
    assert_eq!(
        errors_for(&rules, json!({"code": "ab"})).await?,
        vec!["code must be at least 3 characters"]
    );
    assert!(errors_for(&rules, json!({"code": "abc"})).await?.is_empty());
    assert!(errors_for(&rules, json!({"code": "abcd"})).await?.is_empty());
    // "5" has length 1, so the numeric reading would pass and the length reading fails.
    assert_eq!(
        errors_for(&rules, json!({"code": "5"})).await?,
        vec!["code must be at least 3 characters"]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn max_and_between_follow_the_same_resolution() -> Result<()> {
    assert_eq!(
        errors_for(&[("n", "max:5|integer")], json!({"n": 6})).await?,
        vec!["n must be at most 5"]
    );
    assert_eq!(
        errors_for(&[("s", "max:5")], json!({"s": "toolong"})).await?,
        vec!["s must be at most 5 characters"]
    );
    assert_eq!(
        errors_for(&[("n", "numeric|between:1,3")], json!({"n": 4})).await?,
        vec!["n must be between 1 and 3"]
    );
    assert_eq!(
        errors_for(&[("s", "between:1,3")], json!({"s": "four"})).await?,
        vec!["s must be between 1 and 3 characters"]
    );
    // `length` always measures characters, even on numeric fields.
    assert_eq!(
        errors_for(&[("pin", "numeric|length:4,4")], json!({"pin": "123"})).await?,
        vec!["pin must be between 4 and 4 characters"]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn same_rule() -> Result<()> {
    let rules = [("password", "required"), ("confirmPassword", "same:password")];
    assert_eq!(
        errors_for(&rules, json!({"password": "secret", "confirmPassword": "wrong"})).await?,
        vec!["confirmPassword must match password"]
    );
    assert!(errors_for(&rules, json!({"password": "secret", "confirmPassword": "secret"}))
        .await?
        .is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn prohibited_if_rule() -> Result<()> {
    let rules = [("role", "required"), ("docs", "prohibited_if:role,user")];
    assert_eq!(
        errors_for(&rules, json!({"role": "user", "docs": "x"})).await?,
        vec!["docs is not allowed when role is user"]
    );
    assert!(errors_for(&rules, json!({"role": "admin", "docs": "x"})).await?.is_empty());
    assert!(errors_for(&rules, json!({"role": "user"})).await?.is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn required_if_and_unless_rules() -> Result<()> {
    let rules = [
        ("kind", "required"),
        ("company", "required_if:kind,business"),
        ("reason", "required_unless:kind,business"),
    ];
    assert_eq!(
        errors_for(&rules, json!({"kind": "business", "reason": "n/a"})).await?,
        vec!["company is required when kind is business"]
    );
    assert_eq!(
        errors_for(&rules, json!({"kind": "personal"})).await?,
        vec!["reason is required unless kind is business"]
    );
    assert!(errors_for(&rules, json!({"kind": "business", "company": "ACME"}))
        .await?
        .is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn malformed_condition_is_a_no_op_when_lenient() -> Result<()> {
    let compiled = schema(&[("company", "required_if:kind")])?;
    assert_eq!(compiled.diagnostics().len(), 1);
    let outcome = compiled.validate(&record(json!({"kind": "kind"}))).await;
    assert!(outcome.is_accepted());
    Ok(())
}

#[test]
fn malformed_condition_fails_when_strict() {
    let result = compile_schema([("company", "required_if:kind")], CompileOptions::strict());
    assert!(matches!(
        result,
        Err(ReqguardError::MalformedCrossField { ref field, ref rule, ref raw })
            if field == "company" && rule == "required_if" && raw == "kind"
    ));
}

#[test_log::test(tokio::test)]
async fn default_fills_missing_values_for_accepted_and_rejected_records() -> Result<()> {
    let compiled = schema(&[("nickname", "default:Guest|string"), ("email", "required|email")])?;

    let accepted = compiled.validate(&record(json!({"email": "a@b.io"}))).await;
    assert!(accepted.is_accepted());
    assert_eq!(accepted.record().get("nickname"), Some(&json!("Guest")));

    let rejected = compiled.validate(&record(json!({"nickname": ""}))).await;
    assert_eq!(rejected.errors(), ["email is required"]);
    assert_eq!(rejected.record().get("nickname"), Some(&json!("Guest")));

    let kept = compiled.validate(&record(json!({"nickname": "Neo", "email": "a@b.io"}))).await;
    assert_eq!(kept.record().get("nickname"), Some(&json!("Neo")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn default_only_affects_later_rules() -> Result<()> {
    let rules = [("plan", "required|default:free"), ("nick", "string|default:Guest")];
    let outcome = schema(&rules)?.validate(&record(json!({}))).await;
    assert_eq!(outcome.errors(), ["plan is required", "nick must be a string"]);
    assert_eq!(outcome.record().get("plan"), None);
    assert_eq!(outcome.record().get("nick"), Some(&json!("Guest")));

    let rules = [("plan", "default:free|required|in:free,pro")];
    let outcome = schema(&rules)?.validate(&record(json!({}))).await;
    assert!(outcome.is_accepted());
    assert_eq!(outcome.record().get("plan"), Some(&json!("free")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn later_defaults_are_invisible_to_earlier_fields() -> Result<()> {
    let before = [("docs", "required_if:role,user"), ("role", "default:user")];
    let outcome = schema(&before)?.validate(&record(json!({}))).await;
    assert!(outcome.is_accepted());
    assert_eq!(outcome.record().get("role"), Some(&json!("user")));

    let after = [("role", "default:user"), ("docs", "required_if:role,user")];
    assert_eq!(
        errors_for(&after, json!({})).await?,
        vec!["docs is required when role is user"]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn sanitize_position_decides_what_checks_see() -> Result<()> {
    let rules = [("bio", "max:5|sanitize")];
    let outcome = schema(&rules)?.validate(&record(json!({"bio": "<b>hi</b>"}))).await;
    assert_eq!(outcome.errors(), ["bio must be at most 5 characters"]);
    assert_eq!(outcome.record().get("bio"), Some(&json!("hi")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn unknown_rules_are_ignored_when_lenient() -> Result<()> {
    let compiled = schema(&[("x", "required|frobnicate|string")])?;
    assert_eq!(compiled.diagnostics().len(), 1);
    assert!(compiled.diagnostics()[0].contains("frobnicate"));

    let outcome = compiled.validate(&record(json!({"x": "a"}))).await;
    assert!(outcome.is_accepted());
    assert_eq!(
        errors_for(&[("x", "required|frobnicate|string")], json!({"x": 1})).await?,
        vec!["x must be a string"]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn input_record_is_not_mutated() -> Result<()> {
    let compiled = schema(&[("nickname", "default:Guest")])?;
    let input = record(json!({}));
    let outcome = compiled.validate(&input).await;
    assert!(input.is_empty());
    assert_eq!(outcome.into_record(), record(json!({"nickname": "Guest"})));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn sanitize_rule_cleans_before_checks() -> Result<()> {
    let compiled = schema(&[("bio", "sanitize|string|max:5")])?;
    let outcome = compiled.validate(&record(json!({"bio": "<b>hello</b>"}))).await;
    assert!(outcome.is_accepted());
    assert_eq!(outcome.record().get("bio"), Some(&json!("hello")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn errors_are_ordered_by_field_then_rule() -> Result<()> {
    let rules = [
        ("username", "required|string|min:3"),
        ("email", "email|max:5"),
        ("age", "integer|between:18,99"),
    ];
    let errors = errors_for(
        &rules,
        json!({"age": 7, "email": "not-an-email", "username": 12}),
    )
    .await?;
    assert_eq!(
        errors,
        vec![
            "username must be a string",
            "username must be at least 3 characters",
            "email must be a valid email",
            "email must be at most 5 characters",
            "age must be between 18 and 99",
        ]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn type_rule_messages() -> Result<()> {
    let rules = [
        ("a", "boolean"),
        ("b", "url"),
        ("c", "array"),
        ("d", "object"),
        ("e", "json"),
        ("f", "uuid"),
        ("g", "alphanumeric"),
        ("h", "numeric"),
        ("i", "date"),
    ];
    let data = json!({
        "a": "maybe", "b": "nope", "c": {}, "d": [], "e": "{", "f": "123",
        "g": "a-b", "h": "x", "i": "yesterday"
    });
    assert_eq!(
        errors_for(&rules, data).await?,
        vec![
            "a must be a boolean",
            "b must be a valid URL",
            "c must be an array",
            "d must be an object",
            "e must be valid JSON",
            "f must be a valid UUID",
            "g must be alphanumeric",
            "h must be a number",
            "i must be a valid date",
        ]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn regex_rule_strips_delimiters() -> Result<()> {
    let rules = [("slot", r"regex:/^\d{2}:\d{2}$/")];
    assert!(errors_for(&rules, json!({"slot": "09:30"})).await?.is_empty());
    assert_eq!(errors_for(&rules, json!({"slot": "9:30"})).await?, vec!["slot format is invalid"]);
    Ok(())
}

#[test]
fn invalid_regex_fails_at_compile_time() {
    let result = compile_schema([("slot", "regex:/([a-z/")], CompileOptions::default());
    assert!(matches!(
        result,
        Err(ReqguardError::InvalidPattern { ref field, .. }) if field == "slot"
    ));
}

#[test]
fn overlong_regex_is_rejected() {
    let pattern = format!("regex:{}", "a".repeat(reqguard_core::MAX_PATTERN_LENGTH + 1));
    let result = compile_schema([("slot", pattern.as_str())], CompileOptions::default());
    assert!(matches!(result, Err(ReqguardError::PatternLengthExceeded(..))));
}

#[test]
fn non_numeric_bound_fails_at_compile_time() {
    let result = compile_schema([("age", "integer|min:old")], CompileOptions::default());
    assert!(matches!(
        result,
        Err(ReqguardError::InvalidParameter { ref rule, .. }) if rule == "min:old"
    ));
}

#[test]
fn several_broken_fields_are_reported_together() {
    let result = compile_schema(
        [("a", "regex:("), ("b", "max:x")],
        CompileOptions::default(),
    );
    match result {
        Err(ReqguardError::Fatal(message)) => {
            assert!(message.contains("Failed to compile 2 field(s)"));
            assert!(message.contains("'a'"));
            assert!(message.contains("'b'"));
        }
        other => panic!("expected an aggregated error, got {other:?}"),
    }
}

#[test]
fn list_specs_compile_like_pipe_strings() -> Result<()> {
    let compiled = compile_schema(
        [("age", RuleSpec::tokens(["min:18", "integer"]))],
        CompileOptions::default(),
    )?;
    let field = compiled.field("age").expect("age is compiled");
    assert!(field.has_tag("integer"));
    assert!(field.has_tag("min"));
    assert_eq!(field.checks().count(), 2);
    assert_eq!(field.steps().len(), 2);
    Ok(())
}
