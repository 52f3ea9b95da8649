// reqguard-core/src/runner.rs
//! Executes a compiled `Schema` against one record.
//!
//! Fields run in declaration order and each field walks its steps in
//! declaration order over a private copy of the record. A `default` or
//! `sanitize` step rewrites the field in that copy, so it is visible to the
//! field's later steps and to every field declared after it, but not to the
//! steps that ran before it. Failures never stop the run; each violated rule
//! contributes one message and evaluation carries on.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use serde_json::{Map, Value};

use crate::engine::RecordContext;
use crate::outcome::{log_field_failure, ValidationOutcome};
use crate::rules::checks::Step;
use crate::rules::compiler::{FieldValidator, Schema};
use crate::validators;

impl Schema {
    /// Validates one record and returns the transformed copy plus any messages.
    ///
    /// Custom rules are awaited one at a time, in declaration order.
    pub async fn validate(&self, input: &Map<String, Value>) -> ValidationOutcome {
        let mut record = input.clone();
        let mut errors = Vec::new();

        for validator in &self.fields {
            validator.run(&mut record, &mut errors).await;
        }

        if errors.is_empty() {
            debug!(
                target: "reqguard_core::runner",
                "Record accepted ({} field(s) checked).",
                self.fields.len()
            );
        } else {
            info!(
                target: "reqguard_core::runner",
                "Record rejected with {} error(s).",
                errors.len()
            );
        }
        ValidationOutcome { record, errors }
    }
}

impl FieldValidator {
    async fn run(&self, record: &mut Map<String, Value>, errors: &mut Vec<String>) {
        for step in &self.steps {
            match step {
                Step::Transform(transform) => {
                    let current = record.get(&self.field).cloned();
                    match transform.apply(&self.field, current) {
                        Ok(Some(value)) => {
                            record.insert(self.field.clone(), value);
                        }
                        Ok(None) => {}
                        Err(message) => self.fail(record.get(&self.field), message, errors),
                    }
                }
                Step::Required => {
                    let value = record.get(&self.field);
                    if validators::is_empty(value) {
                        self.fail(value, format!("{} is required", self.field), errors);
                        return;
                    }
                }
                Step::Check(check) => {
                    let value = record.get(&self.field);
                    if self.skips(value) {
                        continue;
                    }
                    let ctx = RecordContext::new(record, &self.field);
                    if let Some(message) = check.evaluate(&self.field, value, &ctx).await {
                        self.fail(value, message, errors);
                    }
                }
            }
        }
    }

    /// Whether a check is skipped for the field's value at this point.
    ///
    /// An empty required field is reported once by its `required` step, so
    /// no other check reports on it. Otherwise `optional` tolerates a missing
    /// key and `nullable` an explicit null.
    fn skips(&self, value: Option<&Value>) -> bool {
        if self.required {
            return validators::is_empty(value);
        }
        (self.optional && value.is_none()) || (self.nullable && value.is_some_and(Value::is_null))
    }

    fn fail(&self, value: Option<&Value>, message: String, errors: &mut Vec<String>) {
        log_field_failure(&self.field, value, &message);
        errors.push(message);
    }
}
