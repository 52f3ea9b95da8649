//! The parts of an incoming request this library looks at.
//!
//! Routing and body parsing belong to the caller; once they are done the
//! caller hands over the decoded body, query and path parameters. Each part is
//! its own value tree: sanitizing cleans them independently, and merging
//! flattens them into the single record a `Schema` validates.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ReqguardError;
use crate::sanitizer::Sanitizer;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParts {
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub query: Value,
    #[serde(default)]
    pub params: Value,
}

impl RequestParts {
    pub fn new(body: Value, query: Value, params: Value) -> Self {
        Self { body, query, params }
    }

    /// Flattens the object-shaped parts into one record.
    ///
    /// Keys from `body` override `query`, which override `params`. Parts that
    /// are not JSON objects contribute nothing.
    pub fn merged(&self) -> Map<String, Value> {
        let mut record = Map::new();
        for part in [&self.params, &self.query, &self.body] {
            if let Value::Object(map) = part {
                for (key, value) in map {
                    record.insert(key.clone(), value.clone());
                }
            }
        }
        record
    }

    /// Returns a copy with body, query and params each sanitized on its own.
    pub fn sanitized(&self, sanitizer: &Sanitizer) -> Result<Self, ReqguardError> {
        Ok(Self {
            body: sanitizer.sanitize(&self.body)?,
            query: sanitizer.sanitize(&self.query)?,
            params: sanitizer.sanitize(&self.params)?,
        })
    }
}
