//! Structured attachments for log calls

use std::time::Duration;

use serde_json::{Map, Value};

/// A key/value pair attached to a single log record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A duration rendered as fractional seconds
    pub fn duration(key: impl Into<String>, duration: Duration) -> Self {
        Self::new(key, duration.as_secs_f64())
    }

    /// A value rendered through its `Display` impl
    pub fn display(key: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self::new(key, value.to_string())
    }
}

/// Collect fields into one JSON object; later keys overwrite earlier ones
pub(crate) fn to_object(fields: &[Field]) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect();
    Value::Object(map)
}
