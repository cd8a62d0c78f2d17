//! Upstream payload shape detection.
//!
//! The analytics provider answers with one of several layouts for the same
//! record: the record itself, the record wrapped under `data`, or a
//! one-element array. Detection happens here, before any field is read.

use crate::error::AppError;
use serde_json::{Map, Value};
use tracing::debug;

/// Layout of a raw upstream payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape {
    /// `{ "data": <inner> }` with a non-null `data`.
    Wrapped(Value),
    /// A JSON array of records.
    Sequence(Vec<Value>),
    /// The record itself.
    Record(Map<String, Value>),
    /// `null`: nothing was returned.
    Empty,
}

impl PayloadShape {
    /// Classify a payload, recognizing the `data` wrapper.
    pub fn detect(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Object(mut map) => match map.remove("data") {
                Some(inner) if !inner.is_null() => Ok(PayloadShape::Wrapped(inner)),
                Some(null) => {
                    map.insert("data".to_string(), null);
                    Ok(PayloadShape::Record(map))
                }
                None => Ok(PayloadShape::Record(map)),
            },
            other => Self::detect_unwrapped(other),
        }
    }

    /// Classify a payload that has already been unwrapped once. A `data`
    /// field here is an ordinary field.
    pub fn detect_unwrapped(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Object(map) => Ok(PayloadShape::Record(map)),
            Value::Array(items) => Ok(PayloadShape::Sequence(items)),
            Value::Null => Ok(PayloadShape::Empty),
            other => Err(AppError::UpstreamUnavailable(format!(
                "unrecognized analytics payload: expected object or array, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PayloadShape::Wrapped(_) => "wrapped",
            PayloadShape::Sequence(_) => "sequence",
            PayloadShape::Record(_) => "record",
            PayloadShape::Empty => "empty",
        }
    }
}

/// Reduce a raw payload to the single record object it carries.
///
/// Unwraps at most one `data` level, then takes the first element of a
/// sequence. An empty sequence or `null` means the team has no analytics.
pub fn resolve_record(team: &str, raw: Value) -> Result<Map<String, Value>, AppError> {
    let shape = match PayloadShape::detect(raw)? {
        PayloadShape::Wrapped(inner) => {
            let inner = PayloadShape::detect_unwrapped(inner)?;
            debug!("Analytics payload for '{}' is wrapped {}", team, inner.name());
            inner
        }
        shape => {
            debug!("Analytics payload for '{}' is {}", team, shape.name());
            shape
        }
    };

    match shape {
        PayloadShape::Record(map) => Ok(map),
        PayloadShape::Sequence(items) => match items.into_iter().next() {
            Some(Value::Object(map)) => Ok(map),
            Some(Value::Null) | None => Err(AppError::not_found(team)),
            Some(other) => Err(AppError::UpstreamUnavailable(format!(
                "unrecognized analytics entry: expected object, got {}",
                json_kind(&other)
            ))),
        },
        // detect_unwrapped never yields Wrapped
        PayloadShape::Empty | PayloadShape::Wrapped(_) => Err(AppError::not_found(team)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
