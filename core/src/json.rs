//! Generic JSON-to-typed-record decode contract.
//!
//! # Design
//! Response bodies are parsed into `serde_json::Value` and decoded by hand
//! through [`FromJson`] rather than derived deserialization: the contract
//! needs envelope unwrapping, discriminant-driven enum reconstruction and
//! strict date parsing that a derive cannot express. Envelope differences
//! between endpoints (bare object, `{"webhook": {..}}`, `{"webhooks":
//! [..]}`) are per-type hooks consulted by two generic entry points, so one
//! contract covers every payload shape.
//!
//! [`field`] is the single chokepoint for all missing-or-wrong-shaped-field
//! failures.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ClientError;

/// A parsed JSON object, the input to every decode.
pub type JsonObject = serde_json::Map<String, Value>;

/// A type that can be reconstructed from a JSON object.
pub trait FromJson: Sized {
    /// Envelope key wrapping the singular payload on some endpoints.
    /// [`decode`] unwraps it before field access when present.
    const NESTED_OBJECT_KEY: Option<&'static str> = None;

    fn from_json(object: &JsonObject) -> Result<Self, ClientError>;
}

/// A type whose list payloads arrive wrapped under a named array key.
pub trait FromJsonArray: FromJson {
    const ARRAY_KEY: &'static str;
}

/// Decode a singular value, unwrapping the nested-object envelope if the
/// target type declares one.
pub fn decode<T: FromJson>(object: &JsonObject) -> Result<T, ClientError> {
    match T::NESTED_OBJECT_KEY {
        Some(key) => {
            let inner = object
                .get(key)
                .and_then(Value::as_object)
                .ok_or_else(|| missing(key))?;
            T::from_json(inner)
        }
        None => T::from_json(object),
    }
}

/// Decode a list wrapped under the target type's array key. Elements are
/// bare objects (no envelope) and decode independently; any element failure
/// fails the whole list.
pub fn decode_list<T: FromJsonArray>(object: &JsonObject) -> Result<Vec<T>, ClientError> {
    let items = object
        .get(T::ARRAY_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| missing(T::ARRAY_KEY))?;
    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| {
                    ClientError::Parsing(format!("element of `{}` is not an object", T::ARRAY_KEY))
                })
                .and_then(T::from_json)
        })
        .collect()
}

/// Extract a typed field from a JSON object.
pub fn field<T: FieldValue>(object: &JsonObject, key: &str) -> Result<T, ClientError> {
    object.get(key).and_then(T::from_value).ok_or_else(|| missing(key))
}

fn missing(key: &str) -> ClientError {
    ClientError::Parsing(format!("missing or invalid field `{key}`"))
}

/// Typed extraction from a JSON value. `None` means the value is absent in
/// shape — [`field`] turns that into a parsing error with the key name.
pub trait FieldValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldValue for String {
    fn from_value(value: &Value) -> Option<String> {
        value.as_str().map(str::to_owned)
    }
}

impl FieldValue for bool {
    fn from_value(value: &Value) -> Option<bool> {
        value.as_bool()
    }
}

// Monetary amounts need the full 64-bit range; `as_i64`/`as_u64` read the
// numeric literal directly with no lossy float intermediate.
impl FieldValue for i64 {
    fn from_value(value: &Value) -> Option<i64> {
        value.as_i64()
    }
}

impl FieldValue for u64 {
    fn from_value(value: &Value) -> Option<u64> {
        value.as_u64()
    }
}

impl FieldValue for HashMap<String, String> {
    fn from_value(value: &Value) -> Option<HashMap<String, String>> {
        let object = value.as_object()?;
        object
            .iter()
            .map(|(key, value)| value.as_str().map(|value| (key.clone(), value.to_owned())))
            .collect()
    }
}

/// Parse an ISO-8601 timestamp field (`2016-01-26T18:42:04.924Z`),
/// normalizing any explicit offset to UTC.
pub fn iso8601_date(object: &JsonObject, key: &str) -> Result<DateTime<Utc>, ClientError> {
    let raw: String = field(object, key)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| ClientError::Parsing(format!("field `{key}` is not an ISO-8601 date: `{raw}`")))
}

/// Render a timestamp the way the API expects it in request parameters:
/// millisecond precision, `Z` suffix.
pub fn format_iso8601(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
