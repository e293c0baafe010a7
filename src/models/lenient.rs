//! Field decoders that turn wrong-typed JSON into "absent" instead of an error.
//!
//! Catalog documents and cookie-sourced activity logs are hand-edited and
//! often stringly typed; a bad field only drops that field's contribution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings pass through; null or any other type becomes `""`
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

/// Strings pass through; null or any other type becomes `None`
pub fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Numbers and numeric strings become `Some`, anything else `None`
pub fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(number.filter(|n| n.is_finite()))
}

/// RFC 3339 strings become `Some`, anything else `None`
pub fn timestamp_or_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.parse::<DateTime<Utc>>().ok()),
        _ => Ok(None),
    }
}
