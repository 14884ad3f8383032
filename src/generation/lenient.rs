//! Field decoders for model payloads. None of them fail: `null` or a value of
//! the wrong type falls back to the field's empty value.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Strings; numbers and booleans are kept as their JSON text.
pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Lists. Items that do not decode are dropped, and a lone value where a
/// list belongs becomes a one-item list.
pub(crate) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(items(Value::deserialize(d)?))
}

/// Like [`list`], but `null` stays absent.
pub(crate) fn optional_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        other => Some(items(other)),
    })
}

fn items<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| T::deserialize(v).ok())
            .collect(),
        single => T::deserialize(single).into_iter().collect(),
    }
}
