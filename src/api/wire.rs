//! The single mapping from typed payloads to JSON rows for the store.
//!
//! The store speaks JSON over HTTP and has no native date, UUID or decimal
//! types, so every write goes through [`to_row`]: dates become `YYYY-MM-DD`,
//! UUIDs hyphenated strings, decimals JSON numbers, and `None` create fields
//! are left out so column defaults apply. Patch payloads keep explicit nulls.

use serde::Serialize;
use serde_json::{Map, Value};

/// Column stamped with the acting user on every insert
pub const CREATED_BY: &str = "created_by";

/// Serialize a typed payload into a single store row
pub fn to_row<T: Serialize>(payload: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "payload must serialize to an object, got {}",
            kind(&other)
        ))),
    }
}

/// Serialize a create payload and record who created it
pub fn to_insert_row<T: Serialize>(
    payload: &T,
    actor_id: &str,
) -> Result<Map<String, Value>, serde_json::Error> {
    let mut row = to_row(payload)?;
    row.insert(CREATED_BY.to_string(), Value::String(actor_id.to_string()));
    Ok(row)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
