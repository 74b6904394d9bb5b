//! JSON column codec: list-valued columns are stored as text and decoded at the boundary.

use crate::registry::Resource;
use serde_json::{Map, Value};

/// Encode JSON columns for writing (structured value -> JSON text). Strings and nulls pass through.
pub fn encode_row(row: &mut Map<String, Value>, resource: Resource) {
    for col in resource.json_columns() {
        if let Some(v) = row.get_mut(*col) {
            if !v.is_null() && !v.is_string() {
                let text = v.to_string();
                *v = Value::String(text);
            }
        }
    }
}

/// Decode JSON columns after reading (JSON text -> structured value).
/// Text that does not parse is left as the raw string.
pub fn decode_row(row: &mut Map<String, Value>, resource: Resource) {
    for col in resource.json_columns() {
        let parsed = match row.get(*col) {
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).ok(),
            _ => None,
        };
        if let Some(parsed) = parsed {
            row.insert((*col).to_string(), parsed);
        }
    }
}
