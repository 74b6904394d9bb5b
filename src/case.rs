//! Case conversion at the API boundary: request keys camelCase -> snake_case (for columns),
//! row keys snake_case -> camelCase (for clients). Only top-level keys are touched; nested
//! values such as workflow stages keep whatever keys they were written with.

use serde_json::{Map, Value};

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "project_id" -> "projectId", "oee_availability" -> "oeeAvailability"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "projectId" -> "project_id", "isRead" -> "is_read"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rename every top-level key of a row from snake_case to camelCase (in place).
pub fn object_keys_to_camel_case(obj: &mut Map<String, Value>) {
    rename_keys(obj, to_camel_case);
}

/// Rename every top-level key of a request body from camelCase to snake_case (in place).
pub fn object_keys_to_snake_case(obj: &mut Map<String, Value>) {
    rename_keys(obj, to_snake_case);
}

fn rename_keys(obj: &mut Map<String, Value>, convert: fn(&str) -> String) {
    let keys: Vec<String> = obj.keys().cloned().collect();
    for k in keys {
        let renamed = convert(&k);
        if renamed != k {
            if let Some(v) = obj.remove(&k) {
                obj.insert(renamed, v);
            }
        }
    }
}
