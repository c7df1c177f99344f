//! Shallow field diff between a catalog item and a partial field set.

use serde_json::Value as JsonValue;

use crate::models::{CatalogItem, FieldChange, FieldSet};

/// Shallow equality: scalars compare by value, arrays and objects never
/// compare equal since a freshly supplied composite is a distinct value.
///
/// Numbers compare by numeric value, so `8` equals `8.0`.
pub fn shallow_eq(old: &JsonValue, new: &JsonValue) -> bool {
    match (old, new) {
        (JsonValue::Array(_) | JsonValue::Object(_), _)
        | (_, JsonValue::Array(_) | JsonValue::Object(_)) => false,
        (JsonValue::Number(a), JsonValue::Number(b)) => numbers_eq(a, b),
        _ => old == new,
    }
}

fn numbers_eq(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Compare every key of `new_fields` against the same key on `old`.
///
/// Keys absent from `new_fields` are never compared. The returned changes
/// follow the insertion order of `new_fields`. An item that cannot be
/// projected yields no changes.
pub fn shallow_diff(old: &CatalogItem, new_fields: &FieldSet) -> Vec<FieldChange> {
    let current = match old.to_field_set() {
        Ok(current) => current,
        Err(e) => {
            tracing::error!(media_id = old.id, error = %e, "Failed to project catalog item for diff");
            return Vec::new();
        }
    };

    new_fields
        .iter()
        .filter_map(|(field, new_value)| {
            let old_value = current.get(field).cloned().unwrap_or(JsonValue::Null);
            if shallow_eq(&old_value, new_value) {
                None
            } else {
                Some(FieldChange::new(field.clone(), old_value, new_value.clone()))
            }
        })
        .collect()
}
