//! Outbound document sanitation.
//!
//! The remote store rejects documents containing undefined-valued fields,
//! so every write strips them recursively before persisting. In JSON
//! terms an undefined field is a `null`-valued object entry; array
//! elements are sanitized in place but never removed.

use serde_json::Value;

/// Recursively strip null-valued fields from every object in the tree.
pub fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                strip_nulls(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strip_nulls(item);
            }
        }
        _ => {}
    }
}

/// Serialize an entity into a sanitized document.
pub fn to_document<T: serde::Serialize>(entity: &T) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(entity)?;
    strip_nulls(&mut value);
    Ok(value)
}
