//! Snapshot schema migrations.
//!
//! Migrations run over the raw JSON of the prior snapshot, in order, and
//! each one is idempotent: re-applying it to an already-migrated snapshot
//! changes nothing. The current step set:
//!
//! * v1 → v2: the item model used to be two independent per-list
//!   collections (`pantry_items`, `shopping_items`) with independently
//!   issued ids. They are merged into the unified item collection by
//!   case-insensitive name match, preferring pantry-side core fields and
//!   attaching both memberships when a name occurs in both lists.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use larder_core::error::AppError;
use larder_core::AppResult;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 2;

/// Migrate a raw snapshot to the current schema version.
pub fn migrate_to_current(mut value: Value) -> AppResult<Value> {
    let version = snapshot_version(&value)?;
    if version > SCHEMA_VERSION {
        return Err(AppError::migration(format!(
            "Snapshot version {version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    if version < 2 {
        info!(from = version, to = 2, "migrating snapshot: merging split item lists");
        value = merge_split_item_lists(value)?;
    }

    value
        .as_object_mut()
        .ok_or_else(|| AppError::migration("Snapshot root is not an object"))?
        .insert("version".to_string(), json!(SCHEMA_VERSION));
    Ok(value)
}

/// Read the snapshot's schema version. A snapshot without a version key
/// predates versioning and is treated as version 1.
fn snapshot_version(value: &Value) -> AppResult<u32> {
    match value.get("version") {
        None => Ok(1),
        Some(v) => v
            .as_u64()
            .map(|v| v as u32)
            .ok_or_else(|| AppError::migration("Snapshot version is not an integer")),
    }
}

/// v1 → v2: merge `pantry_items` and `shopping_items` into `items`.
///
/// Idempotent: a snapshot without either legacy key passes through
/// untouched.
fn merge_split_item_lists(mut value: Value) -> AppResult<Value> {
    let root = value
        .as_object_mut()
        .ok_or_else(|| AppError::migration("Snapshot root is not an object"))?;

    let pantry = take_array(root, "pantry_items");
    let shopping = take_array(root, "shopping_items");
    if pantry.is_empty() && shopping.is_empty() {
        return Ok(value);
    }

    let mut items: Map<String, Value> = match root.remove("items") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    for record in pantry {
        let Some((id, name)) = id_and_name(&record) else {
            warn!("skipping malformed pantry record during migration");
            continue;
        };
        let membership = json!({
            "pantry": {
                "expires_at": record.get("expires_at").cloned().unwrap_or(Value::Null),
                "added_at": record.get("added_at").cloned().unwrap_or(Value::Null),
                "order": record.get("order").cloned().unwrap_or(json!(0)),
            }
        });
        items.insert(id.clone(), unified_item(&id, &name, &record, membership));
    }

    for record in shopping {
        let Some((id, name)) = id_and_name(&record) else {
            warn!("skipping malformed shopping record during migration");
            continue;
        };
        let shopping_entry = json!({
            "completed": record.get("completed").cloned().unwrap_or(json!(false)),
            "created_at": record.get("created_at").cloned().unwrap_or(Value::Null),
            "order": record.get("order").cloned().unwrap_or(json!(0)),
        });

        // Same name on both lists becomes one item: pantry core fields
        // win, the shopping membership is attached alongside.
        let existing = items
            .values_mut()
            .find(|item| item_name(item).is_some_and(|n| n.eq_ignore_ascii_case(&name)));
        match existing {
            Some(Value::Object(item)) => {
                if let Some(Value::Object(membership)) = item.get_mut("membership") {
                    membership.insert("shopping".to_string(), shopping_entry);
                }
            }
            _ => {
                let membership = json!({ "shopping": shopping_entry });
                items.insert(id.clone(), unified_item(&id, &name, &record, membership));
            }
        }
    }

    // Memberships serialized as null slots would deserialize fine, but the
    // unified schema omits absent memberships entirely.
    for item in items.values_mut() {
        if let Some(membership) = item.get_mut("membership").and_then(Value::as_object_mut) {
            membership.retain(|_, v| !v.is_null());
        }
        for list in ["/membership/pantry", "/membership/shopping"] {
            if let Some(entry) = item.pointer_mut(list).and_then(Value::as_object_mut) {
                entry.retain(|_, v| !v.is_null());
            }
        }
    }

    root.insert("items".to_string(), Value::Object(items));
    Ok(value)
}

fn take_array(root: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match root.remove(key) {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    }
}

fn id_and_name(record: &Value) -> Option<(String, String)> {
    let id = record.get("id")?.as_str()?.to_string();
    let name = record.get("name")?.as_str()?.to_string();
    Some((id, name))
}

fn item_name(item: &Value) -> Option<&str> {
    item.get("name").and_then(Value::as_str)
}

fn unified_item(id: &str, name: &str, record: &Value, membership: Value) -> Value {
    let quantity = record
        .get("quantity")
        .and_then(Value::as_str)
        .unwrap_or("1");
    let category = record
        .get("category")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("other");
    let mut item = json!({
        "id": id,
        "name": name,
        "quantity": quantity,
        "category": category,
        "membership": membership,
    });
    if let Some(unit) = record.get("unit").filter(|u| !u.is_null()) {
        item["unit"] = unit.clone();
    }
    item
}
