//! Layer merge for tool configuration values.
//!
//! Tables merge key by key. Anything else in a later layer, including an
//! array of placement rules, replaces what came before. A `null` leaves the
//! lower layer's value in place.

use serde_json::Value;

/// Fold `overlay` into `base` in place.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(table), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match table.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None if value.is_null() => {}
                    None => {
                        table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merge layers lowest precedence first
pub fn merge_layers(layers: Vec<Value>) -> Value {
    let mut merged = Value::Object(serde_json::Map::new());
    for layer in layers {
        deep_merge(&mut merged, layer);
    }
    merged
}
