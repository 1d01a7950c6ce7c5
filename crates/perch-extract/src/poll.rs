//! Poll assembly from card binding values.
//!
//! Polls arrive as a flat list of key/value entries under
//! `card.legacy.binding_values`. Keys are classified by substring and the
//! matched values land in a small ordered map; posts without a poll
//! project to an empty map.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::path::lookup;

/// Path to the binding-value list inside the raw payload.
const BINDING_VALUES: &[&str] = &["card", "legacy", "binding_values"];

/// Assemble the poll map for a payload.
///
/// Keys containing `"choice"` keep their original name; the remaining
/// recognized keys are renamed to `end`, `updated`, `ended`, and
/// `duration`. Unrecognized entries and entries missing their expected
/// value field are ignored.
pub fn poll_from_payload(payload: &Value) -> BTreeMap<String, Value> {
    let mut poll = BTreeMap::new();

    let Some(entries) = lookup(payload, BINDING_VALUES).and_then(Value::as_array) else {
        return poll;
    };

    for entry in entries {
        let Some(key) = entry.get("key").and_then(Value::as_str) else {
            continue;
        };
        let Some(value) = entry.get("value") else {
            continue;
        };

        if key.contains("choice") {
            if let Some(s) = string_value(value) {
                poll.insert(key.to_string(), Value::String(s));
            }
        } else if key.contains("end_datetime") {
            if let Some(s) = string_value(value) {
                poll.insert("end".to_string(), Value::String(s));
            }
        } else if key.contains("last_updated_datetime") {
            if let Some(s) = string_value(value) {
                poll.insert("updated".to_string(), Value::String(s));
            }
        } else if key.contains("counts_are_final") {
            if let Some(b) = value.get("boolean_value").and_then(Value::as_bool) {
                poll.insert("ended".to_string(), Value::Bool(b));
            }
        } else if key.contains("duration_minutes") {
            if let Some(s) = string_value(value) {
                poll.insert("duration".to_string(), Value::String(s));
            }
        }
    }

    poll
}

fn string_value(value: &Value) -> Option<String> {
    value
        .get("string_value")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}
