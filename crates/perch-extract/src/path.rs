//! Safe nested JSON lookup.
//!
//! The raw payload is a deep, semi-structured document where any subtree
//! may be missing. Every accessor here treats absence as data, never as
//! an error: a broken path yields `None` or an empty list and the overall
//! projection always succeeds.

use serde_json::Value;

/// Walk object keys along `path`. `None` if any hop is missing or the
/// intermediate value is not an object.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.get(key)?;
    }
    // A JSON null at the leaf is the same as an absent path.
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// String at `path`, or `None`.
pub fn string_at(root: &Value, path: &[&str]) -> Option<String> {
    lookup(root, path)?.as_str().map(|s| s.to_string())
}

/// Integer at `path`, or `None`.
pub fn int_at(root: &Value, path: &[&str]) -> Option<i64> {
    lookup(root, path)?.as_i64()
}

/// Boolean at `path`, or `None`.
pub fn bool_at(root: &Value, path: &[&str]) -> Option<bool> {
    lookup(root, path)?.as_bool()
}

/// Collect `item_key` strings out of the array at `array_path`.
///
/// An absent array projects to an empty list, not to a missing field.
/// Array entries without the key are skipped.
pub fn strings_at(root: &Value, array_path: &[&str], item_key: &str) -> Vec<String> {
    lookup(root, array_path)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(item_key).and_then(Value::as_str))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}
