//! Diff generation for audit logging
//!
//! Summarizes which top-level fields changed between two serialized values.

use serde_json::Value;

const MAX_TEXT_CHARS: usize = 50;

/// Generate a human-readable diff between two JSON values
///
/// Only top-level fields are compared. Returns `None` when nothing changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes: Vec<String> = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let changed_or_removed = before_obj.iter().filter_map(|(key, old)| {
                match after_obj.get(key) {
                    Some(new) if new == old => None,
                    Some(new) => Some(format!("{}: {} -> {}", key, format_value(old), format_value(new))),
                    None => Some(format!("{}: {} -> (removed)", key, format_value(old))),
                }
            });
            let added = after_obj
                .iter()
                .filter(|(key, _)| !before_obj.contains_key(*key))
                .map(|(key, new)| format!("{}: (added) -> {}", key, format_value(new)));
            changed_or_removed.chain(added).collect()
        }
        _ if before != after => {
            vec![format!("{} -> {}", format_value(before), format_value(after))]
        }
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_TEXT_CHARS => {
            let head: String = s.chars().take(MAX_TEXT_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}
