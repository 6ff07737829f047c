//! Depth-first key search over parsed wire payloads.

use serde_json::Value;

/// Find the value bound to `key` anywhere inside `value`.
///
/// A direct hit on a mapping beats any nested hit; otherwise entries are
/// visited in their natural enumeration order and the first non-empty
/// recursive result wins. Sequences are descended element-wise. Scalars
/// and null are never a match. Input must be acyclic, which parsed JSON
/// always is.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(direct) = map.get(key) {
                return Some(direct);
            }
            map.values().find_map(|v| find_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// Like [`find_key`], but only accepts a non-empty string value.
pub fn find_string_key<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    find_key(value, key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_hit_beats_nested() {
        let value = json!({
            "tag": "top",
            "nested": { "tag": "deep" }
        });
        assert_eq!(find_key(&value, "tag"), Some(&json!("top")));
    }

    #[test]
    fn test_first_sibling_wins() {
        let value = json!({
            "a": { "tag": "first" },
            "b": { "tag": "second" }
        });
        assert_eq!(find_key(&value, "tag"), Some(&json!("first")));
    }

    #[test]
    fn test_descends_into_arrays() {
        let value = json!([{ "x": 1 }, { "tag": "in-array" }]);
        assert_eq!(find_key(&value, "tag"), Some(&json!("in-array")));
    }

    #[test]
    fn test_deeply_nested() {
        let value = json!({
            "settings": { "tracking": { "vendors": [{ "tag": "xyz789" }] } }
        });
        assert_eq!(find_key(&value, "tag"), Some(&json!("xyz789")));
    }

    #[test]
    fn test_not_found_in_scalars_and_null() {
        assert_eq!(find_key(&json!(null), "tag"), None);
        assert_eq!(find_key(&json!(42), "tag"), None);
        assert_eq!(find_key(&json!("tag"), "tag"), None);
        assert_eq!(find_key(&json!({"other": 1}), "tag"), None);
    }

    #[test]
    fn test_direct_null_value_is_a_hit() {
        // Containment wins even when the bound value is null; the string
        // accessor is what filters it out.
        let value = json!({ "tag": null, "nested": { "tag": "deep" } });
        assert_eq!(find_key(&value, "tag"), Some(&Value::Null));
        assert_eq!(find_string_key(&value, "tag"), None);
    }

    #[test]
    fn test_string_accessor_rejects_empty() {
        let value = json!({ "tag": "" });
        assert_eq!(find_string_key(&value, "tag"), None);
        let value = json!({ "tag": "abc123" });
        assert_eq!(find_string_key(&value, "tag"), Some("abc123"));
    }
}
