//! Field-name casing normalization.
//!
//! The two sides of a contract may disagree on field-name casing (`ItemId`,
//! `itemId`, `item_id`). Before deserializing an incoming JSON object, both
//! engines fold every key to `snake_case` so payloads land on conventional
//! Rust field names regardless of the sender's convention.

use serde_json::Value;

/// Converts a field name to `snake_case`.
///
/// Handles `PascalCase`, `camelCase`, `kebab-case`, and acronym runs
/// (`HTTPStatus` becomes `http_status`).
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            if !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_numeric());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if (prev_lower || (prev_upper && next_lower)) && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively folds every object key in a JSON value to `snake_case`.
///
/// Values are untouched; only keys are rewritten. On duplicate keys after
/// folding, the last entry wins.
#[must_use]
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folds_common_casings() {
        assert_eq!(to_snake_case("ItemId"), "item_id");
        assert_eq!(to_snake_case("itemId"), "item_id");
        assert_eq!(to_snake_case("item_id"), "item_id");
        assert_eq!(to_snake_case("item-id"), "item_id");
        assert_eq!(to_snake_case("Page"), "page");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
    }

    #[test]
    fn normalizes_nested_objects() {
        let value = json!({
            "ItemId": "42",
            "Tags": [{"TagName": "a"}],
            "Nested": {"InnerValue": 1}
        });
        let normalized = normalize_keys(value);
        assert_eq!(
            normalized,
            json!({
                "item_id": "42",
                "tags": [{"tag_name": "a"}],
                "nested": {"inner_value": 1}
            })
        );
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(normalize_keys(json!("hello")), json!("hello"));
        assert_eq!(normalize_keys(json!(3)), json!(3));
    }
}
