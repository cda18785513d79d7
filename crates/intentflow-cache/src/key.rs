//! Deterministic cache-key generation
//!
//! A key is `"<category>:<blake3 hex>"` where the hash covers the category
//! and a canonical JSON rendering of the input. Canonical means:
//! - object members are ordered by key, whatever order they were inserted in
//! - object members whose value is `null` are dropped, so an absent optional
//!   field and an explicit `None` produce the same key
//!
//! Array element order is significant and `null` array elements are kept.
//!
//! Callers pass only the semantically relevant fields of a stage input;
//! timestamps or ids embedded in the input would fragment the cache.

use crate::error::KeyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const SEPARATOR: char = ':';

/// Opaque fingerprint of a (category, input) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category prefix the key was generated for
    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or_default()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate the cache key for `input` under `category`
///
/// # Errors
/// - `KeyError::InvalidCategory` if the category is empty or contains `:`
/// - `KeyError::Serialization` if the input cannot be rendered as JSON
pub fn generate_key<T>(category: &str, input: &T) -> Result<CacheKey, KeyError>
where
    T: Serialize + ?Sized,
{
    if category.is_empty() || category.contains(SEPARATOR) {
        return Err(KeyError::InvalidCategory(category.to_string()));
    }

    let value = serde_json::to_value(input)?;
    let material = serde_json::to_string(&canonical_json(value))?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(category.as_bytes());
    hasher.update(&[0]);
    hasher.update(material.as_bytes());
    let digest = hasher.finalize();

    Ok(CacheKey(format!("{category}{SEPARATOR}{}", digest.to_hex())))
}

/// Normalize a JSON value into its canonical form
///
/// Sorts object members and drops `null` members, recursively.
#[must_use]
pub fn canonical_json(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, canonical_json(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_json).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Params {
        volume: Option<u64>,
        sensitivity: Option<String>,
    }

    #[test]
    fn same_input_same_key() {
        let a = generate_key("roi-analysis", &json!({ "ops": 3, "name": "x" })).unwrap();
        let b = generate_key("roi-analysis", &json!({ "ops": 3, "name": "x" })).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn key_is_prefixed_with_category() {
        let key = generate_key("intent-parsing", &"hello").unwrap();
        assert!(key.as_str().starts_with("intent-parsing:"));
        assert_eq!(key.category(), "intent-parsing");
    }

    #[test]
    fn field_order_does_not_matter() {
        let mut first = Map::new();
        first.insert("b".into(), json!(2));
        first.insert("a".into(), json!(1));
        let mut second = Map::new();
        second.insert("a".into(), json!(1));
        second.insert("b".into(), json!(2));

        let a = generate_key("business-analysis", &Value::Object(first)).unwrap();
        let b = generate_key("business-analysis", &Value::Object(second)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn absent_and_none_fields_normalize_identically() {
        let explicit = Params {
            volume: Some(10),
            sensitivity: None,
        };
        let a = generate_key("pipeline", &explicit).unwrap();
        let b = generate_key("pipeline", &json!({ "volume": 10 })).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn nested_nulls_are_dropped() {
        let a = generate_key("pipeline", &json!({ "outer": { "x": 1, "y": null } })).unwrap();
        let b = generate_key("pipeline", &json!({ "outer": { "x": 1 } })).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn array_order_is_significant() {
        let a = generate_key("pipeline", &json!([1, 2])).unwrap();
        let b = generate_key("pipeline", &json!([2, 1])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn categories_never_collide() {
        let input = json!({ "ops": ["a", "b"] });
        let a = generate_key("roi-analysis", &input).unwrap();
        let b = generate_key("workflow-analysis", &input).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_categories() {
        assert!(matches!(
            generate_key("", &1),
            Err(KeyError::InvalidCategory(_))
        ));
        assert!(matches!(
            generate_key("a:b", &1),
            Err(KeyError::InvalidCategory(_))
        ));
    }

    proptest! {
        #[test]
        fn generation_is_deterministic(category in "[a-z][a-z-]{0,20}", text in ".*", n in any::<i64>()) {
            let input = json!({ "text": text, "n": n });
            let a = generate_key(&category, &input).unwrap();
            let b = generate_key(&category, &input).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn distinct_inputs_give_distinct_keys(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a != b);
            let ka = generate_key("pipeline", &a).unwrap();
            let kb = generate_key("pipeline", &b).unwrap();
            prop_assert_ne!(ka, kb);
        }
    }
}
