//! Defensive serialization of report payload fields.
//!
//! Operation documents, variables, and extensions arrive as arbitrary
//! host-provided values. They are shipped inside a JSON body, so each field is
//! reduced to a single transport-safe string: a sentinel for empty or
//! unserializable values, base64-encoded JSON otherwise.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

/// Placeholder for values classified as empty (null, `""`, `[]`, `{}`).
pub const EMPTY_SENTINEL: &str = "<EMPTY>";

/// Placeholder for values that could not be serialized.
pub const FAILED_SENTINEL: &str = "<FAILED>";

/// Encode a single payload field for transport.
///
/// This function is total: for any input it returns [`EMPTY_SENTINEL`],
/// [`FAILED_SENTINEL`], or the base64 encoding of the value's JSON text.
/// Serialization failures are logged under `label` and swallowed so that one
/// bad field never blocks the rest of the report.
///
/// # Example
///
/// ```ignore
/// use ogd_telemetry::encode::{encode_field, EMPTY_SENTINEL};
/// use serde_json::json;
///
/// assert_eq!(encode_field("variables", &json!({})), EMPTY_SENTINEL);
/// assert_eq!(encode_field("variables", &json!({"id": 1})), "eyJpZCI6MX0=");
/// ```
pub fn encode_field<T>(label: &str, value: &T) -> String
where
    T: Serialize + ?Sized,
{
    let value = match serde_json::to_value(value) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(field = label, %error, "failed to serialize GraphQL field");
            return FAILED_SENTINEL.to_string();
        }
    };

    if is_empty(&value) {
        return EMPTY_SENTINEL.to_string();
    }

    match serde_json::to_string(&value) {
        Ok(json) => STANDARD.encode(json),
        Err(error) => {
            tracing::warn!(field = label, %error, "failed to serialize GraphQL field");
            FAILED_SENTINEL.to_string()
        }
    }
}

/// Empty classification: null, empty string, empty array, or object with no
/// keys. Numbers and booleans are never empty.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Serializer;
    use serde_json::json;

    /// A value whose `Serialize` impl always fails, standing in for the
    /// circular/unsupported payloads a host might hand us.
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refuses to serialize"))
        }
    }

    fn decode(encoded: &str) -> Value {
        let bytes = STANDARD.decode(encoded).expect("valid base64");
        serde_json::from_slice(&bytes).expect("valid JSON")
    }

    #[test]
    fn test_empty_classification() {
        assert_eq!(encode_field("variables", &Value::Null), EMPTY_SENTINEL);
        assert_eq!(encode_field("variables", ""), EMPTY_SENTINEL);
        assert_eq!(encode_field("variables", &json!([])), EMPTY_SENTINEL);
        assert_eq!(encode_field("variables", &json!({})), EMPTY_SENTINEL);
    }

    #[test]
    fn test_zero_and_false_are_not_empty() {
        assert_ne!(encode_field("variables", &json!(0)), EMPTY_SENTINEL);
        assert_ne!(encode_field("variables", &json!(false)), EMPTY_SENTINEL);
    }

    #[test]
    fn test_encodes_to_base64_json() {
        let encoded = encode_field("variables", &json!({ "id": 1 }));
        assert_eq!(encoded, STANDARD.encode("{\"id\":1}"));
        assert_eq!(decode(&encoded), json!({ "id": 1 }));
    }

    #[test]
    fn test_unserializable_value_returns_failure_sentinel() {
        assert_eq!(encode_field("operation", &Unserializable), FAILED_SENTINEL);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Number(n.into())),
            "[a-z]{1,8}".prop_map(Value::String),
        ];
        // Non-empty collections only; empty ones hit the sentinel by design.
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 1..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip(value in arb_json()) {
            let encoded = encode_field("variables", &value);
            prop_assert_ne!(encoded.as_str(), EMPTY_SENTINEL);
            prop_assert_ne!(encoded.as_str(), FAILED_SENTINEL);
            prop_assert_eq!(decode(&encoded), value);
        }
    }
}
