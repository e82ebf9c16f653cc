use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

// Canonical form used for audit event hashing:
// - keys sorted lexicographically at every depth
// - no insignificant whitespace
// - integers only; a float anywhere in the value is rejected
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    let normalized = normalize_value(v)?;
    let s = serde_json::to_string(&normalized)?;
    Ok(s.into_bytes())
}

fn normalize_value(v: Value) -> CoreResult<Value> {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, vv)| normalize_value(vv).map(|n| (k, n)))
                .collect::<CoreResult<_>>()?;
            Ok(Value::Object(sorted.into_iter().collect()))
        }
        Value::Array(arr) => Ok(Value::Array(
            arr.into_iter()
                .map(normalize_value)
                .collect::<CoreResult<Vec<_>>>()?,
        )),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(Value::Number(n))
            } else {
                Err(CoreError::DeterminismViolation(format!(
                    "canonical JSON forbids non-integer number {}",
                    n
                )))
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::to_canonical_bytes;

    #[test]
    fn nested_keys_are_sorted() {
        let v = serde_json::json!({"stage": "intake", "details": {"to": 2, "from": 1}});
        let bytes = to_canonical_bytes(&v).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"details":{"from":1,"to":2},"stage":"intake"}"#
        );
    }

    #[test]
    fn floats_are_rejected() {
        let v = serde_json::json!({"quantity": 1.5});
        assert!(to_canonical_bytes(&v).is_err());
    }
}
