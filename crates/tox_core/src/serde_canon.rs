//! Canonical JSON for reproducible model hashes
//!
//! Object keys are sorted at every level and the output is compact, so two
//! structurally equal models always produce the same bytes and BLAKE3 digest.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("canonical JSON encoding failed: {0}")]
pub struct CanonicalError(#[from] serde_json::Error);

/// Serialize `value` as compact JSON with recursively sorted keys
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let mut tree = serde_json::to_value(value)?;
    sort_keys(&mut tree);
    Ok(serde_json::to_string(&tree)?)
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, mut child) in entries {
                sort_keys(&mut child);
                sorted.insert(key, child);
            }
            *map = sorted;
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// BLAKE3 digest of the canonical JSON encoding, hex encoded
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unsorted {
        zeta: u32,
        alpha: Inner,
    }

    #[derive(Serialize)]
    struct Inner {
        y: bool,
        b: Vec<u8>,
    }

    fn sample() -> Unsorted {
        Unsorted {
            zeta: 7,
            alpha: Inner { y: true, b: vec![3, 1] },
        }
    }

    #[test]
    fn test_keys_sorted_recursively() {
        let json = to_canonical_json(&sample()).unwrap();
        assert_eq!(json, r#"{"alpha":{"b":[3,1],"y":true},"zeta":7}"#);
    }

    #[test]
    fn test_hash_is_stable() {
        let h1 = canonical_hash_hex(&sample()).unwrap();
        let h2 = canonical_hash_hex(&sample()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }
}
