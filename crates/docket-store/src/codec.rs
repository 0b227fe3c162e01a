//! JSON codec for a whole collection.
//!
//! On-disk format: one UTF-8 JSON array of objects, pretty-printed with
//! 2-space indentation and a trailing newline.

use std::collections::HashSet;

use serde_json::Value;

use crate::document::{Collection, Document, ID_FIELD};
use crate::error::{StoreError, StoreResult};

/// Serialize a collection to its persisted form.
pub fn encode(collection: &Collection) -> StoreResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(collection)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse a persisted collection.
///
/// Empty or whitespace-only input is an empty collection. Anything that is
/// not an array of objects with unique, non-empty string ids is corrupt.
pub fn decode(bytes: &[u8]) -> StoreResult<Collection> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Collection::new());
    }

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| StoreError::corrupt(format!("invalid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(StoreError::corrupt("top-level value is not an array"));
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut collection = Collection::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(StoreError::corrupt(format!("element {index} is not an object")));
        };
        let doc = Document::from_fields(fields);
        let id = match doc.id() {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => {
                return Err(StoreError::corrupt(format!(
                    "element {index} has no non-empty string `{ID_FIELD}`"
                )))
            }
        };
        if !seen.insert(id.clone()) {
            return Err(StoreError::corrupt(format!("duplicate id {id:?} at element {index}")));
        }
        collection.push(doc);
    }
    Ok(collection)
}
