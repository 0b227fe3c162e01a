use std::sync::RwLock;

use crate::codec;
use crate::document::Collection;
use crate::error::StoreResult;
use crate::traits::CollectionStore;

/// In-memory collection store.
///
/// Intended for tests and embedding. The collection is held in its encoded
/// form so that every `load` goes through the same codec as the file store.
pub struct InMemoryStore {
    bytes: RwLock<Option<Vec<u8>>>,
}

impl InMemoryStore {
    /// Create a store with no backing content yet.
    pub fn new() -> Self {
        Self {
            bytes: RwLock::new(None),
        }
    }

    /// Create a store pre-loaded with raw persisted bytes, which may be
    /// corrupt.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: RwLock::new(Some(bytes.into())),
        }
    }

    /// Raw persisted bytes, or `None` if nothing has been written.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.bytes.read().expect("lock poisoned").clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore for InMemoryStore {
    fn load(&self) -> StoreResult<Collection> {
        let mut guard = self.bytes.write().expect("lock poisoned");
        if let Some(bytes) = guard.as_deref() {
            return codec::decode(bytes);
        }
        *guard = Some(codec::encode(&Collection::new())?);
        Ok(Collection::new())
    }

    fn replace(&self, collection: &Collection) -> StoreResult<()> {
        let bytes = codec::encode(collection)?;
        *self.bytes.write().expect("lock poisoned") = Some(bytes);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self
            .bytes
            .read()
            .expect("lock poisoned")
            .as_ref()
            .map(Vec::len);
        f.debug_struct("InMemoryStore")
            .field("encoded_len", &len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::error::StoreError;
    use serde_json::{json, Value};

    #[test]
    fn first_load_initializes_empty() {
        let store = InMemoryStore::new();
        assert!(store.snapshot().is_none());
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.snapshot().unwrap(), b"[]\n");
    }

    #[test]
    fn replace_then_load() {
        let store = InMemoryStore::new();
        let Value::Object(fields) = json!({ "id": "1", "text": "a" }) else { unreachable!() };
        let c = vec![Document::from_fields(fields)];
        store.replace(&c).unwrap();
        assert_eq!(store.load().unwrap(), c);
    }

    #[test]
    fn corrupt_bytes_are_reported() {
        let store = InMemoryStore::with_bytes("[{]");
        assert!(matches!(store.load().unwrap_err(), StoreError::Corrupt { .. }));
        assert_eq!(store.snapshot().unwrap(), b"[{]");
    }
}
