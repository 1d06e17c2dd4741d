//! In-process store, used by tests and dry runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::{validate_key, BlobStore};
use crate::errors::StoreError;

/// A [`BlobStore`] holding documents in a sorted map.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with documents.
    pub fn from_documents<K: Into<String>>(documents: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self {
            documents: Mutex::new(
                documents
                    .into_iter()
                    .map(|(key, value)| (key.into(), value))
                    .collect(),
            ),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(key).cloned())
    }

    fn put(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        documents.insert(key.to_string(), document.clone());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_and_missing() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.get("a/b.json").unwrap(), None);

        store.put("a/b.json", &json!({"x": 1})).unwrap();
        assert_eq!(store.get("a/b.json").unwrap(), Some(json!({"x": 1})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_prefix() {
        let store = MemoryBlobStore::from_documents([
            ("brands/a/x.json", json!(1)),
            ("brands/b/y.json", json!(2)),
            ("other/z.json", json!(3)),
        ]);

        assert_eq!(
            store.list("brands/").unwrap(),
            ["brands/a/x.json", "brands/b/y.json"]
        );
        assert!(store.has_prefix("brands/b/").unwrap());
        assert!(!store.has_prefix("brands/c/").unwrap());
        assert_eq!(store.list("").unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_invalid_key() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.put("../escape.json", &json!({})),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
