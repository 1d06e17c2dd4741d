//! Key-value JSON document storage.
//!
//! The catalog only needs three operations from its storage collaborator:
//! fetch a document, replace a document, and list keys under a prefix.
//! Keys are `/`-separated relative paths such as
//! `brands/acme/product_shade_values/gloss/shades.json`.

mod fs;
mod memory;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

use serde_json::Value;

use crate::errors::StoreError;

/// Storage backend for JSON documents.
///
/// Writes are whole-document replacements; the last writer wins.
pub trait BlobStore: Send + Sync {
    /// Fetches a document. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores a document, replacing any previous one.
    fn put(&self, key: &str, document: &Value) -> Result<(), StoreError>;

    /// Every key starting with `prefix`, sorted.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// True when at least one key starts with `prefix`.
    fn has_prefix(&self, prefix: &str) -> Result<bool, StoreError> {
        Ok(!self.list(prefix)?.is_empty())
    }
}

/// Checks that a key is a relative path without `.`/`..` or empty segments.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
