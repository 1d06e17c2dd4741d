//! Error types for classification, taxonomy loading, and blob storage.

use std::io;

use thiserror::Error;

/// Errors raised by the catalog core.
///
/// `InvalidHex` and `UnclassifiableDepth` are per-record / per-label skips and
/// never abort a build; `LoadFailure` is propagated to the caller.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The color is not a strict 6-digit hex string (optional leading `#`).
    #[error("invalid hex color '{input}': expected 6 hex digits (RRGGBB)")]
    InvalidHex {
        /// The rejected input, as supplied.
        input: String,
    },
    /// A depth hint or brightness value falls outside every known band.
    #[error("no depth tier for label '{label}' (value {value})")]
    UnclassifiableDepth {
        /// Label the shade could not be placed under.
        label: String,
        /// Rounded brightness or the raw skin-depth hint.
        value: String,
    },
    /// The persisted taxonomy exists but could not be read or parsed.
    #[error("failed to load taxonomy '{key}': {reason}")]
    LoadFailure {
        /// Blob-store key of the document.
        key: String,
        /// Underlying cause.
        reason: String,
    },
    /// Blob-store failure outside of the taxonomy load path.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// JSON encoding/decoding failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Invalid configuration or rule table.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by [`crate::store::BlobStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem or transport failure for `key`.
    #[error("blob '{key}' I/O failure: {source}")]
    Io {
        /// Key being read or written.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The blob exists but is not valid JSON.
    #[error("blob '{key}' is not valid JSON: {source}")]
    Parse {
        /// Key being decoded.
        key: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The key is empty, absolute, or escapes the store root.
    #[error("invalid blob key '{0}'")]
    InvalidKey(String),
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
