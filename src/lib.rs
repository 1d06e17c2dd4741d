//! Shade Catalog Library
//!
//! This library classifies cosmetic product shades into a
//! category / price tier / depth taxonomy used for similar-product lookups,
//! and maintains the per-category taxonomy documents in a blob store.

// Module declarations
pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod services;
pub mod store;
pub mod taxonomy;

#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use classifier::{Classifier, Placement, ShadeHints};
pub use config::Config;
pub use errors::{CatalogError, CatalogResult, StoreError};
pub use models::{DepthTier, ProductCategory, RgbColor, ShadeEntry, ShadeRecord};
pub use pricing::PriceBuckets;
pub use services::{CatalogBuilder, CatalogService};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use taxonomy::{DepthBuckets, Taxonomy};
