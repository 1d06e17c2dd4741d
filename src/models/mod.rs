//! Data models for shades, colors, categories, and depth tiers.
//!
//! Models are pure data with validation; classification and storage live elsewhere.

pub mod category;
pub mod depth;
pub mod rgb;
pub mod shade;

// Re-export all model types
pub use category::{CategoryLabel, ProductCategory};
pub use depth::DepthTier;
pub use rgb::{hsv_from_hex, strip_hash, Hsv, RgbColor};
pub use shade::{DedupKey, ShadeDetails, ShadeEntry, ShadeRecord, SkinDepth};
