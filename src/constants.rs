//! Application-wide constants.
//!
//! Names, default tuning values, and blob-store key layout.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Shade Catalog";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "shade-catalog";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "ShadeCatalog";

/// Default width of a price tier.
pub const DEFAULT_PRICE_STEP: u32 = 500;

/// Default price above which every shade shares the top tier.
pub const DEFAULT_PRICE_CAP: u32 = 5000;

/// Default minimum population of each depth list after backfill.
pub const DEFAULT_MIN_PER_BUCKET: usize = 6;

/// Default key prefix of persisted taxonomy documents.
pub const DEFAULT_DATA_PREFIX: &str = "find_products/product_database";

/// File name of a persisted taxonomy document.
pub const TAXONOMY_FILE_NAME: &str = "categorised_LMD.json";

/// Key prefix of the product inventory.
pub const BRANDS_PREFIX: &str = "brands/";

/// Key of the brand → products index document.
pub const BRAND_INDEX_KEY: &str = "all-data.json";

/// Product type recorded in the brand index when none is known.
pub const DEFAULT_PRODUCT_TYPE: &str = "Face";
