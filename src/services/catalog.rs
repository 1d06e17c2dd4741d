//! Category catalog service: the read-modify-write cycle around the builder.
//!
//! Every operation is one load from the blob store followed by at most one
//! write. Concurrent writers are last-write-wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::builder::{BuildReport, CatalogBuilder};
use super::inventory::{InventoryService, ProductRef};
use crate::constants::{
    BRAND_INDEX_KEY, DEFAULT_DATA_PREFIX, DEFAULT_PRODUCT_TYPE, TAXONOMY_FILE_NAME,
};
use crate::errors::{CatalogError, CatalogResult, StoreError};
use crate::models::{ProductCategory, ShadeRecord};
use crate::store::BlobStore;
use crate::taxonomy::Taxonomy;

/// How a rebuild selects and persists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildOptions {
    /// Reclassify products that are already catalogued
    pub full: bool,
    /// Write the result back to the store
    pub publish: bool,
}

/// A product that fed a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsideredProduct {
    /// Brand
    pub brand: String,
    /// Product
    pub product: String,
    /// Shades loaded for it
    pub count: usize,
}

/// Totals of a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    /// Products that fed the build
    pub products_considered: usize,
    /// Shades across those products
    pub total_shades: usize,
    /// Top-level labels of the resulting taxonomy
    pub top_level_categories: Vec<String>,
}

/// Outcome of [`CatalogService::rebuild`].
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    /// Category id
    pub category: String,
    /// Suggested download file name
    pub filename: String,
    /// Store key the taxonomy belongs at
    pub target_key: String,
    /// Whether the taxonomy was written to `target_key`
    pub published: bool,
    /// When the build finished
    pub generated_at: DateTime<Utc>,
    /// Products that fed the build
    pub considered: Vec<ConsideredProduct>,
    /// Totals
    pub summary: RebuildSummary,
    /// Builder counters
    pub build: BuildReport,
    /// Merged and backfilled taxonomy
    pub taxonomy: Taxonomy,
}

/// Outcome of [`CatalogService::add_shades`].
#[derive(Debug, Clone, Serialize)]
pub struct AddReport {
    /// Store key that was written
    pub key: String,
    /// Entries appended
    pub added: usize,
    /// Builder counters
    pub build: BuildReport,
}

/// Catalog operations over a blob store.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BlobStore>,
    builder: CatalogBuilder,
    data_prefix: String,
}

impl CatalogService {
    /// Creates a service over `store`.
    pub fn new(
        store: Arc<dyn BlobStore>,
        builder: CatalogBuilder,
        data_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            builder,
            data_prefix: data_prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Creates a service with default builder settings and key prefix.
    pub fn with_defaults(store: Arc<dyn BlobStore>) -> Self {
        Self::new(store, CatalogBuilder::default(), DEFAULT_DATA_PREFIX)
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    /// The builder in use.
    #[must_use]
    pub const fn builder(&self) -> &CatalogBuilder {
        &self.builder
    }

    /// `<prefix>/<category>/categorised_LMD.json`
    #[must_use]
    pub fn taxonomy_key(&self, category: &ProductCategory) -> String {
        format!("{}/{}/{TAXONOMY_FILE_NAME}", self.data_prefix, category.id())
    }

    /// Loads the persisted taxonomy, `None` when there is none.
    pub fn load_taxonomy(&self, category: &ProductCategory) -> CatalogResult<Option<Taxonomy>> {
        let key = self.taxonomy_key(category);
        let load_failure = |reason: String| CatalogError::LoadFailure {
            key: key.clone(),
            reason,
        };

        match self.store.get(&key) {
            Ok(None) => Ok(None),
            Ok(Some(value)) => Taxonomy::from_value(value)
                .map(Some)
                .map_err(|e| load_failure(e.to_string())),
            Err(e) => Err(load_failure(e.to_string())),
        }
    }

    /// Loads the persisted taxonomy; a missing document is an empty taxonomy.
    pub fn load_existing(&self, category: &ProductCategory) -> CatalogResult<Taxonomy> {
        let existing = self.load_taxonomy(category)?;
        if existing.is_none() {
            debug!("no taxonomy stored for '{category}', starting empty");
        }
        Ok(existing.unwrap_or_default())
    }

    /// Writes a taxonomy to its key. Returns the key.
    pub fn publish(&self, category: &ProductCategory, taxonomy: &Taxonomy) -> CatalogResult<String> {
        let key = self.taxonomy_key(category);
        self.store.put(&key, &taxonomy.to_value()?)?;
        info!("published taxonomy for '{category}' to {key}");
        Ok(key)
    }

    /// Rebuilds a category from the inventory.
    ///
    /// Products are selected when their type equals the category id, and for
    /// lip categories only when edited final shades exist. Unless
    /// `options.full` is set, products already in the stored taxonomy are
    /// left out. The result is merged into the stored taxonomy and
    /// backfilled; it is written back only when `options.publish` is set.
    pub fn rebuild(
        &self,
        category: &ProductCategory,
        options: RebuildOptions,
    ) -> CatalogResult<RebuildReport> {
        let existing = self.load_existing(category)?;
        let known = existing.product_index();
        let inventory = InventoryService::new(self.store.as_ref());

        let mut considered = Vec::new();
        let mut records = Vec::new();
        for product in inventory.list_products()? {
            let shades = inventory.load_product(&product)?;
            if shades.rows.is_empty() || shades.product_type != category.id() {
                continue;
            }
            if category.is_lip() && !inventory.has_edited_final_shades(&product)? {
                debug!("skipping {}/{}: no edited final shades", product.brand, product.product);
                continue;
            }
            if !options.full && known.contains(&(product.brand.clone(), product.product.clone())) {
                continue;
            }

            considered.push(ConsideredProduct {
                brand: product.brand.clone(),
                product: product.product.clone(),
                count: shades.rows.len(),
            });
            records.extend(shades.records(&product, category));
        }

        let (taxonomy, build) = if options.full {
            self.builder
                .build_with_report(&records, category, Some(&existing))
        } else {
            self.builder.build_incremental(&records, category, &existing)
        };

        let target_key = self.taxonomy_key(category);
        if options.publish {
            self.publish(category, &taxonomy)?;
        }

        let summary = RebuildSummary {
            products_considered: considered.len(),
            total_shades: considered.iter().map(|p| p.count).sum(),
            top_level_categories: taxonomy.labels().map(str::to_string).collect(),
        };

        info!(
            "rebuilt '{category}' from {} products ({} shades)",
            summary.products_considered, summary.total_shades
        );

        Ok(RebuildReport {
            category: category.id().to_string(),
            filename: format!("CategorisedLMD.{}.json", category.id()),
            target_key,
            published: options.publish,
            generated_at: Utc::now(),
            considered,
            summary,
            build,
            taxonomy,
        })
    }

    /// Inserts submitted shades into the stored taxonomy and persists it.
    /// No merge or backfill is applied.
    pub fn add_shades(
        &self,
        category: &ProductCategory,
        records: &[ShadeRecord],
    ) -> CatalogResult<AddReport> {
        let mut taxonomy = self.load_existing(category)?;
        let build = self.builder.classify_into(records, category, &mut taxonomy);
        let key = self.publish(category, &taxonomy)?;

        info!("added {} entries to '{category}'", build.inserted);
        Ok(AddReport {
            key,
            added: build.inserted,
            build,
        })
    }

    /// Writes `all-data.json`: each brand mapped to a list of `{product: type}`
    /// objects. Returns the written document.
    pub fn write_brand_index(&self) -> CatalogResult<Value> {
        let inventory = InventoryService::new(self.store.as_ref());
        let mut index = Map::new();

        for (brand, products) in inventory.brand_products()? {
            let mut entries = Vec::with_capacity(products.len());
            for product in products {
                let shades = inventory.load_product(&ProductRef::new(brand.as_str(), product.as_str()))?;
                let product_type = if shades.product_type.is_empty() {
                    DEFAULT_PRODUCT_TYPE.to_string()
                } else {
                    shades.product_type
                };

                let mut entry = Map::new();
                entry.insert(product, Value::String(product_type));
                entries.push(Value::Object(entry));
            }
            index.insert(brand, Value::Array(entries));
        }

        let document = Value::Object(index);
        self.store.put(BRAND_INDEX_KEY, &document)?;
        info!("wrote brand index for {} brands", document.as_object().map_or(0, Map::len));
        Ok(document)
    }

    /// Lists `{product: type}` under `brand` in `all-data.json` unless the
    /// brand already lists `product`. A missing or unparseable index starts
    /// empty. Returns whether the index changed; an unchanged index is not
    /// rewritten.
    pub fn register_product(
        &self,
        brand: &str,
        product: &str,
        product_type: &str,
    ) -> CatalogResult<bool> {
        if brand.is_empty() || product.is_empty() || product_type.is_empty() {
            return Err(CatalogError::Configuration(
                "brand, product, and type are required".to_string(),
            ));
        }

        let mut index = match self.store.get(BRAND_INDEX_KEY) {
            Ok(Some(Value::Object(index))) => index,
            Ok(Some(_)) => {
                warn!("{BRAND_INDEX_KEY} is not an object, starting empty");
                Map::new()
            }
            Ok(None) => Map::new(),
            Err(StoreError::Parse { source, .. }) => {
                warn!("{BRAND_INDEX_KEY} is unreadable, starting empty: {source}");
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };

        let entries = index
            .entry(brand)
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(entries) = entries else {
            return Err(CatalogError::LoadFailure {
                key: BRAND_INDEX_KEY.to_string(),
                reason: format!("brand '{brand}' is not a list of products"),
            });
        };

        // Entries are single-key objects; the key is the product
        let listed = entries.iter().any(|entry| {
            entry
                .as_object()
                .and_then(|map| map.keys().next())
                .is_some_and(|name| name == product)
        });
        if listed {
            debug!("{brand}/{product} already in {BRAND_INDEX_KEY}");
            return Ok(false);
        }

        let mut entry = Map::new();
        entry.insert(product.to_string(), Value::String(product_type.to_string()));
        entries.push(Value::Object(entry));

        self.store.put(BRAND_INDEX_KEY, &Value::Object(index))?;
        info!("registered {brand}/{product} as '{product_type}' in {BRAND_INDEX_KEY}");
        Ok(true)
    }
}
