//! Product inventory stored under `brands/`.
//!
//! Layout per product:
//!
//! ```text
//! brands/<brand>/product_shade_values/<product>/shades.json
//! brands/<brand>/product_shade_values/<product>/links.json   (or brands/<brand>/links/<product>/links.json)
//! brands/<brand>/product_shade_values/<product>/price.json   (or brands/<brand>/price/<product>/price.json)
//! brands/<brand>/product_shade_values/<product>/types.json   (or type.json, or brands/<brand>/type/<product>/…)
//! brands/<brand>/product_shade_values/<product>/meta.json
//! brands/<brand>/edited_final_shades/<product>/…             (lip products only)
//! ```
//!
//! `shades.json` comes in three shapes: an array of `{name, hex, skintone?, undertone?}`,
//! a nested `{skintone: {undertone: {name: hex}}}` map for base products, or a flat
//! `{name: hex}` map.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::BRANDS_PREFIX;
use crate::errors::{CatalogError, CatalogResult, StoreError};
use crate::models::shade::{normalize_tone, parse_price};
use crate::models::{ProductCategory, ShadeRecord, SkinDepth};
use crate::store::BlobStore;

const PRODUCT_FILE_PATTERN: &str =
    r"^brands/([^/]+)/product_shade_values/([^/]+)/(shades\.json|links\.json|price\.json|types?\.json)$";

const PRODUCT_DIR_PATTERN: &str = r"^brands/([^/]+)/product_shade_values/([^/]+)/";

const BRAND_DIR_PATTERN: &str = r"^brands/([^/]+)/";

/// A `(brand, product)` pair found in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProductRef {
    /// Brand directory name
    pub brand: String,
    /// Product directory name
    pub product: String,
}

impl ProductRef {
    /// Creates a product reference.
    pub fn new(brand: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            product: product.into(),
        }
    }

    fn base_key(&self) -> String {
        format!(
            "{BRANDS_PREFIX}{}/product_shade_values/{}",
            self.brand, self.product
        )
    }
}

/// One shade of a product, joined with its link, price, and type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryRow {
    /// Shade name
    pub name: String,
    /// Hex color as stored
    pub hex: String,
    /// Skin-depth hint, comma-joined when the source held several
    pub skintone: String,
    /// Undertone
    pub undertone: String,
    /// Product page link
    pub link: String,
    /// Price
    pub price: Option<f64>,
    /// Product type of this shade
    pub product_type: String,
}

/// All shades of a product and its resolved product type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductShades {
    /// Joined shade rows
    pub rows: Vec<InventoryRow>,
    /// Product type (`meta.json` wins over `types.json`)
    pub product_type: String,
}

impl ProductShades {
    /// Converts the rows into records for a build of `category`.
    #[must_use]
    pub fn records(&self, product: &ProductRef, category: &ProductCategory) -> Vec<ShadeRecord> {
        self.rows
            .iter()
            .map(|row| ShadeRecord {
                brand: product.brand.clone(),
                product_name: product.product.clone(),
                shade_name: row.name.clone(),
                shade_hex_code: row.hex.clone(),
                price: row.price,
                link: row.link.clone(),
                category: category.id().to_string(),
                coverage: None,
                finish: None,
                skintone: Some(row.skintone.clone()).filter(|s| !s.is_empty()),
            })
            .collect()
    }
}

/// Reads the product inventory from a blob store.
pub struct InventoryService<'a> {
    store: &'a dyn BlobStore,
}

impl<'a> InventoryService<'a> {
    /// Wraps a store.
    pub fn new(store: &'a dyn BlobStore) -> Self {
        Self { store }
    }

    /// Every product with at least one shade, link, price, or type document,
    /// sorted by brand then product.
    pub fn list_products(&self) -> CatalogResult<Vec<ProductRef>> {
        let pattern = Regex::new(PRODUCT_FILE_PATTERN)
            .map_err(|e| CatalogError::Configuration(format!("product key pattern: {e}")))?;

        let products: BTreeSet<ProductRef> = self
            .store
            .list(BRANDS_PREFIX)?
            .iter()
            .filter_map(|key| pattern.captures(key))
            .map(|caps| ProductRef::new(&caps[1], &caps[2]))
            .collect();

        Ok(products.into_iter().collect())
    }

    /// Products per brand, from any document under `product_shade_values/`.
    /// Every brand folder is listed, including brands without products.
    pub fn brand_products(&self) -> CatalogResult<BTreeMap<String, Vec<String>>> {
        let brand_pattern = Regex::new(BRAND_DIR_PATTERN)
            .map_err(|e| CatalogError::Configuration(format!("brand key pattern: {e}")))?;
        let product_pattern = Regex::new(PRODUCT_DIR_PATTERN)
            .map_err(|e| CatalogError::Configuration(format!("product key pattern: {e}")))?;

        let mut brands: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for key in self.store.list(BRANDS_PREFIX)? {
            if let Some(caps) = product_pattern.captures(&key) {
                brands
                    .entry(caps[1].to_string())
                    .or_default()
                    .insert(caps[2].to_string());
            } else if let Some(caps) = brand_pattern.captures(&key) {
                brands.entry(caps[1].to_string()).or_default();
            }
        }

        Ok(brands
            .into_iter()
            .map(|(brand, products)| (brand, products.into_iter().collect()))
            .collect())
    }

    /// Whether a lip product has edited final shades, either as a folder or
    /// as a single `<product>.json` document.
    pub fn has_edited_final_shades(&self, product: &ProductRef) -> CatalogResult<bool> {
        let folder = format!(
            "{BRANDS_PREFIX}{}/edited_final_shades/{}/",
            product.brand, product.product
        );
        if self.store.has_prefix(&folder)? {
            return Ok(true);
        }

        let file = format!(
            "{BRANDS_PREFIX}{}/edited_final_shades/{}.json",
            product.brand, product.product
        );
        Ok(self.store.has_prefix(&file)?)
    }

    /// Loads and joins the shade documents of one product.
    pub fn load_product(&self, product: &ProductRef) -> CatalogResult<ProductShades> {
        let base = product.base_key();
        let legacy = |kind: &str, file: &str| {
            format!(
                "{BRANDS_PREFIX}{}/{kind}/{}/{file}",
                product.brand, product.product
            )
        };

        let shades = self.get_lenient(&format!("{base}/shades.json"))?;
        let meta = self.get_lenient(&format!("{base}/meta.json"))?;
        let links = self.first_of(&[
            format!("{base}/links.json"),
            legacy("links", "links.json"),
        ])?;
        let prices = self.first_of(&[
            format!("{base}/price.json"),
            legacy("price", "price.json"),
        ])?;
        let types = self.first_of(&[
            format!("{base}/types.json"),
            format!("{base}/type.json"),
            legacy("type", "types.json"),
            legacy("type", "type.json"),
        ])?;

        let rows: Vec<InventoryRow> = shade_rows(shades.as_ref())
            .into_iter()
            .map(|mut row| {
                row.link = lookup_string(links.as_ref(), &row.name);
                row.price = prices
                    .as_ref()
                    .and_then(|p| p.get(&row.name))
                    .and_then(parse_price);
                row.product_type = lookup_string(types.as_ref(), &row.name);
                row
            })
            .collect();

        let mut product_type = types
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|map| map.values().map(value_string).find(|t| !t.is_empty()))
            .unwrap_or_default();
        if product_type.is_empty() {
            if let Some(row) = rows.iter().find(|r| !r.product_type.is_empty()) {
                product_type = row.product_type.clone();
            }
        }
        if let Some(meta_type) = meta
            .as_ref()
            .and_then(|m| m.get("productType"))
            .map(value_string)
            .filter(|t| !t.is_empty())
        {
            product_type = meta_type;
        }

        Ok(ProductShades { rows, product_type })
    }

    /// Fetches a document, treating unparseable content as missing.
    fn get_lenient(&self, key: &str) -> CatalogResult<Option<Value>> {
        match self.store.get(key) {
            Ok(value) => Ok(value),
            Err(StoreError::Parse { key, source }) => {
                tracing::warn!("ignoring unreadable document {key}: {source}");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The first present, non-null document among `keys`.
    fn first_of(&self, keys: &[String]) -> CatalogResult<Option<Value>> {
        for key in keys {
            if let Some(value) = self.get_lenient(key)?.filter(|v| !v.is_null()) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

/// True when the map is keyed by skin-depth codes.
fn is_nested_by_skintone(map: &Map<String, Value>) -> bool {
    SkinDepth::ALL.iter().any(|tone| map.contains_key(tone.code()))
}

fn shade_rows(shades: Option<&Value>) -> Vec<InventoryRow> {
    match shades {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| InventoryRow {
                name: item.get("name").map(value_string).unwrap_or_default(),
                hex: item.get("hex").map(value_string).unwrap_or_default(),
                skintone: item.get("skintone").map(normalize_tone).unwrap_or_default(),
                undertone: item.get("undertone").map(normalize_tone).unwrap_or_default(),
                ..InventoryRow::default()
            })
            .collect(),
        Some(Value::Object(map)) if is_nested_by_skintone(map) => map
            .iter()
            .flat_map(|(skintone, undertones)| {
                undertones
                    .as_object()
                    .into_iter()
                    .flatten()
                    .flat_map(move |(undertone, names)| {
                        names.as_object().into_iter().flatten().map(move |(name, hex)| {
                            InventoryRow {
                                name: name.clone(),
                                hex: value_string(hex),
                                skintone: skintone.clone(),
                                undertone: undertone.clone(),
                                ..InventoryRow::default()
                            }
                        })
                    })
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, hex)| InventoryRow {
                name: name.clone(),
                hex: value_string(hex),
                ..InventoryRow::default()
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        other => other.to_string(),
    }
}

fn lookup_string(document: Option<&Value>, name: &str) -> String {
    document
        .and_then(|d| d.get(name))
        .map(value_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use serde_json::json;

    fn seeded() -> MemoryBlobStore {
        MemoryBlobStore::from_documents([
            (
                "brands/acme/product_shade_values/gloss/shades.json",
                json!([
                    {"name": "Blush", "hex": "#ffb6c1"},
                    {"name": "Oxblood", "hex": "#8b0000", "skintone": {"F": true, "VD": false}}
                ]),
            ),
            (
                "brands/acme/product_shade_values/gloss/price.json",
                json!({"Blush": "1200", "Oxblood": 1250}),
            ),
            (
                "brands/acme/links/gloss/links.json",
                json!({"Blush": "https://example.test/blush"}),
            ),
            (
                "brands/acme/product_shade_values/gloss/types.json",
                json!({"Blush": "lip-gloss", "Oxblood": "lip-gloss"}),
            ),
            (
                "brands/acme/product_shade_values/skin/shades.json",
                json!({"F": {"warm": {"Ivory": "#f5e1c8"}}, "VD": {"cool": {"Ebony": "#3b2219"}}}),
            ),
            (
                "brands/acme/product_shade_values/skin/meta.json",
                json!({"productType": "foundation"}),
            ),
            (
                "brands/zeta/product_shade_values/balm/shades.json",
                json!({"Clear": "#ffffff"}),
            ),
            ("brands/zeta/product_shade_values/balm/notes.txt", json!("x")),
            ("brands/acme/edited_final_shades/gloss.json", json!({})),
        ])
    }

    #[test]
    fn test_list_products_sorted_unique() {
        let store = seeded();
        let products = InventoryService::new(&store).list_products().unwrap();
        assert_eq!(
            products,
            [
                ProductRef::new("acme", "gloss"),
                ProductRef::new("acme", "skin"),
                ProductRef::new("zeta", "balm"),
            ]
        );
    }

    #[test]
    fn test_array_shape_with_joins() {
        let store = seeded();
        let shades = InventoryService::new(&store)
            .load_product(&ProductRef::new("acme", "gloss"))
            .unwrap();

        assert_eq!(shades.product_type, "lip-gloss");
        assert_eq!(shades.rows.len(), 2);
        assert_eq!(shades.rows[0].link, "https://example.test/blush");
        assert_eq!(shades.rows[0].price, Some(1200.0));
        assert_eq!(shades.rows[1].price, Some(1250.0));
        assert_eq!(shades.rows[1].skintone, "F");
        assert_eq!(shades.rows[1].link, "");
    }

    #[test]
    fn test_nested_shape_and_meta_type() {
        let store = seeded();
        let product = ProductRef::new("acme", "skin");
        let shades = InventoryService::new(&store).load_product(&product).unwrap();

        assert_eq!(shades.product_type, "foundation");
        let tones: Vec<(&str, &str)> = shades
            .rows
            .iter()
            .map(|r| (r.name.as_str(), r.skintone.as_str()))
            .collect();
        assert_eq!(tones, [("Ivory", "F"), ("Ebony", "VD")]);

        let foundation = ProductCategory::parse("foundation").unwrap();
        let records = shades.records(&product, &foundation);
        assert_eq!(records[1].skintone.as_deref(), Some("VD"));
        assert_eq!(records[1].category, "foundation");
        assert_eq!(records[0].price, None);
    }

    #[test]
    fn test_flat_shape_without_type() {
        let store = seeded();
        let shades = InventoryService::new(&store)
            .load_product(&ProductRef::new("zeta", "balm"))
            .unwrap();
        assert_eq!(shades.rows[0].name, "Clear");
        assert_eq!(shades.rows[0].hex, "#ffffff");
        assert_eq!(shades.product_type, "");
    }

    #[test]
    fn test_edited_final_shades_gate() {
        let store = seeded();
        let inventory = InventoryService::new(&store);
        assert!(inventory
            .has_edited_final_shades(&ProductRef::new("acme", "gloss"))
            .unwrap());
        assert!(!inventory
            .has_edited_final_shades(&ProductRef::new("zeta", "balm"))
            .unwrap());
    }

    #[test]
    fn test_brand_products() {
        let store = seeded();
        let brands = InventoryService::new(&store).brand_products().unwrap();
        assert_eq!(brands["acme"], ["gloss", "skin"]);
        assert_eq!(brands["zeta"], ["balm"]);
    }

    #[test]
    fn test_brand_products_keeps_brands_without_products() {
        let store = MemoryBlobStore::from_documents([
            ("brands/nova/edited_final_shades/velvet.json", json!({})),
            ("brands/orbit/logo.json", json!({})),
            ("brands/acme/product_shade_values/gloss/shades.json", json!([])),
        ]);
        let brands = InventoryService::new(&store).brand_products().unwrap();

        assert_eq!(brands.keys().collect::<Vec<_>>(), ["acme", "nova", "orbit"]);
        assert_eq!(brands["acme"], ["gloss"]);
        assert!(brands["nova"].is_empty());
        assert!(brands["orbit"].is_empty());
    }
}
