//! Shared test fixtures for catalog integration tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use shade_catalog::models::ShadeRecord;
use shade_catalog::store::{BlobStore, FsBlobStore};
use tempfile::TempDir;

/// Light pink: h≈354, s≈37, v=100 (perfect-pinks L, random L).
pub const ROSEWATER: &str = "#ffa0aa";
/// Dark red: h=0, s=100, v≈55 (reds-and-browns D, random M).
pub const OXBLOOD: &str = "#8b0000";

/// Default taxonomy key of a category.
pub fn taxonomy_key(category: &str) -> String {
    format!("find_products/product_database/{category}/categorised_LMD.json")
}

/// Writes the inventory documents used across tests into `store`.
///
/// - `acme/gloss`: lip-gloss, two shades priced in the 1000 tier, edited final shades present
/// - `acme/shine`: lip-gloss without edited final shades
/// - `zeta/skin`: foundation (type from `meta.json`), nested by skin depth, unpriced
/// - `zeta/cheek`: blush with a flat name→hex map
pub fn seed_inventory(store: &dyn BlobStore) {
    let documents: Vec<(&str, Value)> = vec![
        (
            "brands/acme/product_shade_values/gloss/shades.json",
            json!([
                {"name": "Rosewater", "hex": ROSEWATER},
                {"name": "Oxblood", "hex": OXBLOOD}
            ]),
        ),
        (
            "brands/acme/product_shade_values/gloss/price.json",
            json!({"Rosewater": 1200, "Oxblood": "1250"}),
        ),
        (
            "brands/acme/product_shade_values/gloss/links.json",
            json!({"Rosewater": "https://shop.test/gloss/rosewater"}),
        ),
        (
            "brands/acme/product_shade_values/gloss/types.json",
            json!({"Rosewater": "lip-gloss", "Oxblood": "lip-gloss"}),
        ),
        (
            "brands/acme/edited_final_shades/gloss/final.json",
            json!({"Rosewater": ROSEWATER}),
        ),
        (
            "brands/acme/product_shade_values/shine/shades.json",
            json!([{"name": "Glass", "hex": "#ffffff"}]),
        ),
        (
            "brands/acme/product_shade_values/shine/types.json",
            json!({"Glass": "lip-gloss"}),
        ),
        (
            "brands/zeta/product_shade_values/skin/shades.json",
            json!({
                "F": {"warm": {"Ivory": "#f5e1c8"}},
                "VD": {"cool": {"Ebony": "#3b2219"}}
            }),
        ),
        (
            "brands/zeta/product_shade_values/skin/meta.json",
            json!({"productType": "foundation"}),
        ),
        (
            "brands/zeta/product_shade_values/cheek/shades.json",
            json!({"Petal": ROSEWATER}),
        ),
        (
            "brands/zeta/product_shade_values/cheek/type.json",
            json!({"Petal": "blush"}),
        ),
    ];

    for (key, value) in documents {
        store.put(key, &value).expect("Failed to seed inventory");
    }
}

/// Creates a temporary filesystem store seeded with [`seed_inventory`].
pub fn seeded_store() -> (TempDir, FsBlobStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FsBlobStore::new(temp_dir.path());
    seed_inventory(&store);
    (temp_dir, store)
}

/// Writes a configuration file and returns its path.
pub fn write_config(dir: &Path, min_per_bucket: usize) -> PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        "[pricing]\nstep = 500\ncap = 5000\n\n[backfill]\nmin_per_bucket = {min_per_bucket}\n"
    );
    fs::write(&path, content).expect("Failed to write config");
    path
}

/// A submitted shade record.
pub fn record(brand: &str, product: &str, shade: &str, hex: &str, price: Option<f64>) -> ShadeRecord {
    ShadeRecord {
        brand: brand.to_string(),
        product_name: product.to_string(),
        shade_name: shade.to_string(),
        shade_hex_code: hex.to_string(),
        price,
        link: String::new(),
        category: "lipstick".to_string(),
        ..ShadeRecord::default()
    }
}

/// The same record as submitted JSON.
pub fn record_json(brand: &str, product: &str, shade: &str, hex: &str, price: f64) -> Value {
    json!({
        "brand": brand,
        "product_name": product,
        "shade_name": shade,
        "shade_hex_code": hex,
        "price": price,
        "link": "",
        "type": "lipstick"
    })
}
