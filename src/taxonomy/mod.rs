//! Nested catalog: category label → price tier → depth tier → shade list.
//!
//! Every `(category, price tier)` group always carries all three depth lists.
//! Lists are append-only and never hold two entries with the same
//! [`DedupKey`].

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CatalogResult;
use crate::models::{DedupKey, DepthTier, ShadeEntry};

/// The three depth lists of one `(category, price tier)` group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthBuckets {
    /// Light
    #[serde(rename = "L", default)]
    pub light: Vec<ShadeEntry>,
    /// Medium
    #[serde(rename = "M", default)]
    pub medium: Vec<ShadeEntry>,
    /// Dark
    #[serde(rename = "D", default)]
    pub dark: Vec<ShadeEntry>,
}

impl DepthBuckets {
    /// The list for a depth tier.
    #[must_use]
    pub const fn list(&self, depth: DepthTier) -> &Vec<ShadeEntry> {
        match depth {
            DepthTier::L => &self.light,
            DepthTier::M => &self.medium,
            DepthTier::D => &self.dark,
        }
    }

    fn list_mut(&mut self, depth: DepthTier) -> &mut Vec<ShadeEntry> {
        match depth {
            DepthTier::L => &mut self.light,
            DepthTier::M => &mut self.medium,
            DepthTier::D => &mut self.dark,
        }
    }

    /// Total entries across the three lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.light.len() + self.medium.len() + self.dark.len()
    }

    /// True when all three lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `entry` unless its key is already in the list. Returns true if appended.
    fn push_unique(&mut self, depth: DepthTier, entry: ShadeEntry) -> bool {
        let list = self.list_mut(depth);
        let key = entry.dedup_key();
        if list.iter().any(|e| e.dedup_key() == key) {
            return false;
        }
        list.push(entry);
        true
    }

    /// Appends `entries` not yet present, keeping the list free of duplicates.
    fn extend_unique<'a>(
        &mut self,
        depth: DepthTier,
        entries: impl IntoIterator<Item = &'a ShadeEntry>,
    ) -> usize {
        let list = self.list_mut(depth);
        let mut seen: HashSet<DedupKey> = list.iter().map(ShadeEntry::dedup_key).collect();
        let before = list.len();
        for entry in entries {
            if seen.insert(entry.dedup_key()) {
                list.push(entry.clone());
            }
        }
        list.len() - before
    }

    /// Tops up each short list from its donors (see [`DepthTier::donors`]).
    /// Donor lists are read, never modified. Returns the number of copies made.
    fn backfill(&mut self, min: usize) -> usize {
        let mut copied = 0;
        for depth in DepthTier::ALL {
            let have = self.list(depth).len();
            if have >= min {
                continue;
            }

            let this = &*self;
            let mut seen: HashSet<DedupKey> =
                this.list(depth).iter().map(ShadeEntry::dedup_key).collect();
            let borrowed: Vec<ShadeEntry> = depth
                .donors()
                .into_iter()
                .flat_map(move |donor| this.list(donor).iter())
                .filter(|entry| seen.insert(entry.dedup_key()))
                .take(min - have)
                .cloned()
                .collect();

            copied += borrowed.len();
            self.list_mut(depth).extend(borrowed);
        }
        copied
    }
}

/// Entry counts for one price tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierStats {
    /// Price tier key
    pub price_tier: String,
    /// Light entries
    pub light: usize,
    /// Medium entries
    pub medium: usize,
    /// Dark entries
    pub dark: usize,
}

/// Entry counts for one category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    /// Category label (HSV label, base category, or contour finish)
    pub label: String,
    /// Per price tier counts, in document order
    pub tiers: Vec<TierStats>,
}

/// Summary of a taxonomy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyStats {
    /// Per category counts, in document order
    pub categories: Vec<CategoryStats>,
    /// Entries across every list (backfilled copies included)
    pub total_entries: usize,
    /// Distinct `(brand, product, shade)` keys
    pub unique_shades: usize,
}

/// The catalog structure persisted per requested category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    categories: IndexMap<String, IndexMap<String, DepthBuckets>>,
}

impl Taxonomy {
    /// Creates an empty taxonomy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted document.
    pub fn from_value(value: Value) -> CatalogResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Encodes the taxonomy as a JSON document.
    pub fn to_value(&self) -> CatalogResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// True when no category exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category labels in document order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// The depth lists of one `(category, price tier)` group.
    #[must_use]
    pub fn get(&self, label: &str, price_tier: &str) -> Option<&DepthBuckets> {
        self.categories.get(label)?.get(price_tier)
    }

    /// Convenience accessor for one list.
    #[must_use]
    pub fn list(&self, label: &str, price_tier: &str, depth: DepthTier) -> &[ShadeEntry] {
        self.get(label, price_tier)
            .map(|buckets| buckets.list(depth).as_slice())
            .unwrap_or_default()
    }

    fn group_mut(&mut self, label: &str, price_tier: &str) -> &mut DepthBuckets {
        self.categories
            .entry(label.to_string())
            .or_default()
            .entry(price_tier.to_string())
            .or_default()
    }

    /// Places `entry`, creating missing levels. A second insert of the same
    /// `(brand, product, shade)` into the same list is a no-op.
    ///
    /// Returns true when the entry was appended.
    pub fn insert(
        &mut self,
        entry: ShadeEntry,
        label: &str,
        price_tier: &str,
        depth: DepthTier,
    ) -> bool {
        self.group_mut(label, price_tier).push_unique(depth, entry)
    }

    /// Structural union: every list of `base`, followed by the entries of the
    /// matching `incoming` list whose keys `base` lacks.
    #[must_use]
    pub fn merge(base: &Self, incoming: &Self) -> Self {
        let mut merged = base.clone();
        merged.merge_from(incoming);
        merged
    }

    /// In-place form of [`Taxonomy::merge`]. Returns the number of entries added.
    pub fn merge_from(&mut self, incoming: &Self) -> usize {
        let mut added = 0;
        for (label, tiers) in &incoming.categories {
            for (price_tier, buckets) in tiers {
                let group = self.group_mut(label, price_tier);
                for depth in DepthTier::ALL {
                    added += group.extend_unique(depth, buckets.list(depth));
                }
            }
        }
        added
    }

    /// Tops up every depth list below `min` from its siblings in the same
    /// `(category, price tier)` group, in the fixed donor order
    /// L ← M, D; M ← L, D; D ← M, L. Entries are copied; donors keep theirs.
    /// A list that stays short after both donors are exhausted is left as is.
    ///
    /// Running it again on its own output changes nothing.
    ///
    /// Returns the number of entries copied.
    pub fn ensure_minimum_per_bucket(&mut self, min: usize) -> usize {
        self.categories
            .values_mut()
            .flat_map(IndexMap::values_mut)
            .map(|buckets| buckets.backfill(min))
            .sum()
    }

    /// Every `(brand, product)` pair present anywhere in the taxonomy.
    #[must_use]
    pub fn product_index(&self) -> HashSet<(String, String)> {
        self.entries()
            .map(|entry| {
                (
                    entry.details.brand.clone(),
                    entry.details.product_name.clone(),
                )
            })
            .collect()
    }

    /// All entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = &ShadeEntry> {
        self.categories
            .values()
            .flat_map(IndexMap::values)
            .flat_map(|buckets| DepthTier::ALL.into_iter().flat_map(move |d| buckets.list(d)))
    }

    /// Per-category and per-tier entry counts.
    #[must_use]
    pub fn stats(&self) -> TaxonomyStats {
        let categories = self
            .categories
            .iter()
            .map(|(label, tiers)| CategoryStats {
                label: label.clone(),
                tiers: tiers
                    .iter()
                    .map(|(price_tier, buckets)| TierStats {
                        price_tier: price_tier.clone(),
                        light: buckets.light.len(),
                        medium: buckets.medium.len(),
                        dark: buckets.dark.len(),
                    })
                    .collect(),
            })
            .collect();

        let unique: HashSet<DedupKey> = self.entries().map(ShadeEntry::dedup_key).collect();

        TaxonomyStats {
            categories,
            total_entries: self.entries().count(),
            unique_shades: unique.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShadeRecord;
    use serde_json::json;

    fn entry(brand: &str, product: &str, shade: &str) -> ShadeEntry {
        let record = ShadeRecord {
            brand: brand.to_string(),
            product_name: product.to_string(),
            shade_name: shade.to_string(),
            price: Some(1200.0),
            ..ShadeRecord::default()
        };
        ShadeEntry::from_record(&record, "AABBCC", "lip-gloss")
    }

    fn names(list: &[ShadeEntry]) -> Vec<&str> {
        list.iter().map(|e| e.details.shade_name.as_str()).collect()
    }

    fn key_set(list: &[ShadeEntry]) -> HashSet<DedupKey> {
        list.iter().map(ShadeEntry::dedup_key).collect()
    }

    #[test]
    fn test_insert_creates_all_depth_lists() {
        let mut taxonomy = Taxonomy::new();
        assert!(taxonomy.insert(entry("A", "P", "1"), "random", "1000", DepthTier::L));

        let value = taxonomy.to_value().unwrap();
        let group = &value["random"]["1000"];
        assert_eq!(group["L"].as_array().unwrap().len(), 1);
        assert_eq!(group["M"], json!([]));
        assert_eq!(group["D"], json!([]));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut taxonomy = Taxonomy::new();
        assert!(taxonomy.insert(entry("A", "P", "1"), "random", "0", DepthTier::M));
        assert!(!taxonomy.insert(entry("A", "P", "1"), "random", "0", DepthTier::M));
        assert_eq!(taxonomy.list("random", "0", DepthTier::M).len(), 1);

        // Same key in another list is a separate placement
        assert!(taxonomy.insert(entry("A", "P", "1"), "random", "0", DepthTier::D));
    }

    #[test]
    fn test_dedup_key_is_exact() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.insert(entry("A", "P", "Rose"), "random", "0", DepthTier::L);
        taxonomy.insert(entry("A", "P", "rose"), "random", "0", DepthTier::L);
        taxonomy.insert(entry("A", "P", "Rose "), "random", "0", DepthTier::L);
        assert_eq!(taxonomy.list("random", "0", DepthTier::L).len(), 3);
    }

    #[test]
    fn test_document_shape() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.insert(entry("A", "P", "1"), "perfect-pinks", "1000", DepthTier::L);

        let value = taxonomy.to_value().unwrap();
        assert_eq!(
            value["perfect-pinks"]["1000"]["L"][0],
            json!({
                "#AABBCC": {
                    "brand": "A",
                    "product_name": "P",
                    "shade_name": "1",
                    "shade_hex_code": "#AABBCC",
                    "price": 1200,
                    "link": "",
                    "type": "lip-gloss"
                }
            })
        );

        let parsed = Taxonomy::from_value(value).unwrap();
        assert_eq!(parsed, taxonomy);
    }

    #[test]
    fn test_missing_depth_keys_default_to_empty() {
        let taxonomy = Taxonomy::from_value(json!({"random": {"0": {"L": []}}})).unwrap();
        let buckets = taxonomy.get("random", "0").unwrap();
        assert!(buckets.medium.is_empty());
        assert!(buckets.dark.is_empty());
    }

    #[test]
    fn test_merge_identity() {
        let mut t = Taxonomy::new();
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);
        t.insert(entry("B", "Q", "2"), "bold-and-deep", "500", DepthTier::D);

        assert_eq!(Taxonomy::merge(&t, &Taxonomy::new()), t);
        assert_eq!(Taxonomy::merge(&Taxonomy::new(), &t), t);
    }

    #[test]
    fn test_merge_keeps_base_order_then_new() {
        let mut base = Taxonomy::new();
        base.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);
        base.insert(entry("A", "P", "2"), "random", "0", DepthTier::L);

        let mut incoming = Taxonomy::new();
        incoming.insert(entry("A", "P", "3"), "random", "0", DepthTier::L);
        incoming.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);

        let merged = Taxonomy::merge(&base, &incoming);
        assert_eq!(names(merged.list("random", "0", DepthTier::L)), ["1", "2", "3"]);
    }

    #[test]
    fn test_merge_keeps_stored_copy() {
        let mut base = Taxonomy::new();
        base.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);

        let mut edited = entry("A", "P", "1");
        edited.details.link = "https://example.test/new".to_string();
        let mut incoming = Taxonomy::new();
        incoming.insert(edited, "random", "0", DepthTier::L);

        let merged = Taxonomy::merge(&base, &incoming);
        assert_eq!(merged.list("random", "0", DepthTier::L)[0].details.link, "");
    }

    #[test]
    fn test_merge_associative_as_sets() {
        let mut a = Taxonomy::new();
        a.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);
        a.insert(entry("A", "P", "2"), "random", "500", DepthTier::M);

        let mut b = Taxonomy::new();
        b.insert(entry("A", "P", "2"), "random", "500", DepthTier::M);
        b.insert(entry("B", "Q", "1"), "random", "0", DepthTier::L);

        let mut c = Taxonomy::new();
        c.insert(entry("C", "R", "1"), "bold-and-deep", "0", DepthTier::D);
        c.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);

        let left = Taxonomy::merge(&Taxonomy::merge(&a, &b), &c);
        let right = Taxonomy::merge(&a, &Taxonomy::merge(&b, &c));
        let swapped = Taxonomy::merge(&Taxonomy::merge(&c, &b), &a);

        for (label, tier) in [("random", "0"), ("random", "500"), ("bold-and-deep", "0")] {
            for depth in DepthTier::ALL {
                let l = key_set(left.list(label, tier, depth));
                assert_eq!(l, key_set(right.list(label, tier, depth)));
                assert_eq!(l, key_set(swapped.list(label, tier, depth)));
            }
        }
    }

    #[test]
    fn test_backfill_light_from_medium_first() {
        let mut t = Taxonomy::new();
        for i in 0..2 {
            t.insert(entry("A", "P", &format!("l{i}")), "random", "0", DepthTier::L);
        }
        for i in 0..10 {
            t.insert(entry("A", "P", &format!("m{i}")), "random", "0", DepthTier::M);
        }

        t.ensure_minimum_per_bucket(6);

        assert_eq!(
            names(t.list("random", "0", DepthTier::L)),
            ["l0", "l1", "m0", "m1", "m2", "m3"]
        );
        // Donor untouched
        assert_eq!(t.list("random", "0", DepthTier::M).len(), 10);
        // Dark borrows medium first, then light
        assert_eq!(
            names(t.list("random", "0", DepthTier::D)),
            ["m0", "m1", "m2", "m3", "m4", "m5"]
        );
    }

    #[test]
    fn test_backfill_falls_through_to_second_donor() {
        let mut t = Taxonomy::new();
        t.insert(entry("A", "P", "m0"), "random", "0", DepthTier::M);
        for i in 0..4 {
            t.insert(entry("A", "P", &format!("d{i}")), "random", "0", DepthTier::D);
        }

        t.ensure_minimum_per_bucket(3);
        assert_eq!(names(t.list("random", "0", DepthTier::L)), ["m0", "d0", "d1"]);
        // Medium borrows light first; m0 is already present
        assert_eq!(names(t.list("random", "0", DepthTier::M)), ["m0", "d0", "d1"]);
    }

    #[test]
    fn test_backfill_partial_fill() {
        let mut t = Taxonomy::new();
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);
        t.insert(entry("A", "P", "2"), "random", "0", DepthTier::M);

        t.ensure_minimum_per_bucket(6);
        for depth in DepthTier::ALL {
            assert_eq!(t.list("random", "0", depth).len(), 2);
        }
    }

    #[test]
    fn test_backfill_never_duplicates() {
        let mut t = Taxonomy::new();
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::M);
        t.insert(entry("A", "P", "2"), "random", "0", DepthTier::M);
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::D);

        t.ensure_minimum_per_bucket(6);
        for depth in DepthTier::ALL {
            let list = t.list("random", "0", depth);
            assert_eq!(key_set(list).len(), list.len());
        }
    }

    #[test]
    fn test_backfill_stays_within_group() {
        let mut t = Taxonomy::new();
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::M);
        t.insert(entry("A", "P", "2"), "random", "500", DepthTier::M);
        t.insert(entry("A", "P", "3"), "bold-and-deep", "0", DepthTier::M);

        t.ensure_minimum_per_bucket(6);
        assert_eq!(names(t.list("random", "0", DepthTier::L)), ["1"]);
        assert_eq!(names(t.list("random", "500", DepthTier::L)), ["2"]);
        assert_eq!(names(t.list("bold-and-deep", "0", DepthTier::D)), ["3"]);
    }

    #[test]
    fn test_backfill_idempotent() {
        let mut t = Taxonomy::new();
        for i in 0..3 {
            t.insert(entry("A", "P", &format!("l{i}")), "random", "0", DepthTier::L);
        }
        for i in 0..4 {
            t.insert(entry("B", "Q", &format!("d{i}")), "random", "0", DepthTier::D);
        }
        t.insert(entry("C", "R", "m0"), "random", "1000", DepthTier::M);

        let copied = t.ensure_minimum_per_bucket(6);
        assert!(copied > 0);
        let once = t.clone();

        assert_eq!(t.ensure_minimum_per_bucket(6), 0);
        assert_eq!(t, once);
    }

    #[test]
    fn test_product_index_and_stats() {
        let mut t = Taxonomy::new();
        t.insert(entry("A", "P", "1"), "random", "0", DepthTier::L);
        t.insert(entry("A", "P", "2"), "random", "0", DepthTier::L);
        t.insert(entry("B", "Q", "1"), "bold-and-deep", "500", DepthTier::D);
        t.insert(entry("A", "P", "1"), "bold-and-deep", "500", DepthTier::D);

        let index = t.product_index();
        assert_eq!(index.len(), 2);
        assert!(index.contains(&("A".to_string(), "P".to_string())));

        let stats = t.stats();
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.unique_shades, 3);
        assert_eq!(stats.categories[0].label, "random");
        assert_eq!(stats.categories[0].tiers[0].light, 2);
        assert_eq!(stats.categories[1].tiers[0].dark, 2);
        assert_eq!(t.labels().collect::<Vec<_>>(), ["random", "bold-and-deep"]);
    }
}
