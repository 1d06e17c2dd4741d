//! Build orchestration: records → classified entries → merged, backfilled taxonomy.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classifier::{Classifier, Placement, ShadeHints};
use crate::constants::DEFAULT_MIN_PER_BUCKET;
use crate::errors::{CatalogError, CatalogResult};
use crate::models::{strip_hash, ProductCategory, RgbColor, ShadeEntry, ShadeRecord};
use crate::pricing::PriceBuckets;
use crate::taxonomy::Taxonomy;

/// Counters collected during one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Records handed to the builder
    pub records: usize,
    /// Records left out because their product was already catalogued
    pub skipped_existing: usize,
    /// Records skipped for an invalid hex color
    pub invalid_hex: usize,
    /// `(record, label)` pairs dropped for lack of a depth tier
    pub dropped_labels: usize,
    /// Entries appended by classification
    pub inserted: usize,
    /// Entries contributed by the build on top of the existing taxonomy
    pub merged: usize,
    /// Entries copied by backfill
    pub backfilled: usize,
}

/// One record after classification, before it touches the taxonomy.
struct Classified {
    entry: ShadeEntry,
    price_tier: String,
    placements: Vec<Placement>,
}

/// Runs classification, bucketing, insertion, merge, and backfill.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    classifier: Classifier,
    pricing: PriceBuckets,
    min_per_bucket: usize,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(
            Classifier::default(),
            PriceBuckets::default(),
            DEFAULT_MIN_PER_BUCKET,
        )
    }
}

impl CatalogBuilder {
    /// Creates a builder with explicit collaborators.
    #[must_use]
    pub const fn new(classifier: Classifier, pricing: PriceBuckets, min_per_bucket: usize) -> Self {
        Self {
            classifier,
            pricing,
            min_per_bucket,
        }
    }

    /// The classifier in use.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The price bucket settings in use.
    #[must_use]
    pub const fn pricing(&self) -> PriceBuckets {
        self.pricing
    }

    fn classify_record(
        &self,
        record: &ShadeRecord,
        category: &ProductCategory,
    ) -> CatalogResult<Classified> {
        let rgb = RgbColor::from_hex(&record.shade_hex_code)?;
        let placements = self.classifier.classify(
            &rgb.to_hsv(),
            category,
            &ShadeHints::from_record(record),
        );

        Ok(Classified {
            entry: ShadeEntry::from_record(
                record,
                strip_hash(&record.shade_hex_code),
                category.id(),
            ),
            price_tier: self.pricing.tier(record.price),
            placements,
        })
    }

    /// Classifies `records` and inserts them into `taxonomy` without merge or
    /// backfill. Classification runs in parallel; inserts are applied in
    /// record order.
    pub fn classify_into(
        &self,
        records: &[ShadeRecord],
        category: &ProductCategory,
        taxonomy: &mut Taxonomy,
    ) -> BuildReport {
        let classified: Vec<CatalogResult<Classified>> = records
            .par_iter()
            .map(|record| self.classify_record(record, category))
            .collect();

        let mut report = BuildReport {
            records: records.len(),
            ..BuildReport::default()
        };

        for (record, result) in records.iter().zip(classified) {
            let classified = match result {
                Ok(classified) => classified,
                Err(e @ CatalogError::InvalidHex { .. }) => {
                    warn!("skipping shade '{}': {e}", record.dedup_key());
                    report.invalid_hex += 1;
                    continue;
                }
                Err(e) => {
                    warn!("skipping shade '{}': {e}", record.dedup_key());
                    continue;
                }
            };

            for placement in &classified.placements {
                match placement.placed() {
                    Ok(depth) => {
                        if taxonomy.insert(
                            classified.entry.clone(),
                            placement.label.as_str(),
                            &classified.price_tier,
                            depth,
                        ) {
                            report.inserted += 1;
                        }
                    }
                    Err(e) => {
                        debug!("dropping '{}' from label: {e}", record.dedup_key());
                        report.dropped_labels += 1;
                    }
                }
            }
        }

        report
    }

    /// Builds the taxonomy for `category`, merged into `existing` when given,
    /// then backfilled.
    #[must_use]
    pub fn build(
        &self,
        records: &[ShadeRecord],
        category: &ProductCategory,
        existing: Option<&Taxonomy>,
    ) -> Taxonomy {
        self.build_with_report(records, category, existing).0
    }

    /// [`CatalogBuilder::build`] plus its counters.
    pub fn build_with_report(
        &self,
        records: &[ShadeRecord],
        category: &ProductCategory,
        existing: Option<&Taxonomy>,
    ) -> (Taxonomy, BuildReport) {
        let mut built = Taxonomy::new();
        let mut report = self.classify_into(records, category, &mut built);

        let mut taxonomy = match existing {
            Some(existing) => {
                let mut merged = existing.clone();
                report.merged = merged.merge_from(&built);
                merged
            }
            None => {
                report.merged = report.inserted;
                built
            }
        };

        report.backfilled = taxonomy.ensure_minimum_per_bucket(self.min_per_bucket);

        info!(
            "built '{category}': {} records, {} placed, {} new after merge, {} backfilled, {} invalid hex, {} labels dropped",
            report.records,
            report.inserted,
            report.merged,
            report.backfilled,
            report.invalid_hex,
            report.dropped_labels
        );

        (taxonomy, report)
    }

    /// Builds only from records whose `(brand, product)` is absent from
    /// `existing`, then merges and backfills as [`CatalogBuilder::build`] does.
    pub fn build_incremental(
        &self,
        records: &[ShadeRecord],
        category: &ProductCategory,
        existing: &Taxonomy,
    ) -> (Taxonomy, BuildReport) {
        let known = existing.product_index();
        let fresh: Vec<ShadeRecord> = records
            .iter()
            .filter(|r| !known.contains(&(r.brand.clone(), r.product_name.clone())))
            .cloned()
            .collect();

        let skipped = records.len() - fresh.len();
        if skipped > 0 {
            debug!("skipping {skipped} records of already catalogued products");
        }

        let (taxonomy, mut report) = self.build_with_report(&fresh, category, Some(existing));
        report.records = records.len();
        report.skipped_existing = skipped;
        (taxonomy, report)
    }
}
