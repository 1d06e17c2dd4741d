//! `classify`: show the labels and depth tiers of one color.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::classifier::ShadeHints;
use crate::cli::common::{
    load_classifier, parse_category, print_json, CliContext, CliError, CliResult,
};
use crate::models::RgbColor;

/// Classify a single color
#[derive(Debug, Clone, Args)]
pub struct ClassifyArgs {
    /// Hex color (#RRGGBB)
    #[arg(long, value_name = "HEX")]
    pub hex: String,

    /// Requested category id
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: String,

    /// Skin-depth hint (F, FM, MD, D1, D2, VD)
    #[arg(long, value_name = "CODE")]
    pub skintone: Option<String>,

    /// Finish (contour)
    #[arg(long, value_name = "FINISH")]
    pub finish: Option<String>,

    /// Price, to show its tier
    #[arg(long, value_name = "PRICE")]
    pub price: Option<f64>,

    /// Rule table (JSON) replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlacementItem {
    label: String,
    depth: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    hex: String,
    hue: f64,
    saturation: f64,
    value: f64,
    price_tier: String,
    placements: Vec<PlacementItem>,
}

impl ClassifyArgs {
    /// Execute the classify command
    pub fn execute(&self, ctx: &CliContext) -> CliResult<()> {
        let category = parse_category(&self.category)?;
        let classifier = load_classifier(self.rules.as_deref())?;
        let rgb =
            RgbColor::from_hex(&self.hex).map_err(|e| CliError::validation(e.to_string()))?;
        let hsv = rgb.to_hsv();

        let hints = ShadeHints {
            skintone: self.skintone.as_deref(),
            finish: self.finish.as_deref(),
            coverage: None,
        };

        let response = ClassifyResponse {
            hex: rgb.to_hex(),
            hue: hsv.hue,
            saturation: hsv.saturation,
            value: hsv.value,
            price_tier: ctx.config.price_buckets().tier(self.price),
            placements: classifier
                .classify(&hsv, &category, &hints)
                .into_iter()
                .map(|p| PlacementItem {
                    label: p.label.to_string(),
                    depth: p.depth.map(|d| d.to_string()),
                })
                .collect(),
        };

        if self.json {
            return print_json(&response);
        }

        println!("{} → {hsv}, price tier {}", response.hex, response.price_tier);
        for placement in &response.placements {
            println!(
                "  {:<20} {}",
                placement.label,
                placement.depth.as_deref().unwrap_or("(no tier, dropped)")
            );
        }
        Ok(())
    }
}
