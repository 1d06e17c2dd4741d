//! `build`: rebuild a category taxonomy from the store inventory.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::common::{parse_category, print_json, CliContext, CliError, CliResult};
use crate::services::{
    BuildReport, ConsideredProduct, RebuildOptions, RebuildReport, RebuildSummary,
};

/// Rebuild a category taxonomy
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Category id (e.g. lip-gloss, foundation, contour)
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: String,

    /// Reclassify products that are already catalogued
    #[arg(long)]
    pub full: bool,

    /// Write the result back to the store
    #[arg(long)]
    pub publish: bool,

    /// Also write the taxonomy document to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Rule table (JSON) replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BuildResponse<'a> {
    success: bool,
    filename: &'a str,
    target_key_if_uploaded: &'a str,
    published: bool,
    considered: &'a [ConsideredProduct],
    summary: &'a RebuildSummary,
    build: &'a BuildReport,
}

impl<'a> From<&'a RebuildReport> for BuildResponse<'a> {
    fn from(report: &'a RebuildReport) -> Self {
        Self {
            success: true,
            filename: &report.filename,
            target_key_if_uploaded: &report.target_key,
            published: report.published,
            considered: &report.considered,
            summary: &report.summary,
            build: &report.build,
        }
    }
}

impl BuildArgs {
    /// Execute the build command
    pub fn execute(&self, ctx: &CliContext) -> CliResult<()> {
        let category = parse_category(&self.category)?;
        let service = ctx.service(self.rules.as_deref())?;

        let report = service.rebuild(
            &category,
            RebuildOptions {
                full: self.full,
                publish: self.publish,
            },
        )?;

        if let Some(path) = &self.output {
            let json = serde_json::to_string_pretty(&report.taxonomy)
                .map_err(|e| CliError::io(format!("Failed to serialize taxonomy: {e}")))?;
            fs::write(path, json).map_err(|e| {
                CliError::io(format!("Failed to write {}: {e}", path.display()))
            })?;
        }

        if self.json {
            return print_json(&BuildResponse::from(&report));
        }

        println!(
            "Built '{}': {} products, {} shades",
            report.category, report.summary.products_considered, report.summary.total_shades
        );
        for product in &report.considered {
            println!("  {:<24} {:<32} {}", product.brand, product.product, product.count);
        }
        println!(
            "Labels: {}",
            if report.summary.top_level_categories.is_empty() {
                "(none)".to_string()
            } else {
                report.summary.top_level_categories.join(", ")
            }
        );
        if report.build.invalid_hex > 0 {
            println!("Skipped {} shades with invalid hex colors", report.build.invalid_hex);
        }
        if report.published {
            println!("Published to {}", report.target_key);
        } else {
            println!("Not published (use --publish to write {})", report.target_key);
        }
        if let Some(path) = &self.output {
            println!("Wrote {}", path.display());
        }

        Ok(())
    }
}
