//! `add`: insert shade records into a stored taxonomy.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::common::{parse_category, print_json, CliContext, CliError, CliResult};
use crate::models::ShadeRecord;

/// Add shades to a stored taxonomy
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Category id of the taxonomy to update
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: String,

    /// JSON file holding an array of shade records
    #[arg(short, long, value_name = "FILE")]
    pub shades: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AddResponse {
    success: bool,
    key: String,
    added: usize,
    rejected: usize,
    invalid_hex: usize,
}

impl AddArgs {
    /// Execute the add command
    pub fn execute(&self, ctx: &CliContext) -> CliResult<()> {
        let category = parse_category(&self.category)?;

        let content = fs::read_to_string(&self.shades).map_err(|e| {
            CliError::io(format!("Failed to read {}: {e}", self.shades.display()))
        })?;
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            CliError::validation(format!("Invalid JSON in {}: {e}", self.shades.display()))
        })?;
        let (records, rejected) = ShadeRecord::parse_batch(&value)?;

        let report = ctx.service(None)?.add_shades(&category, &records)?;

        let response = AddResponse {
            success: true,
            key: report.key,
            added: report.added,
            rejected,
            invalid_hex: report.build.invalid_hex,
        };

        if self.json {
            return print_json(&response);
        }

        println!("Added {} entries to {}", response.added, response.key);
        if response.rejected + response.invalid_hex > 0 {
            println!(
                "Skipped {} unreadable records and {} invalid hex colors",
                response.rejected, response.invalid_hex
            );
        }
        Ok(())
    }
}
