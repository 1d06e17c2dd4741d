//! `inspect`: summarize a stored taxonomy.

use clap::Args;

use crate::cli::common::{parse_category, print_json, CliContext, CliError, CliResult};

/// Print statistics of a stored taxonomy
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Category id
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self, ctx: &CliContext) -> CliResult<()> {
        let category = parse_category(&self.category)?;
        let service = ctx.service(None)?;
        let key = service.taxonomy_key(&category);

        let taxonomy = service
            .load_taxonomy(&category)?
            .ok_or_else(|| CliError::io(format!("No taxonomy stored at {key}")))?;
        let stats = taxonomy.stats();

        if self.json {
            return print_json(&stats);
        }

        println!("{key}");
        println!(
            "{} entries, {} unique shades",
            stats.total_entries, stats.unique_shades
        );
        for category in &stats.categories {
            println!();
            println!("{}", category.label);
            for tier in &category.tiers {
                println!(
                    "  {:>6}  L {:>4}  M {:>4}  D {:>4}",
                    tier.price_tier, tier.light, tier.medium, tier.dark
                );
            }
        }
        Ok(())
    }
}
