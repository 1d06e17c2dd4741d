//! `index`: regenerate the brand → products index document, or register one product in it.

use clap::Args;
use serde_json::json;

use crate::cli::common::{print_json, CliContext, CliResult};
use crate::constants::BRAND_INDEX_KEY;

/// Regenerate the brand index
#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Register a single product under this brand instead of regenerating
    #[arg(long, requires_all = ["product", "product_type"])]
    pub brand: Option<String>,

    /// Product name to register
    #[arg(long, requires = "brand")]
    pub product: Option<String>,

    /// Product type to register, e.g. "Face"
    #[arg(long = "type", requires = "brand")]
    pub product_type: Option<String>,

    /// Print the written document
    #[arg(long)]
    pub json: bool,
}

impl IndexArgs {
    /// Execute the index command
    pub fn execute(&self, ctx: &CliContext) -> CliResult<()> {
        if let (Some(brand), Some(product), Some(product_type)) =
            (&self.brand, &self.product, &self.product_type)
        {
            return self.register(ctx, brand, product, product_type);
        }

        let document = ctx.service(None)?.write_brand_index()?;

        if self.json {
            return print_json(&document);
        }

        let brands = document.as_object().map_or(0, serde_json::Map::len);
        println!("Wrote {BRAND_INDEX_KEY} ({brands} brands)");
        Ok(())
    }

    fn register(
        &self,
        ctx: &CliContext,
        brand: &str,
        product: &str,
        product_type: &str,
    ) -> CliResult<()> {
        let added = ctx
            .service(None)?
            .register_product(brand, product, product_type)?;

        if self.json {
            return print_json(&json!({
                "brand": brand,
                "product": product,
                "type": product_type,
                "added": added,
            }));
        }

        if added {
            println!("Registered {brand}/{product} ({product_type}) in {BRAND_INDEX_KEY}");
        } else {
            println!("{brand}/{product} already listed in {BRAND_INDEX_KEY}");
        }
        Ok(())
    }
}
