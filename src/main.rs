//! Shade Catalog - classify cosmetic shades into a category/price/depth taxonomy
//!
//! This binary rebuilds, extends, and inspects the per-category taxonomy
//! documents stored in a directory-backed blob store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shade_catalog::cli::{
    AddArgs, BuildArgs, ClassifyArgs, CliContext, CliResult, ExitCode, IndexArgs, InspectArgs,
};
use shade_catalog::constants::APP_BINARY_NAME;

/// Shade Catalog - category/price/depth taxonomy builder
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Blob store root directory (overrides the configuration)
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild a category taxonomy from the store inventory
    Build(BuildArgs),
    /// Add shade records to a stored taxonomy
    Add(AddArgs),
    /// Classify a single color
    Classify(ClassifyArgs),
    /// Print statistics of a stored taxonomy
    Inspect(InspectArgs),
    /// Regenerate the brand index document
    Index(IndexArgs),
}

impl Commands {
    fn execute(&self, ctx: &CliContext) -> CliResult<()> {
        match self {
            Self::Build(args) => args.execute(ctx),
            Self::Add(args) => args.execute(ctx),
            Self::Classify(args) => args.execute(ctx),
            Self::Inspect(args) => args.execute(ctx),
            Self::Index(args) => args.execute(ctx),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so --json output on stdout stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = CliContext::resolve(cli.config.as_deref(), cli.store.as_deref())
        .and_then(|ctx| cli.command.execute(&ctx));

    match result {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code().code());
        }
    }
}
