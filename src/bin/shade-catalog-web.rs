//! Shade Catalog Web Server Binary
//!
//! This binary starts the HTTP API used by the shade data-entry frontend to
//! rebuild and extend the per-category taxonomies.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 3001, store from the configuration)
//! shade-catalog-web
//!
//! # Specify port and store directory
//! shade-catalog-web --port 8080 --store /srv/shade-data
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shade_catalog::config::Config;
use shade_catalog::web;

/// Shade Catalog Web Server - REST API for the taxonomy builder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Blob store root directory.
    /// Defaults to `store.root` from the configuration, then to the
    /// platform-specific store directory:
    /// - Linux: ~/.config/ShadeCatalog/store/
    /// - macOS: ~/Library/Application Support/ShadeCatalog/store/
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!("Using default configuration: {e:#}");
            Config::default()
        })),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(args.config.as_ref())?;

    // Store root: --store, then the configuration, then the config dir
    let store_root = match args.store {
        Some(path) => path,
        None => config.store_root()?,
    };
    std::fs::create_dir_all(&store_root).context(format!(
        "Failed to create store directory: {}",
        store_root.display()
    ))?;

    info!("Store root: {}", store_root.display());

    // Build socket address
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    // Start the server
    web::run_server(config, store_root, addr).await
}
