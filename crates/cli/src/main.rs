//! WearView CLI - cart and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Show a browser's persisted cart
//! wv-cli cart show 5f0c6a1e-8d7b-4f6e-9a51-2b8c1d3e4f50
//!
//! # Same, as JSON, from a non-default data directory
//! wv-cli cart show 5f0c6a1e-8d7b-4f6e-9a51-2b8c1d3e4f50 --json --data-dir /var/lib/wearview
//!
//! # Empty a browser's cart
//! wv-cli cart clear 5f0c6a1e-8d7b-4f6e-9a51-2b8c1d3e4f50
//!
//! # List the catalog
//! wv-cli catalog
//! ```
//!
//! Without `--data-dir`, the storefront's `WEARVIEW_DATA_DIR` setting is used.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wearview_core::ClientId;
use wearview_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "wv-cli")]
#[command(author, version, about = "WearView CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or reset persisted carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List catalog products
    Catalog,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print a client's cart and totals
    Show {
        /// Client id (from the storefront session)
        client_id: ClientId,

        /// Directory holding persisted carts
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Empty a client's cart
    Clear {
        /// Client id (from the storefront session)
        client_id: ClientId,

        /// Directory holding persisted carts
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Explicit `--data-dir`, else the storefront configuration's.
fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => Ok(StorefrontConfig::from_env()?.data_dir),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show {
                client_id,
                data_dir,
                json,
            } => {
                let data_dir = resolve_data_dir(data_dir)?;
                commands::cart::show(&mut out, &data_dir, client_id, json)?;
            }
            CartAction::Clear {
                client_id,
                data_dir,
            } => {
                let data_dir = resolve_data_dir(data_dir)?;
                commands::cart::clear(&mut out, &data_dir, client_id)?;
            }
        },
        Commands::Catalog => commands::catalog::list(&mut out)?,
    }
    Ok(())
}
