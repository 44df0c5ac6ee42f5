//! RocketShoes CLI - Drive the cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! rs-cart show
//!
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Hold three units of product 1
//! rs-cart update 1 3
//!
//! # Remove product 1, then empty the cart
//! rs-cart remove 1
//! rs-cart clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print entries, subtotals, and the cart total
//! - `add` / `remove` / `update` / `clear` - Mutate the cart
//!
//! Configuration comes from the environment (see `rocketshoes_cart::config`);
//! `--api-url` and `--store` override it.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    /// Catalog API base URL (overrides `CATALOG_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<Url>,

    /// Store file path (overrides `CART_STORE_PATH`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the amount held for a product
    Update {
        /// Product ID
        id: ProductId,

        /// Target amount
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Remove every product from the cart
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cli=info,rocketshoes_cart=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if cli.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let manager = commands::cart::open(cli.api_url, cli.store).await?;

    match cli.command {
        Commands::Show => commands::cart::show(&manager),
        Commands::Add { id } => commands::cart::add(&manager, id).await?,
        Commands::Remove { id } => commands::cart::remove(&manager, id).await?,
        Commands::Update { id, amount } => commands::cart::update(&manager, id, amount).await?,
        Commands::Clear => commands::cart::clear(&manager).await?,
    }
    Ok(())
}
