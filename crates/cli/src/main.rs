//! Fittipaldi cart CLI - inspect and change the storefront cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a product
//! fitti-cart add --id elite-pro --name "Elite Pro" --price 129000 --quantity 2
//!
//! # Set a row's quantity (zero or negative removes it)
//! fitti-cart update elite-pro 5
//!
//! # Show the cart as text or JSON
//! fitti-cart show
//! fitti-cart show --json
//!
//! # Remove one row, or everything
//! fitti-cart remove elite-pro
//! fitti-cart clear
//! ```
//!
//! # Environment
//!
//! - `CART_DATA_DIR` - Directory holding the cart slot (default: .fittipaldi)
//! - `CART_STORAGE_KEY` - Storage key of the slot (default: fittipald1-cart)
//! - `CART_CURRENCY` - Display currency (default: ARS)
//! - `RUST_LOG` - Log filter; logs and analytics events go to stderr

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fittipaldi_cart::{CartConfig, CartPersistence, CartStore, FileStorage, TracingObserver};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fitti-cart")]
#[command(author, version, about = "Fittipaldi storefront cart tools")]
struct Cli {
    /// Override `CART_DATA_DIR`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show {
        /// Print the display model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add units of a product, merging with an existing row
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price, e.g. 129000 or 12.50
        #[arg(short, long)]
        price: Decimal,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Product description
        #[arg(short, long)]
        description: Option<String>,

        /// Image path or URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a row
    Remove {
        /// Product id
        id: String,
    },
    /// Set a row's quantity; zero or negative removes it
    Update {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Place an order for the current cart
    Checkout,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    // Defaults to info for the CLI and the analytics stream if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,fitti_cart=info,fittipaldi_cart::analytics=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn open_store(cli: &Cli) -> Result<CartStore, Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    tracing::debug!(data_dir = %config.data_dir.display(), key = %config.storage_key, "Loaded cart config");

    let storage = FileStorage::open(&config.data_dir)?;
    let persistence = CartPersistence::with_key(Box::new(storage), config.storage_key);
    let mut store = CartStore::open(persistence).with_currency(config.currency);
    store.subscribe(TracingObserver::new(config.currency));
    Ok(store)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(&cli)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Show { json } => commands::cart::show(&store, json, &mut out)?,
        Commands::Add {
            id,
            name,
            price,
            quantity,
            description,
            image,
        } => {
            let product = commands::cart::product(id, name, price, description, image);
            commands::cart::add(&mut store, product, quantity, &mut out)?;
        }
        Commands::Remove { id } => commands::cart::remove(&mut store, &id, &mut out)?,
        Commands::Update { id, quantity } => {
            commands::cart::update(&mut store, &id, quantity, &mut out)?;
        }
        Commands::Clear => commands::cart::clear(&mut store, &mut out)?,
        Commands::Checkout => commands::cart::checkout(&store)?,
    }
    Ok(())
}
