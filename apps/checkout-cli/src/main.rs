//! Checkout CLI - order summary and checkout from the terminal.
//!
//! Commands:
//! - `checkout quote <subtotal>` - Totals for an arbitrary subtotal
//! - `checkout add <id> <name> <price>` - Add an item to the stored cart
//! - `checkout remove <id>` - Remove an item from the stored cart
//! - `checkout cart` - Show the stored cart and its totals
//! - `checkout place` - Submit the stored cart as an order
//! - `checkout session` - Show the configured session token's status

mod commands;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use storefront_client::{CheckoutSession, ClientConfig, HttpStorefrontApi};
use storefront_db::{Database, DbConfig};

/// Storefront checkout from the command line
#[derive(Parser)]
#[command(name = "checkout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (default: platform config dir/storefront.toml)
    #[arg(short, long, global = true, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals for a subtotal using live shipping tiers
    Quote {
        /// Order subtotal, e.g. 49.99
        subtotal: String,

        /// Coupon code to validate and apply
        #[arg(long)]
        coupon: Option<String>,
    },

    /// Add an item to the stored cart
    Add {
        product_id: String,
        name: String,
        /// Unit price, e.g. 12.50
        price: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove an item from the stored cart
    Remove { product_id: String },

    /// Show the stored cart and its totals
    Cart {
        #[arg(long)]
        coupon: Option<String>,
    },

    /// Submit the stored cart as an order
    Place {
        #[arg(long)]
        coupon: Option<String>,
    },

    /// Show the status of the configured session token
    Session,
}

/// Everything a command needs.
pub struct Context {
    pub config: ClientConfig,
    pub api: Arc<HttpStorefrontApi>,
    pub session: CheckoutSession,
    pub json: bool,
    db: Database,
}

impl Context {
    async fn load(config_path: Option<PathBuf>, json: bool) -> Result<Self> {
        let config = ClientConfig::load(config_path).context("loading configuration")?;
        debug!(base_url = %config.api.base_url, "Configuration loaded");

        let db_path = config.cart_database_path();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let db = Database::new(DbConfig::new(&db_path))
            .await
            .with_context(|| format!("opening cart database {}", db_path.display()))?;

        let api = Arc::new(HttpStorefrontApi::from_config(&config)?);
        let carts = Arc::new(db.carts(config.cart.cart_key.clone()));
        let session = CheckoutSession::new(api.clone(), carts);

        Ok(Context {
            config,
            api,
            session,
            json,
            db,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let ctx = Context::load(cli.config, cli.json).await?;
    info!(cart_key = %ctx.config.cart.cart_key, "Checkout ready");

    let result = match cli.command {
        Commands::Quote { subtotal, coupon } => {
            commands::quote(&ctx, &subtotal, coupon.as_deref()).await
        }
        Commands::Add {
            product_id,
            name,
            price,
            quantity,
        } => commands::add(&ctx, product_id, name, &price, quantity).await,
        Commands::Remove { product_id } => commands::remove(&ctx, &product_id).await,
        Commands::Cart { coupon } => commands::cart(&ctx, coupon.as_deref()).await,
        Commands::Place { coupon } => commands::place(&ctx, coupon.as_deref()).await,
        Commands::Session => commands::session(&ctx),
    };

    ctx.db.close().await;
    result
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_client=trace` - Trace for one crate only
/// - Default: INFO (logs go to stderr, command output to stdout)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
