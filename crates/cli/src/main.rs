//! Corner Shop CLI - browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products, cheapest first
//! cornershop products --sort price-asc
//!
//! # Search within a category
//! cornershop products --search shirt --category "men's clothing"
//!
//! # Cart
//! cornershop cart add sample-1 --quantity 2
//! cornershop cart update sample-1 0
//! cornershop cart show
//!
//! # Newsletter
//! cornershop subscribe reader@example.com
//! ```
//!
//! # Commands
//!
//! - `products` - List products with search, category and sort
//! - `categories` - List catalog categories
//! - `cart` - Show or change the cart
//! - `subscribe` - Sign up for the newsletter
//! - `search` - Print the search results path for a query

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cornershop_storefront::AppState;
use cornershop_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cornershop")]
#[command(author, version, about = "Corner Shop storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products whose title or description contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only products in this category (`All` for every category)
        #[arg(short, long, default_value = "All")]
        category: String,

        /// Sort order (`featured`, `price-asc`, `price-desc`, `rating`)
        #[arg(long, default_value = "featured")]
        sort: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List product categories
    Categories,
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Subscribe an email address to the newsletter
    Subscribe {
        /// Email address
        email: String,
    },
    /// Print where a search would navigate
    Search {
        /// Search text
        query: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and subtotal
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a product's quantity (0 or less removes it)
    Update {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cornershop_storefront=info,cornershop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Products {
            search,
            category,
            sort,
            json,
        } => commands::catalog::products(&state, &search, &category, &sort, json).await?,
        Commands::Categories => commands::catalog::categories(&state).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&state, &product_id, quantity).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&state, &product_id, quantity)?,
            CartAction::Remove { product_id } => commands::cart::remove(&state, &product_id)?,
            CartAction::Clear => commands::cart::clear(&state)?,
        },
        Commands::Subscribe { email } => commands::newsletter::subscribe(&state, &email).await?,
        Commands::Search { query } => commands::search::submit(&state, &query),
    }
    Ok(())
}
