//! Circuit Cart CLI - operator access to the admin dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Catalog
//! cc-cli inventory list
//! cc-cli inventory add --name "ESP32 DevKit V1" --category microcontrollers --price 370 --stock 40 --image ./esp32.jpg
//! cc-cli inventory scrap 42
//!
//! # Customers and carts
//! cc-cli customers list
//! cc-cli customers inspect u-asha
//!
//! # Orders
//! cc-cli orders list --status pending
//! cc-cli orders confirm ord-1001 --date 2026-10-24
//! cc-cli orders ship ord-1001
//! cc-cli --yes orders reject ord-1002
//!
//! # Headline figures and the remembered tab
//! cc-cli stats
//! cc-cli tab orders
//!
//! # Any command against the seeded in-memory store
//! cc-cli --demo orders list
//! ```
//!
//! Live mode needs the variables documented in
//! `circuit_cart_admin::config` plus `ADMIN_ID_TOKEN`. Every run signs in,
//! performs one action and signs out; demo mode starts from fresh seed data
//! each time.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cc-cli")]
#[command(author, version, about = "Circuit Cart admin CLI")]
struct Cli {
    /// Use the seeded in-memory store instead of the backend
    #[arg(long, global = true)]
    demo: bool,

    /// Answer yes to destructive confirmations
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Look at customers and their saved carts
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Process orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Show headline figures
    Stats,
    /// Show or set the remembered dashboard tab
    Tab {
        /// `inventory`, `customers` or `orders`
        tab: Option<String>,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// List the catalog, newest first
    List,
    /// Add a component
    Add {
        #[arg(short, long)]
        name: String,

        /// `microcontrollers`, `components`, `tools`, `kits` or `projects`
        #[arg(short, long)]
        category: String,

        /// Unit price in rupees
        #[arg(short, long)]
        price: String,

        /// Units on hand
        #[arg(short, long)]
        stock: String,

        /// Image file to upload
        #[arg(long)]
        image: Option<std::path::PathBuf>,

        /// Image URL, used when no file is given or the upload fails
        #[arg(long, default_value = "")]
        image_url: String,

        #[arg(short, long, default_value = "")]
        desc: String,

        /// Discount percentage
        #[arg(long, default_value = "")]
        discount: String,
    },
    /// Delete a component
    Scrap { id: String },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List customers with cart size and value
    List,
    /// Show one customer's cart
    Inspect { user_id: String },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders, newest first
    List {
        /// Only orders with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Show an order's manifest
    Show { id: String },
    /// Confirm a pending order
    Confirm {
        id: String,

        /// Expected delivery date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a confirmed order shipped
    Ship { id: String },
    /// Mark a shipped order delivered
    Deliver { id: String },
    /// Reject an order (kept with status `rejected`)
    Reject { id: String },
    /// Delete an order permanently
    Purge { id: String },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "circuit_cart_admin=warn,cc_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let session = commands::Session::open(cli.demo, cli.yes).await?;

    let result = match cli.command {
        Commands::Inventory { action } => match action {
            InventoryAction::List => commands::inventory::list(&session).await,
            InventoryAction::Add {
                name,
                category,
                price,
                stock,
                image,
                image_url,
                desc,
                discount,
            } => {
                let draft = circuit_cart_admin::models::ProductDraft {
                    name,
                    category,
                    price,
                    stock,
                    image_url,
                    desc,
                    discount,
                };
                commands::inventory::add(&session, &draft, image.as_deref()).await
            }
            InventoryAction::Scrap { id } => commands::inventory::scrap(&session, &id).await,
        },
        Commands::Customers { action } => match action {
            CustomerAction::List => commands::customers::list(&session).await,
            CustomerAction::Inspect { user_id } => {
                commands::customers::inspect(&session, &user_id).await
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::List { status } => {
                commands::orders::list(&session, status.as_deref()).await
            }
            OrderAction::Show { id } => commands::orders::show(&session, &id).await,
            OrderAction::Confirm { id, date } => {
                commands::orders::confirm(&session, &id, date.as_deref()).await
            }
            OrderAction::Ship { id } => commands::orders::ship(&session, &id).await,
            OrderAction::Deliver { id } => commands::orders::deliver(&session, &id).await,
            OrderAction::Reject { id } => commands::orders::reject(&session, &id).await,
            OrderAction::Purge { id } => commands::orders::purge(&session, &id).await,
        },
        Commands::Stats => commands::stats(&session).await,
        Commands::Tab { tab } => commands::tab(&session, tab.as_deref()).await,
    };

    session.close().await;
    result
}
