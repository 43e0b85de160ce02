//! Stockbook CLI - database migrations, sample data and reports.
//!
//! # Usage
//!
//! ```bash
//! # Create the inventory schema and session table
//! sb-cli migrate
//!
//! # Replace all inventory data with the sample data set
//! sb-cli seed
//!
//! # Add the sample data without clearing existing rows
//! sb-cli seed --keep-existing
//!
//! # Print stock on hand per product and location
//! sb-cli balance
//! ```
//!
//! All commands read `STOCKBOOK_DATABASE_URL` (or `DATABASE_URL`), loading a
//! `.env` file first when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(author, version, about = "Stockbook CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load the sample products, locations and movements
    Seed {
        /// Keep existing rows instead of clearing the inventory tables first
        #[arg(long)]
        keep_existing: bool,
    },
    /// Print the stock balance report
    Balance,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { keep_existing } => commands::seed::run(keep_existing).await?,
        Commands::Balance => commands::balance::run().await?,
    }
    Ok(())
}
