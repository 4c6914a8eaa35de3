//! asvzwatch - terminal views over the ASVZ marketplace dataset.
//!
//! Each subcommand renders one dashboard view (update trends, current
//! listings, search, price history) from the PocketBase backend.

mod app;
mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::Cli;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();
    let mut app = App::new()?;

    let result = commands::run(&mut app, cli.command).await;

    info!("asvzwatch finished");
    result
}
