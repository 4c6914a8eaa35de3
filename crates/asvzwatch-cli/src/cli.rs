use clap::{Parser, Subcommand};

use crate::commands::{auth, listings, prices, search, trends};

#[derive(Debug, Parser)]
#[command(name = "asvzwatch")]
#[command(about = "Analytics views for the ASVZ marketplace dataset", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the backend and remember the session
    Login(auth::LoginArgs),

    /// Forget the stored session
    Logout(auth::LogoutArgs),

    /// Added/updated/deleted counts and running totals over time
    Trends(trends::Args),

    /// Current marketplace listings, paged, with thumbnails
    Listings(listings::Args),

    /// Search live and deleted listings
    Search(search::Args),

    /// Price history of one listing
    Prices(prices::Args),
}
