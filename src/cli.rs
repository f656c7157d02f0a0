//! Command-line interface definitions for Awful News Feed.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can be provided via command-line flags or environment variables.

use crate::models::OrderBy;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Awful News Feed application.
///
/// # Examples
///
/// ```sh
/// # Latest articles
/// awful_news_feed
///
/// # One search, ordered by relevance
/// awful_news_feed -q "New York" --order-by relevance
///
/// # Search as you type: every stdin line starts a new search
/// awful_news_feed -i -s ~/.config/awful_news_feed/settings.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Content search endpoint
    #[arg(
        long,
        env = "NEWS_FEED_ENDPOINT",
        default_value = "https://content.guardianapis.com/search"
    )]
    pub endpoint: String,

    /// Content API key
    #[arg(long, env = "GUARDIAN_API_KEY", default_value = "test")]
    pub api_key: String,

    /// Initial search term; omit for the latest articles
    #[arg(short, long)]
    pub query: Option<String>,

    /// Result ordering; overrides the settings file
    #[arg(long, value_enum)]
    pub order_by: Option<OrderBy>,

    /// Optional path to a settings.yaml file, re-read for every search
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub read_timeout_secs: u64,

    /// Read search terms from stdin, one per line, restarting the load each time
    #[arg(short, long)]
    pub interactive: bool,

    /// Also write each delivered feed to this directory as JSON
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}
