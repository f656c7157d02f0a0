//! # Awful News Feed
//!
//! Searches the Guardian content API and shows the resulting news feed in
//! the terminal.
//!
//! ## Usage
//!
//! ```sh
//! awful_news_feed -q "New York" --order-by relevance
//! awful_news_feed -i            # one search per stdin line
//! ```
//!
//! ## Architecture
//!
//! 1. **Query**: search term + ordering from settings become a request URL
//! 2. **Fetch**: one timed GET on a worker task
//! 3. **Parse**: `response.results` becomes a list of articles; bad entries are skipped
//! 4. **Deliver**: the newest load's result is handed to the terminal; superseded loads are dropped

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod connectivity;
mod error;
mod fetcher;
mod loader;
mod models;
mod outputs;
mod parser;
mod query;
mod settings;
mod utils;

use cli::Cli;
use connectivity::HostResolves;
use fetcher::{FetchTimeouts, HttpFetcher};
use loader::{FeedLoader, LoaderConfig};
use models::{FeedQuery, LoadState};
use outputs::{json, terminal::TerminalFeed};
use settings::{FixedSettings, SettingsProvider, YamlSettings};
use utils::ensure_writable_dir;

type Loader = FeedLoader<HttpFetcher, HostResolves, TerminalFeed<std::io::Stdout>>;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let settings: Box<dyn SettingsProvider> = match (args.order_by, &args.settings) {
        (Some(order_by), _) => Box::new(FixedSettings { order_by }),
        (None, Some(path)) => Box::new(YamlSettings::new(path)),
        (None, None) => Box::new(FixedSettings::default()),
    };

    let endpoint = query::validate_endpoint(&args.endpoint)?;
    let probe = HostResolves::for_endpoint(&endpoint).ok_or("endpoint has no resolvable host")?;
    let fetcher = HttpFetcher::new(FetchTimeouts {
        connect: Duration::from_secs(args.connect_timeout_secs),
        read: Duration::from_secs(args.read_timeout_secs),
    })?;
    let config = LoaderConfig {
        endpoint: args.endpoint.clone(),
        api_key: args.api_key.clone(),
    };
    let mut loader = FeedLoader::new(config, fetcher, probe, TerminalFeed::new(std::io::stdout()))?;

    loader.start(FeedQuery::new(args.query.clone(), settings.order_by()));

    if args.interactive {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        let term = line.trim();
                        let search_term = (!term.is_empty()).then(|| term.to_string());
                        loader.start(FeedQuery::new(search_term, settings.order_by()));
                    }
                    None => break,
                },
                Some(_) = loader.deliver_next() => {
                    save_shown_feed(&loader, args.json_output_dir.as_deref()).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    // First Ctrl-C cancels a running search, the next one quits.
                    if loader.state() == LoadState::Loading {
                        loader.cancel();
                    } else {
                        break;
                    }
                }
            }
        }
        loader.teardown();
    } else {
        let state = loader.deliver_next().await;
        debug!(?state, "Load finished");
        save_shown_feed(&loader, args.json_output_dir.as_deref()).await;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Write the feed on screen to JSON when an output directory was given.
async fn save_shown_feed(loader: &Loader, json_output_dir: Option<&str>) {
    let Some(dir) = json_output_dir else {
        return;
    };
    if let Some((query, articles)) = loader.consumer().shown() {
        if let Err(e) = json::write_feed(query, articles, dir).await {
            error!(error = %e, "Failed to write feed JSON");
        }
    }
}
