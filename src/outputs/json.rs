//! JSON snapshots of delivered feeds.
//!
//! # Output Structure
//!
//! Files are organized by date, one file per search:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── latest.json        # no search term
//!     └── new-york.json      # search "New York"
//! ```
//!
//! A later search with the same term on the same day overwrites the file.

use crate::models::{Article, FeedQuery, OrderBy};
use crate::utils::slugify;
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct FeedSnapshot<'a> {
    fetched_at: String,
    search_term: Option<&'a str>,
    order_by: OrderBy,
    articles: &'a [Article],
}

/// File name for a query: the slugified search term, or `latest`.
pub fn snapshot_file_name(query: &FeedQuery) -> String {
    let slug = query
        .search_term
        .as_deref()
        .map(slugify)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| "latest".to_string());
    format!("{slug}.json")
}

/// Write a delivered feed to `{json_output_dir}/{date}/{slug}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation, serialization or
/// the write fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_feed(
    query: &FeedQuery,
    articles: &[Article],
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let now = Local::now();
    let snapshot = FeedSnapshot {
        fetched_at: now.to_rfc3339(),
        search_term: query.search_term.as_deref(),
        order_by: query.order_by,
        articles,
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    let full_json_dir = PathBuf::from(json_output_dir).join(now.date_naive().to_string());
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_path = full_json_dir.join(snapshot_file_name(query));
    fs::write(&output_path, json).await?;
    info!(path = %output_path.display(), count = articles.len(), "Wrote feed JSON");

    Ok(output_path)
}
