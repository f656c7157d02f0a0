//! Data models for feed articles, queries and load outcomes.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A normalized news article extracted from one API result
//! - [`OrderBy`] and [`FeedQuery`]: What the user asked for
//! - [`LoadResult`] and [`FailureReason`]: What a single load produced
//! - [`LoadState`]: Where the loader is in its lifecycle

use crate::error::{ConfigError, FetchError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image shown for articles that come without a thumbnail.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "http://cvalink.com/wp-content/themes/TechNews/images/img_not_available.png";

/// A news article as delivered to the presentation layer.
///
/// Values are immutable once built. Two articles are equal when all four
/// fields are equal.
///
/// # Fields
///
/// * `image_url` - Thumbnail URL, or [`PLACEHOLDER_IMAGE_URL`]; never empty
/// * `headline` - The article title
/// * `publication_date` - ISO-8601 timestamp exactly as sent upstream
/// * `article_url` - Link to the full article; not validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    image_url: String,
    headline: String,
    publication_date: String,
    article_url: String,
}

impl Article {
    /// Build an article, substituting the placeholder for a missing or empty
    /// thumbnail.
    pub fn new(
        image_url: Option<String>,
        headline: String,
        publication_date: String,
        article_url: String,
    ) -> Self {
        let image_url = image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());
        Self {
            image_url,
            headline,
            publication_date,
            article_url,
        }
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    pub fn article_url(&self) -> &str {
        &self.article_url
    }
}

/// Result ordering understood by the content API's `order-by` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Newest,
    Oldest,
    Relevance,
}

impl OrderBy {
    /// The wire value sent as `order-by`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Newest => "newest",
            OrderBy::Oldest => "oldest",
            OrderBy::Relevance => "relevance",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one feed request.
///
/// `search_term: None` means "no search" and is distinct from
/// `Some(String::new())`, which still sends an empty `q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub search_term: Option<String>,
    pub order_by: OrderBy,
}

impl FeedQuery {
    pub fn new(search_term: Option<String>, order_by: OrderBy) -> Self {
        Self {
            search_term,
            order_by,
        }
    }
}

/// Why a load produced no feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The pre-flight connectivity probe reported no network.
    NoConnectivity,
    /// The request URL could not be built.
    InvalidConfiguration(ConfigError),
    /// The HTTP round-trip failed.
    Fetch(FetchError),
    /// The worker pipeline panicked or was torn down by the runtime.
    Unexpected(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoConnectivity => f.write_str("no network connectivity"),
            FailureReason::InvalidConfiguration(e) => write!(f, "{e}"),
            FailureReason::Fetch(e) => write!(f, "{e}"),
            FailureReason::Unexpected(detail) => write!(f, "unexpected failure: {detail}"),
        }
    }
}

/// Terminal outcome of one accepted `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// At least one article, in upstream order.
    Success(Vec<Article>),
    /// The request succeeded but nothing usable came back.
    Empty,
    Failure(FailureReason),
}

impl LoadResult {
    /// Wrap parsed articles, mapping an empty list to [`LoadResult::Empty`].
    pub fn from_articles(articles: Vec<Article>) -> Self {
        if articles.is_empty() {
            LoadResult::Empty
        } else {
            LoadResult::Success(articles)
        }
    }

    pub fn articles(&self) -> &[Article] {
        match self {
            LoadResult::Success(articles) => articles,
            _ => &[],
        }
    }
}

/// Lifecycle of a [`FeedLoader`](crate::loader::FeedLoader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Delivered,
    Failed,
    Cancelled,
}
