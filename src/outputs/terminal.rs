//! Terminal presentation of the feed.
//!
//! [`TerminalFeed`] is the [`FeedConsumer`] used by the binary. It shows a
//! progress line while loading, then either the articles or one of the
//! empty-state messages below.

use crate::loader::FeedConsumer;
use crate::models::{Article, FailureReason, FeedQuery, LoadResult, LoadState};
use chrono::DateTime;
use std::fmt;
use std::io::Write;
use tracing::warn;

pub const NO_CONNECTION: &str = "No internet connection.";
pub const LOAD_FAILED: &str = "Unable to load news articles.";
pub const INSTRUCTIONS: &str = "Type a topic to search the news.";
pub const NO_ARTICLES: &str = "No news articles found.";

/// The message to show instead of a list, or `None` when there are articles.
pub fn status_message(result: &LoadResult, search_term: Option<&str>) -> Option<&'static str> {
    match result {
        LoadResult::Success(_) => None,
        LoadResult::Failure(FailureReason::NoConnectivity) => Some(NO_CONNECTION),
        LoadResult::Failure(_) => Some(LOAD_FAILED),
        LoadResult::Empty if search_term.is_none() => Some(INSTRUCTIONS),
        LoadResult::Empty => Some(NO_ARTICLES),
    }
}

/// Render an upstream ISO-8601 timestamp as e.g. `Jan 1, 2020 00:00`.
///
/// Anything that is not RFC 3339 is shown as-is.
pub fn format_publication_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Writes the feed to any [`Write`] sink, normally stdout.
pub struct TerminalFeed<W> {
    out: W,
    shown: Option<(FeedQuery, Vec<Article>)>,
}

impl<W: Write> TerminalFeed<W> {
    pub fn new(out: W) -> Self {
        Self { out, shown: None }
    }

    /// The feed currently on screen together with the query that produced it.
    pub fn shown(&self) -> Option<(&FeedQuery, &[Article])> {
        self.shown
            .as_ref()
            .map(|(query, articles)| (query, articles.as_slice()))
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn render_article(&mut self, index: usize, article: &Article) {
        self.line(format_args!("{:>3}. {}", index + 1, article.headline()));
        self.line(format_args!(
            "     {}",
            format_publication_date(article.publication_date())
        ));
        self.line(format_args!("     {}", article.article_url()));
        self.line(format_args!("     thumbnail: {}", article.image_url()));
    }
}

impl<W: Write> FeedConsumer for TerminalFeed<W> {
    fn on_load_state_change(&mut self, state: LoadState) {
        match state {
            LoadState::Loading => {
                // A new search replaces whatever was shown.
                self.shown = None;
                self.line(format_args!("Loading…"));
            }
            LoadState::Cancelled => self.line(format_args!("Cancelled.")),
            LoadState::Idle | LoadState::Delivered | LoadState::Failed => {}
        }
    }

    fn on_result(&mut self, query: &FeedQuery, result: LoadResult) {
        if let Some(message) = status_message(&result, query.search_term.as_deref()) {
            if let LoadResult::Failure(reason) = &result {
                warn!(%reason, "Feed load failed");
            }
            self.line(format_args!("{message}"));
            return;
        }

        let articles = match result {
            LoadResult::Success(articles) => articles,
            _ => return,
        };
        for (index, article) in articles.iter().enumerate() {
            self.render_article(index, article);
        }
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "Failed to flush terminal");
        }
        self.shown = Some((query.clone(), articles));
    }
}
