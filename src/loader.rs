//! Restartable, cancellable feed loading.
//!
//! [`FeedLoader`] runs QueryBuilder → Fetch → ArticleParser on a spawned tokio
//! task and hands the outcome back to its [`FeedConsumer`] from
//! [`FeedLoader::deliver_next`], which the owner awaits on its own task.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start──▶ Loading ──▶ Delivered | Failed | Cancelled
//!                   ▲                     │
//!                   └────────start────────┘
//! ```
//!
//! Every `start` bumps a generation counter. Completions carry the generation
//! they were started with and are dropped unless it is still current, so a
//! slow superseded load can never overwrite the result of a newer one. The
//! superseded worker is also cancelled through its `CancellationToken`.
//!
//! `start` never waits on the network. The connectivity check is awaited on
//! the worker task, ahead of the fetch, so a stalled resolver cannot hold up
//! the owner's task.

use crate::connectivity::ConnectivityProbe;
use crate::error::ConfigError;
use crate::fetcher::Fetch;
use crate::models::{FailureReason, FeedQuery, LoadResult, LoadState};
use crate::parser::parse_articles;
use crate::query::{build_url, validate_endpoint};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use url::Url;

/// Receives lifecycle changes and results from a [`FeedLoader`].
///
/// Both methods are only ever called from [`FeedLoader::start`],
/// [`FeedLoader::cancel`] and [`FeedLoader::deliver_next`], i.e. on the task
/// that owns the loader.
pub trait FeedConsumer {
    /// `Loading` when a load begins, then the terminal state when it ends.
    fn on_load_state_change(&mut self, state: LoadState);

    /// The single result of the most recent `start`.
    fn on_result(&mut self, query: &FeedQuery, result: LoadResult);
}

/// Fixed request configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub endpoint: String,
    pub api_key: String,
}

struct Completion {
    generation: u64,
    result: LoadResult,
}

struct InFlight {
    generation: u64,
    query: FeedQuery,
    cancel: CancellationToken,
}

pub struct FeedLoader<F, P, C> {
    config: LoaderConfig,
    fetcher: Arc<F>,
    probe: Arc<P>,
    consumer: C,
    generation: Arc<AtomicU64>,
    in_flight: Option<InFlight>,
    state: LoadState,
    torn_down: bool,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<F, P, C> FeedLoader<F, P, C>
where
    F: Fetch + Send + Sync + 'static,
    P: ConnectivityProbe + Send + Sync + 'static,
    C: FeedConsumer,
{
    /// Create an idle loader.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidConfiguration`] if the endpoint is not an
    /// absolute URL.
    pub fn new(
        config: LoaderConfig,
        fetcher: F,
        probe: P,
        consumer: C,
    ) -> Result<Self, ConfigError> {
        validate_endpoint(&config.endpoint)?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            probe: Arc::new(probe),
            consumer,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            state: LoadState::Idle,
            torn_down: false,
            tx,
            rx,
        })
    }

    /// Begin loading `query`, superseding any load still in flight.
    ///
    /// Returns the generation assigned to this load, or `None` once the
    /// loader has been torn down.
    pub fn start(&mut self, query: FeedQuery) -> Option<u64> {
        if self.torn_down {
            warn!("start() called after teardown; ignoring");
            return None;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.take() {
            debug!(
                superseded = previous.generation,
                generation, "Superseding in-flight load"
            );
            previous.cancel.cancel();
        }

        info!(
            generation,
            search_term = ?query.search_term,
            order_by = %query.order_by,
            "Starting feed load"
        );
        self.state = LoadState::Loading;
        self.consumer.on_load_state_change(LoadState::Loading);

        let cancel = CancellationToken::new();
        match build_url(
            &self.config.endpoint,
            query.search_term.as_deref(),
            query.order_by,
            &self.config.api_key,
        ) {
            Ok(url) => self.dispatch(generation, url, cancel.clone()),
            Err(e) => {
                error!(generation, error = %e, "Could not build request URL");
                self.complete_now(
                    generation,
                    LoadResult::Failure(FailureReason::InvalidConfiguration(e)),
                );
            }
        }

        self.in_flight = Some(InFlight {
            generation,
            query,
            cancel,
        });
        Some(generation)
    }

    /// Cancel the current load without tearing the loader down.
    ///
    /// The consumer sees `Cancelled` and no result for that load.
    pub fn cancel(&mut self) {
        if self.torn_down || self.state != LoadState::Loading {
            return;
        }
        self.invalidate();
        self.state = LoadState::Cancelled;
        self.consumer.on_load_state_change(LoadState::Cancelled);
    }

    /// Wait for the current load to finish and hand its result to the consumer.
    ///
    /// Stale completions are discarded while waiting. Returns the terminal
    /// state, or `None` immediately if nothing is loading.
    pub async fn deliver_next(&mut self) -> Option<LoadState> {
        while !self.torn_down && self.state == LoadState::Loading {
            let completion = self.rx.recv().await?;
            let current = self.generation.load(Ordering::SeqCst);
            if completion.generation != current {
                debug!(
                    stale = completion.generation,
                    current, "Dropping result of superseded load"
                );
                continue;
            }
            let Some(in_flight) = self.in_flight.take() else {
                continue;
            };

            let state = match completion.result {
                LoadResult::Failure(_) => LoadState::Failed,
                _ => LoadState::Delivered,
            };
            info!(
                generation = completion.generation,
                ?state,
                articles = completion.result.articles().len(),
                "Delivering feed result"
            );
            self.state = state;
            self.consumer.on_load_state_change(state);
            self.consumer.on_result(&in_flight.query, completion.result);
            return Some(state);
        }
        None
    }

    fn complete_now(&self, generation: u64, result: LoadResult) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.tx.send(Completion { generation, result });
    }

    fn dispatch(&self, generation: u64, url: Url, cancel: CancellationToken) {
        let fetcher = Arc::clone(&self.fetcher);
        let probe = Arc::clone(&self.probe);
        let current = Arc::clone(&self.generation);
        let tx = self.tx.clone();

        tokio::spawn(
            async move {
                let mut work = tokio::spawn(run_pipeline(fetcher, probe, url));
                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        work.abort();
                        debug!("Load cancelled before completion");
                        return;
                    }
                    joined = &mut work => match joined {
                        Ok(result) => result,
                        Err(e) => {
                            error!(error = %e, "Feed pipeline crashed");
                            LoadResult::Failure(FailureReason::Unexpected(e.to_string()))
                        }
                    },
                };

                if current.load(Ordering::SeqCst) != generation {
                    debug!("Load superseded while running; discarding result");
                    return;
                }
                let _ = tx.send(Completion { generation, result });
            }
            .instrument(info_span!("feed_load", generation)),
        );
    }
}

impl<F, P, C> FeedLoader<F, P, C> {
    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    /// Stop delivering for good. Any in-flight result is dropped and later
    /// `start` calls are ignored. The consumer is not called again.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.invalidate();
        if self.state == LoadState::Loading {
            self.state = LoadState::Cancelled;
        }
        debug!("Feed loader torn down");
    }

    fn invalidate(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}

impl<F, P, C> Drop for FeedLoader<F, P, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Check connectivity, then fetch and parse on the worker task.
async fn run_pipeline<F, P>(fetcher: Arc<F>, probe: Arc<P>, url: Url) -> LoadResult
where
    F: Fetch + Send + Sync + 'static,
    P: ConnectivityProbe + Send + Sync + 'static,
{
    if !probe.is_connected().await {
        warn!("No network connectivity; not sending request");
        return LoadResult::Failure(FailureReason::NoConnectivity);
    }
    match fetcher.fetch(&url).await {
        Ok(body) => LoadResult::from_articles(parse_articles(&body)),
        Err(e) => LoadResult::Failure(FailureReason::Fetch(e)),
    }
}
