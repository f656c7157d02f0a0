//! HTTP access to the content API.
//!
//! The loader depends on the [`Fetch`] trait rather than on `reqwest`
//! directly, so tests can swap in fetchers with scripted delays and bodies.
//! [`HttpFetcher`] is the production implementation.
//!
//! # Behaviour
//!
//! - One GET per call, no retries
//! - Connect timeout 15s and read timeout 10s by default
//! - Only `200 OK` counts as success; the body of any other status is dropped unread
//! - The response is owned by the call and released on every return path

use crate::error::FetchError;
use crate::query::redact_api_key;
use reqwest::StatusCode;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use url::Url;

/// A single timed GET returning the raw response body.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Connect and read timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            read: Duration::from_secs(10),
        }
    }
}

/// `reqwest`-backed [`Fetch`] implementation.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose client enforces `timeouts`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Network`] if the TLS backend or client cannot be initialised.
    pub fn new(timeouts: FetchTimeouts) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(url = %redact_api_key(url)))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let t0 = Instant::now();

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let err = FetchError::from(e);
            warn!(elapsed_ms = t0.elapsed().as_millis(), error = %err, "Request failed");
            err
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Error response code; discarding body");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            let err = FetchError::from(e);
            warn!(elapsed_ms = t0.elapsed().as_millis(), error = %err, "Reading response body failed");
            err
        })?;

        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched feed body"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_feed(template: ResponseTemplate) -> (MockServer, Url) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(template)
            .mount(&server)
            .await;
        let url = Url::parse(&format!("{}/search", server.uri())).unwrap();
        (server, url)
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = FetchTimeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(15));
        assert_eq!(timeouts.read, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_200() {
        let (_server, url) =
            mock_feed(ResponseTemplate::new(200).set_body_string(r#"{"response":{}}"#)).await;
        let fetcher = HttpFetcher::new(FetchTimeouts::default()).unwrap();

        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(body, r#"{"response":{}}"#);
    }

    #[tokio::test]
    async fn test_fetch_sends_query_parameters_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "New York"))
            .and(query_param("show-fields", "thumbnail"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        let url = crate::query::build_url(
            &format!("{}/search", server.uri()),
            Some("New York"),
            crate::models::OrderBy::Newest,
            "test",
        )
        .unwrap();
        let fetcher = HttpFetcher::new(FetchTimeouts::default()).unwrap();

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_fetch_maps_non_200_to_http_status() {
        for code in [404u16, 500, 201] {
            let (_server, url) =
                mock_feed(ResponseTemplate::new(code).set_body_string("body")).await;
            let fetcher = HttpFetcher::new(FetchTimeouts::default()).unwrap();

            assert_eq!(
                fetcher.fetch(&url).await.unwrap_err(),
                FetchError::HttpStatus(code)
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_times_out_on_slow_response() {
        let (_server, url) = mock_feed(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .await;
        let fetcher = HttpFetcher::new(FetchTimeouts {
            connect: Duration::from_secs(1),
            read: Duration::from_millis(200),
        })
        .unwrap();

        assert_eq!(fetcher.fetch(&url).await.unwrap_err(), FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_maps_refused_connection_to_network_error() {
        let url = Url::parse("http://127.0.0.1:1/search").unwrap();
        let fetcher = HttpFetcher::new(FetchTimeouts::default()).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
    }

    /// Needs a kernel that drops SYNs once the accept queue is full (Linux
    /// does); elsewhere the connect may be refused instead of timing out.
    #[tokio::test]
    #[ignore = "depends on the host's TCP backlog behaviour"]
    async fn test_fetch_times_out_on_connect() {
        let socket = tokio::net::TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(1).unwrap();
        let addr = listener.local_addr().unwrap();

        // Never accept; fill the queue so further handshakes stall.
        let mut parked = Vec::new();
        for _ in 0..8 {
            match tokio::time::timeout(
                Duration::from_millis(100),
                tokio::net::TcpStream::connect(addr),
            )
            .await
            {
                Ok(Ok(stream)) => parked.push(stream),
                _ => break,
            }
        }

        let url = Url::parse(&format!("http://{addr}/search")).unwrap();
        let fetcher = HttpFetcher::new(FetchTimeouts {
            connect: Duration::from_millis(200),
            read: Duration::from_secs(5),
        })
        .unwrap();

        let t0 = Instant::now();
        assert_eq!(fetcher.fetch(&url).await.unwrap_err(), FetchError::Timeout);
        assert!(t0.elapsed() < Duration::from_secs(5));
    }
}
