//! Pre-flight network reachability checks.
//!
//! The loader awaits a [`ConnectivityProbe`] on the worker task before sending
//! any request and fails fast with `NoConnectivity` when it answers `false`.
//! Checks never run on the task that owns the loader.

use std::future::Future;
use std::time::Duration;
use tokio::net::lookup_host;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Upper bound on one host lookup; a resolver that stalls counts as offline.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(2);

/// "Is the network reachable right now?"
pub trait ConnectivityProbe {
    fn is_connected(&self) -> impl Future<Output = bool> + Send;
}

impl<F> ConnectivityProbe for F
where
    F: Fn() -> bool + Sync,
{
    async fn is_connected(&self) -> bool {
        self()
    }
}

/// Treats the network as reachable when the endpoint's host resolves.
#[derive(Debug, Clone)]
pub struct HostResolves {
    host: String,
    port: u16,
    resolve_timeout: Duration,
}

impl HostResolves {
    /// Probe for the host of `endpoint`. Returns `None` for URLs without a host.
    pub fn for_endpoint(endpoint: &Url) -> Option<Self> {
        let host = endpoint.host_str()?.to_string();
        let port = endpoint.port_or_known_default()?;
        Some(Self {
            host,
            port,
            resolve_timeout: RESOLVE_TIMEOUT,
        })
    }
}

impl ConnectivityProbe for HostResolves {
    async fn is_connected(&self) -> bool {
        let lookup = lookup_host((self.host.as_str(), self.port));
        let reachable = match timeout(self.resolve_timeout, lookup).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                debug!(host = %self.host, error = %e, "Host lookup failed");
                false
            }
            Err(_) => {
                debug!(host = %self.host, timeout = ?self.resolve_timeout, "Host lookup timed out");
                false
            }
        };
        debug!(host = %self.host, port = self.port, reachable, "Connectivity check");
        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_connectivity_check() {
        let online = || true;
        let offline = || false;
        assert!(online.is_connected().await);
        assert!(!offline.is_connected().await);
    }

    #[test]
    fn test_host_resolves_for_endpoint() {
        let url = Url::parse("https://content.guardianapis.com/search").unwrap();
        let probe = HostResolves::for_endpoint(&url).unwrap();
        assert_eq!(probe.host, "content.guardianapis.com");
        assert_eq!(probe.port, 443);
        assert_eq!(probe.resolve_timeout, RESOLVE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_loopback_resolves() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert!(HostResolves::for_endpoint(&url).unwrap().is_connected().await);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_offline() {
        let url = Url::parse("http://does-not-exist.invalid/").unwrap();
        assert!(!HostResolves::for_endpoint(&url).unwrap().is_connected().await);
    }

    #[tokio::test]
    async fn test_lookup_that_outlives_timeout_is_offline() {
        let url = Url::parse("http://does-not-exist.invalid/").unwrap();
        let mut check = HostResolves::for_endpoint(&url).unwrap();
        check.resolve_timeout = Duration::ZERO;
        assert!(!check.is_connected().await);
    }
}
