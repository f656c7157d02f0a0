//! Request URL construction for the content search API.
//!
//! Parameters are appended in a fixed order: `q` (only when a search term is
//! given), `order-by`, `show-fields=thumbnail`, `api-key`. Values are
//! percent-encoded with `urlencoding`, so a space becomes `%20` rather than `+`.

use crate::error::ConfigError;
use crate::models::OrderBy;
use tracing::debug;
use url::Url;

/// Build the request URL for one feed query.
///
/// Pure and deterministic. Any query string already present on
/// `base_endpoint` is kept in front of the generated parameters.
///
/// # Errors
///
/// [`ConfigError::InvalidConfiguration`] if `base_endpoint` is not an
/// absolute URL with a host.
pub fn build_url(
    base_endpoint: &str,
    search_term: Option<&str>,
    order_by: OrderBy,
    api_key: &str,
) -> Result<Url, ConfigError> {
    let mut url = validate_endpoint(base_endpoint)?;

    let mut params: Vec<String> = url
        .query()
        .filter(|existing| !existing.is_empty())
        .map(|existing| vec![existing.to_string()])
        .unwrap_or_default();

    if let Some(term) = search_term {
        params.push(format!("q={}", urlencoding::encode(term)));
    }
    params.push(format!("order-by={}", order_by.as_str()));
    params.push("show-fields=thumbnail".to_string());
    params.push(format!("api-key={}", urlencoding::encode(api_key)));

    url.set_query(Some(&params.join("&")));
    debug!(url = %redact_api_key(&url), "Built feed query URL");
    Ok(url)
}

/// Check that `endpoint` is an absolute URL with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidConfiguration(format!("{endpoint}: {e}")))?;
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(ConfigError::InvalidConfiguration(format!(
            "{endpoint}: not an absolute URL with a host"
        )));
    }
    Ok(url)
}

/// Render a URL for logs with the `api-key` value masked.
pub fn redact_api_key(url: &Url) -> String {
    match url.query() {
        Some(query) => {
            let masked = query
                .split('&')
                .map(|pair| {
                    if pair.starts_with("api-key=") {
                        "api-key=***"
                    } else {
                        pair
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            let mut redacted = url.clone();
            redacted.set_query(Some(&masked));
            redacted.to_string()
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://content.guardianapis.com/search?";

    #[test]
    fn test_search_term_is_percent_encoded() {
        let url = build_url(BASE, Some("New York"), OrderBy::Newest, "key").unwrap();
        assert!(url.as_str().contains("q=New%20York&order-by=newest"));
    }

    #[test]
    fn test_absent_search_term_omits_q() {
        let url = build_url(BASE, None, OrderBy::Relevance, "test").unwrap();
        assert_eq!(
            url.as_str(),
            "https://content.guardianapis.com/search?order-by=relevance&show-fields=thumbnail&api-key=test"
        );
    }

    #[test]
    fn test_empty_search_term_keeps_q() {
        let url = build_url(BASE, Some(""), OrderBy::Newest, "test").unwrap();
        assert!(url.as_str().contains("?q=&order-by=newest"));
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let url = build_url(BASE, Some("a&b=c"), OrderBy::Newest, "test").unwrap();
        assert!(url.as_str().contains("q=a%26b%3Dc&"));
    }

    #[test]
    fn test_existing_query_is_preserved() {
        let url = build_url(
            "https://example.com/search?section=world",
            None,
            OrderBy::Oldest,
            "k",
        )
        .unwrap();
        assert_eq!(
            url.query(),
            Some("section=world&order-by=oldest&show-fields=thumbnail&api-key=k")
        );
    }

    #[test]
    fn test_invalid_endpoints_are_rejected() {
        for endpoint in ["search?", "", "mailto:news@example.com"] {
            let err = build_url(endpoint, None, OrderBy::Newest, "k").unwrap_err();
            assert!(matches!(err, ConfigError::InvalidConfiguration(_)), "{endpoint}");
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build_url(BASE, Some("rust"), OrderBy::Newest, "k").unwrap();
        let b = build_url(BASE, Some("rust"), OrderBy::Newest, "k").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_redact_api_key() {
        let url = build_url(BASE, Some("x"), OrderBy::Newest, "secret").unwrap();
        let redacted = redact_api_key(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.ends_with("api-key=***"));
    }
}
