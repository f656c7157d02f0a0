//! Conversion of content API responses into [`Article`]s.
//!
//! Expected shape:
//!
//! ```text
//! { "response": { "results": [
//!     { "webTitle": .., "webPublicationDate": .., "webUrl": .., "fields": { "thumbnail": .. } },
//!     ...
//! ] } }
//! ```
//!
//! Each element of `results` is extracted on its own. A malformed element is
//! logged and skipped; the rest of the array is still returned in order.

use crate::error::ParseError;
use crate::models::Article;
use crate::utils::{looks_truncated, truncate_for_log};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Deserialize)]
struct Envelope {
    response: Option<ResponseBody>,
}

#[derive(Deserialize)]
struct ResponseBody {
    results: Option<Value>,
}

/// One element of `response.results`. `fields` stays untyped so a
/// wrong-typed value only costs the thumbnail, not the article.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResult {
    web_title: String,
    web_publication_date: String,
    web_url: String,
    #[serde(default)]
    fields: Option<Value>,
}

impl From<ApiResult> for Article {
    fn from(raw: ApiResult) -> Self {
        let thumbnail = raw
            .fields
            .as_ref()
            .and_then(|fields| fields.get("thumbnail"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Article::new(thumbnail, raw.web_title, raw.web_publication_date, raw.web_url)
    }
}

/// Parse a raw response body into articles, never failing.
///
/// Blank input and unrecognisable top-level structure both yield an empty
/// list; they are logged differently.
pub fn parse_articles(raw_body: &str) -> Vec<Article> {
    if raw_body.trim().is_empty() {
        debug!("Response body is empty; no content to parse");
        return Vec::new();
    }

    match try_parse_articles(raw_body) {
        Ok(articles) => articles,
        Err(e) => {
            let truncated = matches!(&e, ParseError::Json(json) if looks_truncated(json));
            warn!(
                error = %e,
                truncated,
                body_preview = %truncate_for_log(raw_body, 300),
                "Problem parsing the news article JSON results"
            );
            Vec::new()
        }
    }
}

/// Parse a raw response body, surfacing top-level structure problems.
///
/// Per-element problems are still handled locally.
pub fn try_parse_articles(raw_body: &str) -> Result<Vec<Article>, ParseError> {
    let envelope: Envelope = serde_json::from_str(raw_body)?;
    let results = match envelope.response.and_then(|r| r.results) {
        Some(Value::Array(results)) => results,
        _ => return Err(ParseError::MissingResults),
    };

    let total = results.len();
    let articles: Vec<Article> = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_value::<ApiResult>(element) {
            Ok(raw) => Some(Article::from(raw)),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed result");
                None
            }
        })
        .collect();

    info!(total, parsed = articles.len(), "Parsed news articles");
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_IMAGE_URL;
    use serde_json::json;

    fn result(title: &str) -> Value {
        json!({
            "webTitle": title,
            "webPublicationDate": "2020-01-01T00:00:00Z",
            "webUrl": format!("http://x/{title}"),
            "fields": { "thumbnail": format!("http://img/{title}") }
        })
    }

    fn body(results: Vec<Value>) -> String {
        json!({ "response": { "status": "ok", "results": results } }).to_string()
    }

    #[test]
    fn test_parses_single_article() {
        let raw = r#"{"response":{"results":[{"webTitle":"A","webPublicationDate":"2020-01-01T00:00:00Z","webUrl":"http://x","fields":{"thumbnail":"http://img"}}]}}"#;
        let articles = parse_articles(raw);
        assert_eq!(
            articles,
            vec![Article::new(
                Some("http://img".to_string()),
                "A".to_string(),
                "2020-01-01T00:00:00Z".to_string(),
                "http://x".to_string(),
            )]
        );
    }

    #[test]
    fn test_missing_thumbnail_uses_placeholder() {
        let mut no_fields = result("a");
        no_fields.as_object_mut().unwrap().remove("fields");
        let empty_fields = json!({
            "webTitle": "b", "webPublicationDate": "d", "webUrl": "u", "fields": {}
        });
        let wrong_fields = json!({
            "webTitle": "c", "webPublicationDate": "d", "webUrl": "u", "fields": "oops"
        });
        let numeric_thumb = json!({
            "webTitle": "d", "webPublicationDate": "d", "webUrl": "u", "fields": { "thumbnail": 7 }
        });

        let articles = parse_articles(&body(vec![no_fields, empty_fields, wrong_fields, numeric_thumb]));
        assert_eq!(articles.len(), 4);
        assert!(articles.iter().all(|a| a.image_url() == PLACEHOLDER_IMAGE_URL));
    }

    #[test]
    fn test_malformed_element_is_skipped_and_order_kept() {
        let mut broken = result("broken");
        broken.as_object_mut().unwrap().remove("webTitle");
        let raw = body(vec![result("one"), broken, result("two"), result("three")]);

        let headlines: Vec<String> = parse_articles(&raw)
            .iter()
            .map(|a| a.headline().to_string())
            .collect();
        assert_eq!(headlines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_wrong_typed_required_fields_are_skipped() {
        let bad_date = json!({ "webTitle": "x", "webPublicationDate": 2020, "webUrl": "u" });
        let bad_url = json!({ "webTitle": "y", "webPublicationDate": "d", "webUrl": null });
        let not_object = json!("just a string");
        let raw = body(vec![bad_date, result("kept"), bad_url, not_object]);

        let articles = parse_articles(&raw);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].headline(), "kept");
    }

    #[test]
    fn test_blank_and_null_bodies_yield_empty() {
        assert!(parse_articles("").is_empty());
        assert!(parse_articles("   \n").is_empty());
        assert!(parse_articles("null").is_empty());
    }

    #[test]
    fn test_unrecognised_structure_yields_empty() {
        for raw in [
            "{",
            "[]",
            r#"{"results":[]}"#,
            r#"{"response":{}}"#,
            r#"{"response":{"results":{}}}"#,
            r#"{"response":"nope"}"#,
        ] {
            assert!(parse_articles(raw).is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_try_parse_reports_structure_errors() {
        assert!(matches!(
            try_parse_articles(r#"{"response":{}}"#),
            Err(ParseError::MissingResults)
        ));
        assert!(matches!(try_parse_articles("{"), Err(ParseError::Json(_))));
        assert!(try_parse_articles(&body(vec![])).unwrap().is_empty());
    }
}
