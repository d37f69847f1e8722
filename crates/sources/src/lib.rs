//! Evidence source infrastructure.
//!
//! Implements [`pipeline::EvidenceSource`] with two backends:
//!
//! - [`MockEvidenceSource`] — generates canned records with random entropy.
//!   The stand-in for a real feed; useful for demos and local runs with no
//!   network.
//! - [`HttpEvidenceSource`] — fetches `GET <base>/<source>` and decodes the
//!   JSON body as an [`pipeline::EvidenceItem`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details live here; the [`pipeline`] crate
//! sees only the trait and value-level [`pipeline::FetchError`]s.

use async_trait::async_trait;
use tracing::debug;

use pipeline::{EvidenceItem, EvidenceSource, FetchError};

// ---------------------------------------------------------------------------

/// Canned evidence generator with random entropy in `[0, 1)`.
#[derive(Debug, Clone, Default)]
pub struct MockEvidenceSource;

impl MockEvidenceSource {
    /// Creates the mock source.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceSource for MockEvidenceSource {
    async fn fetch(&self, source: &str) -> Result<EvidenceItem, FetchError> {
        let item = EvidenceItem {
            source: source.to_owned(),
            data: format!("Mock data from {source}"),
            entropy: rand::random::<f64>(),
            semantic_score: None,
            query: None,
        };
        debug!(source, entropy = item.entropy, "mock evidence generated");
        Ok(item)
    }
}

// ---------------------------------------------------------------------------

/// Fetches evidence records over HTTP.
///
/// `fetch("x_post")` against a base of `https://feeds.example` requests
/// `https://feeds.example/x_post` and decodes the JSON response body as an
/// [`EvidenceItem`].
#[derive(Debug, Clone)]
pub struct HttpEvidenceSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEvidenceSource {
    /// Creates a source rooted at `base_url` (trailing slash optional).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl EvidenceSource for HttpEvidenceSource {
    async fn fetch(&self, source: &str) -> Result<EvidenceItem, FetchError> {
        let url = format!("{}/{source}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| FetchError::Unavailable {
                source: source.to_owned(),
                reason: e.to_string(),
            })?;
        response
            .json::<EvidenceItem>()
            .await
            .map_err(|e| FetchError::Malformed {
                source: source.to_owned(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_source_shapes_the_record_after_its_source() {
        let item = MockEvidenceSource::new().fetch("x_post").await.unwrap();
        assert_eq!(item.source, "x_post");
        assert_eq!(item.data, "Mock data from x_post");
        assert!((0.0..1.0).contains(&item.entropy));
        assert!(item.semantic_score.is_none());
        assert!(item.query.is_none());
    }

    #[test]
    fn http_source_normalizes_the_base_url() {
        let source = HttpEvidenceSource::new("https://feeds.example/");
        assert_eq!(source.base_url, "https://feeds.example");
    }
}
