//! HTTP-backed [`FeedSource`].
//!
//! Requests are plain blocking-style awaits: one feed at a time, no retries,
//! no timeout beyond what the transport applies.

use super::{FeedSource, FetchError, parse};
use crate::models::FeedEntry;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

/// Fetches feeds with a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Build a source with the crate's user agent.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        let t0 = Instant::now();
        let parsed = Url::parse(url)?;

        let body = self
            .client
            .get(parsed)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(bytes = body.len(), "Downloaded feed");

        let entries = parse::parse_feed(&body)?;
        info!(
            count = entries.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Parsed feed entries"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails_before_request() {
        let source = HttpFeedSource::new().unwrap();
        let err = source.fetch_entries("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert!(err.to_string().starts_with("invalid feed url"));
    }
}
