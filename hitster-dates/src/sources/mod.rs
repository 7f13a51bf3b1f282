//! Release-year sources
//!
//! Each source turns one external metadata provider's search results into
//! [`YearCandidate`]s. Sources are independent: each owns its own request
//! rate limiter, and a failing source never fails the reconciliation.
//!
//! # Sources
//! 1. **musicbrainz_client** - recording search, first-release dates (1 req/s)
//! 2. **discogs_client** - master release search, needs credentials (5 req/s)
//! 3. **allmusic_scraper** - song search + song page scraping (5 req/s)

pub mod allmusic_scraper;
pub mod discogs_client;
pub mod musicbrainz_client;

pub use allmusic_scraper::AllMusicScraper;
pub use discogs_client::{DiscogsClient, DiscogsCredentials};
pub use musicbrainz_client::MusicBrainzClient;

use crate::types::{SearchKey, Source, YearCandidate};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Failures inside a source; logged and never propagated
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Network(e.to_string())
    }
}

/// A release-year source
#[async_trait]
pub trait YearSource: Send + Sync {
    /// Which provider this is
    fn source(&self) -> Source;

    /// Query the provider
    ///
    /// Implementations wait on their own rate limiter before each request.
    async fn fetch(&self, key: &SearchKey) -> Result<Vec<YearCandidate>, SourceError>;

    /// Query the provider, degrading every failure to an empty list
    ///
    /// Cancellation drops the in-flight request and counts as a failure.
    async fn search(&self, key: &SearchKey, cancel: &CancellationToken) -> Vec<YearCandidate> {
        let source = self.source();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(source = %source, title = %key.title, "Search cancelled");
                Vec::new()
            }
            result = self.fetch(key) => match result {
                Ok(candidates) => {
                    debug!(
                        source = %source,
                        title = %key.title,
                        count = candidates.len(),
                        "Search complete"
                    );
                    candidates
                }
                Err(e) => {
                    warn!(source = %source, title = %key.title, error = %e, "Search failed");
                    Vec::new()
                }
            },
        }
    }
}

/// Token bucket allowing `per_second` requests per second
pub fn rate_limiter(per_second: u32) -> DefaultDirectRateLimiter {
    let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_second(per_second))
}

/// Sort ascending by year and keep the first `limit`
pub(crate) fn earliest(mut candidates: Vec<YearCandidate>, limit: usize) -> Vec<YearCandidate> {
    candidates.sort_by_key(|c| c.year);
    candidates.truncate(limit);
    candidates
}

/// Turn a non-success response into an `Api` error
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Api(status.as_u16(), body))
}
