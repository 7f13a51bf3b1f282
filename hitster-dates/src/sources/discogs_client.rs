//! Discogs master release search
//!
//! Master releases group every pressing of a recording, so the master's
//! year is the closest Discogs gets to a first release year.
//!
//! # API Reference
//! - Endpoint: https://api.discogs.com/database/search?type=master
//! - Authentication: consumer key + secret
//! - Rate Limit: 5 requests/second (well under the authenticated quota)

use super::{check_status, earliest, rate_limiter, SourceError, YearSource};
use crate::types::{SearchKey, Source, SourceMetadata, YearCandidate};
use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use hitster_common::parse_year;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const DISCOGS_API_URL: &str = "https://api.discogs.com";
const DISCOGS_SITE_URL: &str = "https://discogs.com";

const RATE_LIMIT_PER_SECOND: u32 = 5;
const PER_PAGE: &str = "25";
const MAX_CANDIDATES: usize = 3;

/// Discogs consumer credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscogsCredentials {
    pub key: String,
    pub secret: String,
}

impl DiscogsCredentials {
    fn authorization(&self) -> String {
        format!("Discogs key={}, secret={}", self.key, self.secret)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<MasterResult>,
}

#[derive(Debug, Deserialize)]
struct MasterResult {
    id: u64,
    /// "Artist - Title"
    title: String,
    /// Usually a string ("1969"), occasionally a number
    year: Option<Value>,
    uri: Option<String>,
    thumb: Option<String>,
    cover_image: Option<String>,
}

/// Discogs database search client
pub struct DiscogsClient {
    http_client: Client,
    base_url: String,
    user_agent: String,
    credentials: Option<DiscogsCredentials>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl DiscogsClient {
    /// Without credentials every search fails with `NotConfigured`
    pub fn new(
        http_client: Client,
        user_agent: impl Into<String>,
        credentials: Option<DiscogsCredentials>,
    ) -> Self {
        Self {
            http_client,
            base_url: DISCOGS_API_URL.to_string(),
            user_agent: user_agent.into(),
            credentials,
            rate_limiter: rate_limiter(RATE_LIMIT_PER_SECOND),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

fn year_of(value: &Value) -> Option<i32> {
    match value {
        Value::String(s) => parse_year(s),
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()).filter(|&y| y > 0),
        _ => None,
    }
}

/// Turn a master search response into the earliest dated candidates
pub fn parse_masters(body: &str) -> Result<Vec<YearCandidate>, SourceError> {
    let search: SearchResults =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let candidates = search
        .results
        .into_iter()
        .filter_map(|m| {
            let year = m.year.as_ref().and_then(year_of)?;
            let (artist, title) = match m.title.split_once(" - ") {
                Some((artist, title)) => (Some(artist.trim().to_string()), title.trim().to_string()),
                None => (None, m.title.clone()),
            };
            Some(YearCandidate::new(
                year,
                SourceMetadata {
                    title,
                    artist,
                    release: None,
                    cover: m.cover_image.or(m.thumb),
                    id: Some(m.id.to_string()),
                    uri: m.uri.map(|u| format!("{}{}", DISCOGS_SITE_URL, u)),
                },
            ))
        })
        .collect();

    Ok(earliest(candidates, MAX_CANDIDATES))
}

#[async_trait]
impl YearSource for DiscogsClient {
    fn source(&self) -> Source {
        Source::Discogs
    }

    async fn fetch(&self, key: &SearchKey) -> Result<Vec<YearCandidate>, SourceError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SourceError::NotConfigured("Discogs key/secret missing".to_string())
        })?;

        self.rate_limiter.until_ready().await;

        debug!(title = %key.title, artist = %key.primary_artist(), "Querying Discogs masters");

        let response = self
            .http_client
            .get(format!("{}/database/search", self.base_url))
            .query(&[
                ("type", "master"),
                ("per_page", PER_PAGE),
                ("track", key.title.as_str()),
                ("artist", key.primary_artist()),
            ])
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::AUTHORIZATION, credentials.authorization())
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        parse_masters(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    const RESPONSE: &str = r#"{
        "pagination": {"page": 1, "pages": 1, "per_page": 25, "items": 4},
        "results": [
            {
                "id": 24047,
                "type": "master",
                "title": "The Beatles - Abbey Road",
                "year": "1969",
                "uri": "/master/24047-The-Beatles-Abbey-Road",
                "thumb": "https://i.discogs.com/thumb.jpg",
                "cover_image": "https://i.discogs.com/cover.jpg"
            },
            {
                "id": 1,
                "type": "master",
                "title": "The Beatles - 1",
                "year": 2000,
                "uri": "/master/1",
                "thumb": "https://i.discogs.com/thumb1.jpg"
            },
            {
                "id": 2,
                "type": "master",
                "title": "Undated Compilation",
                "uri": "/master/2"
            },
            {
                "id": 3,
                "type": "master",
                "title": "The Beatles - Love",
                "year": "2006",
                "uri": "/master/3"
            },
            {
                "id": 4,
                "type": "master",
                "title": "The Beatles - Anthology 3",
                "year": "1996",
                "uri": "/master/4"
            }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_dated_earliest_three() {
        let years: Vec<i32> = parse_masters(RESPONSE).unwrap().iter().map(|c| c.year).collect();
        assert_eq!(years, vec![1969, 1996, 2000]);
    }

    #[test]
    fn test_metadata_mapping() {
        let candidates = parse_masters(RESPONSE).unwrap();
        let abbey = &candidates[0];
        assert_eq!(abbey.metadata.title, "Abbey Road");
        assert_eq!(abbey.metadata.artist.as_deref(), Some("The Beatles"));
        assert_eq!(abbey.metadata.cover.as_deref(), Some("https://i.discogs.com/cover.jpg"));
        assert_eq!(abbey.metadata.id.as_deref(), Some("24047"));
        assert_eq!(
            abbey.metadata.uri.as_deref(),
            Some("https://discogs.com/master/24047-The-Beatles-Abbey-Road")
        );

        let one = &candidates[2];
        assert_eq!(one.metadata.cover.as_deref(), Some("https://i.discogs.com/thumb1.jpg"));
    }

    #[test]
    fn test_empty_year_string_dropped() {
        let body = r#"{"results": [{"id": 9, "title": "X", "year": ""}]}"#;
        assert!(parse_masters(body).unwrap().is_empty());
    }

    #[test]
    fn test_authorization_header() {
        let credentials = DiscogsCredentials {
            key: "k".to_string(),
            secret: "s".to_string(),
        };
        assert_eq!(credentials.authorization(), "Discogs key=k, secret=s");
    }

    #[tokio::test]
    async fn test_unconfigured_client_yields_empty() {
        let client = DiscogsClient::new(Client::new(), "test", None);
        assert!(!client.is_configured());

        let key = SearchKey {
            title: "Something".to_string(),
            artists: vec!["The Beatles".to_string()],
        };
        assert!(matches!(client.fetch(&key).await, Err(SourceError::NotConfigured(_))));
        assert!(client.search(&key, &CancellationToken::new()).await.is_empty());
    }

    #[test]
    fn test_five_requests_per_second() {
        let client = DiscogsClient::new(Client::new(), "test", None);
        for _ in 0..5 {
            assert!(client.rate_limiter.check().is_ok());
        }
        assert!(client.rate_limiter.check().is_err());
    }
}
