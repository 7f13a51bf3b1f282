//! MusicBrainz recording search
//!
//! Searches official, non-video recordings by title and primary artist and
//! reads each recording's first-release date.
//!
//! # API Reference
//! - Endpoint: https://musicbrainz.org/ws/2/recording/?query=...
//! - Rate Limit: 1 request/second (as per MusicBrainz Terms of Service)

use super::{check_status, earliest, rate_limiter, SourceError, YearSource};
use crate::types::{SearchKey, Source, SourceMetadata, YearCandidate};
use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use hitster_common::parse_year;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

const MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org/ws/2";
const COVER_ART_URL: &str = "https://coverartarchive.org/release";

/// Requests per second allowed by MusicBrainz
const RATE_LIMIT_PER_SECOND: u32 = 1;

/// Results with a lower search score are discarded
const MIN_SCORE: u32 = 75;

/// Recordings requested per search
const SEARCH_LIMIT: &str = "5";

const MAX_CANDIDATES: usize = 3;

#[derive(Debug, Deserialize)]
struct RecordingSearch {
    #[serde(default)]
    recordings: Vec<MBRecording>,
}

#[derive(Debug, Deserialize)]
struct MBRecording {
    id: String,
    title: String,
    #[serde(default)]
    score: u32,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MBArtistCredit>,
    #[serde(rename = "first-release-date")]
    first_release_date: Option<String>,
    #[serde(default)]
    releases: Vec<MBRelease>,
}

#[derive(Debug, Deserialize)]
struct MBArtistCredit {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MBRelease {
    id: String,
    title: String,
    date: Option<String>,
}

/// MusicBrainz recording search client
pub struct MusicBrainzClient {
    http_client: Client,
    base_url: String,
    user_agent: String,
    /// Shared by every search issued through this client
    rate_limiter: DefaultDirectRateLimiter,
}

impl MusicBrainzClient {
    pub fn new(http_client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: MUSICBRAINZ_API_URL.to_string(),
            user_agent: user_agent.into(),
            rate_limiter: rate_limiter(RATE_LIMIT_PER_SECOND),
        }
    }

    /// Point the client at a different host (mirrors, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Lucene query for official, non-video recordings
pub fn recording_query(key: &SearchKey) -> String {
    format!(
        "recording:{} AND artistname:{} AND status:official AND video:false",
        key.title,
        key.primary_artist()
    )
}

/// Turn a recording search response into the earliest candidates
///
/// Drops low-score matches and recordings without a usable
/// first-release date.
pub fn parse_recordings(body: &str) -> Result<Vec<YearCandidate>, SourceError> {
    let search: RecordingSearch =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let candidates = search
        .recordings
        .into_iter()
        .filter(|r| r.score > MIN_SCORE)
        .filter_map(|r| {
            let first_release = r.first_release_date.as_deref()?;
            let year = parse_year(first_release)?;

            let release = r
                .releases
                .iter()
                .find(|rel| rel.date.as_deref() == Some(first_release))
                .or_else(|| r.releases.first());

            Some(YearCandidate::new(
                year,
                SourceMetadata {
                    title: r.title.clone(),
                    artist: r.artist_credit.first().map(|a| a.name.clone()),
                    release: release.map(|rel| rel.title.clone()),
                    cover: release.map(|rel| format!("{}/{}/front-250", COVER_ART_URL, rel.id)),
                    uri: Some(format!("https://musicbrainz.org/recording/{}", r.id)),
                    id: Some(r.id),
                },
            ))
        })
        .collect();

    Ok(earliest(candidates, MAX_CANDIDATES))
}

#[async_trait]
impl YearSource for MusicBrainzClient {
    fn source(&self) -> Source {
        Source::MusicBrainz
    }

    async fn fetch(&self, key: &SearchKey) -> Result<Vec<YearCandidate>, SourceError> {
        self.rate_limiter.until_ready().await;

        let query = recording_query(key);
        debug!(query = %query, "Querying MusicBrainz recordings");

        let response = self
            .http_client
            .get(format!("{}/recording/", self.base_url))
            .query(&[("query", query.as_str()), ("limit", SEARCH_LIMIT), ("fmt", "json")])
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        parse_recordings(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "created": "2024-01-01T00:00:00.000Z",
        "count": 4,
        "offset": 0,
        "recordings": [
            {
                "id": "rec-remaster",
                "score": 100,
                "title": "Come Together",
                "artist-credit": [{"name": "The Beatles"}],
                "first-release-date": "2009-09-09",
                "releases": [{"id": "rel-2009", "title": "Abbey Road (Remastered)", "date": "2009-09-09"}]
            },
            {
                "id": "rec-original",
                "score": 98,
                "title": "Come Together",
                "artist-credit": [{"name": "The Beatles"}],
                "first-release-date": "1969-09-26",
                "releases": [
                    {"id": "rel-single", "title": "Something / Come Together", "date": "1969-10-06"},
                    {"id": "rel-abbey", "title": "Abbey Road", "date": "1969-09-26"}
                ]
            },
            {
                "id": "rec-cover",
                "score": 60,
                "title": "Come Together",
                "artist-credit": [{"name": "Someone Else"}],
                "first-release-date": "1950",
                "releases": []
            },
            {
                "id": "rec-undated",
                "score": 90,
                "title": "Come Together",
                "artist-credit": [{"name": "The Beatles"}],
                "releases": []
            }
        ]
    }"#;

    fn key() -> SearchKey {
        SearchKey {
            title: "Come Together".to_string(),
            artists: vec!["The Beatles".to_string()],
        }
    }

    #[test]
    fn test_query_format() {
        assert_eq!(
            recording_query(&key()),
            "recording:Come Together AND artistname:The Beatles AND status:official AND video:false"
        );
    }

    #[test]
    fn test_parse_filters_and_sorts() {
        let candidates = parse_recordings(RESPONSE).unwrap();
        let years: Vec<i32> = candidates.iter().map(|c| c.year).collect();
        assert_eq!(years, vec![1969, 2009]);
    }

    #[test]
    fn test_release_matching_first_release_date_preferred() {
        let candidates = parse_recordings(RESPONSE).unwrap();
        let original = &candidates[0];
        assert_eq!(original.metadata.release.as_deref(), Some("Abbey Road"));
        assert_eq!(
            original.metadata.cover.as_deref(),
            Some("https://coverartarchive.org/release/rel-abbey/front-250")
        );
        assert_eq!(original.metadata.id.as_deref(), Some("rec-original"));
        assert_eq!(original.metadata.artist.as_deref(), Some("The Beatles"));
    }

    #[test]
    fn test_falls_back_to_first_release() {
        let body = r#"{"recordings": [{
            "id": "r", "score": 80, "title": "T", "artist-credit": [],
            "first-release-date": "1975",
            "releases": [{"id": "a", "title": "First", "date": "1976-01-01"}]
        }]}"#;
        let candidates = parse_recordings(body).unwrap();
        assert_eq!(candidates[0].year, 1975);
        assert_eq!(candidates[0].metadata.release.as_deref(), Some("First"));
        assert!(candidates[0].metadata.artist.is_none());
    }

    #[test]
    fn test_score_threshold_is_exclusive() {
        let body = r#"{"recordings": [{
            "id": "r", "score": 75, "title": "T", "artist-credit": [],
            "first-release-date": "1975", "releases": []
        }]}"#;
        assert!(parse_recordings(body).unwrap().is_empty());
    }

    #[test]
    fn test_top_three_only() {
        let recordings: Vec<String> = (0..5)
            .map(|i| {
                format!(
                    r#"{{"id": "r{i}", "score": 100, "title": "T", "first-release-date": "{}", "releases": []}}"#,
                    2000 - i
                )
            })
            .collect();
        let body = format!(r#"{{"recordings": [{}]}}"#, recordings.join(","));
        let years: Vec<i32> = parse_recordings(&body).unwrap().iter().map(|c| c.year).collect();
        assert_eq!(years, vec![1996, 1997, 1998]);
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(
            parse_recordings("<html>busy</html>"),
            Err(SourceError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_one_request_per_second() {
        let client = MusicBrainzClient::new(Client::new(), "test");
        assert!(client.rate_limiter.check().is_ok());
        assert!(client.rate_limiter.check().is_err());

        let started = std::time::Instant::now();
        client.rate_limiter.until_ready().await;
        assert!(started.elapsed() >= std::time::Duration::from_millis(900));
        assert!(client.rate_limiter.check().is_err());
    }
}
