//! Core types for release-year reconciliation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// External metadata source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Recording index, authoritative for first-release dates
    MusicBrainz,
    /// Discography registry of master releases
    Discogs,
    /// Song pages scraped from a public catalog
    AllMusic,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::MusicBrainz => "musicbrainz",
            Source::Discogs => "discogs",
            Source::AllMusic => "allmusic",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized search key derived from a raw track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    pub title: String,
    pub artists: Vec<String>,
}

impl SearchKey {
    /// First credited artist, or empty when the track has none
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or("")
    }

    /// Free-text query used for manual fallback search
    pub fn query_string(&self) -> String {
        format!("{} {}", self.title, self.primary_artist())
            .trim()
            .to_string()
    }
}

/// Display fields a source attaches to a year candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Containing release (album) name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// One source's opinion about a track's release year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCandidate {
    pub year: i32,
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}

impl YearCandidate {
    pub fn new(year: i32, metadata: SourceMetadata) -> Self {
        Self { year, metadata }
    }
}

/// Reconciled release-year data for one track
///
/// Created once per draw and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDates {
    /// `"<title> <primary artist>"`
    pub query: String,
    /// Year listed by the streaming platform
    pub platform_year: Option<i32>,
    /// Raw candidates per source, in the order each source returned them
    pub candidates: BTreeMap<Source, Vec<YearCandidate>>,
    pub recommendation: i32,
    /// Share of opinions agreeing on `recommendation`, in (0, 1]
    pub confidence: f64,
}

impl TrackDates {
    pub fn candidates_for(&self, source: Source) -> &[YearCandidate] {
        self.candidates
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
