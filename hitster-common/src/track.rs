//! Platform track model
//!
//! Field names follow the streaming platform's JSON so that tracks can be
//! passed through from the catalog client and persisted unchanged.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A track as listed by the streaming platform
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Platform track id
    pub id: String,
    /// Display name, possibly carrying annotations ("- Remastered 2011")
    pub name: String,
    /// Platform may omit the flag; absent means playable
    #[serde(default = "default_playable")]
    pub is_playable: bool,
    /// Local files cannot be streamed
    #[serde(default)]
    pub is_local: bool,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    pub release_date: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

fn default_playable() -> bool {
    true
}

impl TrackRef {
    /// Artist names in credit order
    pub fn artist_names(&self) -> Vec<String> {
        self.artists.iter().map(|a| a.name.clone()).collect()
    }

    /// Calendar year of the album release date
    pub fn release_year(&self) -> Option<i32> {
        parse_year(&self.album.release_date)
    }

    /// Largest album cover, if any
    pub fn cover_url(&self) -> Option<&str> {
        self.album
            .images
            .iter()
            .max_by_key(|img| img.width.unwrap_or(0))
            .map(|img| img.url.as_str())
    }

    /// Playback URI understood by the platform
    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.id)
    }

    /// Whether the track may be presented to the player
    pub fn is_drawable(&self) -> bool {
        self.is_playable && !self.is_local
    }
}

/// Parse the calendar year out of a date of arbitrary precision
///
/// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`. Full dates must be valid
/// calendar dates. Year zero (a placeholder some catalogs emit) is rejected.
pub fn parse_year(date: &str) -> Option<i32> {
    let date = date.trim();
    let mut parts = date.split('-');
    let year_part = parts.next()?;
    if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => year_part.parse().ok(),
        (Some(month), None, _) => {
            let month: u32 = month.parse().ok()?;
            if !(1..=12).contains(&month) {
                return None;
            }
            year_part.parse().ok()
        }
        (Some(_), Some(_), None) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year()),
        _ => None,
    };
    year.filter(|&y| y > 0)
}
