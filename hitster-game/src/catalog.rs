//! Streaming platform collaborators
//!
//! The game never talks to the platform directly. Callers inject a
//! [`CatalogClient`] for playlist pages and a [`Playback`] for device
//! control; both report failures as a [`CatalogError`].

use crate::error::CatalogError;
use async_trait::async_trait;
use hitster_common::TrackRef;
use serde::{Deserialize, Serialize};

/// One entry of a playlist page; removed tracks come back as `null`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackRef>,
}

/// A page of playlist entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracksPage {
    pub items: Vec<PlaylistItem>,
    /// Total entries in the playlist, not in this page
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Playlist as returned by the platform lookup, with its first page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: TracksPage,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch `limit` playlist entries starting at `offset`
    async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<TracksPage, CatalogError>;
}

/// A playback target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
}

/// What the platform is currently playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub device: Option<Device>,
    pub item: Option<TrackRef>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
}

/// Playback side effects
#[async_trait]
pub trait Playback: Send + Sync {
    async fn devices(&self) -> Result<Vec<Device>, CatalogError>;

    /// Start `uri` on the active device
    async fn play(&self, uri: &str) -> Result<(), CatalogError>;

    async fn pause(&self) -> Result<(), CatalogError>;

    /// `None` when nothing is playing anywhere
    async fn playback_state(&self) -> Result<Option<PlaybackState>, CatalogError>;

    /// Transfer playback to `device_id`
    async fn set_device(&self, device_id: &str) -> Result<(), CatalogError>;
}
