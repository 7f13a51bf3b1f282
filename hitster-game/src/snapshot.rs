//! Persisted game progress
//!
//! A snapshot is the track cache plus the not-yet-drawn indices. The
//! pending draw is never persisted; a restored game simply draws again.

use crate::catalog::PlaylistItem;
use hitster_common::TrackRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Sparse track cache indexed by playlist position
    pub tracks: Vec<Option<TrackRef>>,
    /// Playlist positions not drawn yet
    pub remaining: Vec<usize>,
}

impl GameSnapshot {
    /// Full index range, cache seeded with whatever entries are known
    ///
    /// `seed` is the first page returned by the playlist lookup and is
    /// placed at offset 0.
    pub fn fresh(total: usize, seed: &[PlaylistItem]) -> Self {
        let mut tracks: Vec<Option<TrackRef>> = vec![None; total];
        for (slot, item) in tracks.iter_mut().zip(seed) {
            *slot = item.track.clone();
        }
        Self {
            tracks,
            remaining: (0..total).collect(),
        }
    }

    /// Check the snapshot still describes a playlist of `total` entries
    pub fn validate(&self, total: usize) -> Result<(), String> {
        if self.tracks.len() != total {
            return Err(format!(
                "track cache holds {} entries, playlist has {}",
                self.tracks.len(),
                total
            ));
        }

        let mut seen = HashSet::with_capacity(self.remaining.len());
        for &index in &self.remaining {
            if index >= total {
                return Err(format!("remaining index {} out of range", index));
            }
            if !seen.insert(index) {
                return Err(format!("remaining index {} listed twice", index));
            }
        }
        Ok(())
    }

    /// Parse and validate a stored snapshot
    pub fn parse(json: &str, total: usize) -> Result<Self, String> {
        let snapshot: GameSnapshot = serde_json::from_str(json).map_err(|e| e.to_string())?;
        snapshot.validate(total)?;
        Ok(snapshot)
    }
}
