//! Draw Engine
//!
//! Tracks which playlist positions have not been presented yet, draws the
//! next one uniformly at random, pages tracks in lazily and reconciles the
//! drawn track's release year before it is revealed.
//!
//! # State
//! - `tracks`: sparse cache by playlist position; holes are fetched in
//!   pages of [`PAGE_SIZE`] on demand and never evicted
//! - `remaining`: positions not drawn yet; shrinks on every draw and on
//!   every unplayable track met while drawing
//! - `pending`: a prefetched draw whose index is still in `remaining`
//!
//! The snapshot (`tracks` + `remaining`) is saved after every mutation.
//! Revealing a draw saves first and only then drops the index, so a
//! failed save leaves the draw pending.

use crate::catalog::{CatalogClient, Playlist};
use crate::dates::DatesResolver;
use crate::error::{GameError, Result};
use crate::snapshot::GameSnapshot;
use crate::storage::SnapshotStore;
use hitster_common::TrackRef;
use hitster_dates::{DatesError, TrackDates};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Playlist entries fetched per catalog request
pub const PAGE_SIZE: usize = 50;

/// A drawn track ready to be revealed
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    /// Playlist position
    pub index: usize,
    pub track: TrackRef,
    /// `None` when no source (platform included) knew a year
    pub dates: Option<TrackDates>,
}

pub struct DrawEngine {
    playlist_id: String,
    total: usize,
    tracks: Vec<Option<TrackRef>>,
    remaining: Vec<usize>,
    pending: Option<Draw>,
    catalog: Arc<dyn CatalogClient>,
    resolver: Arc<dyn DatesResolver>,
    store: Arc<dyn SnapshotStore>,
    rng: StdRng,
}

impl DrawEngine {
    /// Restore the saved game for `playlist`, or start a fresh one
    ///
    /// A missing, unreadable or inconsistent snapshot is discarded. A fresh
    /// game is seeded with the playlist's first page.
    pub fn new(
        playlist: &Playlist,
        catalog: Arc<dyn CatalogClient>,
        resolver: Arc<dyn DatesResolver>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self> {
        let total = playlist.tracks.total;
        let restored = match store.load(&playlist.id) {
            Ok(Some(json)) => match GameSnapshot::parse(&json, total) {
                Ok(snapshot) => Some(snapshot),
                Err(reason) => {
                    warn!(playlist_id = %playlist.id, %reason, "Discarding saved game");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(playlist_id = %playlist.id, error = %e, "Saved game unreadable");
                None
            }
        };

        let is_restored = restored.is_some();
        let snapshot = restored.unwrap_or_else(|| GameSnapshot::fresh(total, &playlist.tracks.items));

        let engine = Self {
            playlist_id: playlist.id.clone(),
            total,
            tracks: snapshot.tracks,
            remaining: snapshot.remaining,
            pending: None,
            catalog,
            resolver,
            store,
            rng: StdRng::from_entropy(),
        };

        if is_restored {
            info!(
                playlist_id = %engine.playlist_id,
                remaining = engine.remaining.len(),
                total,
                "Restored saved game"
            );
        } else {
            info!(playlist_id = %engine.playlist_id, total, "Starting new game");
            engine.persist()?;
        }
        Ok(engine)
    }

    /// Replace the random source (deterministic draws in tests)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Positions not drawn yet
    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    /// Whether a prefetched draw is waiting to be revealed
    pub fn is_prefetch_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.pending.as_ref().map(|draw| draw.index)
    }

    /// Nothing left to draw until [`restart`](Self::restart)
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty() && self.pending.is_none()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            tracks: self.tracks.clone(),
            remaining: self.remaining.clone(),
        }
    }

    /// Put every position back into play
    ///
    /// Keeps the track cache; unplayable tracks are dropped again when
    /// they are next drawn.
    pub fn restart(&mut self) -> Result<()> {
        self.remaining = (0..self.total).collect();
        self.pending = None;
        info!(playlist_id = %self.playlist_id, total = self.total, "Game restarted");
        self.persist()
    }

    /// Draw and reconcile the next playable track without revealing it
    ///
    /// Leaves no pending draw once every position is used up. A failed
    /// page fetch aborts the call; positions dropped before the failure
    /// stay dropped. A failed save is logged and retried on the next one,
    /// since the pending index is still in `remaining`.
    pub async fn prefetch_next(&mut self) -> Result<()> {
        self.pending = None;
        let drawn = self.draw_playable().await;
        if let Err(e) = self.persist() {
            warn!(playlist_id = %self.playlist_id, error = %e, "Saving game after prefetch failed");
        }

        let Some((index, track)) = drawn? else {
            debug!(playlist_id = %self.playlist_id, "No playable tracks left");
            return Ok(());
        };

        let dates = match self.resolver.track_dates(&track).await {
            Ok(dates) => Some(dates),
            Err(DatesError::NoOpinions(query)) => {
                warn!(index, %query, "No release year known, drawing without one");
                None
            }
            Err(e) => return Err(GameError::Dates(e)),
        };

        debug!(index, track_id = %track.id, "Prefetched next track");
        self.pending = Some(Draw {
            index,
            track,
            dates,
        });
        Ok(())
    }

    /// Reveal the next track, prefetching first when nothing is pending
    ///
    /// Returns `None` once the playlist is exhausted, until restart.
    pub async fn next_track(&mut self) -> Result<Option<Draw>> {
        if self.pending.is_none() && !self.remaining.is_empty() {
            self.prefetch_next().await?;
        }
        let Some(index) = self.pending_index() else {
            return Ok(None);
        };

        let mut snapshot = self.snapshot();
        snapshot.remaining.retain(|&i| i != index);
        self.save_snapshot(&snapshot)?;

        self.remaining = snapshot.remaining;
        debug!(index, remaining = self.remaining.len(), "Track drawn");
        Ok(self.pending.take())
    }

    /// Pick random positions until one holds a playable track
    async fn draw_playable(&mut self) -> Result<Option<(usize, TrackRef)>> {
        while !self.remaining.is_empty() {
            let index = self.remaining[self.rng.gen_range(0..self.remaining.len())];

            if self.tracks[index].is_none() {
                self.fetch_page(index).await?;
            }

            match &self.tracks[index] {
                Some(track) if track.is_drawable() => return Ok(Some((index, track.clone()))),
                Some(track) => {
                    debug!(index, track_id = %track.id, "Skipping unplayable track");
                }
                None => {
                    debug!(index, "Skipping missing track");
                }
            }
            self.remaining.retain(|&i| i != index);
        }
        Ok(None)
    }

    /// Load the page containing `index` into the cache
    async fn fetch_page(&mut self, index: usize) -> Result<()> {
        let offset = index / PAGE_SIZE * PAGE_SIZE;
        debug!(playlist_id = %self.playlist_id, offset, "Fetching track page");

        let page = self
            .catalog
            .get_playlist_tracks(&self.playlist_id, offset, PAGE_SIZE)
            .await?;

        for (position, item) in (page.offset..).zip(page.items) {
            let Some(slot) = self.tracks.get_mut(position) else {
                warn!(position, total = self.total, "Page entry beyond playlist end");
                break;
            };
            if let Some(track) = item.track {
                *slot = Some(track);
            }
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.save_snapshot(&self.snapshot())
    }

    fn save_snapshot(&self, snapshot: &GameSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot).map_err(hitster_common::Error::from)?;
        self.store.save(&self.playlist_id, &json)?;
        Ok(())
    }
}
