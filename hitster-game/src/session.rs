//! Game session
//!
//! Wraps a [`DrawEngine`] with the playback side effects of revealing a
//! track and publishes the draw phase on a `watch` channel, so a UI can
//! disable its "reveal next" control while a prefetch is in flight.

use crate::catalog::{Playback, PlaybackState};
use crate::devices::DeviceSelection;
use crate::draw::{Draw, DrawEngine};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    /// Idle; a draw may or may not be pending
    Ready,
    /// Prefetch or reveal in flight
    Drawing,
    /// Every track used up
    Exhausted,
}

pub struct Session {
    engine: DrawEngine,
    playback: Arc<dyn Playback>,
    devices: DeviceSelection,
    phase: watch::Sender<DrawPhase>,
}

impl Session {
    pub fn new(engine: DrawEngine, playback: Arc<dyn Playback>) -> Self {
        let (phase, _) = watch::channel(Self::idle_phase(&engine));
        Self {
            engine,
            playback,
            devices: DeviceSelection::new(),
            phase,
        }
    }

    fn idle_phase(engine: &DrawEngine) -> DrawPhase {
        if engine.is_exhausted() {
            DrawPhase::Exhausted
        } else {
            DrawPhase::Ready
        }
    }

    fn settle(&self) {
        self.phase.send_replace(Self::idle_phase(&self.engine));
    }

    pub fn subscribe(&self) -> watch::Receiver<DrawPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> DrawPhase {
        *self.phase.borrow()
    }

    pub fn engine(&self) -> &DrawEngine {
        &self.engine
    }

    pub fn devices(&self) -> &DeviceSelection {
        &self.devices
    }

    /// Prefetch the next draw while the current track is on screen
    pub async fn prefetch(&mut self) -> Result<()> {
        self.phase.send_replace(DrawPhase::Drawing);
        let result = self.engine.prefetch_next().await;
        self.settle();
        result
    }

    /// Reveal the next track and start playing it
    ///
    /// Playback failures are logged; the draw itself still counts.
    pub async fn reveal_next(&mut self) -> Result<Option<Draw>> {
        self.phase.send_replace(DrawPhase::Drawing);
        let result = self.engine.next_track().await;
        self.settle();

        let draw = result?;
        if let Some(draw) = &draw {
            if let Err(e) = self.playback.play(&draw.track.uri()).await {
                warn!(track_id = %draw.track.id, error = %e, "Playback failed");
            }
        }
        Ok(draw)
    }

    pub fn restart(&mut self) -> Result<()> {
        let result = self.engine.restart();
        self.settle();
        result
    }

    pub async fn pause(&self) -> Result<()> {
        Ok(self.playback.pause().await?)
    }

    pub async fn playback_state(&self) -> Result<Option<PlaybackState>> {
        Ok(self.playback.playback_state().await?)
    }

    pub async fn refresh_devices(&mut self) -> Result<()> {
        self.devices.refresh(self.playback.as_ref()).await
    }

    pub async fn select_device(&mut self, device_id: &str) -> Result<()> {
        self.devices.select(self.playback.as_ref(), device_id).await
    }
}
