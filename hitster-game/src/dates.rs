//! Release-year lookup port for the draw engine

use async_trait::async_trait;
use hitster_common::TrackRef;
use hitster_dates::{DatesError, Reconciler, TrackDates};

/// Anything that can reconcile a track's release year
#[async_trait]
pub trait DatesResolver: Send + Sync {
    async fn track_dates(&self, track: &TrackRef) -> Result<TrackDates, DatesError>;
}

#[async_trait]
impl DatesResolver for Reconciler {
    async fn track_dates(&self, track: &TrackRef) -> Result<TrackDates, DatesError> {
        Reconciler::track_dates(self, track).await
    }
}
