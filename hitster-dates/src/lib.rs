//! # hitster-dates
//!
//! Release-year reconciliation for the guessing game.
//!
//! A track's title is normalized into a search key, the key is sent to
//! three independent metadata sources concurrently, and their answers are
//! combined with the platform's own release year into one recommended
//! year plus a confidence score.
//!
//! Also serves the reconciliation over HTTP (`POST /track-dates`).

pub mod api;
pub mod config;
pub mod error;
pub mod query;
pub mod reconciler;
pub mod sources;
pub mod types;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, DatesError};
pub use reconciler::Reconciler;
pub use types::{SearchKey, Source, SourceMetadata, TrackDates, YearCandidate};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self {
            reconciler,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::track_dates_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
