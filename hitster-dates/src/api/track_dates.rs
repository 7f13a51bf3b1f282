//! Release-year reconciliation endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use hitster_common::TrackRef;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::types::TrackDates;
use crate::AppState;

/// POST /track-dates
///
/// Body is a platform track; response is the reconciled [`TrackDates`].
pub async fn track_dates(
    State(state): State<AppState>,
    payload: Result<Json<TrackRef>, JsonRejection>,
) -> ApiResult<Json<TrackDates>> {
    let Json(track) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if track.name.trim().is_empty() {
        return Err(ApiError::BadRequest("track name is empty".to_string()));
    }

    debug!(track_id = %track.id, name = %track.name, "Reconciling track dates");
    let dates = state.reconciler.track_dates(&track).await?;
    Ok(Json(dates))
}

/// Build reconciliation routes
pub fn track_dates_routes() -> Router<AppState> {
    Router::new().route("/track-dates", post(track_dates))
}
