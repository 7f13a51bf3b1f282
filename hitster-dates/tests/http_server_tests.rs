//! HTTP Server & Routing Integration Tests

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{reconciler, StubSource};
use http_body_util::BodyExt;
use hitster_dates::{build_router, AppState, Source};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_app_state(years: &[i32]) -> AppState {
    let reconciler = reconciler(
        vec![
            StubSource::years(Source::MusicBrainz, years),
            StubSource::years(Source::Discogs, years),
            StubSource::broken(Source::AllMusic),
        ],
        Duration::from_secs(5),
    );
    AppState::new(Arc::new(reconciler))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(test_app_state(&[]));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "hitster-dates");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["opinions"], 4);
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_track_dates_endpoint() {
    // Given: two sources agreeing with the platform
    let app = build_router(test_app_state(&[1977]));
    let track = json!({
        "id": "abc",
        "name": "Go Your Own Way - 2004 Remaster",
        "artists": [{"name": "Fleetwood Mac"}],
        "album": {"name": "Rumours", "release_date": "1977-02-04", "images": []}
    });

    // When: POST /track-dates
    let response = app
        .oneshot(post_json("/track-dates", track.to_string()))
        .await
        .unwrap();

    // Then: reconciled dates come back
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["query"], "Go Your Own Way Fleetwood Mac");
    assert_eq!(json["platform_year"], 1977);
    assert_eq!(json["recommendation"], 1977);
    assert_eq!(json["confidence"], 0.75);
    assert_eq!(json["candidates"]["musicbrainz"][0]["year"], 1977);
    assert_eq!(json["candidates"]["allmusic"], json!([]));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = build_router(test_app_state(&[]));

    let response = app
        .oneshot(post_json("/track-dates", "{\"id\": 1}".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_empty_title_rejected() {
    let app = build_router(test_app_state(&[]));
    let track = json!({
        "id": "abc",
        "name": "   ",
        "artists": [],
        "album": {"name": "", "release_date": "2000"}
    });

    let response = app
        .oneshot(post_json("/track-dates", track.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_no_year_is_unprocessable() {
    let app = build_router(test_app_state(&[]));
    let track = json!({
        "id": "abc",
        "name": "Unknown",
        "artists": [{"name": "Nobody"}],
        "album": {"name": "", "release_date": ""}
    });

    let response = app
        .oneshot(post_json("/track-dates", track.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NO_RELEASE_YEAR");
}

#[tokio::test]
async fn test_unknown_route_404() {
    let app = build_router(test_app_state(&[]));

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
