//! Shared fixtures for hitster-dates integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use hitster_common::track::{AlbumRef, ArtistRef};
use hitster_common::TrackRef;
use hitster_dates::sources::{SourceError, YearSource};
use hitster_dates::{Reconciler, SearchKey, Source, SourceMetadata, YearCandidate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source with canned years, optional delay and call recording
pub struct StubSource {
    pub source: Source,
    pub years: Option<Vec<i32>>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub last_key: Mutex<Option<SearchKey>>,
}

impl StubSource {
    pub fn years(source: Source, years: &[i32]) -> Arc<Self> {
        Arc::new(Self {
            source,
            years: Some(years.to_vec()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_key: Mutex::new(None),
        })
    }

    pub fn broken(source: Source) -> Arc<Self> {
        Arc::new(Self {
            source,
            years: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_key: Mutex::new(None),
        })
    }

    pub fn hanging(source: Source, years: &[i32]) -> Arc<Self> {
        Arc::new(Self {
            source,
            years: Some(years.to_vec()),
            delay: Duration::from_secs(3600),
            calls: AtomicUsize::new(0),
            last_key: Mutex::new(None),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl YearSource for StubSource {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self, key: &SearchKey) -> Result<Vec<YearCandidate>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(key.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.years {
            Some(years) => Ok(years
                .iter()
                .map(|&year| {
                    YearCandidate::new(
                        year,
                        SourceMetadata {
                            title: key.title.clone(),
                            artist: Some(key.primary_artist().to_string()),
                            ..Default::default()
                        },
                    )
                })
                .collect()),
            None => Err(SourceError::Api(503, "unavailable".to_string())),
        }
    }
}

pub fn reconciler(sources: Vec<Arc<StubSource>>, timeout: Duration) -> Reconciler {
    Reconciler::new(
        sources
            .into_iter()
            .map(|s| s as Arc<dyn YearSource>)
            .collect(),
        timeout,
    )
}

pub fn track(name: &str, artists: &[&str], release_date: &str) -> TrackRef {
    TrackRef {
        id: format!("id-{}", name.len()),
        name: name.to_string(),
        is_playable: true,
        is_local: false,
        artists: artists
            .iter()
            .map(|a| ArtistRef {
                name: a.to_string(),
            })
            .collect(),
        album: AlbumRef {
            name: "Album".to_string(),
            release_date: release_date.to_string(),
            images: vec![],
        },
    }
}
