//! Release-year reconciliation
//!
//! Every source (plus the platform's own listing) contributes one opinion:
//! the set of distinct years it reported. The recommendation is the
//! smallest year shared by the largest possible number of opinions,
//! trying quorums from "all agree" down to "one says so". Confidence is
//! the quorum as a share of all opinions.
//!
//! A larger quorum always wins over an earlier year: if three opinions
//! agree on 1971 while two agree on 1969, the answer is 1971.

use crate::error::{DatesError, Result};
use crate::query::track_search_key;
use crate::sources::{AllMusicScraper, DiscogsClient, MusicBrainzClient, YearSource};
use crate::types::{Source, TrackDates, YearCandidate};
use futures::future::join_all;
use hitster_common::config::TomlConfig;
use hitster_common::TrackRef;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared deadline for the whole source fan-out
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One source per provider; with the platform that makes four opinions
pub const SOURCE_COUNT: usize = 3;

/// Picks the recommended year from per-opinion year sets
///
/// Returns `(year, quorum)` for the largest quorum any year reaches,
/// choosing the smallest such year. `None` when every set is empty.
pub fn recommend(opinions: &[BTreeSet<i32>]) -> Option<(i32, usize)> {
    let mut votes: BTreeMap<i32, usize> = BTreeMap::new();
    for opinion in opinions {
        for &year in opinion {
            *votes.entry(year).or_default() += 1;
        }
    }

    (1..=opinions.len()).rev().find_map(|quorum| {
        votes
            .iter()
            .find(|(_, &count)| count >= quorum)
            .map(|(&year, _)| (year, quorum))
    })
}

/// Fans a track out to every source and reconciles the answers
pub struct Reconciler {
    sources: Vec<Arc<dyn YearSource>>,
    timeout: Duration,
}

impl Reconciler {
    /// Takes exactly [`SOURCE_COUNT`] sources, so confidence moves in
    /// quarter steps
    pub fn new(sources: Vec<Arc<dyn YearSource>>, timeout: Duration) -> Self {
        debug_assert_eq!(
            sources.len(),
            SOURCE_COUNT,
            "reconciler needs one source per provider"
        );
        Self { sources, timeout }
    }

    /// Build the three production sources from configuration
    ///
    /// A single HTTP client is shared by all sources; each source keeps
    /// its own rate limiter for the lifetime of the reconciler.
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let user_agent = config.user_agent();
        let http_client = reqwest::Client::builder()
            .timeout(config.dates.timeout())
            .build()
            .map_err(|e| DatesError::Client(e.to_string()))?;

        let credentials = crate::config::resolve_discogs_credentials(config);
        if credentials.is_none() {
            warn!("Discogs credentials not configured; Discogs source disabled");
        }

        let sources: Vec<Arc<dyn YearSource>> = vec![
            Arc::new(MusicBrainzClient::new(http_client.clone(), user_agent.clone())),
            Arc::new(DiscogsClient::new(http_client.clone(), user_agent.clone(), credentials)),
            Arc::new(AllMusicScraper::new(http_client, user_agent)),
        ];

        Ok(Self::new(sources, config.dates.timeout()))
    }

    /// Number of opinions a reconciliation weighs (platform + sources)
    pub fn opinion_count(&self) -> usize {
        self.sources.len() + 1
    }

    /// Reconcile a track's release year across all sources
    ///
    /// Source failures, timeouts and cancellations only shrink the set of
    /// opinions. Fails only when no opinion yields any year.
    pub async fn track_dates(&self, track: &TrackRef) -> Result<TrackDates> {
        let key = track_search_key(track);
        let query = key.query_string();
        let platform_year = track.release_year();
        if platform_year.is_none() {
            warn!(
                track_id = %track.id,
                release_date = %track.album.release_date,
                "Unparseable platform release date"
            );
        }

        let cancel = CancellationToken::new();
        let fanout = join_all(self.sources.iter().map(|source| {
            let key = &key;
            let cancel = &cancel;
            async move { (source.source(), source.search(key, cancel).await) }
        }));
        tokio::pin!(fanout);

        let results: Vec<(Source, Vec<YearCandidate>)> = tokio::select! {
            results = &mut fanout => results,
            _ = tokio::time::sleep(self.timeout) => {
                warn!(
                    query = %query,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Source deadline reached, cancelling outstanding searches"
                );
                cancel.cancel();
                fanout.await
            }
        };

        let mut opinions: Vec<BTreeSet<i32>> = Vec::with_capacity(self.opinion_count());
        opinions.push(platform_year.into_iter().collect());
        for (_, candidates) in &results {
            opinions.push(candidates.iter().map(|c| c.year).collect());
        }

        let (recommendation, quorum) =
            recommend(&opinions).ok_or_else(|| DatesError::NoOpinions(query.clone()))?;
        let confidence = quorum as f64 / opinions.len() as f64;

        debug!(query = %query, ?opinions, "Collected year opinions");
        info!(
            query = %query,
            recommendation,
            confidence,
            "Release year reconciled"
        );

        Ok(TrackDates {
            query,
            platform_year,
            candidates: results.into_iter().collect(),
            recommendation,
            confidence,
        })
    }
}
