//! Time-based cache of the raw calendar feed.
//!
//! The cache never fails: when a refresh is due and the fetch goes wrong,
//! the previous bytes keep being served until a later fetch succeeds.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::fetch::Fetcher;

/// Bytes from one successful fetch, with the time they were retrieved.
#[derive(Debug)]
pub struct CachedFeed {
    pub data: Arc<[u8]>,
    pub fetched_at: DateTime<Utc>,
}

/// What a refresh attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Refresh interval not yet elapsed; nothing fetched.
    UpToDate,
    /// Fetched and replaced the cached bytes.
    Fresh,
    /// Fetch failed; the previous bytes (possibly none) are still served.
    StaleFallback,
}

pub struct CalendarCache<F> {
    source_url: String,
    refresh_interval: Duration,
    fetcher: F,
    // Data and timestamp are swapped together as one snapshot.
    current: RwLock<Option<Arc<CachedFeed>>>,
}

impl<F: Fetcher> CalendarCache<F> {
    pub fn new(source_url: impl Into<String>, refresh_interval: Duration, fetcher: F) -> Self {
        CalendarCache {
            source_url: source_url.into(),
            refresh_interval,
            fetcher,
            current: RwLock::new(None),
        }
    }

    /// Refresh the feed if the refresh interval has elapsed.
    pub async fn ensure_fresh(&self) {
        self.refresh_at(Utc::now()).await;
    }

    /// Refresh decision and fetch, evaluated as of `now`.
    ///
    /// The lock is not held across the fetch: concurrent callers that both
    /// see an expired snapshot each fetch, and the last one to finish wins.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> RefreshOutcome {
        if !self.is_due(now).await {
            return RefreshOutcome::UpToDate;
        }

        match self.fetcher.get(&self.source_url).await {
            Ok(body) => {
                tracing::info!(
                    url = %self.source_url,
                    bytes = body.len(),
                    "refreshed calendar feed"
                );
                let snapshot = CachedFeed {
                    data: Arc::from(body),
                    fetched_at: now,
                };
                *self.current.write().await = Some(Arc::new(snapshot));
                RefreshOutcome::Fresh
            }
            Err(e) => {
                let last_fetched_at = self.last_fetched_at().await;
                tracing::warn!(
                    url = %self.source_url,
                    ?last_fetched_at,
                    "error fetching calendar feed, serving cached data: {e}"
                );
                RefreshOutcome::StaleFallback
            }
        }
    }

    async fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.current.read().await.as_ref() {
            None => true,
            // A deadline chrono cannot represent is never reached.
            Some(feed) => chrono::Duration::from_std(self.refresh_interval)
                .ok()
                .and_then(|interval| feed.fetched_at.checked_add_signed(interval))
                .is_some_and(|due| now >= due),
        }
    }

    /// The most recent successful fetch, if any.
    pub async fn snapshot(&self) -> Option<Arc<CachedFeed>> {
        self.current.read().await.clone()
    }

    /// Cached bytes; empty when nothing has been fetched yet.
    pub async fn data(&self) -> Arc<[u8]> {
        self.snapshot()
            .await
            .map(|feed| Arc::clone(&feed.data))
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()))
    }

    pub async fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot().await.map(|feed| feed.fetched_at)
    }
}
