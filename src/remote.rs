use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::bus::EventBus;
use crate::http::HttpClient;

/// How long a polled snapshot stays fresh.
pub const CACHE_TTL_MS: i64 = 30_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobCategoryCounts {
    pub seeker: u64,
    pub employer: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobCounts {
    pub total: u64,
    pub seeker: u64,
    pub employer: u64,
    pub categories: HashMap<String, JobCategoryCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarajCounts {
    pub total: u64,
    pub categories: HashMap<String, u64>,
}

/// Aggregate post counts as polled from the backend. Both sections must be
/// present for a response body to count as well-formed, the fields inside
/// them default to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteCounts {
    pub jobs: JobCounts,
    pub haraj: HarajCounts,
}

impl RemoteCounts {
    pub fn job_category(&self, category: &str) -> JobCategoryCounts {
        self.jobs.categories.get(category).cloned().unwrap_or_default()
    }

    pub fn haraj_category(&self, category: &str) -> u64 {
        self.haraj.categories.get(category).copied().unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct CountsResponse {
    #[serde(default)]
    success: bool,
    data: Option<RemoteCounts>,
}

impl CountsResponse {
    fn into_counts(self) -> anyhow::Result<RemoteCounts> {
        if !self.success {
            anyhow::bail!("counts endpoint reported success=false");
        }
        self.data
            .context("counts endpoint response carries no data object")
    }
}

/// Source of [`RemoteCounts`]. Abstracted so the cache and poller can be
/// exercised without a network.
#[async_trait::async_trait]
pub trait CountsFetcher: Send + Sync {
    async fn fetch_counts(&self) -> anyhow::Result<RemoteCounts>;
}

pub struct HttpCountsFetcher {
    http: HttpClient,
    base_url: String,
}

impl HttpCountsFetcher {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl CountsFetcher for HttpCountsFetcher {
    async fn fetch_counts(&self) -> anyhow::Result<RemoteCounts> {
        let url = format!("{}/api/v1/posts/counts", self.base_url);
        let response: CountsResponse = self.http.to_t(url).await?;
        response.into_counts()
    }
}

struct CacheEntry {
    value: RemoteCounts,
    fetched_at: DateTime<Utc>,
}

/// TTL cache over a [`CountsFetcher`] with single-flight and stale-on-error
/// behavior. A successful fetch replaces the entry and broadcasts it on the
/// remote-counts channel; a failed one logs, keeps the previous entry, and
/// hands that out instead.
pub struct RemoteCountCache<F> {
    fetcher: F,
    bus: Arc<EventBus>,
    ttl: Duration,
    // Held across the fetch await. That is the single-flight: concurrent
    // callers queue on the lock and pick up whatever the in-flight request
    // left behind.
    entry: tokio::sync::Mutex<Option<CacheEntry>>,
}

impl<F: CountsFetcher> RemoteCountCache<F> {
    pub fn new(fetcher: F, bus: Arc<EventBus>) -> Self {
        Self::with_ttl(fetcher, bus, Duration::milliseconds(CACHE_TTL_MS))
    }

    pub fn with_ttl(fetcher: F, bus: Arc<EventBus>, ttl: Duration) -> Self {
        Self {
            fetcher,
            bus,
            ttl,
            entry: tokio::sync::Mutex::new(None),
        }
    }

    /// Returns the cached snapshot while it is fresh, otherwise refetches.
    /// `force_refresh` skips the freshness check but still reuses a request
    /// that was already in flight when this call arrived. Returns `None`
    /// only when a fetch fails before any snapshot was ever cached.
    pub async fn fetch(&self, force_refresh: bool) -> Option<RemoteCounts> {
        let requested_at = Utc::now();
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            let reusable = if force_refresh {
                // Written while we were waiting on the lock.
                cached.fetched_at >= requested_at
            } else {
                requested_at - cached.fetched_at < self.ttl
            };
            if reusable {
                return Some(cached.value.clone());
            }
        }

        match self.fetcher.fetch_counts().await {
            Ok(counts) => {
                *entry = Some(CacheEntry {
                    value: counts.clone(),
                    fetched_at: Utc::now(),
                });
                self.bus.emit_remote_counts(&counts);
                Some(counts)
            }
            Err(err) => {
                tracing::error!("fail to fetch post counts: {err:#}");
                entry.as_ref().map(|cached| cached.value.clone())
            }
        }
    }

    /// Forces the next `fetch` to hit the network without discarding the
    /// last-known snapshot, which stays returnable should that fetch fail.
    pub async fn invalidate(&self) {
        let mut entry = self.entry.lock().await;
        if let Some(cached) = entry.as_mut() {
            cached.fetched_at = DateTime::<Utc>::MIN_UTC;
        }
    }

    /// Last successfully fetched snapshot, regardless of freshness.
    pub async fn last_known(&self) -> Option<RemoteCounts> {
        self.entry
            .lock()
            .await
            .as_ref()
            .map(|cached| cached.value.clone())
    }
}
