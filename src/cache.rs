use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{debug, trace, warn};

use crate::error::WidgetError;
use crate::feed::FeedSnapshot;

/// Persistent string key/value storage.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// The pair of storage keys holding one widget instance's cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    snapshot: String,
    fetched_at: String,
}

impl CacheKey {
    pub fn for_instance(instance: &str) -> Self {
        Self {
            snapshot: format!("{instance}-cache"),
            fetched_at: format!("{instance}-cache-time"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub snapshot: FeedSnapshot,
    pub fetched_at_millis: i64,
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn is_fresh(entry: &CacheEntry, ttl: Duration, now_millis: i64) -> bool {
    let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

    now_millis.saturating_sub(entry.fetched_at_millis) < ttl_millis
}

/// Best-effort snapshot cache: read failures are misses, write failures are logged.
pub struct FeedCache<S> {
    store: S,
}

impl<S: KvStore> FeedCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.try_read(key).await {
            Ok(entry) => entry,

            Err(e) => {
                debug!("Ignoring the cached feed: {e}");
                None
            }
        }
    }

    async fn try_read(&self, key: &CacheKey) -> Result<Option<CacheEntry>, WidgetError> {
        let fetched_at = self
            .store
            .get(&key.fetched_at)
            .await
            .map_err(|e| WidgetError::CacheCorrupt(format!("{e:#}")))?;
        let Some(fetched_at) = fetched_at else {
            trace!("No cached feed timestamp");
            return Ok(None);
        };

        let snapshot = self
            .store
            .get(&key.snapshot)
            .await
            .map_err(|e| WidgetError::CacheCorrupt(format!("{e:#}")))?;
        let Some(snapshot) = snapshot else {
            trace!("No cached feed snapshot");
            return Ok(None);
        };

        let fetched_at_millis = fetched_at.trim().parse::<i64>().map_err(|e| {
            WidgetError::CacheCorrupt(format!("bad timestamp `{fetched_at}`: {e}"))
        })?;
        let snapshot = serde_json::from_str::<FeedSnapshot>(&snapshot)
            .map_err(|e| WidgetError::CacheCorrupt(format!("bad snapshot: {e}")))?;

        Ok(Some(CacheEntry {
            snapshot,
            fetched_at_millis,
        }))
    }

    /// Overwrites the entry. `fetched_at_millis` is normally the current time.
    pub async fn write(&self, key: &CacheKey, snapshot: &FeedSnapshot, fetched_at_millis: i64) {
        if let Err(e) = self.try_write(key, snapshot, fetched_at_millis).await {
            warn!("{:#}", anyhow::Error::from(e));
        } else {
            debug!(fetched_at_millis, "Cached {} articles", snapshot.articles.len());
        }
    }

    async fn try_write(
        &self,
        key: &CacheKey,
        snapshot: &FeedSnapshot,
        fetched_at_millis: i64,
    ) -> Result<(), WidgetError> {
        let serialized = serde_json::to_string(snapshot)
            .map_err(|e| WidgetError::StorageWriteFailed(e.into()))?;

        self.store
            .set(&key.snapshot, &serialized)
            .await
            .map_err(WidgetError::StorageWriteFailed)?;
        self.store
            .set(&key.fetched_at, &fetched_at_millis.to_string())
            .await
            .map_err(WidgetError::StorageWriteFailed)?;

        Ok(())
    }
}
