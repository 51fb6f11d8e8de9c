mod http;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::{self, CacheKey, FeedCache, KvStore};
use crate::error::{FetchError, WidgetError};
use crate::feed::FeedSnapshot;

pub use self::http::HttpSource;

pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Where snapshots come from when the cache cannot serve them.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FeedSnapshot, FetchError>;
}

pub fn feed_url(base_url: &str) -> String {
    format!("{base_url}all.json")
}

pub struct FeedLoader<F, S> {
    source: F,
    cache: FeedCache<S>,
    key: CacheKey,
    ttl: Duration,
}

impl<F: FeedSource, S: KvStore> FeedLoader<F, S> {
    pub fn new(source: F, cache: FeedCache<S>, key: CacheKey, ttl: Duration) -> Self {
        Self {
            source,
            cache,
            key,
            ttl,
        }
    }

    pub async fn load(&self, base_url: &str) -> Result<FeedSnapshot, WidgetError> {
        self.load_at(base_url, cache::now_millis()).await
    }

    pub async fn load_at(&self, base_url: &str, now_millis: i64) -> Result<FeedSnapshot, WidgetError> {
        if let Some(entry) = self.cache.read(&self.key).await {
            // the stored timestamp is untrusted and may be anywhere in the i64 range
            let age_ms = now_millis.saturating_sub(entry.fetched_at_millis);

            if cache::is_fresh(&entry, self.ttl, now_millis) {
                debug!(age_ms, "Serving the feed from the cache");

                return Ok(entry.snapshot);
            }

            debug!(age_ms, "The cached feed is stale");
        }

        let url = feed_url(base_url);
        let snapshot = self
            .source
            .fetch(&url)
            .await
            .map_err(|source| WidgetError::FeedUnavailable {
                url: url.clone(),
                source,
            })?;
        info!("Retrieved {} articles from `{url}`", snapshot.articles.len());

        self.cache.write(&self.key, &snapshot, now_millis).await;

        Ok(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;

    use super::*;
    use crate::cache::tests::MemoryStore;
    use crate::feed::tests::snapshot;

    const MINUTE: i64 = 60 * 1000;
    const NOW: i64 = 1_722_500_000_000;

    /// A scripted source; an entry may ask to be held until released.
    #[derive(Default, Clone)]
    pub struct FakeSource {
        responses: Arc<Mutex<VecDeque<Scripted>>>,
        calls: Arc<Mutex<Vec<String>>>,
        pub entered: Arc<Notify>,
        pub release: Arc<Notify>,
    }

    struct Scripted {
        response: Option<FeedSnapshot>,
        hold: bool,
    }

    impl FakeSource {
        pub fn respond(&self, snapshot: FeedSnapshot) -> &Self {
            self.push(Some(snapshot), false)
        }

        pub fn respond_held(&self, snapshot: FeedSnapshot) -> &Self {
            self.push(Some(snapshot), true)
        }

        pub fn fail(&self) -> &Self {
            self.push(None, false)
        }

        fn push(&self, response: Option<FeedSnapshot>, hold: bool) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Scripted { response, hold });

            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<FeedSnapshot, FetchError> {
            self.calls.lock().unwrap().push(url.into());
            let scripted = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected fetch");

            if scripted.hold {
                self.entered.notify_one();
                self.release.notified().await;
            }

            scripted
                .response
                .ok_or_else(|| serde_json::from_str::<FeedSnapshot>("{").unwrap_err().into())
        }
    }

    fn loader(source: FakeSource, store: MemoryStore) -> FeedLoader<FakeSource, MemoryStore> {
        FeedLoader::new(
            source,
            FeedCache::new(store),
            CacheKey::for_instance("friend-circle-lite"),
            DEFAULT_TTL,
        )
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_network() {
        let source = FakeSource::default();
        let store = MemoryStore::default();
        let loader = loader(source.clone(), store.clone());
        loader.cache.write(&loader.key, &snapshot(5), NOW - 9 * MINUTE).await;
        let writes = store.writes();

        let loaded = loader.load_at("https://fc.example.com/", NOW).await.unwrap();

        assert_eq!(loaded, snapshot(5));
        assert!(source.calls().is_empty());
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn stale_cache_is_refetched_and_overwritten() {
        let source = FakeSource::default();
        source.respond(snapshot(8));
        let store = MemoryStore::default();
        let loader = loader(source.clone(), store.clone());
        loader.cache.write(&loader.key, &snapshot(5), NOW - 11 * MINUTE).await;

        let loaded = loader.load_at("https://fc.example.com/", NOW).await.unwrap();

        assert_eq!(loaded, snapshot(8));
        assert_eq!(source.calls(), vec!["https://fc.example.com/all.json"]);

        let entry = loader.cache.read(&loader.key).await.unwrap();
        assert_eq!(entry.snapshot, snapshot(8));
        assert_eq!(entry.fetched_at_millis, NOW);
    }

    #[tokio::test]
    async fn cache_miss_writes_once() {
        let source = FakeSource::default();
        source.respond(snapshot(2));
        let store = MemoryStore::default();
        let loader = loader(source.clone(), store.clone());

        loader.load_at("https://fc.example.com/", NOW).await.unwrap();
        let writes = store.writes();
        loader.load_at("https://fc.example.com/", NOW + MINUTE).await.unwrap();

        // one snapshot and one timestamp write, none on the cache hit
        assert_eq!(writes, 2);
        assert_eq!(store.writes(), 2);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_feed_unavailable() {
        let source = FakeSource::default();
        source.fail();
        let store = MemoryStore::default();
        let loader = loader(source, store.clone());

        let err = loader.load_at("https://fc.example.com/", NOW).await.unwrap_err();

        assert!(matches!(
            err,
            WidgetError::FeedUnavailable { ref url, source: FetchError::Decode(_) }
                if url == "https://fc.example.com/all.json"
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn failing_store_still_loads() {
        let source = FakeSource::default();
        source.respond(snapshot(3)).respond(snapshot(4));
        let loader = loader(source.clone(), MemoryStore::failing());

        assert_eq!(loader.load_at("https://fc.example.com/", NOW).await.unwrap(), snapshot(3));
        assert_eq!(loader.load_at("https://fc.example.com/", NOW).await.unwrap(), snapshot(4));
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn extreme_timestamp_is_refetched_with_debug_logging() {
        let _logging = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .finish(),
        );
        let source = FakeSource::default();
        source.respond(snapshot(8));
        let store = MemoryStore::default();
        let loader = loader(source.clone(), store.clone());
        loader.cache.write(&loader.key, &snapshot(5), NOW).await;
        store.insert("friend-circle-lite-cache-time", &i64::MIN.to_string());

        let loaded = loader.load_at("https://fc.example.com/", NOW).await.unwrap();

        assert_eq!(loaded, snapshot(8));
        assert_eq!(source.calls().len(), 1);
    }

    #[test]
    fn url_is_concatenated() {
        assert_eq!(feed_url("https://fc.example.com/"), "https://fc.example.com/all.json");
        assert_eq!(feed_url(""), "all.json");
    }
}
