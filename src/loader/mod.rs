// Cached snapshot loader.
// Serves the published data snapshot from a local cache, falling back to a
// network fetch that writes through on success.

pub mod source;
pub mod store;

pub use source::{HttpSource, SNAPSHOT_URL, SnapshotSource, SourceError};
pub use store::{FileStore, MemoryStore, SnapshotStore};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::snapshot::{DataSnapshot, ParseError};

/// Cache key for the snapshot document. Bumping the suffix invalidates every
/// previously cached copy, which is how incompatible schema changes roll out.
pub const CACHE_KEY: &str = "github-data-v1";

/// Terminal failure of a load: no usable cached copy and no usable network
/// copy. Callers may retry by calling `load` again.
#[derive(Error, Debug)]
pub enum DataUnavailable {
    #[error("snapshot fetch failed: {0}")]
    NetworkFailure(#[source] SourceError),

    #[error("snapshot payload malformed: {0}")]
    MalformedPayload(#[source] ParseError),
}

/// Loader over an injected store and source.
pub struct SnapshotLoader<S, R> {
    store: S,
    source: R,
    /// Guards the miss path so concurrent loads share one fetch.
    refresh: Mutex<()>,
}

impl SnapshotLoader<FileStore, HttpSource> {
    /// Loader over the platform cache directory and the published URL.
    pub fn open_default() -> Option<Self> {
        FileStore::open_default().map(|store| Self::new(store, HttpSource::new()))
    }
}

impl<S: SnapshotStore, R: SnapshotSource> SnapshotLoader<S, R> {
    pub fn new(store: S, source: R) -> Self {
        Self {
            store,
            source,
            refresh: Mutex::new(()),
        }
    }

    /// Produce the current snapshot.
    ///
    /// Fast path: a valid cached copy is returned without touching the
    /// network. Otherwise the document is fetched from the fixed URL, the raw
    /// text is written through to the cache, and the parsed snapshot is
    /// returned. A corrupt cache entry is treated as a miss. There is no
    /// retry and no automatic invalidation.
    pub async fn load(&self) -> Result<DataSnapshot, DataUnavailable> {
        if let Some(snapshot) = self.cached() {
            debug!("snapshot served from cache");
            return Ok(snapshot);
        }

        let _guard = self.refresh.lock().await;
        // A concurrent load may have populated the cache while we waited.
        if let Some(snapshot) = self.cached() {
            debug!("snapshot cached by concurrent load");
            return Ok(snapshot);
        }

        let body = self.source.fetch().await.map_err(|e| {
            warn!(error = %e, "snapshot fetch failed");
            DataUnavailable::NetworkFailure(e)
        })?;
        let snapshot = DataSnapshot::from_json(&body).map_err(|e| {
            warn!(error = %e, "fetched snapshot did not parse, not caching it");
            DataUnavailable::MalformedPayload(e)
        })?;

        // Cache the text exactly as received; re-serializing the parsed
        // value could drift from the published document.
        if let Err(e) = self.store.set(CACHE_KEY, &body) {
            warn!(error = %e, "snapshot cache write failed");
        }

        Ok(snapshot)
    }

    fn cached(&self) -> Option<DataSnapshot> {
        let text = self.store.get(CACHE_KEY)?;
        match DataSnapshot::from_json(&text) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(error = %e, "cached snapshot is invalid, refetching");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::*;
    use crate::error::VitrineError;
    use crate::snapshot::samples;

    enum Reply {
        Body(String),
        Failure(StatusCode),
    }

    struct StubSource {
        reply: Reply,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn body(text: impl Into<String>) -> Self {
            Self {
                reply: Reply::Body(text.into()),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failure(status: StatusCode) -> Self {
            Self {
                reply: Reply::Failure(status),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(text: impl Into<String>) -> Self {
            Self {
                delay: Some(Duration::from_millis(20)),
                ..Self::body(text)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SnapshotSource for StubSource {
        async fn fetch(&self) -> Result<String, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Reply::Body(text) => Ok(text.clone()),
                Reply::Failure(status) => Err(SourceError::Status(*status)),
            }
        }
    }

    /// Store whose writes always fail, for exercising write-through errors.
    struct RejectingStore;

    impl SnapshotStore for RejectingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> crate::error::Result<()> {
            Err(VitrineError::Other("store rejected write".to_string()))
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let store = MemoryStore::new();
        store.set(CACHE_KEY, &samples::snapshot_json()).unwrap();
        let loader = SnapshotLoader::new(store, StubSource::body("never fetched"));

        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot, samples::snapshot());
        assert_eq!(loader.source.calls(), 0);
    }

    #[tokio::test]
    async fn cache_miss_fetches_and_stores_raw_text() {
        let body = samples::snapshot_json();
        let loader = SnapshotLoader::new(MemoryStore::new(), StubSource::body(body.clone()));

        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot, samples::snapshot());
        assert_eq!(loader.source.calls(), 1);
        assert_eq!(loader.store.get(CACHE_KEY), Some(body));
    }

    #[tokio::test]
    async fn second_load_after_miss_hits_cache() {
        let loader =
            SnapshotLoader::new(MemoryStore::new(), StubSource::body(samples::snapshot_json()));

        loader.load().await.unwrap();
        loader.load().await.unwrap();
        assert_eq!(loader.source.calls(), 1);
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_network() {
        let store = MemoryStore::new();
        store.set(CACHE_KEY, r#"{"ayfri":"#).unwrap();
        let loader = SnapshotLoader::new(store, StubSource::body(samples::snapshot_json()));

        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot.profile.login, "ayfri");
        assert_eq!(loader.source.calls(), 1);
        assert_eq!(loader.store.get(CACHE_KEY), Some(samples::snapshot_json()));
    }

    #[tokio::test]
    async fn network_failure_surfaces_and_cache_stays_empty() {
        let loader = SnapshotLoader::new(
            MemoryStore::new(),
            StubSource::failure(StatusCode::INTERNAL_SERVER_ERROR),
        );

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, DataUnavailable::NetworkFailure(_)));
        assert_eq!(loader.store.get(CACHE_KEY), None);
    }

    #[tokio::test]
    async fn malformed_payload_is_not_cached() {
        let loader = SnapshotLoader::new(MemoryStore::new(), StubSource::body("not json"));

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, DataUnavailable::MalformedPayload(_)));
        assert_eq!(loader.store.get(CACHE_KEY), None);
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_fetch() {
        let loader =
            SnapshotLoader::new(MemoryStore::new(), StubSource::slow(samples::snapshot_json()));

        let (a, b) = tokio::join!(loader.load(), loader.load());
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(loader.source.calls(), 1);
    }

    #[tokio::test]
    async fn failed_cache_write_still_returns_snapshot() {
        let loader = SnapshotLoader::new(RejectingStore, StubSource::body(samples::snapshot_json()));

        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot.profile.login, "ayfri");
    }
}
