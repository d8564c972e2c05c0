//! In-memory photo cache.
//!
//! Thread-safe, TTL-bounded, not persistent - all entries are lost when
//! the store is dropped. Timestamps come from `tokio::time::Instant` so
//! paused-clock tests can drive eviction deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use photofeed_types::{PhotoId, PhotoRecord};

use crate::store::{PhotoStore, StoreError, DEFAULT_TTL};

#[derive(Debug, Clone)]
struct CacheEntry {
    record: PhotoRecord,
    cached_at: Instant,
    /// Tie-breaker for entries cached at the same instant.
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<PhotoId, CacheEntry>,
    next_seq: u64,
}

/// In-memory implementation of [`PhotoStore`].
#[derive(Debug, Clone)]
pub struct MemoryPhotoStore {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
}

impl MemoryPhotoStore {
    /// Create an empty store with the default 7-day TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create an empty store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            ttl,
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().entries.is_empty()
    }
}

impl Default for MemoryPhotoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn save(&self, records: &[PhotoRecord]) -> Result<(), StoreError> {
        // One lock for the whole batch keeps the upsert atomic.
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();
        for record in records {
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.entries.insert(
                record.id.clone(),
                CacheEntry {
                    record: record.clone(),
                    cached_at: now,
                    seq,
                },
            );
        }
        Ok(())
    }

    async fn load(&self, limit: usize) -> Result<Vec<PhotoRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<&CacheEntry> = inner.entries.values().collect();
        entries.sort_by(|a, b| (b.cached_at, b.seq).cmp(&(a.cached_at, a.seq)));
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|e| e.record.clone())
            .collect())
    }

    async fn exists(&self, id: &PhotoId) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().entries.contains_key(id))
    }

    async fn evict_expired(&self) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();
        let before = inner.entries.len();
        let ttl = self.ttl;
        inner
            .entries
            .retain(|_, entry| now.duration_since(entry.cached_at) <= ttl);
        Ok(before - inner.entries.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.lock().unwrap().entries.clear();
        Ok(())
    }
}
