//! The photo cache contract.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use photofeed_types::{PhotoId, PhotoRecord};

/// Cache entries older than this are eligible for eviction (7 days).
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Store failures.
///
/// Always non-fatal to the engine: logged, never surfaced as a feed
/// error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend rejected or lost the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable keyed cache of photo records.
///
/// One entry per distinct photo id; `save` is an idempotent upsert that
/// refreshes each entry's cache timestamp. Implementations must make a
/// batch save atomic from the caller's perspective: either all matches
/// update and the rest insert, or the batch fails without partial
/// visible corruption.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Upsert a batch of records, refreshing their cache timestamps.
    async fn save(&self, records: &[PhotoRecord]) -> Result<(), StoreError>;

    /// Load up to `limit` records, most recently cached first.
    async fn load(&self, limit: usize) -> Result<Vec<PhotoRecord>, StoreError>;

    /// Whether an entry exists for the given id.
    async fn exists(&self, id: &PhotoId) -> Result<bool, StoreError>;

    /// Remove entries older than the TTL. Returns how many were evicted.
    async fn evict_expired(&self) -> Result<usize, StoreError>;

    /// Remove all entries (reset path).
    async fn clear(&self) -> Result<(), StoreError>;
}
