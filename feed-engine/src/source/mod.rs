//! Feed source abstraction.
//!
//! The remote feed is consumed through a single operation: fetch one
//! ordered page of photo records or fail with a typed error. No ETags,
//! no cursors - a short page is the only exhaustion signal.

mod http;
mod mock;

pub use http::{HttpFeedSource, DEFAULT_BASE_URL};
pub use mock::MockFeedSource;

use async_trait::async_trait;
use photofeed_types::{FeedError, PageRequest, PhotoRecord};

/// A remote paginated source of photo records.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page of records, in feed order.
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<PhotoRecord>, FeedError>;
}
