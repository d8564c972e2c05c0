//! # feed-engine
//!
//! Photo feed synchronization engine.
//!
//! Reconciles a remote paginated photo feed with a local durable cache
//! under concurrent user-triggered operations (refresh, incremental
//! load-more, teardown), with cache-first instant display,
//! deduplication, staleness-bounded caching, and cancellation-safe
//! concurrency.
//!
//! ## Architecture
//!
//! The engine drives the pure session state from `feed-core` and
//! performs the actual I/O through two injected collaborators:
//!
//! ```text
//! Consumer → FeedEngine → FeedSource  → network
//!                 ↓      → PhotoStore → cache
//!            feed-core (pure session state)
//! ```
//!
//! Superseded operations are discarded by generation number, never by
//! forced task termination; see [`engine::FeedEngine`].
//!
//! ## Example
//!
//! ```ignore
//! use photofeed_engine::{EngineConfig, FeedEngine, HttpFeedSource, TracingSink};
//! use photofeed_store::MemoryPhotoStore;
//!
//! let source = HttpFeedSource::new()?;
//! let engine = FeedEngine::new(
//!     EngineConfig::default(),
//!     source,
//!     MemoryPhotoStore::new(),
//!     TracingSink,
//! );
//!
//! engine.load().await;
//! println!("{} photos", engine.photos().await.len());
//! engine.load_more();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod notify;
pub mod source;

pub use config::EngineConfig;
pub use engine::{FeedEngine, FeedSnapshot};
pub use notify::{NoticeKind, NotificationSink, RecordingSink, TracingSink};
pub use source::{FeedSource, HttpFeedSource, MockFeedSource, DEFAULT_BASE_URL};
