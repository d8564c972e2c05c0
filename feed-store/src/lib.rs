//! # feed-store
//!
//! Durable keyed cache of photo records with a time-to-live.
//!
//! This crate provides the [`PhotoStore`] trait consumed by the sync
//! engine, plus [`MemoryPhotoStore`], a TTL-bounded in-memory
//! implementation used for tests and as the default cache.
//!
//! The store is best-effort acceleration, never the source of truth:
//! the engine logs and ignores store failures, and a `save` of a batch
//! either applies as a whole or not at all from the engine's
//! perspective.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;
mod store;

pub use memory::MemoryPhotoStore;
pub use store::{PhotoStore, StoreError, DEFAULT_TTL};
