//! # feed-core
//!
//! Pure logic for photofeed (no I/O, instant tests).
//!
//! This crate implements the session state and merge policies for feed
//! synchronization without any network or disk I/O, enabling fast unit
//! tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce
//! output without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (network, cache) is performed by `feed-engine`, which
//! drives these transitions and executes the implied side effects.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod session;
pub mod throttle;

pub use session::{LoadMoreOutcome, RefreshFailure, RefreshOutcome, SessionState};
pub use throttle::NotifyGate;
