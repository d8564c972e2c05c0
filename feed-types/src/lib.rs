//! # feed-types
//!
//! Value types for the photofeed synchronization engine.
//!
//! This crate provides the foundational types used across all photofeed crates:
//! - [`PhotoId`], [`PhotoRecord`] - Identity and photo value types
//! - [`PageRequest`] - Validated page fetch parameters
//! - [`FeedError`] - Typed feed failures

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod page;
mod photo;

pub use error::FeedError;
pub use page::PageRequest;
pub use photo::{PhotoId, PhotoRecord};
