//! Typed feed failures.

use thiserror::Error;

/// Errors that a feed source can fail with.
///
/// The variants are distinguished so that callers can present them
/// differently, but the engine drives identical control flow for all
/// of them. `Clone + PartialEq` so an error can sit in a published
/// state snapshot and be asserted against in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The page request could not be formed (bad page number or URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure (DNS, connect, timeout).
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("http error {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Status or server-provided message.
        message: String,
    },

    /// The response body could not be decoded into photo records.
    #[error("decode failure: {0}")]
    Decode(String),

    /// Anything that does not fit the other variants.
    #[error("unknown error: {0}")]
    Unknown(String),
}
