//! Photo identity and record types.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// An opaque, globally unique identifier for a remote photo.
///
/// The remote feed assigns ids as strings; nothing is assumed about
/// their format beyond uniqueness.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    /// Create a PhotoId from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PhotoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhotoId({})", self.0)
    }
}

/// An immutable description of one remotely hosted photo.
///
/// Equality is full structural content, not just `id` - change detection
/// in the engine relies on this. Records are never mutated; an updated
/// photo is a wholesale replacement.
///
/// The field names match the feed's JSON wire format (`download_url`
/// arrives snake_case), so a feed page deserializes directly into
/// `Vec<PhotoRecord>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Unique photo id.
    pub id: PhotoId,
    /// Photographer attribution.
    pub author: String,
    /// Source image width in pixels.
    pub width: u32,
    /// Source image height in pixels.
    pub height: u32,
    /// Canonical page for the image.
    pub url: Url,
    /// Direct download location.
    pub download_url: Url,
}
