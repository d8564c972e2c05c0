//! Page fetch parameters.

use crate::FeedError;

/// A validated request for one page of the remote feed.
///
/// Pages are 1-based and bounded in size. Ephemeral - never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Create a page request, rejecting a zero page number or size.
    pub fn new(page: u32, per_page: u32) -> Result<Self, FeedError> {
        if page == 0 {
            return Err(FeedError::InvalidRequest("page must be >= 1".into()));
        }
        if per_page == 0 {
            return Err(FeedError::InvalidRequest("page size must be > 0".into()));
        }
        Ok(Self { page, per_page })
    }

    /// The 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// The requested number of records per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }
}
