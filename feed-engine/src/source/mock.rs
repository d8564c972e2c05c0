//! Mock feed source for testing.
//!
//! Allows scripting per-page responses (payloads, errors, artificial
//! delays) and capturing the pages that were fetched. Clones share
//! state, so a test can keep a handle for verification after handing
//! the source to the engine.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use photofeed_types::{FeedError, PageRequest, PhotoRecord};

use super::FeedSource;

#[derive(Debug)]
struct Scripted {
    delay: Option<Duration>,
    result: Result<Vec<PhotoRecord>, FeedError>,
}

#[derive(Debug, Default)]
struct MockFeedInner {
    /// Sticky payloads, returned whenever no scripted response is queued.
    pages: HashMap<u32, Vec<PhotoRecord>>,
    /// One-shot scripted responses, consumed FIFO per page.
    queued: HashMap<u32, VecDeque<Scripted>>,
    fetched: Vec<PageRequest>,
}

/// Mock [`FeedSource`] for testing.
///
/// Unscripted pages resolve to an empty vec, which the engine reads as
/// feed exhaustion.
#[derive(Debug, Default)]
pub struct MockFeedSource {
    inner: Arc<Mutex<MockFeedInner>>,
}

impl MockFeedSource {
    /// Create a mock with no scripted pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sticky payload for a page (returned on every fetch).
    pub fn insert_page(&self, page: u32, records: Vec<PhotoRecord>) {
        self.inner.lock().unwrap().pages.insert(page, records);
    }

    /// Queue a one-shot payload for the next fetch of `page`.
    pub fn queue_page(&self, page: u32, records: Vec<PhotoRecord>) {
        self.queue(page, None, Ok(records));
    }

    /// Queue a one-shot payload delivered after `delay`.
    pub fn queue_delayed(&self, page: u32, delay: Duration, records: Vec<PhotoRecord>) {
        self.queue(page, Some(delay), Ok(records));
    }

    /// Queue a one-shot failure for the next fetch of `page`.
    pub fn queue_error(&self, page: u32, error: FeedError) {
        self.queue(page, None, Err(error));
    }

    /// Page numbers fetched so far, in order.
    pub fn fetched_pages(&self) -> Vec<u32> {
        self.inner
            .lock()
            .unwrap()
            .fetched
            .iter()
            .map(|r| r.page())
            .collect()
    }

    /// Total number of fetches observed.
    pub fn fetch_count(&self) -> usize {
        self.inner.lock().unwrap().fetched.len()
    }

    fn queue(
        &self,
        page: u32,
        delay: Option<Duration>,
        result: Result<Vec<PhotoRecord>, FeedError>,
    ) {
        self.inner
            .lock()
            .unwrap()
            .queued
            .entry(page)
            .or_default()
            .push_back(Scripted { delay, result });
    }
}

impl Clone for MockFeedSource {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<PhotoRecord>, FeedError> {
        // Resolve the script while holding the lock, then release it
        // before any artificial delay.
        let (delay, result) = {
            let mut inner = self.inner.lock().unwrap();
            inner.fetched.push(request);

            if let Some(scripted) = inner
                .queued
                .get_mut(&request.page())
                .and_then(|queue| queue.pop_front())
            {
                (scripted.delay, scripted.result)
            } else {
                let records = inner
                    .pages
                    .get(&request.page())
                    .cloned()
                    .unwrap_or_default();
                (None, Ok(records))
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
