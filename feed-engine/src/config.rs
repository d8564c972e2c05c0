//! Engine configuration.

use std::time::Duration;

/// Configuration for [`crate::FeedEngine`].
///
/// The debounce interval and the success-signal window are policy
/// constants, not derived from any invariant; tune them per consumer.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Records requested per feed page.
    pub page_size: u32,
    /// Quiesce delay before a scheduled load-more fetch actually runs.
    pub load_more_debounce: Duration,
    /// Minimum wall time between two "data updated" signals.
    pub notify_window: Duration,
}

impl EngineConfig {
    /// Set the feed page size.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        assert!(page_size > 0, "page_size must be > 0");
        self.page_size = page_size;
        self
    }

    /// Set the load-more debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.load_more_debounce = debounce;
        self
    }

    /// Set the success-signal cool-down window.
    pub fn with_notify_window(mut self, window: Duration) -> Self {
        self.notify_window = window;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            load_more_debounce: Duration::from_millis(500),
            notify_window: Duration::from_secs(4),
        }
    }
}
