//! Success-signal throttling.
//!
//! Repeated pull-to-refresh can produce a burst of "data updated"
//! signals; the gate collapses them to at most one per cool-down
//! window. Pure - the caller supplies the clock.

use std::time::{Duration, Instant};

/// Rate gate for user-facing success signals.
///
/// `try_allow` either opens the gate (recording the instant) or reports
/// how long the caller must wait. The caller owns any deferred timer;
/// the gate only does the arithmetic.
#[derive(Debug, Clone)]
pub struct NotifyGate {
    window: Duration,
    last: Option<Instant>,
}

impl NotifyGate {
    /// Create a gate with the given cool-down window.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// The configured cool-down window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to pass the gate at `now`.
    ///
    /// Returns `None` when the signal may fire immediately (and records
    /// `now` as the last firing), or `Some(wait)` with the remaining
    /// cool-down when it must be deferred.
    pub fn try_allow(&mut self, now: Instant) -> Option<Duration> {
        match self.last {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= self.window {
                    self.last = Some(now);
                    None
                } else {
                    Some(self.window - elapsed)
                }
            }
            None => {
                self.last = Some(now);
                None
            }
        }
    }
}
