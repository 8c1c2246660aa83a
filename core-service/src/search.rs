//! Search-as-you-type debouncing.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Holds the latest query until it has been quiet for `window`.
///
/// Pure state: the caller supplies the current time, so the debouncer can be
/// driven by any [`Clock`](bridge_traits::Clock) or by a UI timer.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    window: Duration,
    pending: Option<(String, DateTime<Utc>)>,
}

impl SearchDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a keystroke. Replaces any query still waiting.
    pub fn submit(&mut self, query: impl Into<String>, now: DateTime<Utc>) {
        self.pending = Some((query.into(), now));
    }

    /// Returns the pending query once the window has elapsed since the last
    /// submission.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<String> {
        let (_, submitted) = self.pending.as_ref()?;
        let quiet = (now - *submitted).to_std().unwrap_or(Duration::ZERO);
        if quiet < self.window {
            return None;
        }
        self.pending.take().map(|(query, _)| query)
    }

    /// Returns the pending query immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(query, _)| query)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
