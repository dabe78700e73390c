//! Per-key counting windows.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A per-key counter within one fixed time window.
///
/// Windows are superseded, not accumulated: once `reset_at` passes the next
/// request starts a fresh window. Invariants: `counter >= 1` after creation
/// and `reset_at > window_start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    /// Requests counted so far, including the one that opened the window.
    pub counter: u64,
    /// When the window opened.
    pub window_start: DateTime<Utc>,
    /// When the window expires.
    pub reset_at: DateTime<Utc>,
}

impl RateWindow {
    /// Open a new window whose first request is already counted.
    pub fn start(now: DateTime<Utc>, window_secs: u64) -> Self {
        Self {
            counter: 1,
            window_start: now,
            reset_at: now + Duration::seconds(window_secs as i64),
        }
    }

    /// Whether the window has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }

    /// Count one more request.
    pub fn increment(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }

    /// Seconds until the window resets, clamped to zero.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        (self.reset_at - now).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_counts_first_request() {
        let now = Utc::now();
        let w = RateWindow::start(now, 60);
        assert_eq!(w.counter, 1);
        assert_eq!(w.window_start, now);
        assert!(w.reset_at > w.window_start);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let w = RateWindow::start(now, 60);
        assert!(!w.is_expired(now));
        assert!(!w.is_expired(now + Duration::seconds(59)));
        // Expiry is inclusive at reset_at.
        assert!(w.is_expired(now + Duration::seconds(60)));
    }

    #[test]
    fn test_retry_after_clamps() {
        let now = Utc::now();
        let w = RateWindow::start(now, 60);
        assert_eq!(w.retry_after_secs(now), 60);
        assert_eq!(w.retry_after_secs(now + Duration::seconds(120)), 0);
    }
}
