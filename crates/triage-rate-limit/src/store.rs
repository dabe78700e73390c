//! Counter store trait and the in-memory backend.

use crate::{config::RateLimitConfig, window::RateWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

/// Result of one rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Configured maximum for the window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Counter value after this request.
    pub counter: u64,
    /// When the current window resets.
    pub reset_at: DateTime<Utc>,
    /// Seconds until retry is worthwhile; present only on rejection.
    pub retry_after_secs: Option<u64>,
}

/// Error talking to the counter store's backing infrastructure.
///
/// Distinct from a policy rejection: callers must fail open on this.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is unreachable or failed the operation.
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for per-key rate windows.
///
/// `check_and_consume` must be atomic per key: compare `reset_at`, then
/// reset or increment, without a read-modify-write gap that would
/// under-count concurrent requests on the same key.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Count one request against `key` and decide whether it may proceed.
    async fn check_and_consume(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> Result<RateDecision, StoreError>;

    /// Current window for a key, if one exists.
    async fn window(&self, key: &str) -> Result<Option<RateWindow>, StoreError>;
}

/// In-memory counter store.
///
/// The dashmap entry guard holds the shard lock for the whole
/// reset-or-increment sequence, which gives the per-key atomicity the trait
/// requires.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    windows: DashMap<String, RateWindow>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired windows. Callers may run this periodically; correctness
    /// does not depend on it because expired windows are superseded on the
    /// next request.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.windows.retain(|_, w| !w.is_expired(now));
    }
}

#[async_trait]
impl CounterStore for InMemoryStore {
    async fn check_and_consume(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> Result<RateDecision, StoreError> {
        let decision = match self.windows.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                let window = RateWindow::start(now, config.window_secs);
                let decision = decide(&window, config, now);
                slot.insert(window);
                decision
            }
            Entry::Occupied(mut slot) => {
                let window = slot.get_mut();
                if window.is_expired(now) {
                    *window = RateWindow::start(now, config.window_secs);
                } else {
                    window.increment();
                }
                decide(window, config, now)
            }
        };
        Ok(decision)
    }

    async fn window(&self, key: &str) -> Result<Option<RateWindow>, StoreError> {
        Ok(self.windows.get(key).map(|entry| entry.value().clone()))
    }
}

fn decide(window: &RateWindow, config: &RateLimitConfig, now: DateTime<Utc>) -> RateDecision {
    let allowed = window.counter <= u64::from(config.max_requests);
    let remaining = u64::from(config.max_requests).saturating_sub(window.counter) as u32;
    RateDecision {
        allowed,
        limit: config.max_requests,
        remaining,
        counter: window.counter,
        reset_at: window.reset_at,
        retry_after_secs: if allowed {
            None
        } else {
            Some(window.retry_after_secs(now))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn config(max: u32, window_secs: u64) -> RateLimitConfig {
        RateLimitConfig::new(max, window_secs)
    }

    #[tokio::test]
    async fn test_first_request_opens_window() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let decision = store
            .check_and_consume("ip:1.2.3.4", &config(5, 60), now)
            .await
            .unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.counter, 1);
        assert_eq!(decision.remaining, 4);

        let window = store.window("ip:1.2.3.4").await.unwrap().unwrap();
        assert_eq!(window.counter, 1);
        assert_eq!(window.window_start, now);
    }

    #[tokio::test]
    async fn test_limit_boundary_is_exact() {
        // Six calls against max_requests=5; the sixth is the first denial.
        let store = InMemoryStore::new();
        let cfg = config(5, 60);
        let now = Utc::now();

        let mut remaining_seen = Vec::new();
        for _ in 0..5 {
            let d = store.check_and_consume("ip:1.2.3.4", &cfg, now).await.unwrap();
            assert!(d.allowed);
            remaining_seen.push(d.remaining);
        }
        assert_eq!(remaining_seen, vec![4, 3, 2, 1, 0]);

        let sixth = store.check_and_consume("ip:1.2.3.4", &cfg, now).await.unwrap();
        assert!(!sixth.allowed);
        assert_eq!(sixth.remaining, 0);
        assert_eq!(sixth.counter, 6);
        assert_eq!(sixth.retry_after_secs, Some(60));
    }

    #[tokio::test]
    async fn test_window_reset_supersedes() {
        let store = InMemoryStore::new();
        let cfg = config(2, 60);
        let now = Utc::now();

        for _ in 0..3 {
            store.check_and_consume("user:u1", &cfg, now).await.unwrap();
        }
        let later = now + Duration::seconds(61);
        let decision = store.check_and_consume("user:u1", &cfg, later).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.counter, 1);
        assert_eq!(decision.remaining, 1);

        let window = store.window("user:u1").await.unwrap().unwrap();
        assert_eq!(window.window_start, later);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = InMemoryStore::new();
        let cfg = config(1, 60);
        let now = Utc::now();

        assert!(store.check_and_consume("ip:a", &cfg, now).await.unwrap().allowed);
        assert!(!store.check_and_consume("ip:a", &cfg, now).await.unwrap().allowed);
        assert!(store.check_and_consume("ip:b", &cfg, now).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryStore::new();
        let cfg = config(5, 60);
        let now = Utc::now();
        store.check_and_consume("ip:a", &cfg, now).await.unwrap();
        store.purge_expired(now + Duration::seconds(120));
        assert!(store.window("ip:a").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_increments_do_not_undercount() {
        let store = Arc::new(InMemoryStore::new());
        let cfg = Arc::new(config(50, 60));
        let now = Utc::now();

        let mut handles = Vec::new();
        for _ in 0..200 {
            let store = store.clone();
            let cfg = cfg.clone();
            handles.push(tokio::spawn(async move {
                store
                    .check_and_consume("ip:shared", &cfg, now)
                    .await
                    .unwrap()
                    .allowed
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }
        // Exactly max_requests get through; a racy read-then-write would
        // let more pass.
        assert_eq!(allowed, 50);

        let window = store.window("ip:shared").await.unwrap().unwrap();
        assert_eq!(window.counter, 200);
    }
}
