//! Per-key fixed-window rate limiting for Triage.
//!
//! One procedure, many configurations: every endpoint class (auth, 2FA,
//! export, bulk, dashboard polling) runs the same check-and-consume against
//! a [`CounterStore`] with its own [`RateLimitConfig`]. Storage failure is
//! never a denial: callers fail open on [`StoreError`].

mod config;
mod store;
mod window;

pub use config::{KeyStrategy, RateLimitConfig};
pub use store::{CounterStore, InMemoryStore, RateDecision, StoreError};
pub use window::RateWindow;
