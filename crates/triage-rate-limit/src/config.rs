//! Rate limit configuration and named endpoint-class profiles.

use serde::{Deserialize, Serialize};

/// Strategy for extracting the logical rate-limit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Limit by client IP address.
    Ip,
    /// Limit by authenticated user.
    User,
    /// Limit by service scope.
    Service,
}

impl KeyStrategy {
    /// Key prefix used when composing the stored key.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::User => "user",
            Self::Service => "service",
        }
    }
}

/// Rate limit configuration for one endpoint class.
///
/// Profiles are configuration data, not separate algorithms: the evaluator
/// is the same procedure for every class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests allowed per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
    /// Key extraction strategy.
    pub key_strategy: KeyStrategy,
    /// Label used in `ratelimit.exceeded.<log_type>` events.
    pub log_type: String,
    /// Message returned to the client on rejection.
    pub error_message: String,
}

impl RateLimitConfig {
    /// Create a config with the given bounds, keyed by IP.
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_strategy: KeyStrategy::Ip,
            log_type: "default".to_string(),
            error_message: "Too many requests, please try again later".to_string(),
        }
    }

    /// Key by authenticated user instead of IP.
    pub fn by_user(mut self) -> Self {
        self.key_strategy = KeyStrategy::User;
        self
    }

    /// Key by service scope.
    pub fn by_service(mut self) -> Self {
        self.key_strategy = KeyStrategy::Service;
        self
    }

    /// Set the event log type.
    pub fn with_log_type(mut self, log_type: impl Into<String>) -> Self {
        self.log_type = log_type.into();
        self
    }

    /// Set the client-facing rejection message.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Login and credential endpoints: 10 requests per 15 minutes per IP.
    pub fn auth() -> Self {
        Self::new(10, 15 * 60)
            .with_log_type("auth")
            .with_error_message("Too many authentication attempts, please try again later")
    }

    /// Two-factor verification: 5 requests per 5 minutes per user.
    pub fn two_factor() -> Self {
        Self::new(5, 5 * 60)
            .by_user()
            .with_log_type("2fa")
            .with_error_message("Too many verification attempts, please try again later")
    }

    /// Document/data export: 10 requests per hour per user.
    pub fn export() -> Self {
        Self::new(10, 60 * 60)
            .by_user()
            .with_log_type("export")
            .with_error_message("Export limit reached, please try again later")
    }

    /// Bulk operations: 20 requests per hour per user.
    pub fn bulk() -> Self {
        Self::new(20, 60 * 60)
            .by_user()
            .with_log_type("bulk")
            .with_error_message("Bulk operation limit reached, please try again later")
    }

    /// Dashboard polling: 120 requests per minute per user.
    pub fn dashboard() -> Self {
        Self::new(120, 60)
            .by_user()
            .with_log_type("dashboard")
            .with_error_message("Polling too frequently, please slow down")
    }
}
