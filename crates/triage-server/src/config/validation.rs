//! Configuration validation.

use super::types::{ProfileOverride, ServerConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JWT secret: must be at least 32 characters")]
    InvalidJwtSecret,

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid audit buffer size: must be greater than zero")]
    InvalidAuditBuffer,

    #[error("Invalid rate limit override for '{0}': zero is not a usable bound")]
    InvalidRateLimit(&'static str),
}

/// Validate server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.len() < 32 {
        errors.push(ConfigError::InvalidJwtSecret);
    }

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    if config.audit.buffer_size == 0 {
        errors.push(ConfigError::InvalidAuditBuffer);
    }

    let overrides: [(&'static str, &Option<ProfileOverride>); 5] = [
        ("auth", &config.rate_limit.auth),
        ("two_factor", &config.rate_limit.two_factor),
        ("export", &config.rate_limit.export),
        ("bulk", &config.rate_limit.bulk),
        ("dashboard", &config.rate_limit.dashboard),
    ];
    for (name, ov) in overrides {
        if let Some(ov) = ov {
            if ov.max_requests == Some(0) || ov.window_secs == Some(0) {
                errors.push(ConfigError::InvalidRateLimit(name));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
