//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use triage_rate_limit::RateLimitConfig;

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    pub server: BindSettings,
    /// Authentication configuration.
    pub auth: AuthSettings,
    /// Security audit configuration.
    #[serde(default)]
    pub audit: AuditSettings,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl ServerConfig {
    /// Socket address to bind, or an error if host/port do not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindSettings {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Secret used to verify bearer tokens.
    pub jwt_secret: String,
}

/// Security audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Capture buffer size in events.
    #[serde(default = "default_audit_buffer")]
    pub buffer_size: usize,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            buffer_size: default_audit_buffer(),
        }
    }
}

fn default_audit_buffer() -> usize {
    10_000
}

/// Override for one named rate-limit profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverride {
    /// Replace the profile's request ceiling.
    pub max_requests: Option<u32>,
    /// Replace the profile's window length in seconds.
    pub window_secs: Option<u64>,
}

impl ProfileOverride {
    fn apply(&self, mut base: RateLimitConfig) -> RateLimitConfig {
        if let Some(max) = self.max_requests {
            base.max_requests = max;
        }
        if let Some(window) = self.window_secs {
            base.window_secs = window;
        }
        base
    }
}

/// Rate limiting configuration.
///
/// The named profiles themselves live in `triage-rate-limit`; deployments
/// only tune their numbers here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Master switch; when false no rate-limit layer is installed.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Override for the auth profile.
    #[serde(default)]
    pub auth: Option<ProfileOverride>,
    /// Override for the two-factor profile.
    #[serde(default)]
    pub two_factor: Option<ProfileOverride>,
    /// Override for the export profile.
    #[serde(default)]
    pub export: Option<ProfileOverride>,
    /// Override for the bulk-operations profile.
    #[serde(default)]
    pub bulk: Option<ProfileOverride>,
    /// Override for the dashboard-polling profile.
    #[serde(default)]
    pub dashboard: Option<ProfileOverride>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: None,
            two_factor: None,
            export: None,
            bulk: None,
            dashboard: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl RateLimitSettings {
    /// Auth profile with deployment overrides applied.
    pub fn auth_profile(&self) -> RateLimitConfig {
        apply(RateLimitConfig::auth(), &self.auth)
    }

    /// Two-factor profile with deployment overrides applied.
    pub fn two_factor_profile(&self) -> RateLimitConfig {
        apply(RateLimitConfig::two_factor(), &self.two_factor)
    }

    /// Export profile with deployment overrides applied.
    pub fn export_profile(&self) -> RateLimitConfig {
        apply(RateLimitConfig::export(), &self.export)
    }

    /// Bulk-operations profile with deployment overrides applied.
    pub fn bulk_profile(&self) -> RateLimitConfig {
        apply(RateLimitConfig::bulk(), &self.bulk)
    }

    /// Dashboard-polling profile with deployment overrides applied.
    pub fn dashboard_profile(&self) -> RateLimitConfig {
        apply(RateLimitConfig::dashboard(), &self.dashboard)
    }
}

fn apply(base: RateLimitConfig, overrides: &Option<ProfileOverride>) -> RateLimitConfig {
    match overrides {
        Some(ov) => ov.apply(base),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            server: BindSettings {
                host: "127.0.0.1".to_string(),
                port: 9000,
            },
            auth: AuthSettings {
                jwt_secret: "x".repeat(32),
            },
            audit: AuditSettings::default(),
            rate_limit: RateLimitSettings::default(),
        };
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_profile_override() {
        let settings = RateLimitSettings {
            auth: Some(ProfileOverride {
                max_requests: Some(3),
                window_secs: None,
            }),
            ..Default::default()
        };
        let profile = settings.auth_profile();
        assert_eq!(profile.max_requests, 3);
        // Window and labels keep the profile's defaults.
        assert_eq!(profile.window_secs, 900);
        assert_eq!(profile.log_type, "auth");
    }
}
