//! Security event kinds.
//!
//! Event kinds use dotted names on the wire, e.g. `authorization.denied`
//! or `ratelimit.exceeded.auth`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The kind of a security event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecurityEventKind {
    /// A capability check failed against the principal's permission set.
    AuthorizationDenied,
    /// A system capability was requested by a non-system-admin principal.
    SystemPermissionDenied,
    /// A role-gated endpoint rejected the principal's role.
    RoleDenied,
    /// A rate limit was exhausted; `log_type` names the endpoint class.
    RateLimitExceeded {
        /// Endpoint class label, e.g. `auth` or `export`.
        log_type: String,
    },
}

impl SecurityEventKind {
    /// Dotted wire name for this kind.
    pub fn name(&self) -> String {
        match self {
            Self::AuthorizationDenied => "authorization.denied".to_string(),
            Self::SystemPermissionDenied => "authorization.system_permission_denied".to_string(),
            Self::RoleDenied => "authorization.role_denied".to_string(),
            Self::RateLimitExceeded { log_type } => format!("ratelimit.exceeded.{}", log_type),
        }
    }

    /// Parse a dotted wire name.
    pub fn parse(s: &str) -> Result<Self, KindParseError> {
        match s {
            "authorization.denied" => Ok(Self::AuthorizationDenied),
            "authorization.system_permission_denied" => Ok(Self::SystemPermissionDenied),
            "authorization.role_denied" => Ok(Self::RoleDenied),
            _ => {
                if let Some(log_type) = s.strip_prefix("ratelimit.exceeded.") {
                    if log_type.is_empty() {
                        return Err(KindParseError::Unknown(s.to_string()));
                    }
                    return Ok(Self::RateLimitExceeded {
                        log_type: log_type.to_string(),
                    });
                }
                Err(KindParseError::Unknown(s.to_string()))
            }
        }
    }

    /// Whether this kind belongs to the authorization family.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationDenied | Self::SystemPermissionDenied | Self::RoleDenied
        )
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for SecurityEventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for SecurityEventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Error parsing an event kind from its wire name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KindParseError {
    /// The name does not match any known kind.
    #[error("unknown security event kind: {0}")]
    Unknown(String),
}
