//! Authentication types.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use triage_common_core::{ServiceId, UserId};
use triage_policy::{Capability, CapabilitySet, Principal, Role};
use uuid::Uuid;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Display name for audit trails.
    pub username: String,
    /// Role name.
    pub role: String,
    /// Granted capability names.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Service the principal is scoped to, if any.
    #[serde(default)]
    pub service_scope: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// JWT ID (for revocation).
    pub jti: String,
}

impl Claims {
    /// Create new claims for a principal, expiring after `expires_in` seconds.
    pub fn for_principal(principal: &Principal, expires_in: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: principal.user_id.to_string(),
            username: principal.username.clone(),
            role: principal.role.as_str().to_string(),
            permissions: principal.permissions.sorted_names(),
            service_scope: principal.service_scope.as_ref().map(|s| s.to_string()),
            iat: now,
            exp: now + expires_in,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Build the request principal from verified claims.
    ///
    /// Returns `None` when the subject or service scope does not parse;
    /// such tokens are treated as invalid rather than anonymous.
    pub fn to_principal(&self) -> Option<Principal> {
        let user_id: UserId = self.sub.parse().ok()?;
        let permissions: CapabilitySet = self
            .permissions
            .iter()
            .map(|name| Capability::new(name))
            .collect();

        let mut principal = Principal::new(user_id, &self.username, Role::from(self.role.as_str()))
            .with_permissions(permissions);

        if let Some(scope) = &self.service_scope {
            let service_id: ServiceId = scope.parse().ok()?;
            principal = principal.with_service_scope(service_id);
        }

        Some(principal)
    }
}
