//! Authenticated principals and roles.

use crate::capability::{Capability, CapabilitySet};
use serde::{Deserialize, Serialize};
use std::fmt;
use triage_common_core::{ServiceId, UserId};

/// A principal's role tag.
///
/// Exactly one role per principal at evaluation time; `system_admin` and
/// `admin` are distinguished variants, anything else is a custom role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Highest-privilege role; the only role that may hold system capabilities.
    SystemAdmin,
    /// Blanket access to everything except system capabilities.
    Admin,
    /// Any other role tag; grants nothing by itself.
    Custom(String),
}

impl Role {
    /// Role tag as used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::Admin => "admin",
            Self::Custom(name) => name,
        }
    }

    /// Whether this is the system administrator role.
    pub fn is_system_admin(&self) -> bool {
        matches!(self, Self::SystemAdmin)
    }

    /// Whether this is the administrator role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "system_admin" => Self::SystemAdmin,
            "admin" => Self::Admin,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated actor for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque unique identifier.
    pub user_id: UserId,
    /// Display/login identifier.
    pub username: String,
    /// The principal's single role tag.
    pub role: Role,
    /// Capabilities assigned independent of role.
    #[serde(default)]
    pub permissions: CapabilitySet,
    /// Restricts visibility to one organizational unit; `None` is unscoped.
    #[serde(default)]
    pub service_scope: Option<ServiceId>,
}

impl Principal {
    /// Create a principal with no permissions and no service scope.
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            permissions: CapabilitySet::new(),
            service_scope: None,
        }
    }

    /// Add a permission.
    pub fn with_permission(mut self, capability: impl Into<Capability>) -> Self {
        self.permissions.insert(capability.into());
        self
    }

    /// Replace the permission set wholesale.
    pub fn with_permissions(mut self, permissions: CapabilitySet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Restrict visibility to one service.
    pub fn with_service_scope(mut self, service: ServiceId) -> Self {
        self.service_scope = Some(service);
        self
    }

    /// Whether this principal may see data belonging to `service`.
    ///
    /// Admin-tier roles and unscoped principals see all services.
    pub fn can_access_service(&self, service: ServiceId) -> bool {
        if self.role.is_system_admin() || self.role.is_admin() {
            return true;
        }
        match self.service_scope {
            None => true,
            Some(scope) => scope == service,
        }
    }
}
