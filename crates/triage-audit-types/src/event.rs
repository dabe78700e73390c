//! Core security event type.

use crate::{SecurityActor, SecurityEventId, SecurityEventKind, SecuritySeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request-scoped context attached to a security event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Client IP address, as resolved from forwarding headers.
    pub ip: Option<String>,
    /// Client device fingerprint, if the client supplied one.
    pub device_fingerprint: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// Request method.
    pub method: Option<String>,
}

impl RequestContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client IP.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Set the device fingerprint.
    pub fn with_device_fingerprint(mut self, fp: impl Into<String>) -> Self {
        self.device_fingerprint = Some(fp.into());
        self
    }

    /// Set the request path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the request method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// An append-only security audit record.
///
/// Events are never mutated or deleted by the application; retention and
/// rotation are the storage backend's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event identifier.
    pub id: SecurityEventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: SecurityEventKind,
    /// Event severity.
    pub severity: SecuritySeverity,
    /// Who the event is attributed to.
    pub actor: SecurityActor,
    /// Request context the event was raised in.
    #[serde(default)]
    pub context: RequestContext,
    /// Additional forensic data.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SecurityEvent {
    /// Create a new event builder.
    pub fn builder(kind: SecurityEventKind, severity: SecuritySeverity) -> SecurityEventBuilder {
        SecurityEventBuilder::new(kind, severity)
    }
}

/// Builder for constructing security events.
#[derive(Debug)]
pub struct SecurityEventBuilder {
    kind: SecurityEventKind,
    severity: SecuritySeverity,
    actor: Option<SecurityActor>,
    context: RequestContext,
    metadata: HashMap<String, serde_json::Value>,
}

impl SecurityEventBuilder {
    /// Create a new builder.
    pub fn new(kind: SecurityEventKind, severity: SecuritySeverity) -> Self {
        Self {
            kind,
            severity,
            actor: None,
            context: RequestContext::default(),
            metadata: HashMap::new(),
        }
    }

    /// Set the actor.
    pub fn actor(mut self, actor: SecurityActor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the request context.
    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Add metadata.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), json);
        }
        self
    }

    /// Merge a prepared metadata map.
    pub fn metadata_map(mut self, map: HashMap<String, serde_json::Value>) -> Self {
        self.metadata.extend(map);
        self
    }

    /// Build the event.
    pub fn build(self) -> SecurityEvent {
        SecurityEvent {
            id: SecurityEventId::new(),
            timestamp: Utc::now(),
            kind: self.kind,
            severity: self.severity,
            actor: self.actor.unwrap_or(SecurityActor::Anonymous),
            context: self.context,
            metadata: self.metadata,
        }
    }
}
