//! Convenience recorder for the security event shapes the pipeline emits.

use crate::capture::AuditCapture;
use std::collections::HashMap;
use triage_audit_types::{
    RequestContext, SecurityActor, SecurityEvent, SecurityEventKind, SecuritySeverity,
};

/// Security event recorder.
///
/// Thin, cloneable wrapper over [`AuditCapture`] that attaches actor and
/// request context to the event payloads produced elsewhere (the policy
/// evaluator describes its own events; the rate limiter's shape is fixed
/// here).
#[derive(Clone)]
pub struct SecurityEventRecorder {
    capture: AuditCapture,
}

impl SecurityEventRecorder {
    /// Create a new recorder.
    pub fn new(capture: AuditCapture) -> Self {
        Self { capture }
    }

    /// Record a fully-described event.
    ///
    /// Used for authorization denials, where the evaluator already decided
    /// kind, severity, and forensic metadata.
    pub fn record_event(
        &self,
        kind: SecurityEventKind,
        severity: SecuritySeverity,
        actor: SecurityActor,
        context: RequestContext,
        metadata: HashMap<String, serde_json::Value>,
    ) {
        let event = SecurityEvent::builder(kind, severity)
            .actor(actor)
            .context(context)
            .metadata_map(metadata)
            .build();
        self.capture.record(event);
    }

    /// Record a rate-limit rejection.
    #[allow(clippy::too_many_arguments)]
    pub fn rate_limit_exceeded(
        &self,
        log_type: &str,
        key: &str,
        counter: u64,
        limit: u32,
        window_secs: u64,
        actor: SecurityActor,
        context: RequestContext,
    ) {
        let event = SecurityEvent::builder(
            SecurityEventKind::RateLimitExceeded {
                log_type: log_type.to_string(),
            },
            SecuritySeverity::Medium,
        )
        .actor(actor)
        .context(context)
        .metadata("key", key)
        .metadata("counter", counter)
        .metadata("limit", limit)
        .metadata("window_secs", window_secs)
        .build();
        self.capture.record(event);
    }

    /// Whether the underlying capture channel is still accepting events.
    pub fn is_healthy(&self) -> bool {
        self.capture.is_healthy()
    }
}
