//! Audit sink trait and the default tracing-backed sink.

use async_trait::async_trait;
use thiserror::Error;
use triage_audit_types::{SecurityEvent, SecuritySeverity};

/// Error writing to an audit sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink is no longer accepting events.
    #[error("audit sink closed")]
    Closed,
    /// The sink's backing store rejected or failed the write.
    #[error("audit sink write failed: {0}")]
    Backend(String),
}

/// Append-only destination for security events.
///
/// Implementations must treat events as immutable once accepted. The write
/// contract is `record(event) -> ack`; retention, rotation, and integrity
/// chaining live behind the sink.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one event.
    async fn record(&self, event: SecurityEvent) -> Result<(), SinkError>;
}

/// Sink that emits events as structured tracing records.
///
/// Default sink for deployments where the log pipeline is the audit store.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingSink {
    async fn record(&self, event: SecurityEvent) -> Result<(), SinkError> {
        let payload = serde_json::to_string(&event)
            .map_err(|e| SinkError::Backend(e.to_string()))?;

        match event.severity {
            SecuritySeverity::Low => tracing::info!(
                target: "triage::audit",
                kind = %event.kind,
                actor = %event.actor.identifier(),
                %payload,
                "security event"
            ),
            SecuritySeverity::Medium => tracing::warn!(
                target: "triage::audit",
                kind = %event.kind,
                actor = %event.actor.identifier(),
                %payload,
                "security event"
            ),
            SecuritySeverity::High | SecuritySeverity::Critical => tracing::error!(
                target: "triage::audit",
                kind = %event.kind,
                actor = %event.actor.identifier(),
                %payload,
                "security event"
            ),
        }

        Ok(())
    }
}
