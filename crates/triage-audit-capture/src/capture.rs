//! Audit event capture mechanism.

use crate::sink::AuditSink;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use triage_audit_types::SecurityEvent;

/// Configuration for audit capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum events to buffer before new events are dropped.
    pub buffer_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { buffer_size: 10_000 }
    }
}

/// Handle for submitting security events.
///
/// `record` never blocks and never fails the caller: the decision that
/// triggered an event has already been made, and availability of the
/// protected operation must not depend on audit-log availability.
#[derive(Clone)]
pub struct AuditCapture {
    sender: mpsc::Sender<SecurityEvent>,
}

impl AuditCapture {
    /// Create a new capture handle and its drain receiver.
    pub fn new(config: CaptureConfig) -> (Self, mpsc::Receiver<SecurityEvent>) {
        let (sender, receiver) = mpsc::channel(config.buffer_size);
        (Self { sender }, receiver)
    }

    /// Record a security event (non-blocking).
    pub fn record(&self, event: SecurityEvent) {
        match self.sender.try_send(event) {
            Ok(()) => debug!(target: "triage::audit", "security event captured"),
            Err(mpsc::error::TrySendError::Full(event)) => {
                // Losing audit events is unacceptable in steady state; a full
                // buffer means the drain is stalled, which is an operational
                // fault, not a policy outcome.
                error!(
                    target: "triage::audit",
                    kind = %event.kind,
                    "audit buffer full, security event dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                error!(
                    target: "triage::audit",
                    kind = %event.kind,
                    "audit channel closed, security event dropped"
                );
            }
        }
    }

    /// Record a security event, waiting for buffer space.
    ///
    /// Only for callers off the request path; middleware uses `record`.
    pub async fn record_async(&self, event: SecurityEvent) {
        if let Err(e) = self.sender.send(event).await {
            error!(target: "triage::audit", "failed to send security event: {}", e);
        }
    }

    /// Check if the capture channel is healthy.
    pub fn is_healthy(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Get approximate buffer usage in [0, 1].
    pub fn buffer_usage(&self) -> f64 {
        let capacity = self.sender.capacity();
        let max_capacity = self.sender.max_capacity();
        1.0 - (capacity as f64 / max_capacity as f64)
    }
}

/// Spawn the background task that drains captured events into a sink.
///
/// A failed write is retried once; a second failure is logged at error
/// level for the alerting pipeline and the event is dropped. The task ends
/// when every capture handle has been dropped.
pub fn spawn_drain(
    mut receiver: mpsc::Receiver<SecurityEvent>,
    sink: Arc<dyn AuditSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            if let Err(first) = sink.record(event.clone()).await {
                warn!(
                    target: "triage::audit",
                    kind = %event.kind,
                    error = %first,
                    "audit write failed, retrying"
                );
                if let Err(second) = sink.record(event.clone()).await {
                    error!(
                        target: "triage::audit",
                        kind = %event.kind,
                        error = %second,
                        "audit write failed after retry, event lost"
                    );
                }
            }
        }
        debug!(target: "triage::audit", "audit drain stopped");
    })
}
