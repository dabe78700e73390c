//! Shared application state.

use crate::config::ServerConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;
use triage_audit_capture::{
    spawn_drain, AuditCapture, AuditSink, CaptureConfig, SecurityEventRecorder, TracingSink,
};
use triage_rate_limit::{CounterStore, InMemoryStore};

/// Shared application state.
///
/// Cheap to clone; everything request handlers and middleware need hangs
/// off this.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Audit capture handle, for health reporting.
    pub capture: AuditCapture,
    /// Security event recorder used by the middleware layers.
    pub recorder: SecurityEventRecorder,
    /// Counter store backing every rate-limit profile.
    pub rate_limit_store: Arc<dyn CounterStore>,
}

impl AppState {
    /// Build state and start the audit drain task.
    ///
    /// The returned handle finishes once every capture handle is dropped;
    /// the caller keeps it so shutdown can wait for the drain to flush.
    pub fn new(config: ServerConfig) -> (Self, JoinHandle<()>) {
        let (capture, receiver) = AuditCapture::new(CaptureConfig {
            buffer_size: config.audit.buffer_size,
        });
        let sink: Arc<dyn AuditSink> = Arc::new(TracingSink::new());
        let drain = spawn_drain(receiver, sink);

        let recorder = SecurityEventRecorder::new(capture.clone());

        let state = Self {
            config: Arc::new(config),
            capture,
            recorder,
            rate_limit_store: Arc::new(InMemoryStore::new()),
        };
        (state, drain)
    }
}
