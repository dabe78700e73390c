//! Security audit event capture for Triage.
//!
//! The capture path is deliberately off the request critical path: callers
//! hand events to [`AuditCapture`] with a non-blocking `record`, and a
//! background drain task writes them through an [`AuditSink`]. A sink
//! failure never changes or delays an authorization decision; it is
//! retried once and then surfaced on the operational log channel.

mod capture;
mod recorder;
mod sink;

pub use capture::{spawn_drain, AuditCapture, CaptureConfig};
pub use recorder::SecurityEventRecorder;
pub use sink::{AuditSink, SinkError, TracingSink};
