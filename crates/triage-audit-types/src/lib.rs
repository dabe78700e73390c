//! Security audit event types for Triage.

mod actor;
mod event;
mod id;
mod kind;
mod severity;

pub use actor::SecurityActor;
pub use event::{RequestContext, SecurityEvent, SecurityEventBuilder};
pub use id::SecurityEventId;
pub use kind::{KindParseError, SecurityEventKind};
pub use severity::SecuritySeverity;
