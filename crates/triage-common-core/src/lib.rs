//! Triage common core types.

pub mod id;

pub use id::{IdParseError, RequestId, ServiceId, UserId};
