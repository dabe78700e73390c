//! Authorization middleware.

pub mod context;
pub mod layer;

pub use context::{actor_for, request_context};
pub use layer::{CapabilityLayer, RoleLayer};
