//! Authorization decision engine for Triage.
//!
//! Every protected endpoint funnels through the same evaluation procedure:
//! authentication precondition, system-capability gate, role overrides, then
//! capability-set membership, strictly in that order. Evaluation is pure:
//! it returns a [`Decision`] plus an optional [`SecurityEventSpec`]
//! describing the audit event the caller must emit, rather than writing the
//! event itself.

mod capability;
mod decision;
mod evaluator;
mod principal;

pub use capability::{catalog, Capability, CapabilitySet, SYSTEM_NAMESPACE};
pub use decision::{Decision, DecisionReason, Evaluation, Outcome, SecurityEventSpec};
pub use evaluator::{evaluate, evaluate_roles};
pub use principal::{Principal, Role};
