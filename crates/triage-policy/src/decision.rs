//! Decision types produced by the evaluator.

use crate::capability::Capability;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use triage_audit_types::{SecurityEventKind, SecuritySeverity};

/// Terminal outcome of an evaluation. There is no undecided state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The operation may proceed.
    Allow,
    /// The operation is refused for an authenticated principal.
    Deny,
    /// No principal was present; capability logic was never evaluated.
    Unauthenticated,
}

/// Why the outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    /// No principal on the request.
    Unauthenticated,
    /// Role alone granted the operation.
    RoleOverride,
    /// A required capability was in the principal's permission set.
    CapabilityMatch,
    /// The principal's role was in the allowed-roles set.
    RoleMatch,
    /// A system capability was required and the role is not system_admin.
    SystemPermissionRequired,
    /// No required capability intersected the permission set.
    PermissionDenied,
    /// The principal's role was not in the allowed-roles set.
    RoleDenied,
}

/// Output of the policy evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Terminal outcome.
    pub outcome: Outcome,
    /// Why.
    pub reason: DecisionReason,
    /// The first required capability satisfied, when one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<Capability>,
}

impl Decision {
    pub(crate) fn allow(reason: DecisionReason, matched: Option<Capability>) -> Self {
        Self {
            outcome: Outcome::Allow,
            reason,
            matched,
        }
    }

    pub(crate) fn deny(reason: DecisionReason) -> Self {
        Self {
            outcome: Outcome::Deny,
            reason,
            matched: None,
        }
    }

    pub(crate) fn unauthenticated() -> Self {
        Self {
            outcome: Outcome::Unauthenticated,
            reason: DecisionReason::Unauthenticated,
            matched: None,
        }
    }

    /// Whether the operation may proceed.
    pub fn is_allowed(&self) -> bool {
        self.outcome == Outcome::Allow
    }
}

/// Description of the security event a denial requires the caller to emit.
///
/// The evaluator stays pure: it computes the event's kind, severity, and
/// forensic metadata, and the caller attaches actor/request context and
/// writes it through the audit sink. Emitting it on every deny path is part
/// of the authorization contract, not an optional extra.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEventSpec {
    /// Event kind.
    pub kind: SecurityEventKind,
    /// Event severity.
    pub severity: SecuritySeverity,
    /// Forensic payload (required list, actual permissions, role).
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A decision plus the audit side effect it mandates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The decision.
    pub decision: Decision,
    /// Event the caller must emit, present on every deny path.
    pub pending_event: Option<SecurityEventSpec>,
}

impl Evaluation {
    pub(crate) fn without_event(decision: Decision) -> Self {
        Self {
            decision,
            pending_event: None,
        }
    }

    pub(crate) fn with_event(decision: Decision, event: SecurityEventSpec) -> Self {
        Self {
            decision,
            pending_event: Some(event),
        }
    }

    /// Whether the operation may proceed.
    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }
}
