//! The policy evaluation procedure.

use crate::capability::Capability;
use crate::decision::{Decision, DecisionReason, Evaluation, SecurityEventSpec};
use crate::principal::{Principal, Role};
use std::collections::HashMap;
use tracing::warn;
use triage_audit_types::{SecurityEventKind, SecuritySeverity};

/// Evaluate a required-capabilities list against a principal.
///
/// The steps run in a fixed order that encodes precedence:
///
/// 1. authentication precondition: no principal means
///    [`Outcome::Unauthenticated`](crate::Outcome::Unauthenticated), nothing
///    else is evaluated;
/// 2. system-capability detection over `required`;
/// 3. system gate: a system requirement without the system_admin role is an
///    unconditional deny, even if the permission set spells out the exact
///    system capability;
/// 4. system_admin role override: unconditional allow;
/// 5. admin role override for non-system requirements;
/// 6. capability-set membership: allow iff `required` intersects the
///    permission set (OR semantics).
///
/// The absence of an explicit rule defaults to deny; a decision is always
/// produced. Deny paths carry a [`SecurityEventSpec`] the caller must emit.
pub fn evaluate(principal: Option<&Principal>, required: &[Capability]) -> Evaluation {
    let Some(principal) = principal else {
        return Evaluation::without_event(Decision::unauthenticated());
    };

    if required.is_empty() {
        // Caller bug: the contract requires a non-empty list. Default-deny.
        warn!(
            user = %principal.user_id,
            "capability evaluation with empty required list"
        );
    }

    let has_system_requirement = required.iter().any(Capability::is_system);

    if has_system_requirement && !principal.role.is_system_admin() {
        let metadata = system_denied_metadata(principal, required);
        return Evaluation::with_event(
            Decision::deny(DecisionReason::SystemPermissionRequired),
            SecurityEventSpec {
                kind: SecurityEventKind::SystemPermissionDenied,
                severity: SecuritySeverity::High,
                metadata,
            },
        );
    }

    if principal.role.is_system_admin() {
        return Evaluation::without_event(Decision::allow(DecisionReason::RoleOverride, None));
    }

    if principal.role.is_admin() {
        // The system gate already rejected system requirements for this role.
        return Evaluation::without_event(Decision::allow(DecisionReason::RoleOverride, None));
    }

    match principal.permissions.first_match(required) {
        Some(matched) => Evaluation::without_event(Decision::allow(
            DecisionReason::CapabilityMatch,
            Some(matched.clone()),
        )),
        None => {
            let metadata = permission_denied_metadata(principal, required);
            Evaluation::with_event(
                Decision::deny(DecisionReason::PermissionDenied),
                SecurityEventSpec {
                    kind: SecurityEventKind::AuthorizationDenied,
                    severity: SecuritySeverity::Medium,
                    metadata,
                },
            )
        }
    }
}

/// Evaluate an allowed-roles set against a principal.
///
/// The system_admin role is always allowed; otherwise the principal's role
/// must be a member of `allowed`.
pub fn evaluate_roles(principal: Option<&Principal>, allowed: &[Role]) -> Evaluation {
    let Some(principal) = principal else {
        return Evaluation::without_event(Decision::unauthenticated());
    };

    if principal.role.is_system_admin() {
        return Evaluation::without_event(Decision::allow(DecisionReason::RoleOverride, None));
    }

    if allowed.contains(&principal.role) {
        return Evaluation::without_event(Decision::allow(DecisionReason::RoleMatch, None));
    }

    let mut metadata = HashMap::new();
    metadata.insert(
        "allowed_roles".to_string(),
        serde_json::json!(allowed.iter().map(Role::as_str).collect::<Vec<_>>()),
    );
    metadata.insert(
        "role".to_string(),
        serde_json::json!(principal.role.as_str()),
    );
    Evaluation::with_event(
        Decision::deny(DecisionReason::RoleDenied),
        SecurityEventSpec {
            kind: SecurityEventKind::RoleDenied,
            severity: SecuritySeverity::Medium,
            metadata,
        },
    )
}

fn required_names(required: &[Capability]) -> Vec<&str> {
    required.iter().map(Capability::as_str).collect()
}

fn system_denied_metadata(
    principal: &Principal,
    required: &[Capability],
) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    metadata.insert(
        "required".to_string(),
        serde_json::json!(required_names(required)),
    );
    metadata.insert(
        "role".to_string(),
        serde_json::json!(principal.role.as_str()),
    );
    metadata
}

fn permission_denied_metadata(
    principal: &Principal,
    required: &[Capability],
) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    metadata.insert(
        "required".to_string(),
        serde_json::json!(required_names(required)),
    );
    metadata.insert(
        "permissions".to_string(),
        serde_json::json!(principal.permissions.sorted_names()),
    );
    metadata.insert(
        "role".to_string(),
        serde_json::json!(principal.role.as_str()),
    );
    metadata
}
