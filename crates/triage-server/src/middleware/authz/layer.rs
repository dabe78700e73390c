//! Authorization middleware layers.
//!
//! Two guards share one shape: [`CapabilityLayer`] gates a route class on
//! required capabilities, [`RoleLayer`] on an allowed-roles set. Both read
//! the principal placed in request extensions by the auth layer, run the
//! policy evaluator, and emit the evaluator's pending security event before
//! rejecting.

use crate::error::ApiError;
use crate::middleware::authz::context::{actor_for, request_context};
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use triage_audit_capture::SecurityEventRecorder;
use triage_policy::{
    evaluate, evaluate_roles, Capability, DecisionReason, Evaluation, Outcome, Principal, Role,
};

/// Capability requirement layer.
#[derive(Clone)]
pub struct CapabilityLayer {
    required: Arc<Vec<Capability>>,
    recorder: SecurityEventRecorder,
}

impl CapabilityLayer {
    /// Require any one of `required`.
    pub fn new<I, C>(required: I, recorder: SecurityEventRecorder) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Capability>,
    {
        Self {
            required: Arc::new(required.into_iter().map(Into::into).collect()),
            recorder,
        }
    }
}

impl<S> Layer<S> for CapabilityLayer {
    type Service = AuthzMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthzMiddleware {
            inner,
            requirement: Requirement::Capabilities(self.required.clone()),
            recorder: self.recorder.clone(),
        }
    }
}

/// Allowed-roles layer.
#[derive(Clone)]
pub struct RoleLayer {
    allowed: Arc<Vec<Role>>,
    recorder: SecurityEventRecorder,
}

impl RoleLayer {
    /// Require the principal's role to be one of `allowed`.
    pub fn new<I>(allowed: I, recorder: SecurityEventRecorder) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self {
            allowed: Arc::new(allowed.into_iter().collect()),
            recorder,
        }
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = AuthzMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthzMiddleware {
            inner,
            requirement: Requirement::Roles(self.allowed.clone()),
            recorder: self.recorder.clone(),
        }
    }
}

#[derive(Clone)]
enum Requirement {
    Capabilities(Arc<Vec<Capability>>),
    Roles(Arc<Vec<Role>>),
}

impl Requirement {
    fn evaluate(&self, principal: Option<&Principal>) -> Evaluation {
        match self {
            Self::Capabilities(required) => evaluate(principal, required),
            Self::Roles(allowed) => evaluate_roles(principal, allowed),
        }
    }
}

/// Authorization middleware service.
#[derive(Clone)]
pub struct AuthzMiddleware<S> {
    inner: S,
    requirement: Requirement,
    recorder: SecurityEventRecorder,
}

impl<S> Service<Request<Body>> for AuthzMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let requirement = self.requirement.clone();
        let recorder = self.recorder.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let principal = req.extensions().get::<Principal>().cloned();
            let evaluation = requirement.evaluate(principal.as_ref());

            // The pending event is emitted before rejection regardless of
            // which deny reason produced it.
            if let Some(spec) = evaluation.pending_event {
                recorder.record_event(
                    spec.kind,
                    spec.severity,
                    actor_for(principal.as_ref()),
                    request_context(&req),
                    spec.metadata,
                );
            }

            match evaluation.decision.outcome {
                Outcome::Allow => inner.call(req).await,
                Outcome::Unauthenticated => Ok(ApiError::Unauthorized.into_response()),
                Outcome::Deny => {
                    let api_error = match evaluation.decision.reason {
                        DecisionReason::SystemPermissionRequired => {
                            ApiError::SystemPermissionRequired
                        }
                        DecisionReason::RoleDenied => ApiError::RoleDenied,
                        _ => ApiError::InsufficientPermissions,
                    };
                    Ok(api_error.into_response())
                }
            }
        })
    }
}
