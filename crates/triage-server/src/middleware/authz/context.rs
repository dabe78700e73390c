//! Request context extraction for audit events.

use axum::{body::Body, http::Request};
use triage_audit_types::{RequestContext, SecurityActor};
use triage_policy::Principal;

/// Build the audit [`RequestContext`] for a request.
///
/// The client IP comes from `x-forwarded-for` (first entry) with
/// `x-real-ip` as fallback; the server itself sits behind a reverse proxy
/// and never sees the peer address directly.
pub fn request_context(req: &Request<Body>) -> RequestContext {
    let mut context = RequestContext::new()
        .with_path(req.uri().path())
        .with_method(req.method().as_str());

    if let Some(ip) = client_ip(req) {
        context = context.with_ip(ip);
    }

    if let Some(fp) = header_str(req, "x-device-fingerprint") {
        context = context.with_device_fingerprint(fp);
    }

    context
}

/// Audit actor for the request's principal, or anonymous.
pub fn actor_for(principal: Option<&Principal>) -> SecurityActor {
    match principal {
        Some(p) => SecurityActor::named_user(p.user_id, &p.username),
        None => SecurityActor::Anonymous,
    }
}

fn client_ip(req: &Request<Body>) -> Option<String> {
    if let Some(forwarded) = header_str(req, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }

    header_str(req, "x-real-ip").map(|s| s.trim().to_string())
}

fn header_str<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
