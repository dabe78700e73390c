//! Request pipeline middleware.
//!
//! Per-request order is fixed: authentication resolves a principal, rate
//! limiting counts the request, authorization evaluates the route's
//! capability or role requirements. No stage is reordered or evaluated
//! speculatively.

pub mod auth;
pub mod authz;
pub mod rate_limit;
