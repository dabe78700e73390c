//! Rate limiting middleware.

pub mod layer;

pub use layer::{RateLimitLayer, RateLimitMiddleware};
