//! API error handling.

mod response;
mod types;

pub use types::{ApiError, ApiResult};
