//! Authentication middleware.

pub mod jwt;
pub mod layer;
pub mod types;

pub use jwt::{decode_token, encode_token};
pub use layer::{AuthLayer, AuthMiddleware};
pub use types::Claims;
