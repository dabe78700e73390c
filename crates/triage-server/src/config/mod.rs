//! Server configuration.

mod loader;
mod types;
mod validation;

pub use loader::{load_config, ConfigLoader};
pub use types::{
    AuditSettings, AuthSettings, BindSettings, ProfileOverride, RateLimitSettings, ServerConfig,
};
pub use validation::{validate_config, ConfigError};
