//! API error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum covering all error cases.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("Bad request: {0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // 403 Forbidden
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("System administrator privileges required")]
    SystemPermissionRequired,

    #[error("Role not permitted for this operation")]
    RoleDenied,

    // 429 Too Many Requests
    #[error("{message}")]
    RateLimited { retry_after: u64, message: String },

    // 500 Internal Server Error
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,

            Self::Unauthorized | Self::TokenExpired | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }

            Self::InsufficientPermissions
            | Self::SystemPermissionRequired
            | Self::RoleDenied => StatusCode::FORBIDDEN,

            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
            _ => ApiError::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InsufficientPermissions.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::SystemPermissionRequired.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::RateLimited {
                retry_after: 60,
                message: "slow down".to_string()
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
