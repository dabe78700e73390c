//! Error response implementation.

use super::types::ApiError;
use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Stable error body: `{"success": false, "message": ...}`.
///
/// No stack traces and no internal identifiers ever cross this boundary.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "server error occurred");
        } else if matches!(
            self,
            ApiError::Unauthorized
                | ApiError::InsufficientPermissions
                | ApiError::SystemPermissionRequired
                | ApiError::RoleDenied
        ) {
            warn!(error = %self, "request rejected");
        }

        let status = self.status_code();

        let (message, retry_after) = match &self {
            ApiError::RateLimited {
                retry_after,
                message,
            } => (message.clone(), Some(*retry_after)),
            ApiError::Internal(_) => {
                // Never expose internal error details.
                ("An internal error occurred".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            success: false,
            message,
            retry_after,
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited { retry_after, .. } = self {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
