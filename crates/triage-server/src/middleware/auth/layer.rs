//! Authentication middleware layer.

use super::jwt::decode_token;
use crate::error::ApiError;
use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

/// Authentication layer configuration.
#[derive(Clone)]
pub struct AuthLayer {
    jwt_secret: Arc<String>,
}

impl AuthLayer {
    /// Create new auth layer.
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret: Arc::new(jwt_secret),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_secret: self.jwt_secret.clone(),
        }
    }
}

/// Authentication middleware service.
///
/// On success the verified [`triage_policy::Principal`] is inserted into
/// request extensions for downstream layers and handlers.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_secret: Arc<String>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_secret = self.jwt_secret.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let token = match extract_token(&req) {
                Ok(token) => token,
                Err(err) => return Ok(err.into_response()),
            };

            let claims = match decode_token(&token, &jwt_secret) {
                Ok(claims) => claims,
                Err(err) => {
                    debug!(error = %err, "Token validation failed");
                    let api_error = match err.kind() {
                        ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                        _ => ApiError::InvalidToken,
                    };
                    return Ok(api_error.into_response());
                }
            };

            match claims.to_principal() {
                Some(principal) => {
                    req.extensions_mut().insert(principal);
                }
                None => return Ok(ApiError::InvalidToken.into_response()),
            }

            inner.call(req).await
        })
    }
}

fn extract_token(req: &Request<Body>) -> Result<String, ApiError> {
    // Try Authorization header first
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| ApiError::InvalidToken)?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.to_string());
        }
    }

    // Try cookie as fallback
    if let Some(cookie_header) = req.headers().get(header::COOKIE) {
        let cookie_str = cookie_header.to_str().map_err(|_| ApiError::InvalidToken)?;

        for cookie in cookie_str.split(';') {
            let cookie = cookie.trim();
            if let Some(token) = cookie.strip_prefix("access_token=") {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::{encode_token, Claims};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;
    use triage_common_core::UserId;
    use triage_policy::{Principal, Role};

    const SECRET: &str = "test_secret_key_32_chars_long!!!";

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(principal): Extension<Principal>| async move {
                    principal.username
                }),
            )
            .layer(AuthLayer::new(SECRET.to_string()))
    }

    fn bearer(principal: &Principal) -> String {
        let claims = Claims::for_principal(principal, 3600);
        format!("Bearer {}", encode_token(&claims, SECRET).unwrap())
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = app()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let principal = Principal::new(UserId::new(), "nurse.kay", Role::from("nurse"));
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", bearer(&principal))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let principal = Principal::new(UserId::new(), "nurse.kay", Role::from("nurse"));
        let mut claims = Claims::for_principal(&principal, 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let header = format!("Bearer {}", encode_token(&claims, SECRET).unwrap());

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", header)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cookie_token_accepted() {
        let principal = Principal::new(UserId::new(), "nurse.kay", Role::from("nurse"));
        let claims = Claims::for_principal(&principal, 3600);
        let cookie = format!("access_token={}", encode_token(&claims, SECRET).unwrap());

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
