//! Rate limiting middleware layer.
//!
//! Sits between authentication and authorization: the principal is already
//! resolved (so user-keyed profiles work), but capability checks have not
//! run yet. A store failure is logged and the request proceeds; the
//! limiter protects capacity, it is not an availability gate.

use crate::error::ApiError;
use crate::middleware::authz::context::{actor_for, request_context};
use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::error;
use triage_audit_capture::SecurityEventRecorder;
use triage_policy::Principal;
use triage_rate_limit::{CounterStore, KeyStrategy, RateDecision, RateLimitConfig};

/// Rate limiting layer for one endpoint class.
#[derive(Clone)]
pub struct RateLimitLayer {
    store: Arc<dyn CounterStore>,
    config: Arc<RateLimitConfig>,
    recorder: SecurityEventRecorder,
}

impl RateLimitLayer {
    /// Create a layer running `config` against `store`.
    pub fn new(
        store: Arc<dyn CounterStore>,
        config: RateLimitConfig,
        recorder: SecurityEventRecorder,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            recorder,
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            store: self.store.clone(),
            config: self.config.clone(),
            recorder: self.recorder.clone(),
        }
    }
}

/// Rate limiting middleware service.
#[derive(Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    store: Arc<dyn CounterStore>,
    config: Arc<RateLimitConfig>,
    recorder: SecurityEventRecorder,
}

impl<S> Service<Request<Body>> for RateLimitMiddleware<S>
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
        let store = self.store.clone();
        let config = self.config.clone();
        let recorder = self.recorder.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let principal = req.extensions().get::<Principal>().cloned();
            let key = limiter_key(&config.key_strategy, principal.as_ref(), &req);

            let decision = match store.check_and_consume(&key, &config, Utc::now()).await {
                Ok(decision) => decision,
                Err(err) => {
                    // Fail open: a broken counter store must not take the
                    // API down with it.
                    error!(error = %err, key = %key, "Rate limit store unavailable");
                    return inner.call(req).await;
                }
            };

            if !decision.allowed {
                recorder.rate_limit_exceeded(
                    &config.log_type,
                    &key,
                    decision.counter,
                    decision.limit,
                    config.window_secs,
                    actor_for(principal.as_ref()),
                    request_context(&req),
                );

                let retry_after = decision.retry_after_secs.unwrap_or(config.window_secs);
                let mut response = ApiError::RateLimited {
                    retry_after,
                    message: config.error_message.clone(),
                }
                .into_response();
                apply_headers(&mut response, &decision);
                return Ok(response);
            }

            let mut response = inner.call(req).await?;
            apply_headers(&mut response, &decision);
            Ok(response)
        })
    }
}

/// Counter key for a request.
///
/// User- and service-keyed profiles fall back to the IP key when the
/// request carries no principal, so unauthenticated traffic on those
/// routes is still counted.
fn limiter_key(
    strategy: &KeyStrategy,
    principal: Option<&Principal>,
    req: &Request<Body>,
) -> String {
    let ip = || {
        let context = request_context(req);
        format!("ip:{}", context.ip.unwrap_or_else(|| "unknown".to_string()))
    };

    match strategy {
        KeyStrategy::Ip => ip(),
        KeyStrategy::User => match principal {
            Some(p) => format!("user:{}", p.user_id),
            None => ip(),
        },
        KeyStrategy::Service => match principal.and_then(|p| p.service_scope) {
            Some(service) => format!("service:{service}"),
            None => ip(),
        },
    }
}

fn apply_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_at.timestamp().to_string()) {
        headers.insert("x-ratelimit-reset", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;
    use triage_audit_capture::{AuditCapture, CaptureConfig};
    use triage_audit_types::SecurityEvent;
    use triage_common_core::UserId;
    use triage_rate_limit::{InMemoryStore, StoreError};
    use triage_policy::Role;

    fn recorder() -> (SecurityEventRecorder, tokio::sync::mpsc::Receiver<SecurityEvent>) {
        let (capture, receiver) = AuditCapture::new(CaptureConfig::default());
        (SecurityEventRecorder::new(capture), receiver)
    }

    fn app(config: RateLimitConfig, recorder: SecurityEventRecorder) -> Router {
        let store: Arc<dyn CounterStore> = Arc::new(InMemoryStore::new());
        Router::new()
            .route("/login", get(|| async { "ok" }))
            .layer(RateLimitLayer::new(store, config, recorder))
    }

    fn request(ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/login")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_allows_under_limit_with_headers() {
        let (recorder, _events) = recorder();
        let app = app(RateLimitConfig::new(5, 60), recorder);

        let response = app.oneshot(request("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
        assert!(response.headers().contains_key("x-ratelimit-reset"));
    }

    #[tokio::test]
    async fn test_rejects_over_limit_and_records_event() {
        let (recorder, mut events) = recorder();
        let app = app(
            RateLimitConfig::new(2, 60).with_log_type("auth"),
            recorder,
        );

        for _ in 0..2 {
            let response = app.clone().oneshot(request("1.2.3.4")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(request("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert!(response.headers().contains_key("retry-after"));

        let event = events.recv().await.unwrap();
        assert_eq!(event.kind.name(), "ratelimit.exceeded.auth");
        assert_eq!(event.metadata["limit"], serde_json::json!(2));
    }

    #[tokio::test]
    async fn test_keys_isolate_clients() {
        let (recorder, _events) = recorder();
        let app = app(RateLimitConfig::new(1, 60), recorder);

        let first = app.clone().oneshot(request("1.1.1.1")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let other_client = app.clone().oneshot(request("2.2.2.2")).await.unwrap();
        assert_eq!(other_client.status(), StatusCode::OK);

        let repeat = app.clone().oneshot(request("1.1.1.1")).await.unwrap();
        assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_user_strategy_uses_principal() {
        let (recorder, _events) = recorder();
        let store: Arc<dyn CounterStore> = Arc::new(InMemoryStore::new());
        let app = Router::new()
            .route("/export", get(|| async { "ok" }))
            .layer(RateLimitLayer::new(
                store.clone(),
                RateLimitConfig::new(1, 60).by_user(),
                recorder,
            ));

        let user = UserId::new();
        let send = |app: Router| async move {
            let mut req = Request::builder()
                .uri("/export")
                .body(Body::empty())
                .unwrap();
            req.extensions_mut()
                .insert(Principal::new(user, "kay", Role::from("nurse")));
            app.oneshot(req).await.unwrap()
        };

        assert_eq!(send(app.clone()).await.status(), StatusCode::OK);
        assert_eq!(
            send(app.clone()).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert!(store
            .window(&format!("user:{user}"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_fails_open_on_store_error() {
        struct BrokenStore;

        #[async_trait::async_trait]
        impl CounterStore for BrokenStore {
            async fn check_and_consume(
                &self,
                _key: &str,
                _config: &RateLimitConfig,
                _now: chrono::DateTime<Utc>,
            ) -> Result<RateDecision, StoreError> {
                Err(StoreError::Unavailable("down".to_string()))
            }

            async fn window(
                &self,
                _key: &str,
            ) -> Result<Option<triage_rate_limit::RateWindow>, StoreError> {
                Err(StoreError::Unavailable("down".to_string()))
            }
        }

        let (recorder, _events) = recorder();
        let app = Router::new()
            .route("/login", get(|| async { "ok" }))
            .layer(RateLimitLayer::new(
                Arc::new(BrokenStore),
                RateLimitConfig::new(1, 60),
                recorder,
            ));

        // Both requests pass even though the limit is 1.
        for _ in 0..2 {
            let response = app.clone().oneshot(request("1.2.3.4")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
