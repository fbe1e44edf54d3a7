//! Bearer-token guard for the back-office routes.

use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Shared secret expected in `Authorization: Bearer <token>`.
/// `None` leaves the admin surface open (local development).
#[derive(Clone, Debug, Default)]
pub struct AdminToken(Option<Arc<str>>);

impl AdminToken {
    pub fn new(token: Option<&str>) -> Self {
        Self(
            token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(Arc::from),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    fn accepts(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.0.as_deref() else {
            return true;
        };

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .is_some_and(|presented| constant_time_eq(presented.as_bytes(), expected.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Rejects admin requests that do not carry the configured token.
pub async fn admin_token_middleware(
    State(token): State<AdminToken>,
    request: Request,
    next: Next,
) -> Response {
    if !token.accepts(request.headers()) {
        tracing::warn!(uri = %request.uri(), "rejected admin request without valid token");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

pub trait AdminRouterExt {
    fn with_admin_token(self, token: AdminToken) -> Self;
}

impl<S> AdminRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_admin_token(self, token: AdminToken) -> Self {
        if !token.is_enabled() {
            return self;
        }
        self.layer(axum::middleware::from_fn_with_state(
            token,
            admin_token_middleware,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app(token: Option<&str>) -> Router {
        Router::new()
            .route("/admin/ping", get(|| async { "pong" }))
            .with_admin_token(AdminToken::new(token))
    }

    async fn call(router: Router, auth: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri("/admin/ping");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn open_when_no_token_configured() {
        assert_eq!(call(app(None), None).await, StatusCode::OK);
        assert_eq!(call(app(Some("   ")), None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn requires_matching_bearer_token() {
        assert_eq!(call(app(Some("s3cret")), None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(app(Some("s3cret")), Some("Bearer wrong")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app(Some("s3cret")), Some("Basic s3cret")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app(Some("s3cret")), Some("Bearer s3cret")).await,
            StatusCode::OK
        );
    }
}
