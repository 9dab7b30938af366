//! # Request Middleware
//!
//! Request context and rate limiting for the executive-summary API.
//!
//! Every request runs inside a `request` span carrying the method, the path
//! and the condominium it targets: the `{id}` of
//! `/condominiums/{id}/executive-summary`, else the `condominiumId` query
//! parameter, else `*` for all rows.
//!
//! ## Configuration
//!
//! - `CONDOSCOPE_RATE_LIMIT`: Requests per second (default: 100, 0 disables)

use super::types::{ErrorResponse, TenantQuery};
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use condoscope_core::CondominiumId;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::Span;

const DEFAULT_RPS: NonZeroU32 = match NonZeroU32::new(100) {
    Some(rps) => rps,
    None => NonZeroU32::MIN,
};

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

/// The condominium a request is scoped to, if any.
#[must_use]
pub fn request_tenant(uri: &Uri) -> Option<CondominiumId> {
    if let Some(rest) = uri.path().strip_prefix("/condominiums/") {
        return CondominiumId::parse_optional(rest.split('/').next());
    }
    Query::<TenantQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.tenant())
}

/// Span for the trace layer, tagged with the request's tenant.
pub fn request_span(request: &Request<Body>) -> Span {
    let tenant = request_tenant(request.uri());
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        tenant = tenant.as_ref().map_or("*", CondominiumId::as_str),
    )
}

// =============================================================================
// RATE LIMITER
// =============================================================================

/// One token bucket shared by every client and tenant.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build the shared limiter. Zero falls back to 100 requests per second.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Reject with `429 {"success": false, ...}` once the bucket is empty.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }

    let tenant = request_tenant(request.uri());
    tracing::warn!(
        event = "rate_limited",
        path = %request.uri().path(),
        tenant = tenant.as_ref().map_or("*", CondominiumId::as_str),
        "Rate limit exceeded"
    );
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new("Too many requests")),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn tenant_of(uri: &str) -> Option<CondominiumId> {
        request_tenant(&uri.parse::<Uri>().unwrap())
    }

    #[test]
    fn test_tenant_from_path() {
        assert_eq!(
            tenant_of("/condominiums/c-9/executive-summary"),
            Some(CondominiumId::new("c-9"))
        );
        assert_eq!(tenant_of("/condominiums//executive-summary"), None);
    }

    #[test]
    fn test_tenant_from_query() {
        assert_eq!(
            tenant_of("/executive-summary?condominiumId=c-3"),
            Some(CondominiumId::new("c-3"))
        );
        assert_eq!(
            tenant_of("/status?condominium_id=c-4"),
            Some(CondominiumId::new("c-4"))
        );
        assert_eq!(tenant_of("/status?condominiumId="), None);
        assert_eq!(tenant_of("/executive-summary"), None);
        assert_eq!(tenant_of("/health"), None);
    }

    #[test]
    fn test_request_span_builds_for_tenant_path() {
        let request = Request::builder()
            .uri("/condominiums/c-1/executive-summary")
            .body(Body::empty())
            .unwrap();
        let _span = request_span(&request);
    }

    #[test]
    fn test_zero_rate_uses_default() {
        let limiter = create_rate_limiter(0);
        for _ in 0..100 {
            assert!(limiter.check().is_ok());
        }
    }

    #[test]
    fn test_limiter_exhausts_burst() {
        let limiter = create_rate_limiter(1);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
