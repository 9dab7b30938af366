//! # Condoscope HTTP API Module
//!
//! This module implements the read-only HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Backend name and row counts (`?condominiumId=` optional)
//! - `GET /executive-summary` - Executive summary (`?condominiumId=` optional)
//! - `GET /condominiums/{id}/executive-summary` - Executive summary for one tenant
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Security Configuration
//!
//! - `CONDOSCOPE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `CONDOSCOPE_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `CONDOSCOPE_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{ApiKey, api_key_auth_middleware, keys_match};
pub use handlers::{
    condominium_summary_handler, executive_summary_handler, health_handler, metrics_handler,
    status_handler,
};
pub use middleware::{
    GlobalRateLimiter, create_rate_limiter, rate_limit_middleware, request_span, request_tenant,
};
pub use types::{ApiError, ErrorResponse, HealthResponse, StatusResponse, TenantQuery};

use crate::config::{Config, DEFAULT_RATE_LIMIT};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use condoscope_core::{
    Announcement, Budget, ChecklistItem, CondominiumId, CondoscopeError, Contract, Dataset,
    Decision, Document, Equipment, InsurancePolicy, MaintenanceRequest, Minutes, Record,
    RecordSource, Store, Supplier, TenantSnapshot, Transaction,
};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Security and throttling settings for one router.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Bearer key; `None` leaves every endpoint open.
    pub api_key: Option<String>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// `None` = localhost only; `["*"]` = any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
        }
    }
}

impl ApiSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone(),
            rate_limit: config.rate_limit,
            cors_origins: config.cors_origins.clone(),
        }
    }
}

/// Shared server state.
///
/// The API never writes, so the store is shared without a lock.
#[derive(Clone)]
pub struct AppState {
    /// The record source every request reads from.
    pub store: Arc<Store>,
    pub settings: Arc<ApiSettings>,
    /// Executive summaries served since startup.
    pub evaluations: Arc<AtomicU64>,
}

impl AppState {
    /// Create app state with default settings (no auth, localhost CORS).
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self::with_settings(store, ApiSettings::default())
    }

    #[must_use]
    pub fn with_settings(store: Store, settings: ApiSettings) -> Self {
        Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
            evaluations: Arc::new(AtomicU64::new(0)),
        }
    }
}

// =============================================================================
// SNAPSHOT LOADING
// =============================================================================

/// Read one entity type on the blocking pool.
async fn fetch_blocking<R, S>(
    source: Arc<S>,
    tenant: Option<CondominiumId>,
) -> Result<Vec<R>, CondoscopeError>
where
    R: Record,
    S: RecordSource + Send + Sync + 'static,
{
    let joined = tokio::task::spawn_blocking(move || source.fetch::<R>(tenant.as_ref())).await;
    match joined {
        Ok(Ok(rows)) => Ok(rows),
        Ok(Err(e)) => {
            tracing::error!(entity = %R::KIND, error = %e, "Row fetch failed");
            Err(e)
        }
        Err(e) => {
            tracing::error!(entity = %R::KIND, error = %e, "Row fetch task failed");
            Err(CondoscopeError::Fetch {
                entity: R::KIND,
                message: e.to_string(),
            })
        }
    }
}

/// Assemble a tenant snapshot with twelve concurrent reads.
///
/// The first failed read aborts the whole snapshot.
pub async fn load_snapshot<S>(
    source: Arc<S>,
    tenant: Option<CondominiumId>,
) -> Result<TenantSnapshot, CondoscopeError>
where
    S: RecordSource + Send + Sync + 'static,
{
    let (
        transactions,
        budgets,
        contracts,
        checklist_items,
        decisions,
        minutes,
        maintenance_requests,
        equipment,
        suppliers,
        documents,
        insurance_policies,
        announcements,
    ) = tokio::try_join!(
        fetch_blocking::<Transaction, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Budget, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Contract, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<ChecklistItem, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Decision, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Minutes, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<MaintenanceRequest, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Equipment, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Supplier, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Document, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<InsurancePolicy, S>(Arc::clone(&source), tenant.clone()),
        fetch_blocking::<Announcement, S>(Arc::clone(&source), tenant.clone()),
    )?;

    let rows = Dataset {
        transactions,
        budgets,
        contracts,
        checklist_items,
        decisions,
        minutes,
        maintenance_requests,
        equipment,
        suppliers,
        documents,
        insurance_policies,
        announcements,
    };
    Ok(TenantSnapshot::new(tenant, rows))
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer.
///
/// - `Some(["*"])`: allows all origins (development mode - use with caution!)
/// - `None`: localhost only (restrictive default)
/// - otherwise: the listed origins
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some([only]) if only == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(list) => {
            let allowed_origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let settings = Arc::clone(&state.settings);
    let cors = build_cors_layer(settings.cors_origins.as_deref());

    let rate_limiter = if settings.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", settings.rate_limit);
        Some(create_rate_limiter(settings.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let api_key: Option<ApiKey> = settings.api_key.as_deref().map(Arc::from);
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set CONDOSCOPE_API_KEY to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/executive-summary", get(handlers::executive_summary_handler))
        .route(
            "/condominiums/{id}/executive-summary",
            get(handlers::condominium_summary_handler),
        )
        .route("/metrics", get(handlers::metrics_handler));

    // Innermost: runs last on the request path
    if let Some(key) = api_key {
        router = router.layer(axum_middleware::from_fn_with_state(
            key,
            auth::api_key_auth_middleware,
        ));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and serve until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), CondoscopeError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CondoscopeError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Condoscope HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CondoscopeError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use condoscope_core::EntityKind;

    struct FailingContracts;

    impl RecordSource for FailingContracts {
        fn fetch<R: Record>(
            &self,
            _tenant: Option<&CondominiumId>,
        ) -> Result<Vec<R>, CondoscopeError> {
            if R::KIND == EntityKind::Contracts {
                Err(CondoscopeError::Fetch {
                    entity: R::KIND,
                    message: "timeout".to_string(),
                })
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn test_load_snapshot_fails_on_any_read() {
        let result = load_snapshot(Arc::new(FailingContracts), None).await;
        assert!(matches!(
            result,
            Err(CondoscopeError::Fetch {
                entity: EntityKind::Contracts,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_load_snapshot_filters_tenant() {
        let rows = Dataset::from_json_value(&serde_json::json!({
            "suppliers": [
                {"id": "s1", "condominium_id": "c-1"},
                {"id": "s2", "condominium_id": "c-2"},
                {"id": "s3", "condominium_id": "c-1"},
            ]
        }))
        .unwrap();

        let tenant = CondominiumId::new("c-1");
        let snapshot = load_snapshot(Arc::new(rows), Some(tenant.clone()))
            .await
            .unwrap();
        assert_eq!(snapshot.condominium_id, Some(tenant));
        assert_eq!(snapshot.rows.suppliers.len(), 2);
        assert!(snapshot.rows.transactions.is_empty());
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            api_key: Some("k".to_string()),
            rate_limit: 0,
            ..Config::default()
        };
        let settings = ApiSettings::from_config(&config);
        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.rate_limit, 0);
        assert!(settings.cors_origins.is_none());
    }
}
