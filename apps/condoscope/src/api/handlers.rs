//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState, load_snapshot,
    types::{ApiError, HealthResponse, StatusResponse, TenantQuery},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use condoscope_core::{
    CondominiumId, CondoscopeError, EntityCounts, EntityKind, ExecutiveSummary, RecordSource,
    evaluate,
};
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::Ordering;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Backend name and row counts.
pub async fn status_handler(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let tenant = query.tenant();
    let counts = count_rows(&state, tenant.clone()).await?;

    Ok(Json(StatusResponse {
        backend: state.store.backend_name().to_string(),
        condominium_id: tenant,
        total_rows: counts.total(),
        counts,
    }))
}

async fn count_rows(
    state: &AppState,
    tenant: Option<CondominiumId>,
) -> Result<EntityCounts, CondoscopeError> {
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || store.counts(tenant.as_ref()))
        .await
        .map_err(|e| CondoscopeError::Storage(format!("Count task failed: {}", e)))?
}

// =============================================================================
// EXECUTIVE SUMMARY HANDLERS
// =============================================================================

/// Executive summary over all rows, or one tenant via `?condominiumId=`.
pub async fn executive_summary_handler(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<ExecutiveSummary>, ApiError> {
    summarize(&state, query.tenant()).await.map(Json)
}

/// Executive summary for the tenant named in the path.
pub async fn condominium_summary_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutiveSummary>, ApiError> {
    let tenant = CondominiumId::parse_optional(Some(id.as_str())).ok_or_else(|| {
        CondoscopeError::InvalidInput("condominium id must not be blank".to_string())
    })?;
    summarize(&state, Some(tenant)).await.map(Json)
}

async fn summarize(
    state: &AppState,
    tenant: Option<CondominiumId>,
) -> Result<ExecutiveSummary, ApiError> {
    let snapshot = load_snapshot(Arc::clone(&state.store), tenant).await?;
    let summary = evaluate(&snapshot, Utc::now());
    state.evaluations.fetch_add(1, Ordering::Relaxed);

    tracing::info!(
        tenant = summary
            .condominium_id
            .as_ref()
            .map_or("*", CondominiumId::as_str),
        overall_score = summary.overall_score,
        maturity = summary.maturity_level.name(),
        alerts = summary.alerts.len(),
        financial_impact = summary.financial_impact,
        "Executive summary computed"
    );

    Ok(summary)
}

// =============================================================================
// METRICS HANDLER
// =============================================================================

/// Prometheus text exposition of store and request metrics.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let counts = count_rows(&state, None).await?;
    let store = Arc::clone(&state.store);
    let tenants = tokio::task::spawn_blocking(move || store.tenants())
        .await
        .map_err(|e| CondoscopeError::Storage(format!("Tenant task failed: {}", e)))??;

    let mut body = String::new();
    let _ = writeln!(body, "# HELP condoscope_info Build information.");
    let _ = writeln!(body, "# TYPE condoscope_info gauge");
    let _ = writeln!(
        body,
        "condoscope_info{{version=\"{}\",backend=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION"),
        state.store.backend_name()
    );

    let _ = writeln!(body, "# HELP condoscope_rows Stored rows per entity type.");
    let _ = writeln!(body, "# TYPE condoscope_rows gauge");
    for kind in EntityKind::ALL {
        let _ = writeln!(
            body,
            "condoscope_rows{{entity=\"{}\"}} {}",
            kind.name(),
            counts.get(kind)
        );
    }

    let _ = writeln!(body, "# HELP condoscope_tenants Condominiums with at least one row.");
    let _ = writeln!(body, "# TYPE condoscope_tenants gauge");
    let _ = writeln!(body, "condoscope_tenants {}", tenants.len());

    let _ = writeln!(
        body,
        "# HELP condoscope_evaluations_total Executive summaries served."
    );
    let _ = writeln!(body, "# TYPE condoscope_evaluations_total counter");
    let _ = writeln!(
        body,
        "condoscope_evaluations_total {}",
        state.evaluations.load(Ordering::Relaxed)
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
