//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use condoscope::api::{ApiError, ErrorResponse, HealthResponse, StatusResponse, TenantQuery};
use condoscope_core::{CondominiumId, CondoscopeError, EntityCounts, EntityKind};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_status_response_serialization() {
    let status = StatusResponse {
        backend: "redb".to_string(),
        condominium_id: Some(CondominiumId::new("c-1")),
        total_rows: 3,
        counts: EntityCounts {
            checklist_items: 2,
            maintenance_requests: 1,
            ..EntityCounts::default()
        },
    };

    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"backend\":\"redb\""));
    assert!(json.contains("\"condominiumId\":\"c-1\""));
    assert!(json.contains("\"totalRows\":3"));
    assert!(json.contains("\"checklistItems\":2"));
    assert!(json.contains("\"maintenanceRequests\":1"));
}

// =============================================================================
// QUERY TESTS
// =============================================================================

#[test]
fn test_tenant_query_accepts_both_spellings() {
    let camel: TenantQuery = serde_json::from_str(r#"{"condominiumId":"c-7"}"#).unwrap();
    let snake: TenantQuery = serde_json::from_str(r#"{"condominium_id":"c-7"}"#).unwrap();
    assert_eq!(camel.tenant(), Some(CondominiumId::new("c-7")));
    assert_eq!(snake.tenant(), camel.tenant());
}

#[test]
fn test_tenant_query_blank_means_all_rows() {
    let blank: TenantQuery = serde_json::from_str(r#"{"condominiumId":"  "}"#).unwrap();
    assert!(blank.tenant().is_none());
    assert!(TenantQuery::default().tenant().is_none());
}

// =============================================================================
// ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_error_response_shape() {
    let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
    assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
}

#[test]
fn test_fetch_error_maps_to_server_error() {
    let err = ApiError::from(CondoscopeError::Fetch {
        entity: EntityKind::Budgets,
        message: "connection refused".to_string(),
    });
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!err.body.success);
    assert!(err.body.error.contains("budgets"));
}

#[test]
fn test_invalid_input_maps_to_bad_request() {
    let err = ApiError::from(CondoscopeError::InvalidInput("blank id".to_string()));
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}
