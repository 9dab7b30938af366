//! Integration tests for the Condoscope HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use condoscope::api::{ApiSettings, AppState, HealthResponse, StatusResponse, create_router};
use condoscope_core::{Dataset, Store};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn day(offset: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

/// Two condominiums: c-1 has an overdue expense and expired insurance,
/// c-2 is clean.
fn sample_rows() -> Dataset {
    let doc = json!({
        "transactions": [
            {"id": "t1", "condominium_id": "c-1", "type": "despesa", "status": "pendente",
             "amount": 500, "due_date": day(-2)},
            {"id": "t2", "condominium_id": "c-2", "type": "receita", "status": "pago",
             "amount": 900, "due_date": day(-5)}
        ],
        "insurance_policies": [
            {"id": "p1", "condominium_id": "c-1", "end_date": day(-10), "coverage_amount": 10000}
        ],
        "suppliers": [
            {"id": "s1", "condominium_id": "c-2"}
        ]
    });
    Dataset::from_json_value(&doc).unwrap()
}

fn open_settings() -> ApiSettings {
    ApiSettings {
        rate_limit: 0,
        ..ApiSettings::default()
    }
}

/// Create a test server over an empty in-memory store.
fn create_test_server() -> TestServer {
    let state = AppState::with_settings(Store::default(), open_settings());
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server over the sample rows.
fn create_populated_test_server() -> TestServer {
    let state = AppState::with_settings(Store::InMemory(sample_rows()), open_settings());
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server with authentication enabled.
fn create_auth_test_server(api_key: &str) -> TestServer {
    let settings = ApiSettings {
        api_key: Some(api_key.to_string()),
        ..open_settings()
    };
    let state = AppState::with_settings(Store::InMemory(sample_rows()), settings);
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server over a redb store holding one undecodable
/// transaction for c-1.
fn create_corrupt_redb_server() -> (TempDir, TestServer) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rows.redb");
    write_undecodable_row(&path);

    let store = Store::open_redb(&path).unwrap();
    let state = AppState::with_settings(store, open_settings());
    (dir, TestServer::new(create_router(state)).unwrap())
}

fn write_undecodable_row(path: &Path) {
    let rows: redb::TableDefinition<(&str, &str), &[u8]> =
        redb::TableDefinition::new("transactions");
    let db = redb::Database::create(path).unwrap();
    let txn = db.begin_write().unwrap();
    {
        let mut table = txn.open_table(rows).unwrap();
        table.insert(("c-1", "t1"), [0xffu8; 3].as_slice()).unwrap();
    }
    txn.commit().unwrap();
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// STATUS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_status_empty_store() {
    let server = create_test_server();

    let response = server.get("/status").await;
    response.assert_status_ok();

    let status: StatusResponse = response.json();
    assert_eq!(status.backend, "file");
    assert_eq!(status.total_rows, 0);
    assert!(status.condominium_id.is_none());
}

#[tokio::test]
async fn test_status_filters_by_tenant() {
    let server = create_populated_test_server();

    let all: StatusResponse = server.get("/status").await.json();
    assert_eq!(all.total_rows, 4);

    let response = server
        .get("/status")
        .add_query_param("condominiumId", "c-2")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["condominiumId"], "c-2");
    assert_eq!(body["totalRows"], 2);
    assert_eq!(body["counts"]["suppliers"], 1);
    assert_eq!(body["counts"]["insurancePolicies"], 0);
}

// =============================================================================
// EXECUTIVE SUMMARY TESTS
// =============================================================================

#[tokio::test]
async fn test_executive_summary_empty_store() {
    let server = create_test_server();

    let response = server.get("/executive-summary").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["overallScore"], 47);
    assert_eq!(body["maturityLevel"], "evolving");
    assert_eq!(body["pillars"].as_array().unwrap().len(), 7);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);
    assert_eq!(body["financialImpact"], 0.0);
    assert!(body["condominiumId"].is_null());
    assert!(body["generatedAt"].is_string());
}

#[tokio::test]
async fn test_executive_summary_query_tenant() {
    let server = create_populated_test_server();

    let response = server
        .get("/executive-summary")
        .add_query_param("condominiumId", "c-1")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["condominiumId"], "c-1");

    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0]["severity"], "critico");
    assert_eq!(alerts[0]["financialImpact"], 10000.0);
    assert_eq!(alerts[1]["severity"], "medio");
    assert_eq!(body["financialImpact"], 10500.0);
    assert_eq!(body["metrics"]["transactions"], 1);
}

#[tokio::test]
async fn test_condominium_path_matches_query() {
    let server = create_populated_test_server();

    let by_path: Value = server
        .get("/condominiums/c-2/executive-summary")
        .await
        .json();
    let by_query: Value = server
        .get("/executive-summary")
        .add_query_param("condominiumId", "c-2")
        .await
        .json();

    assert_eq!(by_path["overallScore"], by_query["overallScore"]);
    assert_eq!(by_path["pillars"], by_query["pillars"]);
    assert_eq!(by_path["condominiumId"], "c-2");
    assert_eq!(by_path["alerts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_blank_condominium_path_is_bad_request() {
    let server = create_populated_test_server();

    let response = server.get("/condominiums/%20/executive-summary").await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("condominium id"));
}

#[tokio::test]
async fn test_unknown_tenant_is_empty_baseline() {
    let server = create_populated_test_server();

    let body: Value = server
        .get("/condominiums/c-999/executive-summary")
        .await
        .json();
    assert_eq!(body["overallScore"], 47);
    assert_eq!(body["metrics"]["transactions"], 0);
}

// =============================================================================
// METRICS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = create_populated_test_server();

    server.get("/executive-summary").await.assert_status_ok();

    let response = server.get("/metrics").await;
    response.assert_status_ok();

    let text = response.text();
    assert!(text.contains("condoscope_rows{entity=\"transactions\"} 2"));
    assert!(text.contains("condoscope_rows{entity=\"budgets\"} 0"));
    assert!(text.contains("condoscope_tenants 2"));
    assert!(text.contains("condoscope_evaluations_total 1"));
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_storage_failure_returns_error_envelope() {
    let (_dir, server) = create_corrupt_redb_server();

    let response = server.get("/executive-summary").await;
    assert_eq!(response.status_code().as_u16(), 500);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to fetch transactions")
    );
}

#[tokio::test]
async fn test_storage_failure_on_tenant_path() {
    let (_dir, server) = create_corrupt_redb_server();

    let response = server.get("/condominiums/c-1/executive-summary").await;
    assert_eq!(response.status_code().as_u16(), 500);
    assert_eq!(response.json::<Value>()["success"], false);

    // Rows of other tenants are never decoded.
    server
        .get("/condominiums/c-2/executive-summary")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = create_test_server();

    // The API is read-only
    let response = server.post("/executive-summary").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/status")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert_eq!(status.total_rows, 4);
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let api_key = "test-raw-key-67890";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/executive-summary")
        .add_header(
            axum::http::header::AUTHORIZATION,
            api_key.parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let server = create_auth_test_server("correct-key");

    let response = server
        .get("/executive-summary")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let server = create_auth_test_server("correct-key");

    let response = server.get("/condominiums/c-1/executive-summary").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_health_exempt() {
    let server = create_auth_test_server("correct-key");

    let response = server.get("/health").await;
    response.assert_status_ok();
}

// =============================================================================
// RATE LIMIT TESTS
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let settings = ApiSettings {
        rate_limit: 1,
        ..ApiSettings::default()
    };
    let state = AppState::with_settings(Store::default(), settings);
    let server = TestServer::new(create_router(state)).unwrap();

    server.get("/health").await.assert_status_ok();
    let response = server.get("/health").await;
    assert_eq!(response.status_code().as_u16(), 429);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Too many requests");
}
