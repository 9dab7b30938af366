//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use condoscope_core::{CondominiumId, CondoscopeError, EntityCounts};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Store status: backend and row counts, optionally for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub backend: String,
    pub condominium_id: Option<CondominiumId>,
    pub total_rows: usize,
    pub counts: EntityCounts,
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// `?condominiumId=` filter shared by `/status` and `/executive-summary`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantQuery {
    #[serde(rename = "condominiumId", alias = "condominium_id")]
    pub condominium_id: Option<String>,
}

impl TenantQuery {
    /// The tenant filter; a blank value means "all rows".
    #[must_use]
    pub fn tenant(&self) -> Option<CondominiumId> {
        CondominiumId::parse_optional(self.condominium_id.as_deref())
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Failure body: `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// An error leaving a handler, carrying its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl From<CondoscopeError> for ApiError {
    fn from(err: CondoscopeError) -> Self {
        let status = match err {
            CondoscopeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CondoscopeError::Fetch { .. }
            | CondoscopeError::Storage(_)
            | CondoscopeError::Serialization(_)
            | CondoscopeError::Io(_)
            | CondoscopeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorResponse::new(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
