//! # Core Type Definitions
//!
//! This module contains the identifiers and error type shared by every layer:
//! - Tenant identifier (`CondominiumId`)
//! - Entity kinds read from the data layer (`EntityKind`)
//! - Error types (`CondoscopeError`)

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// TENANT IDENTIFIER
// =============================================================================

/// Identifier of a condominium (the tenant every row belongs to).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CondominiumId(pub String);

impl CondominiumId {
    /// Create a new tenant identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an optional, possibly blank identifier coming from a query string
    /// or CLI flag. Blank input means "no tenant filter".
    #[must_use]
    pub fn parse_optional(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CondominiumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ENTITY KIND
// =============================================================================

/// The twelve row types an evaluation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Transactions,
    Budgets,
    Contracts,
    ChecklistItems,
    Decisions,
    Minutes,
    MaintenanceRequests,
    Equipment,
    Suppliers,
    Documents,
    InsurancePolicies,
    Announcements,
}

impl EntityKind {
    /// Every entity kind, in dataset order.
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Transactions,
        EntityKind::Budgets,
        EntityKind::Contracts,
        EntityKind::ChecklistItems,
        EntityKind::Decisions,
        EntityKind::Minutes,
        EntityKind::MaintenanceRequests,
        EntityKind::Equipment,
        EntityKind::Suppliers,
        EntityKind::Documents,
        EntityKind::InsurancePolicies,
        EntityKind::Announcements,
    ];

    /// Dataset key and storage table name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            EntityKind::Transactions => "transactions",
            EntityKind::Budgets => "budgets",
            EntityKind::Contracts => "contracts",
            EntityKind::ChecklistItems => "checklist_items",
            EntityKind::Decisions => "decisions",
            EntityKind::Minutes => "minutes",
            EntityKind::MaintenanceRequests => "maintenance_requests",
            EntityKind::Equipment => "equipment",
            EntityKind::Suppliers => "suppliers",
            EntityKind::Documents => "documents",
            EntityKind::InsurancePolicies => "insurance_policies",
            EntityKind::Announcements => "announcements",
        }
    }

    /// camelCase spelling accepted in JSON datasets.
    #[must_use]
    pub const fn camel_name(&self) -> &'static str {
        match self {
            EntityKind::ChecklistItems => "checklistItems",
            EntityKind::MaintenanceRequests => "maintenanceRequests",
            EntityKind::InsurancePolicies => "insurancePolicies",
            other => other.name(),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Condoscope system.
///
/// The evaluation itself never fails: malformed rows are absorbed during
/// normalisation. Errors come from reading rows, storage and configuration.
#[derive(Debug, Error)]
pub enum CondoscopeError {
    /// Reading one entity type from the data layer failed.
    #[error("Failed to fetch {entity}: {message}")]
    Fetch { entity: EntityKind, message: String },

    /// The storage backend reported an error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller-supplied argument was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_optional_trims_and_drops_blank() {
        assert_eq!(CondominiumId::parse_optional(None), None);
        assert_eq!(CondominiumId::parse_optional(Some("   ")), None);
        assert_eq!(
            CondominiumId::parse_optional(Some(" c-1 ")),
            Some(CondominiumId::new("c-1"))
        );
    }

    #[test]
    fn entity_names_are_unique() {
        let mut names: Vec<_> = EntityKind::ALL.iter().map(EntityKind::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EntityKind::ALL.len());
    }

    #[test]
    fn fetch_error_names_entity() {
        let err = CondoscopeError::Fetch {
            entity: EntityKind::Contracts,
            message: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch contracts: connection reset");
    }
}
