//! # Record Sources
//!
//! The read-side contract of the data layer: one typed read per entity type,
//! each optionally filtered by tenant.
//!
//! An evaluation never reads rows piecemeal. It first assembles a
//! [`TenantSnapshot`] (all twelve row sets for one tenant) and only then
//! computes; any failed read aborts the whole snapshot.

use crate::dataset::Dataset;
use crate::records::Record;
use crate::types::{CondominiumId, CondoscopeError, EntityKind};
use serde::{Deserialize, Serialize};

// =============================================================================
// RECORD SOURCE TRAIT
// =============================================================================

/// Read access to rows, implemented by every storage backend.
pub trait RecordSource {
    /// Read all rows of type `R`, restricted to `tenant` when given.
    fn fetch<R: Record>(&self, tenant: Option<&CondominiumId>) -> Result<Vec<R>, CondoscopeError>;

    /// Read a full, consistent snapshot for one tenant.
    fn snapshot(&self, tenant: Option<&CondominiumId>) -> Result<TenantSnapshot, CondoscopeError> {
        let rows = Dataset {
            transactions: self.fetch(tenant)?,
            budgets: self.fetch(tenant)?,
            contracts: self.fetch(tenant)?,
            checklist_items: self.fetch(tenant)?,
            decisions: self.fetch(tenant)?,
            minutes: self.fetch(tenant)?,
            maintenance_requests: self.fetch(tenant)?,
            equipment: self.fetch(tenant)?,
            suppliers: self.fetch(tenant)?,
            documents: self.fetch(tenant)?,
            insurance_policies: self.fetch(tenant)?,
            announcements: self.fetch(tenant)?,
        };
        Ok(TenantSnapshot::new(tenant.cloned(), rows))
    }

    /// Per-entity row counts for one tenant.
    fn counts(&self, tenant: Option<&CondominiumId>) -> Result<EntityCounts, CondoscopeError> {
        Ok(EntityCounts::from_dataset(&self.snapshot(tenant)?.rows))
    }
}

// =============================================================================
// TENANT SNAPSHOT
// =============================================================================

/// All rows one evaluation pass reads, fetched for a single tenant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TenantSnapshot {
    /// The tenant filter the rows were fetched with (`None` = all rows).
    pub condominium_id: Option<CondominiumId>,
    /// The fetched rows.
    pub rows: Dataset,
}

impl TenantSnapshot {
    /// Wrap already-fetched rows.
    #[must_use]
    pub fn new(condominium_id: Option<CondominiumId>, rows: Dataset) -> Self {
        Self {
            condominium_id,
            rows,
        }
    }

    /// Snapshot of an empty condominium.
    #[must_use]
    pub fn empty(condominium_id: Option<CondominiumId>) -> Self {
        Self::new(condominium_id, Dataset::new())
    }
}

// =============================================================================
// ENTITY COUNTS
// =============================================================================

/// Raw row counts per entity type, reported alongside the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
    pub transactions: usize,
    pub budgets: usize,
    pub contracts: usize,
    pub checklist_items: usize,
    pub decisions: usize,
    pub minutes: usize,
    pub maintenance_requests: usize,
    pub equipment: usize,
    pub suppliers: usize,
    pub documents: usize,
    pub insurance_policies: usize,
    pub announcements: usize,
}

impl EntityCounts {
    /// Count the rows of a dataset.
    #[must_use]
    pub fn from_dataset(d: &Dataset) -> Self {
        Self {
            transactions: d.transactions.len(),
            budgets: d.budgets.len(),
            contracts: d.contracts.len(),
            checklist_items: d.checklist_items.len(),
            decisions: d.decisions.len(),
            minutes: d.minutes.len(),
            maintenance_requests: d.maintenance_requests.len(),
            equipment: d.equipment.len(),
            suppliers: d.suppliers.len(),
            documents: d.documents.len(),
            insurance_policies: d.insurance_policies.len(),
            announcements: d.announcements.len(),
        }
    }

    /// Sum over all entity types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.transactions
            + self.budgets
            + self.contracts
            + self.checklist_items
            + self.decisions
            + self.minutes
            + self.maintenance_requests
            + self.equipment
            + self.suppliers
            + self.documents
            + self.insurance_policies
            + self.announcements
    }

    /// Row count for one entity type.
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Transactions => self.transactions,
            EntityKind::Budgets => self.budgets,
            EntityKind::Contracts => self.contracts,
            EntityKind::ChecklistItems => self.checklist_items,
            EntityKind::Decisions => self.decisions,
            EntityKind::Minutes => self.minutes,
            EntityKind::MaintenanceRequests => self.maintenance_requests,
            EntityKind::Equipment => self.equipment,
            EntityKind::Suppliers => self.suppliers,
            EntityKind::Documents => self.documents,
            EntityKind::InsurancePolicies => self.insurance_policies,
            EntityKind::Announcements => self.announcements,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
