//! # Store
//!
//! The record source an application runs against, in one of two backends:
//! - `InMemory`: a [`Dataset`] loaded from a JSON file (volatile)
//! - `Persistent`: a [`RedbStore`] on disk (ACID, persistent)

use crate::dataset::Dataset;
use crate::records::Record;
use crate::source::{EntityCounts, RecordSource};
use crate::storage::RedbStore;
use crate::types::{CondominiumId, CondoscopeError};
use std::collections::BTreeSet;
use std::path::Path;

/// Storage backend behind a running instance.
#[derive(Debug)]
pub enum Store {
    /// Rows held in memory.
    InMemory(Dataset),
    /// Disk-backed rows using redb.
    Persistent(RedbStore),
}

impl Default for Store {
    fn default() -> Self {
        Self::InMemory(Dataset::new())
    }
}

impl Store {
    /// Open or create a persistent store at `path`.
    pub fn open_redb(path: impl AsRef<Path>) -> Result<Self, CondoscopeError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    /// Backend name as shown by `/status` and the CLI.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "file",
            Self::Persistent(_) => "redb",
        }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }

    /// Add the rows of `dataset`. The in-memory backend appends; the
    /// persistent backend upserts by `(tenant, id)` in one transaction.
    pub fn import_dataset(&mut self, dataset: &Dataset) -> Result<EntityCounts, CondoscopeError> {
        match self {
            Self::InMemory(rows) => {
                merge_into(rows, dataset);
                Ok(EntityCounts::from_dataset(dataset))
            }
            Self::Persistent(store) => store.import_dataset(dataset),
        }
    }

    /// Every row, as a dataset.
    pub fn export_dataset(&self) -> Result<Dataset, CondoscopeError> {
        match self {
            Self::InMemory(rows) => Ok(rows.clone()),
            Self::Persistent(store) => store.export_dataset(),
        }
    }

    /// Every tenant that owns at least one row.
    pub fn tenants(&self) -> Result<BTreeSet<CondominiumId>, CondoscopeError> {
        match self {
            Self::InMemory(rows) => Ok(rows.tenants()),
            Self::Persistent(store) => store.tenants(),
        }
    }
}

fn merge_into(target: &mut Dataset, source: &Dataset) {
    let extra = source.clone();
    target.transactions.extend(extra.transactions);
    target.budgets.extend(extra.budgets);
    target.contracts.extend(extra.contracts);
    target.checklist_items.extend(extra.checklist_items);
    target.decisions.extend(extra.decisions);
    target.minutes.extend(extra.minutes);
    target.maintenance_requests.extend(extra.maintenance_requests);
    target.equipment.extend(extra.equipment);
    target.suppliers.extend(extra.suppliers);
    target.documents.extend(extra.documents);
    target.insurance_policies.extend(extra.insurance_policies);
    target.announcements.extend(extra.announcements);
}

impl RecordSource for Store {
    fn fetch<R: Record>(&self, tenant: Option<&CondominiumId>) -> Result<Vec<R>, CondoscopeError> {
        match self {
            Self::InMemory(rows) => rows.fetch(tenant),
            Self::Persistent(store) => store.fetch(tenant),
        }
    }

    fn counts(&self, tenant: Option<&CondominiumId>) -> Result<EntityCounts, CondoscopeError> {
        match self {
            Self::InMemory(rows) => rows.counts(tenant),
            Self::Persistent(store) => store.counts(tenant),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Supplier;
    use tempfile::tempdir;

    fn one_supplier(tenant: &str) -> Dataset {
        let mut d = Dataset::new();
        d.push(Supplier {
            id: format!("s-{}", tenant),
            condominium_id: Some(tenant.to_string()),
            name: Some("Limpa Tudo".to_string()),
            ..Supplier::default()
        });
        d
    }

    #[test]
    fn in_memory_import_appends() {
        let mut store = Store::default();
        assert_eq!(store.backend_name(), "file");
        store.import_dataset(&one_supplier("a")).expect("import");
        store.import_dataset(&one_supplier("b")).expect("import");
        assert_eq!(store.counts(None).expect("counts").suppliers, 2);
        assert_eq!(store.tenants().expect("tenants").len(), 2);
    }

    #[test]
    fn persistent_backend_round_trips() {
        let temp = tempdir().expect("temp dir");
        let mut store = Store::open_redb(temp.path().join("store.redb")).expect("open");
        assert!(store.is_persistent());
        assert_eq!(store.backend_name(), "redb");
        store.import_dataset(&one_supplier("a")).expect("import");

        let exported = store.export_dataset().expect("export");
        assert_eq!(exported, one_supplier("a"));
        let only_b: Vec<Supplier> = store.fetch(Some(&CondominiumId::new("b"))).expect("fetch");
        assert!(only_b.is_empty());
    }
}
