//! # redb-backed Row Storage
//!
//! A disk-backed record source using the redb embedded database:
//! - ACID transactions (an import is all-or-nothing)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! ## Layout
//!
//! One table per [`EntityKind`], named after the kind. Keys are
//! `(tenant, id)` string pairs, with `""` standing for rows without a tenant;
//! values are postcard-encoded records. Because the tenant leads the key, a
//! tenant-filtered read is a single range scan.

use crate::dataset::Dataset;
use crate::primitives::MAX_DATASET_ROWS;
use crate::records::{
    Announcement, Budget, ChecklistItem, Contract, Decision, Document, Equipment,
    InsurancePolicy, MaintenanceRequest, Minutes, Record, Supplier, Transaction,
};
use crate::source::{EntityCounts, RecordSource};
use crate::types::{CondominiumId, CondoscopeError, EntityKind};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use std::collections::BTreeSet;
use std::path::Path;

type RowTable = TableDefinition<'static, (&'static str, &'static str), &'static [u8]>;

/// Table holding every row of `kind`.
fn table(kind: EntityKind) -> RowTable {
    TableDefinition::new(kind.name())
}

fn storage_err(e: impl std::fmt::Display) -> CondoscopeError {
    CondoscopeError::Storage(e.to_string())
}

/// A disk-backed record store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a row database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CondoscopeError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Create every table up front so reads never hit a missing table.
        let write_txn = db.begin_write().map_err(storage_err)?;
        for kind in EntityKind::ALL {
            let _ = write_txn.open_table(table(kind)).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<bool, CondoscopeError> {
        self.db.compact().map_err(storage_err)
    }

    /// Upsert every row of `dataset` in a single ACID transaction.
    ///
    /// The dataset is checked against [`MAX_DATASET_ROWS`] before the
    /// transaction opens; on any failure nothing is written. Returns the
    /// number of rows written per entity type.
    pub fn import_dataset(&mut self, dataset: &Dataset) -> Result<EntityCounts, CondoscopeError> {
        let counts = EntityCounts::from_dataset(dataset);
        for kind in EntityKind::ALL {
            let n = counts.get(kind);
            if n > MAX_DATASET_ROWS {
                return Err(CondoscopeError::InvalidInput(format!(
                    "{} rows of {} exceed maximum {}",
                    n, kind, MAX_DATASET_ROWS
                )));
            }
        }

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        write_rows(&write_txn, &dataset.transactions)?;
        write_rows(&write_txn, &dataset.budgets)?;
        write_rows(&write_txn, &dataset.contracts)?;
        write_rows(&write_txn, &dataset.checklist_items)?;
        write_rows(&write_txn, &dataset.decisions)?;
        write_rows(&write_txn, &dataset.minutes)?;
        write_rows(&write_txn, &dataset.maintenance_requests)?;
        write_rows(&write_txn, &dataset.equipment)?;
        write_rows(&write_txn, &dataset.suppliers)?;
        write_rows(&write_txn, &dataset.documents)?;
        write_rows(&write_txn, &dataset.insurance_policies)?;
        write_rows(&write_txn, &dataset.announcements)?;
        write_txn.commit().map_err(storage_err)?;

        Ok(counts)
    }

    /// Read every stored row back into a dataset.
    pub fn export_dataset(&self) -> Result<Dataset, CondoscopeError> {
        Ok(self.snapshot(None)?.rows)
    }

    /// Every tenant that owns at least one row, in sorted order.
    pub fn tenants(&self) -> Result<BTreeSet<CondominiumId>, CondoscopeError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let mut tenants = BTreeSet::new();
        for kind in EntityKind::ALL {
            let rows = read_txn.open_table(table(kind)).map_err(storage_err)?;
            for entry in rows.iter().map_err(storage_err)? {
                let (key, _) = entry.map_err(storage_err)?;
                let (tenant, _) = key.value();
                if !tenant.is_empty() {
                    tenants.insert(CondominiumId::new(tenant));
                }
            }
        }
        Ok(tenants)
    }

    fn read_rows<R: Record>(
        &self,
        tenant: Option<&CondominiumId>,
    ) -> Result<Vec<R>, CondoscopeError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let rows = read_txn.open_table(table(R::KIND)).map_err(storage_err)?;

        let mut out = Vec::new();
        match tenant {
            None => {
                for entry in rows.iter().map_err(storage_err)? {
                    let (_, value) = entry.map_err(storage_err)?;
                    out.push(decode(value.value())?);
                }
            }
            Some(t) => {
                let start = (t.as_str(), "");
                for entry in rows.range(start..).map_err(storage_err)? {
                    let (key, value) = entry.map_err(storage_err)?;
                    if key.value().0 != t.as_str() {
                        break;
                    }
                    out.push(decode(value.value())?);
                }
            }
        }
        Ok(out)
    }

    fn count_rows(&self, kind: EntityKind) -> Result<usize, CondoscopeError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let rows = read_txn.open_table(table(kind)).map_err(storage_err)?;
        let n = rows.len().map_err(storage_err)?;
        Ok(n as usize)
    }
}

fn write_rows<R: Record>(txn: &WriteTransaction, records: &[R]) -> Result<(), CondoscopeError> {
    let mut rows = txn.open_table(table(R::KIND)).map_err(storage_err)?;
    for record in records {
        let bytes = postcard::to_allocvec(record)
            .map_err(|e| CondoscopeError::Serialization(e.to_string()))?;
        let key = (record.condominium_id().unwrap_or(""), record.id());
        rows.insert(key, bytes.as_slice()).map_err(storage_err)?;
    }
    Ok(())
}

fn decode<R: Record>(bytes: &[u8]) -> Result<R, CondoscopeError> {
    postcard::from_bytes(bytes).map_err(|e| CondoscopeError::Serialization(e.to_string()))
}

// =============================================================================
// RECORD SOURCE IMPLEMENTATION
// =============================================================================

impl RecordSource for RedbStore {
    fn fetch<R: Record>(&self, tenant: Option<&CondominiumId>) -> Result<Vec<R>, CondoscopeError> {
        self.read_rows(tenant).map_err(|e| CondoscopeError::Fetch {
            entity: R::KIND,
            message: e.to_string(),
        })
    }

    fn counts(&self, tenant: Option<&CondominiumId>) -> Result<EntityCounts, CondoscopeError> {
        if tenant.is_some() {
            return Ok(EntityCounts::from_dataset(&self.snapshot(tenant)?.rows));
        }
        Ok(EntityCounts {
            transactions: self.count_rows(Transaction::KIND)?,
            budgets: self.count_rows(Budget::KIND)?,
            contracts: self.count_rows(Contract::KIND)?,
            checklist_items: self.count_rows(ChecklistItem::KIND)?,
            decisions: self.count_rows(Decision::KIND)?,
            minutes: self.count_rows(Minutes::KIND)?,
            maintenance_requests: self.count_rows(MaintenanceRequest::KIND)?,
            equipment: self.count_rows(Equipment::KIND)?,
            suppliers: self.count_rows(Supplier::KIND)?,
            documents: self.count_rows(Document::KIND)?,
            insurance_policies: self.count_rows(InsurancePolicy::KIND)?,
            announcements: self.count_rows(Announcement::KIND)?,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
