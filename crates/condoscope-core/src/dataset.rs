//! # Dataset
//!
//! All rows of all entity types, held in memory.
//!
//! A `Dataset` is both the in-memory record source (the fallback used when no
//! database is configured) and the unit of import/export for the persistent
//! store. Parsing goes through the lenient row normalisation in
//! [`crate::rows`]: rows that are not JSON objects are skipped and malformed
//! fields are absorbed, but a document that is not a JSON object at all, or
//! that exceeds [`MAX_DATASET_ROWS`] rows of one kind, is rejected.

use crate::primitives::MAX_DATASET_ROWS;
use crate::records::{
    Announcement, Budget, ChecklistItem, Contract, Decision, Document, Equipment,
    InsurancePolicy, MaintenanceRequest, Minutes, Record, Supplier, Transaction,
};
use crate::source::{EntityCounts, RecordSource};
use crate::types::{CondominiumId, CondoscopeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Rows of every entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Dataset {
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub contracts: Vec<Contract>,
    pub checklist_items: Vec<ChecklistItem>,
    pub decisions: Vec<Decision>,
    pub minutes: Vec<Minutes>,
    pub maintenance_requests: Vec<MaintenanceRequest>,
    pub equipment: Vec<Equipment>,
    pub suppliers: Vec<Supplier>,
    pub documents: Vec<Document>,
    pub insurance_policies: Vec<InsurancePolicy>,
    pub announcements: Vec<Announcement>,
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document of the form `{"transactions": [...], ...}`.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CondoscopeError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| CondoscopeError::Serialization(format!("Invalid dataset JSON: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Build a dataset from an already-parsed JSON document.
    pub fn from_json_value(value: &Value) -> Result<Self, CondoscopeError> {
        let Value::Object(root) = value else {
            return Err(CondoscopeError::Serialization(
                "Dataset must be a JSON object keyed by entity type".to_string(),
            ));
        };

        let mut dataset = Self::new();
        load_rows::<Transaction>(root, &mut dataset)?;
        load_rows::<Budget>(root, &mut dataset)?;
        load_rows::<Contract>(root, &mut dataset)?;
        load_rows::<ChecklistItem>(root, &mut dataset)?;
        load_rows::<Decision>(root, &mut dataset)?;
        load_rows::<Minutes>(root, &mut dataset)?;
        load_rows::<MaintenanceRequest>(root, &mut dataset)?;
        load_rows::<Equipment>(root, &mut dataset)?;
        load_rows::<Supplier>(root, &mut dataset)?;
        load_rows::<Document>(root, &mut dataset)?;
        load_rows::<InsurancePolicy>(root, &mut dataset)?;
        load_rows::<Announcement>(root, &mut dataset)?;
        Ok(dataset)
    }

    /// Serialize as pretty-printed JSON (re-importable with `from_json_slice`).
    pub fn to_json_pretty(&self) -> Result<String, CondoscopeError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CondoscopeError::Serialization(e.to_string()))
    }

    /// Append one record to its slot.
    pub fn push<R: Record>(&mut self, record: R) {
        R::rows_mut(self).push(record);
    }

    /// Total number of rows across all entity types.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        EntityCounts::from_dataset(self).total()
    }

    /// Every condominium id referenced by any row, in sorted order.
    #[must_use]
    pub fn tenants(&self) -> BTreeSet<CondominiumId> {
        let mut tenants = BTreeSet::new();
        collect_tenants(&self.transactions, &mut tenants);
        collect_tenants(&self.budgets, &mut tenants);
        collect_tenants(&self.contracts, &mut tenants);
        collect_tenants(&self.checklist_items, &mut tenants);
        collect_tenants(&self.decisions, &mut tenants);
        collect_tenants(&self.minutes, &mut tenants);
        collect_tenants(&self.maintenance_requests, &mut tenants);
        collect_tenants(&self.equipment, &mut tenants);
        collect_tenants(&self.suppliers, &mut tenants);
        collect_tenants(&self.documents, &mut tenants);
        collect_tenants(&self.insurance_policies, &mut tenants);
        collect_tenants(&self.announcements, &mut tenants);
        tenants
    }
}

fn collect_tenants<R: Record>(rows: &[R], out: &mut BTreeSet<CondominiumId>) {
    out.extend(
        rows.iter()
            .filter_map(|r| r.condominium_id())
            .map(CondominiumId::new),
    );
}

/// Normalise the array stored under the kind's key (either spelling).
fn load_rows<R: Record>(
    root: &serde_json::Map<String, Value>,
    dataset: &mut Dataset,
) -> Result<(), CondoscopeError> {
    let kind = R::KIND;
    let entries = root
        .get(kind.name())
        .or_else(|| root.get(kind.camel_name()))
        .and_then(Value::as_array);

    let Some(entries) = entries else {
        return Ok(());
    };

    if entries.len() > MAX_DATASET_ROWS {
        return Err(CondoscopeError::Serialization(format!(
            "{} rows of {} exceed maximum {}",
            entries.len(),
            kind,
            MAX_DATASET_ROWS
        )));
    }

    let slot = R::rows_mut(dataset);
    slot.reserve(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if let Value::Object(row) = entry {
            slot.push(R::from_row(row, format!("{}-{}", kind, index)));
        }
    }
    Ok(())
}

// =============================================================================
// RECORD SOURCE (in-memory fallback)
// =============================================================================

impl RecordSource for Dataset {
    fn fetch<R: Record>(&self, tenant: Option<&CondominiumId>) -> Result<Vec<R>, CondoscopeError> {
        Ok(R::rows(self)
            .iter()
            .filter(|r| r.belongs_to(tenant))
            .cloned()
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        let doc = json!({
            "transactions": [
                {"id": "t1", "condominium_id": "c-1", "type": "despesa", "status": "pago", "amount": 10},
                {"id": "t2", "condominium_id": "c-2", "type": "receita", "status": "pago", "amount": 20},
                "not an object"
            ],
            "maintenanceRequests": [
                {"condominiumId": "c-1", "status": "aberta", "priority": "urgente"}
            ],
            "suppliers": null
        });
        Dataset::from_json_value(&doc).expect("parse")
    }

    #[test]
    fn parses_both_spellings_and_skips_non_objects() {
        let dataset = sample();
        assert_eq!(dataset.transactions.len(), 2);
        assert_eq!(dataset.maintenance_requests.len(), 1);
        assert!(dataset.suppliers.is_empty());
        assert_eq!(dataset.total_rows(), 3);
    }

    #[test]
    fn missing_ids_get_positional_fallback() {
        let dataset = sample();
        assert_eq!(dataset.maintenance_requests[0].id, "maintenance_requests-0");
    }

    #[test]
    fn rejects_non_object_document() {
        let result = Dataset::from_json_slice(b"[1, 2, 3]");
        assert!(matches!(result, Err(CondoscopeError::Serialization(_))));
        let result = Dataset::from_json_slice(b"{not json");
        assert!(matches!(result, Err(CondoscopeError::Serialization(_))));
    }

    #[test]
    fn fetch_filters_by_tenant() {
        let dataset = sample();
        let all: Vec<Transaction> = dataset.fetch(None).expect("fetch");
        assert_eq!(all.len(), 2);
        let only_c1: Vec<Transaction> =
            dataset.fetch(Some(&CondominiumId::new("c-1"))).expect("fetch");
        assert_eq!(only_c1.len(), 1);
        assert_eq!(only_c1[0].id, "t1");
    }

    #[test]
    fn tenants_are_sorted_and_unique() {
        let tenants: Vec<_> = sample().tenants().into_iter().collect();
        assert_eq!(
            tenants,
            vec![CondominiumId::new("c-1"), CondominiumId::new("c-2")]
        );
    }

    #[test]
    fn export_is_reimportable() {
        let dataset = sample();
        let json = dataset.to_json_pretty().expect("export");
        let reimported = Dataset::from_json_slice(json.as_bytes()).expect("import");
        assert_eq!(reimported, dataset);
    }
}
