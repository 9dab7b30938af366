//! # condoscope-core
//!
//! The deterministic evaluation engine for Condoscope.
//!
//! This crate turns the raw rows of a condominium (transactions, budgets,
//! contracts, checklists, decisions, minutes, maintenance requests,
//! equipment, suppliers, documents, insurance policies and announcements)
//! into an executive summary: seven bounded pillar scores, one weighted
//! overall score, a maturity label and a severity-sorted alert list.
//!
//! ## Layers
//!
//! - `rows` / `records` / `dataset`: lenient normalisation of loosely-typed rows
//! - `source` / `storage` / `store`: tenant-filtered reads (in memory or redb)
//! - `metrics` / `scoring` / `summary`: the pure evaluation pass
//!
//! ## Constraints
//!
//! - No async, no network dependencies, no logging (pure Rust)
//! - Evaluation is a pure function of `(snapshot, now)`
//! - Malformed row fields never fail; they read as zero or absent

// =============================================================================
// MODULES
// =============================================================================

pub mod dataset;
pub mod metrics;
pub mod primitives;
pub mod records;
pub mod rows;
pub mod scoring;
pub mod source;
pub mod storage;
pub mod store;
pub mod summary;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{CondominiumId, CondoscopeError, EntityKind};

// =============================================================================
// RE-EXPORTS: Data Layer
// =============================================================================

pub use dataset::Dataset;
pub use records::{
    Announcement, Budget, ChecklistItem, Contract, Decision, Document, Equipment,
    InsurancePolicy, MaintenanceRequest, Minutes, Record, Supplier, Transaction,
};
pub use source::{EntityCounts, RecordSource, TenantSnapshot};
pub use storage::RedbStore;
pub use store::Store;

// =============================================================================
// RE-EXPORTS: Evaluation
// =============================================================================

pub use metrics::{DueState, MetricSnapshot};
pub use scoring::{
    Alert, AlertCategory, MaturityLevel, Pillar, PillarScore, RiskLevel, Severity,
    generate_alerts, score_pillars, weighted_overall,
};
pub use summary::{ExecutiveSummary, RiskDistribution, evaluate};
