//! # Row Records
//!
//! Typed representations of the rows an evaluation reads, one struct per
//! [`EntityKind`]. Status columns are classified into small enums at
//! normalisation time; unknown spellings land in an `Other` variant instead
//! of failing.
//!
//! Every record implements [`Record`], which ties it to its entity kind, its
//! tenant, its lenient JSON constructor and its slot in a [`Dataset`].

use crate::dataset::Dataset;
use crate::rows::{self, Row};
use crate::types::{CondominiumId, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

// =============================================================================
// RECORD TRAIT
// =============================================================================

/// Common behaviour of every row type.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The entity kind this record belongs to.
    const KIND: EntityKind;

    /// Row identifier (unique per tenant and kind).
    fn id(&self) -> &str;

    /// Owning condominium, if the row carries one.
    fn condominium_id(&self) -> Option<&str>;

    /// Build a record from a raw row. Never fails; `fallback_id` is used when
    /// the row has no identifier of its own.
    fn from_row(row: &Row, fallback_id: String) -> Self;

    /// The slot holding this record type inside a dataset.
    fn rows(dataset: &Dataset) -> &Vec<Self>;

    /// Mutable access to the slot holding this record type.
    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self>;

    /// Whether this row passes the tenant filter. `None` matches everything.
    fn belongs_to(&self, tenant: Option<&CondominiumId>) -> bool {
        match tenant {
            None => true,
            Some(t) => self.condominium_id() == Some(t.as_str()),
        }
    }
}

const ID_KEYS: &[&str] = &["id", "uuid"];
const TENANT_KEYS: &[&str] = &["condominium_id", "condominiumId", "condominio_id"];

fn row_id(row: &Row, fallback: String) -> String {
    rows::text(row, ID_KEYS).unwrap_or(fallback)
}

fn row_tenant(row: &Row) -> Option<String> {
    rows::text(row, TENANT_KEYS)
}

/// Implements the identity and dataset-slot plumbing shared by all records.
macro_rules! record_plumbing {
    ($kind:expr, $slot:ident) => {
        const KIND: EntityKind = $kind;

        fn id(&self) -> &str {
            &self.id
        }

        fn condominium_id(&self) -> Option<&str> {
            self.condominium_id.as_deref()
        }

        fn rows(dataset: &Dataset) -> &Vec<Self> {
            &dataset.$slot
        }

        fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
            &mut dataset.$slot
        }
    };
}

// =============================================================================
// STATUS CLASSIFICATIONS
// =============================================================================

/// Direction of a financial transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    #[default]
    Other,
}

impl TransactionKind {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "receita" | "income" | "entrada" | "credito" => Self::Income,
            "despesa" | "expense" | "saida" | "debito" => Self::Expense,
            _ => Self::Other,
        }
    }
}

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
    Cancelled,
    #[default]
    Other,
}

impl PaymentStatus {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "pago" | "paga" | "paid" | "quitado" | "recebido" | "liquidado" => Self::Paid,
            "pendente" | "pending" | "aberto" | "em_aberto" | "a_pagar" | "a_receber" => {
                Self::Pending
            }
            "atrasado" | "vencido" | "overdue" | "inadimplente" => Self::Overdue,
            "cancelado" | "cancelada" | "cancelled" | "canceled" | "estornado" => Self::Cancelled,
            _ => Self::Other,
        }
    }

    /// Still awaiting settlement.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

/// Lifecycle state of a service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Suspended,
    Closed,
    Cancelled,
    #[default]
    Other,
}

impl ContractStatus {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "ativo" | "ativa" | "active" | "vigente" => Self::Active,
            "suspenso" | "suspensa" | "suspended" => Self::Suspended,
            "encerrado" | "encerrada" | "finalizado" | "closed" | "terminated" => Self::Closed,
            "cancelado" | "cancelada" | "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other,
        }
    }

    /// Closed and cancelled contracts no longer bind the condominium.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

/// Result of a checklist inspection item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Ok,
    Pending,
    Warning,
    Problem,
    #[default]
    Other,
}

impl ChecklistStatus {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "ok" | "conforme" | "concluido" | "concluida" | "done" => Self::Ok,
            "pendente" | "pending" | "a_fazer" => Self::Pending,
            "atencao" | "warning" | "alerta" => Self::Warning,
            "problema" | "problem" | "nao_conforme" | "falha" => Self::Problem,
            _ => Self::Other,
        }
    }
}

/// Outcome of an assembly decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Approved,
    Rejected,
    Pending,
    #[default]
    Other,
}

impl DecisionStatus {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "aprovada" | "aprovado" | "approved" => Self::Approved,
            "rejeitada" | "rejeitado" | "reprovada" | "rejected" => Self::Rejected,
            "pendente" | "pending" | "em_votacao" | "voting" => Self::Pending,
            _ => Self::Other,
        }
    }
}

/// Publication state of assembly minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MinutesStatus {
    Published,
    Draft,
    #[default]
    Other,
}

impl MinutesStatus {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "publicada" | "publicado" | "published" | "aprovada" => Self::Published,
            "rascunho" | "draft" => Self::Draft,
            _ => Self::Other,
        }
    }
}

/// Progress of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
    #[default]
    Other,
}

impl RequestStatus {
    /// Classify a normalised label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "aberta" | "aberto" | "open" | "nova" | "novo" | "pendente" => Self::Open,
            "em_andamento" | "andamento" | "in_progress" | "em_execucao" => Self::InProgress,
            "concluida" | "concluido" | "completed" | "resolvida" | "fechada" | "closed"
            | "done" => Self::Completed,
            "cancelada" | "cancelado" | "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other,
        }
    }

    /// Not yet resolved. Unknown statuses are treated as unresolved.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Priority of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Classify a normalised label. Unknown priorities read as medium.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "baixa" | "low" => Self::Low,
            "alta" | "high" => Self::High,
            "urgente" | "urgent" | "emergencia" | "critica" => Self::Urgent,
            _ => Self::Medium,
        }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A receivable or payable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transaction {
    pub id: String,
    pub condominium_id: Option<String>,
    pub kind: TransactionKind,
    pub status: PaymentStatus,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl Record for Transaction {
    record_plumbing!(EntityKind::Transactions, transactions);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            kind: TransactionKind::from_label(&rows::label(row, &["type", "kind", "tipo"])),
            status: PaymentStatus::from_label(&rows::label(row, &["status"])),
            amount: rows::amount(row, &["amount", "valor", "value"]).abs(),
            due_date: rows::date(row, &["due_date", "dueDate", "data_vencimento"]),
            description: rows::text(row, &["description", "descricao"]),
        }
    }
}

/// Planned versus spent amount for one budget category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Budget {
    pub id: String,
    pub condominium_id: Option<String>,
    pub category: Option<String>,
    pub planned_amount: f64,
    pub spent_amount: f64,
}

impl Record for Budget {
    record_plumbing!(EntityKind::Budgets, budgets);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            category: rows::text(row, &["category", "categoria"]),
            planned_amount: rows::amount(
                row,
                &["planned_amount", "plannedAmount", "planned", "amount"],
            )
            .abs(),
            spent_amount: rows::amount(
                row,
                &["spent_amount", "spentAmount", "spent", "actual_amount", "actualAmount"],
            )
            .abs(),
        }
    }
}

/// A service contract with a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Contract {
    pub id: String,
    pub condominium_id: Option<String>,
    pub status: ContractStatus,
    pub end_date: Option<NaiveDate>,
    pub value: f64,
}

impl Record for Contract {
    record_plumbing!(EntityKind::Contracts, contracts);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            status: ContractStatus::from_label(&rows::label(row, &["status"])),
            end_date: rows::date(row, &["end_date", "endDate", "data_fim"]),
            value: rows::amount(row, &["value", "valor", "amount"]).abs(),
        }
    }
}

/// One item of a recurring inspection checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChecklistItem {
    pub id: String,
    pub condominium_id: Option<String>,
    pub status: ChecklistStatus,
    pub due_date: Option<NaiveDate>,
}

impl Record for ChecklistItem {
    record_plumbing!(EntityKind::ChecklistItems, checklist_items);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            status: ChecklistStatus::from_label(&rows::label(row, &["status"])),
            due_date: rows::date(row, &["due_date", "dueDate", "next_check", "nextCheck"]),
        }
    }
}

/// An assembly decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Decision {
    pub id: String,
    pub condominium_id: Option<String>,
    pub status: DecisionStatus,
    pub decided_on: Option<NaiveDate>,
}

impl Record for Decision {
    record_plumbing!(EntityKind::Decisions, decisions);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            status: DecisionStatus::from_label(&rows::label(row, &["status"])),
            decided_on: rows::date(
                row,
                &["decided_on", "decidedOn", "date", "created_at", "createdAt"],
            ),
        }
    }
}

/// Minutes of an assembly meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Minutes {
    pub id: String,
    pub condominium_id: Option<String>,
    pub status: MinutesStatus,
    pub meeting_date: Option<NaiveDate>,
}

impl Record for Minutes {
    record_plumbing!(EntityKind::Minutes, minutes);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            status: MinutesStatus::from_label(&rows::label(row, &["status"])),
            meeting_date: rows::date(row, &["meeting_date", "meetingDate", "date"]),
        }
    }
}

/// A maintenance request raised by residents or staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MaintenanceRequest {
    pub id: String,
    pub condominium_id: Option<String>,
    pub status: RequestStatus,
    pub priority: Priority,
}

impl Record for MaintenanceRequest {
    record_plumbing!(EntityKind::MaintenanceRequests, maintenance_requests);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            status: RequestStatus::from_label(&rows::label(row, &["status"])),
            priority: Priority::from_label(&rows::label(row, &["priority", "prioridade"])),
        }
    }
}

/// A registered piece of building equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Equipment {
    pub id: String,
    pub condominium_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl Record for Equipment {
    record_plumbing!(EntityKind::Equipment, equipment);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            name: rows::text(row, &["name", "nome"]),
            category: rows::text(row, &["category", "categoria"]),
        }
    }
}

/// A registered service supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Supplier {
    pub id: String,
    pub condominium_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl Record for Supplier {
    record_plumbing!(EntityKind::Suppliers, suppliers);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            name: rows::text(row, &["name", "nome"]),
            category: rows::text(row, &["category", "categoria"]),
        }
    }
}

/// A legal or technical document, optionally with an expiry date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    pub id: String,
    pub condominium_id: Option<String>,
    pub title: Option<String>,
    pub expires_on: Option<NaiveDate>,
}

impl Record for Document {
    record_plumbing!(EntityKind::Documents, documents);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            title: rows::text(row, &["title", "name", "titulo"]),
            expires_on: rows::date(
                row,
                &["expires_on", "expiresOn", "expiration_date", "expirationDate"],
            ),
        }
    }
}

/// An insurance policy covering the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InsurancePolicy {
    pub id: String,
    pub condominium_id: Option<String>,
    pub insurer: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub coverage_amount: f64,
}

impl Record for InsurancePolicy {
    record_plumbing!(EntityKind::InsurancePolicies, insurance_policies);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            insurer: rows::text(row, &["insurer", "seguradora"]),
            end_date: rows::date(row, &["end_date", "endDate", "expiration_date"]),
            coverage_amount: rows::amount(
                row,
                &["coverage_amount", "coverageAmount", "coverage"],
            )
            .abs(),
        }
    }
}

/// A notice published to residents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Announcement {
    pub id: String,
    pub condominium_id: Option<String>,
    pub title: Option<String>,
    pub published_on: Option<NaiveDate>,
}

impl Record for Announcement {
    record_plumbing!(EntityKind::Announcements, announcements);

    fn from_row(row: &Row, fallback_id: String) -> Self {
        Self {
            id: row_id(row, fallback_id),
            condominium_id: row_tenant(row),
            title: rows::text(row, &["title", "titulo"]),
            published_on: rows::date(
                row,
                &["published_on", "publishedOn", "created_at", "createdAt"],
            ),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
