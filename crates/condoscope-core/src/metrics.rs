//! # Metric Extractors
//!
//! Pure functions from (rows, today) to the counts and sums the pillar scorer
//! consumes. Nothing here is persisted; a [`MetricSnapshot`] is recomputed on
//! every evaluation pass.
//!
//! ## Date semantics
//!
//! | Relation to today | Classification |
//! |-------------------|----------------|
//! | strictly before   | overdue / expired |
//! | today ..= today + 30 days | expiring |
//! | later, or no date | neither |
//!
//! ## Ratios
//!
//! Every ratio guards its denominator: an empty denominator either yields a
//! neutral sub-score or is replaced by 1, so no NaN or infinity can escape.

use crate::dataset::Dataset;
use crate::primitives::{
    DOCUMENTATION_MIN_COUNT, EXPIRY_WINDOW_DAYS, NEUTRAL_SUBSCORE,
    RECENT_ANNOUNCEMENT_WINDOW_DAYS, RECENT_DECISION_WINDOW_DAYS,
};
use crate::records::{
    ChecklistStatus, DecisionStatus, MinutesStatus, PaymentStatus, Priority, RequestStatus,
    TransactionKind,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// DUE-DATE CLASSIFICATION
// =============================================================================

/// Where a due date falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    /// Strictly before today.
    Overdue,
    /// Today or within the expiry window.
    Expiring,
    /// Beyond the expiry window, or no date at all.
    Later,
}

impl DueState {
    /// Classify an optional due date.
    #[must_use]
    pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(due) = due else {
            return Self::Later;
        };
        let days_left = (due - today).num_days();
        if days_left < 0 {
            Self::Overdue
        } else if days_left <= EXPIRY_WINDOW_DAYS {
            Self::Expiring
        } else {
            Self::Later
        }
    }
}

/// Add two currency amounts, pinning an overflow to `±f64::MAX` so that
/// totals stay finite and serialize as numbers.
#[must_use]
pub fn saturating_add(total: f64, amount: f64) -> f64 {
    let sum = total + amount;
    if sum.is_finite() {
        sum
    } else {
        f64::MAX.copysign(sum)
    }
}

/// Whether `date` lies within the last `window_days` days (today included).
fn is_recent(date: Option<NaiveDate>, today: NaiveDate, window_days: i64) -> bool {
    date.is_some_and(|d| {
        let age = (today - d).num_days();
        (0..=window_days).contains(&age)
    })
}

// =============================================================================
// METRIC SNAPSHOT
// =============================================================================

/// Counts and sums derived from one tenant's rows for one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    // ----- finance -----
    /// Transactions that are not cancelled.
    pub active_transactions: usize,
    pub overdue_payments: usize,
    pub overdue_amount: f64,
    pub paid_income: f64,
    pub paid_expenses: f64,
    pub budget_planned: f64,
    pub budget_spent: f64,

    // ----- maintenance -----
    pub total_requests: usize,
    pub completed_requests: usize,
    pub open_requests: usize,
    pub urgent_requests: usize,

    // ----- contracts -----
    pub total_contracts: usize,
    pub active_contracts: usize,
    pub expiring_contracts: usize,
    pub expired_contracts: usize,

    // ----- compliance -----
    pub checklist_problems: usize,
    pub checklist_warnings: usize,
    pub expired_documents: usize,
    pub expiring_documents: usize,
    pub expired_policies: usize,
    pub expired_policy_coverage: f64,
    pub expiring_policies: usize,

    // ----- governance & transparency -----
    pub total_decisions: usize,
    pub approved_decisions: usize,
    pub recent_decisions: usize,
    pub published_minutes: usize,
    pub recent_announcements: usize,

    // ----- operations -----
    pub equipment_count: usize,
    pub supplier_count: usize,
    pub document_count: usize,
}

impl MetricSnapshot {
    /// Extract every metric from `rows` as of `today`.
    #[must_use]
    pub fn extract(rows: &Dataset, today: NaiveDate) -> Self {
        let mut m = Self::default();
        m.extract_finance(rows, today);
        m.extract_maintenance(rows);
        m.extract_contracts(rows, today);
        m.extract_compliance(rows, today);
        m.extract_governance(rows, today);
        m.equipment_count = rows.equipment.len();
        m.supplier_count = rows.suppliers.len();
        m.document_count = rows.documents.len();
        m
    }

    fn extract_finance(&mut self, rows: &Dataset, today: NaiveDate) {
        for t in &rows.transactions {
            if t.status == PaymentStatus::Cancelled {
                continue;
            }
            self.active_transactions += 1;

            let overdue = t.status.is_outstanding()
                && (t.status == PaymentStatus::Overdue
                    || DueState::classify(t.due_date, today) == DueState::Overdue);
            if overdue {
                self.overdue_payments += 1;
                self.overdue_amount = saturating_add(self.overdue_amount, t.amount);
            }

            if t.status == PaymentStatus::Paid {
                match t.kind {
                    TransactionKind::Income => {
                        self.paid_income = saturating_add(self.paid_income, t.amount);
                    }
                    TransactionKind::Expense => {
                        self.paid_expenses = saturating_add(self.paid_expenses, t.amount);
                    }
                    TransactionKind::Other => {}
                }
            }
        }

        for b in &rows.budgets {
            self.budget_planned = saturating_add(self.budget_planned, b.planned_amount);
            self.budget_spent = saturating_add(self.budget_spent, b.spent_amount);
        }
    }

    fn extract_maintenance(&mut self, rows: &Dataset) {
        for r in &rows.maintenance_requests {
            self.total_requests += 1;
            if r.status == RequestStatus::Completed {
                self.completed_requests += 1;
            }
            if r.status.is_open() {
                self.open_requests += 1;
                if r.priority == Priority::Urgent {
                    self.urgent_requests += 1;
                }
            }
        }
    }

    fn extract_contracts(&mut self, rows: &Dataset, today: NaiveDate) {
        for c in &rows.contracts {
            self.total_contracts += 1;
            if c.status.is_terminated() {
                continue;
            }
            match DueState::classify(c.end_date, today) {
                DueState::Overdue => self.expired_contracts += 1,
                state => {
                    if c.status == crate::records::ContractStatus::Active {
                        self.active_contracts += 1;
                        if state == DueState::Expiring {
                            self.expiring_contracts += 1;
                        }
                    }
                }
            }
        }
    }

    fn extract_compliance(&mut self, rows: &Dataset, today: NaiveDate) {
        for item in &rows.checklist_items {
            match item.status {
                ChecklistStatus::Problem => self.checklist_problems += 1,
                ChecklistStatus::Warning => self.checklist_warnings += 1,
                ChecklistStatus::Pending | ChecklistStatus::Ok | ChecklistStatus::Other => {}
            }
        }

        for d in &rows.documents {
            match DueState::classify(d.expires_on, today) {
                DueState::Overdue => self.expired_documents += 1,
                DueState::Expiring => self.expiring_documents += 1,
                DueState::Later => {}
            }
        }

        for p in &rows.insurance_policies {
            match DueState::classify(p.end_date, today) {
                DueState::Overdue => {
                    self.expired_policies += 1;
                    self.expired_policy_coverage =
                        saturating_add(self.expired_policy_coverage, p.coverage_amount);
                }
                DueState::Expiring => self.expiring_policies += 1,
                DueState::Later => {}
            }
        }
    }

    fn extract_governance(&mut self, rows: &Dataset, today: NaiveDate) {
        for d in &rows.decisions {
            self.total_decisions += 1;
            if d.status == DecisionStatus::Approved {
                self.approved_decisions += 1;
            }
            if is_recent(d.decided_on, today, RECENT_DECISION_WINDOW_DAYS) {
                self.recent_decisions += 1;
            }
        }

        self.published_minutes = rows
            .minutes
            .iter()
            .filter(|m| m.status == MinutesStatus::Published)
            .count();

        self.recent_announcements = rows
            .announcements
            .iter()
            .filter(|a| is_recent(a.published_on, today, RECENT_ANNOUNCEMENT_WINDOW_DAYS))
            .count();
    }

    // =========================================================================
    // DERIVED RATIOS (percent, 0..=100)
    // =========================================================================

    /// Approved share of all decisions; 0 when there are none.
    #[must_use]
    pub fn approval_rate(&self) -> f64 {
        if self.total_decisions == 0 {
            return 0.0;
        }
        percent(self.approved_decisions, self.total_decisions)
    }

    /// Completed share of all maintenance requests. An empty request list
    /// divides by 1 and therefore reads 0.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        percent(self.completed_requests, self.total_requests.max(1))
    }

    /// Active share of all contracts; 0 when there are none.
    #[must_use]
    pub fn active_contract_rate(&self) -> f64 {
        if self.total_contracts == 0 {
            return 0.0;
        }
        percent(self.active_contracts, self.total_contracts)
    }

    /// How closely spending tracks the budget: 100 within budget, falling by
    /// one point per percent of overrun, neutral without a budget.
    #[must_use]
    pub fn budget_adherence(&self) -> f64 {
        if self.budget_planned <= 0.0 {
            return NEUTRAL_SUBSCORE;
        }
        if self.budget_spent <= self.budget_planned {
            return 100.0;
        }
        let overrun = (self.budget_spent - self.budget_planned) / self.budget_planned * 100.0;
        (100.0 - overrun).max(0.0)
    }

    /// Share of transactions that are not overdue; neutral without any.
    #[must_use]
    pub fn payment_health(&self) -> f64 {
        if self.active_transactions == 0 {
            return NEUTRAL_SUBSCORE;
        }
        100.0 - percent(self.overdue_payments, self.active_transactions)
    }

    /// 100 when paid income covers paid expenses, proportionally less when
    /// it does not, neutral without any settled movement.
    #[must_use]
    pub fn cash_flow_balance(&self) -> f64 {
        if self.paid_income <= 0.0 && self.paid_expenses <= 0.0 {
            return NEUTRAL_SUBSCORE;
        }
        if self.paid_income >= self.paid_expenses {
            return 100.0;
        }
        self.paid_income / self.paid_expenses * 100.0
    }

    #[must_use]
    pub fn has_equipment(&self) -> bool {
        self.equipment_count > 0
    }

    #[must_use]
    pub fn has_documentation(&self) -> bool {
        self.document_count > DOCUMENTATION_MIN_COUNT
    }

    #[must_use]
    pub fn has_suppliers(&self) -> bool {
        self.supplier_count > 0
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64 * 100.0
}

// =============================================================================
// TESTS
// =============================================================================
