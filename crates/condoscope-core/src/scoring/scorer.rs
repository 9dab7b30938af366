//! # Pillar Scorer
//!
//! One formula per pillar over a [`MetricSnapshot`]. The formulas return raw
//! values; clamping to `[20, 100]` happens once, in [`PillarScore::new`].

use super::pillar::{Pillar, PillarScore};
use crate::metrics::MetricSnapshot;
use crate::primitives::{NEUTRAL_SUBSCORE, SCORE_CEILING, SCORE_FLOOR};

/// Contracts score when no contract exists at all.
const NO_CONTRACTS_SCORE: f64 = 30.0;

/// Score every pillar, in [`Pillar::ALL`] order.
#[must_use]
pub fn score_pillars(m: &MetricSnapshot) -> Vec<PillarScore> {
    Pillar::ALL
        .iter()
        .map(|pillar| PillarScore::new(*pillar, raw_score(*pillar, m)))
        .collect()
}

/// The unclamped formula value of one pillar.
#[must_use]
pub fn raw_score(pillar: Pillar, m: &MetricSnapshot) -> f64 {
    match pillar {
        Pillar::Governance => governance(m),
        Pillar::Finance => finance(m),
        Pillar::Maintenance => maintenance(m),
        Pillar::Contracts => contracts(m),
        Pillar::Compliance => compliance(m),
        Pillar::Operations => operations(m),
        Pillar::Transparency => transparency(m),
    }
}

fn governance(m: &MetricSnapshot) -> f64 {
    let minutes = m.published_minutes as f64;
    if m.total_decisions > 0 {
        40.0 + m.approval_rate() * 0.3 + minutes * 5.0 + m.recent_decisions as f64 * 10.0
    } else if m.published_minutes > 0 {
        60.0 + minutes * 5.0
    } else {
        NEUTRAL_SUBSCORE
    }
}

fn finance(m: &MetricSnapshot) -> f64 {
    0.4 * m.budget_adherence() + 0.3 * m.payment_health() + 0.3 * m.cash_flow_balance()
}

fn maintenance(m: &MetricSnapshot) -> f64 {
    let penalized = m.completion_rate() - m.urgent_requests as f64 * 5.0;
    penalized.max(f64::from(SCORE_FLOOR))
}

fn contracts(m: &MetricSnapshot) -> f64 {
    if m.total_contracts == 0 {
        return NO_CONTRACTS_SCORE;
    }
    m.active_contract_rate()
        - m.expiring_contracts as f64 * 10.0
        - m.expired_contracts as f64 * 20.0
}

fn compliance(m: &MetricSnapshot) -> f64 {
    100.0 - m.checklist_problems as f64 * 15.0 - m.checklist_warnings as f64 * 5.0
}

fn operations(m: &MetricSnapshot) -> f64 {
    let flag = |present: bool| if present { 20.0 } else { 0.0 };
    40.0 + flag(m.has_equipment()) + flag(m.has_documentation()) + flag(m.has_suppliers())
}

fn transparency(m: &MetricSnapshot) -> f64 {
    let raw = 30.0 + m.recent_announcements as f64 * 15.0 + m.published_minutes as f64 * 10.0;
    raw.min(f64::from(SCORE_CEILING))
}

// =============================================================================
// TESTS
// =============================================================================
