//! # Executive Summary
//!
//! The single outward artifact of an evaluation pass.
//!
//! ```text
//! TenantSnapshot ──extract──▶ MetricSnapshot ──score──▶ [PillarScore; 7]
//!                                   │                         │
//!                                   └──rules──▶ [Alert] ──────┴──▶ ExecutiveSummary
//! ```
//!
//! Evaluation is pure: the same snapshot and the same `now` always produce
//! the same summary.

use crate::metrics::MetricSnapshot;
use crate::scoring::{
    Alert, MaturityLevel, PillarScore, RiskLevel, generate_alerts, score_pillars, total_impact,
    weighted_overall,
};
use crate::source::{EntityCounts, TenantSnapshot};
use crate::types::CondominiumId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many pillars fall into each risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    #[must_use]
    pub fn from_pillars(pillars: &[PillarScore]) -> Self {
        let mut dist = Self::default();
        for p in pillars {
            match p.risk_level {
                RiskLevel::Low => dist.low += 1,
                RiskLevel::Medium => dist.medium += 1,
                RiskLevel::High => dist.high += 1,
            }
        }
        dist
    }
}

/// Result of one evaluation pass for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    /// Tenant the rows were filtered by (`None` = all rows).
    pub condominium_id: Option<CondominiumId>,
    pub overall_score: u8,
    pub maturity_level: MaturityLevel,
    pub pillars: Vec<PillarScore>,
    /// Sorted by severity, most severe first.
    pub alerts: Vec<Alert>,
    pub financial_impact: f64,
    pub risk_distribution: RiskDistribution,
    /// Raw row counts per entity type.
    pub metrics: EntityCounts,
    /// The derived metrics the pillars were scored from.
    pub indicators: MetricSnapshot,
    pub generated_at: DateTime<Utc>,
}

/// Evaluate one tenant snapshot as of `now`.
#[must_use]
pub fn evaluate(snapshot: &TenantSnapshot, now: DateTime<Utc>) -> ExecutiveSummary {
    let indicators = MetricSnapshot::extract(&snapshot.rows, now.date_naive());
    let pillars = score_pillars(&indicators);
    let alerts = generate_alerts(&indicators, now);
    let overall_score = weighted_overall(&pillars);

    ExecutiveSummary {
        condominium_id: snapshot.condominium_id.clone(),
        overall_score,
        maturity_level: MaturityLevel::from_score(overall_score),
        risk_distribution: RiskDistribution::from_pillars(&pillars),
        financial_impact: total_impact(&alerts),
        metrics: EntityCounts::from_dataset(&snapshot.rows),
        pillars,
        alerts,
        indicators,
        generated_at: now,
    }
}

// =============================================================================
// TESTS
// =============================================================================
