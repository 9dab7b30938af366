//! # Alert Rules
//!
//! Threshold rules over a [`MetricSnapshot`]. Every rule is independent and
//! may fire together with any other. Alerts are recomputed on each pass and
//! are never stored.
//!
//! ## Rules
//!
//! | Condition | Pillar | Severity | Impact |
//! |-----------|--------|----------|--------|
//! | overdue payments > 0 | finance | alto if > 5, else medio | sum of overdue amounts |
//! | open requests > 5 | maintenance | alto if > 15, else medio | count × 200 |
//! | urgent requests > 0 | maintenance | alto | count × 1000 |
//! | expired contracts > 0 | contracts | alto | count × 2000 |
//! | expiring contracts > 0 | contracts | medio | count × 1000 |
//! | expired documents > 0 | compliance | alto | count × 1000 |
//! | expiring documents > 0 | compliance | medio | count × 500 |
//! | expired policies > 0 | compliance | critico | sum of coverage |
//! | expiring policies > 0 | compliance | alto | 0 |
//! | no recent decision, some decision | governance | baixo | 0 |

use super::pillar::Pillar;
use crate::metrics::{MetricSnapshot, saturating_add};
use crate::primitives::{
    EXPIRED_CONTRACT_COST, EXPIRED_DOCUMENT_COST, EXPIRING_CONTRACT_COST, EXPIRING_DOCUMENT_COST,
    OPEN_REQUEST_COST, OPEN_REQUESTS_ALERT_COUNT, OPEN_REQUESTS_HIGH_COUNT, OVERDUE_HIGH_COUNT,
    URGENT_REQUEST_COST,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// SEVERITY
// =============================================================================

/// Alert severity, most severe first.
///
/// Serialized with the dashboard's vocabulary (`critico` ... `info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "critico")]
    Critical,
    #[serde(rename = "alto")]
    High,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "baixo")]
    Low,
    #[serde(rename = "info")]
    Info,
}

impl Severity {
    /// Sort rank: 0 for critical up to 4 for info.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        }
    }

    /// Serialized name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Critical => "critico",
            Severity::High => "alto",
            Severity::Medium => "medio",
            Severity::Low => "baixo",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

/// What an alert is about. Together with the pillar it forms the alert id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    OverduePayments,
    MaintenanceBacklog,
    UrgentMaintenance,
    ExpiredContracts,
    ExpiringContracts,
    ExpiredDocuments,
    ExpiringDocuments,
    ExpiredInsurance,
    ExpiringInsurance,
    DecisionInactivity,
}

impl AlertCategory {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AlertCategory::OverduePayments => "overdue_payments",
            AlertCategory::MaintenanceBacklog => "maintenance_backlog",
            AlertCategory::UrgentMaintenance => "urgent_maintenance",
            AlertCategory::ExpiredContracts => "expired_contracts",
            AlertCategory::ExpiringContracts => "expiring_contracts",
            AlertCategory::ExpiredDocuments => "expired_documents",
            AlertCategory::ExpiringDocuments => "expiring_documents",
            AlertCategory::ExpiredInsurance => "expired_insurance",
            AlertCategory::ExpiringInsurance => "expiring_insurance",
            AlertCategory::DecisionInactivity => "decision_inactivity",
        }
    }

    /// The pillar that owns alerts of this category.
    #[must_use]
    pub fn pillar(&self) -> Pillar {
        match self {
            AlertCategory::OverduePayments => Pillar::Finance,
            AlertCategory::MaintenanceBacklog | AlertCategory::UrgentMaintenance => {
                Pillar::Maintenance
            }
            AlertCategory::ExpiredContracts | AlertCategory::ExpiringContracts => Pillar::Contracts,
            AlertCategory::ExpiredDocuments
            | AlertCategory::ExpiringDocuments
            | AlertCategory::ExpiredInsurance
            | AlertCategory::ExpiringInsurance => Pillar::Compliance,
            AlertCategory::DecisionInactivity => Pillar::Governance,
        }
    }
}

// =============================================================================
// ALERT
// =============================================================================

/// One generated alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub pillar: Pillar,
    pub category: AlertCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub action: String,
    /// Estimated financial exposure in currency units. May be zero.
    pub financial_impact: f64,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    fn new(
        category: AlertCategory,
        severity: Severity,
        title: &str,
        description: String,
        action: &str,
        financial_impact: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let pillar = category.pillar();
        Self {
            id: format!("{}-{}", pillar.name(), category.name()),
            pillar,
            category,
            severity,
            title: title.to_string(),
            description,
            action: action.to_string(),
            financial_impact,
            created_at,
        }
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Run every rule against `m` and return the alerts sorted by severity.
///
/// Rules fire in table order; equal severities keep that order.
#[must_use]
pub fn generate_alerts(m: &MetricSnapshot, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if m.overdue_payments > 0 {
        let severity = if m.overdue_payments > OVERDUE_HIGH_COUNT {
            Severity::High
        } else {
            Severity::Medium
        };
        alerts.push(Alert::new(
            AlertCategory::OverduePayments,
            severity,
            "Pagamentos em atraso",
            format!("{} pagamento(s) vencido(s) sem quitação", m.overdue_payments),
            "Revisar cobranças e renegociar pendências",
            m.overdue_amount,
            now,
        ));
    }

    if m.open_requests > OPEN_REQUESTS_ALERT_COUNT {
        let severity = if m.open_requests > OPEN_REQUESTS_HIGH_COUNT {
            Severity::High
        } else {
            Severity::Medium
        };
        alerts.push(Alert::new(
            AlertCategory::MaintenanceBacklog,
            severity,
            "Fila de manutenção acumulada",
            format!("{} chamado(s) de manutenção em aberto", m.open_requests),
            "Priorizar e distribuir os chamados pendentes",
            m.open_requests as f64 * OPEN_REQUEST_COST,
            now,
        ));
    }

    if m.urgent_requests > 0 {
        alerts.push(Alert::new(
            AlertCategory::UrgentMaintenance,
            Severity::High,
            "Manutenções urgentes pendentes",
            format!("{} chamado(s) urgente(s) sem conclusão", m.urgent_requests),
            "Acionar fornecedores para atendimento imediato",
            m.urgent_requests as f64 * URGENT_REQUEST_COST,
            now,
        ));
    }

    if m.expired_contracts > 0 {
        alerts.push(Alert::new(
            AlertCategory::ExpiredContracts,
            Severity::High,
            "Contratos vencidos",
            format!("{} contrato(s) vencido(s) ainda não encerrado(s)", m.expired_contracts),
            "Renovar ou encerrar formalmente os contratos",
            m.expired_contracts as f64 * EXPIRED_CONTRACT_COST,
            now,
        ));
    }

    if m.expiring_contracts > 0 {
        alerts.push(Alert::new(
            AlertCategory::ExpiringContracts,
            Severity::Medium,
            "Contratos próximos do vencimento",
            format!("{} contrato(s) vencem nos próximos 30 dias", m.expiring_contracts),
            "Iniciar renegociação dos contratos",
            m.expiring_contracts as f64 * EXPIRING_CONTRACT_COST,
            now,
        ));
    }

    if m.expired_documents > 0 {
        alerts.push(Alert::new(
            AlertCategory::ExpiredDocuments,
            Severity::High,
            "Documentos vencidos",
            format!("{} documento(s) com validade expirada", m.expired_documents),
            "Providenciar a renovação dos documentos",
            m.expired_documents as f64 * EXPIRED_DOCUMENT_COST,
            now,
        ));
    }

    if m.expiring_documents > 0 {
        alerts.push(Alert::new(
            AlertCategory::ExpiringDocuments,
            Severity::Medium,
            "Documentos próximos do vencimento",
            format!("{} documento(s) vencem nos próximos 30 dias", m.expiring_documents),
            "Agendar a renovação dos documentos",
            m.expiring_documents as f64 * EXPIRING_DOCUMENT_COST,
            now,
        ));
    }

    if m.expired_policies > 0 {
        alerts.push(Alert::new(
            AlertCategory::ExpiredInsurance,
            Severity::Critical,
            "Seguro vencido",
            format!("{} apólice(s) de seguro vencida(s)", m.expired_policies),
            "Contratar ou renovar a cobertura imediatamente",
            m.expired_policy_coverage,
            now,
        ));
    }

    if m.expiring_policies > 0 {
        alerts.push(Alert::new(
            AlertCategory::ExpiringInsurance,
            Severity::High,
            "Seguro próximo do vencimento",
            format!("{} apólice(s) vencem nos próximos 30 dias", m.expiring_policies),
            "Cotar a renovação das apólices",
            0.0,
            now,
        ));
    }

    if m.total_decisions > 0 && m.recent_decisions == 0 {
        alerts.push(Alert::new(
            AlertCategory::DecisionInactivity,
            Severity::Low,
            "Sem decisões recentes",
            "Nenhuma decisão registrada nos últimos 90 dias".to_string(),
            "Convocar assembleia para deliberar pendências",
            0.0,
            now,
        ));
    }

    sort_by_severity(&mut alerts);
    alerts
}

/// Stable sort, most severe first.
pub fn sort_by_severity(alerts: &mut [Alert]) {
    alerts.sort_by_key(|a| a.severity.rank());
}

/// Sum of every alert's financial impact, saturating at `f64::MAX`.
#[must_use]
pub fn total_impact(alerts: &[Alert]) -> f64 {
    alerts
        .iter()
        .fold(0.0, |total, a| saturating_add(total, a.financial_impact))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_718_409_600, 0).unwrap_or_default()
    }

    #[test]
    fn severity_serializes_to_dashboard_vocabulary() {
        let json = serde_json::to_string(&Severity::Critical).expect("serialize");
        assert_eq!(json, "\"critico\"");
        let back: Severity = serde_json::from_str("\"medio\"").expect("deserialize");
        assert_eq!(back, Severity::Medium);
    }

    #[test]
    fn no_conditions_no_alerts() {
        assert!(generate_alerts(&MetricSnapshot::default(), now()).is_empty());
    }

    #[test]
    fn overdue_severity_escalates_above_five() {
        let few = MetricSnapshot {
            overdue_payments: 5,
            overdue_amount: 100.0,
            ..MetricSnapshot::default()
        };
        let alerts = generate_alerts(&few, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[0].id, "finance-overdue_payments");

        let many = MetricSnapshot {
            overdue_payments: 6,
            ..few
        };
        assert_eq!(generate_alerts(&many, now())[0].severity, Severity::High);
    }

    #[test]
    fn backlog_needs_more_than_five_open_requests() {
        let five = MetricSnapshot {
            open_requests: 5,
            ..MetricSnapshot::default()
        };
        assert!(generate_alerts(&five, now()).is_empty());

        let sixteen = MetricSnapshot {
            open_requests: 16,
            ..MetricSnapshot::default()
        };
        let alerts = generate_alerts(&sixteen, now());
        assert_eq!(alerts[0].category, AlertCategory::MaintenanceBacklog);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].financial_impact, 3200.0);
    }

    #[test]
    fn sorted_with_stable_ties() {
        let m = MetricSnapshot {
            overdue_payments: 1,
            urgent_requests: 1,
            expired_contracts: 1,
            expiring_contracts: 1,
            expired_policies: 1,
            expired_policy_coverage: 5000.0,
            total_decisions: 1,
            ..MetricSnapshot::default()
        };
        let categories: Vec<_> = generate_alerts(&m, now())
            .iter()
            .map(|a| a.category)
            .collect();
        assert_eq!(
            categories,
            vec![
                AlertCategory::ExpiredInsurance,
                AlertCategory::UrgentMaintenance,
                AlertCategory::ExpiredContracts,
                AlertCategory::OverduePayments,
                AlertCategory::ExpiringContracts,
                AlertCategory::DecisionInactivity,
            ]
        );
    }

    #[test]
    fn impact_sums_alerts() {
        let m = MetricSnapshot {
            urgent_requests: 2,
            expiring_documents: 3,
            ..MetricSnapshot::default()
        };
        let alerts = generate_alerts(&m, now());
        assert_eq!(total_impact(&alerts), 2000.0 + 1500.0);
    }

    #[test]
    fn impact_stays_finite_on_huge_amounts() {
        let m = MetricSnapshot {
            overdue_payments: 1,
            overdue_amount: f64::MAX,
            expired_policies: 1,
            expired_policy_coverage: f64::MAX,
            ..MetricSnapshot::default()
        };
        let alerts = generate_alerts(&m, now());
        assert_eq!(alerts.len(), 2);

        let total = total_impact(&alerts);
        assert!(total.is_finite());
        assert_eq!(total, f64::MAX);
    }
}
