//! # Pillars
//!
//! The seven fixed assessment dimensions, their weights and the labels
//! derived from a clamped score.
//!
//! | Pillar | Weight |
//! |--------|--------|
//! | governance | 20 |
//! | finance | 20 |
//! | maintenance | 20 |
//! | contracts | 15 |
//! | compliance | 15 |
//! | operations | 5 |
//! | transparency | 5 |

use crate::primitives::{
    EVOLVING_THRESHOLD, LOW_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, SCORE_CEILING, SCORE_FLOOR,
    SMART_THRESHOLD, STRUCTURED_THRESHOLD,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// PILLAR ENUM
// =============================================================================

/// One of the seven assessment dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Governance,
    Finance,
    Maintenance,
    Contracts,
    Compliance,
    Operations,
    Transparency,
}

impl Pillar {
    /// Every pillar, in reporting order.
    pub const ALL: [Pillar; 7] = [
        Pillar::Governance,
        Pillar::Finance,
        Pillar::Maintenance,
        Pillar::Contracts,
        Pillar::Compliance,
        Pillar::Operations,
        Pillar::Transparency,
    ];

    /// Fixed importance weight. The seven weights sum to 100.
    #[must_use]
    pub fn weight(&self) -> u8 {
        match self {
            Pillar::Governance | Pillar::Finance | Pillar::Maintenance => 20,
            Pillar::Contracts | Pillar::Compliance => 15,
            Pillar::Operations | Pillar::Transparency => 5,
        }
    }

    /// Machine name, as serialized.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Pillar::Governance => "governance",
            Pillar::Finance => "finance",
            Pillar::Maintenance => "maintenance",
            Pillar::Contracts => "contracts",
            Pillar::Compliance => "compliance",
            Pillar::Operations => "operations",
            Pillar::Transparency => "transparency",
        }
    }

    /// Display label shown on the dashboard.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Pillar::Governance => "Governança",
            Pillar::Finance => "Financeiro",
            Pillar::Maintenance => "Manutenção",
            Pillar::Contracts => "Contratos",
            Pillar::Compliance => "Conformidade",
            Pillar::Operations => "Operações",
            Pillar::Transparency => "Transparência",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// RISK & MATURITY
// =============================================================================

/// Risk band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `>= 70` low, `>= 40` medium, else high.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score >= LOW_RISK_THRESHOLD {
            RiskLevel::Low
        } else if score >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Maturity label of a score. Ordered from least to most mature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Beginner,
    Evolving,
    Structured,
    Smart,
}

impl MaturityLevel {
    /// `>= 80` smart, `>= 60` structured, `>= 40` evolving, else beginner.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score >= SMART_THRESHOLD {
            MaturityLevel::Smart
        } else if score >= STRUCTURED_THRESHOLD {
            MaturityLevel::Structured
        } else if score >= EVOLVING_THRESHOLD {
            MaturityLevel::Evolving
        } else {
            MaturityLevel::Beginner
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MaturityLevel::Beginner => "beginner",
            MaturityLevel::Evolving => "evolving",
            MaturityLevel::Structured => "structured",
            MaturityLevel::Smart => "smart",
        }
    }
}

impl std::fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// CLAMPING
// =============================================================================

/// Round a raw formula value and clamp it into `[SCORE_FLOOR, SCORE_CEILING]`.
///
/// Non-finite input reads as the floor.
#[must_use]
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return SCORE_FLOOR;
    }
    let clamped = raw.round().clamp(f64::from(SCORE_FLOOR), f64::from(SCORE_CEILING));
    // In range 20..=100 after the clamp above.
    clamped as u8
}

// =============================================================================
// PILLAR SCORE
// =============================================================================

/// The clamped score of one pillar with its derived labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarScore {
    pub name: Pillar,
    pub label: String,
    pub score: u8,
    pub weight: u8,
    pub risk_level: RiskLevel,
    pub maturity: MaturityLevel,
}

impl PillarScore {
    /// Clamp `raw` and derive the labels.
    #[must_use]
    pub fn new(pillar: Pillar, raw: f64) -> Self {
        let score = clamp_score(raw);
        Self {
            name: pillar,
            label: pillar.label().to_string(),
            score,
            weight: pillar.weight(),
            risk_level: RiskLevel::from_score(score),
            maturity: MaturityLevel::from_score(score),
        }
    }
}

/// Integer-rounded weighted average of pillar scores.
///
/// Weights are normalised by their sum, so a partial list still averages
/// correctly; an empty list yields the floor.
#[must_use]
pub fn weighted_overall(pillars: &[PillarScore]) -> u8 {
    let total_weight: u32 = pillars.iter().map(|p| u32::from(p.weight)).sum();
    if total_weight == 0 {
        return SCORE_FLOOR;
    }
    let weighted: u32 = pillars
        .iter()
        .map(|p| u32::from(p.score) * u32::from(p.weight))
        .sum();
    clamp_score(f64::from(weighted) / f64::from(total_weight))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_100() {
        let total: u32 = Pillar::ALL.iter().map(|p| u32::from(p.weight())).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_score(-40.0), 20);
        assert_eq!(clamp_score(19.4), 20);
        assert_eq!(clamp_score(54.5), 55);
        assert_eq!(clamp_score(250.0), 100);
        assert_eq!(clamp_score(f64::NAN), 20);
        assert_eq!(clamp_score(f64::INFINITY), 20);
    }

    #[test]
    fn risk_thresholds() {
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::High);
    }

    #[test]
    fn maturity_thresholds() {
        assert_eq!(MaturityLevel::from_score(80), MaturityLevel::Smart);
        assert_eq!(MaturityLevel::from_score(79), MaturityLevel::Structured);
        assert_eq!(MaturityLevel::from_score(60), MaturityLevel::Structured);
        assert_eq!(MaturityLevel::from_score(59), MaturityLevel::Evolving);
        assert_eq!(MaturityLevel::from_score(40), MaturityLevel::Evolving);
        assert_eq!(MaturityLevel::from_score(20), MaturityLevel::Beginner);
    }

    #[test]
    fn pillar_score_serializes_camel_case() {
        let score = PillarScore::new(Pillar::Contracts, 30.0);
        let json = serde_json::to_value(&score).expect("serialize");
        assert_eq!(json["name"], "contracts");
        assert_eq!(json["riskLevel"], "high");
        assert_eq!(json["maturity"], "beginner");
        assert_eq!(json["weight"], 15);
    }

    #[test]
    fn overall_rounds_weighted_average() {
        let pillars: Vec<_> = Pillar::ALL
            .iter()
            .zip([50.0, 50.0, 20.0, 30.0, 100.0, 40.0, 30.0])
            .map(|(p, raw)| PillarScore::new(*p, raw))
            .collect();
        assert_eq!(weighted_overall(&pillars), 47);
        assert_eq!(weighted_overall(&[]), 20);
    }
}
