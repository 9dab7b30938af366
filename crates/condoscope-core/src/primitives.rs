//! # Scoring Primitives
//!
//! Fixed constants of the executive evaluation.
//!
//! These values are compiled into the binary and are immutable at runtime:
//! time windows used by the extractors, score bounds and thresholds used by
//! the pillar scorer, and the per-item cost estimates used by the alert rules.

// =============================================================================
// TIME WINDOWS
// =============================================================================

/// A due date within this many days from today (inclusive) is "expiring".
///
/// Due today counts as expiring; due yesterday is overdue.
pub const EXPIRY_WINDOW_DAYS: i64 = 30;

/// Decisions taken within this many days count as recent governance activity.
pub const RECENT_DECISION_WINDOW_DAYS: i64 = 90;

/// Announcements published within this many days count as recent.
pub const RECENT_ANNOUNCEMENT_WINDOW_DAYS: i64 = 30;

// =============================================================================
// SCORE BOUNDS
// =============================================================================

/// Lowest score a pillar may report.
pub const SCORE_FLOOR: u8 = 20;

/// Highest score a pillar may report.
pub const SCORE_CEILING: u8 = 100;

/// Neutral sub-score used when a ratio has no data behind it.
pub const NEUTRAL_SUBSCORE: f64 = 50.0;

// =============================================================================
// LEVEL THRESHOLDS
// =============================================================================

/// Scores at or above this are low risk.
pub const LOW_RISK_THRESHOLD: u8 = 70;

/// Scores at or above this (and below `LOW_RISK_THRESHOLD`) are medium risk.
pub const MEDIUM_RISK_THRESHOLD: u8 = 40;

/// Maturity: "smart" at or above this score.
pub const SMART_THRESHOLD: u8 = 80;

/// Maturity: "structured" at or above this score.
pub const STRUCTURED_THRESHOLD: u8 = 60;

/// Maturity: "evolving" at or above this score.
pub const EVOLVING_THRESHOLD: u8 = 40;

// =============================================================================
// OPERATIONS PILLAR
// =============================================================================

/// More documents than this count as "documented operations".
pub const DOCUMENTATION_MIN_COUNT: usize = 5;

// =============================================================================
// ALERT THRESHOLDS & COST ESTIMATES
// =============================================================================

/// Overdue payments above this count escalate from medium to high.
pub const OVERDUE_HIGH_COUNT: usize = 5;

/// Open maintenance requests above this count raise a backlog alert.
pub const OPEN_REQUESTS_ALERT_COUNT: usize = 5;

/// Open maintenance requests above this count escalate the backlog to high.
pub const OPEN_REQUESTS_HIGH_COUNT: usize = 15;

/// Estimated cost per open maintenance request.
pub const OPEN_REQUEST_COST: f64 = 200.0;

/// Estimated cost per urgent maintenance request.
pub const URGENT_REQUEST_COST: f64 = 1000.0;

/// Estimated cost per expired contract.
pub const EXPIRED_CONTRACT_COST: f64 = 2000.0;

/// Estimated cost per contract about to expire.
pub const EXPIRING_CONTRACT_COST: f64 = 1000.0;

/// Estimated cost per expired document.
pub const EXPIRED_DOCUMENT_COST: f64 = 1000.0;

/// Estimated cost per document about to expire.
pub const EXPIRING_DOCUMENT_COST: f64 = 500.0;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of rows of one entity type accepted in a single dataset.
pub const MAX_DATASET_ROWS: usize = 100_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_ordered() {
        assert!(SCORE_FLOOR < MEDIUM_RISK_THRESHOLD);
        assert!(MEDIUM_RISK_THRESHOLD < LOW_RISK_THRESHOLD);
        assert!(EVOLVING_THRESHOLD < STRUCTURED_THRESHOLD);
        assert!(STRUCTURED_THRESHOLD < SMART_THRESHOLD);
        assert!(SMART_THRESHOLD <= SCORE_CEILING);
    }

    #[test]
    fn backlog_escalates_above_alert_threshold() {
        assert!(OPEN_REQUESTS_ALERT_COUNT < OPEN_REQUESTS_HIGH_COUNT);
    }
}
