//! Learning-status evaluation.
//!
//! A tier is reached only when confidence clears its threshold AND the
//! recovery-cycle floor for it (and every tier below) holds. Confidence from
//! easy cycles alone can never carry a zone past Collecting.

use ember_core::types::LearningStatus;
use serde::{Deserialize, Serialize};

use crate::contribution::ConfidenceContributionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: LearningStatus,
    /// Total confidence, 0 to 100.
    pub confidence_pct: f64,
}

impl StatusReport {
    pub fn tier(&self) -> u8 {
        self.status.tier()
    }
}

pub fn evaluate_status(tracker: &ConfidenceContributionTracker) -> StatusReport {
    let confidence_pct = tracker.total_confidence() * 100.0;
    let mut status = LearningStatus::Collecting;
    for candidate in [
        LearningStatus::Stable,
        LearningStatus::Tuned,
        LearningStatus::Optimized,
    ] {
        if confidence_pct >= candidate.confidence_threshold()
            && tracker.can_reach_tier(candidate.tier())
        {
            status = candidate;
        } else {
            break;
        }
    }
    StatusReport {
        status,
        confidence_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::types::InstallationType;

    #[test]
    fn confidence_without_recoveries_stays_collecting() {
        let mut t = ConfidenceContributionTracker::new(InstallationType::ForcedAir);
        t.apply_recovery_gain(0.99);
        let report = evaluate_status(&t);
        assert_eq!(report.status, LearningStatus::Collecting);
        assert!((report.confidence_pct - 99.0).abs() < 1e-9);
    }

    #[test]
    fn tier_follows_both_gates() {
        let mut t = ConfidenceContributionTracker::new(InstallationType::ForcedAir);
        t.apply_recovery_gain(0.75);
        for _ in 0..6 {
            t.add_recovery_cycle();
        }
        assert_eq!(evaluate_status(&t).status, LearningStatus::Stable);
        for _ in 0..4 {
            t.add_recovery_cycle();
        }
        assert_eq!(evaluate_status(&t).status, LearningStatus::Tuned);
        t.apply_recovery_gain(0.25);
        assert_eq!(evaluate_status(&t).status, LearningStatus::Optimized);
    }
}
