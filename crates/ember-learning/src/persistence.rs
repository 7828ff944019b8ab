//! Versioned learning snapshot.
//!
//! Schema history:
//! - v1: `tracker.maintenance_contribution`
//! - v2: adds `tracker.heating_rate_contribution`, `tracker.recovery_cycle_count`
//! - v3: adds `tracker.recovery_contribution` and `heating_rate_bins`
//!
//! Fields missing from an older version load as zero / empty.

use ember_core::constants::SNAPSHOT_SCHEMA_VERSION;
use ember_core::errors::PersistenceError;
use ember_core::types::InstallationType;
use serde::{Deserialize, Serialize};

use crate::contribution::{ConfidenceContributionTracker, ContributionState};
use crate::heating_rate::{BinRecord, HeatingRateLearner};

fn legacy_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSnapshot {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub tracker: ContributionState,
    #[serde(default)]
    pub heating_rate_bins: Vec<BinRecord>,
}

impl Default for LearningSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            tracker: ContributionState::default(),
            heating_rate_bins: Vec::new(),
        }
    }
}

impl LearningSnapshot {
    pub fn capture(tracker: &ConfidenceContributionTracker, learner: &HeatingRateLearner) -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            tracker: tracker.state(),
            heating_rate_bins: learner.to_records(),
        }
    }

    /// Rebuild tracker and learner for `installation`.
    pub fn restore(
        &self,
        installation: InstallationType,
        diminishing_rate: f64,
    ) -> (ConfidenceContributionTracker, HeatingRateLearner) {
        let tracker = ConfidenceContributionTracker::from_state(installation, self.tracker)
            .with_diminishing_rate(diminishing_rate);
        let learner = HeatingRateLearner::from_records(installation, &self.heating_rate_bins);
        (tracker, learner)
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Serialize {
            message: e.to_string(),
        })
    }

    /// Strict parse: malformed JSON and snapshots from a newer schema are
    /// errors. Older schemas are migrated.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version > SNAPSHOT_SCHEMA_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(snapshot.migrated())
    }

    /// Lenient parse for the control path. Never fails: malformed data
    /// yields a zero snapshot, newer schemas keep the fields this version
    /// understands.
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(snapshot) => snapshot,
            Err(PersistenceError::UnsupportedVersion { found, supported }) => {
                tracing::warn!(
                    found,
                    supported,
                    "snapshot from a newer schema, loading known fields only"
                );
                serde_json::from_str::<Self>(json)
                    .map(|s| Self {
                        version: SNAPSHOT_SCHEMA_VERSION,
                        ..s
                    })
                    .unwrap_or_default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable learning snapshot");
                Self::default()
            }
        }
    }

    fn migrated(self) -> Self {
        if self.version < SNAPSHOT_SCHEMA_VERSION {
            tracing::info!(
                from = self.version,
                to = SNAPSHOT_SCHEMA_VERSION,
                "migrating learning snapshot"
            );
        }
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_version_is_v1() {
        let s = LearningSnapshot::from_json(r#"{"tracker":{"maintenance_contribution":0.2}}"#)
            .unwrap();
        assert_eq!(s.version, SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(s.tracker.maintenance_contribution, 0.2);
        assert_eq!(s.tracker.recovery_cycle_count, 0);
        assert!(s.heating_rate_bins.is_empty());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = LearningSnapshot::from_json("not json").unwrap_err();
        assert!(matches!(err, PersistenceError::Malformed { .. }));
        assert_eq!(LearningSnapshot::load_or_default("not json"), LearningSnapshot::default());
    }

    #[test]
    fn future_version_strict_vs_lenient() {
        let json = r#"{"version":9,"tracker":{"recovery_cycle_count":4},"extra":true}"#;
        assert!(matches!(
            LearningSnapshot::from_json(json),
            Err(PersistenceError::UnsupportedVersion { found: 9, .. })
        ));
        let s = LearningSnapshot::load_or_default(json);
        assert_eq!(s.tracker.recovery_cycle_count, 4);
        assert_eq!(s.version, SNAPSHOT_SCHEMA_VERSION);
    }
}
