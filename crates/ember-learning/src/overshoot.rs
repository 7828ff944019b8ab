//! Splitting overshoot into what the controller caused and what physics
//! had already committed.

use ember_core::types::CycleOutcome;

/// `(controllable, committed)` overshoot in °C.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OvershootSplit {
    pub controllable: f64,
    pub committed: f64,
}

impl OvershootSplit {
    pub fn total(&self) -> f64 {
        self.controllable + self.committed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OvershootDecomposer {
    /// Controllable overshoot above which a cycle counts as overshooting.
    pub overshoot_threshold: f64,
    /// Shortfall below setpoint at which a cycle counts as undershooting.
    pub undershoot_threshold: f64,
}

impl Default for OvershootDecomposer {
    fn default() -> Self {
        Self {
            overshoot_threshold: 0.2,
            undershoot_threshold: 0.3,
        }
    }
}

impl OvershootDecomposer {
    /// Split the overshoot at peak.
    ///
    /// `committed_heat_seconds` is the heat still in the pipe when setpoint
    /// was reached; multiplied by the heating rate (°C per second) it gives
    /// the rise that was already unavoidable.
    pub fn decompose(
        peak_temp: f64,
        setpoint: f64,
        committed_heat_seconds: f64,
        heating_rate: f64,
    ) -> OvershootSplit {
        let total = (peak_temp - setpoint).max(0.0);
        let committed = (committed_heat_seconds * heating_rate).max(0.0).min(total);
        OvershootSplit {
            controllable: total - committed,
            committed,
        }
    }

    /// Classify a cycle using only the controllable part of its overshoot.
    pub fn classify(&self, split: &OvershootSplit, peak_temp: f64, setpoint: f64) -> CycleOutcome {
        if split.controllable > self.overshoot_threshold {
            CycleOutcome::Overshoot
        } else if setpoint - peak_temp >= self.undershoot_threshold {
            CycleOutcome::Undershoot
        } else {
            CycleOutcome::Clean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_is_capped_by_total() {
        let split = OvershootDecomposer::decompose(21.3, 21.0, 600.0, 1.0 / 3600.0);
        assert!((split.committed - 0.3).abs() < 1e-9);
        assert!(split.controllable.abs() < 1e-9);
    }

    #[test]
    fn remainder_is_controllable() {
        // 300 s in the pipe at 1.2 °C/h commits 0.1 °C.
        let split = OvershootDecomposer::decompose(21.5, 21.0, 300.0, 1.2 / 3600.0);
        assert!((split.committed - 0.1).abs() < 1e-9);
        assert!((split.controllable - 0.4).abs() < 1e-9);
    }

    #[test]
    fn no_overshoot_below_setpoint() {
        let split = OvershootDecomposer::decompose(20.5, 21.0, 300.0, 0.001);
        assert_eq!(split, OvershootSplit::default());
    }

    #[test]
    fn committed_overshoot_is_not_penalized() {
        let d = OvershootDecomposer::default();
        let split = OvershootDecomposer::decompose(21.6, 21.0, 1200.0, 2.0 / 3600.0);
        assert_eq!(d.classify(&split, 21.6, 21.0), CycleOutcome::Clean);

        let split = OvershootDecomposer::decompose(21.6, 21.0, 0.0, 2.0 / 3600.0);
        assert_eq!(d.classify(&split, 21.6, 21.0), CycleOutcome::Overshoot);
    }

    #[test]
    fn shortfall_is_undershoot() {
        let d = OvershootDecomposer::default();
        let split = OvershootDecomposer::decompose(20.5, 21.0, 0.0, 0.0);
        assert_eq!(d.classify(&split, 20.5, 21.0), CycleOutcome::Undershoot);
    }
}
