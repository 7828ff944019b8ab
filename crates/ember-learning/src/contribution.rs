//! Capped confidence accumulation.
//!
//! Maintenance cycles (already near setpoint) are cheap to collect, so their
//! contribution is capped and anything beyond the cap is heavily diminished.
//! Heating-rate consistency has a hard cap. Recovery cycles are uncapped but
//! also counted: tiers 1 and 2 need a minimum number of them, so a zone idling
//! at setpoint can never reach full trust on maintenance data alone.

use ember_core::types::InstallationType;
use serde::{Deserialize, Serialize};

/// Persisted part of the tracker. Fields missing from older snapshots load
/// as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionState {
    pub maintenance_contribution: f64,
    pub heating_rate_contribution: f64,
    pub recovery_cycle_count: u32,
    pub recovery_contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceContributionTracker {
    installation: InstallationType,
    diminishing_rate: f64,
    state: ContributionState,
}

impl ConfidenceContributionTracker {
    pub const DEFAULT_DIMINISHING_RATE: f64 = 0.10;

    pub fn new(installation: InstallationType) -> Self {
        Self::from_state(installation, ContributionState::default())
    }

    /// Restore persisted state. Non-finite or negative values load as zero and
    /// the heating-rate contribution is clamped to this type's cap.
    pub fn from_state(installation: InstallationType, state: ContributionState) -> Self {
        let mut state = sanitize(state);
        state.heating_rate_contribution = state
            .heating_rate_contribution
            .min(installation.heating_rate_cap());
        Self {
            installation,
            diminishing_rate: Self::DEFAULT_DIMINISHING_RATE,
            state,
        }
    }

    pub fn with_diminishing_rate(mut self, rate: f64) -> Self {
        self.diminishing_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn state(&self) -> ContributionState {
        self.state
    }

    pub fn installation(&self) -> InstallationType {
        self.installation
    }

    pub fn maintenance_cap(&self) -> f64 {
        self.installation.maintenance_cap()
    }

    pub fn heating_rate_cap(&self) -> f64 {
        self.installation.heating_rate_cap()
    }

    pub fn maintenance_contribution(&self) -> f64 {
        self.state.maintenance_contribution
    }

    pub fn heating_rate_contribution(&self) -> f64 {
        self.state.heating_rate_contribution
    }

    pub fn recovery_contribution(&self) -> f64 {
        self.state.recovery_contribution
    }

    pub fn recovery_cycle_count(&self) -> u32 {
        self.state.recovery_cycle_count
    }

    /// Apply a maintenance-cycle gain and return what was actually added.
    ///
    /// Up to the cap the gain applies in full. The overflow applies at the
    /// diminishing rate, further scaled by how much of the soft band above
    /// the cap (`cap * diminishing_rate` wide) is still free. Repeated gains at
    /// the cap therefore shrink geometrically toward the band's ceiling
    /// instead of stopping dead or growing without bound.
    pub fn apply_maintenance_gain(&mut self, gain: f64) -> f64 {
        if !(gain > 0.0) {
            return 0.0;
        }
        let cap = self.maintenance_cap();
        let current = self.state.maintenance_contribution;

        let room = (cap - current).max(0.0);
        let full = gain.min(room);
        let overflow = gain - full;

        let mut applied = full;
        if overflow > 0.0 {
            let band = cap * self.diminishing_rate;
            if band > 0.0 {
                let excess = (current + full - cap).max(0.0);
                let band_room = (band - excess).max(0.0);
                let diminished = overflow * self.diminishing_rate * (band_room / band);
                applied += diminished.min(band_room);
            }
        }

        self.state.maintenance_contribution = current + applied;
        applied
    }

    /// Apply a heating-rate gain under a hard cap; overflow is dropped.
    pub fn apply_heating_rate_gain(&mut self, gain: f64) -> f64 {
        if !(gain > 0.0) {
            return 0.0;
        }
        let room = self.heating_rate_cap() - self.state.heating_rate_contribution;
        if room <= 0.0 {
            return 0.0;
        }
        let applied = gain.min(room);
        self.state.heating_rate_contribution += applied;
        applied
    }

    /// Raise the heating-rate contribution toward `target` (never lowers it).
    pub fn raise_heating_rate_to(&mut self, target: f64) -> f64 {
        self.apply_heating_rate_gain(target - self.state.heating_rate_contribution)
    }

    /// Uncapped gain from a recovery cycle.
    pub fn apply_recovery_gain(&mut self, gain: f64) -> f64 {
        if !(gain > 0.0) {
            return 0.0;
        }
        self.state.recovery_contribution += gain;
        gain
    }

    pub fn add_recovery_cycle(&mut self) {
        self.state.recovery_cycle_count = self.state.recovery_cycle_count.saturating_add(1);
    }

    /// Explicit external rollback (e.g. tuning reverted): recovery evidence
    /// gathered under the old tuning no longer counts.
    pub fn rollback(&mut self) {
        tracing::info!(
            recovery_cycles = self.state.recovery_cycle_count,
            "confidence rollback: clearing recovery evidence"
        );
        self.state.recovery_cycle_count = 0;
        self.state.recovery_contribution = 0.0;
    }

    /// Whether the recovery-cycle floor for `tier` is met. Tier 0 and tiers
    /// 3+ have no cycle requirement.
    pub fn can_reach_tier(&self, tier: u8) -> bool {
        let req = self.installation.tier_requirements();
        match tier {
            1 => self.state.recovery_cycle_count >= req.tier1_recovery_cycles,
            2 => self.state.recovery_cycle_count >= req.tier2_recovery_cycles,
            _ => true,
        }
    }

    /// Sum of all sources, clamped to `[0, 1]`.
    pub fn total_confidence(&self) -> f64 {
        (self.state.recovery_contribution
            + self.state.maintenance_contribution
            + self.state.heating_rate_contribution)
            .clamp(0.0, 1.0)
    }
}

fn sanitize(mut state: ContributionState) -> ContributionState {
    for v in [
        &mut state.maintenance_contribution,
        &mut state.heating_rate_contribution,
        &mut state.recovery_contribution,
    ] {
        if !v.is_finite() || *v < 0.0 {
            *v = 0.0;
        }
    }
    state
}
