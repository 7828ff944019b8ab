//! Cycle difficulty weighting.
//!
//! A cycle that starts at setpoint and stays there proves very little; a
//! cycle that closes a 2 °C gap on a freezing night without overshooting
//! proves a lot. The weight scales how much a cycle counts toward confidence.

use ember_core::config::LearningConfig;
use ember_core::types::{CycleOutcome, InstallationType};

/// Tunable weighting constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightConstants {
    pub maintenance_base: f64,
    pub recovery_base: f64,
    /// Multiplier growth per °C of starting delta above the threshold.
    pub delta_slope: f64,
    pub delta_multiplier_cap: f64,
    pub overshoot_factor: f64,
    pub undershoot_factor: f64,
    pub high_duty_threshold: f64,
    pub high_duty_bonus: f64,
    pub cold_outdoor_threshold: f64,
    pub cold_outdoor_bonus: f64,
    pub night_setback_bonus: f64,
}

impl Default for WeightConstants {
    fn default() -> Self {
        Self {
            maintenance_base: 0.3,
            recovery_base: 1.0,
            delta_slope: 0.5,
            delta_multiplier_cap: 2.0,
            overshoot_factor: 0.7,
            undershoot_factor: 0.5,
            high_duty_threshold: 0.60,
            high_duty_bonus: 0.15,
            cold_outdoor_threshold: 5.0,
            cold_outdoor_bonus: 0.15,
            night_setback_bonus: 0.20,
        }
    }
}

impl From<&LearningConfig> for WeightConstants {
    fn from(config: &LearningConfig) -> Self {
        Self {
            maintenance_base: config.effective_maintenance_base(),
            recovery_base: config.effective_recovery_base(),
            high_duty_bonus: config.effective_high_duty_bonus(),
            cold_outdoor_bonus: config.effective_cold_outdoor_bonus(),
            night_setback_bonus: config.effective_night_setback_bonus(),
            ..Self::default()
        }
    }
}

/// Classifies cycles and assigns their weight for one installation type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleWeightCalculator {
    installation: InstallationType,
    constants: WeightConstants,
}

impl CycleWeightCalculator {
    pub fn new(installation: InstallationType) -> Self {
        Self::with_constants(installation, WeightConstants::default())
    }

    pub fn with_constants(installation: InstallationType, constants: WeightConstants) -> Self {
        Self {
            installation,
            constants,
        }
    }

    pub fn installation(&self) -> InstallationType {
        self.installation
    }

    pub fn constants(&self) -> &WeightConstants {
        &self.constants
    }

    pub fn recovery_threshold(&self, is_stable: bool) -> f64 {
        self.installation.recovery_threshold(is_stable)
    }

    pub fn is_recovery_cycle(&self, starting_delta: f64, is_stable: bool) -> bool {
        starting_delta >= self.recovery_threshold(is_stable)
    }

    /// Weight of a completed cycle.
    ///
    /// `effective_duty` is peak duty minus the committed-heat ratio, i.e. the
    /// part of the duty the controller actually asked for. Bonuses are added
    /// after the base/outcome product and are not scaled by it.
    pub fn calculate_weight(
        &self,
        starting_delta: f64,
        is_stable: bool,
        outcome: CycleOutcome,
        effective_duty: Option<f64>,
        outdoor_temp: Option<f64>,
        is_night_setback_recovery: bool,
    ) -> f64 {
        let c = &self.constants;
        let threshold = self.recovery_threshold(is_stable);
        let recovery = starting_delta >= threshold;

        let (base, delta_mult) = if recovery {
            let mult = (1.0 + (starting_delta - threshold) * c.delta_slope)
                .min(c.delta_multiplier_cap);
            (c.recovery_base, mult)
        } else {
            (c.maintenance_base, 1.0)
        };

        let outcome_factor = match outcome {
            CycleOutcome::Clean => 1.0,
            CycleOutcome::Overshoot => c.overshoot_factor,
            CycleOutcome::Undershoot => c.undershoot_factor,
        };

        let mut weight = base * delta_mult * outcome_factor;
        if effective_duty.is_some_and(|d| d > c.high_duty_threshold) {
            weight += c.high_duty_bonus;
        }
        if outdoor_temp.is_some_and(|t| t < c.cold_outdoor_threshold) {
            weight += c.cold_outdoor_bonus;
        }
        if is_night_setback_recovery {
            weight += c.night_setback_bonus;
        }
        weight
    }
}

/// Peak duty minus the share of it that was coasting heat, floored at zero.
pub fn effective_duty(peak_duty: f64, committed_heat_ratio: f64) -> f64 {
    (peak_duty - committed_heat_ratio).max(0.0)
}
