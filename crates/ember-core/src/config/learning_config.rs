//! Learning configuration. Every value here is an empirically tuned
//! constant, exposed so installations can adjust it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LearningConfig {
    /// Confidence gained by a cycle of weight 1.0. Default: 0.05.
    pub base_confidence_gain: Option<f64>,
    /// Rate applied to maintenance gain beyond the cap. Default: 0.10.
    pub diminishing_rate: Option<f64>,
    /// Base weight of a maintenance cycle. Default: 0.3.
    pub maintenance_base: Option<f64>,
    /// Base weight of a recovery cycle. Default: 1.0.
    pub recovery_base: Option<f64>,
    /// Bonus when effective duty exceeds 60%. Default: 0.15.
    pub high_duty_bonus: Option<f64>,
    /// Bonus when outdoor temperature is below 5 °C. Default: 0.15.
    pub cold_outdoor_bonus: Option<f64>,
    /// Bonus for night-setback recovery cycles. Default: 0.20.
    pub night_setback_bonus: Option<f64>,
    /// Controllable overshoot (°C) beyond which a cycle counts as overshoot. Default: 0.2.
    pub overshoot_threshold: Option<f64>,
    /// Shortfall below setpoint (°C) at which a cycle counts as undershoot. Default: 0.3.
    pub undershoot_threshold: Option<f64>,
}

impl LearningConfig {
    pub fn effective_base_confidence_gain(&self) -> f64 {
        self.base_confidence_gain.unwrap_or(0.05)
    }

    pub fn effective_diminishing_rate(&self) -> f64 {
        self.diminishing_rate.unwrap_or(0.10)
    }

    pub fn effective_maintenance_base(&self) -> f64 {
        self.maintenance_base.unwrap_or(0.3)
    }

    pub fn effective_recovery_base(&self) -> f64 {
        self.recovery_base.unwrap_or(1.0)
    }

    pub fn effective_high_duty_bonus(&self) -> f64 {
        self.high_duty_bonus.unwrap_or(0.15)
    }

    pub fn effective_cold_outdoor_bonus(&self) -> f64 {
        self.cold_outdoor_bonus.unwrap_or(0.15)
    }

    pub fn effective_night_setback_bonus(&self) -> f64 {
        self.night_setback_bonus.unwrap_or(0.20)
    }

    pub fn effective_overshoot_threshold(&self) -> f64 {
        self.overshoot_threshold.unwrap_or(0.2)
    }

    pub fn effective_undershoot_threshold(&self) -> f64 {
        self.undershoot_threshold.unwrap_or(0.3)
    }
}
