//! Top-level Ember configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BuildingConfig, DeliveryConfig, LearningConfig};
use crate::errors::ConfigError;
use crate::types::{EnergyRating, InstallationType};

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`EMBER_*`)
/// 2. Project config (`ember.toml` in the config root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmberConfig {
    pub delivery: DeliveryConfig,
    pub learning: LearningConfig,
    pub building: BuildingConfig,
}

impl EmberConfig {
    /// Load configuration from `root/ember.toml` plus environment overrides.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join("ember.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &EmberConfig) -> Result<(), ConfigError> {
        if let Some(period) = config.delivery.pwm_period_secs {
            if !(period.is_finite() && period > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "delivery.pwm_period_secs".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        for (field, value) in [
            ("delivery.valve_actuation_secs", config.delivery.valve_actuation_secs),
            ("delivery.transport_delay_secs", config.delivery.transport_delay_secs),
        ] {
            if let Some(v) = value {
                if !(v.is_finite() && v >= 0.0) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must be a non-negative number of seconds".to_string(),
                    });
                }
            }
        }
        if let Some(rate) = config.learning.diminishing_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::ValidationFailed {
                    field: "learning.diminishing_rate".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(gain) = config.learning.base_confidence_gain {
            if !(0.0..=1.0).contains(&gain) {
                return Err(ConfigError::ValidationFailed {
                    field: "learning.base_confidence_gain".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut EmberConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: EmberConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a `Some` value.
    fn merge(base: &mut EmberConfig, other: &EmberConfig) {
        // Delivery
        if other.delivery.installation_type.is_some() {
            base.delivery.installation_type = other.delivery.installation_type;
        }
        if other.delivery.pwm_period_secs.is_some() {
            base.delivery.pwm_period_secs = other.delivery.pwm_period_secs;
        }
        if other.delivery.valve_actuation_secs.is_some() {
            base.delivery.valve_actuation_secs = other.delivery.valve_actuation_secs;
        }
        if other.delivery.transport_delay_secs.is_some() {
            base.delivery.transport_delay_secs = other.delivery.transport_delay_secs;
        }
        if other.delivery.private_outdoor_sensor.is_some() {
            base.delivery.private_outdoor_sensor = other.delivery.private_outdoor_sensor;
        }

        // Learning
        let (b, o) = (&mut base.learning, &other.learning);
        for (dst, src) in [
            (&mut b.base_confidence_gain, o.base_confidence_gain),
            (&mut b.diminishing_rate, o.diminishing_rate),
            (&mut b.maintenance_base, o.maintenance_base),
            (&mut b.recovery_base, o.recovery_base),
            (&mut b.high_duty_bonus, o.high_duty_bonus),
            (&mut b.cold_outdoor_bonus, o.cold_outdoor_bonus),
            (&mut b.night_setback_bonus, o.night_setback_bonus),
            (&mut b.overshoot_threshold, o.overshoot_threshold),
            (&mut b.undershoot_threshold, o.undershoot_threshold),
        ] {
            if src.is_some() {
                *dst = src;
            }
        }

        // Building
        if other.building.energy_rating.is_some() {
            base.building.energy_rating = other.building.energy_rating;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `EMBER_DELIVERY_PWM_PERIOD_SECS`, `EMBER_BUILDING_ENERGY_RATING`, etc.
    fn apply_env_overrides(config: &mut EmberConfig) {
        if let Ok(val) = std::env::var("EMBER_DELIVERY_INSTALLATION_TYPE") {
            if let Ok(v) = val.parse::<InstallationType>() {
                config.delivery.installation_type = Some(v);
            }
        }
        if let Ok(val) = std::env::var("EMBER_DELIVERY_PWM_PERIOD_SECS") {
            if let Ok(v) = val.parse::<f64>() {
                config.delivery.pwm_period_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("EMBER_DELIVERY_VALVE_ACTUATION_SECS") {
            if let Ok(v) = val.parse::<f64>() {
                config.delivery.valve_actuation_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("EMBER_DELIVERY_TRANSPORT_DELAY_SECS") {
            if let Ok(v) = val.parse::<f64>() {
                config.delivery.transport_delay_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("EMBER_LEARNING_DIMINISHING_RATE") {
            if let Ok(v) = val.parse::<f64>() {
                config.learning.diminishing_rate = Some(v);
            }
        }
        if let Ok(val) = std::env::var("EMBER_BUILDING_ENERGY_RATING") {
            if let Ok(v) = val.parse::<EnergyRating>() {
                config.building.energy_rating = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
