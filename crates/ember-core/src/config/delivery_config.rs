//! Heat-delivery configuration for one zone.

use serde::{Deserialize, Serialize};

use crate::types::InstallationType;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Emitter type. Default: radiator.
    pub installation_type: Option<InstallationType>,
    /// PWM period in seconds. Default: 900.
    pub pwm_period_secs: Option<f64>,
    /// Valve/damper full travel time in seconds. Default: 0.
    pub valve_actuation_secs: Option<f64>,
    /// Pipe transport delay in seconds. Default: 0.
    pub transport_delay_secs: Option<f64>,
    /// Zone has its own outdoor sensor and ignores the building filter.
    pub private_outdoor_sensor: Option<bool>,
}

impl DeliveryConfig {
    pub fn effective_installation_type(&self) -> InstallationType {
        self.installation_type.unwrap_or(InstallationType::Radiator)
    }

    pub fn effective_pwm_period_secs(&self) -> f64 {
        self.pwm_period_secs.unwrap_or(900.0)
    }

    pub fn effective_valve_actuation_secs(&self) -> f64 {
        self.valve_actuation_secs.unwrap_or(0.0)
    }

    pub fn effective_transport_delay_secs(&self) -> f64 {
        self.transport_delay_secs.unwrap_or(0.0)
    }

    pub fn effective_private_outdoor_sensor(&self) -> bool {
        self.private_outdoor_sensor.unwrap_or(false)
    }
}
