//! Building-level state shared by zones.

use ember_core::config::BuildingConfig;
use ember_delivery::{OutdoorSource, OutdoorTempFilter, SharedOutdoorFilter};

/// Owns the building's outdoor filter and is its only writer.
#[derive(Debug, Clone)]
pub struct Building {
    filter: SharedOutdoorFilter,
    tau_hours: f64,
    last_update: Option<f64>,
}

impl Building {
    pub fn new(config: &BuildingConfig) -> Self {
        let tau_hours = config.effective_outdoor_tau_hours();
        Self {
            filter: SharedOutdoorFilter::new(OutdoorTempFilter::with_tau_hours(tau_hours)),
            tau_hours,
            last_update: None,
        }
    }

    /// Feed a weather reading taken at monotonic time `now`.
    pub fn update_outdoor(&mut self, temp: f64, now: f64) -> f64 {
        let dt = self.last_update.map_or(0.0, |prev| now - prev);
        self.last_update = Some(now);
        self.filter.update(temp, dt)
    }

    pub fn outdoor_temp_lagged(&self) -> Option<f64> {
        self.filter.value()
    }

    /// Source for a new zone. A zone with its own sensor gets a private
    /// filter with the building's time constant and never reads the shared one.
    pub fn outdoor_source(&self, private_sensor: bool) -> OutdoorSource {
        if private_sensor {
            OutdoorSource::Private(OutdoorTempFilter::with_tau_hours(self.tau_hours))
        } else {
            OutdoorSource::Shared(self.filter.clone())
        }
    }
}
