//! Building-level configuration shared by every zone.

use serde::{Deserialize, Serialize};

use crate::types::EnergyRating;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BuildingConfig {
    /// Energy label driving the outdoor filter time constant. Unrated if unset.
    pub energy_rating: Option<EnergyRating>,
}

impl BuildingConfig {
    /// Outdoor EMA time constant in hours, defaulting to 4.0 when unrated.
    pub fn effective_outdoor_tau_hours(&self) -> f64 {
        EnergyRating::tau_hours_or_default(self.energy_rating)
    }
}
