use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of heat emitter a zone drives. Determines every per-type learning
/// constant: slow, high-mass systems see a weak per-cycle signal and lean
/// on heating-rate evidence instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationType {
    FloorHydronic,
    Radiator,
    Convector,
    ForcedAir,
}

/// Minimum recovery cycles for tier 1 (stable) and tier 2 (tuned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRequirements {
    pub tier1_recovery_cycles: u32,
    pub tier2_recovery_cycles: u32,
}

impl InstallationType {
    pub const ALL: [InstallationType; 4] = [
        Self::FloorHydronic,
        Self::Radiator,
        Self::Convector,
        Self::ForcedAir,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FloorHydronic => "floor_hydronic",
            Self::Radiator => "radiator",
            Self::Convector => "convector",
            Self::ForcedAir => "forced_air",
        }
    }

    /// Cap on confidence earned from maintenance cycles.
    pub fn maintenance_cap(self) -> f64 {
        match self {
            Self::FloorHydronic => 0.25,
            Self::Radiator => 0.30,
            Self::Convector | Self::ForcedAir => 0.35,
        }
    }

    /// Hard cap on confidence earned from heating-rate consistency.
    pub fn heating_rate_cap(self) -> f64 {
        match self {
            Self::FloorHydronic => 0.30,
            Self::Radiator => 0.20,
            Self::Convector => 0.10,
            Self::ForcedAir => 0.05,
        }
    }

    pub fn tier_requirements(self) -> TierRequirements {
        let (tier1, tier2) = match self {
            Self::FloorHydronic => (12, 20),
            Self::Radiator => (10, 16),
            Self::Convector => (8, 12),
            Self::ForcedAir => (6, 10),
        };
        TierRequirements {
            tier1_recovery_cycles: tier1,
            tier2_recovery_cycles: tier2,
        }
    }

    /// Starting delta (°C) at or above which a cycle counts as recovery.
    /// Raised once learning is stable so routine setback cycles stop
    /// qualifying.
    pub fn recovery_threshold(self, is_stable: bool) -> f64 {
        match (self, is_stable) {
            (Self::FloorHydronic, false) => 0.5,
            (Self::FloorHydronic, true) => 1.0,
            (Self::Radiator, false) => 0.4,
            (Self::Radiator, true) => 0.8,
            (Self::Convector, false) => 0.3,
            (Self::Convector, true) => 0.6,
            (Self::ForcedAir, false) => 0.25,
            (Self::ForcedAir, true) => 0.5,
        }
    }

    /// Drop below setpoint (°C) that opens a recovery session.
    pub fn session_start_threshold(self) -> f64 {
        match self {
            Self::FloorHydronic => 0.5,
            Self::Radiator => 0.4,
            Self::Convector | Self::ForcedAir => 0.3,
        }
    }

    /// Sessions shorter than this are discarded.
    pub fn min_session_minutes(self) -> f64 {
        match self {
            Self::FloorHydronic => 60.0,
            Self::Radiator => 30.0,
            Self::Convector => 20.0,
            Self::ForcedAir => 10.0,
        }
    }

    /// Heating rate (°C/hour) used when nothing has been learned yet.
    pub fn fallback_heating_rate(self) -> f64 {
        match self {
            Self::FloorHydronic => 0.5,
            Self::Radiator => 1.2,
            Self::Convector => 2.0,
            Self::ForcedAir => 4.0,
        }
    }
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstallationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s.trim())
            .ok_or_else(|| format!("unknown installation type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_thresholds_are_higher() {
        for t in InstallationType::ALL {
            assert!(t.recovery_threshold(true) > t.recovery_threshold(false), "{t}");
        }
    }

    #[test]
    fn caps_within_documented_ranges() {
        for t in InstallationType::ALL {
            assert!((0.25..=0.35).contains(&t.maintenance_cap()));
            assert!((0.05..=0.30).contains(&t.heating_rate_cap()));
        }
    }

    #[test]
    fn name_round_trips() {
        for t in InstallationType::ALL {
            assert_eq!(t.name().parse::<InstallationType>().unwrap(), t);
        }
    }
}
