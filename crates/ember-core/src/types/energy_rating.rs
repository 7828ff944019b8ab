use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_OUTDOOR_TAU_HOURS;

/// Building energy label. Better-insulated buildings react more slowly to
/// outdoor swings, so their outdoor filter uses a longer time constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyRating {
    #[serde(rename = "A++++")]
    APlus4,
    #[serde(rename = "A+++")]
    APlus3,
    #[serde(rename = "A++")]
    APlus2,
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl EnergyRating {
    /// All ratings, best first.
    pub const ALL: [EnergyRating; 8] = [
        Self::APlus4,
        Self::APlus3,
        Self::APlus2,
        Self::APlus,
        Self::A,
        Self::B,
        Self::C,
        Self::D,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::APlus4 => "A++++",
            Self::APlus3 => "A+++",
            Self::APlus2 => "A++",
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Outdoor EMA time constant in hours.
    pub fn outdoor_tau_hours(self) -> f64 {
        match self {
            Self::APlus4 => 10.0,
            Self::APlus3 => 8.0,
            Self::APlus2 => 7.0,
            Self::APlus => 6.0,
            Self::A => 5.0,
            Self::B => 4.0,
            Self::C => 3.0,
            Self::D => 2.0,
        }
    }

    /// Time constant for an optional rating; unrated buildings get the default.
    pub fn tau_hours_or_default(rating: Option<Self>) -> f64 {
        rating.map_or(DEFAULT_OUTDOOR_TAU_HOURS, Self::outdoor_tau_hours)
    }
}

impl fmt::Display for EnergyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EnergyRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown energy rating: {trimmed}"))
    }
}
