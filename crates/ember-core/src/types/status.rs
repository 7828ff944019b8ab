use std::fmt;

use serde::{Deserialize, Serialize};

/// Learning-confidence stage. The discriminant is the tier number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    #[default]
    Collecting = 0,
    Stable = 1,
    Tuned = 2,
    Optimized = 3,
}

impl LearningStatus {
    pub fn tier(self) -> u8 {
        self as u8
    }

    pub fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Collecting,
            1 => Self::Stable,
            2 => Self::Tuned,
            _ => Self::Optimized,
        }
    }

    /// Confidence percentage required to enter this stage.
    pub fn confidence_threshold(self) -> f64 {
        match self {
            Self::Collecting => 0.0,
            Self::Stable => 40.0,
            Self::Tuned => 70.0,
            Self::Optimized => 95.0,
        }
    }

    /// Stable and above.
    pub fn is_stable(self) -> bool {
        self >= Self::Stable
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Stable => "stable",
            Self::Tuned => "tuned",
            Self::Optimized => "optimized",
        }
    }
}

impl fmt::Display for LearningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
