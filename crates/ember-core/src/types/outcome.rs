use std::fmt;

use serde::{Deserialize, Serialize};

/// How a completed cycle terminated relative to setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    Clean,
    Overshoot,
    Undershoot,
}

impl CycleOutcome {
    pub fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Overshoot => "overshoot",
            Self::Undershoot => "undershoot",
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
