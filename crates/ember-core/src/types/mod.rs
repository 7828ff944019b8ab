//! Shared domain types.

pub mod energy_rating;
pub mod installation;
pub mod outcome;
pub mod overrides;
pub mod status;

pub use energy_rating::EnergyRating;
pub use installation::{InstallationType, TierRequirements};
pub use outcome::CycleOutcome;
pub use overrides::{Override, OverrideKind, OverrideSlots};
pub use status::LearningStatus;
