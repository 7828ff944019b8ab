//! # ember-core
//!
//! Foundation crate for the Ember thermal controller.
//! Defines shared types, errors, config, events, tracing setup, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::EmberConfig;
pub use errors::{EmberError, EmberResult};
pub use types::{
    CycleOutcome, EnergyRating, InstallationType, LearningStatus, Override, OverrideKind,
    OverrideSlots,
};
