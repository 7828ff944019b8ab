//! # ember-learning
//!
//! Learns how a zone behaves and how far its control can be trusted.
//!
//! Cycles are weighted by difficulty ([`cycle_weight`]), confidence gains are
//! routed through capped per-source accumulators ([`contribution`]), tier
//! progression additionally requires proven recovery cycles ([`status`]), and
//! heating rate is learned from single cycles and whole recovery sessions
//! ([`heating_rate`]). Overshoot caused by heat already in the pipe is split
//! off before any of this sees it ([`overshoot`]).

pub mod contribution;
pub mod cycle_weight;
pub mod engine;
pub mod heating_rate;
pub mod overshoot;
pub mod persistence;
pub mod status;

pub use contribution::ConfidenceContributionTracker;
pub use cycle_weight::{CycleWeightCalculator, WeightConstants};
pub use engine::{CycleAssessment, CycleMetrics, LearningEngine};
pub use heating_rate::{
    HeatingRateLearner, HeatingRateObservation, ObservationSource, RateSource, RecoverySession,
    SessionOutcome, SessionState,
};
pub use overshoot::{OvershootDecomposer, OvershootSplit};
pub use persistence::LearningSnapshot;
pub use status::{evaluate_status, StatusReport};
