//! Heating-rate learning.
//!
//! Observations come from two sources: single cycles whose rise time was
//! measurable, and whole recovery sessions tracked by [`session`]. Both land
//! in a 4 x 3 grid of bins keyed by setpoint delta and outdoor temperature.

pub mod bins;
pub mod learner;
pub mod session;

pub use bins::{BinRecord, HeatingRateObservation, ObservationSource};
pub use learner::{HeatingRateLearner, RateSource};
pub use session::{RecoverySession, SessionOutcome, SessionState, SessionTracker};
