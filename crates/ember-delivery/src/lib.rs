//! # ember-delivery
//!
//! Heat-delivery timing model: everything between "the controller wants
//! 40% heat" and "the valve actually opens and closes at these instants".

pub mod demand;
pub mod outdoor;
pub mod pipeline;
pub mod pwm;
pub mod timer;

pub use demand::{DemandEvent, DemandSignaler, DemandState};
pub use outdoor::{OutdoorSource, OutdoorTempFilter, SharedOutdoorFilter};
pub use pipeline::HeatPipeline;
pub use pwm::{PwmSchedule, PwmScheduler, ScheduleWarning};
pub use timer::{Cancellable, TimerHandle, TimerQueue};
