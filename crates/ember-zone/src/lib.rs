//! # ember-zone
//!
//! One controller per heated zone. A [`Zone`] owns its pipe model, PWM
//! scheduler, demand signaler and learning engine, reads outdoor temperature
//! from an injected [`OutdoorSource`](ember_delivery::OutdoorSource), and
//! reports through the event dispatcher. [`Building`] owns the shared
//! outdoor filter and hands zones their source.

pub mod actuator;
pub mod building;
pub mod zone;

pub use actuator::Actuator;
pub use building::Building;
pub use zone::{Zone, ZoneTick};
