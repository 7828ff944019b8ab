//! Configuration system for Ember.
//! TOML-based, 3-layer resolution: env > project > defaults.

pub mod building_config;
pub mod delivery_config;
pub mod ember_config;
pub mod learning_config;

pub use building_config::BuildingConfig;
pub use delivery_config::DeliveryConfig;
pub use ember_config::EmberConfig;
pub use learning_config::LearningConfig;
