/// Ember system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current schema version of persisted learning snapshots.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 3;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Default outdoor filter time constant (hours) when the building is unrated.
pub const DEFAULT_OUTDOOR_TAU_HOURS: f64 = 4.0;

/// Minimum temperature rise (°C) between checks that counts as progress.
pub const SESSION_PROGRESS_MIN_RISE: f64 = 0.1;

/// Consecutive no-progress cycles after which a session is stalled.
pub const SESSION_STALL_CYCLES: u32 = 3;

/// A session succeeds once room temperature is within this of setpoint (°C).
pub const SESSION_SUCCESS_TOLERANCE: f64 = 0.1;

/// Number of setpoint-delta bands in the heating-rate store.
pub const DELTA_BAND_COUNT: usize = 4;

/// Number of outdoor-temperature bands in the heating-rate store.
pub const OUTDOOR_BAND_COUNT: usize = 3;

/// Observations retained per heating-rate bin.
pub const HEATING_RATE_BIN_CAPACITY: usize = 20;

/// Samples required in a bin before its mean is trusted.
pub const HEATING_RATE_MIN_SAMPLES: usize = 3;

/// Sample count at which the consistency score's sample factor saturates.
pub const CONSISTENCY_SATURATION_SAMPLES: usize = 10;
