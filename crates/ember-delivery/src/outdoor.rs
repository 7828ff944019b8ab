//! Outdoor temperature smoothing.
//!
//! A building responds to outdoor temperature through its envelope, which
//! acts as a low-pass filter. One EMA per building, with a time constant
//! taken from the energy rating, feeds every zone's external-temperature term.

use std::sync::{Arc, PoisonError, RwLock};

use ember_core::constants::SECONDS_PER_HOUR;
use ember_core::types::EnergyRating;

/// Single exponential moving average of outdoor temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct OutdoorTempFilter {
    tau_hours: f64,
    lagged: Option<f64>,
}

impl OutdoorTempFilter {
    /// Create a filter for a building with the given rating (4h when unrated).
    pub fn new(rating: Option<EnergyRating>) -> Self {
        Self::with_tau_hours(EnergyRating::tau_hours_or_default(rating))
    }

    pub fn with_tau_hours(tau_hours: f64) -> Self {
        Self {
            tau_hours,
            lagged: None,
        }
    }

    pub fn tau_hours(&self) -> f64 {
        self.tau_hours
    }

    /// Feed a new reading taken `dt_seconds` after the previous one.
    ///
    /// The first reading, or any reading with `dt_seconds <= 0`, sets the
    /// filter directly (no warm-up transient).
    pub fn update(&mut self, temp: f64, dt_seconds: f64) -> f64 {
        let next = match self.lagged {
            Some(prev) if dt_seconds > 0.0 => {
                let tau_secs = self.tau_hours * SECONDS_PER_HOUR;
                let alpha = if tau_secs > 0.0 {
                    (dt_seconds / tau_secs).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                alpha * temp + (1.0 - alpha) * prev
            }
            _ => temp,
        };
        self.lagged = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.lagged
    }
}

/// Building-level handle to one filter, cloned into every zone.
///
/// Exactly one owner (the weather update path) writes; zones only read.
/// The lock guarantees readers never see a half-applied update.
#[derive(Debug, Clone)]
pub struct SharedOutdoorFilter {
    inner: Arc<RwLock<OutdoorTempFilter>>,
}

impl SharedOutdoorFilter {
    pub fn new(filter: OutdoorTempFilter) -> Self {
        Self {
            inner: Arc::new(RwLock::new(filter)),
        }
    }

    pub fn update(&self, temp: f64, dt_seconds: f64) -> f64 {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let value = guard.update(temp, dt_seconds);
        tracing::trace!(raw = temp, lagged = value, "outdoor filter updated");
        value
    }

    /// The building's filtered outdoor temperature, possibly stale.
    pub fn value(&self) -> Option<f64> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .value()
    }

    pub fn snapshot(&self) -> OutdoorTempFilter {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Where a zone gets its lagged outdoor temperature from.
///
/// A zone with its own outdoor sensor opts out of the building filter
/// entirely; it never falls back to the shared value.
#[derive(Debug, Clone)]
pub enum OutdoorSource {
    Shared(SharedOutdoorFilter),
    Private(OutdoorTempFilter),
    None,
}

impl OutdoorSource {
    pub fn lagged(&self) -> Option<f64> {
        match self {
            Self::Shared(shared) => shared.value(),
            Self::Private(filter) => filter.value(),
            Self::None => None,
        }
    }

    /// Offer a raw reading from the zone's own sensor. Only private filters
    /// consume it; the shared filter has a single building-level writer.
    pub fn observe(&mut self, temp: f64, dt_seconds: f64) {
        if let Self::Private(filter) = self {
            filter.update(temp, dt_seconds);
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }
}
