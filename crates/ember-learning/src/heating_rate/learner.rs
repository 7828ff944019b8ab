//! Heating-rate learner: binned store plus the recovery-session tracker.

use std::fmt;

use chrono::Utc;
use ember_core::constants::{
    CONSISTENCY_SATURATION_SAMPLES, HEATING_RATE_MIN_SAMPLES, SECONDS_PER_HOUR,
};
use ember_core::types::{InstallationType, OverrideKind};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::bins::{
    delta_band, outdoor_band, BinRecord, HeatingRateObservation, ObservationSource, RateBin,
    RateBins,
};
use super::session::{RecoverySession, SessionOutcome, SessionState, SessionTracker};

/// Where a reported heating rate came from, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Session,
    Cycle,
    Interpolated,
    Fallback,
}

impl RateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Cycle => "cycle",
            Self::Interpolated => "interpolated",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatingRateLearner {
    installation: InstallationType,
    bins: RateBins,
    sessions: SessionTracker,
}

impl HeatingRateLearner {
    pub fn new(installation: InstallationType) -> Self {
        Self {
            installation,
            bins: RateBins::default(),
            sessions: SessionTracker::new(installation),
        }
    }

    /// Restore persisted bins. Sessions are never persisted and start idle.
    pub fn from_records(installation: InstallationType, records: &[BinRecord]) -> Self {
        Self {
            installation,
            bins: RateBins::from_records(records),
            sessions: SessionTracker::new(installation),
        }
    }

    pub fn to_records(&self) -> Vec<BinRecord> {
        self.bins.to_records()
    }

    pub fn installation(&self) -> InstallationType {
        self.installation
    }

    pub fn observation_count(&self) -> usize {
        self.bins.total()
    }

    pub fn session_state(&self) -> SessionState {
        self.sessions.state()
    }

    pub fn active_session(&self) -> Option<&RecoverySession> {
        self.sessions.active()
    }

    /// Record a single cycle's rise. Returns false when the rise time was
    /// not measurable.
    pub fn add_cycle_observation(
        &mut self,
        rise_degrees: f64,
        duration_minutes: f64,
        starting_delta: f64,
        outdoor_temp: Option<f64>,
    ) -> bool {
        if !(rise_degrees > 0.0) || !(duration_minutes > 0.0) || !duration_minutes.is_finite() {
            return false;
        }
        let rate = rise_degrees / (duration_minutes * 60.0 / SECONDS_PER_HOUR);
        if !rate.is_finite() {
            return false;
        }
        self.bins.insert(
            starting_delta,
            outdoor_temp,
            HeatingRateObservation {
                rate,
                duration_minutes,
                source: ObservationSource::Cycle,
                stalled: false,
                timestamp: Utc::now(),
            },
        );
        tracing::trace!(rate, starting_delta, ?outdoor_temp, "cycle heating rate recorded");
        true
    }

    /// Per-tick room observation for the session state machine.
    pub fn observe_room(
        &mut self,
        room_temp: f64,
        setpoint: f64,
        outdoor_temp: Option<f64>,
        now: f64,
    ) -> Option<SessionOutcome> {
        let outcome = self.sessions.observe(room_temp, setpoint, outdoor_temp, now);
        self.bank(outcome)
    }

    /// Per-cycle session step.
    pub fn on_cycle_complete(&mut self, duty: f64, room_temp: f64, now: f64) -> Option<SessionOutcome> {
        let outcome = self.sessions.on_cycle_complete(duty, room_temp, now);
        self.bank(outcome)
    }

    pub fn interrupt_session(&mut self, kind: OverrideKind) -> Option<SessionOutcome> {
        self.sessions.interrupt(kind)
    }

    fn bank(&mut self, outcome: Option<SessionOutcome>) -> Option<SessionOutcome> {
        if let Some(SessionOutcome::Banked {
            observation,
            starting_delta,
            outdoor_temp,
            ..
        }) = &outcome
        {
            self.bins
                .insert(*starting_delta, *outdoor_temp, observation.clone());
        }
        outcome
    }

    /// Best available heating rate (°C/h) for a recovery of `delta` °C at
    /// the given outdoor temperature.
    pub fn get_heating_rate(&self, delta: f64, outdoor_temp: Option<f64>) -> (f64, RateSource) {
        let (d, o) = (delta_band(delta), outdoor_band(outdoor_temp));
        if let Some(bin) = self.bins.get(d, o) {
            for (source, tag) in [
                (ObservationSource::Session, RateSource::Session),
                (ObservationSource::Cycle, RateSource::Cycle),
            ] {
                let rates = bin.rates_from(source);
                if rates.len() >= HEATING_RATE_MIN_SAMPLES {
                    return (rates.iter().mean(), tag);
                }
            }
        }

        let neighbor_means: Vec<f64> = self
            .bins
            .neighbors(d, o)
            .into_iter()
            .filter_map(RateBin::mean_rate)
            .collect();
        if !neighbor_means.is_empty() {
            return (neighbor_means.iter().mean(), RateSource::Interpolated);
        }

        (self.installation.fallback_heating_rate(), RateSource::Fallback)
    }

    /// How trustworthy the learned rates are, in `[0, 1]`: sample adequacy
    /// (saturating at 10) times one minus the coefficient of variation.
    pub fn get_rate_consistency_score(&self) -> f64 {
        let rates: Vec<f64> = self.bins.all().map(|o| o.rate).collect();
        if rates.len() < 2 {
            return 0.0;
        }
        let mean = rates.iter().mean();
        if !(mean > 0.0) {
            return 0.0;
        }
        let cv = rates.iter().std_dev() / mean;
        let adequacy = (rates.len() as f64 / CONSISTENCY_SATURATION_SAMPLES as f64).min(1.0);
        let score = adequacy * (1.0 - cv).clamp(0.0, 1.0);
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }
}
