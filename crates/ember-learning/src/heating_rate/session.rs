//! Recovery-session state machine.
//!
//! A session follows one recovery from "well below setpoint" to either
//! setpoint (success) or a plateau (stall) across as many PWM cycles as it
//! takes. Only a completed session yields an observation; overrides and
//! too-short sessions are thrown away.

use chrono::Utc;
use ember_core::constants::{
    SECONDS_PER_HOUR, SESSION_PROGRESS_MIN_RISE, SESSION_STALL_CYCLES, SESSION_SUCCESS_TOLERANCE,
};
use ember_core::events::DiscardReason;
use ember_core::types::{InstallationType, OverrideKind};

use super::bins::{HeatingRateObservation, ObservationSource};

const RISE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Tracking,
}

/// One in-flight recovery. At most one exists per zone.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverySession {
    pub start_temp: f64,
    /// Monotonic seconds.
    pub start_time: f64,
    pub target_setpoint: f64,
    pub outdoor_temp: Option<f64>,
    pub cycles_in_session: u32,
    pub cycle_duties: Vec<f64>,
    pub last_progress_cycle: u32,
    /// Room temperature at the last cycle that counted as progress.
    pub last_check_temp: f64,
}

impl RecoverySession {
    pub fn starting_delta(&self) -> f64 {
        self.target_setpoint - self.start_temp
    }

    pub fn elapsed_minutes(&self, now: f64) -> f64 {
        ((now - self.start_time) / 60.0).max(0.0)
    }

    pub fn mean_duty(&self) -> Option<f64> {
        if self.cycle_duties.is_empty() {
            return None;
        }
        Some(self.cycle_duties.iter().sum::<f64>() / self.cycle_duties.len() as f64)
    }

    fn cycles_without_progress(&self) -> u32 {
        self.cycles_in_session - self.last_progress_cycle
    }
}

/// Terminal result of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Banked {
        observation: HeatingRateObservation,
        starting_delta: f64,
        outdoor_temp: Option<f64>,
        cycles: u32,
    },
    Discarded {
        reason: DiscardReason,
        cycles: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionTracker {
    installation: InstallationType,
    session: Option<RecoverySession>,
}

impl SessionTracker {
    pub fn new(installation: InstallationType) -> Self {
        Self {
            installation,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Tracking
        } else {
            SessionState::Idle
        }
    }

    pub fn active(&self) -> Option<&RecoverySession> {
        self.session.as_ref()
    }

    /// Per-tick room observation: starts a session when the room has fallen
    /// far enough below setpoint, and completes one once setpoint is reached.
    pub fn observe(
        &mut self,
        room_temp: f64,
        setpoint: f64,
        outdoor_temp: Option<f64>,
        now: f64,
    ) -> Option<SessionOutcome> {
        if !room_temp.is_finite() || !setpoint.is_finite() {
            return None;
        }
        match &self.session {
            None => {
                if setpoint - room_temp >= self.installation.session_start_threshold() {
                    tracing::info!(
                        room_temp,
                        setpoint,
                        installation = %self.installation,
                        "recovery session started"
                    );
                    self.session = Some(RecoverySession {
                        start_temp: room_temp,
                        start_time: now,
                        target_setpoint: setpoint,
                        outdoor_temp,
                        cycles_in_session: 0,
                        cycle_duties: Vec::new(),
                        last_progress_cycle: 0,
                        last_check_temp: room_temp,
                    });
                }
                None
            }
            Some(s) if room_temp >= s.target_setpoint - SESSION_SUCCESS_TOLERANCE => {
                Some(self.finish(room_temp, now, false))
            }
            Some(_) => None,
        }
    }

    /// Per-cycle step while tracking: record duty, check progress, detect
    /// success or stall.
    pub fn on_cycle_complete(
        &mut self,
        duty: f64,
        room_temp: f64,
        now: f64,
    ) -> Option<SessionOutcome> {
        let session = self.session.as_mut()?;
        session.cycle_duties.push(duty.clamp(0.0, 1.0));
        session.cycles_in_session += 1;
        if room_temp - session.last_check_temp + RISE_EPSILON >= SESSION_PROGRESS_MIN_RISE {
            session.last_progress_cycle = session.cycles_in_session;
            session.last_check_temp = room_temp;
        }

        if room_temp >= session.target_setpoint - SESSION_SUCCESS_TOLERANCE {
            return Some(self.finish(room_temp, now, false));
        }
        if session.cycles_without_progress() >= SESSION_STALL_CYCLES {
            return Some(self.finish(room_temp, now, true));
        }
        None
    }

    /// An override interrupts the session; nothing is banked.
    pub fn interrupt(&mut self, kind: OverrideKind) -> Option<SessionOutcome> {
        let session = self.session.take()?;
        tracing::info!(
            override_kind = kind.name(),
            cycles = session.cycles_in_session,
            "recovery session discarded by override"
        );
        Some(SessionOutcome::Discarded {
            reason: DiscardReason::Override(kind),
            cycles: session.cycles_in_session,
        })
    }

    fn finish(&mut self, room_temp: f64, now: f64, stalled: bool) -> SessionOutcome {
        let Some(session) = self.session.take() else {
            return SessionOutcome::Discarded {
                reason: DiscardReason::NoRise,
                cycles: 0,
            };
        };
        let cycles = session.cycles_in_session;
        let minutes = session.elapsed_minutes(now);
        let min_minutes = self.installation.min_session_minutes();

        if minutes < min_minutes {
            tracing::debug!(minutes, min_minutes, "recovery session too short, discarded");
            return SessionOutcome::Discarded {
                reason: DiscardReason::TooShort,
                cycles,
            };
        }
        let rise = room_temp - session.start_temp;
        if rise <= 0.0 {
            tracing::debug!(rise, "recovery session without net rise, discarded");
            return SessionOutcome::Discarded {
                reason: DiscardReason::NoRise,
                cycles,
            };
        }

        let rate = rise / (minutes * 60.0 / SECONDS_PER_HOUR);
        tracing::info!(
            rate,
            minutes,
            stalled,
            cycles,
            "recovery session banked"
        );
        SessionOutcome::Banked {
            observation: HeatingRateObservation {
                rate,
                duration_minutes: minutes,
                source: ObservationSource::Session,
                stalled,
                timestamp: Utc::now(),
            },
            starting_delta: session.starting_delta(),
            outdoor_temp: session.outdoor_temp,
            cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking_radiator() -> SessionTracker {
        let mut t = SessionTracker::new(InstallationType::Radiator);
        assert!(t.observe(19.0, 21.0, Some(3.0), 0.0).is_none());
        assert_eq!(t.state(), SessionState::Tracking);
        t
    }

    #[test]
    fn small_drop_does_not_start() {
        let mut t = SessionTracker::new(InstallationType::Radiator);
        t.observe(20.7, 21.0, None, 0.0);
        assert_eq!(t.state(), SessionState::Idle);
    }

    #[test]
    fn success_banks_session_rate() {
        let mut t = tracking_radiator();
        assert!(t.on_cycle_complete(0.9, 19.6, 900.0).is_none());
        assert!(t.on_cycle_complete(0.9, 20.3, 1800.0).is_none());
        let outcome = t.on_cycle_complete(0.8, 20.95, 2700.0);
        match outcome {
            Some(SessionOutcome::Banked {
                observation,
                starting_delta,
                cycles,
                ..
            }) => {
                // 1.95 °C over 45 minutes.
                assert!((observation.rate - 2.6).abs() < 1e-9);
                assert!(!observation.stalled);
                assert_eq!(observation.source, ObservationSource::Session);
                assert_eq!(starting_delta, 2.0);
                assert_eq!(cycles, 3);
            }
            other => panic!("expected banked session, got {other:?}"),
        }
        assert_eq!(t.state(), SessionState::Idle);
    }

    #[test]
    fn three_flat_cycles_stall() {
        let mut t = tracking_radiator();
        assert!(t.on_cycle_complete(1.0, 19.5, 900.0).is_none());
        assert!(t.on_cycle_complete(1.0, 19.55, 1800.0).is_none());
        assert!(t.on_cycle_complete(1.0, 19.55, 2700.0).is_none());
        let outcome = t.on_cycle_complete(1.0, 19.58, 3600.0);
        match outcome {
            Some(SessionOutcome::Banked { observation, .. }) => {
                assert!(observation.stalled);
                assert!((observation.rate - 0.58).abs() < 1e-9);
            }
            other => panic!("expected stalled bank, got {other:?}"),
        }
    }

    #[test]
    fn slow_steady_rise_is_progress() {
        let mut t = tracking_radiator();
        for (i, temp) in [19.05, 19.1, 19.15, 19.2, 19.25].iter().enumerate() {
            let now = (i as f64 + 1.0) * 900.0;
            assert!(t.on_cycle_complete(0.5, *temp, now).is_none(), "cycle {i}");
        }
        assert_eq!(t.active().map(|s| s.last_progress_cycle), Some(4));
    }

    #[test]
    fn override_discards() {
        let mut t = tracking_radiator();
        t.on_cycle_complete(1.0, 19.4, 900.0);
        let outcome = t.interrupt(OverrideKind::OpenWindow);
        assert_eq!(
            outcome,
            Some(SessionOutcome::Discarded {
                reason: DiscardReason::Override(OverrideKind::OpenWindow),
                cycles: 1,
            })
        );
        assert_eq!(t.state(), SessionState::Idle);
        assert!(t.interrupt(OverrideKind::OpenWindow).is_none());
    }

    #[test]
    fn short_session_discarded() {
        let mut t = tracking_radiator();
        let outcome = t.observe(21.0, 21.0, Some(3.0), 600.0);
        assert!(matches!(
            outcome,
            Some(SessionOutcome::Discarded {
                reason: DiscardReason::TooShort,
                ..
            })
        ));
    }
}
