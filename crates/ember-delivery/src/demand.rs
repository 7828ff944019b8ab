//! Demand edge signaling.
//!
//! An ON command does not mean heat is flowing: the valve needs its full
//! travel time before delivery starts. An OFF command does not mean heat has
//! stopped: delivery is considered over once the valve is half closed. This
//! state machine turns commands into delayed `heating_started` /
//! `heating_ended` edges for cycle-metrics recording.

use ember_core::events::{HeatingEndedEvent, HeatingStartedEvent};

use crate::timer::{Cancellable, TimerHandle, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandState {
    Idle,
    OpenPending,
    Open,
    ClosePending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemandEvent {
    HeatingStarted(HeatingStartedEvent),
    HeatingEnded(HeatingEndedEvent),
}

impl DemandEvent {
    pub fn at(&self) -> f64 {
        match self {
            Self::HeatingStarted(e) => e.at,
            Self::HeatingEnded(e) => e.at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    OpenComplete,
    CloseComplete,
}

#[derive(Debug)]
pub struct DemandSignaler {
    valve_actuation_time: f64,
    state: DemandState,
    pending: Option<TimerHandle>,
    timers: TimerQueue<Transition>,
}

impl DemandSignaler {
    pub fn new(valve_actuation_time: f64) -> Self {
        Self {
            valve_actuation_time: valve_actuation_time.max(0.0),
            state: DemandState::Idle,
            pending: None,
            timers: TimerQueue::new(),
        }
    }

    pub fn state(&self) -> DemandState {
        self.state
    }

    /// True once heat is actually being delivered.
    pub fn is_demanding(&self) -> bool {
        matches!(self.state, DemandState::Open | DemandState::ClosePending)
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    /// Apply an actuator command issued at `now` and return any edges that
    /// are already due (only possible with zero valve travel time).
    pub fn command(&mut self, on: bool, now: f64) -> Vec<DemandEvent> {
        match (on, self.state) {
            (true, DemandState::Idle) => {
                self.state = DemandState::OpenPending;
                self.arm(now + self.valve_actuation_time, Transition::OpenComplete);
            }
            (true, DemandState::ClosePending) => {
                // Valve never fully closed: resume without a second start edge.
                self.disarm();
                self.state = DemandState::Open;
            }
            (false, DemandState::Open) => {
                self.state = DemandState::ClosePending;
                self.arm(
                    now + self.valve_actuation_time / 2.0,
                    Transition::CloseComplete,
                );
            }
            (false, DemandState::OpenPending) => {
                // Delivery never began, so there is nothing to end.
                self.disarm();
                self.state = DemandState::Idle;
            }
            (true, DemandState::OpenPending | DemandState::Open)
            | (false, DemandState::Idle | DemandState::ClosePending) => {}
        }
        self.poll(now)
    }

    /// Fire every transition due at or before `now`.
    pub fn poll(&mut self, now: f64) -> Vec<DemandEvent> {
        let mut events = Vec::new();
        for (at, transition) in self.timers.pop_due(now) {
            match (transition, self.state) {
                (Transition::OpenComplete, DemandState::OpenPending) => {
                    self.state = DemandState::Open;
                    self.pending = None;
                    tracing::debug!(at, "heating started");
                    events.push(DemandEvent::HeatingStarted(HeatingStartedEvent { at }));
                }
                (Transition::CloseComplete, DemandState::ClosePending) => {
                    self.state = DemandState::Idle;
                    self.pending = None;
                    tracing::debug!(at, "heating ended");
                    events.push(DemandEvent::HeatingEnded(HeatingEndedEvent { at }));
                }
                (t, s) => {
                    tracing::trace!(?t, ?s, "stale demand transition ignored");
                }
            }
        }
        events
    }

    /// Drop all pending transitions and return to idle without signaling.
    pub fn reset(&mut self) {
        self.disarm();
        self.timers.clear();
        self.state = DemandState::Idle;
    }

    fn arm(&mut self, fire_at: f64, transition: Transition) {
        self.disarm();
        let handle = self.timers.schedule(fire_at, transition);
        tracing::trace!(timer = handle.id(), fire_at, ?transition, "demand transition armed");
        self.pending = Some(handle);
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }
}
