//! Heat in transit between the valve and the emitter.
//!
//! Opening a manifold valve does not heat the room immediately: hot water
//! first has to fill `transport_delay` seconds of pipe. Closing it does not
//! stop heating either: whatever is in the pipe still drains into the
//! emitter. This module tracks that in-flight heat so the scheduler can
//! avoid commanding heat that is already on its way.

/// Pipe transport model for one zone. Timestamps are monotonic seconds and
/// are never persisted; a restart starts from an empty pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPipeline {
    transport_delay: f64,
    valve_time: f64,
    valve_opened_at: Option<f64>,
    valve_closed_at: Option<f64>,
}

impl HeatPipeline {
    /// Negative or non-finite durations are treated as zero.
    pub fn new(transport_delay: f64, valve_time: f64) -> Self {
        Self {
            transport_delay: non_negative(transport_delay),
            valve_time: non_negative(valve_time),
            valve_opened_at: None,
            valve_closed_at: None,
        }
    }

    pub fn transport_delay(&self) -> f64 {
        self.transport_delay
    }

    pub fn valve_time(&self) -> f64 {
        self.valve_time
    }

    pub fn valve_opened_at(&self) -> Option<f64> {
        self.valve_opened_at
    }

    pub fn valve_closed_at(&self) -> Option<f64> {
        self.valve_closed_at
    }

    /// Record the actuation-open time. Clears any earlier close.
    pub fn valve_opened(&mut self, at: f64) {
        self.valve_opened_at = Some(at);
        self.valve_closed_at = None;
    }

    /// Record the half-close time. A close stamped before the current open
    /// is moved up to the open time.
    pub fn valve_closed(&mut self, at: f64) {
        let at = match self.valve_opened_at {
            Some(opened) => at.max(opened),
            None => at,
        };
        self.valve_closed_at = Some(at);
    }

    pub fn reset(&mut self) {
        self.valve_opened_at = None;
        self.valve_closed_at = None;
    }

    /// Seconds of heat still in the pipe at `now`, in `[0, transport_delay]`.
    ///
    /// While open the pipe fills linearly up to `transport_delay`; once
    /// closed it drains linearly to zero over `transport_delay`.
    pub fn committed_heat_remaining(&self, now: f64) -> f64 {
        let Some(opened) = self.valve_opened_at else {
            return 0.0;
        };
        let remaining = match self.valve_closed_at {
            None => (now - opened).min(self.transport_delay),
            Some(closed) => self.transport_delay - (now - closed),
        };
        remaining.clamp(0.0, self.transport_delay)
    }

    /// Valve-open duration (seconds) needed to deliver `requested_duty` of
    /// `pwm_period`, net of `committed` heat already in the pipe.
    ///
    /// Returns 0 when committed heat already covers the demand. Otherwise
    /// adds half the valve travel time: the closing valve still passes about
    /// half its flow, so this keeps delivered heat equal to demanded heat.
    pub fn calculate_valve_open_duration(
        &self,
        requested_duty: f64,
        pwm_period: f64,
        committed: f64,
    ) -> f64 {
        let needed = requested_duty * pwm_period - committed;
        if needed.is_nan() || needed <= 0.0 {
            return 0.0;
        }
        needed + self.valve_time / 2.0
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
