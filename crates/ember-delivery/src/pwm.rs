//! Continuous controller output to on/off actuation schedule.

use serde::{Deserialize, Serialize};

use crate::pipeline::HeatPipeline;

/// Non-fatal scheduling condition, reported upward for logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    /// The period is too short for the valve travel plus pipe transport
    /// delay, so the requested duty cannot actually be delivered.
    DutyUnachievable {
        requested_duty: f64,
        pwm_period: f64,
        minimum_period: f64,
    },
}

/// Actuation plan for one PWM period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmSchedule {
    /// Duty fraction in `[0, 1]` derived from controller output.
    pub duty: f64,
    /// Heat already in the pipe when the period was planned (seconds).
    pub committed_heat: f64,
    /// Valve-on duration including close-tail compensation (seconds).
    pub on_time: f64,
    pub open_at: f64,
    /// When to issue the close command, ahead of the desired end of delivery.
    pub close_command_at: f64,
    pub warning: Option<ScheduleWarning>,
}

impl PwmSchedule {
    /// No actuation this period.
    pub fn is_idle(&self) -> bool {
        self.on_time <= 0.0
    }

    /// The valve stays open through the whole period.
    pub fn is_full_on(&self, pwm_period: f64) -> bool {
        !self.is_idle() && self.close_command_at >= self.open_at + pwm_period
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmScheduler {
    pwm_period: f64,
    valve_actuation_time: f64,
}

impl PwmScheduler {
    pub fn new(pwm_period: f64, valve_actuation_time: f64) -> Self {
        Self {
            pwm_period,
            valve_actuation_time: valve_actuation_time.max(0.0),
        }
    }

    pub fn pwm_period(&self) -> f64 {
        self.pwm_period
    }

    pub fn valve_actuation_time(&self) -> f64 {
        self.valve_actuation_time
    }

    /// `pwm_period * duty + valve_actuation_time / 2`, with
    /// `duty = control_output / difference` (0 when `difference == 0`).
    pub fn calculate_adjusted_on_time(
        control_output: f64,
        difference: f64,
        pwm_period: f64,
        valve_actuation_time: f64,
    ) -> f64 {
        let duty = if difference == 0.0 {
            0.0
        } else {
            control_output / difference
        };
        pwm_period * duty + valve_actuation_time / 2.0
    }

    /// The close command must lead the desired end of heat delivery by this
    /// many seconds.
    pub fn get_close_command_offset(valve_actuation_time: f64) -> f64 {
        valve_actuation_time / 2.0
    }

    /// Plan the period starting at `now`.
    ///
    /// Hydronic installations (non-zero transport delay) subtract heat still
    /// in the pipe via [`HeatPipeline::calculate_valve_open_duration`];
    /// everything else uses the plain adjusted on-time.
    pub fn plan(
        &self,
        control_output: f64,
        difference: f64,
        now: f64,
        pipeline: &HeatPipeline,
    ) -> PwmSchedule {
        let raw = if difference == 0.0 {
            0.0
        } else {
            control_output / difference
        };
        let duty = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };

        let committed_heat = pipeline.committed_heat_remaining(now);
        let on_time = if duty <= 0.0 {
            0.0
        } else if pipeline.transport_delay() > 0.0 {
            pipeline.calculate_valve_open_duration(duty, self.pwm_period, committed_heat)
        } else {
            Self::calculate_adjusted_on_time(
                duty,
                1.0,
                self.pwm_period,
                self.valve_actuation_time,
            )
        };

        let close_offset = Self::get_close_command_offset(self.valve_actuation_time);
        let close_command_at = now + (on_time - close_offset).clamp(0.0, self.pwm_period);

        let minimum_period = self.valve_actuation_time + pipeline.transport_delay();
        let warning = (duty > 0.0 && self.pwm_period < minimum_period).then(|| {
            tracing::warn!(
                requested_duty = duty,
                pwm_period = self.pwm_period,
                minimum_period,
                "requested duty is physically unachievable for this period"
            );
            ScheduleWarning::DutyUnachievable {
                requested_duty: duty,
                pwm_period: self.pwm_period,
                minimum_period,
            }
        });

        PwmSchedule {
            duty,
            committed_heat,
            on_time,
            open_at: now,
            close_command_at,
            warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjusted_on_time_adds_half_travel() {
        assert_eq!(
            PwmScheduler::calculate_adjusted_on_time(50.0, 100.0, 900.0, 120.0),
            510.0
        );
        assert_eq!(
            PwmScheduler::calculate_adjusted_on_time(50.0, 0.0, 900.0, 120.0),
            60.0
        );
        assert_eq!(PwmScheduler::get_close_command_offset(120.0), 60.0);
    }

    #[test]
    fn plan_uses_pipeline_for_hydronic() {
        let mut pipeline = HeatPipeline::new(600.0, 120.0);
        pipeline.valve_opened(0.0);
        pipeline.valve_closed(800.0);
        // committed at 1000 = 600 - 200 = 400
        let s = PwmScheduler::new(900.0, 120.0).plan(50.0, 100.0, 1000.0, &pipeline);
        assert_eq!(s.committed_heat, 400.0);
        assert_eq!(s.on_time, 450.0 - 400.0 + 60.0);
        assert_eq!(s.close_command_at, 1000.0 + 50.0);
        assert!(s.warning.is_none());
    }

    #[test]
    fn plan_skips_actuation_when_pipe_covers_demand() {
        let mut pipeline = HeatPipeline::new(600.0, 120.0);
        pipeline.valve_opened(0.0);
        let s = PwmScheduler::new(900.0, 120.0).plan(20.0, 100.0, 1000.0, &pipeline);
        assert!(s.is_idle());
    }

    #[test]
    fn plan_without_transport_delay() {
        let pipeline = HeatPipeline::new(0.0, 60.0);
        let s = PwmScheduler::new(600.0, 60.0).plan(25.0, 100.0, 0.0, &pipeline);
        assert_eq!(s.on_time, 150.0 + 30.0);
        assert_eq!(s.close_command_at, 150.0);
    }

    #[test]
    fn zero_output_is_idle() {
        let pipeline = HeatPipeline::new(0.0, 60.0);
        let s = PwmScheduler::new(600.0, 60.0).plan(0.0, 100.0, 0.0, &pipeline);
        assert!(s.is_idle());
        assert!(s.warning.is_none());
    }

    #[test]
    fn short_period_warns_but_still_schedules() {
        let pipeline = HeatPipeline::new(600.0, 240.0);
        let s = PwmScheduler::new(300.0, 240.0).plan(50.0, 100.0, 0.0, &pipeline);
        assert!(matches!(
            s.warning,
            Some(ScheduleWarning::DutyUnachievable { minimum_period, .. }) if minimum_period == 840.0
        ));
        assert!(s.on_time > 0.0);
    }

    #[test]
    fn full_duty_stays_open() {
        let pipeline = HeatPipeline::new(0.0, 60.0);
        let s = PwmScheduler::new(600.0, 60.0).plan(150.0, 100.0, 0.0, &pipeline);
        assert_eq!(s.duty, 1.0);
        assert!(s.is_full_on(600.0));
    }
}
