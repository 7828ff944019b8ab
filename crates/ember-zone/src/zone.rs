//! Zone controller.
//!
//! All mutation happens on the zone's own timeline through [`Zone::tick`],
//! [`Zone::poll`] and [`Zone::complete_cycle`]. The host serializes calls per
//! zone and schedules a `poll` at [`Zone::next_deadline`]; nothing here
//! sleeps or blocks.

use std::path::Path;
use std::sync::Arc;

use ember_core::config::{EmberConfig, LearningConfig};
use ember_core::events::{
    EmberEventHandler, EventDispatcher, ScheduleWarningEvent, SessionBankedEvent,
    SessionDiscardedEvent, TierChangedEvent,
};
use ember_core::types::{Override, OverrideKind, OverrideSlots};
use ember_core::EmberResult;
use ember_delivery::{
    DemandEvent, DemandSignaler, DemandState, HeatPipeline, OutdoorSource, PwmSchedule,
    PwmScheduler, ScheduleWarning,
};
use ember_learning::{
    CycleAssessment, CycleMetrics, LearningEngine, LearningSnapshot, RateSource, SessionOutcome,
};
use tracing::{debug, info};

use crate::actuator::Actuator;

/// Periodic input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneTick {
    /// Monotonic seconds.
    pub now: f64,
    pub control_output: f64,
    /// Output span; `control_output / difference` is the requested duty.
    pub difference: f64,
    pub room_temp: f64,
    pub setpoint: f64,
    /// Raw reading from the zone's own outdoor sensor, if it has one.
    pub outdoor_temp: Option<f64>,
}

pub struct Zone<A: Actuator> {
    name: String,
    actuator: A,
    actuator_on: bool,
    pipeline: HeatPipeline,
    scheduler: PwmScheduler,
    demand: DemandSignaler,
    engine: LearningEngine,
    learning_config: LearningConfig,
    outdoor: OutdoorSource,
    last_outdoor_reading: Option<f64>,
    overrides: OverrideSlots,
    events: EventDispatcher,
    close_at: Option<f64>,
    next_period_at: Option<f64>,
}

impl<A: Actuator> Zone<A> {
    pub fn new(
        name: impl Into<String>,
        config: &EmberConfig,
        outdoor: OutdoorSource,
        actuator: A,
    ) -> Self {
        let delivery = &config.delivery;
        let installation = delivery.effective_installation_type();
        let valve = delivery.effective_valve_actuation_secs();
        Self {
            name: name.into(),
            actuator,
            actuator_on: false,
            pipeline: HeatPipeline::new(delivery.effective_transport_delay_secs(), valve),
            scheduler: PwmScheduler::new(delivery.effective_pwm_period_secs(), valve),
            demand: DemandSignaler::new(valve),
            engine: LearningEngine::with_config(installation, &config.learning),
            learning_config: config.learning.clone(),
            outdoor,
            last_outdoor_reading: None,
            overrides: OverrideSlots::new(),
            events: EventDispatcher::new(),
            close_at: None,
            next_period_at: None,
        }
    }

    /// Build a zone from `ember.toml` under `project_root` plus `EMBER_*`
    /// overrides.
    pub fn load(
        name: impl Into<String>,
        project_root: &Path,
        outdoor: OutdoorSource,
        actuator: A,
    ) -> EmberResult<Self> {
        let config = EmberConfig::load(project_root)?;
        Ok(Self::new(name, &config, outdoor, actuator))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EmberEventHandler>) {
        self.events.register(handler);
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn is_actuator_on(&self) -> bool {
        self.actuator_on
    }

    pub fn demand_state(&self) -> DemandState {
        self.demand.state()
    }

    pub fn engine(&self) -> &LearningEngine {
        &self.engine
    }

    /// Earliest time at which `poll` has work to do.
    pub fn next_deadline(&self) -> Option<f64> {
        [self.close_at, self.demand.next_deadline(), self.next_period_at]
            .into_iter()
            .flatten()
            .reduce(f64::min)
    }

    /// Control tick: refresh outdoor state, step the recovery session and,
    /// at a period boundary, plan and start the next PWM period.
    pub fn tick(&mut self, tick: &ZoneTick) -> Option<PwmSchedule> {
        self.poll(tick.now);

        if let Some(raw) = tick.outdoor_temp {
            let dt = self.last_outdoor_reading.map_or(0.0, |t| tick.now - t);
            self.last_outdoor_reading = Some(tick.now);
            self.outdoor.observe(raw, dt);
        }

        if !self.overrides.any_active() {
            let outdoor = self.outdoor.lagged();
            let outcome =
                self.engine
                    .observe_room(tick.room_temp, tick.setpoint, outdoor, tick.now);
            self.report_session(outcome);
        }

        if self.next_period_at.is_some_and(|t| tick.now < t) {
            return None;
        }
        self.next_period_at = Some(tick.now + self.scheduler.pwm_period());

        if let Some(active) = self.overrides.highest() {
            debug!(zone = %self.name, override_kind = active.kind().name(), "override active, holding valve closed");
            self.switch_off(tick.now);
            return None;
        }

        let schedule = self.scheduler.plan(
            tick.control_output,
            tick.difference,
            tick.now,
            &self.pipeline,
        );
        if let Some(ScheduleWarning::DutyUnachievable {
            requested_duty,
            pwm_period,
            minimum_period,
        }) = schedule.warning
        {
            self.events.emit_schedule_warning(&ScheduleWarningEvent {
                requested_duty,
                pwm_period,
                minimum_period,
            });
        }

        if schedule.is_idle() {
            self.switch_off(tick.now);
        } else {
            self.switch_on(tick.now);
            self.close_at = (!schedule.is_full_on(self.scheduler.pwm_period()))
                .then_some(schedule.close_command_at);
            self.poll(tick.now);
        }
        debug!(
            zone = %self.name,
            duty = schedule.duty,
            on_time = schedule.on_time,
            committed = schedule.committed_heat,
            "period planned"
        );
        Some(schedule)
    }

    /// Fire everything due at or before `now`: the scheduled close command
    /// and any delayed demand edges.
    pub fn poll(&mut self, now: f64) -> Vec<DemandEvent> {
        let mut fired = Vec::new();
        if let Some(at) = self.close_at.filter(|&at| at <= now) {
            self.close_at = None;
            self.actuator_on = false;
            self.actuator.set_actuator(false);
            fired = self.release_valve(at);
        }
        let events = self.demand.poll(now);
        self.handle_demand_events(&events);
        fired.extend(events);
        fired
    }

    /// Feed a completed cycle to the learning engine.
    pub fn complete_cycle(&mut self, metrics: &CycleMetrics) -> CycleAssessment {
        let assessment = self.engine.complete_cycle(metrics);
        self.report_session(assessment.session.clone());
        if assessment.tier_changed() {
            self.events.emit_tier_changed(&TierChangedEvent {
                from: assessment.previous_status,
                to: assessment.report.status,
                confidence_pct: assessment.report.confidence_pct,
            });
        }
        assessment
    }

    /// Activate an override. Any recovery session in flight is discarded and
    /// the valve is closed immediately.
    pub fn apply_override(&mut self, ov: Override, now: f64) {
        let kind = ov.kind();
        if self.overrides.set(ov) {
            info!(zone = %self.name, override_kind = kind.name(), "override applied");
        }
        let outcome = self.engine.interrupt_session(kind);
        self.report_session(outcome);
        self.switch_off(now);
    }

    pub fn clear_override(&mut self, kind: OverrideKind) -> Option<Override> {
        let cleared = self.overrides.clear(kind);
        if cleared.is_some() {
            info!(zone = %self.name, override_kind = kind.name(), "override cleared");
            // Replan at the next tick instead of waiting out the period.
            self.next_period_at = None;
        }
        cleared
    }

    /// Active overrides, highest priority first.
    pub fn active_overrides(&self) -> Vec<Override> {
        self.overrides.active().cloned().collect()
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        self.engine.snapshot()
    }

    /// Replace learned state. Demand timing and the pipe model are
    /// ephemeral and start from scratch.
    pub fn restore(&mut self, snapshot: &LearningSnapshot) {
        self.engine = LearningEngine::restore(
            self.engine.installation(),
            &self.learning_config,
            snapshot,
        );
        self.pipeline.reset();
        self.demand.reset();
        self.close_at = None;
        self.next_period_at = None;
        if self.actuator_on {
            self.actuator_on = false;
            self.actuator.set_actuator(false);
        }
    }

    /// Strict restore from persisted JSON. On error the zone keeps its
    /// current learned state.
    pub fn restore_json(&mut self, json: &str) -> EmberResult<()> {
        let snapshot = LearningSnapshot::from_json(json)?;
        self.restore(&snapshot);
        Ok(())
    }

    pub fn rollback(&mut self) {
        let previous = self.engine.status();
        let report = self.engine.rollback();
        if report.status != previous {
            self.events.emit_tier_changed(&TierChangedEvent {
                from: previous,
                to: report.status,
                confidence_pct: report.confidence_pct,
            });
        }
    }

    pub fn outdoor_temp_lagged(&self) -> Option<f64> {
        self.outdoor.lagged()
    }

    pub fn committed_heat_remaining(&self, now: f64) -> f64 {
        self.pipeline.committed_heat_remaining(now)
    }

    pub fn calculate_valve_open_duration(
        &self,
        requested_duty: f64,
        pwm_period: f64,
        committed: f64,
    ) -> f64 {
        self.pipeline
            .calculate_valve_open_duration(requested_duty, pwm_period, committed)
    }

    pub fn learning_status_and_confidence(&self) -> (u8, f64) {
        self.engine.learning_status_and_confidence()
    }

    pub fn can_reach_tier(&self, tier: u8) -> bool {
        self.engine.can_reach_tier(tier)
    }

    pub fn get_heating_rate(&self, delta: f64, outdoor_temp: Option<f64>) -> (f64, RateSource) {
        self.engine.get_heating_rate(delta, outdoor_temp)
    }

    fn switch_on(&mut self, now: f64) {
        if self.actuator_on {
            return;
        }
        self.actuator_on = true;
        self.actuator.set_actuator(true);
        // A valve reopened mid-close keeps the pipe it already filled.
        if self.demand.state() == DemandState::Idle {
            self.pipeline.valve_opened(now);
        }
        let events = self.demand.command(true, now);
        self.handle_demand_events(&events);
    }

    fn switch_off(&mut self, now: f64) {
        self.close_at = None;
        if !self.actuator_on {
            return;
        }
        self.actuator_on = false;
        self.actuator.set_actuator(false);
        self.release_valve(now);
    }

    /// Signal OFF at `at`. Transitions due before `at` fire first, so a late
    /// poll still sees the valve reach full travel before it closes.
    fn release_valve(&mut self, at: f64) -> Vec<DemandEvent> {
        let mut events = self.demand.poll(at);
        self.handle_demand_events(&events);
        if self.demand.state() == DemandState::OpenPending {
            // Cut short mid-travel: no edges, but the pipe still took water.
            self.pipeline
                .valve_closed(at + self.pipeline.valve_time() / 2.0);
        }
        let closing = self.demand.command(false, at);
        self.handle_demand_events(&closing);
        events.extend(closing);
        events
    }

    fn handle_demand_events(&mut self, events: &[DemandEvent]) {
        for event in events {
            match event {
                DemandEvent::HeatingStarted(e) => self.events.emit_heating_started(e),
                DemandEvent::HeatingEnded(e) => {
                    self.pipeline.valve_closed(e.at);
                    self.events.emit_heating_ended(e);
                }
            }
        }
    }

    fn report_session(&self, outcome: Option<SessionOutcome>) {
        match outcome {
            Some(SessionOutcome::Banked {
                observation,
                cycles,
                ..
            }) => self.events.emit_session_banked(&SessionBankedEvent {
                rate: observation.rate,
                duration_minutes: observation.duration_minutes,
                stalled: observation.stalled,
                cycles,
            }),
            Some(SessionOutcome::Discarded { reason, cycles }) => self
                .events
                .emit_session_discarded(&SessionDiscardedEvent { reason, cycles }),
            None => {}
        }
    }
}

impl<A: Actuator> std::fmt::Debug for Zone<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.name)
            .field("actuator_on", &self.actuator_on)
            .field("demand", &self.demand.state())
            .field("status", &self.engine.status())
            .field("handlers", &self.events.handler_count())
            .finish()
    }
}
