//! LearningEngine: orchestrates the per-cycle learning pipeline for a zone.

use ember_core::config::LearningConfig;
use ember_core::constants::SECONDS_PER_HOUR;
use ember_core::types::{CycleOutcome, InstallationType, LearningStatus, OverrideKind};
use tracing::{debug, info};

use crate::contribution::ConfidenceContributionTracker;
use crate::cycle_weight::{effective_duty, CycleWeightCalculator, WeightConstants};
use crate::heating_rate::{HeatingRateLearner, RateSource, SessionOutcome};
use crate::overshoot::{OvershootDecomposer, OvershootSplit};
use crate::persistence::LearningSnapshot;
use crate::status::{evaluate_status, StatusReport};

/// Measurements of one completed cycle, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleMetrics {
    /// Room temperature when the cycle began.
    pub start_temp: f64,
    pub setpoint: f64,
    pub peak_temp: f64,
    /// Room temperature when the cycle ended.
    pub end_temp: f64,
    /// Highest duty requested during the cycle, 0 to 1.
    pub peak_duty: f64,
    /// Seconds of heat still in the pipe when setpoint was reached.
    pub committed_heat_seconds: f64,
    /// Committed heat as a fraction of the PWM period.
    pub committed_heat_ratio: f64,
    /// Minutes from cycle start to peak, when the rise was observed.
    pub rise_time_minutes: Option<f64>,
    pub outdoor_temp: Option<f64>,
    pub night_setback_recovery: bool,
    /// Monotonic seconds.
    pub ended_at: f64,
}

impl CycleMetrics {
    pub fn starting_delta(&self) -> f64 {
        self.setpoint - self.start_temp
    }
}

/// What the engine concluded about one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleAssessment {
    pub starting_delta: f64,
    pub recovery: bool,
    pub split: OvershootSplit,
    pub outcome: CycleOutcome,
    pub weight: f64,
    /// Confidence actually added after caps.
    pub gain_applied: f64,
    pub rate_recorded: bool,
    pub session: Option<SessionOutcome>,
    pub previous_status: LearningStatus,
    pub report: StatusReport,
}

impl CycleAssessment {
    pub fn tier_changed(&self) -> bool {
        self.previous_status != self.report.status
    }
}

/// Owns every learning component of one zone.
///
/// Pipeline per cycle: decompose overshoot → classify → weight → capped
/// gain → per-cycle rate → session step → heating-rate confidence → status.
#[derive(Debug, Clone)]
pub struct LearningEngine {
    calculator: CycleWeightCalculator,
    decomposer: OvershootDecomposer,
    tracker: ConfidenceContributionTracker,
    learner: HeatingRateLearner,
    base_gain: f64,
    status: LearningStatus,
}

impl LearningEngine {
    pub fn new(installation: InstallationType) -> Self {
        Self::with_config(installation, &LearningConfig::default())
    }

    pub fn with_config(installation: InstallationType, config: &LearningConfig) -> Self {
        let tracker = ConfidenceContributionTracker::new(installation)
            .with_diminishing_rate(config.effective_diminishing_rate());
        Self::assemble(installation, config, tracker, HeatingRateLearner::new(installation))
    }

    /// Restore from a snapshot. Status is re-derived, never persisted.
    pub fn restore(
        installation: InstallationType,
        config: &LearningConfig,
        snapshot: &LearningSnapshot,
    ) -> Self {
        let (tracker, learner) = snapshot.restore(installation, config.effective_diminishing_rate());
        Self::assemble(installation, config, tracker, learner)
    }

    fn assemble(
        installation: InstallationType,
        config: &LearningConfig,
        tracker: ConfidenceContributionTracker,
        learner: HeatingRateLearner,
    ) -> Self {
        let status = evaluate_status(&tracker).status;
        Self {
            calculator: CycleWeightCalculator::with_constants(
                installation,
                WeightConstants::from(config),
            ),
            decomposer: OvershootDecomposer {
                overshoot_threshold: config.effective_overshoot_threshold(),
                undershoot_threshold: config.effective_undershoot_threshold(),
            },
            tracker,
            learner,
            base_gain: config.effective_base_confidence_gain().max(0.0),
            status,
        }
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        LearningSnapshot::capture(&self.tracker, &self.learner)
    }

    pub fn installation(&self) -> InstallationType {
        self.calculator.installation()
    }

    pub fn tracker(&self) -> &ConfidenceContributionTracker {
        &self.tracker
    }

    pub fn learner(&self) -> &HeatingRateLearner {
        &self.learner
    }

    pub fn status(&self) -> LearningStatus {
        self.status
    }

    /// `(tier, confidence percentage)`.
    pub fn learning_status_and_confidence(&self) -> (u8, f64) {
        let report = evaluate_status(&self.tracker);
        (report.tier(), report.confidence_pct)
    }

    pub fn can_reach_tier(&self, tier: u8) -> bool {
        self.tracker.can_reach_tier(tier)
    }

    pub fn get_heating_rate(&self, delta: f64, outdoor_temp: Option<f64>) -> (f64, RateSource) {
        self.learner.get_heating_rate(delta, outdoor_temp)
    }

    /// Feed a room reading to the session state machine.
    pub fn observe_room(
        &mut self,
        room_temp: f64,
        setpoint: f64,
        outdoor_temp: Option<f64>,
        now: f64,
    ) -> Option<SessionOutcome> {
        let outcome = self.learner.observe_room(room_temp, setpoint, outdoor_temp, now);
        if matches!(outcome, Some(SessionOutcome::Banked { .. })) {
            self.refresh_heating_rate_confidence();
        }
        outcome
    }

    pub fn interrupt_session(&mut self, kind: OverrideKind) -> Option<SessionOutcome> {
        self.learner.interrupt_session(kind)
    }

    /// Explicit rollback: clear recovery evidence and re-derive the status.
    pub fn rollback(&mut self) -> StatusReport {
        self.tracker.rollback();
        let report = evaluate_status(&self.tracker);
        self.status = report.status;
        report
    }

    pub fn complete_cycle(&mut self, metrics: &CycleMetrics) -> CycleAssessment {
        let starting_delta = metrics.starting_delta();
        let previous_status = self.status;
        let is_stable = previous_status.is_stable();

        let (rate_per_hour, _) = self
            .learner
            .get_heating_rate(starting_delta.max(0.0), metrics.outdoor_temp);
        let split = OvershootDecomposer::decompose(
            metrics.peak_temp,
            metrics.setpoint,
            metrics.committed_heat_seconds.max(0.0),
            rate_per_hour / SECONDS_PER_HOUR,
        );
        let outcome = self
            .decomposer
            .classify(&split, metrics.peak_temp, metrics.setpoint);

        let recovery = self.calculator.is_recovery_cycle(starting_delta, is_stable);
        let weight = self.calculator.calculate_weight(
            starting_delta,
            is_stable,
            outcome,
            Some(effective_duty(metrics.peak_duty, metrics.committed_heat_ratio)),
            metrics.outdoor_temp,
            metrics.night_setback_recovery,
        );
        let gain = self.base_gain * weight;
        let gain_applied = if recovery {
            self.tracker.add_recovery_cycle();
            self.tracker.apply_recovery_gain(gain)
        } else {
            self.tracker.apply_maintenance_gain(gain)
        };

        let rate_recorded = metrics.rise_time_minutes.is_some_and(|minutes| {
            self.learner.add_cycle_observation(
                metrics.peak_temp - metrics.start_temp,
                minutes,
                starting_delta,
                metrics.outdoor_temp,
            )
        });

        let session =
            self.learner
                .on_cycle_complete(metrics.peak_duty, metrics.end_temp, metrics.ended_at);

        self.refresh_heating_rate_confidence();

        let report = evaluate_status(&self.tracker);
        if report.status != previous_status {
            info!(
                from = %previous_status,
                to = %report.status,
                confidence_pct = report.confidence_pct,
                recovery_cycles = self.tracker.recovery_cycle_count(),
                "learning status changed"
            );
        }
        self.status = report.status;

        debug!(
            starting_delta,
            recovery,
            outcome = %outcome,
            controllable = split.controllable,
            committed = split.committed,
            weight,
            gain_applied,
            "cycle assessed"
        );

        CycleAssessment {
            starting_delta,
            recovery,
            split,
            outcome,
            weight,
            gain_applied,
            rate_recorded,
            session,
            previous_status,
            report,
        }
    }

    fn refresh_heating_rate_confidence(&mut self) {
        let target =
            self.learner.get_rate_consistency_score() * self.tracker.heating_rate_cap();
        self.tracker.raise_heating_rate_to(target);
    }
}
