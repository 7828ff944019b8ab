//! Event payloads emitted by a zone.

use serde::{Deserialize, Serialize};

use crate::types::{LearningStatus, OverrideKind};

/// Heat is now actually being delivered (valve finished opening).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatingStartedEvent {
    pub at: f64,
}

/// Heat delivery has now actually ended (valve passed half-closed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatingEndedEvent {
    pub at: f64,
}

/// The requested duty cannot be delivered within one PWM period given valve
/// travel and transport delay. The schedule is still applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWarningEvent {
    pub requested_duty: f64,
    pub pwm_period: f64,
    pub minimum_period: f64,
}

/// A recovery session was converted into a heating-rate observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionBankedEvent {
    pub rate: f64,
    pub duration_minutes: f64,
    pub stalled: bool,
    pub cycles: u32,
}

/// Why a recovery session was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DiscardReason {
    Override(OverrideKind),
    TooShort,
    NoRise,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionDiscardedEvent {
    pub reason: DiscardReason,
    pub cycles: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierChangedEvent {
    pub from: LearningStatus,
    pub to: LearningStatus,
    pub confidence_pct: f64,
}
