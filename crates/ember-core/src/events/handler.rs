//! EmberEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for handling Ember events.
///
/// All methods have no-op default implementations, so handlers only need
/// to override the events they care about.
pub trait EmberEventHandler: Send + Sync {
    // ---- Demand edges ----
    fn on_heating_started(&self, _event: &HeatingStartedEvent) {}
    fn on_heating_ended(&self, _event: &HeatingEndedEvent) {}

    // ---- Scheduling ----
    fn on_schedule_warning(&self, _event: &ScheduleWarningEvent) {}

    // ---- Recovery sessions ----
    fn on_session_banked(&self, _event: &SessionBankedEvent) {}
    fn on_session_discarded(&self, _event: &SessionDiscardedEvent) {}

    // ---- Learning status ----
    fn on_tier_changed(&self, _event: &TierChangedEvent) {}
}
