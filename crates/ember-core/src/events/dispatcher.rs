//! EventDispatcher: synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::EmberEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EmberEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn EmberEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler does not prevent later handlers from receiving it.
    fn emit<F: Fn(&dyn EmberEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    // ---- Demand edges ----
    pub fn emit_heating_started(&self, event: &HeatingStartedEvent) {
        self.emit(|h| h.on_heating_started(event));
    }

    pub fn emit_heating_ended(&self, event: &HeatingEndedEvent) {
        self.emit(|h| h.on_heating_ended(event));
    }

    // ---- Scheduling ----
    pub fn emit_schedule_warning(&self, event: &ScheduleWarningEvent) {
        self.emit(|h| h.on_schedule_warning(event));
    }

    // ---- Recovery sessions ----
    pub fn emit_session_banked(&self, event: &SessionBankedEvent) {
        self.emit(|h| h.on_session_banked(event));
    }

    pub fn emit_session_discarded(&self, event: &SessionDiscardedEvent) {
        self.emit(|h| h.on_session_discarded(event));
    }

    // ---- Learning status ----
    pub fn emit_tier_changed(&self, event: &TierChangedEvent) {
        self.emit(|h| h.on_tier_changed(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
