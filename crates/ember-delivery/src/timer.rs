//! Cancellable delayed callbacks.
//!
//! Nothing in the control core sleeps. "Wait for the valve to finish
//! opening" is a timer entry with a fire time; the owner drains due entries
//! with [`TimerQueue::pop_due`] on its own timeline. Each owner keeps its own
//! queue, so canceling in one domain can never touch another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation.
pub trait Cancellable {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation. Idempotent, and a no-op once the timer fired.
    fn cancel(&self);
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    fire_at: f64,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn fire_at(&self) -> f64 {
        self.fire_at
    }
}

impl Cancellable for TimerHandle {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct TimerEntry<K> {
    id: u64,
    fire_at: f64,
    kind: K,
    cancelled: Arc<AtomicBool>,
}

/// Ordered set of pending timers carrying a payload `K`.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    entries: Vec<TimerEntry<K>>,
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Schedule `kind` to fire at `fire_at` (monotonic seconds).
    pub fn schedule(&mut self, fire_at: f64, kind: K) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries.push(TimerEntry {
            id,
            fire_at,
            kind,
            cancelled: Arc::clone(&cancelled),
        });
        TimerHandle {
            id,
            fire_at,
            cancelled,
        }
    }

    /// Remove and return every live entry due at or before `now`, ordered by
    /// fire time then scheduling order. Cancelled entries are dropped.
    pub fn pop_due(&mut self, now: f64) -> Vec<(f64, K)> {
        self.entries.retain(|e| !e.cancelled.load(Ordering::Relaxed));

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].fire_at <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.id.cmp(&b.id)));
        due.into_iter().map(|e| (e.fire_at, e.kind)).collect()
    }

    /// Earliest fire time among live entries.
    pub fn next_deadline(&self) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::Relaxed))
            .map(|e| e.fire_at)
            .min_by(f64::total_cmp)
    }

    /// Number of live (not cancelled) entries.
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::Relaxed))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Cancel and drop every entry.
    pub fn clear(&mut self) {
        for e in &self.entries {
            e.cancelled.store(true, Ordering::Relaxed);
        }
        self.entries.clear();
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
