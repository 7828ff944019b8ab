//! Interrupting overrides. Each kind owns one fixed slot; active overrides
//! are reported in rank order (highest priority first).

use serde::{Deserialize, Serialize};

/// An override signal from an external sensor. Any active override
/// interrupts heating and discards an in-flight recovery session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Override {
    /// Temperature-drop based open-window detection.
    OpenWindow { temp_drop: f64 },
    /// A door/window contact sensor reports open.
    ContactOpen { open_since: f64 },
    /// Heating paused while humidity is high (shower, cooking).
    HumidityPause { humidity: f64 },
}

/// Payload-free discriminant of [`Override`], ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    OpenWindow = 0,
    ContactOpen = 1,
    HumidityPause = 2,
}

impl OverrideKind {
    pub const COUNT: usize = 3;

    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenWindow => "open_window",
            Self::ContactOpen => "contact_open",
            Self::HumidityPause => "humidity_pause",
        }
    }
}

impl Override {
    pub fn kind(&self) -> OverrideKind {
        match self {
            Self::OpenWindow { .. } => OverrideKind::OpenWindow,
            Self::ContactOpen { .. } => OverrideKind::ContactOpen,
            Self::HumidityPause { .. } => OverrideKind::HumidityPause,
        }
    }
}

/// Fixed array of override slots, one per [`OverrideKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSlots {
    slots: [Option<Override>; OverrideKind::COUNT],
}

impl OverrideSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an override, replacing any previous one of the same kind.
    /// Returns true if the slot was previously empty.
    pub fn set(&mut self, ov: Override) -> bool {
        self.slots[ov.kind().rank()].replace(ov).is_none()
    }

    /// Clear an override kind. Returns the cleared override, if any.
    pub fn clear(&mut self, kind: OverrideKind) -> Option<Override> {
        self.slots[kind.rank()].take()
    }

    pub fn is_active(&self, kind: OverrideKind) -> bool {
        self.slots[kind.rank()].is_some()
    }

    pub fn any_active(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Active overrides, highest priority first.
    pub fn active(&self) -> impl Iterator<Item = &Override> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// The highest-priority active override.
    pub fn highest(&self) -> Option<&Override> {
        self.active().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_is_rank_ordered_regardless_of_insertion() {
        let mut slots = OverrideSlots::new();
        slots.set(Override::HumidityPause { humidity: 80.0 });
        slots.set(Override::OpenWindow { temp_drop: 1.2 });
        slots.set(Override::ContactOpen { open_since: 10.0 });

        let kinds: Vec<_> = slots.active().map(Override::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OverrideKind::OpenWindow,
                OverrideKind::ContactOpen,
                OverrideKind::HumidityPause
            ]
        );
    }

    #[test]
    fn set_replaces_same_kind() {
        let mut slots = OverrideSlots::new();
        assert!(slots.set(Override::HumidityPause { humidity: 70.0 }));
        assert!(!slots.set(Override::HumidityPause { humidity: 85.0 }));
        assert_eq!(slots.active().count(), 1);
        assert_eq!(
            slots.highest(),
            Some(&Override::HumidityPause { humidity: 85.0 })
        );
    }

    #[test]
    fn clear_empties_slot() {
        let mut slots = OverrideSlots::new();
        slots.set(Override::ContactOpen { open_since: 0.0 });
        assert!(slots.clear(OverrideKind::ContactOpen).is_some());
        assert!(slots.clear(OverrideKind::ContactOpen).is_none());
        assert!(!slots.any_active());
    }
}
