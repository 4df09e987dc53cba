//! Gesture state machine: turns button edges into an editing mode and
//! rate-limits the edits a held button produces.

use std::time::Duration;

use crate::core::input::PointerButton;
use super::hit::{EditMode, HoverKind, HoverTarget};
use super::params::ParameterSet;
use super::store::VoxelStore;

/// Kind of edit an engaged gesture performs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Add,
    Remove,
    Paint,
}

impl From<ActionKind> for EditMode {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Add => EditMode::Add,
            ActionKind::Remove => EditMode::Remove,
            ActionKind::Paint => EditMode::Paint,
        }
    }
}

/// Gesture state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    Engaged { kind: ActionKind, button: PointerButton },
}

/// Last time each kind of action was performed. `None` is "never".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionTimestamps {
    add: Option<Duration>,
    remove: Option<Duration>,
    paint: Option<Duration>,
}

impl ActionTimestamps {
    fn slot(&mut self, kind: ActionKind) -> &mut Option<Duration> {
        match kind {
            ActionKind::Add => &mut self.add,
            ActionKind::Remove => &mut self.remove,
            ActionKind::Paint => &mut self.paint,
        }
    }

    pub fn last(&self, kind: ActionKind) -> Option<Duration> {
        match kind {
            ActionKind::Add => self.add,
            ActionKind::Remove => self.remove,
            ActionKind::Paint => self.paint,
        }
    }

    /// Forget the last action so the next one is not rate limited
    pub fn reset(&mut self, kind: ActionKind) {
        *self.slot(kind) = None;
    }

    /// Whether at least `interval_ms` has passed since the last action
    pub fn ready(&self, kind: ActionKind, now: Duration, interval_ms: f64) -> bool {
        match self.last(kind) {
            None => true,
            Some(last) => now.saturating_sub(last).as_nanos() as f64 / 1_000_000.0 >= interval_ms,
        }
    }

    pub fn record(&mut self, kind: ActionKind, now: Duration) {
        *self.slot(kind) = Some(now);
    }
}

/// Pointer gesture and modifier state
#[derive(Debug, Default)]
pub struct Interaction {
    gesture: Gesture,
    timestamps: ActionTimestamps,
    shift_held: bool,
    input_suppressed: bool,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self.gesture, Gesture::Engaged { .. })
    }

    /// Mode hover resolution should use
    pub fn mode(&self) -> EditMode {
        match self.gesture {
            Gesture::Idle => EditMode::None,
            Gesture::Engaged { kind, .. } => kind.into(),
        }
    }

    pub fn timestamps(&self) -> &ActionTimestamps {
        &self.timestamps
    }

    /// Button press. Returns the gesture kind if a gesture started.
    pub fn press(&mut self, button: PointerButton, shift: bool) -> Option<ActionKind> {
        self.shift_held = shift;
        if self.input_suppressed {
            return None;
        }

        let kind = match (button, shift) {
            (PointerButton::Primary, true) => ActionKind::Paint,
            (PointerButton::Primary, false) => ActionKind::Add,
            (PointerButton::Secondary, _) => ActionKind::Remove,
        };
        self.gesture = Gesture::Engaged { kind, button };
        self.timestamps.reset(kind);
        log::debug!("Gesture started: {:?}", kind);
        Some(kind)
    }

    /// Button release. Returns whether it ended the gesture.
    pub fn release(&mut self, button: PointerButton) -> bool {
        match self.gesture {
            Gesture::Engaged { button: engaged, kind } if engaged == button => {
                self.gesture = Gesture::Idle;
                log::debug!("Gesture ended: {:?}", kind);
                true
            }
            _ => false,
        }
    }

    /// End any gesture immediately (lost pointer capture)
    pub fn cancel(&mut self) {
        if self.is_engaged() {
            log::debug!("Gesture cancelled");
        }
        self.gesture = Gesture::Idle;
        self.shift_held = false;
    }

    pub fn set_shift_held(&mut self, held: bool) {
        self.shift_held = held;
    }

    pub fn set_input_suppressed(&mut self, suppressed: bool) {
        self.input_suppressed = suppressed;
    }

    pub fn is_input_suppressed(&self) -> bool {
        self.input_suppressed
    }

    /// Whether the hover preview is hidden: the settings surface has the
    /// pointer, or Shift is held for camera panning without a gesture.
    pub fn preview_suppressed(&self) -> bool {
        self.input_suppressed || (self.shift_held && !self.is_engaged())
    }

    /// Perform at most one edit on the hovered cell if the gesture allows it
    /// and the rate limit has elapsed. Returns the kind of edit performed.
    pub fn attempt(
        &mut self,
        hover: &HoverTarget,
        now: Duration,
        store: &mut VoxelStore,
        params: &ParameterSet,
    ) -> Option<ActionKind> {
        let Gesture::Engaged { kind, .. } = self.gesture else {
            return None;
        };
        if self.input_suppressed {
            return None;
        }

        let interval = params.placement_interval_ms();
        match (kind, hover.kind) {
            (ActionKind::Add, HoverKind::Add) => {
                let index = hover.index?;
                if !params.within_build_distance(index) || !self.timestamps.ready(kind, now, interval) {
                    return None;
                }
                store.add(index, params);
            }
            (ActionKind::Remove, HoverKind::Remove) => {
                let key = hover.key?;
                if !self.timestamps.ready(kind, now, interval) {
                    return None;
                }
                store.begin_remove(key);
            }
            (ActionKind::Paint, HoverKind::Paint) => {
                let key = hover.key?;
                if !self.timestamps.ready(kind, now, interval) {
                    return None;
                }
                store.paint(key, params.active_color());
            }
            _ => return None,
        }

        self.timestamps.record(kind, now);
        Some(kind)
    }
}
