//! Input model: mouse buttons, keys, and the drag/measure state machine.
//!
//! `ButtonCounters` track how many presses of each button are outstanding,
//! which tolerates duplicate downs from the host. `InputState` is the
//! interaction in progress between a press and its release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::MOUSE_DRAG_THRESHOLD;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left button: draws a custom marker, or deletes the hovered one.
    Primary,
    /// Wheel click: pans while zoomed.
    Middle,
    /// Right button: measures without creating a marker.
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Outstanding presses per button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonCounters {
    primary: u32,
    middle: u32,
    secondary: u32,
}

impl ButtonCounters {
    fn slot(&mut self, button: Button) -> &mut u32 {
        match button {
            Button::Primary => &mut self.primary,
            Button::Middle => &mut self.middle,
            Button::Secondary => &mut self.secondary,
        }
    }

    pub fn press(&mut self, button: Button) {
        let slot = self.slot(button);
        *slot = slot.saturating_add(1);
    }

    /// A release without a matching press leaves the counter at zero.
    pub fn release(&mut self, button: Button) {
        let slot = self.slot(button);
        *slot = slot.saturating_sub(1);
    }

    #[must_use]
    pub fn held(&self, button: Button) -> bool {
        match button {
            Button::Primary => self.primary > 0,
            Button::Middle => self.middle > 0,
            Button::Secondary => self.secondary > 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Interaction in progress. Start points are in map space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InputState {
    #[default]
    Idle,
    /// Primary held: drawing a custom marker.
    Dragging { start: Point },
    /// Secondary held: previewing a measurement.
    Measuring { start: Point },
}

impl InputState {
    /// Start point of the draft segment, if any.
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        match *self {
            Self::Idle => None,
            Self::Dragging { start } | Self::Measuring { start } => Some(start),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Whether a map-space segment is long enough to draw or submit.
#[must_use]
pub fn is_line_long_enough(p0: Point, p1: Point) -> bool {
    p0.distance_sq(p1) >= MOUSE_DRAG_THRESHOLD
}
