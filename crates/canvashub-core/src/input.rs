//! Pointer and wheel input events.

use crate::envelope::{EnvelopeId, TagId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl only.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Whether the wheel should zoom instead of scrolling the page.
    pub fn zooms(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the pointer landed on when a press started.
///
/// Resolved by the host from its own widget tree; controls inside an envelope
/// (buttons, text fields) report [`PointerTarget::Control`] so they never start
/// a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// Empty canvas: starts a pan.
    Canvas,
    /// Envelope header outside any control: starts a reposition drag.
    EnvelopeHeader(EnvelopeId),
    /// A tag's image handle: starts a tag transfer drag.
    TagHandle { envelope: EnvelopeId, tag: TagId },
    /// Anywhere else inside an envelope, including its controls.
    Control(EnvelopeId),
}

/// Pointer event type for unified mouse/pen handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        target: PointerTarget,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    /// Pointer capture lost; any gesture is abandoned.
    Cancel,
    Wheel {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    /// Screen position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Down { position, .. }
            | Self::Move { position }
            | Self::Up { position, .. }
            | Self::Wheel { position, .. } => Some(*position),
            Self::Cancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_modifier() {
        assert!(Modifiers::CTRL.zooms());
        assert!(Modifiers { meta: true, ..Default::default() }.zooms());
        assert!(!Modifiers { shift: true, ..Default::default() }.zooms());
        assert!(!Modifiers::default().zooms());
    }

    #[test]
    fn test_event_position() {
        let down = PointerEvent::Down {
            position: Point::new(1.0, 2.0),
            button: MouseButton::Left,
            target: PointerTarget::Canvas,
        };
        assert_eq!(down.position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(PointerEvent::Cancel.position(), None);
    }
}
