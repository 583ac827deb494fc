use crate::action::Action;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

/// Tracks pointer state and turns drags and wheel steps into orbit actions.
///
/// Dragging with the primary button rotates; the wheel dollies. Each wheel
/// event counts as one notch regardless of its magnitude.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    rotating: bool,
    last: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        if button == PointerButton::Primary {
            self.rotating = pressed;
        }
    }

    /// Cursor moved to `(x, y)` in logical pixels.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<Action> {
        if !x.is_finite() || !y.is_finite() {
            tracing::trace!(x, y, "ignoring non-finite pointer position");
            return None;
        }
        let pos = Vec2::new(x, y);
        let prev = self.last.replace(pos);
        match prev {
            Some(prev) if self.rotating => {
                let d = pos - prev;
                (d != Vec2::ZERO).then_some(Action::Rotate { dx: d.x, dy: d.y })
            }
            _ => None,
        }
    }

    /// Cursor left the window: the next motion starts a fresh drag segment.
    pub fn cursor_left(&mut self) {
        self.last = None;
        self.rotating = false;
    }

    /// Vertical wheel delta; positive scrolls up (towards the target).
    pub fn wheel(&mut self, delta_y: f32) -> Option<Action> {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return None;
        }
        Some(Action::Dolly(delta_y.signum()))
    }
}
