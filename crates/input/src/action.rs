/// A high-level action produced from raw window input.
///
/// The camera rig and the app consume actions, never raw events, so the
/// mapping can be tested without a window.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Orbit the camera by a pointer delta in logical pixels.
    Rotate { dx: f32, dy: f32 },
    /// Dolly by wheel notches. Positive moves towards the target.
    Dolly(f32),
    /// Viewport changed to a logical size at the given device pixel ratio.
    Resize {
        width: f32,
        height: f32,
        pixel_ratio: f32,
    },
    ToggleHud,
    ToggleGridHelper,
    ToggleAxesHelper,
    Quit,
    /// No-op (input that has no binding).
    Noop,
}

/// Keys the app binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotKey {
    F1,
    G,
    X,
    Escape,
    Other,
}

impl HotKey {
    pub fn action(self) -> Action {
        match self {
            Self::F1 => Action::ToggleHud,
            Self::G => Action::ToggleGridHelper,
            Self::X => Action::ToggleAxesHelper,
            Self::Escape => Action::Quit,
            Self::Other => Action::Noop,
        }
    }
}

impl Action {
    /// Build a resize action; `None` for non-finite or negative sizes.
    pub fn resize(width: f32, height: f32, pixel_ratio: f32) -> Option<Self> {
        let ok = |v: f32| v.is_finite() && v >= 0.0;
        if ok(width) && ok(height) && ok(pixel_ratio) && pixel_ratio > 0.0 {
            Some(Self::Resize {
                width,
                height,
                pixel_ratio,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotkeys_map_to_actions() {
        assert_eq!(HotKey::F1.action(), Action::ToggleHud);
        assert_eq!(HotKey::G.action(), Action::ToggleGridHelper);
        assert_eq!(HotKey::X.action(), Action::ToggleAxesHelper);
        assert_eq!(HotKey::Escape.action(), Action::Quit);
        assert_eq!(HotKey::Other.action(), Action::Noop);
    }

    #[test]
    fn resize_rejects_bad_values() {
        assert!(Action::resize(800.0, 600.0, 1.0).is_some());
        assert!(Action::resize(f32::NAN, 600.0, 1.0).is_none());
        assert!(Action::resize(800.0, -1.0, 1.0).is_none());
        assert!(Action::resize(800.0, 600.0, 0.0).is_none());
    }
}
