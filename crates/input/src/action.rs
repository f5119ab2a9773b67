use glam::Vec2;

/// A high-level action produced by a front-end from raw window input.
///
/// The demo state consumes actions, never raw events, so the desktop app and
/// headless drivers share one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pointer moved; carries its normalized device coordinates.
    PointerMoved(Vec2),
    /// Pointer left the viewport; the field relaxes toward flat.
    PointerLeft,
    /// Orbit the camera by a drag delta in pixels.
    Orbit(Vec2),
    /// Zoom the camera by scroll lines (positive moves closer).
    Zoom(f32),
    /// Show or hide the parameter panel.
    TogglePanel,
    /// Switch between point-cloud and mesh rendering.
    ToggleSurface,
    /// Flatten the field.
    ResetField,
    /// No-op (input that isn't bound to anything).
    Noop,
}

impl Action {
    /// Whether the action only moves the view and leaves demo state alone.
    pub fn is_view_only(&self) -> bool {
        matches!(self, Self::Orbit(_) | Self::Zoom(_) | Self::TogglePanel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_actions_carry_ndc() {
        let a = Action::PointerMoved(Vec2::new(0.5, -0.25));
        assert!(matches!(a, Action::PointerMoved(p) if p == Vec2::new(0.5, -0.25)));
        assert!(!a.is_view_only());
    }

    #[test]
    fn view_only_actions() {
        assert!(Action::Orbit(Vec2::ONE).is_view_only());
        assert!(Action::Zoom(1.0).is_view_only());
        assert!(Action::TogglePanel.is_view_only());
        assert!(!Action::ToggleSurface.is_view_only());
        assert!(!Action::ResetField.is_view_only());
        assert!(!Action::Noop.is_view_only());
    }
}
