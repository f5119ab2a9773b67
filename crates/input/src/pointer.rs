use glam::{UVec2, Vec2};

use crate::action::Action;

/// Tracks the cursor in physical pixels and converts it to normalized
/// device coordinates for picking.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    position: Option<Vec2>,
    viewport: UVec2,
    drag_origin: Option<Vec2>,
}

impl Pointer {
    pub fn new(viewport: UVec2) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, viewport: UVec2) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Record a cursor move. While a drag is in progress the move orbits the
    /// camera; otherwise it moves the contact pointer.
    pub fn moved(&mut self, position: Vec2) -> Action {
        self.position = Some(position);
        if let Some(origin) = self.drag_origin {
            self.drag_origin = Some(position);
            return Action::Orbit(position - origin);
        }
        match self.ndc() {
            Some(ndc) => Action::PointerMoved(ndc),
            None => Action::Noop,
        }
    }

    pub fn left(&mut self) -> Action {
        self.position = None;
        self.drag_origin = None;
        Action::PointerLeft
    }

    pub fn begin_drag(&mut self) {
        self.drag_origin = self.position;
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Cursor in NDC: `[-1, 1]` on both axes with +Y up. `None` when the
    /// cursor is outside the window or the viewport has no area.
    pub fn ndc(&self) -> Option<Vec2> {
        let position = self.position?;
        if self.viewport.x == 0 || self.viewport.y == 0 {
            return None;
        }
        let size = self.viewport.as_vec2();
        Some(Vec2::new(
            position.x / size.x * 2.0 - 1.0,
            -(position.y / size.y * 2.0 - 1.0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_and_center() {
        let mut p = Pointer::new(UVec2::new(800, 600));
        assert_eq!(p.ndc(), None);

        p.moved(Vec2::new(400.0, 300.0));
        assert_eq!(p.ndc(), Some(Vec2::ZERO));

        p.moved(Vec2::new(0.0, 0.0));
        assert_eq!(p.ndc(), Some(Vec2::new(-1.0, 1.0)));

        p.moved(Vec2::new(800.0, 600.0));
        assert_eq!(p.ndc(), Some(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn moved_reports_pointer_action() {
        let mut p = Pointer::new(UVec2::new(100, 100));
        assert_eq!(
            p.moved(Vec2::new(75.0, 25.0)),
            Action::PointerMoved(Vec2::new(0.5, 0.5))
        );
    }

    #[test]
    fn empty_viewport_has_no_ndc() {
        let mut p = Pointer::new(UVec2::new(0, 600));
        assert_eq!(p.moved(Vec2::new(10.0, 10.0)), Action::Noop);
        assert_eq!(p.ndc(), None);
    }

    #[test]
    fn leaving_clears_position() {
        let mut p = Pointer::new(UVec2::new(100, 100));
        p.moved(Vec2::new(10.0, 10.0));
        assert_eq!(p.left(), Action::PointerLeft);
        assert_eq!(p.ndc(), None);
    }

    #[test]
    fn drag_produces_orbit_deltas() {
        let mut p = Pointer::new(UVec2::new(100, 100));
        p.moved(Vec2::new(10.0, 10.0));
        p.begin_drag();
        assert!(p.is_dragging());
        assert_eq!(p.moved(Vec2::new(15.0, 8.0)), Action::Orbit(Vec2::new(5.0, -2.0)));
        assert_eq!(p.moved(Vec2::new(16.0, 8.0)), Action::Orbit(Vec2::new(1.0, 0.0)));
        p.end_drag();
        assert!(matches!(p.moved(Vec2::new(20.0, 20.0)), Action::PointerMoved(_)));
    }

    #[test]
    fn resize_changes_mapping() {
        let mut p = Pointer::new(UVec2::new(100, 100));
        p.moved(Vec2::new(50.0, 50.0));
        p.resize(UVec2::new(200, 100));
        assert_eq!(p.ndc(), Some(Vec2::new(-0.5, 0.0)));
        assert_eq!(p.viewport(), UVec2::new(200, 100));
    }
}
