use glam::{Mat4, Vec3};

/// A line segment between two points.
pub type Edge = [Vec3; 2];

/// Line segments of a cone centered on the origin: apex at `+height / 2`,
/// base ring of `radial_segments` sides at `-height / 2`, plus spokes from
/// every ring vertex to the apex and to the base center.
pub fn cone_wireframe(radius: f32, height: f32, radial_segments: usize) -> Vec<Edge> {
    let segments = radial_segments.max(3);
    let apex = Vec3::new(0.0, height * 0.5, 0.0);
    let base_center = Vec3::new(0.0, -height * 0.5, 0.0);
    let ring: Vec<Vec3> = (0..segments)
        .map(|k| {
            let theta = k as f32 / segments as f32 * std::f32::consts::TAU;
            Vec3::new(radius * theta.sin(), -height * 0.5, radius * theta.cos())
        })
        .collect();

    let mut edges = Vec::with_capacity(segments * 3);
    for (k, &v) in ring.iter().enumerate() {
        edges.push([v, ring[(k + 1) % segments]]);
        edges.push([v, apex]);
        edges.push([v, base_center]);
    }
    edges
}

/// The rotating wireframe demo: a cone turning about its X axis a fixed
/// amount every frame.
#[derive(Debug, Clone)]
pub struct Spinner {
    edges: Vec<Edge>,
    rotation_x: f32,
    spin_rate: f32,
}

impl Default for Spinner {
    fn default() -> Self {
        // Radius 10, unit height, 32 sides.
        Self::new(10.0, 1.0, 32, 0.01)
    }
}

impl Spinner {
    pub fn new(radius: f32, height: f32, radial_segments: usize, spin_rate: f32) -> Self {
        Self {
            edges: cone_wireframe(radius, height, radial_segments),
            rotation_x: 0.0,
            spin_rate,
        }
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.rotation_x = (self.rotation_x + self.spin_rate) % std::f32::consts::TAU;
    }

    pub fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cone_edge_count() {
        assert_eq!(cone_wireframe(1.0, 2.0, 8).len(), 24);
        // Fewer than three sides is not a cone.
        assert_eq!(cone_wireframe(1.0, 2.0, 1).len(), 9);
    }

    #[test]
    fn cone_vertices_on_surface() {
        for [a, b] in cone_wireframe(2.0, 4.0, 12) {
            for v in [a, b] {
                let on_ring = (v.y + 2.0).abs() < 1e-5 && (v.x.hypot(v.z) - 2.0).abs() < 1e-4;
                let apex = (v - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5;
                let center = (v - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5;
                assert!(on_ring || apex || center, "{v}");
            }
        }
    }

    #[test]
    fn spinner_advances_each_frame() {
        let mut s = Spinner::default();
        assert_eq!(s.rotation_x(), 0.0);
        s.step();
        s.step();
        assert!((s.rotation_x() - 0.02).abs() < 1e-7);
        let m = s.model_matrix();
        assert!(!m.col(1).y.is_nan());
    }

    #[test]
    fn default_cone_is_wide_and_flat() {
        let s = Spinner::default();
        assert_eq!(s.edges().len(), 32 * 3);
        let (mut max_r, mut max_y) = (0.0_f32, 0.0_f32);
        for v in s.edges().iter().flatten() {
            max_r = max_r.max(v.x.hypot(v.z));
            max_y = max_y.max(v.y.abs());
        }
        assert!((max_r - 10.0).abs() < 1e-4);
        assert!((max_y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn spinner_rotation_wraps() {
        let mut s = Spinner::new(1.0, 1.0, 4, 1.0);
        for _ in 0..10 {
            s.step();
        }
        assert!(s.rotation_x() < std::f32::consts::TAU);
    }
}
