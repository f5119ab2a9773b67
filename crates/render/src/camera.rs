use glam::{Mat4, Vec2, Vec3};

use crate::pick::Ray;

/// Orbit camera circling a target point, driven by drag and scroll.
/// Camera motion is view state only; it never touches the scene.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 40.0,
            yaw: 0.0,
            pitch: 35.0_f32.to_radians(),
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.005,
            min_distance: 2.0,
            max_distance: 200.0,
        }
    }
}

impl OrbitCamera {
    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye()).normalize()
    }

    /// Orbit by a drag delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    /// Move toward (positive) or away from the target by scroll lines.
    pub fn zoom(&mut self, lines: f32) {
        self.distance =
            (self.distance * 0.9_f32.powf(lines)).clamp(self.min_distance, self.max_distance);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray from the eye through a point in normalized device
    /// coordinates. Clip-space depth runs 0 (near) to 1 (far).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let eye = self.eye();
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(eye, far - eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = OrbitCamera::default();
        assert!(cam.eye().y > 0.0);
        assert!((cam.eye().length() - cam.distance).abs() < 1e-4);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = OrbitCamera::default();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert!((ray.origin - cam.eye()).length() < 1e-5);
        assert!((ray.direction - cam.forward()).length() < 1e-4);
    }

    #[test]
    fn off_center_ray_leans_right() {
        let cam = OrbitCamera::default();
        let ray = cam.ray_from_ndc(Vec2::new(0.5, 0.0));
        // Yaw 0 looks down -Z, so screen right is world +X.
        assert!(ray.direction.x > 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 1.0e6);
        assert!(cam.pitch <= 89.0_f32.to_radians() + 1e-6);
        assert!(!cam.view_matrix().col(0).x.is_nan());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        let start = cam.distance;
        cam.zoom(1.0);
        assert!(cam.distance < start);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, cam.min_distance);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, cam.max_distance);
    }
}
