use glam::{Mat4, Vec2, Vec3};
use ripple_common::{ContactPoint, SurfaceKind};
use ripple_kernel::HeightField;

use crate::camera::OrbitCamera;

/// A half-line. `direction` is normalized by [`Ray::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Default pick radius around each point, in lattice steps. Anything over
/// half a diagonal (about 0.71) leaves no gaps between sites.
pub const DEFAULT_POINT_THRESHOLD: f32 = 0.75;

/// How a ray is tested against the surface. Fixed when the surface is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickStrategy {
    /// Nearest lattice point within `threshold` lattice steps of the ray.
    /// A step is the coarser of the two grid spacings, in world units.
    Points { threshold: f32 },
    /// Nearest hit on the displaced triangle mesh, interpolated.
    Mesh,
}

impl PickStrategy {
    pub fn for_surface(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Points => Self::Points {
                threshold: DEFAULT_POINT_THRESHOLD,
            },
            SurfaceKind::Mesh => Self::Mesh,
        }
    }

    /// Contact point of `ray` (world space) on `field` placed by `model`.
    pub fn pick(&self, ray: &Ray, field: &HeightField, model: Mat4) -> Option<ContactPoint> {
        match *self {
            Self::Points { threshold } => pick_points(ray, field, model, threshold),
            Self::Mesh => pick_mesh(ray, field, model),
        }
    }
}

fn pick_points(ray: &Ray, field: &HeightField, model: Mat4, threshold: f32) -> Option<ContactPoint> {
    // The surface transform scales uniformly; the field spans one local unit.
    let scale = model.x_axis.truncate().length();
    let step = scale / field.width().min(field.length()) as f32;
    let reach = threshold * step;
    let threshold_sq = reach * reach;
    let mut best: Option<(f32, usize)> = None;
    for i in 0..field.len() {
        let to_point = model.transform_point3(field.position(i)) - ray.origin;
        let t = to_point.dot(ray.direction);
        if t <= 0.0 {
            continue;
        }
        let off_ray_sq = to_point.length_squared() - t * t;
        if off_ray_sq > threshold_sq {
            continue;
        }
        if best.is_none_or(|(best_t, _)| t < best_t) {
            best = Some((t, i));
        }
    }
    best.map(|(_, i)| ContactPoint(field.planar(i)))
}

fn pick_mesh(ray: &Ray, field: &HeightField, model: Mat4) -> Option<ContactPoint> {
    // Work in local space so the hit's x/y are the planar coordinates. The
    // transformed direction is not renormalized; `t` stays comparable.
    let inverse = model.inverse();
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);

    let stride = field.length();
    let mut nearest: Option<f32> = None;
    for row in 0..field.width() - 1 {
        for col in 0..stride - 1 {
            let a = row * stride + col;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            for [p, q, r] in [[a, b, c], [b, d, c]] {
                let hit = ray_triangle(
                    origin,
                    direction,
                    field.position(p),
                    field.position(q),
                    field.position(r),
                );
                if let Some(t) = hit {
                    if nearest.is_none_or(|n| t < n) {
                        nearest = Some(t);
                    }
                }
            }
        }
    }
    nearest.map(|t| {
        let hit = origin + direction * t;
        ContactPoint(Vec2::new(hit.x, hit.y))
    })
}

/// Double-sided Möller–Trumbore. Returns the ray parameter of the hit.
fn ray_triangle(origin: Vec3, direction: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-9;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Resolves the pointer against the ripple surface once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionResolver {
    strategy: PickStrategy,
}

impl IntersectionResolver {
    pub fn new(strategy: PickStrategy) -> Self {
        Self { strategy }
    }

    pub fn for_surface(kind: SurfaceKind) -> Self {
        Self::new(PickStrategy::for_surface(kind))
    }

    pub fn strategy(&self) -> PickStrategy {
        self.strategy
    }

    /// Contact point under the pointer, or `None` when the pointer is absent
    /// or misses the surface. Only the surface is tested.
    pub fn resolve(
        &self,
        pointer_ndc: Option<Vec2>,
        camera: &OrbitCamera,
        field: &HeightField,
        model: Mat4,
    ) -> Option<ContactPoint> {
        let ray = camera.ray_from_ndc(pointer_ndc?);
        let hit = self.strategy.pick(&ray, field, model);
        tracing::trace!(strategy = ?self.strategy, ?hit, "pointer resolved");
        hit
    }
}
