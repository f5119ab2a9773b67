use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Placement of a height field in the world: lay the local XY plane flat
    /// so local Z (the height axis) points up along world +Y, then scale.
    pub fn surface(size: f32) -> Self {
        Self {
            rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(size),
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Where the pointer meets the surface, in the surface's local planar
/// coordinates (not world space). Valid for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint(pub Vec2);

impl ContactPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    /// Euclidean distance from a planar cell coordinate.
    pub fn distance(&self, planar: Vec2) -> f32 {
        let dx = (planar.x - self.0.x).abs();
        let dy = (planar.y - self.0.y).abs();
        (dx * dx + dy * dy).sqrt()
    }
}

/// Linear RGB color with components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn scaled(&self, intensity: f32) -> [f32; 3] {
        [self.r * intensity, self.g * intensity, self.b * intensity]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Color {
    fn from(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

/// How the ripple surface is drawn, and therefore how the pointer is
/// resolved against it. Chosen when the surface is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Discrete points; the contact point snaps to the nearest lattice site.
    #[default]
    Points,
    /// Continuous triangle mesh; the contact point is interpolated.
    Mesh,
}

impl SurfaceKind {
    pub fn toggled(self) -> Self {
        match self {
            Self::Points => Self::Mesh,
            Self::Mesh => Self::Points,
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Points => f.write_str("points"),
            Self::Mesh => f.write_str("mesh"),
        }
    }
}
