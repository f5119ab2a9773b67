//! Rendering adapter: camera, pointer picking, and a renderer-agnostic
//! interface.
//!
//! # Invariants
//! - Renderers and the resolver never mutate the scene.
//! - Picking tests the ripple surface only, never the starfield.

mod camera;
mod pick;
mod renderer;

pub use camera::OrbitCamera;
pub use pick::{DEFAULT_POINT_THRESHOLD, IntersectionResolver, PickStrategy, Ray};
pub use renderer::{DebugTextRenderer, Renderer};
