//! wgpu render backend for the ripple demos.
//!
//! Draws the height field as instanced cubes or a triangle mesh, a point
//! starfield around it, and the spinner wireframe. The camera comes from
//! `ripple_render::OrbitCamera`.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Field buffers are rewritten only through `upload_field`; the caller
//!   decides when from the updater's report.
//! - A structural parameter change requires `rebuild_surface` before the
//!   next `upload_field`.

mod gpu;
mod shaders;

pub use gpu::{SceneDraw, WgpuRenderer};
