//! Shared value types for the ripple plane demos.
//!
//! Everything here is plain data: no state, no logging, no GPU handles.

mod types;

pub use types::{Color, ContactPoint, SurfaceKind, Transform};
