//! Developer tooling: height field inspector.
//!
//! # Invariants
//! - Inspection is read-only; nothing here mutates a scene.

mod inspector;

pub use inspector::{CellInfo, FieldInspector, FieldSummary};
