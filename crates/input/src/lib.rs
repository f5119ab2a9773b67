//! Input: pointer tracking and the action vocabulary.
//!
//! # Invariants
//! - Front-ends translate raw events into [`Action`]s; nothing downstream
//!   sees window-system types.
//! - Pointer NDC uses +Y up, matching the camera's clip space.

pub mod action;
pub mod pointer;

pub use action::Action;
pub use pointer::Pointer;
