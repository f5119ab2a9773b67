//! Ripple kernel: the authoritative demo state and the per-frame
//! displacement algorithm.
//!
//! # Invariants
//! - Field buffers always hold `width * length * 3` floats.
//! - A cell never steps past its target height.
//! - Parameters are validated before the updater ever sees them.

pub mod displace;
pub mod field;
pub mod params;
pub mod scene;
pub mod spinner;
pub mod stars;

pub use displace::{FrameUpdate, eased_step, target_height, update};
pub use field::HeightField;
pub use params::{ConfigError, ParamError, RippleParams};
pub use scene::{ParamChange, RippleScene};
pub use spinner::{Edge, Spinner, cone_wireframe};
pub use stars::{SplitMix64, Starfield};
