use std::fmt::Write as _;

use ripple_kernel::RippleScene;

use crate::camera::OrbitCamera;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a camera, then produces output. It
/// never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and camera.
    fn render(&self, scene: &RippleScene, camera: &OrbitCamera) -> Self::Output;
}

/// Shade ramp from flat to fully raised.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Text renderer: a header plus an ASCII height map of the field, sampled
/// down to at most `columns x rows` characters. Used by the CLI and tests.
#[derive(Debug, Clone, Copy)]
pub struct DebugTextRenderer {
    pub columns: usize,
    pub rows: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self {
            columns: 64,
            rows: 32,
        }
    }
}

impl DebugTextRenderer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    fn shade(ratio: f32) -> char {
        let last = RAMP.len() - 1;
        let idx = (ratio.clamp(0.0, 1.0) * last as f32).round() as usize;
        RAMP[idx.min(last)] as char
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &RippleScene, camera: &OrbitCamera) -> String {
        let field = scene.field();
        let params = scene.params();
        let eye = camera.eye();
        let (lo, hi) = field.height_range();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Ripple (frame={}, {}x{} {}) ===",
            scene.frame(),
            field.width(),
            field.length(),
            params.surface()
        );
        let _ = writeln!(out, "Height: min={lo:.4} max={hi:.4}");
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) distance={:.1}",
            eye.x, eye.y, eye.z, camera.distance
        );

        let cols = self.columns.min(field.length());
        let rows = self.rows.min(field.width());
        // Rows run top to bottom with +y (far side of the plane) first.
        for r in (0..rows).rev() {
            let row = r * field.width() / rows;
            let line: String = (0..cols)
                .map(|c| {
                    let col = c * field.length() / cols;
                    let i = row * field.length() + col;
                    Self::shade((field.height(i) / params.raise_height()).abs())
                })
                .collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
