use glam::Vec2;
use ripple_common::SurfaceKind;
use ripple_kernel::{FrameUpdate, RippleScene};

/// Height field inspector for developer tooling.
///
/// Provides read-only queries against a scene for the debug panel, the CLI
/// and log lines.
pub struct FieldInspector;

impl FieldInspector {
    /// Produce a summary of the field after the frame that returned
    /// `last_update`.
    pub fn summary(scene: &RippleScene, last_update: FrameUpdate) -> FieldSummary {
        let field = scene.field();
        let (min_height, max_height) = field.height_range();
        let raised_cells = (0..field.len()).filter(|&i| field.height(i) != 0.0).count();
        FieldSummary {
            frame: scene.frame(),
            cells: field.len(),
            changed_cells: last_update.changed_cells,
            min_height,
            max_height,
            raised_cells,
            surface: scene.params().surface(),
        }
    }

    /// Details of the cell at `row`, `col`, or `None` when out of range.
    pub fn cell(scene: &RippleScene, row: usize, col: usize) -> Option<CellInfo> {
        let field = scene.field();
        field.index(row, col).map(|index| CellInfo {
            row,
            col,
            index,
            planar: field.planar(index),
            height: field.height(index),
            color: field.color(index),
        })
    }
}

/// Summary of field state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub frame: u64,
    pub cells: usize,
    pub changed_cells: usize,
    pub min_height: f32,
    pub max_height: f32,
    /// Cells not at rest height.
    pub raised_cells: usize,
    pub surface: SurfaceKind,
}

impl std::fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field: frame={} cells={} changed={} raised={} height=[{:.4}, {:.4}] surface={}",
            self.frame,
            self.cells,
            self.changed_cells,
            self.raised_cells,
            self.min_height,
            self.max_height,
            self.surface,
        )
    }
}

/// Detailed info about a single cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellInfo {
    pub row: usize,
    pub col: usize,
    pub index: usize,
    pub planar: Vec2,
    pub height: f32,
    pub color: [f32; 3],
}

impl std::fmt::Display for CellInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cell [{},{}] #{} at ({:.3}, {:.3}) z={:.5} rgb=({:.3}, {:.3}, {:.3})",
            self.row,
            self.col,
            self.index,
            self.planar.x,
            self.planar.y,
            self.height,
            self.color[0],
            self.color[1],
            self.color[2],
        )
    }
}
