use glam::{Vec2, Vec3};

use crate::params::RippleParams;

/// A fixed `width x length` lattice of cells backing two parallel buffers.
///
/// Cell `i = row * length + col` stores `(x, y, z)` at `positions[3i..3i + 3]`
/// and `(r, g, b)` at `colors[3i..3i + 3]`. The planar `x`/`y` are set once
/// here; only `z` (the height axis) and the colors change afterwards. Both
/// buffers stay at full length for the lifetime of the field, so they can be
/// handed to a renderer as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    length: usize,
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl HeightField {
    /// Build a flat field sized and colored from `params`.
    pub fn new(params: &RippleParams) -> Self {
        let width = params.width();
        let length = params.length();
        let cells = width * length;
        let mut positions = Vec::with_capacity(cells * 3);
        for row in 0..width {
            for col in 0..length {
                positions.push(lattice(col, length));
                positions.push(lattice(row, width));
                positions.push(0.0);
            }
        }

        let rest = params
            .base_color()
            .scaled(params.default_color_intensity());
        let colors = rest.repeat(cells);

        tracing::debug!(width, length, cells, "height field built");

        Self {
            width,
            length,
            positions,
            colors,
        }
    }

    /// Number of rows.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of columns.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width * self.length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of a cell, or `None` when out of range.
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.width && col < self.length).then_some(row * self.length + col)
    }

    /// Interleaved `x, y, z` per cell.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Interleaved `r, g, b` per cell.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Planar (non-height) coordinates of cell `i`.
    pub fn planar(&self, i: usize) -> Vec2 {
        Vec2::new(self.positions[i * 3], self.positions[i * 3 + 1])
    }

    /// Height of cell `i`.
    pub fn height(&self, i: usize) -> f32 {
        self.positions[i * 3 + 2]
    }

    /// Local-space position of cell `i`.
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    pub fn color(&self, i: usize) -> [f32; 3] {
        [
            self.colors[i * 3],
            self.colors[i * 3 + 1],
            self.colors[i * 3 + 2],
        ]
    }

    /// Write a new height for cell `i` and derive its color from it.
    pub(crate) fn write_cell(&mut self, i: usize, height: f32, params: &RippleParams) {
        self.positions[i * 3 + 2] = height;
        let rgb = cell_color(height, params);
        self.colors[i * 3..i * 3 + 3].copy_from_slice(&rgb);
    }

    /// Set a height directly without touching the color. Used to seed
    /// scenarios; the per-frame path goes through the updater.
    pub fn set_height(&mut self, i: usize, height: f32) {
        self.positions[i * 3 + 2] = height;
    }

    /// Recompute every color from the current heights.
    ///
    /// The updater leaves cells that already sit at their target alone, so a
    /// live change to the color parameters only shows up after this runs.
    pub fn recolor(&mut self, params: &RippleParams) {
        for i in 0..self.len() {
            let rgb = cell_color(self.height(i), params);
            self.colors[i * 3..i * 3 + 3].copy_from_slice(&rgb);
        }
    }

    /// Lowest and highest heights currently in the field.
    pub fn height_range(&self) -> (f32, f32) {
        self.positions
            .chunks_exact(3)
            .map(|p| p[2])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), z| {
                (lo.min(z), hi.max(z))
            })
    }

    /// Triangle list indices for drawing (or hit-testing) the field as a
    /// mesh: two counter-clockwise triangles per lattice quad.
    pub fn mesh_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity((self.width - 1) * (self.length - 1) * 6);
        let stride = self.length as u32;
        for row in 0..self.width as u32 - 1 {
            for col in 0..stride - 1 {
                let a = row * stride + col;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }
        indices
    }
}

/// Coordinate of lattice site `k` of `n`, uniformly spaced in `[-0.5, 0.5)`.
/// Offsetting before dividing keeps sites symmetric about zero in `f32`.
fn lattice(k: usize, n: usize) -> f32 {
    (k as f32 - n as f32 * 0.5) / n as f32
}

/// `(|height / raise_height| + default_intensity) * base_color`.
pub fn cell_color(height: f32, params: &RippleParams) -> [f32; 3] {
    let intensity = (height / params.raise_height()).abs() + params.default_color_intensity();
    params.base_color().scaled(intensity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_common::Color;

    fn small_params(width: usize, length: usize) -> RippleParams {
        let mut p = RippleParams::default();
        p.set_grid_size(width, length).unwrap();
        p
    }

    #[test]
    fn buffers_are_full_length() {
        let f = HeightField::new(&small_params(4, 7));
        assert_eq!(f.len(), 28);
        assert_eq!(f.positions().len(), 28 * 3);
        assert_eq!(f.colors().len(), 28 * 3);
    }

    #[test]
    fn planar_coordinates_are_uniform_in_unit_square() {
        let f = HeightField::new(&small_params(10, 10));
        let center = f.index(5, 5).unwrap();
        assert_eq!(f.planar(center), Vec2::ZERO);
        assert_eq!(f.planar(0), Vec2::new(-0.5, -0.5));
        let last = f.index(9, 9).unwrap();
        assert!((f.planar(last) - Vec2::new(0.4, 0.4)).length() < 1e-6);
        // Columns move along x, rows along y.
        assert!((f.planar(f.index(0, 1).unwrap()).x - -0.4).abs() < 1e-6);
        assert!((f.planar(f.index(1, 0).unwrap()).y - -0.4).abs() < 1e-6);
    }

    #[test]
    fn starts_flat_with_resting_color() {
        let p = small_params(3, 3);
        let f = HeightField::new(&p);
        assert_eq!(f.height_range(), (0.0, 0.0));
        let rest = p.base_color().scaled(p.default_color_intensity());
        for i in 0..f.len() {
            assert_eq!(f.color(i), rest);
        }
    }

    #[test]
    fn index_out_of_range() {
        let f = HeightField::new(&small_params(3, 4));
        assert_eq!(f.index(2, 3), Some(11));
        assert_eq!(f.index(3, 0), None);
        assert_eq!(f.index(0, 4), None);
    }

    #[test]
    fn cell_color_scales_with_height() {
        let mut p = RippleParams::default();
        p.set_base_color(Color::new(1.0, 0.5, 0.0)).unwrap();
        p.set_default_color_intensity(0.2).unwrap();
        p.set_raise_height(-0.5).unwrap();
        let rgb = cell_color(-0.25, &p);
        assert!((rgb[0] - 0.7).abs() < 1e-6);
        assert!((rgb[1] - 0.35).abs() < 1e-6);
        assert_eq!(rgb[2], 0.0);
    }

    #[test]
    fn recolor_uses_current_heights() {
        let mut p = small_params(2, 2);
        let mut f = HeightField::new(&p);
        f.set_height(3, p.raise_height());
        p.set_default_color_intensity(0.0).unwrap();
        f.recolor(&p);
        assert_eq!(f.color(0), [0.0, 0.0, 0.0]);
        assert_eq!(f.color(3), p.base_color().to_array());
    }

    #[test]
    fn mesh_indices_cover_every_quad() {
        let f = HeightField::new(&small_params(3, 4));
        let idx = f.mesh_indices();
        assert_eq!(idx.len(), 2 * 3 * 6);
        assert_eq!(&idx[..6], &[0, 1, 4, 1, 5, 4]);
        assert!(idx.iter().all(|&i| (i as usize) < f.len()));
    }
}
