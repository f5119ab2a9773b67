//! Pointer-driven displacement of a [`HeightField`].
//!
//! Each frame every cell gets a target height from a sine-eased radial bump
//! centered on the contact point (or zero without one), then moves toward it
//! by a bounded step that shrinks as the remaining distance shrinks.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::Vec2;
use ripple_common::ContactPoint;

use crate::field::HeightField;
use crate::params::RippleParams;

/// Outcome of one updater pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    /// Cells whose height (and color) were rewritten this frame.
    pub changed_cells: usize,
}

impl FrameUpdate {
    /// True when the buffers differ from last frame and must be re-uploaded.
    pub fn needs_update(&self) -> bool {
        self.changed_cells > 0
    }
}

/// Target height of a cell at `planar` for this frame.
///
/// `sin((R - d) / R * π/2) * raise_height` inside the radius `R`, zero on and
/// beyond it, zero everywhere without a contact point.
pub fn target_height(planar: Vec2, contact: Option<ContactPoint>, params: &RippleParams) -> f32 {
    let Some(contact) = contact else {
        return 0.0;
    };
    let radius = params.raise_radius();
    let r = radius - contact.distance(planar);
    if r > 0.0 {
        (r / radius * FRAC_PI_2).sin() * params.raise_height()
    } else {
        0.0
    }
}

/// Signed step to take from `current` toward `target`.
///
/// Never larger in magnitude than the remaining delta, so a cell cannot
/// overshoot. Returns exactly `0.0` when the cell is already at its target.
pub fn eased_step(current: f32, target: f32, params: &RippleParams) -> f32 {
    let delta = target - current;
    if delta == 0.0 {
        return 0.0;
    }
    let rising = delta > 0.0;
    let angle = (delta / params.raise_height()).abs() * FRAC_PI_4 / params.slow_factor(rising);
    let magnitude = params.raise_speed() * angle.sin();
    if rising {
        delta.min(magnitude)
    } else {
        delta.max(-magnitude)
    }
}

/// Advance every cell of `field` one frame toward its target.
///
/// Cells already at their target, or whose step is too small to change the
/// stored `f32`, are skipped entirely: neither height nor color is written
/// and they do not count as changed.
pub fn update(
    field: &mut HeightField,
    contact: Option<ContactPoint>,
    params: &RippleParams,
) -> FrameUpdate {
    let _span = tracing::trace_span!("field_update", cells = field.len()).entered();

    let mut changed_cells = 0;
    for i in 0..field.len() {
        let z = field.height(i);
        let target = target_height(field.planar(i), contact, params);
        let step = eased_step(z, target, params);
        let next = z + step;
        if next == z {
            continue;
        }
        field.write_cell(i, next, params);
        changed_cells += 1;
    }

    tracing::trace!(changed_cells, contact = ?contact, "field update complete");
    FrameUpdate { changed_cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::cell_color;

    fn params_10x10() -> RippleParams {
        let mut p = RippleParams::default();
        p.set_grid_size(10, 10).unwrap();
        p.set_raise_radius(0.1).unwrap();
        p.set_raise_height(0.2).unwrap();
        p.set_raise_speed(0.008).unwrap();
        p
    }

    #[test]
    fn falloff_peak_edge_and_outside() {
        let p = params_10x10();
        let c = Some(ContactPoint::new(0.0, 0.0));
        assert!((target_height(Vec2::ZERO, c, &p) - 0.2).abs() < 1e-7);
        assert_eq!(target_height(Vec2::new(0.1, 0.0), c, &p), 0.0);
        assert_eq!(target_height(Vec2::new(0.15, 0.0), c, &p), 0.0);
        assert_eq!(target_height(Vec2::new(3.0, -2.0), c, &p), 0.0);
    }

    #[test]
    fn falloff_is_monotonically_non_increasing() {
        let p = params_10x10();
        let c = Some(ContactPoint::new(0.2, -0.1));
        let mut prev = f32::INFINITY;
        for k in 0..=200 {
            let d = k as f32 * 0.001;
            let t = target_height(Vec2::new(0.2 + d, -0.1), c, &p);
            assert!(t <= prev, "target rose at d={d}");
            prev = t;
        }
    }

    #[test]
    fn falloff_is_radially_symmetric() {
        let p = params_10x10();
        let c = Some(ContactPoint::new(0.0, 0.0));
        let a = target_height(Vec2::new(0.03, 0.04), c, &p);
        let b = target_height(Vec2::new(-0.05, 0.0), c, &p);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn no_contact_targets_zero() {
        let p = params_10x10();
        assert_eq!(target_height(Vec2::ZERO, None, &p), 0.0);
    }

    #[test]
    fn first_step_matches_worked_example() {
        let p = params_10x10();
        let step = eased_step(0.0, 0.2, &p);
        let expected = 0.008 * FRAC_PI_4.sin();
        assert!((step - expected).abs() < 1e-7);
        assert!((step - 0.00566).abs() < 1e-5);
    }

    #[test]
    fn step_at_target_is_zero() {
        let p = params_10x10();
        assert_eq!(eased_step(0.13, 0.13, &p), 0.0);
    }

    #[test]
    fn step_is_clamped_to_delta() {
        let mut p = params_10x10();
        p.set_raise_speed(10.0).unwrap();
        assert_eq!(eased_step(0.0, 0.01, &p), 0.01);
        assert_eq!(eased_step(0.01, 0.0, &p), -0.01);
    }

    #[test]
    fn falling_uses_slow_multiplier() {
        let mut p = params_10x10();
        p.set_raise_speed_slow_mult(3.0).unwrap();
        let delta: f32 = 0.1;
        let up = eased_step(0.0, delta, &p);
        let down = eased_step(delta, 0.0, &p);
        let angle = (delta / 0.2) * FRAC_PI_4;
        assert!((up - 0.008 * angle.sin()).abs() < 1e-7);
        assert!((down + 0.008 * (angle / 3.0).sin()).abs() < 1e-7);
        assert!(up > -down);
    }

    #[test]
    fn negative_height_swaps_slow_direction() {
        let mut p = params_10x10();
        p.set_raise_height(-0.2).unwrap();
        p.set_raise_speed_slow_mult(3.0).unwrap();
        let angle = 0.5 * FRAC_PI_4;
        let down = eased_step(0.0, -0.1, &p);
        let up = eased_step(-0.1, 0.0, &p);
        assert!((down + 0.008 * angle.sin()).abs() < 1e-7);
        assert!((up - 0.008 * (angle / 3.0).sin()).abs() < 1e-7);
    }

    #[test]
    fn worked_example_single_update() {
        let p = params_10x10();
        let mut field = HeightField::new(&p);
        let center = field.index(5, 5).unwrap();
        let outside = field.index(5, 7).unwrap();
        let before_outside = field.color(outside);

        let report = update(&mut field, Some(ContactPoint::new(0.0, 0.0)), &p);

        assert!(report.needs_update());
        // Only the center lies strictly inside a 0.1 radius on a 0.1 lattice.
        assert_eq!(report.changed_cells, 1);
        assert!((field.height(center) - 0.008 * FRAC_PI_4.sin()).abs() < 1e-7);
        assert_eq!(field.color(center), cell_color(field.height(center), &p));
        assert_eq!(field.height(outside), 0.0);
        assert_eq!(field.color(outside), before_outside);
    }

    #[test]
    fn flat_field_without_contact_needs_no_update() {
        let p = params_10x10();
        let mut field = HeightField::new(&p);
        let report = update(&mut field, None, &p);
        assert!(!report.needs_update());
        assert_eq!(report, FrameUpdate::default());
    }

    #[test]
    fn convergence_is_monotone_and_reaches_speed_band() {
        let p = params_10x10();
        let mut field = HeightField::new(&p);
        let center = field.index(5, 5).unwrap();
        let contact = Some(ContactPoint::new(0.0, 0.0));
        let target = p.raise_height();

        let mut prev_gap = f32::INFINITY;
        let mut frames = 0;
        while (target - field.height(center)).abs() > p.raise_speed() {
            update(&mut field, contact, &p);
            let gap = (target - field.height(center)).abs();
            assert!(gap <= prev_gap);
            prev_gap = gap;
            frames += 1;
            assert!(frames < 10_000, "did not converge");
        }
        assert!(field.height(center) <= target);
    }

    #[test]
    fn never_overshoots_bounds() {
        let mut p = params_10x10();
        p.set_raise_speed(0.5).unwrap();
        let mut field = HeightField::new(&p);
        let contact = Some(ContactPoint::new(0.0, 0.0));
        for frame in 0..400 {
            let c = if frame < 200 { contact } else { None };
            update(&mut field, c, &p);
            let (lo, hi) = field.height_range();
            assert!(lo >= 0.0 && hi <= p.raise_height(), "frame {frame}: {lo}..{hi}");
        }
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let mut p = params_10x10();
        p.set_raise_speed(10.0).unwrap();
        let mut field = HeightField::new(&p);
        let center = field.index(5, 5).unwrap();
        // Huge speed: the step clamps to the delta and lands exactly on target.
        field.set_height(center, 0.05);
        update(&mut field, None, &p);
        assert_eq!(field.height(center), 0.0);

        let snapshot = field.clone();
        let report = update(&mut field, None, &p);
        assert!(!report.needs_update());
        assert_eq!(field, snapshot);
    }

    #[test]
    fn releasing_contact_relaxes_monotonically() {
        let p = params_10x10();
        let mut field = HeightField::new(&p);
        let contact = Some(ContactPoint::new(0.0, 0.0));
        for _ in 0..50 {
            update(&mut field, contact, &p);
        }
        let center = field.index(5, 5).unwrap();
        let raised = field.height(center);
        assert!(raised > 0.0);
        let mut prev = raised;
        for _ in 0..50 {
            update(&mut field, None, &p);
            let z = field.height(center);
            assert!(z.abs() <= prev.abs());
            assert!(z >= 0.0);
            prev = z;
        }
        assert!(prev < raised);
    }

    /// Step until a frame reports no change; returns the frame count.
    fn frames_until_settled(
        field: &mut HeightField,
        contact: Option<ContactPoint>,
        params: &RippleParams,
        limit: usize,
    ) -> usize {
        for frame in 1..=limit {
            if !update(field, contact, params).needs_update() {
                return frame;
            }
        }
        panic!("field still changing after {limit} frames");
    }

    #[test]
    fn held_contact_settles_below_target() {
        let p = params_10x10();
        let mut field = HeightField::new(&p);
        let center = field.index(5, 5).unwrap();
        let contact = Some(ContactPoint::new(0.0, 0.0));

        frames_until_settled(&mut field, contact, &p, 5_000);

        let z = field.height(center);
        assert!(z <= p.raise_height());
        assert!(p.raise_height() - z < 1e-5);
        // Settled means settled: later frames keep reporting nothing to upload.
        for _ in 0..10 {
            assert!(!update(&mut field, contact, &p).needs_update());
        }
    }

    #[test]
    fn released_field_settles_near_zero() {
        let p = params_10x10();
        let mut field = HeightField::new(&p);
        let contact = Some(ContactPoint::new(0.0, 0.0));
        for _ in 0..300 {
            update(&mut field, contact, &p);
        }
        assert!(field.height_range().1 > 0.1);

        frames_until_settled(&mut field, None, &p, 20_000);

        // The damped fall stalls once the step underflows the height's
        // precision, well inside the subnormal range.
        let (lo, hi) = field.height_range();
        assert!(lo >= 0.0);
        assert!(hi < f32::MIN_POSITIVE, "settled at {hi}");
        assert!(!update(&mut field, None, &p).needs_update());
    }

    #[test]
    fn reads_current_params_each_call() {
        let mut p = params_10x10();
        let mut field = HeightField::new(&p);
        let center = field.index(5, 5).unwrap();
        let contact = Some(ContactPoint::new(0.0, 0.0));
        update(&mut field, contact, &p);
        let first = field.height(center);

        p.set_raise_speed(0.016).unwrap();
        update(&mut field, contact, &p);
        let second = field.height(center) - first;
        assert!(second > first);
    }
}
