use ripple_common::{ContactPoint, Transform};

use crate::displace::{self, FrameUpdate};
use crate::field::HeightField;
use crate::params::RippleParams;
use crate::stars::Starfield;

/// What `apply_params` had to do to bring the scene in line with new
/// parameters. Renderers use it to decide which GPU resources to rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamChange {
    /// The field was rebuilt flat (new dimensions or surface kind).
    pub rebuilt_field: bool,
    /// The starfield was regenerated.
    pub regenerated_stars: bool,
    /// Every cell color was recomputed.
    pub recolored: bool,
}

impl ParamChange {
    /// Whether the field's buffers differ from before the change.
    pub fn field_dirty(&self) -> bool {
        self.rebuilt_field || self.recolored
    }
}

/// All demo state for the ripple plane, owned in one place.
///
/// The render loop calls [`RippleScene::step`] once per frame with the
/// contact point it resolved. Parameters are replaced wholesale between
/// frames through [`RippleScene::apply_params`]; the updater always reads
/// the current ones.
#[derive(Debug, Clone)]
pub struct RippleScene {
    params: RippleParams,
    field: HeightField,
    stars: Starfield,
    frame: u64,
}

impl RippleScene {
    pub fn new(params: RippleParams) -> Self {
        let field = HeightField::new(&params);
        let stars = Starfield::generate(params.star_count());
        Self {
            params,
            field,
            stars,
            frame: 0,
        }
    }

    pub fn params(&self) -> &RippleParams {
        &self.params
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn stars(&self) -> &Starfield {
        &self.stars
    }

    /// Number of frames stepped since construction.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// World placement of the field.
    pub fn surface_transform(&self) -> Transform {
        Transform::surface(self.params.plane_size())
    }

    /// Advance the field one frame toward the bump at `contact`.
    pub fn step(&mut self, contact: Option<ContactPoint>) -> FrameUpdate {
        self.frame += 1;
        displace::update(&mut self.field, contact, &self.params)
    }

    /// Replace the parameters, rebuilding whatever they invalidate.
    pub fn apply_params(&mut self, params: RippleParams) -> ParamChange {
        let mut change = ParamChange::default();
        if params == self.params {
            return change;
        }

        let old = std::mem::replace(&mut self.params, params);
        if old.is_structural_change(&self.params) {
            self.field = HeightField::new(&self.params);
            change.rebuilt_field = true;
            tracing::debug!(
                width = self.params.width(),
                length = self.params.length(),
                surface = %self.params.surface(),
                "field rebuilt for new parameters"
            );
        } else if old.is_color_change(&self.params) {
            self.field.recolor(&self.params);
            change.recolored = true;
        }

        if old.star_count() != self.params.star_count() {
            self.stars = Starfield::generate(self.params.star_count());
            change.regenerated_stars = true;
        }
        change
    }

    /// Flatten the field back to its initial state.
    pub fn reset(&mut self) {
        self.field = HeightField::new(&self.params);
        tracing::debug!("field reset");
    }
}
