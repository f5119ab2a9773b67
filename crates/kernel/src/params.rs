use ripple_common::{Color, SurfaceKind};
use serde::{Deserialize, Serialize};

/// A parameter value rejected by validation. Carries the offending value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("grid must be at least 2x2 cells, got {width}x{length}")]
    GridSize { width: usize, length: usize },
    #[error("raise radius must be finite and positive, got {0}")]
    RaiseRadius(f32),
    #[error("raise height must be finite and non-zero, got {0}")]
    RaiseHeight(f32),
    #[error("raise speed must be finite and positive, got {0}")]
    RaiseSpeed(f32),
    #[error("slow multiplier must be finite and positive, got {0}")]
    SlowMultiplier(f32),
    #[error("default color intensity must be finite and non-negative, got {0}")]
    ColorIntensity(f32),
    #[error("base color components must be finite and non-negative, got {0:?}")]
    BaseColor(Color),
    #[error("plane size must be finite and positive, got {0}")]
    PlaneSize(f32),
}

/// Errors from loading parameters out of a YAML document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse parameters: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid parameters: {0}")]
    Invalid(#[from] ParamError),
}

/// Live-tunable ripple parameters.
///
/// Fields are private: every change goes through a setter that validates the
/// new value, so the updater can divide by `raise_height` and `raise_radius`
/// without guarding. A value that fails validation leaves the parameters
/// untouched. Deserialization goes through the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct RippleParams {
    width: usize,
    length: usize,
    raise_radius: f32,
    raise_height: f32,
    raise_speed: f32,
    raise_speed_slow_mult: f32,
    base_color: Color,
    default_color_intensity: f32,
    surface: SurfaceKind,
    plane_size: f32,
    star_count: usize,
}

impl Default for RippleParams {
    fn default() -> Self {
        Self {
            width: 100,
            length: 100,
            raise_radius: 0.1,
            raise_height: 0.2,
            raise_speed: 0.008,
            raise_speed_slow_mult: 4.0,
            base_color: Color::from_hex(0x4fc3f7),
            default_color_intensity: 0.25,
            surface: SurfaceKind::Points,
            plane_size: 50.0,
            star_count: 2000,
        }
    }
}

/// Wire shape of [`RippleParams`] before validation. Missing keys take the
/// default values.
#[derive(Deserialize)]
#[serde(default)]
struct RawParams {
    width: usize,
    length: usize,
    raise_radius: f32,
    raise_height: f32,
    raise_speed: f32,
    raise_speed_slow_mult: f32,
    base_color: Color,
    default_color_intensity: f32,
    surface: SurfaceKind,
    plane_size: f32,
    star_count: usize,
}

impl Default for RawParams {
    fn default() -> Self {
        let d = RippleParams::default();
        Self {
            width: d.width,
            length: d.length,
            raise_radius: d.raise_radius,
            raise_height: d.raise_height,
            raise_speed: d.raise_speed,
            raise_speed_slow_mult: d.raise_speed_slow_mult,
            base_color: d.base_color,
            default_color_intensity: d.default_color_intensity,
            surface: d.surface,
            plane_size: d.plane_size,
            star_count: d.star_count,
        }
    }
}

impl TryFrom<RawParams> for RippleParams {
    type Error = ParamError;

    fn try_from(raw: RawParams) -> Result<Self, ParamError> {
        let params = Self {
            width: raw.width,
            length: raw.length,
            raise_radius: raw.raise_radius,
            raise_height: raw.raise_height,
            raise_speed: raw.raise_speed,
            raise_speed_slow_mult: raw.raise_speed_slow_mult,
            base_color: raw.base_color,
            default_color_intensity: raw.default_color_intensity,
            surface: raw.surface,
            plane_size: raw.plane_size,
            star_count: raw.star_count,
        };
        params.validate()?;
        Ok(params)
    }
}

fn finite_positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

impl RippleParams {
    /// Parse a YAML document. Missing keys take their default values.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawParams = serde_yaml::from_str(text)?;
        Ok(Self::try_from(raw)?)
    }

    /// Check every field against the setters' rules.
    pub fn validate(&self) -> Result<(), ParamError> {
        let mut checked = Self::default();
        checked.set_grid_size(self.width, self.length)?;
        checked.set_raise_radius(self.raise_radius)?;
        checked.set_raise_height(self.raise_height)?;
        checked.set_raise_speed(self.raise_speed)?;
        checked.set_raise_speed_slow_mult(self.raise_speed_slow_mult)?;
        checked.set_base_color(self.base_color)?;
        checked.set_default_color_intensity(self.default_color_intensity)?;
        checked.set_plane_size(self.plane_size)?;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn raise_radius(&self) -> f32 {
        self.raise_radius
    }

    pub fn raise_height(&self) -> f32 {
        self.raise_height
    }

    pub fn raise_speed(&self) -> f32 {
        self.raise_speed
    }

    pub fn raise_speed_slow_mult(&self) -> f32 {
        self.raise_speed_slow_mult
    }

    pub fn base_color(&self) -> Color {
        self.base_color
    }

    pub fn default_color_intensity(&self) -> f32 {
        self.default_color_intensity
    }

    pub fn surface(&self) -> SurfaceKind {
        self.surface
    }

    pub fn plane_size(&self) -> f32 {
        self.plane_size
    }

    pub fn star_count(&self) -> usize {
        self.star_count
    }

    pub fn set_grid_size(&mut self, width: usize, length: usize) -> Result<(), ParamError> {
        if width < 2 || length < 2 {
            return Err(ParamError::GridSize { width, length });
        }
        self.width = width;
        self.length = length;
        Ok(())
    }

    pub fn set_raise_radius(&mut self, radius: f32) -> Result<(), ParamError> {
        if !finite_positive(radius) {
            return Err(ParamError::RaiseRadius(radius));
        }
        self.raise_radius = radius;
        Ok(())
    }

    /// Negative heights are allowed and dig a trough instead of a bump.
    pub fn set_raise_height(&mut self, height: f32) -> Result<(), ParamError> {
        if !height.is_finite() || height == 0.0 {
            return Err(ParamError::RaiseHeight(height));
        }
        self.raise_height = height;
        Ok(())
    }

    pub fn set_raise_speed(&mut self, speed: f32) -> Result<(), ParamError> {
        if !finite_positive(speed) {
            return Err(ParamError::RaiseSpeed(speed));
        }
        self.raise_speed = speed;
        Ok(())
    }

    pub fn set_raise_speed_slow_mult(&mut self, mult: f32) -> Result<(), ParamError> {
        if !finite_positive(mult) {
            return Err(ParamError::SlowMultiplier(mult));
        }
        self.raise_speed_slow_mult = mult;
        Ok(())
    }

    pub fn set_base_color(&mut self, color: Color) -> Result<(), ParamError> {
        let ok = [color.r, color.g, color.b]
            .iter()
            .all(|c| c.is_finite() && *c >= 0.0);
        if !ok {
            return Err(ParamError::BaseColor(color));
        }
        self.base_color = color;
        Ok(())
    }

    pub fn set_default_color_intensity(&mut self, intensity: f32) -> Result<(), ParamError> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(ParamError::ColorIntensity(intensity));
        }
        self.default_color_intensity = intensity;
        Ok(())
    }

    pub fn set_surface(&mut self, surface: SurfaceKind) {
        self.surface = surface;
    }

    pub fn set_plane_size(&mut self, size: f32) -> Result<(), ParamError> {
        if !finite_positive(size) {
            return Err(ParamError::PlaneSize(size));
        }
        self.plane_size = size;
        Ok(())
    }

    pub fn set_star_count(&mut self, count: usize) {
        self.star_count = count;
    }

    /// Slow factor applied to a step in the given direction. Moving away
    /// from zero, in the direction of `raise_height`, runs at full speed;
    /// the other direction is damped by the slow multiplier.
    pub fn slow_factor(&self, rising: bool) -> f32 {
        let with_height = if rising {
            self.raise_height > 0.0
        } else {
            self.raise_height < 0.0
        };
        if with_height {
            1.0
        } else {
            self.raise_speed_slow_mult
        }
    }

    /// Whether `other` changes the structure of the field (cell count or
    /// surface strategy) and therefore needs a full rebuild.
    pub fn is_structural_change(&self, other: &Self) -> bool {
        self.width != other.width || self.length != other.length || self.surface != other.surface
    }

    /// Whether `other` changes how heights map to colors.
    pub fn is_color_change(&self, other: &Self) -> bool {
        self.base_color != other.base_color
            || self.default_color_intensity != other.default_color_intensity
            || self.raise_height != other.raise_height
    }
}
