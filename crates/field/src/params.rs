//! Host-side scaling between screen space and field space.

use crate::color::{Palette, Rgba};
use crate::error::FieldError;
use crate::evaluator::evaluate_field;

/// Fixed constants a host applies around [`evaluate_field`] and
/// [`Palette::colorize`] for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldParams {
    /// `x` spans `[-x_scale, x_scale]` across the surface.
    pub x_scale: f32,
    /// `y` spans `[-y_scale, y_scale]` across the surface.
    pub y_scale: f32,
    /// Multiplier applied to elapsed seconds before evaluation.
    pub t_scale: f32,
    /// Added to `z` before dividing by `z_max`.
    pub z_offset: f32,
    /// Divisor that brings `z + z_offset` into `[0, 1]`.
    pub z_max: f32,
    /// Display brightening applied after colorizing.
    pub gain: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            x_scale: 3.0,
            y_scale: 3.0,
            t_scale: 5.0,
            z_offset: 1.5,
            z_max: 2.0,
            gain: 1.5,
        }
    }
}

impl FieldParams {
    pub fn validate(&self) -> Result<(), FieldError> {
        let named = [
            ("x_scale", self.x_scale),
            ("y_scale", self.y_scale),
            ("t_scale", self.t_scale),
            ("z_offset", self.z_offset),
            ("z_max", self.z_max),
            ("gain", self.gain),
        ];
        if let Some((name, value)) = named.into_iter().find(|(_, value)| !value.is_finite()) {
            return Err(FieldError::NonFinite { name, value });
        }
        if self.z_max == 0.0 {
            return Err(FieldError::ZeroRange);
        }
        Ok(())
    }

    /// Maps a normalized device coordinate to field space.
    pub fn field_coords(&self, px: f32, py: f32) -> (f32, f32) {
        (self.x_scale * px, self.y_scale * py)
    }

    pub fn scaled_time(&self, seconds: f32) -> f32 {
        self.t_scale * seconds
    }

    /// Affine map from a field sample to the colorizer's input domain.
    pub fn normalize(&self, z: f32) -> f32 {
        (z + self.z_offset) / self.z_max
    }

    /// Runs the full per-pixel pipeline for NDC `(px, py)` at `seconds`.
    pub fn shade(&self, px: f32, py: f32, seconds: f32, palette: &Palette) -> Rgba {
        let (x, y) = self.field_coords(px, py);
        let z = evaluate_field(x, y, self.scaled_time(seconds));
        palette.colorize(self.normalize(z)).amplified(self.gain)
    }
}

/// Center of pixel `(col, row)` in normalized device coordinates.
///
/// Row 0 is the top of the image and maps to `py` near `+1`.
pub fn ndc_from_pixel(col: u32, row: u32, width: u32, height: u32) -> (f32, f32) {
    let width = width.max(1) as f32;
    let height = height.max(1) as f32;
    let px = (col as f32 + 0.5) / width * 2.0 - 1.0;
    let py = 1.0 - (row as f32 + 0.5) / height * 2.0;
    (px, py)
}
