//! Value-to-color mapping.

use crate::error::FieldError;

/// Straight RGBA color with float channels.
///
/// Colors produced by [`colorize`] are nominally in `[0, 1]`, but the
/// interpolation is not clamped, so extrapolated inputs can leave that range.
/// Clamping happens only when quantizing for display via [`Rgba::to_rgba8`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds an opaque color from an RGB triple.
    pub const fn opaque([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Scales every channel (alpha included) by `gain`.
    ///
    /// This is the display-time brightening step applied after colorizing.
    pub fn amplified(&self, gain: f32) -> Self {
        Self {
            r: self.r * gain,
            g: self.g * gain,
            b: self.b * gain,
            a: self.a * gain,
        }
    }

    /// Clamps to `[0, 1]` and quantizes to 8-bit channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        self.to_array().map(quantize)
    }
}

fn quantize(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Two-segment linear color ramp.
///
/// Inputs below `upper_knee` blend from `low` (at `lower_knee`) to `mid` (at
/// `upper_knee`); inputs at or above it blend from `mid` to `high` (at `top`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    pub low: [f32; 3],
    pub mid: [f32; 3],
    pub high: [f32; 3],
    pub lower_knee: f32,
    pub upper_knee: f32,
    pub top: f32,
}

impl Default for Palette {
    /// Cyan `rgb(0,188,212)` through pale blue `rgb(132,188,212)` to near-black
    /// navy `rgb(1,1,33)`.
    fn default() -> Self {
        Self {
            low: rgb8(0, 188, 212),
            mid: rgb8(132, 188, 212),
            high: rgb8(1, 1, 33),
            lower_knee: 0.64,
            upper_knee: 0.89,
            top: 1.0,
        }
    }
}

impl Palette {
    /// Replaces the anchor colors, keeping the current knees.
    pub fn with_anchors(self, low: [u8; 3], mid: [u8; 3], high: [u8; 3]) -> Self {
        Self {
            low: rgb8(low[0], low[1], low[2]),
            mid: rgb8(mid[0], mid[1], mid[2]),
            high: rgb8(high[0], high[1], high[2]),
            ..self
        }
    }

    /// Maps a normalized scalar to a color. The blend factor is not clamped.
    pub fn colorize(&self, v: f32) -> Rgba {
        let (a, b, c) = if v < self.upper_knee {
            (
                self.low,
                self.mid,
                (v - self.lower_knee) / (self.upper_knee - self.lower_knee),
            )
        } else {
            (
                self.mid,
                self.high,
                (v - self.upper_knee) / (self.top - self.upper_knee),
            )
        };
        Rgba::opaque(mix(a, b, c))
    }

    /// Rejects knees that cannot form a ramp.
    pub fn validate(&self) -> Result<(), FieldError> {
        let knees = [self.lower_knee, self.upper_knee, self.top];
        if knees.iter().any(|k| !k.is_finite()) {
            return Err(FieldError::Palette("knees must be finite".into()));
        }
        if !(self.lower_knee < self.upper_knee && self.upper_knee < self.top) {
            return Err(FieldError::Palette(format!(
                "knees must be strictly increasing (got {}, {}, {})",
                self.lower_knee, self.upper_knee, self.top
            )));
        }
        Ok(())
    }
}

/// Colorizes `v` with the default palette.
pub fn colorize(v: f32) -> Rgba {
    Palette::default().colorize(v)
}

/// Converts 8-bit channels to floats in `[0, 1]`.
pub fn rgb8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

// Same weighting as GLSL `mix`, so c = 0 and c = 1 land exactly on the anchors.
fn mix(a: [f32; 3], b: [f32; 3], c: f32) -> [f32; 3] {
    [
        a[0] * (1.0 - c) + b[0] * c,
        a[1] * (1.0 - c) + b[1] * c,
        a[2] * (1.0 - c) + b[2] * c,
    ]
}
