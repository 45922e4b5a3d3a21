//! CPU rasterizer.
//!
//! Evaluates the same per-pixel pipeline as the fragment shader, one row per
//! rayon task. Used for PNG/GIF export and for headless checks where no GPU
//! is available.

use field::{ndc_from_pixel, FieldParams, Palette};
use image::RgbaImage;
use rayon::prelude::*;
use thiserror::Error;

const CHANNELS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("image size must be non-zero (got {width}x{height})")]
    ZeroSize { width: u32, height: u32 },
    #[error("image size {width}x{height} does not fit in memory")]
    TooLarge { width: u32, height: u32 },
}

/// Renders one frame at `seconds` into an 8-bit RGBA image.
///
/// Row 0 is the top of the image. Channels are clamped to `[0, 1]` before
/// quantizing; no color-space conversion is applied.
pub fn rasterize(
    width: u32,
    height: u32,
    seconds: f32,
    params: &FieldParams,
    palette: &Palette,
) -> Result<RgbaImage, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::ZeroSize { width, height });
    }
    let stride = (width as usize)
        .checked_mul(CHANNELS)
        .ok_or(RasterError::TooLarge { width, height })?;
    let len = stride
        .checked_mul(height as usize)
        .ok_or(RasterError::TooLarge { width, height })?;

    let mut pixels = vec![0u8; len];
    pixels
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(row, line)| {
            for (col, texel) in line.chunks_exact_mut(CHANNELS).enumerate() {
                let (px, py) = ndc_from_pixel(col as u32, row as u32, width, height);
                let color = params.shade(px, py, seconds, palette);
                texel.copy_from_slice(&color.to_rgba8());
            }
        });

    RgbaImage::from_raw(width, height, pixels).ok_or(RasterError::TooLarge { width, height })
}
