use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use field::{FieldParams, Palette};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat};
use thiserror::Error;
use tracing::{debug, info};

use crate::raster::{rasterize, RasterError};
use crate::runtime::{AnimationSpec, SequenceTimeSource, TimeSource};

/// NeuQuant sampling factor for GIF palettes: 1 is slowest, 30 fastest.
const GIF_QUANTIZER_SPEED: i32 = 10;

/// File formats the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Gif,
}

impl ExportFormat {
    /// Derives the format from the path extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("gif") => Ok(Self::Gif),
            _ => Err(ExportError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format for {0} (expected .png or .gif)")]
    UnsupportedFormat(PathBuf),
    #[error("animation needs a positive frame rate (got {0})")]
    InvalidFrameRate(f32),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Renders one frame at `time` seconds and writes it as a PNG.
pub fn export_still(
    path: &Path,
    size: (u32, u32),
    time: f32,
    params: &FieldParams,
    palette: &Palette,
) -> Result<PathBuf, ExportError> {
    let image = rasterize(size.0, size.1, time, params, palette)?;
    ensure_parent(path)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| ExportError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        path = %path.display(),
        width = size.0,
        height = size.1,
        time,
        "wrote still frame"
    );
    Ok(path.to_path_buf())
}

/// Renders `animation.frame_count()` frames at `t = i / fps` and writes a
/// looping GIF.
pub fn export_animation(
    path: &Path,
    size: (u32, u32),
    animation: &AnimationSpec,
    params: &FieldParams,
    palette: &Palette,
) -> Result<PathBuf, ExportError> {
    if !(animation.fps > 0.0 && animation.fps.is_finite()) {
        return Err(ExportError::InvalidFrameRate(animation.fps));
    }
    ensure_parent(path)?;
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let encode_error = |source| ExportError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), GIF_QUANTIZER_SPEED);
    encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;

    let frame_count = animation.frame_count();
    let delay = Delay::from_saturating_duration(animation.frame_interval());
    let mut clock = SequenceTimeSource::new(animation.fps);
    for _ in 0..frame_count {
        let sample = clock.sample();
        let image = rasterize(size.0, size.1, sample.seconds, params, palette)?;
        encoder
            .encode_frame(Frame::from_parts(image, 0, 0, delay))
            .map_err(encode_error)?;
        debug!(frame = sample.frame_index, time = sample.seconds, "encoded frame");
    }

    info!(
        path = %path.display(),
        frames = frame_count,
        fps = animation.fps,
        "wrote animation"
    );
    Ok(path.to_path_buf())
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/frame.PNG")).unwrap(),
            ExportFormat::Png
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("loop.gif")).unwrap(),
            ExportFormat::Gif
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("clip.mp4")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn still_writes_png_in_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/frame.png");
        let written = export_still(
            &path,
            (12, 8),
            0.0,
            &FieldParams::default(),
            &Palette::default(),
        )
        .unwrap();
        assert_eq!(written, path);

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (12, 8));
        let expected = rasterize(12, 8, 0.0, &FieldParams::default(), &Palette::default()).unwrap();
        assert_eq!(decoded.as_raw(), expected.as_raw());
    }

    #[test]
    fn animation_writes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.gif");
        let animation = AnimationSpec {
            duration: Duration::from_millis(200),
            fps: 20.0,
        };
        export_animation(
            &path,
            (6, 6),
            &animation,
            &FieldParams::default(),
            &Palette::default(),
        )
        .unwrap();

        let decoder = GifDecoder::new(std::io::BufReader::new(File::open(&path).unwrap())).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].buffer().dimensions(), (6, 6));
        let (numer, denom) = frames[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 50);
    }

    #[test]
    fn animation_frames_stay_close_to_the_raster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quantized.gif");
        let animation = AnimationSpec {
            duration: Duration::from_millis(100),
            fps: 10.0,
        };
        let params = FieldParams::default();
        let palette = Palette::default();
        export_animation(&path, (16, 16), &animation, &params, &palette).unwrap();

        let decoder = GifDecoder::new(std::io::BufReader::new(File::open(&path).unwrap())).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 1);
        let expected = rasterize(16, 16, 0.0, &params, &palette).unwrap();
        let total: u64 = frames[0]
            .buffer()
            .pixels()
            .zip(expected.pixels())
            .flat_map(|(got, want)| (0..3).map(move |i| u64::from(got[i].abs_diff(want[i]))))
            .sum();
        let mean = total as f64 / (16.0 * 16.0 * 3.0);
        assert!(mean < 12.0, "mean channel error {mean}");
    }

    #[test]
    fn animation_rejects_zero_fps() {
        let dir = tempfile::tempdir().unwrap();
        let animation = AnimationSpec {
            duration: Duration::from_secs(1),
            fps: 0.0,
        };
        let result = export_animation(
            &dir.path().join("never.gif"),
            (4, 4),
            &animation,
            &FieldParams::default(),
            &Palette::default(),
        );
        assert!(matches!(result, Err(ExportError::InvalidFrameRate(_))));
    }
}
