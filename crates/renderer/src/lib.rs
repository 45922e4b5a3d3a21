//! Renderer crate for wellfield.
//!
//! Hosts the `field` pipeline on two backends that share one set of
//! parameters:
//!
//! ```text
//!   CLI / wellfield
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──┬─▶ window (winit) ──▶ GpuState ──▶ fragment shader ──▶ swapchain
//!                   │
//!                   └─▶ export ──▶ raster (rayon) ──▶ PNG / GIF
//! ```
//!
//! The render policy picks the path. `Animate` and `Still` open a window and
//! evaluate the field per pixel on the GPU; `Export` and `Record` never touch
//! the GPU and evaluate the same math on the CPU, so they work headless.

mod compile;
mod gpu;
mod window;

pub mod export;
pub mod raster;
pub mod runtime;
pub mod types;

use anyhow::{Context, Result};
use tracing::info;

use window::FrameDriver;

pub use export::{export_animation, export_still, ExportError, ExportFormat};
pub use raster::{rasterize, RasterError};
pub use runtime::{
    AnimationSpec, BoxedTimeSource, FixedTimeSource, FrameScheduler, RenderPolicy,
    SequenceTimeSource, SystemTimeSource, TimeSample, TimeSource,
};
pub use types::{ColorSpaceMode, RendererConfig};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Runs the configured policy to completion.
    ///
    /// Window policies return once the window is closed; export policies
    /// return once the file is written.
    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        config
            .field
            .validate()
            .context("invalid field parameters")?;
        config.palette.validate().context("invalid palette")?;

        match &config.policy {
            RenderPolicy::Animate { target_fps } => {
                let driver = FrameDriver::new(
                    FrameScheduler::animate(*target_fps),
                    Box::new(SystemTimeSource::new()),
                );
                window::run_window(config, driver).context("window renderer failed")
            }
            RenderPolicy::Still { time } => {
                let driver = FrameDriver::new(
                    FrameScheduler::single_shot(),
                    Box::new(FixedTimeSource::new(*time)),
                );
                window::run_window(config, driver).context("window renderer failed")
            }
            RenderPolicy::Export { path, time } => {
                info!(path = %path.display(), time, "exporting still frame");
                export_still(path, config.surface_size, *time, &config.field, &config.palette)
                    .with_context(|| format!("failed to export {}", path.display()))?;
                Ok(())
            }
            RenderPolicy::Record { path, animation } => {
                info!(
                    path = %path.display(),
                    duration = ?animation.duration,
                    fps = animation.fps,
                    frames = animation.frame_count(),
                    "recording animation"
                );
                export_animation(
                    path,
                    config.surface_size,
                    animation,
                    &config.field,
                    &config.palette,
                )
                .with_context(|| format!("failed to record {}", path.display()))?;
                Ok(())
            }
        }
    }
}
