use field::{FieldParams, Palette};

use crate::runtime::RenderPolicy;

/// Output color handling for the window surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Same as `Gamma`: colors are written to the swapchain unconverted.
    #[default]
    Auto,
    /// Treat shader outputs as display-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and let an sRGB swapchain encode them.
    Linear,
}

impl ColorSpaceMode {
    pub fn prefers_srgb(self) -> bool {
        matches!(self, Self::Linear)
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the merged config file and CLI flags. The render
/// policy alone decides whether a window opens or frames go straight to disk.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window or image size in physical pixels.
    pub surface_size: (u32, u32),
    /// Outer window position; `None` lets the platform place it.
    pub position: Option<(i32, i32)>,
    /// Window title.
    pub title: String,
    /// Desired color handling for the swapchain.
    pub color_space: ColorSpaceMode,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
    /// Scaling constants applied around the field evaluator.
    pub field: FieldParams,
    /// Color ramp used by both the GPU and CPU paths.
    pub palette: Palette,
}

impl Default for RendererConfig {
    /// An 800x800 animated window at (300, 100).
    fn default() -> Self {
        Self {
            surface_size: (800, 800),
            position: Some((300, 100)),
            title: "wellfield".to_string(),
            color_space: ColorSpaceMode::default(),
            policy: RenderPolicy::default(),
            field: FieldParams::default(),
            palette: Palette::default(),
        }
    }
}
