//! GPU path for the interactive window.
//!
//! - `context` owns wgpu instance/device/surface wiring and picks the
//!   swapchain format for the requested color space.
//! - `pipeline` builds the single full-screen render pipeline.
//! - `uniforms` mirrors the fragment shader's `FieldBlock`.
//! - `state` glues everything together behind the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
pub(crate) mod uniforms;

pub(crate) use state::GpuState;
