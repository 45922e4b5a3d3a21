use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing::{debug, error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{BoxedTimeSource, FrameScheduler};
use crate::types::RendererConfig;

/// GPU state plus the window it draws into.
///
/// Field order matters: the surface inside `gpu` must drop before `window`.
struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            config.color_space,
            &config.field,
            &config.palette,
        )?;
        Ok(Self { gpu, window })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }
}

/// Pairs the frame scheduler with the clock feeding it.
pub(crate) struct FrameDriver {
    scheduler: FrameScheduler,
    time_source: BoxedTimeSource,
}

impl FrameDriver {
    pub(crate) fn new(scheduler: FrameScheduler, time_source: BoxedTimeSource) -> Self {
        Self {
            scheduler,
            time_source,
        }
    }

    /// Forces the next check to draw without restarting the clock.
    fn invalidate(&mut self) {
        self.scheduler.reset();
    }
}

/// Opens the preview window and drives it until it is closed.
///
/// Must be called from the main thread on platforms that require it.
pub(crate) fn run_window(config: &RendererConfig, mut driver: FrameDriver) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.surface_size;
    let mut builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)));
    if let Some((x, y)) = config.position {
        builder = builder.with_position(PhysicalPosition::new(x, y));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err}"))?;
    info!(
        width,
        height,
        policy = ?config.policy,
        "window opened"
    );
    state.window().request_redraw();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => match event
        {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!(fps = state.gpu.frames_per_second().round(), "closing window");
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size);
                driver.invalidate();
                state.window().request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let sample = driver.time_source.sample();
                match state.gpu.render(sample) {
                    Ok(()) => driver.scheduler.mark_rendered(Instant::now()),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        debug!(size = ?state.gpu.size(), "surface lost or outdated; reconfiguring");
                        state.gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; exiting");
                        elwt.exit();
                    }
                    Err(other) => {
                        warn!(error = ?other, "surface error; retrying next frame");
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if driver.scheduler.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = driver.scheduler.next_deadline() {
                tracing::trace!(
                    deadline_ms = deadline.saturating_duration_since(now).as_millis(),
                    "scheduler: waiting until next frame"
                );
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
