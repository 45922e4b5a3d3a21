use std::time::{Duration, Instant};

use anyhow::Result;
use field::{FieldParams, Palette};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::runtime::TimeSample;
use crate::types::ColorSpaceMode;

use super::context::GpuContext;
use super::pipeline::FieldPipeline;
use super::uniforms::FieldUniforms;

/// Rolling frames-per-second counter, reported once per window.
#[derive(Debug, Clone)]
pub(crate) struct FrameStats {
    window: Duration,
    last_report: Instant,
    frames_since_report: u32,
    frames_per_second: f32,
}

impl FrameStats {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            last_report: now,
            frames_since_report: 0,
            frames_per_second: 0.0,
        }
    }

    /// Counts a frame; returns the fresh rate when a window has elapsed.
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames_since_report += 1;
        let elapsed = now.saturating_duration_since(self.last_report);
        if elapsed < self.window {
            return None;
        }
        self.frames_per_second = self.frames_since_report as f32 / elapsed.as_secs_f32();
        self.frames_since_report = 0;
        self.last_report = now;
        Some(self.frames_per_second)
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }
}

pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: FieldPipeline,
    uniform_buffer: wgpu::Buffer,
    uniforms: FieldUniforms,
    stats: FrameStats,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        color_space: ColorSpaceMode,
        params: &FieldParams,
        palette: &Palette,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, color_space)?;

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("field uniform buffer"),
            size: std::mem::size_of::<FieldUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pipeline = FieldPipeline::new(&context.device, context.surface_format, &uniform_buffer);

        let uniforms = FieldUniforms::new(params, palette);
        Self::write_uniforms(&context.queue, &uniform_buffer, &uniforms);

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniforms,
            stats: FrameStats::new(Duration::from_secs(1), Instant::now()),
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Most recently measured frame rate; zero before the first report.
    pub(crate) fn frames_per_second(&self) -> f32 {
        self.stats.frames_per_second()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if self.context.resize(new_size) {
            debug!(
                width = new_size.width,
                height = new_size.height,
                "resized surface"
            );
        }
    }

    /// Reapplies the current swapchain configuration after a lost surface.
    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    pub(crate) fn render(&mut self, sample: TimeSample) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let now = Instant::now();
        if let Some(fps) = self.stats.record(now) {
            debug!(
                fps = fps.round(),
                frame = sample.frame_index,
                time = sample.seconds,
                "render stats"
            );
        }

        self.uniforms.update_time(sample);
        Self::write_uniforms(&self.context.queue, &self.uniform_buffer, &self.uniforms);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("field encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("field pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn write_uniforms(queue: &wgpu::Queue, buffer: &wgpu::Buffer, uniforms: &FieldUniforms) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(uniforms));
    }
}
