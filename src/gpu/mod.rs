//! wgpu renderer for the window host.
//!
//! [`GpuRenderer`] implements [`DrawSurface`] by recording circles and line
//! segments on the CPU during a frame, then uploading and drawing them in a
//! single render pass from [`GpuRenderer::present`]. Coordinates stay in
//! surface pixels all the way into the shaders, which map them to clip space
//! with a small screen-size uniform.

mod circles;
mod lines;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use circles::{CircleInstance, CIRCLE_SHADER};
pub use lines::{LineVertex, LINE_SHADER};

use crate::color::Rgb;
use crate::error::GpuError;
use crate::surface::DrawSurface;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

/// A vertex buffer that grows to fit whatever a frame records.
struct GrowableBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl GrowableBuffer {
    const INITIAL_CAPACITY: u64 = 64 * 1024;

    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            buffer: Self::allocate(device, label, Self::INITIAL_CAPACITY),
            capacity: Self::INITIAL_CAPACITY,
            label,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("{} grown to {} bytes", self.label, self.capacity);
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

/// Window-backed renderer.
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    circle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    screen_buffer: wgpu::Buffer,
    screen_bind_group: wgpu::BindGroup,
    circle_buffer: GrowableBuffer,
    line_buffer: GrowableBuffer,
    clear_color: wgpu::Color,
    circles: Vec<CircleInstance>,
    lines: Vec<LineVertex>,
    /// Whether output colors are re-encoded to sRGB by the surface.
    srgb: bool,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let screen = ScreenUniform {
            size: [config.width as f32, config.height as f32],
            _pad: [0.0; 2],
        };
        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniform Buffer"),
            contents: bytemuck::bytes_of(&screen),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Screen Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Screen Bind Group"),
            layout: &screen_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let circle_pipeline = circles::create_pipeline(&device, &screen_layout, surface_format);
        let line_pipeline = lines::create_pipeline(&device, &screen_layout, surface_format);
        let circle_buffer = GrowableBuffer::new(&device, "Circle Instance Buffer");
        let line_buffer = GrowableBuffer::new(&device, "Line Vertex Buffer");

        log::info!(
            "renderer ready: {}x{} {:?}",
            config.width,
            config.height,
            surface_format
        );

        Ok(Self {
            surface,
            device,
            queue,
            srgb: surface_format.is_srgb(),
            config,
            circle_pipeline,
            line_pipeline,
            screen_buffer,
            screen_bind_group,
            circle_buffer,
            line_buffer,
            clear_color: wgpu::Color::WHITE,
            circles: Vec::new(),
            lines: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let screen = ScreenUniform {
                size: [new_size.width as f32, new_size.height as f32],
                _pad: [0.0; 2],
            };
            self.queue
                .write_buffer(&self.screen_buffer, 0, bytemuck::bytes_of(&screen));
        }
    }

    fn shader_color(&self, color: Rgb, alpha: f32) -> [f32; 4] {
        let [r, g, b] = if self.srgb {
            color.to_linear_f32()
        } else {
            color.to_f32()
        };
        [r, g, b, alpha]
    }

    /// Upload everything recorded since the last clear, draw it and present.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.circle_buffer
            .write(&self.device, &self.queue, bytemuck::cast_slice(&self.circles));
        self.line_buffer
            .write(&self.device, &self.queue, bytemuck::cast_slice(&self.lines));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.screen_bind_group, &[]);

            // Lines under circles
            if !self.lines.is_empty() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.line_buffer.buffer.slice(..));
                render_pass.draw(0..self.lines.len() as u32, 0..1);
            }
            if !self.circles.is_empty() {
                render_pass.set_pipeline(&self.circle_pipeline);
                render_pass.set_vertex_buffer(0, self.circle_buffer.buffer.slice(..));
                render_pass.draw(0..6, 0..self.circles.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl DrawSurface for GpuRenderer {
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn clear(&mut self, color: Rgb) {
        let [r, g, b, a] = self.shader_color(color, 1.0);
        self.clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        };
        self.circles.clear();
        self.lines.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        let color = self.shader_color(color, alpha);
        self.circles.push(CircleInstance {
            center: center.to_array(),
            radius,
            _pad: 0.0,
            color,
        });
    }

    // Hardware lines are always one pixel wide.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Rgb, alpha: f32) {
        let color = self.shader_color(color, alpha);
        for point in [from, to] {
            self.lines.push(LineVertex {
                position: point.to_array(),
                _pad: [0.0; 2],
                color,
            });
        }
    }
}
