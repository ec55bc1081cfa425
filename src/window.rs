//! Interactive window host.
//!
//! Opens a winit window, renders the engine with the GPU renderer every
//! redraw and forwards input:
//!
//! - pointer movement repels particles; leaving the window stops it;
//! - digit keys `1`-`9` morph into the preset bound to that key;
//! - `0` or `Escape` returns to the ambient field;
//! - `Space` pauses the simulation.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::AppConfig;
use crate::engine::Engine;
use crate::error::HostError;
use crate::gpu::GpuRenderer;
use crate::input::{Input, KeyCode};
use crate::surface::DrawSurface;
use crate::text::TextRasterizer;
use crate::time::Time;

/// Open a window and run until it is closed.
pub fn run(config: AppConfig, rasterizer: Arc<dyn TextRasterizer>) -> Result<(), HostError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, rasterizer);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: AppConfig,
    rasterizer: Arc<dyn TextRasterizer>,
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    engine: Option<Engine>,
    input: Input,
    time: Time,
    /// Set when setup fails; reported once the event loop returns.
    error: Option<HostError>,
}

impl App {
    fn new(config: AppConfig, rasterizer: Arc<dyn TextRasterizer>) -> Self {
        Self {
            config,
            rasterizer,
            window: None,
            renderer: None,
            engine: None,
            input: Input::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), HostError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;
        let (width, height) = renderer.size();

        self.engine = Some(Engine::new(
            self.config.engine.clone(),
            width,
            height,
            Arc::clone(&self.rasterizer),
        ));
        self.renderer = Some(renderer);
        self.window = Some(window);
        self.time = Time::new();
        Ok(())
    }

    /// Turn this frame's key presses into engine requests.
    fn apply_keys(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if self.input.key_pressed(KeyCode::Space) {
            self.time.toggle_pause();
            log::info!("simulation {}", if self.time.is_paused() { "paused" } else { "resumed" });
        }

        if self.input.key_pressed(KeyCode::Escape) {
            engine.request_shapes(Vec::new());
        } else if let Some(digit) = self.input.pressed_digit() {
            match self.config.preset_for_key(digit) {
                Some(preset) => {
                    log::info!("morphing into preset '{}'", preset.name);
                    engine.request_shapes(preset.sources.clone());
                }
                None if digit == 0 => {
                    engine.request_shapes(Vec::new());
                }
                None => log::debug!("no preset bound to key {digit}"),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_keys();
        self.input.begin_frame();

        let (Some(engine), Some(renderer)) = (self.engine.as_mut(), self.renderer.as_mut()) else {
            return;
        };

        match self.input.pointer() {
            Some(position) => engine.set_pointer(position),
            None => engine.clear_pointer(),
        }

        let delta = self.time.update();
        if self.time.is_paused() {
            engine.draw(renderer);
        } else {
            engine.frame(renderer, delta);
        }

        match renderer.present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    renderer.resize(window.inner_size());
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory; exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("dropped frame: {e:?}"),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Resumed can fire more than once; keep the existing engine and window
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("failed to start: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                if let Some(engine) = self.engine.take() {
                    engine.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
