//! Application builder and runner

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{CameraConfig, TrailConfig};
use crate::error::AppError;
use crate::frame::RendererState;
use crate::gpu::{AxesHelper, GpuState, LayerFactory, SceneContext, SceneLayer};
use crate::viewport::Viewport;

const AXES_SIZE: f32 = 3.0;

/// A pointer-trail background application builder.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct TrailApp {
    title: String,
    window_size: (u32, u32),
    trail: TrailConfig,
    camera: CameraConfig,
    show_axes: bool,
    layers: Vec<LayerFactory>,
}

impl TrailApp {
    /// Create a new app with default settings.
    pub fn new() -> Self {
        Self {
            title: "trailfx".to_string(),
            window_size: (1280, 720),
            trail: TrailConfig::default(),
            camera: CameraConfig::default(),
            show_axes: true,
            layers: Vec::new(),
        }
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial logical window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width.max(1), height.max(1));
        self
    }

    /// Set the trail configuration.
    pub fn with_trail(mut self, config: TrailConfig) -> Self {
        self.trail = config;
        self
    }

    /// Set the camera configuration.
    pub fn with_camera(mut self, config: CameraConfig) -> Self {
        self.camera = config;
        self
    }

    /// Show or hide the world axes helper.
    pub fn with_axes(mut self, show: bool) -> Self {
        self.show_axes = show;
        self
    }

    /// Add a scene layer, built once the GPU device exists.
    pub fn with_layer<F, L>(mut self, factory: F) -> Self
    where
        F: FnOnce(&SceneContext<'_>) -> L + 'static,
        L: SceneLayer + 'static,
    {
        self.layers.push(Box::new(move |ctx: &SceneContext<'_>| {
            Box::new(factory(ctx)) as Box<dyn SceneLayer>
        }));
        self
    }

    /// Run the app. Blocks until the window is closed.
    ///
    /// Initialization failures (window, surface, adapter, device, buffers)
    /// stop the loop before the first frame and are returned here.
    pub fn run(mut self) -> Result<(), AppError> {
        if self.show_axes {
            self.layers.insert(
                0,
                Box::new(|ctx: &SceneContext<'_>| {
                    Box::new(AxesHelper::new(ctx, AXES_SIZE)) as Box<dyn SceneLayer>
                }),
            );
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for TrailApp {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    settings: TrailApp,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    renderer: Option<RendererState>,
    running: bool,
    failure: Option<AppError>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    fn new(settings: TrailApp) -> Self {
        Self {
            settings,
            window: None,
            gpu_state: None,
            renderer: None,
            running: true,
            failure: None,
            mouse_pressed: false,
            last_mouse_pos: None,
        }
    }

    fn viewport_for(&self, window: &Window) -> Viewport {
        Viewport::from_physical(
            window.inner_size(),
            window.scale_factor(),
            self.settings.trail.max_pixel_ratio,
            self.settings.trail.downscale,
        )
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.settings.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let viewport = self.viewport_for(&window);

        let layers = std::mem::take(&mut self.settings.layers);
        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            &viewport,
            &self.settings.trail,
            layers,
        ))?;

        tracing::info!(
            width = viewport.width(),
            height = viewport.height(),
            pixel_ratio = viewport.pixel_ratio(),
            "trail renderer ready"
        );

        self.renderer = Some(RendererState::new(
            &self.settings.trail,
            &self.settings.camera,
            viewport,
        ));
        self.gpu_state = Some(gpu_state);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.running = false;
        event_loop.exit();
    }

    fn handle_resize(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let viewport = self.viewport_for(&window);
        if let (Some(renderer), Some(gpu_state)) = (&mut self.renderer, &mut self.gpu_state) {
            renderer.resize(viewport, gpu_state);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(gpu_state)) = (&mut self.renderer, &mut self.gpu_state) else {
            return;
        };

        match renderer.tick(gpu_state) {
            Ok(_) => {
                if renderer.clock.frame() % 600 == 0 {
                    tracing::debug!(fps = renderer.clock.fps(), "frame rate");
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                gpu_state.reconfigure_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, stopping");
                self.running = false;
                event_loop.exit();
                return;
            }
            Err(e) => tracing::warn!(error = ?e, "frame skipped"),
        }

        if self.running {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() && self.failure.is_none() {
            if let Err(err) = self.initialize(event_loop) {
                tracing::error!(error = %err, "initialization failed");
                self.failure = Some(err);
                self.stop(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.stop(event_loop);
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.handle_resize();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = &mut self.renderer {
                    let viewport = *renderer.viewport();
                    renderer.pointer.handle_event(&event, &viewport);

                    if self.mouse_pressed {
                        if let Some((last_x, last_y)) = self.last_mouse_pos {
                            let dx = position.x - last_x;
                            let dy = position.y - last_y;
                            renderer.camera.rotate(dx as f32, dy as f32);
                        }
                        self.last_mouse_pos = Some((position.x, position.y));
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}
