mod buffer_pair;
mod composite;
mod scene;
mod trail_pass;

use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

pub use buffer_pair::{BufferPair, OffscreenBuffer, TRAIL_FORMAT};
pub use composite::{CompositePass, COMPOSITE_SHADER};
pub use scene::{AxesHelper, SceneContext, SceneLayer};
pub use trail_pass::{TrailPass, TRAIL_SHADER};

use crate::config::TrailConfig;
use crate::error::GpuError;
use crate::frame::FrameBackend;
use crate::trail::TrailParams;
use crate::viewport::Viewport;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Builds a scene layer once the device exists.
pub type LayerFactory = Box<dyn FnOnce(&SceneContext<'_>) -> Box<dyn SceneLayer>>;

pub(crate) fn create_trail_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Core GPU state: the display surface, the trail buffer pair, both passes
/// and the scene layers.
///
/// Implements [`FrameBackend`], so it is driven by
/// [`RendererState`](crate::frame::RendererState). Surface and buffer sizes
/// only change through [`FrameBackend::apply_viewport`].
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    buffers: BufferPair,
    trail: TrailPass,
    composite: CompositePass,
    layers: Vec<Box<dyn SceneLayer>>,
    clear_color: wgpu::Color,
}

impl GpuState {
    /// Acquire an adapter and device for `window`, configure the surface at
    /// the viewport's surface size, allocate the trail buffers and build
    /// every pipeline, including one layer per factory.
    pub async fn new(
        window: Arc<Window>,
        viewport: &Viewport,
        trail_config: &TrailConfig,
        layer_factories: Vec<LayerFactory>,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "using GPU adapter");

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
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::info!(format = ?surface_format, "configuring surface");

        let (width, height) = viewport.surface_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let buffers = BufferPair::allocate(
            &device,
            viewport.width(),
            viewport.height(),
            trail_config.downscale,
        )?;
        let trail = TrailPass::new(&device, &buffers);
        let composite = CompositePass::new(&device, &buffers, surface_format);

        let ctx = SceneContext {
            device: &device,
            color_format: surface_format,
            depth_format: DEPTH_FORMAT,
        };
        let layers = layer_factories.into_iter().map(|factory| factory(&ctx)).collect();

        let [r, g, b, a] = trail_config.clear_color;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            buffers,
            trail,
            composite,
            layers,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Reconfigure the surface at its current size, e.g. after it was lost.
    pub fn reconfigure_surface(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// The offscreen buffer pair.
    pub fn buffers(&self) -> &BufferPair {
        &self.buffers
    }

    /// Current surface configuration.
    pub fn surface_config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }
}

/// Trail and composite work are submitted separately; queue order keeps the
/// composite behind the trail write.
impl FrameBackend for GpuState {
    type Error = wgpu::SurfaceError;

    fn update_trail(&mut self, params: &TrailParams) {
        self.trail.write_params(&self.queue, params);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Trail Encoder"),
            });
        self.trail.encode(&mut encoder, &self.buffers);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn composite(&mut self, view_proj: Mat4) -> Result<(), wgpu::SurfaceError> {
        for layer in &mut self.layers {
            layer.prepare(&self.queue, view_proj);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

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
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.composite.draw(&mut render_pass, self.buffers.output_slot());
            for layer in &self.layers {
                layer.draw(&mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn swap_buffers(&mut self) {
        self.buffers.swap();
    }

    fn apply_viewport(&mut self, viewport: &Viewport) {
        let (width, height) = viewport.surface_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config);

        self.buffers.resize(&self.device, viewport.width(), viewport.height());
        self.trail.rebind(&self.device, &self.buffers);
        self.composite.rebind(&self.device, &self.buffers);
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
