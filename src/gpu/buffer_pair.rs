//! Offscreen trail buffers.
//!
//! Two half-float color targets without depth, always the same size, used in
//! alternation by the trail and composite passes.

use crate::error::GpuError;
use crate::ping_pong::{PingPong, Slot};
use crate::viewport::buffer_extent;

/// Color format of the offscreen trail buffers.
pub const TRAIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// One offscreen color target.
pub struct OffscreenBuffer {
    /// Backing texture.
    pub texture: wgpu::Texture,
    /// View used both as render attachment and as sampled texture.
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenBuffer {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TRAIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

fn slot_label(slot: Slot) -> &'static str {
    match slot {
        Slot::A => "Trail Buffer A",
        Slot::B => "Trail Buffer B",
    }
}

/// The ping/pong pair of trail buffers.
pub struct BufferPair {
    buffers: PingPong<OffscreenBuffer>,
    downscale: f32,
}

impl BufferPair {
    /// Allocate both buffers at `viewport * downscale`.
    ///
    /// Fails if either viewport dimension is zero.
    pub fn allocate(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        downscale: f32,
    ) -> Result<Self, GpuError> {
        let (w, h) = buffer_extent(width, height, downscale)
            .ok_or(GpuError::InvalidDimensions { width, height })?;

        tracing::info!(width = w, height = h, format = ?TRAIL_FORMAT, "allocating trail buffers");

        Ok(Self {
            buffers: PingPong::new(
                OffscreenBuffer::new(device, slot_label(Slot::A), w, h),
                OffscreenBuffer::new(device, slot_label(Slot::B), w, h),
            ),
            downscale,
        })
    }

    /// Reallocate both buffers for a new viewport size.
    ///
    /// Slot roles are kept. Zero dimensions clamp to 1.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (w, h) = buffer_extent(width.max(1), height.max(1), self.downscale).unwrap_or((1, 1));
        if (w, h) == self.extent() {
            return;
        }
        self.buffers.for_each_mut(|slot, buffer| {
            *buffer = OffscreenBuffer::new(device, slot_label(slot), w, h);
        });
    }

    /// Exchange input and output roles.
    #[inline]
    pub fn swap(&mut self) {
        self.buffers.swap();
    }

    /// Buffer sampled by the trail pass this tick.
    #[inline]
    pub fn current_input(&self) -> &OffscreenBuffer {
        self.buffers.input()
    }

    /// Buffer written by the trail pass this tick.
    #[inline]
    pub fn current_output(&self) -> &OffscreenBuffer {
        self.buffers.output()
    }

    #[inline]
    pub fn input_slot(&self) -> Slot {
        self.buffers.input_slot()
    }

    #[inline]
    pub fn output_slot(&self) -> Slot {
        self.buffers.output_slot()
    }

    /// Buffer in a specific slot.
    #[inline]
    pub fn get(&self, slot: Slot) -> &OffscreenBuffer {
        self.buffers.get(slot)
    }

    /// Shared dimensions of both buffers.
    pub fn extent(&self) -> (u32, u32) {
        let buffer = self.buffers.input();
        (buffer.width, buffer.height)
    }
}
