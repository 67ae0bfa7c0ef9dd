//! Background compositing.
//!
//! Samples the freshly written trail buffer onto a full-screen triangle drawn
//! with depth writes disabled, so every depth-tested scene draw that follows
//! lands on top of it.

use super::buffer_pair::BufferPair;
use super::DEPTH_FORMAT;
use crate::ping_pong::Slot;

/// WGSL source of the composite program.
pub const COMPOSITE_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var trail_map: texture_2d<f32>;
@group(0) @binding(1)
var trail_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(trail_map, trail_sampler, in.uv).rgb;
    return vec4<f32>(color, 1.0);
}
"#;

/// GPU resources for the background pass.
pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// One bind group per trail buffer slot.
    bind_groups: [wgpu::BindGroup; 2],
    sampler: wgpu::Sampler,
}

impl CompositePass {
    /// Create the background pipeline for the given surface format.
    pub fn new(
        device: &wgpu::Device,
        buffers: &BufferPair,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = super::create_trail_sampler(device, "Trail Map Sampler");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(COMPOSITE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_groups = create_bind_groups(device, &bind_group_layout, buffers, &sampler);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Composite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            bind_groups,
            sampler,
        }
    }

    /// Recreate bind groups after the buffers were reallocated.
    pub fn rebind(&mut self, device: &wgpu::Device, buffers: &BufferPair) {
        self.bind_groups =
            create_bind_groups(device, &self.bind_group_layout, buffers, &self.sampler);
    }

    /// Draw the background sampling `slot` into an already-open pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, slot: Slot) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[slot.index()], &[]);
        pass.draw(0..3, 0..1);
    }
}

fn create_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffers: &BufferPair,
    sampler: &wgpu::Sampler,
) -> [wgpu::BindGroup; 2] {
    [Slot::A, Slot::B].map(|slot| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(match slot {
                Slot::A => "Composite Bind Group (A)",
                Slot::B => "Composite Bind Group (B)",
            }),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&buffers.get(slot).view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    })
}
