//! Trail update pass.
//!
//! Draws one full-screen triangle into the output buffer. The fragment program
//! samples the input buffer, decays it, and adds a stamp at the smoothed
//! pointer scaled by the smoothed speed.

use wgpu::util::DeviceExt;

use super::buffer_pair::{BufferPair, TRAIL_FORMAT};
use crate::ping_pong::Slot;
use crate::trail::TrailParams;

/// WGSL source of the trail program.
pub const TRAIL_SHADER: &str = r#"
struct TrailParams {
    resolution: vec2<f32>,
    pointer: vec2<f32>,
    speed: f32,
    delta_time: f32,
    time: f32,
    decay_rate: f32,
    radius: f32,
    intensity: f32,
    fade_floor: f32,
    stamp_threshold: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var previous: texture_2d<f32>;
@group(0) @binding(1)
var previous_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: TrailParams;

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

fn stamp_tint(time: f32) -> vec3<f32> {
    return vec3<f32>(0.5) + 0.5 * cos(vec3<f32>(time) + vec3<f32>(0.0, 2.0, 4.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let prev = textureSample(previous, previous_sampler, in.uv).rgb;
    let attenuation = exp(-params.decay_rate * params.delta_time);
    let fade = params.fade_floor * params.delta_time;
    let faded = max(prev * attenuation - vec3<f32>(fade), vec3<f32>(0.0));

    let aspect = params.resolution.x / max(params.resolution.y, 1.0);
    let ndc = vec2<f32>(in.uv.x * 2.0 - 1.0, 1.0 - in.uv.y * 2.0);
    let offset = (ndc - params.pointer) * vec2<f32>(aspect, 1.0);
    let falloff = 1.0 - smoothstep(0.0, params.radius, length(offset));
    let moving = params.speed >= params.stamp_threshold;
    let gain = select(0.0, clamp(params.speed * params.intensity, 0.0, 1.0), moving);
    let strength = gain * falloff;

    let color = min(faded + stamp_tint(params.time) * strength, vec3<f32>(1.0));
    return vec4<f32>(color, 1.0);
}
"#;

/// GPU resources for the trail update pass.
pub struct TrailPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// One bind group per source slot.
    bind_groups: [wgpu::BindGroup; 2],
    params_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl TrailPass {
    /// Create the trail pipeline and bind groups for both buffer slots.
    pub fn new(device: &wgpu::Device, buffers: &BufferPair) -> Self {
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Trail Params Buffer"),
            contents: bytemuck::bytes_of(&TrailParams::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sampler = super::create_trail_sampler(device, "Trail Source Sampler");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Trail Shader"),
            source: wgpu::ShaderSource::Wgsl(TRAIL_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trail Bind Group Layout"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_groups =
            create_bind_groups(device, &bind_group_layout, buffers, &sampler, &params_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Trail Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Trail Pipeline"),
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
                    format: TRAIL_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            bind_groups,
            params_buffer,
            sampler,
        }
    }

    /// Recreate bind groups after the buffers were reallocated.
    pub fn rebind(&mut self, device: &wgpu::Device, buffers: &BufferPair) {
        self.bind_groups = create_bind_groups(
            device,
            &self.bind_group_layout,
            buffers,
            &self.sampler,
            &self.params_buffer,
        );
    }

    /// Upload this tick's uniforms.
    pub fn write_params(&self, queue: &wgpu::Queue, params: &TrailParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }

    /// Record the pass: sample the input buffer, write the output buffer.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, buffers: &BufferPair) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Trail Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &buffers.current_output().view,
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

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[buffers.input_slot().index()], &[]);
        pass.draw(0..3, 0..1);
    }
}

fn create_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffers: &BufferPair,
    sampler: &wgpu::Sampler,
    params_buffer: &wgpu::Buffer,
) -> [wgpu::BindGroup; 2] {
    [Slot::A, Slot::B].map(|slot| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(match slot {
                Slot::A => "Trail Bind Group (reads A)",
                Slot::B => "Trail Bind Group (reads B)",
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
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        })
    })
}
