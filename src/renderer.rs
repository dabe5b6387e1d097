//! wgpu renderer for [`FrameData`] snapshots.
//!
//! One pipeline draws everything. Bind group 0 holds the view-projection
//! matrix, group 1 a per-draw uniform selected by dynamic offset, group 2 the
//! object texture (or the white fallback from [`WgpuResources`]).

use crate::capture::{bgra_to_rgba, is_bgra, padded_bytes_per_row, strip_row_padding};
use crate::draw::{FrameData, PARTICLE_COLOR, STROKE_COLOR};
use crate::gpu::{GpuContext, WgpuResources};
use anyhow::{anyhow, Result};
use glam::{Mat4, Vec3};
use std::num::NonZeroU64;
use std::sync::Arc;
use winit::window::Window;

pub const CAPTURE_WIDTH: u32 = 1024;
pub const CAPTURE_HEIGHT: u32 = 768;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.08,
    a: 1.0,
};
const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Satisfies `min_uniform_buffer_offset_alignment` on every backend.
const DRAW_UNIFORM_STRIDE: u64 = 256;
const INITIAL_DRAW_CAPACITY: usize = 256;
const INITIAL_VERTEX_BYTES: u64 = 64 * 1024;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    use_texture: u32,
    _padding: [u32; 3],
}

impl DrawUniform {
    fn new(model: Mat4, color: Vec3, use_texture: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
            use_texture: use_texture as u32,
            _padding: [0; 3],
        }
    }
}

/// Vertex buffer that grows to fit whatever is written to it.
struct DynamicVertexBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
    vertex_count: u32,
}

impl DynamicVertexBuffer {
    fn new(gpu: &GpuContext, label: &'static str) -> Self {
        Self {
            label,
            buffer: Self::allocate(gpu, label, INITIAL_VERTEX_BYTES),
            capacity: INITIAL_VERTEX_BYTES,
            vertex_count: 0,
        }
    }

    fn allocate(gpu: &GpuContext, label: &str, size: u64) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, gpu: &GpuContext, vertices: &[f32]) {
        self.vertex_count = (vertices.len() / 4) as u32;
        if vertices.is_empty() {
            return;
        }
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer.destroy();
            self.buffer = Self::allocate(gpu, self.label, self.capacity);
        }
        gpu.queue.write_buffer(&self.buffer, 0, bytes);
    }

    fn byte_len(&self) -> u64 {
        self.vertex_count as u64 * 4 * std::mem::size_of::<f32>() as u64
    }
}

pub struct Renderer {
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,

    particles: DynamicVertexBuffer,
    strokes: DynamicVertexBuffer,
}

impl Renderer {
    /// With no window the renderer only draws offscreen.
    pub fn new(
        window: Option<Arc<Window>>,
        gpu: &GpuContext,
        resources: &WgpuResources,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let (surface, config) = match window {
            Some(window) => {
                let size = window.inner_size();
                let surface = gpu.instance.create_surface(window)?;
                let surface_caps = surface.get_capabilities(&gpu.adapter);
                let surface_format = surface_caps
                    .formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .copied()
                    .or_else(|| surface_caps.formats.first().copied())
                    .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
                let alpha_mode = surface_caps
                    .alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(wgpu::CompositeAlphaMode::Auto);

                let config = surface_config(surface_format, size.width.max(1), size.height.max(1), alpha_mode);
                surface.configure(&gpu.device, &config);
                (Some(surface), config)
            }
            None => (
                None,
                surface_config(HEADLESS_FORMAT, width, height, wgpu::CompositeAlphaMode::Auto),
            ),
        };

        let globals_layout = uniform_layout(gpu, "Globals Layout", false, wgpu::ShaderStages::VERTEX);
        let draw_layout = uniform_layout(
            gpu,
            "Draw Uniform Layout",
            true,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let globals_buffer = gpu.create_buffer_init(
            "Globals Buffer",
            bytemuck::cast_slice(&[GlobalsUniform {
                view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            }]),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let globals_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let (draw_buffer, draw_bind_group) = create_draw_buffer(gpu, &draw_layout, INITIAL_DRAW_CAPACITY);

        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sandbox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sandbox.wgsl").into()),
        });
        let render_pipeline = create_render_pipeline(
            gpu,
            &shader,
            &[&globals_layout, &draw_layout, resources.texture_layout()],
            config.format,
        );

        Ok(Self {
            surface,
            config,
            render_pipeline,
            globals_buffer,
            globals_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            particles: DynamicVertexBuffer::new(gpu, "Particle Vertex Buffer"),
            strokes: DynamicVertexBuffer::new(gpu, "Stroke Vertex Buffer"),
        })
    }

    pub fn resize(&mut self, gpu: &GpuContext, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            if let Some(surface) = &self.surface {
                surface.configure(&gpu.device, &self.config);
            }
        }
    }

    /// Draws `frame` to the window surface.
    pub fn render(&mut self, gpu: &GpuContext, resources: &WgpuResources, frame: &FrameData) -> Result<(), wgpu::SurfaceError> {
        self.prepare(gpu, frame);

        let Some(surface) = &self.surface else {
            return Ok(());
        };
        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        self.encode_render_pass(&mut encoder, &view, resources, frame);
        gpu.queue.submit(Some(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Draws `frame` into an offscreen texture and reads it back as tightly
    /// packed RGBA rows, top row first.
    pub fn render_to_image(
        &mut self,
        gpu: &GpuContext,
        resources: &WgpuResources,
        frame: &FrameData,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        self.prepare(gpu, frame);

        let format = self.config.format;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bytes_per_row = padded_bytes_per_row(width);
        let staging_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Staging Buffer"),
            size: bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        self.encode_render_pass(&mut encoder, &view, resources, frame);
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            size,
        );
        let submission = gpu.queue.submit(Some(encoder.finish()));
        gpu.device.poll(wgpu::MaintainBase::WaitForSubmissionIndex(submission));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.device.poll(wgpu::MaintainBase::Wait);

        pollster::block_on(rx)
            .map_err(|_| anyhow!("Capture readback was cancelled"))?
            .map_err(|err| anyhow!("Failed to map capture buffer: {}", err))?;

        let data = buffer_slice.get_mapped_range();
        let pixels = strip_row_padding(&data, width, height, bytes_per_row);
        drop(data);
        staging_buffer.unmap();

        if is_bgra(format) {
            Ok(bgra_to_rgba(&pixels))
        } else {
            Ok(pixels)
        }
    }

    /// Uploads globals, per-draw uniforms and the particle and stroke quads.
    fn prepare(&mut self, gpu: &GpuContext, frame: &FrameData) {
        gpu.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[GlobalsUniform {
                view_projection: frame.view_projection.to_cols_array_2d(),
            }]),
        );

        // Objects first, then one slot each for particles and strokes.
        let draw_count = frame.objects.len() + 2;
        if draw_count > self.draw_capacity {
            self.draw_capacity = draw_count.next_power_of_two();
            self.draw_buffer.destroy();
            let (buffer, bind_group) = create_draw_buffer(gpu, &self.draw_layout, self.draw_capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
        }

        let uniforms = frame
            .objects
            .iter()
            .map(|object| DrawUniform::new(object.model, object.color, object.texture.is_some()))
            .chain([
                DrawUniform::new(Mat4::IDENTITY, PARTICLE_COLOR, false),
                DrawUniform::new(Mat4::IDENTITY, STROKE_COLOR, false),
            ]);
        let mut bytes = vec![0u8; draw_count * DRAW_UNIFORM_STRIDE as usize];
        for (slot, uniform) in uniforms.enumerate() {
            let start = slot * DRAW_UNIFORM_STRIDE as usize;
            let raw = bytemuck::bytes_of(&uniform);
            bytes[start..start + raw.len()].copy_from_slice(raw);
        }
        gpu.queue.write_buffer(&self.draw_buffer, 0, &bytes);

        self.particles.write(gpu, &frame.particle_vertices);
        self.strokes.write(gpu, &frame.stroke_vertices);
    }

    fn encode_render_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        resources: &WgpuResources,
        frame: &FrameData,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sandbox Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

        for (slot, object) in frame.objects.iter().enumerate() {
            let Some(buffer) = resources.buffer(object.geometry) else {
                continue;
            };
            render_pass.set_bind_group(1, &self.draw_bind_group, &[draw_offset(slot)]);
            render_pass.set_bind_group(2, resources.texture_bind_group(object.texture), &[]);
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..object.vertex_count, 0..1);
        }

        let untextured = resources.texture_bind_group(None);
        let batches = [(&self.particles, frame.objects.len()), (&self.strokes, frame.objects.len() + 1)];
        for (batch, slot) in batches {
            if batch.vertex_count == 0 {
                continue;
            }
            render_pass.set_bind_group(1, &self.draw_bind_group, &[draw_offset(slot)]);
            render_pass.set_bind_group(2, untextured, &[]);
            render_pass.set_vertex_buffer(0, batch.buffer.slice(..batch.byte_len()));
            render_pass.draw(0..batch.vertex_count, 0..1);
        }
    }
}

fn draw_offset(slot: usize) -> u32 {
    (slot as u64 * DRAW_UNIFORM_STRIDE) as u32
}

fn surface_config(
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    alpha_mode: wgpu::CompositeAlphaMode,
) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

fn uniform_layout(
    gpu: &GpuContext,
    label: &str,
    has_dynamic_offset: bool,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    let min_binding_size = if has_dynamic_offset {
        NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64)
    } else {
        None
    };
    gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size,
            },
            count: None,
        }],
    })
}

fn create_draw_buffer(gpu: &GpuContext, layout: &wgpu::BindGroupLayout, capacity: usize) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniform Buffer"),
        size: capacity as u64 * DRAW_UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_render_pipeline(
    gpu: &GpuContext,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sandbox Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Sandbox Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[vertex_buffer_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 4 * 4, // 2 position + 2 uv floats
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 2 * 4,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    }
}
