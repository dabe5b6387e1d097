use crate::error::Result as SandboxResult;
use crate::resources::{check_texture_size, decode_texture, validate_vertices, GeometryHandle, RenderResources, TextureId};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use wgpu::{util::DeviceExt, Buffer, BufferUsages};

pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable adapter"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sandbox Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn create_buffer_init(&self, label: &str, data: &[u8], usage: BufferUsages) -> Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data,
            usage,
        })
    }
}

/// Object geometry and textures living on the GPU.
///
/// Every object texture gets its own bind group against
/// [`texture_layout`](Self::texture_layout); untextured draws bind a 1×1
/// white texture so the shader layout never changes.
pub struct WgpuResources {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    next_id: u64,
    buffers: HashMap<GeometryHandle, Buffer>,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    default_texture: wgpu::BindGroup,
}

impl WgpuResources {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Texture Layout"),
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Object Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let default_texture = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            "Default White Texture",
            &[255, 255, 255, 255],
            1,
            1,
        );

        Self {
            device,
            queue,
            next_id: 0,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            texture_layout,
            sampler,
            default_texture,
        }
    }

    pub fn buffer(&self, handle: GeometryHandle) -> Option<&Buffer> {
        self.buffers.get(&handle)
    }

    /// The object's texture, or the white fallback.
    pub fn texture_bind_group(&self, texture: Option<TextureId>) -> &wgpu::BindGroup {
        texture
            .and_then(|id| self.textures.get(&id))
            .unwrap_or(&self.default_texture)
    }

    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderResources for WgpuResources {
    fn create_geometry(&mut self, label: &str, vertices: &[f32]) -> SandboxResult<GeometryHandle> {
        validate_vertices(vertices)?;
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: BufferUsages::VERTEX,
        });
        let handle = GeometryHandle(self.allocate());
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn destroy_geometry(&mut self, handle: GeometryHandle) {
        match self.buffers.remove(&handle) {
            Some(buffer) => buffer.destroy(),
            None => log::warn!("Geometry {:?} destroyed twice", handle),
        }
    }

    fn is_geometry_live(&self, handle: GeometryHandle) -> bool {
        self.buffers.contains_key(&handle)
    }

    fn live_geometry_count(&self) -> usize {
        self.buffers.len()
    }

    fn load_texture(&mut self, path: &Path) -> SandboxResult<TextureId> {
        let image = decode_texture(path)?;
        let (width, height) = image.dimensions();
        check_texture_size(path, width, height, self.device.limits().max_texture_dimension_2d)?;

        let label = path.display().to_string();
        let bind_group = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            &label,
            image.as_raw(),
            width,
            height,
        );
        let id = TextureId(self.allocate());
        self.textures.insert(id, bind_group);
        log::debug!("Loaded texture {} ({}x{})", label, width, height);
        Ok(id)
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn live_texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[allow(clippy::too_many_arguments)]
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    rgba: &[u8],
    width: u32,
    height: u32,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
