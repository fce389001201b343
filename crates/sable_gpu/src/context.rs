//! GPU context: device, queue, bind group layouts, and shared buffers
//!
//! The context is created once and passed by reference into every mesh,
//! settings, and paint-record operation. It owns the process-wide resources
//! those operations share: the bind group layouts the pipelines were built
//! against, the linear sampler, and the triangle-fan index buffer (WebGPU has
//! no fan topology, so fans are emulated with a shared `(0, i+1, i+2)` index
//! pattern that grows monotonically with the largest fan seen).

use thiserror::Error;

/// Errors raised while acquiring the GPU context
#[derive(Debug, Error)]
pub enum ContextError {
    /// Failed to request GPU adapter
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,
    /// Failed to request GPU device
    #[error("Failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Configuration for context creation
#[derive(Clone, Debug)]
pub struct ContextConfig {
    /// Adapter selection preference
    pub power_preference: wgpu::PowerPreference,
    /// Backends to consider when enumerating adapters
    pub backends: wgpu::Backends,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::PRIMARY,
        }
    }
}

/// Bind group layouts for the shading stages consumed by the pipelines
pub struct BindGroupLayouts {
    /// Group shared by every paint record: model matrix + blend settings
    pub paint: wgpu::BindGroupLayout,
    /// Solid fill: color uniform
    pub solid: wgpu::BindGroupLayout,
    /// Gradient fill: mapping uniform + lookup texture + sampler
    pub gradient: wgpu::BindGroupLayout,
    /// Picture: image texture + sampler
    pub image: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }
        };
        let texture_entry = |binding: u32, view_dimension: wgpu::TextureViewDimension| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            }
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let paint = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Paint Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let solid = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Solid Fill Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });

        let gradient = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gradient Fill Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::TextureViewDimension::D1),
                sampler_entry(2),
            ],
        });

        let image = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Image Bind Group Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                sampler_entry(1),
            ],
        });

        Self {
            paint,
            solid,
            gradient,
            image,
        }
    }
}

/// The rendering context shared by all render data under one device
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub layouts: BindGroupLayouts,
    sampler: wgpu::Sampler,
    /// Shared fan index buffer, grown to cover the largest fan seen
    fan_indices: Option<wgpu::Buffer>,
    /// Vertex count the fan index buffer currently covers
    fan_vertex_capacity: u32,
}

impl Context {
    /// Create a new headless context
    pub async fn new(config: ContextConfig) -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ContextError::AdapterNotFound)?;

        let info = adapter.get_info();
        tracing::info!("Using GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sable GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        Ok(Self::with_device(device, queue))
    }

    /// Blocking variant of [`Context::new`]
    pub fn new_blocking(config: ContextConfig) -> Result<Self, ContextError> {
        pollster::block_on(Self::new(config))
    }

    /// Wrap an existing device and queue (embedders, tests)
    pub fn with_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let layouts = BindGroupLayouts::new(&device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sable Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            layouts,
            sampler,
            fan_indices: None,
            fan_vertex_capacity: 0,
        }
    }

    /// The shared linear clamp sampler
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// The shared fan index buffer, if any fan mesh has been updated yet
    pub fn fan_index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.fan_indices.as_ref()
    }

    /// Grow the shared fan index buffer to cover fans of `vertex_count`
    /// vertices. Capacity is monotonic; smaller fans reuse the prefix.
    pub fn ensure_fan_indices(&mut self, vertex_count: u32) {
        if vertex_count <= self.fan_vertex_capacity && self.fan_indices.is_some() {
            return;
        }
        if vertex_count < 3 {
            return;
        }

        let mut indices: Vec<u32> = Vec::with_capacity((vertex_count as usize - 2) * 3);
        for i in 0..vertex_count - 2 {
            indices.extend_from_slice(&[0, i + 1, i + 2]);
        }

        let data = bytemuck::cast_slice(&indices);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fan Index Buffer"),
            size: data.len() as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(&buffer, 0, data);

        self.fan_indices = Some(buffer);
        self.fan_vertex_capacity = vertex_count;
    }

    /// Write `data` into `slot`, recreating the buffer when it is missing or
    /// too small. Capacity never shrinks. Returns true when the buffer object
    /// was (re)created, so callers know to rebuild bind groups that hold it.
    pub(crate) fn update_buffer(
        &self,
        slot: &mut Option<wgpu::Buffer>,
        usage: wgpu::BufferUsages,
        label: &str,
        data: &[u8],
    ) -> bool {
        if data.is_empty() {
            return false;
        }

        let needs_new = match slot {
            Some(buffer) => buffer.size() < data.len() as u64,
            None => true,
        };

        if needs_new {
            *slot = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: data.len() as u64,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }

        if let Some(buffer) = slot {
            self.queue.write_buffer(buffer, 0, data);
        }

        needs_new
    }

    pub(crate) fn create_paint_bind_group(
        &self,
        model: &wgpu::Buffer,
        blend: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Paint Bind Group"),
            layout: &self.layouts.paint,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: blend.as_entire_binding(),
                },
            ],
        })
    }

    pub(crate) fn create_solid_bind_group(&self, color: &wgpu::Buffer) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Solid Fill Bind Group"),
            layout: &self.layouts.solid,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: color.as_entire_binding(),
            }],
        })
    }

    pub(crate) fn create_gradient_bind_group(
        &self,
        settings: &wgpu::Buffer,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gradient Fill Bind Group"),
            layout: &self.layouts.gradient,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: settings.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    pub(crate) fn create_image_bind_group(&self, view: &wgpu::TextureView) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Picture Bind Group"),
            layout: &self.layouts.image,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}
