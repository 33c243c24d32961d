//! wgpu renderer.
//!
//! Three instanced pipelines over a shared per-layer uniform: flat squares
//! for particles, width-expanded quads for connection lines, and textured
//! quads sampling a pre-rendered radial-gradient sprite for stars. Layers
//! draw back to front in one render pass with alpha blending; each layer
//! carries its own orthographic projection (and, for the logo layer, the
//! tilt/implode model transform) in its uniform buffer.

mod shaders;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use winit::window::Window;

use crate::error::GpuError;
use crate::field::Frame;
use crate::starfield::StarInstance;

use shaders::{LINE_SHADER, POINT_SHADER, STAR_SHADER};

const STAR_SPRITE_SIZE: u32 = 64;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LayerUniforms {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
    line_width: f32,
    _padding: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointVertex {
    pos: [f32; 2],
    size: f32,
    alpha: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    a: [f32; 2],
    b: [f32; 2],
    alpha: f32,
    _pad: f32,
}

/// One layer to draw this frame, back to front.
pub enum Layer<'a> {
    /// A particle or trail field's frame geometry. `model` applies in
    /// field space before the orthographic projection; `opacity`
    /// multiplies every alpha in the layer.
    Field {
        frame: &'a Frame,
        model: Mat4,
        opacity: f32,
    },
    /// A starfield draw list.
    Stars {
        size: Vec2,
        instances: &'a [StarInstance],
        rgb: [f32; 3],
    },
}

/// A vertex buffer that grows to fit whatever the frame produced.
struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl DynamicBuffer {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let capacity = 1024;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            label,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: self.capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }
}

/// Per-layer GPU resources, reused across frames.
struct LayerSlot {
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    points: DynamicBuffer,
    lines: DynamicBuffer,
}

/// Draw counts for one layer, recorded while buffers are written and
/// consumed inside the render pass.
#[derive(Clone, Copy, Default)]
struct LayerCounts {
    points: u32,
    lines: u32,
    stars: u32,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    star_bind_group: wgpu::BindGroup,
    slots: Vec<LayerSlot>,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

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
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Star Texture Bind Group Layout"),
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

        let star_bind_group = create_star_sprite(&device, &queue, &texture_layout);

        let point_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flat Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let star_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Star Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let point_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        };

        let line_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        };

        let point_pipeline = create_pipeline(
            &device,
            "Point Pipeline",
            &point_layout,
            POINT_SHADER,
            point_vertex_layout.clone(),
            config.format,
        );
        let line_pipeline = create_pipeline(
            &device,
            "Line Pipeline",
            &point_layout,
            LINE_SHADER,
            line_vertex_layout,
            config.format,
        );
        let star_pipeline = create_pipeline(
            &device,
            "Star Pipeline",
            &star_layout,
            STAR_SHADER,
            point_vertex_layout,
            config.format,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            point_pipeline,
            line_pipeline,
            star_pipeline,
            uniform_layout,
            star_bind_group,
            slots: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn ensure_slots(&mut self, count: usize) {
        while self.slots.len() < count {
            let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Layer Uniform Buffer"),
                size: std::mem::size_of::<LayerUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Layer Uniform Bind Group"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            self.slots.push(LayerSlot {
                uniform_buffer,
                uniform_bind_group,
                points: DynamicBuffer::new(&self.device, "Point Instance Buffer"),
                lines: DynamicBuffer::new(&self.device, "Line Instance Buffer"),
            });
        }
    }

    /// Draw the given layers, back to front, over a clear of `clear_rgb`.
    /// An empty layer list still clears the window.
    pub fn render(
        &mut self,
        clear_rgb: [f64; 3],
        layers: &[Layer<'_>],
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_slots(layers.len());

        // Stage every layer's uniforms and instance data before the pass.
        let mut counts = vec![LayerCounts::default(); layers.len()];
        for (i, layer) in layers.iter().enumerate() {
            counts[i] = self.stage_layer(i, layer);
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
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear_rgb[0],
                            g: clear_rgb[1],
                            b: clear_rgb[2],
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, count) in self.slots.iter().zip(&counts) {
                render_pass.set_bind_group(0, &slot.uniform_bind_group, &[]);

                if count.lines > 0 {
                    render_pass.set_pipeline(&self.line_pipeline);
                    render_pass.set_vertex_buffer(0, slot.lines.buffer.slice(..));
                    render_pass.draw(0..6, 0..count.lines);
                }
                if count.points > 0 {
                    render_pass.set_pipeline(&self.point_pipeline);
                    render_pass.set_vertex_buffer(0, slot.points.buffer.slice(..));
                    render_pass.draw(0..6, 0..count.points);
                }
                if count.stars > 0 {
                    render_pass.set_pipeline(&self.star_pipeline);
                    render_pass.set_bind_group(1, &self.star_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, slot.points.buffer.slice(..));
                    render_pass.draw(0..6, 0..count.stars);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn stage_layer(&mut self, index: usize, layer: &Layer<'_>) -> LayerCounts {
        let slot = &mut self.slots[index];
        match layer {
            Layer::Field {
                frame,
                model,
                opacity,
            } => {
                let projection = ortho(frame.size);
                let uniforms = LayerUniforms {
                    transform: (projection * *model).to_cols_array_2d(),
                    color: [frame.rgb[0], frame.rgb[1], frame.rgb[2], *opacity],
                    line_width: frame.line_width,
                    _padding: [0.0; 3],
                };
                self.queue
                    .write_buffer(&slot.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

                let points: Vec<PointVertex> = frame
                    .points
                    .iter()
                    .map(|p| PointVertex {
                        pos: p.pos.to_array(),
                        size: p.size,
                        alpha: p.alpha,
                    })
                    .collect();

                let mut lines: Vec<LineVertex> = Vec::new();
                for bin in &frame.bins {
                    for seg in &bin.segments {
                        lines.push(LineVertex {
                            a: seg[0].to_array(),
                            b: seg[1].to_array(),
                            alpha: bin.alpha,
                            _pad: 0.0,
                        });
                    }
                }
                for strip in &frame.strips {
                    for pair in strip.points.windows(2) {
                        lines.push(LineVertex {
                            a: pair[0].to_array(),
                            b: pair[1].to_array(),
                            alpha: strip.alpha,
                            _pad: 0.0,
                        });
                    }
                }

                slot.points
                    .write(&self.device, &self.queue, bytemuck::cast_slice(&points));
                slot.lines
                    .write(&self.device, &self.queue, bytemuck::cast_slice(&lines));

                LayerCounts {
                    points: points.len() as u32,
                    lines: lines.len() as u32,
                    stars: 0,
                }
            }
            Layer::Stars {
                size,
                instances,
                rgb,
            } => {
                let uniforms = LayerUniforms {
                    transform: ortho(*size).to_cols_array_2d(),
                    color: [rgb[0], rgb[1], rgb[2], 1.0],
                    line_width: 0.0,
                    _padding: [0.0; 3],
                };
                self.queue
                    .write_buffer(&slot.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

                let sprites: Vec<PointVertex> = instances
                    .iter()
                    .map(|s| PointVertex {
                        pos: s.pos.to_array(),
                        size: s.size,
                        alpha: s.alpha,
                    })
                    .collect();
                slot.points
                    .write(&self.device, &self.queue, bytemuck::cast_slice(&sprites));

                LayerCounts {
                    points: 0,
                    lines: 0,
                    stars: sprites.len() as u32,
                }
            }
        }
    }
}

/// Field-space to clip-space projection: y-down field coordinates filling
/// the window.
fn ortho(size: Vec2) -> Mat4 {
    Mat4::orthographic_rh(0.0, size.x.max(1.0), size.y.max(1.0), 0.0, -1.0, 1.0)
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader_src: &str,
    vertex_layout: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Build and upload the radial-gradient star sprite.
fn create_star_sprite(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::BindGroup {
    let n = STAR_SPRITE_SIZE;
    let center = (n as f32 - 1.0) / 2.0;
    let sprite = image::RgbaImage::from_fn(n, n, |x, y| {
        let dx = (x as f32 - center) / center;
        let dy = (y as f32 - center) / center;
        let r = (dx * dx + dy * dy).sqrt();
        // Bright core, soft falloff to transparent at the rim.
        let glow = (1.0 - r).clamp(0.0, 1.0).powf(2.0);
        image::Rgba([255, 255, 255, (glow * 255.0) as u8])
    });

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Star Sprite"),
        size: wgpu::Extent3d {
            width: n,
            height: n,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        sprite.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * n),
            rows_per_image: Some(n),
        },
        wgpu::Extent3d {
            width: n,
            height: n,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Star Sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Star Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}
