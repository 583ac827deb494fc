use crate::mesh::{self, LineVertex, Vertex};
use crate::shaders;
use crate::uniforms::{self, InstanceData, SceneUniforms};
use cubefield_render::{RenderView, Viewport};
use cubefield_scene::{HelperParams, MaterialParams, Scene, SceneConfig};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;

/// Which helper overlays to draw this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlays {
    pub grid: bool,
    pub axes: bool,
}

impl Overlays {
    pub fn from_params(params: &HelperParams) -> Self {
        Self {
            grid: params.show_grid,
            axes: params.show_axes,
        }
    }
}

/// Sample count for the main pass: 4x MSAA when requested and supported.
pub fn pick_sample_count(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    antialias: bool,
) -> u32 {
    if !antialias {
        return 1;
    }
    let flags = adapter.get_texture_format_features(format).flags;
    if flags.sample_count_supported(MSAA_SAMPLES) {
        MSAA_SAMPLES
    } else {
        tracing::warn!("{MSAA_SAMPLES}x MSAA unsupported for {format:?}, rendering aliased");
        1
    }
}

struct Attachments {
    depth: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u16]) -> Self {
        Self {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_vertex_buffer")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_index_buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: indices.len() as u32,
        }
    }
}

struct LineBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl LineBuffer {
    fn new(device: &wgpu::Device, label: &str, vertices: &[LineVertex]) -> Self {
        Self {
            buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            vertex_count: vertices.len() as u32,
        }
    }
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    surface_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    main_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,
    cube: MeshBuffers,
    ground: Option<MeshBuffers>,
    ground_instance: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    shadow_instance_buffer: wgpu::Buffer,
    max_instances: u32,
    grid_lines: LineBuffer,
    axes_lines: LineBuffer,
    attachments: Attachments,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
    premultiplied_alpha: bool,
    material: MaterialParams,
    shadows: bool,
}

impl WgpuRenderer {
    /// Create GPU resources for `scene`. The cube count is fixed from here on.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        alpha_mode: wgpu::CompositeAlphaMode,
        sample_count: u32,
        viewport: &Viewport,
        config: &SceneConfig,
        scene: &Scene,
    ) -> Self {
        let view = RenderView::default();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&SceneUniforms::new(
                scene,
                &view,
                &config.material,
                config.renderer.shadows,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Shadow map
        let shadow_size = scene
            .directional_light()
            .map(|l| l.shadow_map_size)
            .unwrap_or(1)
            .max(1);
        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: shadow_size,
                height: shadow_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&Default::default());
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let main_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("main_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let main_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("main_bind_group"),
            layout: &main_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout: &shadow_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let main_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("main_pipeline_layout"),
            bind_group_layouts: &[&main_layout],
            push_constant_ranges: &[],
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&shadow_layout],
                push_constant_ranges: &[],
            });

        let mesh_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
            ],
        };
        let multisample = wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        };

        // Surface pipeline (cubes + ground)
        let surface_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("surface_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SURFACE_SHADER.into()),
        });
        let surface_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("surface_pipeline"),
            layout: Some(&main_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &surface_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    mesh_layout.clone(),
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &surface_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample,
            multiview: None,
            cache: None,
        });

        // Shadow pipeline (depth only, single sample)
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[
                    mesh_layout,
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Helper line pipeline (alpha blended, no depth writes)
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&main_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample,
            multiview: None,
            cache: None,
        });

        // Meshes
        let (cube_verts, cube_indices) = mesh::cube_mesh();
        let cube = MeshBuffers::new(device, "cube", &cube_verts, &cube_indices);
        let ground = scene.ground().map(|g| {
            let (verts, indices) = mesh::plane_mesh(g.size);
            MeshBuffers::new(device, "ground", &verts, &indices)
        });
        let ground_data = scene
            .ground()
            .map(InstanceData::from_ground)
            .unwrap_or_else(bytemuck::Zeroable::zeroed);
        let ground_instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ground_instance_buffer"),
            contents: bytemuck::bytes_of(&ground_data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Instance buffers (sized once; the cube count never changes)
        let max_instances = scene.cube_count().max(1) as u32;
        let instance_size = (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: instance_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shadow_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow_instance_buffer"),
            size: instance_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let helpers = &config.helpers;
        let grid_lines = LineBuffer::new(
            device,
            "grid_helper_buffer",
            &mesh::grid_lines(
                helpers.grid_size,
                helpers.grid_divisions,
                helpers.grid_color,
                helpers.grid_opacity,
                helpers.grid_height,
            ),
        );
        let axes_lines = LineBuffer::new(
            device,
            "axes_helper_buffer",
            &mesh::axes_lines(helpers.axes_size),
        );

        let (width, height) = viewport.buffer_size();
        let attachments =
            Self::create_attachments(device, surface_format, sample_count, width, height);

        let premultiplied_alpha = alpha_mode == wgpu::CompositeAlphaMode::PreMultiplied;

        tracing::debug!(
            cubes = max_instances,
            shadow_size,
            sample_count,
            ?alpha_mode,
            "wgpu renderer created"
        );

        Self {
            surface_pipeline,
            shadow_pipeline,
            line_pipeline,
            uniform_buffer,
            main_bind_group,
            shadow_bind_group,
            shadow_view,
            cube,
            ground,
            ground_instance,
            instance_buffer,
            shadow_instance_buffer,
            max_instances,
            grid_lines,
            axes_lines,
            attachments,
            surface_format,
            sample_count,
            premultiplied_alpha,
            material: config.material.clone(),
            shadows: config.renderer.shadows,
        }
    }

    /// Recreate size-dependent attachments for a new buffer size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.attachments =
            Self::create_attachments(device, self.surface_format, self.sample_count, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Render one frame: shadow pass, then ground, cubes and overlays.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        scene: &Scene,
        view: &RenderView,
        viewport: &Viewport,
        overlays: Overlays,
    ) {
        let scene_uniforms = SceneUniforms::new(scene, view, &self.material, self.shadows);
        let shadows_on = scene_uniforms.shadow_params[0] > 0.5;
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&scene_uniforms));

        let mut instances = uniforms::cube_instances(scene);
        instances.truncate(self.max_instances as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut casters = uniforms::shadow_caster_instances(scene);
        casters.truncate(self.max_instances as usize);
        if shadows_on && !casters.is_empty() {
            queue.write_buffer(&self.shadow_instance_buffer, 0, bytemuck::cast_slice(&casters));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        if shadows_on {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            if !casters.is_empty() {
                pass.set_pipeline(&self.shadow_pipeline);
                pass.set_bind_group(0, &self.shadow_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube.vertices.slice(..));
                pass.set_vertex_buffer(1, self.shadow_instance_buffer.slice(..));
                pass.set_index_buffer(self.cube.indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube.index_count, 0, 0..casters.len() as u32);
            }
        }

        {
            let [r, g, b, a] = viewport.clear_linear_rgba();
            let (r, g, b) = if self.premultiplied_alpha {
                (r * a, g * a, b * a)
            } else {
                (r, g, b)
            };
            let (color_view, resolve_target) = match &self.attachments.msaa {
                Some(msaa) => (msaa, Some(target)),
                None => (target, None),
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.attachments.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.surface_pipeline);
            pass.set_bind_group(0, &self.main_bind_group, &[]);

            // Draw ground plane
            if let Some(ground) = &self.ground {
                pass.set_vertex_buffer(0, ground.vertices.slice(..));
                pass.set_vertex_buffer(1, self.ground_instance.slice(..));
                pass.set_index_buffer(ground.indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..ground.index_count, 0, 0..1);
            }

            // Draw cubes
            if !instances.is_empty() {
                pass.set_vertex_buffer(0, self.cube.vertices.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube.indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube.index_count, 0, 0..instances.len() as u32);
            }

            // Draw helpers
            if overlays.grid || overlays.axes {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.main_bind_group, &[]);
                if overlays.grid {
                    pass.set_vertex_buffer(0, self.grid_lines.buffer.slice(..));
                    pass.draw(0..self.grid_lines.vertex_count, 0..1);
                }
                if overlays.axes {
                    pass.set_vertex_buffer(0, self.axes_lines.buffer.slice(..));
                    pass.draw(0..self.axes_lines.vertex_count, 0..1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_attachments(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Attachments {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let depth = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("depth_texture"),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default());
        let msaa = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("msaa_color_texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: surface_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        });
        Attachments { depth, msaa }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlays_follow_helper_params() {
        let mut params = HelperParams::default();
        assert_eq!(Overlays::from_params(&params), Overlays::default());
        params.show_axes = true;
        assert_eq!(
            Overlays::from_params(&params),
            Overlays {
                grid: false,
                axes: true
            }
        );
    }
}
