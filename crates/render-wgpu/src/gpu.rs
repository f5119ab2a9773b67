use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use ripple_common::SurfaceKind;
use ripple_kernel::{Edge, HeightField, RippleScene, Starfield};
use ripple_render::OrbitCamera;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    surface_model: [[f32; 4]; 4],
    spin_model: [[f32; 4]; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ColoredVertex {
    position: [f32; 3],
    color: [f32; 3],
}

/// What to draw this frame besides the starfield.
#[derive(Debug, Clone, Copy)]
pub struct SceneDraw {
    /// Model matrix of the ripple surface, if it is shown.
    pub surface: Option<Mat4>,
    /// Model matrix of the spinner wireframe, if it is shown.
    pub spinner: Option<Mat4>,
}

const STAR_COLOR: [f32; 3] = [0.9, 0.9, 1.0];
const SPINNER_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Unit cube centered on the origin, drawn once per cell in points mode.
fn cube_mesh() -> (Vec<[f32; 3]>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        [-p, -p, -p], [ p, -p, -p], [ p,  p, -p], [-p,  p, -p],
        [-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p],
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        4,5,6, 6,7,4, // +Z
        1,0,3, 3,2,1, // -Z
        5,1,2, 2,6,5, // +X
        0,4,7, 7,3,0, // -X
        7,6,2, 2,3,7, // +Y
        0,1,5, 5,4,0, // -Y
    ];
    (vertices, indices)
}

fn star_vertices(stars: &Starfield) -> Vec<ColoredVertex> {
    stars
        .positions()
        .iter()
        .map(|p| ColoredVertex {
            position: p.to_array(),
            color: STAR_COLOR,
        })
        .collect()
}

fn edge_vertices(edges: &[Edge]) -> Vec<ColoredVertex> {
    edges
        .iter()
        .flat_map(|edge| edge.iter())
        .map(|p: &Vec3| ColoredVertex {
            position: p.to_array(),
            color: SPINNER_COLOR,
        })
        .collect()
}

/// World-space edge of the per-cell cube: a third of the lattice spacing.
fn point_size(scene: &RippleScene) -> f32 {
    let params = scene.params();
    params.plane_size() / params.width().max(params.length()) as f32 / 3.0
}

const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const CELL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const CELL_COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];
const MESH_COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Layout of a tightly packed `[f32; 3]` stream.
fn float3_layout(
    attributes: &'static [wgpu::VertexAttribute],
    step_mode: wgpu::VertexStepMode,
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
        step_mode,
        attributes,
    }
}

const COLORED_VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<ColoredVertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ],
};

/// Unlit, depth-tested pipeline sharing the scene shader's `fs_color`.
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    entry_point: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_color"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            // The surface is seen from both sides while orbiting.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// GPU copies of the height field buffers. Recreated whenever the field is
/// rebuilt; rewritten in place when the updater reports a change.
struct FieldBuffers {
    kind: SurfaceKind,
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    cell_count: u32,
}

impl FieldBuffers {
    fn new(device: &wgpu::Device, scene: &RippleScene) -> Self {
        let field = scene.field();
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("field_positions"),
            contents: bytemuck::cast_slice(field.positions()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("field_colors"),
            contents: bytemuck::cast_slice(field.colors()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let mesh_indices = field.mesh_indices();
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("field_indices"),
            contents: bytemuck::cast_slice(&mesh_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            kind: scene.params().surface(),
            positions,
            colors,
            indices,
            index_count: mesh_indices.len() as u32,
            cell_count: field.len() as u32,
        }
    }
}

/// wgpu-based renderer for the ripple demos.
pub struct WgpuRenderer {
    points_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    stars_pipeline: wgpu::RenderPipeline,
    spin_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    field: FieldBuffers,
    star_buffer: wgpu::Buffer,
    star_count: u32,
    spin_buffer: wgpu::Buffer,
    spin_vertex_count: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &RippleScene,
        spinner_edges: &[Edge],
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                surface_model: Mat4::IDENTITY.to_cols_array_2d(),
                spin_model: Mat4::IDENTITY.to_cols_array_2d(),
                params: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = |label: &str,
                        entry_point: &str,
                        buffers: &[wgpu::VertexBufferLayout<'static>],
                        topology: wgpu::PrimitiveTopology| {
            create_pipeline(
                device,
                &pipeline_layout,
                &shader,
                surface_format,
                label,
                entry_point,
                buffers,
                topology,
            )
        };

        let points_pipeline = pipeline(
            "points_pipeline",
            "vs_points",
            &[
                float3_layout(&CORNER_ATTRS, wgpu::VertexStepMode::Vertex),
                float3_layout(&CELL_ATTRS, wgpu::VertexStepMode::Instance),
                float3_layout(&CELL_COLOR_ATTRS, wgpu::VertexStepMode::Instance),
            ],
            wgpu::PrimitiveTopology::TriangleList,
        );
        let mesh_pipeline = pipeline(
            "mesh_pipeline",
            "vs_surface",
            &[
                float3_layout(&CORNER_ATTRS, wgpu::VertexStepMode::Vertex),
                float3_layout(&MESH_COLOR_ATTRS, wgpu::VertexStepMode::Vertex),
            ],
            wgpu::PrimitiveTopology::TriangleList,
        );
        let stars_pipeline = pipeline(
            "stars_pipeline",
            "vs_stars",
            &[COLORED_VERTEX_LAYOUT],
            wgpu::PrimitiveTopology::PointList,
        );
        let spin_pipeline = pipeline(
            "spin_pipeline",
            "vs_spin",
            &[COLORED_VERTEX_LAYOUT],
            wgpu::PrimitiveTopology::LineList,
        );

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (star_buffer, star_count) = Self::create_star_buffer(device, scene.stars());

        let spin_verts = edge_vertices(spinner_edges);
        let spin_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spin_vertex_buffer"),
            contents: bytemuck::cast_slice(&spin_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            points_pipeline,
            mesh_pipeline,
            stars_pipeline,
            spin_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            field: FieldBuffers::new(device, scene),
            star_buffer,
            star_count,
            spin_buffer,
            spin_vertex_count: spin_verts.len() as u32,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Recreate the field buffers after the scene rebuilt its field.
    pub fn rebuild_surface(&mut self, device: &wgpu::Device, scene: &RippleScene) {
        self.field = FieldBuffers::new(device, scene);
        tracing::debug!(
            cells = self.field.cell_count,
            surface = %self.field.kind,
            "surface buffers rebuilt"
        );
    }

    /// Recreate the starfield buffer after the stars were regenerated.
    pub fn rebuild_stars(&mut self, device: &wgpu::Device, stars: &Starfield) {
        (self.star_buffer, self.star_count) = Self::create_star_buffer(device, stars);
    }

    /// Copy the field's current heights and colors to the GPU. Call only
    /// when the updater reported a change.
    pub fn upload_field(&self, queue: &wgpu::Queue, field: &HeightField) {
        debug_assert_eq!(field.len() as u32, self.field.cell_count);
        queue.write_buffer(&self.field.positions, 0, bytemuck::cast_slice(field.positions()));
        queue.write_buffer(&self.field.colors, 0, bytemuck::cast_slice(field.colors()));
    }

    /// Render one frame: starfield, then the surface and/or spinner. Cube
    /// size follows the scene's current parameters.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &RippleScene,
        draw: SceneDraw,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                surface_model: draw.surface.unwrap_or(Mat4::IDENTITY).to_cols_array_2d(),
                spin_model: draw.spinner.unwrap_or(Mat4::IDENTITY).to_cols_array_2d(),
                params: [point_size(scene), 0.0, 0.0, 0.0],
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if self.star_count > 0 {
                pass.set_pipeline(&self.stars_pipeline);
                pass.set_vertex_buffer(0, self.star_buffer.slice(..));
                pass.draw(0..self.star_count, 0..1);
            }

            if draw.surface.is_some() {
                match self.field.kind {
                    SurfaceKind::Points => {
                        pass.set_pipeline(&self.points_pipeline);
                        pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                        pass.set_vertex_buffer(1, self.field.positions.slice(..));
                        pass.set_vertex_buffer(2, self.field.colors.slice(..));
                        pass.set_index_buffer(
                            self.cube_index_buffer.slice(..),
                            wgpu::IndexFormat::Uint16,
                        );
                        pass.draw_indexed(0..self.cube_index_count, 0, 0..self.field.cell_count);
                    }
                    SurfaceKind::Mesh => {
                        pass.set_pipeline(&self.mesh_pipeline);
                        pass.set_vertex_buffer(0, self.field.positions.slice(..));
                        pass.set_vertex_buffer(1, self.field.colors.slice(..));
                        pass.set_index_buffer(
                            self.field.indices.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        pass.draw_indexed(0..self.field.index_count, 0, 0..1);
                    }
                }
            }

            if draw.spinner.is_some() && self.spin_vertex_count > 0 {
                pass.set_pipeline(&self.spin_pipeline);
                pass.set_vertex_buffer(0, self.spin_buffer.slice(..));
                pass.draw(0..self.spin_vertex_count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_star_buffer(device: &wgpu::Device, stars: &Starfield) -> (wgpu::Buffer, u32) {
        let verts = star_vertices(stars);
        // Zero-sized vertex buffers are invalid; keep one placeholder vertex
        // and draw none of it.
        let contents = if verts.is_empty() {
            vec![ColoredVertex::zeroed()]
        } else {
            verts
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("star_vertex_buffer"),
            contents: bytemuck::cast_slice(&contents),
            usage: wgpu::BufferUsages::VERTEX,
        });
        (buffer, stars.len() as u32)
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
