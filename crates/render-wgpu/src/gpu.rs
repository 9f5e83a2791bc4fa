use crate::error::BackendError;
use crate::shader::{LINE_SHADER, ShaderProgram};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;
use ygg_common::MeshId;
use ygg_render::{CameraUniforms, LineSegment, Light, Mesh, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame uniforms. Vectors are padded to vec4 for WGSL alignment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
}

impl FrameUniforms {
    pub(crate) fn new(camera: &CameraUniforms, light: &Light) -> Self {
        Self {
            view: camera.view.to_cols_array_2d(),
            projection: camera.projection.to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            light_pos: light.position.extend(1.0).to_array(),
            light_color: light.color.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuVertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            color: v.color.to_array(),
        }
    }
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Check index bounds and convert vertices for upload.
pub(crate) fn pack_mesh(mesh: &Mesh) -> Result<Vec<GpuVertex>, BackendError> {
    if mesh.vertices.is_empty() || mesh.indices.is_empty() {
        return Err(BackendError::InvalidMesh("mesh has no triangles".into()));
    }
    if !mesh.indices_in_bounds() {
        return Err(BackendError::InvalidMesh(format!(
            "{} indices do not form in-bounds triangles over {} vertices",
            mesh.indices.len(),
            mesh.vertices.len()
        )));
    }
    Ok(mesh.vertices.iter().map(GpuVertex::from).collect())
}

fn pack_line(line: &LineSegment) -> [GpuVertex; 2] {
    line.vertices().map(|v| GpuVertex::from(&v))
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuLine {
    vertex_buffer: wgpu::Buffer,
}

/// wgpu renderer for uploaded meshes and debug lines.
///
/// Owns the GPU side of every mesh it uploads. Vertices arrive in world space,
/// so there is no per-mesh model matrix; one uniform block per frame carries
/// the camera matrices, eye position and light.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshId, GpuMesh>,
    lines: BTreeMap<MeshId, GpuLine>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        mesh_shader: &ShaderProgram,
    ) -> Result<Self, BackendError> {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
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

        // Sphere triangles are clockwise seen from outside, so no culling.
        let mesh_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            mesh_shader,
            ("vs_main", "fs_main"),
            wgpu::PrimitiveTopology::TriangleList,
            surface_format,
        );

        let line_shader = ShaderProgram::from_wgsl(device, "line_shader", LINE_SHADER)?;
        let line_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &line_shader,
            ("vs_line", "fs_line"),
            wgpu::PrimitiveTopology::LineList,
            surface_format,
        );

        Ok(Self {
            mesh_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: BTreeMap::new(),
            lines: BTreeMap::new(),
            depth_texture: create_depth_texture(device, width, height),
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Upload a generated mesh. The returned id stays valid until `release`.
    pub fn upload(&mut self, device: &wgpu::Device, mesh: &Mesh) -> Result<MeshId, BackendError> {
        let vertices = pack_mesh(mesh)?;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = MeshId::new();
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
            },
        );
        tracing::debug!(
            id = %id.short(),
            vertices = vertices.len(),
            indices = mesh.indices.len(),
            "uploaded mesh"
        );
        Ok(id)
    }

    /// Create an updatable line.
    pub fn create_line(&mut self, device: &wgpu::Device, line: &LineSegment) -> MeshId {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line_vertex_buffer"),
            contents: bytemuck::cast_slice(&pack_line(line)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let id = MeshId::new();
        self.lines.insert(id, GpuLine { vertex_buffer });
        tracing::debug!(id = %id.short(), "created line");
        id
    }

    pub fn update_line(
        &self,
        queue: &wgpu::Queue,
        id: MeshId,
        line: &LineSegment,
    ) -> Result<(), BackendError> {
        let gpu = self.lines.get(&id).ok_or(BackendError::UnknownMesh(id))?;
        queue.write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&pack_line(line)));
        Ok(())
    }

    /// Free the GPU buffers of a mesh or line.
    pub fn release(&mut self, id: MeshId) -> Result<(), BackendError> {
        if let Some(mesh) = self.meshes.remove(&id) {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        } else if let Some(line) = self.lines.remove(&id) {
            line.vertex_buffer.destroy();
        } else {
            return Err(BackendError::UnknownMesh(id));
        }
        tracing::debug!(id = %id.short(), "released mesh");
        Ok(())
    }

    /// Release everything uploaded so far.
    pub fn release_all(&mut self) {
        let (meshes, lines) = (self.meshes.len(), self.lines.len());
        for mesh in std::mem::take(&mut self.meshes).into_values() {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
        for line in std::mem::take(&mut self.lines).into_values() {
            line.vertex_buffer.destroy();
        }
        tracing::debug!(meshes, lines, "released all meshes");
    }

    /// Draw all meshes and lines into `target`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        camera: &CameraUniforms,
        light: &Light,
        clear_color: Vec3,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(camera, light)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear_color.x),
                            g: f64::from(clear_color.y),
                            b: f64::from(clear_color.z),
                            a: 1.0,
                        }),
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

            pass.set_pipeline(&self.mesh_pipeline);
            for mesh in self.meshes.values() {
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if !self.lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                for line in self.lines.values() {
                    pass.set_vertex_buffer(0, line.vertex_buffer.slice(..));
                    pass.draw(0..2, 0..1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &ShaderProgram,
    (vs_entry, fs_entry): (&str, &str),
    topology: wgpu::PrimitiveTopology,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(shader.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader.module(),
            entry_point: Some(vs_entry),
            compilation_options: Default::default(),
            buffers: &[GpuVertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader.module(),
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
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

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
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
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
