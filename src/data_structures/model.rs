//! Meshes, materials and the vertex layout shared by every lit pipeline.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// GPU-resident triangle list.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

/// Per-material shading parameters, mirrored by `MaterialUniform` in `standard.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// xy scales the uv, zw offsets it. The alpha map ignores this transform.
    pub uv_transform: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    _padding: [f32; 2],
}

impl MaterialUniform {
    pub fn new(color: [f32; 3], repeat: [f32; 2]) -> Self {
        Self {
            color: [color[0], color[1], color[2], 1.0],
            uv_transform: uv_transform(repeat),
            roughness: 1.0,
            metalness: 0.0,
            _padding: [0.0; 2],
        }
    }
}

/// Texture repeat expressed for a top-left image origin.
///
/// Repeats are authored against a bottom-left origin, so the scaled window is
/// anchored at the bottom edge: `v' = v * ry + (1 - ry)`.
pub fn uv_transform(repeat: [f32; 2]) -> [f32; 4] {
    [repeat[0], repeat[1], 0.0, 1.0 - repeat[1]]
}

/// The textures a standard material samples. Missing slots fall back to neutral 1x1 textures.
pub struct MaterialTextures {
    pub albedo: Texture,
    pub arm: Texture,
    pub normal: Texture,
    pub alpha: Texture,
}

#[derive(Debug)]
pub struct Material {
    #[allow(unused)]
    pub name: String,
    pub albedo: Texture,
    pub arm: Texture,
    pub normal: Texture,
    pub alpha: Texture,
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub transparent: bool,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        textures: MaterialTextures,
        uniform: MaterialUniform,
        transparent: bool,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let MaterialTextures {
            albedo,
            arm,
            normal,
            alpha,
        } = textures;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Material Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_sampler = albedo
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let alpha_sampler = alpha
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&material_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&arm.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&alpha.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&alpha_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            albedo,
            arm,
            normal,
            alpha,
            uniform,
            buffer,
            bind_group,
            transparent,
        }
    }
}

pub trait DrawModel {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );

    /// Depth-only draw used by the shadow passes; the caller binds the light's view.
    fn draw_mesh_depth(&mut self, mesh: &Mesh, instances: Range<u32>);
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }

    fn draw_mesh_depth(&mut self, mesh: &Mesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}
