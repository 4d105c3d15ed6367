//! Shadow maps for the directional light and the point lights.
//!
//! All shadow maps share one layered depth texture. Layer 0 belongs to the
//! directional light, each shadow-casting point light owns six consecutive
//! layers (one per cube face, ordered +X, -X, +Y, -Y, +Z, -Z).

use cgmath::{Deg, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, ortho, perspective};
use wgpu::util::DeviceExt;

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    data_structures::{
        instance::InstanceRaw,
        model::{DrawModel, ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{
        basic::{DepthConfig, mk_render_pipeline},
        light::{DirectionalLight, LightSetup},
    },
    render::Instanced,
};

pub const SHADOW_MAP_SIZE: u32 = 256;
pub const MAX_SHADOWED_POINT_LIGHTS: usize = 3;
pub const SUN_LAYER: u32 = 0;
pub const POINT_LAYER_BASE: u32 = 1;
pub const SHADOW_LAYERS: usize = 1 + 6 * MAX_SHADOWED_POINT_LIGHTS;

/// Half extent of the directional light's orthographic frustum.
pub const SUN_FRUSTUM_HALF_EXTENT: f32 = 8.0;
pub const SUN_NEAR: f32 = 1.0;
pub const SUN_FAR: f32 = 20.0;
pub const POINT_NEAR: f32 = 0.5;
pub const POINT_FAR: f32 = 10.0;

const CUBE_FACES: [(Vector3<f32>, Vector3<f32>); 6] = [
    (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0)),
    (Vector3::new(-1.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0)),
    (Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
    (Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 0.0, -1.0)),
    (Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, -1.0, 0.0)),
    (Vector3::new(0.0, 0.0, -1.0), Vector3::new(0.0, -1.0, 0.0)),
];

pub fn directional_view_proj(light: &DirectionalLight) -> Matrix4<f32> {
    let direction = (light.target - light.position).normalize();
    let up = if direction.y.abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let view = Matrix4::look_at_rh(light.position, light.target, up);
    let e = SUN_FRUSTUM_HALF_EXTENT;
    OPENGL_TO_WGPU_MATRIX * ortho(-e, e, -e, e, SUN_NEAR, SUN_FAR) * view
}

pub fn cube_face_view_projs(position: Point3<f32>) -> [Matrix4<f32>; 6] {
    let projection = OPENGL_TO_WGPU_MATRIX * perspective(Deg(90.0), 1.0, POINT_NEAR, POINT_FAR);
    CUBE_FACES.map(|(direction, up)| {
        projection * Matrix4::look_at_rh(position, position + direction, up)
    })
}

/// Index of the cube face whose frustum contains `direction` (light to surface).
pub fn cube_face(direction: Vector3<f32>) -> usize {
    let a = direction.map(f32::abs);
    if a.x >= a.y && a.x >= a.z {
        if direction.x > 0.0 { 0 } else { 1 }
    } else if a.y >= a.z {
        if direction.y > 0.0 { 2 } else { 3 }
    } else if direction.z > 0.0 {
        4
    } else {
        5
    }
}

/// Mirrors `ShadowMatrices` in `standard.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub view_proj: [[[f32; 4]; 4]; SHADOW_LAYERS],
}

impl ShadowUniform {
    /// Matrices for every layer in use plus the list of those layers.
    pub fn from_setup(setup: &LightSetup) -> (Self, Vec<u32>) {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        let mut view_proj = [identity; SHADOW_LAYERS];
        let mut active = Vec::new();
        if setup.sun.casts_shadow {
            view_proj[SUN_LAYER as usize] = directional_view_proj(&setup.sun).into();
            active.push(SUN_LAYER);
        }
        for (light, layer) in setup.points.iter().zip(setup.point_shadow_layers()) {
            let Some(base) = layer else {
                continue;
            };
            for (face, matrix) in cube_face_view_projs(light.position).into_iter().enumerate() {
                let layer = base + face as u32;
                view_proj[layer as usize] = matrix.into();
                active.push(layer);
            }
        }
        (Self { view_proj }, active)
    }
}

pub struct ShadowResources {
    pub atlas: Texture,
    pub uniform: ShadowUniform,
    pub matrices_buffer: wgpu::Buffer,
    pub active_layers: Vec<u32>,
    layer_views: Vec<wgpu::TextureView>,
    layer_buffers: Vec<wgpu::Buffer>,
    layer_bind_groups: Vec<wgpu::BindGroup>,
    pipeline: wgpu::RenderPipeline,
}

impl ShadowResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let atlas = Texture::create_shadow_atlas(device, SHADOW_MAP_SIZE, SHADOW_LAYERS as u32);
        let (uniform, active_layers) = ShadowUniform::from_setup(&LightSetup::default());
        let matrices_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Matrices Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("shadow_layer_bind_group_layout"),
        });

        let layer_views = (0..SHADOW_LAYERS as u32)
            .map(|layer| atlas.layer_view(layer))
            .collect();
        let layer_buffers: Vec<wgpu::Buffer> = uniform
            .view_proj
            .iter()
            .enumerate()
            .map(|(layer, matrix)| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Shadow Layer {layer} Buffer")),
                    contents: bytemuck::cast_slice(&[*matrix]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                })
            })
            .collect();
        let layer_bind_groups = layer_buffers
            .iter()
            .map(|buffer| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &layer_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some("shadow_layer_bind_group"),
                })
            })
            .collect();

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&layer_layout],
            push_constant_ranges: &[],
        });
        let pipeline = mk_render_pipeline(
            device,
            &layout,
            "Shadow Pipeline",
            None,
            Some(DepthConfig {
                format: Texture::DEPTH_FORMAT,
                write: true,
                compare: wgpu::CompareFunction::LessEqual,
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            &[ModelVertex::desc(), InstanceRaw::desc()],
            None,
            wgpu::ShaderModuleDescriptor {
                label: Some("Shadow Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
            },
        );

        Self {
            atlas,
            uniform,
            matrices_buffer,
            active_layers,
            layer_views,
            layer_buffers,
            layer_bind_groups,
            pipeline,
        }
    }

    /// Recompute the light matrices after the lights moved.
    pub fn write(&mut self, queue: &wgpu::Queue, setup: &LightSetup) {
        let (uniform, active_layers) = ShadowUniform::from_setup(setup);
        self.uniform = uniform;
        self.active_layers = active_layers;
        queue.write_buffer(&self.matrices_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        for &layer in &self.active_layers {
            queue.write_buffer(
                &self.layer_buffers[layer as usize],
                0,
                bytemuck::cast_slice(&[self.uniform.view_proj[layer as usize]]),
            );
        }
    }

    /// One depth pass per active layer, drawing every shadow caster.
    pub fn render<'a: 'b, 'b>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        casters: impl Iterator<Item = &'b Instanced<'a>> + Clone,
    ) {
        for &layer in &self.active_layers {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.layer_views[layer as usize],
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.layer_bind_groups[layer as usize], &[]);
            for caster in casters.clone() {
                pass.set_vertex_buffer(1, caster.instance.slice(..));
                pass.draw_mesh_depth(caster.mesh, 0..caster.amount as u32);
            }
        }
    }
}
