//! Scene lights and the uniform/bind group the standard shader reads them from.

use cgmath::{InnerSpace, Point3};
use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    color::Rgb,
    data_structures::texture::Texture,
    pipelines::shadow::{MAX_SHADOWED_POINT_LIGHTS, POINT_LAYER_BASE, SUN_LAYER},
};

pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

/// Parallel light shining from `position` towards `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub casts_shadow: bool,
}

impl DirectionalLight {
    /// Unit vector from the lit surface towards the light.
    pub fn direction(&self) -> cgmath::Vector3<f32> {
        (self.position - self.target).normalize()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub casts_shadow: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub density: f32,
}

impl Fog {
    /// Share of the fog colour at view depth `depth`.
    pub fn factor(&self, depth: f32) -> f32 {
        (1.0 - (-self.density * self.density * depth * depth).exp()).clamp(0.0, 1.0)
    }
}

/// Every light in the scene plus the fog, as the frame loop mutates them.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSetup {
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub points: Vec<PointLight>,
    pub fog: Fog,
}

impl Default for LightSetup {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Rgb::WHITE,
                intensity: 0.0,
            },
            sun: DirectionalLight {
                color: Rgb::WHITE,
                intensity: 0.0,
                position: Point3::new(0.0, 1.0, 0.0),
                target: Point3::new(0.0, 0.0, 0.0),
                casts_shadow: false,
            },
            points: Vec::new(),
            fog: Fog {
                color: Rgb::BLACK,
                density: 0.0,
            },
        }
    }
}

impl LightSetup {
    /// Adds a point light and returns its slot, or `None` when the table is full.
    pub fn add_point(&mut self, light: PointLight) -> Option<usize> {
        if self.points.len() >= MAX_POINT_LIGHTS {
            warn!(
                "point light table full ({MAX_POINT_LIGHTS}), light at {:?} ignored",
                light.position
            );
            return None;
        }
        self.points.push(light);
        Some(self.points.len() - 1)
    }

    /// First atlas layer of every point light's cube shadow, in light order.
    pub fn point_shadow_layers(&self) -> Vec<Option<u32>> {
        let mut next = 0;
        self.points
            .iter()
            .map(|light| {
                if !light.casts_shadow {
                    return None;
                }
                if next >= MAX_SHADOWED_POINT_LIGHTS {
                    warn!("no shadow layers left for point light at {:?}", light.position);
                    return None;
                }
                let layer = POINT_LAYER_BASE + 6 * next as u32;
                next += 1;
                Some(layer)
            })
            .collect()
    }

    pub fn to_uniform(&self) -> LightUniform {
        let mut points = [PointLightRaw::default(); MAX_POINT_LIGHTS];
        for ((raw, light), layer) in points
            .iter_mut()
            .zip(&self.points)
            .zip(self.point_shadow_layers())
        {
            *raw = PointLightRaw {
                position: light.position.into(),
                intensity: light.intensity,
                color: light.color.into(),
                shadow_layer: layer.map_or(-1, |l| l as i32),
            };
        }
        let ambient = self.ambient.color;
        let fog = self.fog.color;
        LightUniform {
            ambient: [ambient.r, ambient.g, ambient.b, self.ambient.intensity],
            sun_direction: self.sun.direction().into(),
            sun_intensity: self.sun.intensity,
            sun_color: self.sun.color.into(),
            sun_shadow_layer: if self.sun.casts_shadow {
                SUN_LAYER as i32
            } else {
                -1
            },
            fog: [fog.r, fog.g, fog.b, self.fog.density],
            points,
            point_count: self.points.len().min(MAX_POINT_LIGHTS) as u32,
            _padding: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub shadow_layer: i32,
}

/// Mirrors `Lights` in `standard.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub sun_direction: [f32; 3],
    pub sun_intensity: f32,
    pub sun_color: [f32; 3],
    pub sun_shadow_layer: i32,
    pub fog: [f32; 4],
    pub points: [PointLightRaw; MAX_POINT_LIGHTS],
    pub point_count: u32,
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: [u32; 3],
}

pub struct LightResources {
    pub setup: LightSetup,
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(
        device: &wgpu::Device,
        setup: LightSetup,
        shadow_matrices: &wgpu::Buffer,
        shadow_atlas: &Texture,
    ) -> Self {
        let uniform = setup.to_uniform();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let comparison_sampler;
        let sampler = match &shadow_atlas.sampler {
            Some(sampler) => sampler,
            None => {
                comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some("shadow sampler"),
                    compare: Some(wgpu::CompareFunction::LessEqual),
                    mag_filter: wgpu::FilterMode::Linear,
                    min_filter: wgpu::FilterMode::Linear,
                    ..Default::default()
                });
                &comparison_sampler
            }
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: shadow_matrices.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&shadow_atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("light_bind_group"),
        });

        Self {
            setup,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue) {
        self.uniform = self.setup.to_uniform();
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let uniform = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform(0),
            uniform(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2Array,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("light_bind_group_layout"),
    })
}
