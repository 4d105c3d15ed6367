//! Atmospheric-scattering background.
//!
//! The per-sky terms of the Preetham model only depend on the parameters, so they
//! are evaluated here once and uploaded; `sky.wgsl` does the per-pixel part.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::Texture,
    pipelines::basic::{DepthConfig, mk_render_pipeline},
};

const TOTAL_RAYLEIGH: [f64; 3] = [
    5.804542996261093e-6,
    1.3562911419845635e-5,
    3.0265902468824876e-5,
];
const MIE_CONST: [f64; 3] = [
    1.8399918514433978e14,
    2.7798023919660528e14,
    4.0790479543861094e14,
];
/// Zenith angle beyond which the sun stops lighting the sky.
pub const CUTOFF_ANGLE: f64 = 1.6110731556870734;
const STEEPNESS: f64 = 1.5;
const EE: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyParams {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub sun_position: [f32; 3],
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 3.0,
            mie_coefficient: 0.1,
            mie_directional_g: 0.95,
            sun_position: [0.3, -0.038, -0.95],
        }
    }
}

/// Sun energy for a given cosine of the sun's zenith angle.
pub fn sun_intensity(zenith_angle_cos: f64) -> f64 {
    let zenith_angle_cos = zenith_angle_cos.clamp(-1.0, 1.0);
    EE * (1.0 - (-((CUTOFF_ANGLE - zenith_angle_cos.acos()) / STEEPNESS)).exp()).max(0.0)
}

pub fn total_mie(turbidity: f64) -> [f64; 3] {
    let c = (0.2 * turbidity) * 10e-18;
    MIE_CONST.map(|k| 0.434 * c * k)
}

/// Mirrors `Sky` in `sky.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform {
    pub sun_direction: [f32; 3],
    pub sun_e: f32,
    pub beta_r: [f32; 3],
    pub sunfade: f32,
    pub beta_m: [f32; 3],
    pub mie_directional_g: f32,
}

impl SkyUniform {
    pub fn from_params(params: &SkyParams) -> Self {
        let [x, y, z] = params.sun_position.map(f64::from);
        let length = (x * x + y * y + z * z).sqrt().max(f64::EPSILON);
        let direction = [x / length, y / length, z / length];

        let sun_e = sun_intensity(direction[1]);
        let sunfade = 1.0 - (1.0 - (y / 450000.0).exp()).clamp(0.0, 1.0);
        let rayleigh_coefficient = params.rayleigh as f64 - (1.0 - sunfade);
        let beta_r = TOTAL_RAYLEIGH.map(|k| (k * rayleigh_coefficient) as f32);
        let beta_m =
            total_mie(params.turbidity as f64).map(|k| (k * params.mie_coefficient as f64) as f32);

        Self {
            sun_direction: direction.map(|c| c as f32),
            sun_e: sun_e as f32,
            beta_r,
            sunfade: sunfade as f32,
            beta_m,
            mie_directional_g: params.mie_directional_g,
        }
    }
}

pub struct SkyResources {
    pub params: SkyParams,
    pub uniform: SkyUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub pipeline: wgpu::RenderPipeline,
}

impl SkyResources {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        params: SkyParams,
    ) -> Self {
        let uniform = SkyUniform::from_params(&params);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("sky_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("sky_bind_group"),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[camera_bind_group_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = mk_render_pipeline(
            device,
            &layout,
            "Sky Pipeline",
            Some((config.format, None)),
            // drawn first and never occludes anything
            Some(DepthConfig {
                format: Texture::DEPTH_FORMAT,
                write: false,
                compare: wgpu::CompareFunction::Always,
                bias: wgpu::DepthBiasState::default(),
            }),
            &[],
            None,
            wgpu::ShaderModuleDescriptor {
                label: Some("Sky Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
            },
        );

        Self {
            params,
            uniform,
            buffer,
            bind_group,
            pipeline,
        }
    }

    pub fn set_params(&mut self, queue: &wgpu::Queue, params: SkyParams) {
        self.params = params;
        self.uniform = SkyUniform::from_params(&params);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
