//! Render pipelines and the GPU-side state they read.
//!
//! - `basic`: opaque standard-material pipeline and the shared pipeline builder
//! - `transparent`: the same shading, alpha blended
//! - `light`: scene lights, fog and their uniform
//! - `shadow`: the shadow atlas and depth-only passes
//! - `sky`: the atmospheric background

pub mod basic;
pub mod light;
pub mod shadow;
pub mod sky;
pub mod transparent;

pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                material_bind_group_layout,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
            transparent: transparent::mk_transparent_pipeline(
                device,
                config,
                material_bind_group_layout,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
        }
    }
}
