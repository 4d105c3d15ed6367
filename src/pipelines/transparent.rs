use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
    },
    pipelines::basic::{DepthConfig, mk_render_pipeline, mk_standard_layout},
};

/**
 * Same shading as the opaque pipeline, blended over what is already drawn.
 *
 * Used for materials whose alpha map cuts them out (the floor edge, the door).
 * Draws are expected back to front.
 */
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    material_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = mk_standard_layout(
        device,
        material_bind_group_layout,
        light_bind_group_layout,
        camera_bind_group_layout,
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Standard Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("standard.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        "Transparent Pipeline",
        Some((config.format, Some(wgpu::BlendState::ALPHA_BLENDING))),
        Some(DepthConfig::standard()),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        Some(wgpu::Face::Back),
        shader,
    )
}
