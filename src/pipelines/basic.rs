use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{self, Vertex},
        texture::Texture,
    },
};

/// Depth state of a pipeline.
#[derive(Clone, Debug)]
pub struct DepthConfig {
    pub format: wgpu::TextureFormat,
    pub write: bool,
    pub compare: wgpu::CompareFunction,
    pub bias: wgpu::DepthBiasState,
}

impl DepthConfig {
    pub fn standard() -> Self {
        Self {
            format: Texture::DEPTH_FORMAT,
            write: true,
            compare: wgpu::CompareFunction::Less,
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

pub fn mk_basic_pipeline(
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
        "Opaque Pipeline",
        Some((
            config.format,
            Some(wgpu::BlendState {
                alpha: wgpu::BlendComponent::REPLACE,
                color: wgpu::BlendComponent::REPLACE,
            }),
        )),
        Some(DepthConfig::standard()),
        &[model::ModelVertex::desc(), InstanceRaw::desc()],
        Some(wgpu::Face::Back),
        shader,
    )
}

/// Material, camera and light groups in the order `standard.wgsl` declares them.
pub fn mk_standard_layout(
    device: &wgpu::Device,
    material_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Standard Pipeline Layout"),
        bind_group_layouts: &[
            material_bind_group_layout,
            camera_bind_group_layout,
            light_bind_group_layout,
        ],
        push_constant_ranges: &[],
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    color: Option<(wgpu::TextureFormat, Option<wgpu::BlendState>)>,
    depth: Option<DepthConfig>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    cull_mode: Option<wgpu::Face>,
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);
    let targets = color
        .map(|(format, blend)| {
            vec![Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })]
        })
        .unwrap_or_default();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        // depth-only pipelines have no fragment stage
        fragment: if targets.is_empty() {
            None
        } else {
            Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: Default::default(),
            })
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth.map(|depth| wgpu::DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write,
            depth_compare: depth.compare,
            stencil: wgpu::StencilState::default(),
            bias: depth.bias,
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
