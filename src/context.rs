use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, OrbitController, Projection, Viewport},
    data_structures::texture,
    pipelines::{
        Pipelines,
        light::{LightResources, LightSetup},
        shadow::ShadowResources,
        sky::{SkyParams, SkyResources},
    },
    resources,
};

pub const FOV_DEGREES: f32 = 75.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;
pub const CAMERA_START: (f32, f32, f32) = (4.0, 2.0, 5.0);
pub const ORBIT_DAMPING: f32 = 0.05;

/// Everything the frame loop renders with: surface, device, camera, lights and pipelines.
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
    pub projection: Projection,
    pub camera: CameraResources,
    pub material_layout: wgpu::BindGroupLayout,
    pub lights: LightResources,
    pub shadows: ShadowResources,
    pub sky: SkyResources,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let layout = SurfaceLayout::from_physical(
            size.width.max(1),
            size.height.max(1),
            window.scale_factor(),
        )
        .context("window reported an empty size")?;
        let viewport = layout.viewport;

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter is compatible with the window surface")?;
        log::info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to request a device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders write linear colour and rely on an sRGB surface for encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no supported formats")?;
        let (width, height) = layout.surface;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut projection = Projection::new(
            viewport.width,
            viewport.height,
            cgmath::Deg(FOV_DEGREES),
            Z_NEAR,
            Z_FAR,
        );
        projection.set_aspect(layout.aspect);
        let mut controller = OrbitController::new(ORBIT_DAMPING);
        controller.set_viewport_height(size.height as f32);
        let camera = CameraResources::new(
            &device,
            Camera::new(CAMERA_START, (0.0, 0.0, 0.0)),
            controller,
            &projection,
        );

        let depth_texture =
            texture::Texture::create_depth_texture(&device, [width, height], "depth_texture");

        let material_layout = resources::texture::material_layout(&device);
        let shadows = ShadowResources::new(&device);
        let lights = LightResources::new(
            &device,
            LightSetup::default(),
            &shadows.matrices_buffer,
            &shadows.atlas,
        );
        let sky = SkyResources::new(
            &device,
            &config,
            &camera.bind_group_layout,
            SkyParams::default(),
        );
        let pipelines = Pipelines::new(
            &device,
            &config,
            &material_layout,
            &lights.bind_group_layout,
            &camera.bind_group_layout,
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            viewport,
            projection,
            camera,
            material_layout,
            lights,
            shadows,
            sky,
            pipelines,
            clear_colour: wgpu::Color::BLACK,
        })
    }
}

/// Size of the surface for a physical window size.
///
/// The web canvas follows the clamped pixel ratio; native surfaces must match the window.
pub fn surface_extent(physical_width: u32, physical_height: u32, viewport: &Viewport) -> (u32, u32) {
    if cfg!(target_arch = "wasm32") {
        viewport.drawing_buffer_size()
    } else {
        (physical_width.max(1), physical_height.max(1))
    }
}

/// Viewport, projection aspect and surface size for one physical window size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceLayout {
    pub viewport: Viewport,
    pub aspect: f32,
    pub surface: (u32, u32),
}

impl SurfaceLayout {
    /// `None` while the window is minimised to a zero size.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let viewport = Viewport::from_physical(width, height, scale_factor);
        Some(Self {
            viewport,
            // taken from the integers: the logical floats round differently at fractional scales
            aspect: width as f32 / height as f32,
            surface: surface_extent(width, height, &viewport),
        })
    }
}

/// The part of the [`Context`] a scene needs while it loads, handed out before the first frame.
#[derive(Clone, Debug)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub material_layout: wgpu::BindGroupLayout,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        // wgpu handles are reference counted, so these clones are cheap
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            material_layout: ctx.material_layout.clone(),
        }
    }
}
