//! Flow control and application event loop.
//!
//! A "flow" is a scene that handles input, updates its state every frame and
//! hands the renderer what it wants drawn. The event loop owns the GPU
//! [`Context`], the frame [`Timer`] and every flow, and drives them from winit
//! redraw requests.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow`] is the trait for scenes that handle events and rendering
//! - [`Out`] lets a lifecycle hook reconfigure the context
//!
//! # Lifecycle Flow
//!
//! Every redraw runs the same sequence:
//! 1. Advance the timer (the first redraw starts it)
//! 2. Call `on_update` on all flows and apply their context changes
//! 3. Step the damped orbit camera
//! 4. Upload camera, light and shadow uniforms
//! 5. Collect the flows' renders, draw the shadow passes, then sky, opaque and transparent objects
//! 6. Present and request the next redraw

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext, SurfaceLayout},
    data_structures::{model::DrawModel, texture::Texture},
    render::{Batches, Render},
    timer::Timer,
};

/// Output of every lifecycle hook.
///
/// `Out::Configure` modifies the Context, for instance to move lights or change the clear colour.
///
/// `Empty` is the default output used when the context stays as it is.
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after the flow was constructed; configure lights, sky and clear colour here
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame with the total elapsed time
/// 4. `on_render()` is called each frame and specifies how to render `self`
pub trait GraphicsFlow {
    /// The only hook that gets the context mutably.
    fn on_init(&mut self, ctx: &mut Context) -> Out;

    /// Update state every frame. `elapsed` is the time since the first frame.
    fn on_update(&mut self, ctx: &Context, elapsed: instant::Duration) -> Out;

    fn on_window_events(&mut self, ctx: &Context, event: &WindowEvent) -> Out;

    /// Called each frame. The engine batches all flows' renders per pipeline.
    fn on_render<'a>(&'a self) -> Render<'a>;
}

impl Debug for dyn GraphicsFlow + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Asynchronous factory of a flow, run once the GPU context exists.
pub type FlowConstructor = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow>>>>>,
>;

/// GPU context plus surface status.
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        let ctx = &mut self.ctx;
        let Some(layout) = SurfaceLayout::from_physical(width, height, ctx.window.scale_factor())
        else {
            return;
        };
        ctx.viewport = layout.viewport;
        ctx.projection.set_aspect(layout.aspect);
        ctx.camera.controller.set_viewport_height(height as f32);

        let (surface_width, surface_height) = layout.surface;
        ctx.config.width = surface_width;
        ctx.config.height = surface_height;
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_texture = Texture::create_depth_texture(
            &ctx.device,
            [surface_width, surface_height],
            "depth_texture",
        );
        self.is_surface_configured = true;
    }

    fn render(&mut self, graphics_flows: &[Box<dyn GraphicsFlow>]) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }
        let ctx = &self.ctx;

        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let batches = Batches::collect(
            graphics_flows.iter().map(|flow| flow.on_render()),
            ctx.camera.camera.position,
        );

        ctx.shadows.render(&mut encoder, batches.shadow_casters());

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            ctx.sky.draw(&mut render_pass, &ctx.camera.bind_group);

            let passes = [
                (&ctx.pipelines.basic, &batches.opaque),
                (&ctx.pipelines.transparent, &batches.transparent),
            ];
            for (pipeline, batch) in passes {
                render_pass.set_pipeline(pipeline);
                for instanced in batch {
                    if instanced.amount == 0 || instanced.instance.size() == 0 {
                        log::warn!("you attemted to render something with zero instances");
                        continue;
                    }
                    render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    render_pass.draw_mesh_instanced(
                        instanced.mesh,
                        instanced.material,
                        0..instanced.amount as u32,
                        &ctx.camera.bind_group,
                        &ctx.lights.bind_group,
                    );
                }
            }
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// The frame loop has two states; the first redraw moves it to `Running` for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized {
        state: AppState,
        flows: Vec<Box<dyn GraphicsFlow>>,
    },
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow>>,
    // We use Option to `take()` the constructors after use.
    constructors: Option<Vec<FlowConstructor>>,
    timer: Timer,
    phase: Phase,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, constructors: Vec<FlowConstructor>) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            timer: Timer::new(),
            phase: Phase::NotStarted,
            failure: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }

    fn finish_init(&mut self, mut state: AppState, mut flows: Vec<Box<dyn GraphicsFlow>>) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        flows.iter_mut().for_each(|flow| {
            let out = flow.on_init(&mut state.ctx);
            handle_flow_output(&mut state.ctx, out);
        });
        log::info!("scene assembled, starting the frame loop");
        state.ctx.window.request_redraw();
        self.graphics_flows = flows;
        self.state = Some(state);
    }

    /// One frame: animate, upload uniforms, render, schedule the next frame.
    fn redraw(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        if self.phase == Phase::NotStarted {
            self.timer = Timer::new();
            self.phase = Phase::Running;
        }
        let elapsed = self.timer.update();

        self.graphics_flows.iter_mut().for_each(|flow| {
            let out = flow.on_update(&state.ctx, elapsed);
            handle_flow_output(&mut state.ctx, out);
        });

        let ctx = &mut state.ctx;
        let fovy = ctx.projection.fovy;
        ctx.camera.controller.update(&mut ctx.camera.camera, fovy);
        ctx.camera.write(&ctx.queue, &ctx.projection);
        ctx.lights.write(&ctx.queue);
        ctx.shadows.write(&ctx.queue, &ctx.lights.setup);

        match state.render(&self.graphics_flows) {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
        state.ctx.window.request_redraw();
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Haunted House");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            let Some(canvas) = canvas else {
                self.fail(
                    event_loop,
                    anyhow::anyhow!("no element with id '{CANVAS_ID}' in the page"),
                );
                return;
            };
            window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;
            // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
            let flow_futures = constructors
                .into_iter()
                .map(|constructor| constructor((&app_state.ctx).into()));
            let flows = futures::future::try_join_all(flow_futures).await?;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.finish_init(app_state, flows),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before the scene finished loading");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized { state, flows } => self.finish_init(state, flows),
            FlowEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        self.graphics_flows.iter_mut().for_each(|flow| {
            let out = flow.on_window_events(&state.ctx, &event);
            handle_flow_output(&mut state.ctx, out);
        });

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn handle_flow_output(ctx: &mut Context, out: Out) {
    match out {
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Opens the window, builds every flow and runs the frame loop until the window closes.
///
/// Returns the first fatal error: no adapter, no surface, or a flow that failed to load.
pub fn run(constructors: Vec<FlowConstructor>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
