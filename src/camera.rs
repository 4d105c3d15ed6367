//! Perspective camera, viewport bookkeeping and damped orbit controls.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use wgpu::util::DeviceExt;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Largest device pixel ratio the drawing buffer follows.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

const EPS: f32 = 0.000_001;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    /// Camera-space x and y axes expressed in world space.
    pub fn right_and_up(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        (right, right.cross(forward))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: f32, height: f32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width / height.max(f32::EPSILON),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Ignores degenerate ratios, e.g. from a zero-height window.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Logical canvas size and the pixel ratio the drawing buffer is rendered at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width,
            height,
            pixel_ratio: 1.0,
        };
        viewport.set_pixel_ratio(device_pixel_ratio);
        viewport
    }

    /// Build from a physical window size and the window's scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = scale_factor.max(f64::EPSILON) as f32;
        Self::new(width as f32 / scale, height as f32 / scale, scale)
    }

    pub fn set_pixel_ratio(&mut self, device_pixel_ratio: f32) {
        self.pixel_ratio = device_pixel_ratio.clamp(f32::EPSILON, MAX_PIXEL_RATIO);
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(f32::EPSILON)
    }

    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            ((self.width * self.pixel_ratio).round() as u32).max(1),
            ((self.height * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragState {
    None,
    Rotate,
    Pan,
}

/// Orbit controls around a target point with exponential damping.
///
/// Input accumulates into pending deltas; every [`update`](Self::update) applies
/// `damping` of what is pending and keeps the rest for the following frames.
#[derive(Debug)]
pub struct OrbitController {
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    drag: DragState,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
    theta_delta: f32,
    phi_delta: f32,
    pending_pan: (f32, f32),
    pan_offset: Vector3<f32>,
    scale: f32,
}

impl OrbitController {
    pub fn new(damping: f32) -> Self {
        Self {
            damping,
            rotate_speed: 1.0,
            zoom_step: 0.95,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            drag: DragState::None,
            cursor: None,
            viewport_height: 1.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            pending_pan: (0.0, 0.0),
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
        }
    }

    /// Height in the same pixel unit as cursor positions.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => DragState::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => DragState::Pan,
                    (ElementState::Released, _) => DragState::None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(previous) = self.cursor.replace(*position) {
                    let dx = (position.x - previous.x) as f32;
                    let dy = (position.y - previous.y) as f32;
                    self.handle_drag(dx, dy);
                }
                self.drag != DragState::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = DragState::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                if scroll > 0.0 {
                    self.dolly_in(self.zoom_step);
                } else if scroll < 0.0 {
                    self.dolly_out(self.zoom_step);
                }
                true
            }
            _ => false,
        }
    }

    /// Feed a cursor movement in pixels; what it does depends on the held button.
    pub fn handle_drag(&mut self, dx: f32, dy: f32) {
        match self.drag {
            DragState::Rotate => self.rotate_by_pixels(dx, dy),
            DragState::Pan => self.pan(dx, dy),
            DragState::None => (),
        }
    }

    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        self.rotate_left(TAU * dx * self.rotate_speed / self.viewport_height);
        self.rotate_up(TAU * dy * self.rotate_speed / self.viewport_height);
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Screen-space pan in pixels, resolved against the camera on the next update.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan.0 += dx;
        self.pending_pan.1 += dy;
    }

    pub fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    pub fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    /// Pending rotation as (theta, phi) in radians.
    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.theta_delta, self.phi_delta)
    }

    /// Move `camera` one damped step. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera, fovy: Rad<f32>) -> bool {
        let offset = camera.position - camera.target;

        if self.pending_pan != (0.0, 0.0) {
            let target_distance = offset.magnitude() * (fovy.0 / 2.0).tan();
            let (right, up) = camera.right_and_up();
            let (dx, dy) = self.pending_pan;
            self.pan_offset += right * (-2.0 * dx * target_distance / self.viewport_height);
            self.pan_offset += up * (2.0 * dy * target_distance / self.viewport_height);
            self.pending_pan = (0.0, 0.0);
        }

        let radius = offset.magnitude();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        theta += self.theta_delta * self.damping;
        phi += self.phi_delta * self.damping;
        phi = phi.clamp(EPS, PI - EPS);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let target = camera.target + self.pan_offset * self.damping;
        let sin_phi_radius = phi.sin() * radius;
        let new_offset = Vector3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );
        let position = target + new_offset;

        let keep = 1.0 - self.damping;
        self.theta_delta *= keep;
        self.phi_delta *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;

        let moved = (position - camera.position).magnitude2() > EPS
            || (target - camera.target).magnitude2() > EPS;
        camera.position = position;
        camera.target = target;
        moved
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
            inv_view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        let view = camera.calc_matrix();
        let view_proj = projection.calc_matrix() * view;
        self.view = view.into();
        self.view_proj = view_proj.into();
        self.inv_view_proj = view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        camera: Camera,
        controller: OrbitController,
        projection: &Projection,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, projection: &Projection) {
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
