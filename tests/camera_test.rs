use cgmath::{Deg, InnerSpace, MetricSpace, Point3, Rad};
use haunted_house::{
    camera::{Camera, CameraUniform, MAX_PIXEL_RATIO, OrbitController, Projection, Viewport},
    context::{SurfaceLayout, surface_extent},
};

use crate::common::test_utils::{EPS, assert_close};

mod common;

fn start_camera() -> Camera {
    Camera::new((4.0, 2.0, 5.0), (0.0, 0.0, 0.0))
}

fn fovy() -> Rad<f32> {
    Deg(75.0).into()
}

#[test]
fn resize_takes_the_aspect_from_physical_pixels() {
    let mut projection = Projection::new(800.0, 600.0, Deg(75.0), 0.1, 100.0);
    let sizes = [(1280, 720), (1366, 768), (1001, 999), (2559, 1439), (333, 777)];
    for scale in [1.0, 1.25, 1.5, 1.75, 2.0, 3.0] {
        for (width, height) in sizes {
            let layout = SurfaceLayout::from_physical(width, height, scale).unwrap();
            projection.set_aspect(layout.aspect);
            assert_eq!(
                projection.aspect(),
                width as f32 / height as f32,
                "{width}x{height} at scale {scale}"
            );
        }
    }
}

#[test]
fn fractional_scales_keep_the_logical_viewport() {
    let layout = SurfaceLayout::from_physical(1366, 768, 1.25).unwrap();
    assert_close(layout.viewport.width, 1366.0 / 1.25, 1e-3);
    assert_close(layout.viewport.height, 768.0 / 1.25, 1e-3);
    assert_eq!(layout.viewport.pixel_ratio(), 1.25);
}

#[test]
fn minimised_windows_have_no_layout() {
    assert!(SurfaceLayout::from_physical(0, 720, 1.5).is_none());
    assert!(SurfaceLayout::from_physical(1280, 0, 1.5).is_none());
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn native_surface_matches_the_physical_window() {
    for scale in [1.0, 1.25, 1.5, 2.0, 3.0] {
        for (width, height) in [(1280, 720), (1366, 768), (1001, 999), (3840, 2160)] {
            let viewport = Viewport::from_physical(width, height, scale);
            assert_eq!(surface_extent(width, height, &viewport), (width, height));
            let layout = SurfaceLayout::from_physical(width, height, scale).unwrap();
            assert_eq!(layout.surface, (width, height));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn native_surface_is_never_zero_sized() {
    let viewport = Viewport::new(0.0, 0.0, 1.0);
    assert_eq!(surface_extent(0, 0, &viewport), (1, 1));
    assert_eq!(surface_extent(0, 480, &viewport), (1, 480));
    assert_eq!(surface_extent(640, 0, &viewport), (640, 1));
}

#[test]
fn degenerate_aspects_keep_the_previous_one() {
    let mut projection = Projection::new(400.0, 200.0, Deg(75.0), 0.1, 100.0);
    projection.set_aspect(400.0 / 0.0);
    projection.set_aspect(0.0);
    projection.set_aspect(f32::NAN);
    assert_eq!(projection.aspect(), 2.0);
}

#[test]
fn pixel_ratio_is_capped_at_two() {
    let viewport = Viewport::new(800.0, 600.0, 3.0);
    assert_eq!(viewport.pixel_ratio(), MAX_PIXEL_RATIO);
    assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));

    let mut viewport = Viewport::new(800.0, 600.0, 1.5);
    assert_eq!(viewport.drawing_buffer_size(), (1200, 900));
    viewport.set_pixel_ratio(4.0);
    assert_eq!(viewport.pixel_ratio(), 2.0);
}

#[test]
fn physical_size_is_converted_to_logical() {
    let viewport = Viewport::from_physical(2560, 1440, 2.0);
    assert_eq!((viewport.width, viewport.height), (1280.0, 720.0));
    assert_eq!(viewport.drawing_buffer_size(), (2560, 1440));

    let hidpi = Viewport::from_physical(3000, 1500, 3.0);
    assert_eq!((hidpi.width, hidpi.height), (1000.0, 500.0));
    assert_eq!(hidpi.drawing_buffer_size(), (2000, 1000));
}

#[test]
fn idle_controller_keeps_the_camera_still() {
    let mut camera = start_camera();
    let before = camera.clone();
    let mut controller = OrbitController::new(0.05);
    for _ in 0..10 {
        assert!(!controller.update(&mut camera, fovy()));
    }
    assert!(camera.position.distance(before.position) < 1e-4);
    assert_eq!(camera.target, before.target);
}

#[test]
fn rotation_is_damped_over_frames() {
    let mut camera = start_camera();
    let mut controller = OrbitController::new(0.05);
    controller.rotate_left(0.4);

    assert!(controller.update(&mut camera, fovy()));
    let (theta, _) = controller.pending_rotation();
    assert_close(theta, -0.4 * 0.95, EPS);

    for _ in 0..200 {
        controller.update(&mut camera, fovy());
    }
    let (theta, phi) = controller.pending_rotation();
    assert!(theta.abs() < 1e-4);
    assert_eq!(phi, 0.0);
}

#[test]
fn orbiting_keeps_the_distance_to_the_target() {
    let mut camera = start_camera();
    let distance = camera.position.distance(camera.target);
    let mut controller = OrbitController::new(0.05);
    controller.set_viewport_height(600.0);
    controller.rotate_by_pixels(120.0, -45.0);
    for _ in 0..100 {
        controller.update(&mut camera, fovy());
    }
    assert_close(camera.position.distance(camera.target), distance, 1e-3);
    assert!(camera.position.distance(start_camera().position) > 0.1);
}

#[test]
fn full_drag_height_turns_a_full_circle() {
    let mut controller = OrbitController::new(0.05);
    controller.set_viewport_height(500.0);
    controller.rotate_by_pixels(500.0, 0.0);
    let (theta, phi) = controller.pending_rotation();
    assert_close(theta, -std::f32::consts::TAU, EPS);
    assert_eq!(phi, 0.0);
}

#[test]
fn polar_angle_never_flips_over_the_pole() {
    let mut camera = start_camera();
    let mut controller = OrbitController::new(1.0);
    controller.rotate_up(10.0);
    controller.update(&mut camera, fovy());
    let offset = camera.position - camera.target;
    assert!(offset.y > 0.0);
    assert!((offset.x * offset.x + offset.z * offset.z).sqrt() < 1e-2);
}

#[test]
fn wheel_dollies_by_five_percent() {
    let mut camera = start_camera();
    let distance = camera.position.distance(camera.target);
    let mut controller = OrbitController::new(0.05);
    controller.dolly_in(0.95);
    controller.update(&mut camera, fovy());
    assert_close(camera.position.distance(camera.target), distance * 0.95, 1e-3);

    controller.dolly_out(0.95);
    controller.update(&mut camera, fovy());
    assert_close(camera.position.distance(camera.target), distance, 1e-3);
}

#[test]
fn pan_moves_the_target_sideways() {
    let mut camera = start_camera();
    let mut controller = OrbitController::new(0.05);
    controller.set_viewport_height(600.0);
    controller.pan(100.0, 0.0);
    for _ in 0..300 {
        controller.update(&mut camera, fovy());
    }
    let moved = camera.target - Point3::new(0.0, 0.0, 0.0);
    assert!(moved.magnitude() > 0.1);
    // dragging right moves the scene right, so the target moves left
    let (right, _) = start_camera().right_and_up();
    assert!(moved.normalize().dot(right) < -0.99);
}

#[test]
fn camera_uniform_stores_eye_and_inverse() {
    let camera = start_camera();
    let projection = Projection::new(800.0, 600.0, Deg(75.0), 0.1, 100.0);
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);
    assert_eq!(uniform.view_position, [4.0, 2.0, 5.0, 1.0]);

    let view_proj = cgmath::Matrix4::from(uniform.view_proj);
    let inverse = cgmath::Matrix4::from(uniform.inv_view_proj);
    let identity = view_proj * inverse;
    for (col, column) in Into::<[[f32; 4]; 4]>::into(identity).iter().enumerate() {
        for (row, value) in column.iter().enumerate() {
            let expected = if row == col { 1.0 } else { 0.0 };
            assert_close(*value, expected, 1e-3);
        }
    }
}
