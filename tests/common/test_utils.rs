#![allow(dead_code)]

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use image::{DynamicImage, Rgba, RgbaImage};
use rand::{SeedableRng, rngs::StdRng};

pub const EPS: f32 = 1e-4;

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn assert_close(actual: f32, expected: f32, eps: f32) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {expected}, got {actual} (tolerance {eps})"
    );
}

pub fn assert_close3(actual: [f32; 3], expected: [f32; 3], eps: f32) {
    for axis in 0..3 {
        assert!(
            (actual[axis] - expected[axis]).abs() <= eps,
            "expected {expected:?}, got {actual:?} (tolerance {eps})"
        );
    }
}

/// A `width`x`height` image whose every pixel is `value` in all channels.
pub fn solid_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([value, value, value, 255]),
    ))
}

/// Red grows left to right, green top to bottom.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / (width - 1).max(1)) as u8,
            (y * 255 / (height - 1).max(1)) as u8,
            0,
            255,
        ])
    });
    DynamicImage::ImageRgba8(img)
}

/// Clip space to NDC for a world-space point.
pub fn project(view_proj: Matrix4<f32>, point: Point3<f32>) -> Vector3<f32> {
    Point3::from_homogeneous(view_proj * point.to_homogeneous()).to_vec()
}
