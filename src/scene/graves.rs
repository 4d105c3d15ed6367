//! Random placement of the grave field.

use std::f32::consts::TAU;

use rand::Rng;

use crate::data_structures::instance::Instance;

pub const GRAVE_COUNT: usize = 30;
pub const INNER_RADIUS: f32 = 3.0;
pub const OUTER_RADIUS: f32 = 7.0;
pub const MAX_HEIGHT: f32 = 0.4;
/// Maximum tilt in radians around X, Y and Z; rotations are centred on zero.
pub const TILT: [f32; 3] = [0.4, 0.8, 0.4];

/// One grave on the ring around the house.
#[derive(Clone, Debug, PartialEq)]
pub struct GravePlacement {
    pub angle: f32,
    pub radius: f32,
    pub position: [f32; 3],
    /// Euler angles applied X, then Y, then Z.
    pub rotation: [f32; 3],
}

impl GravePlacement {
    pub fn to_instance(&self) -> Instance {
        let [x, y, z] = self.position;
        let [rx, ry, rz] = self.rotation;
        Instance::at(x, y, z).with_euler_xyz(rx, ry, rz)
    }
}

/// Places `count` graves uniformly in angle and radius between the two rings.
pub fn scatter_graves<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<GravePlacement> {
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(INNER_RADIUS..OUTER_RADIUS);
            let position = [
                angle.sin() * radius,
                rng.gen_range(0.0..MAX_HEIGHT),
                angle.cos() * radius,
            ];
            let rotation = TILT.map(|tilt| (rng.gen_range(0.0..1.0) - 0.5) * tilt);
            GravePlacement {
                angle,
                radius,
                position,
                rotation,
            }
        })
        .collect()
}
