//! Per-frame light animation: the three orbiting ghosts and the door flicker.

use rand::Rng;

use cgmath::Point3;

use crate::{color::Rgb, pipelines::light::LightSetup};

pub const GHOST_INTENSITY: f32 = 6.0;
pub const DOOR_LIGHT_BASE: f32 = 5.0;
pub const DOOR_LIGHT_SWING: f32 = 4.0;

/// A light circling the house at a fixed radius, bobbing up and down.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostOrbit {
    /// Angular speed in radians per second; negative runs clockwise.
    pub speed: f32,
    pub radius: f32,
    pub color: &'static str,
}

impl GhostOrbit {
    pub fn position(&self, elapsed: f32) -> [f32; 3] {
        let angle = elapsed * self.speed;
        [
            angle.cos() * self.radius,
            angle.sin() * (angle * 2.34).sin() * (angle * 3.45).sin(),
            angle.sin() * self.radius,
        ]
    }

    pub fn rgb(&self) -> anyhow::Result<Rgb> {
        Rgb::from_hex(self.color)
    }
}

pub fn ghost_orbits() -> [GhostOrbit; 3] {
    [
        GhostOrbit {
            speed: 0.5,
            radius: 4.0,
            color: "#8800ff",
        },
        GhostOrbit {
            speed: -0.38,
            radius: 5.0,
            color: "#ff0088",
        },
        GhostOrbit {
            speed: 0.23,
            radius: 6.0,
            color: "#ff0000",
        },
    ]
}

/// Door light intensity for a uniform `sample` in `[0, 1)`.
pub fn door_light_intensity(elapsed: f32, sample: f32) -> f32 {
    DOOR_LIGHT_BASE + (sample - 0.5) * DOOR_LIGHT_SWING * elapsed.sin()
}

/// Everything the animation changes in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameUpdate {
    pub ghost_positions: [[f32; 3]; 3],
    pub door_intensity: f32,
}

impl FrameUpdate {
    pub fn compute<R: Rng + ?Sized>(orbits: &[GhostOrbit; 3], elapsed: f32, rng: &mut R) -> Self {
        Self {
            ghost_positions: [
                orbits[0].position(elapsed),
                orbits[1].position(elapsed),
                orbits[2].position(elapsed),
            ],
            door_intensity: door_light_intensity(elapsed, rng.gen_range(0.0..1.0)),
        }
    }
}

/// Where the animated lights sit in the light table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightSlots {
    pub ghosts: [Option<usize>; 3],
    pub door: Option<usize>,
}

impl FrameUpdate {
    /// Writes the new positions and the flicker into `setup`. Empty slots are skipped.
    pub fn apply(&self, setup: &mut LightSetup, slots: &LightSlots) {
        for (slot, [x, y, z]) in slots.ghosts.iter().zip(self.ghost_positions) {
            if let Some(light) = slot.and_then(|idx| setup.points.get_mut(idx)) {
                light.position = Point3::new(x, y, z);
            }
        }
        if let Some(light) = slots.door.and_then(|idx| setup.points.get_mut(idx)) {
            light.intensity = self.door_intensity;
        }
    }
}
