//! Live tuning of the floor displacement from the keyboard.
//!
//! `[` / `]` lower and raise the scale, `-` / `=` the bias. Every change
//! re-displaces the flat floor and rewrites its vertex buffer.

use image::DynamicImage;
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    data_structures::{
        geometry::Geometry,
        scene_graph::{MeshHandle, ResourcePool},
    },
    resources::mesh::{self, DisplacementMap},
};

/// Change per key press.
pub const STEP: f32 = 0.01;

/// Applies the adjustment bound to `key`, clamped to the valid ranges.
///
/// Returns whether the map changed.
pub fn nudge(map: &mut DisplacementMap, key: KeyCode) -> bool {
    let before = (map.scale, map.bias);
    let clamp = |value: f32, range: &std::ops::RangeInclusive<f32>| {
        value.clamp(*range.start(), *range.end())
    };
    match key {
        KeyCode::BracketLeft => map.scale = clamp(map.scale - STEP, &DisplacementMap::SCALE_RANGE),
        KeyCode::BracketRight => map.scale = clamp(map.scale + STEP, &DisplacementMap::SCALE_RANGE),
        KeyCode::Minus => map.bias = clamp(map.bias - STEP, &DisplacementMap::BIAS_RANGE),
        KeyCode::Equal => map.bias = clamp(map.bias + STEP, &DisplacementMap::BIAS_RANGE),
        _ => return false,
    }
    before != (map.scale, map.bias)
}

/// The physical key of a press (or auto-repeat) event.
pub fn pressed_key(event: &WindowEvent) -> Option<KeyCode> {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } => Some(*code),
        _ => None,
    }
}

/// What it takes to rebuild the floor: the undisplaced plane and its height map.
pub struct FloorTuning {
    flat: Geometry,
    height: DynamicImage,
    pub map: DisplacementMap,
    mesh: MeshHandle,
}

impl FloorTuning {
    pub fn new(flat: Geometry, height: DynamicImage, map: DisplacementMap, mesh: MeshHandle) -> Self {
        Self {
            flat,
            height,
            map,
            mesh,
        }
    }

    /// Flat geometry displaced with the current map.
    pub fn displaced(&self) -> Geometry {
        let mut geometry = self.flat.clone();
        mesh::displace(&mut geometry, &self.height, &self.map);
        geometry
    }

    /// Handles a window event; on a tuning key the floor mesh is rewritten.
    pub fn on_event(&mut self, event: &WindowEvent, pool: &ResourcePool, queue: &wgpu::Queue) {
        let Some(key) = pressed_key(event) else {
            return;
        };
        if !nudge(&mut self.map, key) {
            return;
        }
        let Some(floor) = pool.mesh(self.mesh) else {
            log::warn!("floor mesh missing, displacement change dropped");
            return;
        };
        mesh::write_vertices(queue, floor, &self.displaced());
        log::info!(
            "floor displacement scale {:.3} bias {:.3}",
            self.map.scale,
            self.map.bias
        );
    }
}
