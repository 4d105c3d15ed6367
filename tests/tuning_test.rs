use haunted_house::{
    config::SceneConfig,
    data_structures::{geometry::plane, scene_graph::MeshHandle},
    resources::mesh::DisplacementMap,
    scene::tuning::{FloorTuning, STEP, nudge, pressed_key},
};
use winit::{event::WindowEvent, keyboard::KeyCode};

use crate::common::test_utils::{EPS, assert_close, solid_image};

mod common;

fn floor_map() -> DisplacementMap {
    SceneConfig::default().floor_displacement
}

#[test]
fn brackets_change_the_scale_and_minus_equal_the_bias() {
    let mut map = floor_map();

    assert!(nudge(&mut map, KeyCode::BracketRight));
    assert_close(map.scale, 0.3 + STEP, EPS);
    assert!(nudge(&mut map, KeyCode::BracketLeft));
    assert!(nudge(&mut map, KeyCode::BracketLeft));
    assert_close(map.scale, 0.3 - STEP, EPS);

    assert!(nudge(&mut map, KeyCode::Equal));
    assert_close(map.bias, -0.128 + STEP, EPS);
    assert!(nudge(&mut map, KeyCode::Minus));
    assert!(nudge(&mut map, KeyCode::Minus));
    assert_close(map.bias, -0.128 - STEP, EPS);
}

#[test]
fn adjustments_stop_at_the_range_ends() {
    let mut map = floor_map();
    map.scale = 0.0;
    map.bias = 1.0;
    assert!(!nudge(&mut map, KeyCode::BracketLeft));
    assert!(!nudge(&mut map, KeyCode::Equal));
    assert_eq!((map.scale, map.bias), (0.0, 1.0));

    map.scale = 0.995;
    assert!(nudge(&mut map, KeyCode::BracketRight));
    assert_eq!(map.scale, 1.0);
    assert!(!nudge(&mut map, KeyCode::BracketRight));
}

#[test]
fn other_keys_leave_the_map_alone() {
    let mut map = floor_map();
    for key in [KeyCode::KeyW, KeyCode::Space, KeyCode::Escape] {
        assert!(!nudge(&mut map, key));
    }
    assert_eq!(map, floor_map());
}

#[test]
fn non_keyboard_events_are_not_key_presses() {
    assert_eq!(pressed_key(&WindowEvent::Focused(true)), None);
    assert_eq!(pressed_key(&WindowEvent::CloseRequested), None);
}

#[test]
fn redisplacement_starts_from_the_flat_floor() {
    let flat = plane(20.0, 20.0, 10, 10);
    let mut tuning = FloorTuning::new(flat.clone(), solid_image(8, 8, 255), floor_map(), MeshHandle(0));

    let first = tuning.displaced();
    assert_close(first.vertices[0].position[2], 0.3 - 0.128, EPS);

    nudge(&mut tuning.map, KeyCode::BracketRight);
    nudge(&mut tuning.map, KeyCode::BracketRight);
    let second = tuning.displaced();
    // offsets never accumulate across changes
    for v in &second.vertices {
        assert_close(v.position[2], 0.3 + 2.0 * STEP - 0.128, EPS);
    }
    assert_eq!(second.indices, flat.indices);
}
