use haunted_house::scene::graves::{
    GRAVE_COUNT, INNER_RADIUS, MAX_HEIGHT, OUTER_RADIUS, TILT, scatter_graves,
};

use crate::common::test_utils::{EPS, assert_close, seeded_rng};

mod common;

#[test]
fn scatters_the_requested_number_of_graves() {
    let graves = scatter_graves(&mut seeded_rng(7), GRAVE_COUNT);
    assert_eq!(graves.len(), 30);
    assert!(scatter_graves(&mut seeded_rng(7), 0).is_empty());
}

#[test]
fn graves_stay_on_the_ring_around_the_house() {
    for seed in 0..20 {
        for grave in scatter_graves(&mut seeded_rng(seed), GRAVE_COUNT) {
            let [x, _, z] = grave.position;
            let distance = (x * x + z * z).sqrt();
            assert!(
                distance >= INNER_RADIUS - EPS && distance < OUTER_RADIUS + EPS,
                "grave at distance {distance}"
            );
            assert_close(distance, grave.radius, EPS);
            assert!(grave.radius >= INNER_RADIUS && grave.radius < OUTER_RADIUS);
        }
    }
}

#[test]
fn graves_use_sine_for_x_and_cosine_for_z() {
    for grave in scatter_graves(&mut seeded_rng(3), GRAVE_COUNT) {
        let [x, _, z] = grave.position;
        assert_close(x, grave.angle.sin() * grave.radius, EPS);
        assert_close(z, grave.angle.cos() * grave.radius, EPS);
        assert!((0.0..std::f32::consts::TAU).contains(&grave.angle));
    }
}

#[test]
fn height_and_tilt_are_bounded() {
    for seed in 0..20 {
        for grave in scatter_graves(&mut seeded_rng(seed), GRAVE_COUNT) {
            let y = grave.position[1];
            assert!((0.0..MAX_HEIGHT).contains(&y), "height {y}");
            let [rx, ry, rz] = grave.rotation;
            assert!(rx.abs() <= 0.2 + EPS, "x tilt {rx}");
            assert!(ry.abs() <= 0.4 + EPS, "y tilt {ry}");
            assert!(rz.abs() <= 0.2 + EPS, "z tilt {rz}");
            for (angle, max) in grave.rotation.iter().zip(TILT) {
                assert!(angle.abs() <= max / 2.0 + EPS);
            }
        }
    }
}

#[test]
fn same_seed_gives_the_same_field() {
    let a = scatter_graves(&mut seeded_rng(42), GRAVE_COUNT);
    let b = scatter_graves(&mut seeded_rng(42), GRAVE_COUNT);
    assert_eq!(a, b);

    let c = scatter_graves(&mut seeded_rng(43), GRAVE_COUNT);
    assert_ne!(a, c);
}

#[test]
fn grave_instance_carries_position_and_tilt() {
    let grave = &scatter_graves(&mut seeded_rng(11), 1)[0];
    let instance = grave.to_instance();
    assert_close(instance.position.x, grave.position[0], EPS);
    assert_close(instance.position.y, grave.position[1], EPS);
    assert_close(instance.position.z, grave.position[2], EPS);
    assert_eq!(instance.scale, cgmath::Vector3::new(1.0, 1.0, 1.0));
    let [rx, ry, rz] = grave.rotation;
    assert_eq!(
        instance.rotation,
        haunted_house::data_structures::instance::euler_xyz(rx, ry, rz)
    );
}
