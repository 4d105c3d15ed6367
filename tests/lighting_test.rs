use cgmath::{InnerSpace, Point3, Vector3};
use haunted_house::{
    color::Rgb,
    data_structures::instance::Instance,
    pipelines::{
        light::{Fog, LightSetup, MAX_POINT_LIGHTS, PointLight},
        shadow::{
            SHADOW_LAYERS, SUN_LAYER, ShadowUniform, cube_face, cube_face_view_projs,
            directional_view_proj,
        },
        sky::{SkyParams, SkyUniform, sun_intensity, total_mie},
    },
    scene::{assembler::scene_lights, ghosts::ghost_orbits},
};

use crate::common::test_utils::{EPS, assert_close, project};

mod common;

fn point(x: f32, casts_shadow: bool) -> PointLight {
    PointLight {
        color: Rgb::WHITE,
        intensity: 1.0,
        position: Point3::new(x, 1.0, 0.0),
        casts_shadow,
    }
}

fn assert_inside_ndc(ndc: Vector3<f32>) {
    assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "outside xy {ndc:?}");
    assert!((0.0..=1.0).contains(&ndc.z), "outside depth {ndc:?}");
}

#[test]
fn fog_thickens_with_depth() {
    let fog = Fog {
        color: Rgb::BLACK,
        density: 0.1,
    };
    assert_close(fog.factor(0.0), 0.0, EPS);
    assert_close(fog.factor(10.0), 1.0 - (-1.0f32).exp(), EPS);
    assert!(fog.factor(5.0) < fog.factor(6.0));
    assert_close(fog.factor(1000.0), 1.0, EPS);

    let clear = Fog {
        color: Rgb::BLACK,
        density: 0.0,
    };
    assert_close(clear.factor(50.0), 0.0, EPS);
}

#[test]
fn point_table_is_bounded() {
    let mut setup = LightSetup::default();
    for i in 0..MAX_POINT_LIGHTS {
        assert_eq!(setup.add_point(point(i as f32, false)), Some(i));
    }
    assert_eq!(setup.add_point(point(9.0, true)), None);
    assert_eq!(setup.points.len(), MAX_POINT_LIGHTS);
}

#[test]
fn shadow_layers_are_assigned_in_light_order() {
    let mut setup = LightSetup::default();
    setup.add_point(point(0.0, false));
    setup.add_point(point(1.0, true));
    setup.add_point(point(2.0, true));
    setup.add_point(point(3.0, true));
    assert_eq!(
        setup.point_shadow_layers(),
        vec![None, Some(1), Some(7), Some(13)]
    );
}

#[test]
fn shadowed_point_lights_beyond_the_atlas_go_without() {
    let mut setup = LightSetup::default();
    for i in 0..MAX_POINT_LIGHTS {
        setup.add_point(point(i as f32, true));
    }
    assert_eq!(
        setup.point_shadow_layers(),
        vec![Some(1), Some(7), Some(13), None]
    );
}

#[test]
fn uniform_mirrors_the_setup() {
    let (setup, slots) = scene_lights(&Instance::new(), &ghost_orbits()).unwrap();
    let uniform = setup.to_uniform();

    assert_eq!(uniform.point_count, MAX_POINT_LIGHTS as u32);
    assert_eq!(uniform.sun_shadow_layer, SUN_LAYER as i32);
    assert_close(uniform.ambient[3], 0.265, EPS);
    assert_close(uniform.fog[3], 0.1, EPS);

    let direction = Vector3::from(uniform.sun_direction);
    assert_close(direction.magnitude(), 1.0, EPS);
    assert!(direction.z < 0.0 && direction.y > 0.0);

    assert_eq!(uniform.points[slots.door.unwrap()].shadow_layer, -1);
    for slot in slots.ghosts {
        assert!(uniform.points[slot.unwrap()].shadow_layer >= 1);
    }
}

#[test]
fn empty_setup_has_no_shadows() {
    let setup = LightSetup::default();
    let uniform = setup.to_uniform();
    assert_eq!(uniform.point_count, 0);
    assert_eq!(uniform.sun_shadow_layer, -1);

    let (_, active) = ShadowUniform::from_setup(&setup);
    assert!(active.is_empty());
}

#[test]
fn sun_frustum_covers_the_house() {
    let (setup, _) = scene_lights(&Instance::new(), &ghost_orbits()).unwrap();
    let view_proj = directional_view_proj(&setup.sun);
    for corner in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 4.0, 2.0),
        Point3::new(-2.0, 0.0, -2.0),
        Point3::new(5.0, 0.0, 5.0),
    ] {
        assert_inside_ndc(project(view_proj, corner));
    }
    let centre = project(view_proj, setup.sun.target);
    assert_close(centre.x, 0.0, EPS);
    assert_close(centre.y, 0.0, EPS);
}

#[test]
fn cube_faces_look_down_their_axes() {
    let light = Point3::new(1.0, 1.0, -1.0);
    let faces = cube_face_view_projs(light);
    let axes = [
        Vector3::unit_x(),
        -Vector3::unit_x(),
        Vector3::unit_y(),
        -Vector3::unit_y(),
        Vector3::unit_z(),
        -Vector3::unit_z(),
    ];
    for (face, axis) in axes.iter().enumerate() {
        assert_eq!(cube_face(*axis * 3.0), face);
        let ndc = project(faces[face], light + axis * 3.0);
        assert_close(ndc.x, 0.0, EPS);
        assert_close(ndc.y, 0.0, EPS);
        assert_inside_ndc(ndc);
    }
}

#[test]
fn cube_face_picks_the_dominant_axis() {
    assert_eq!(cube_face(Vector3::new(0.2, -0.9, 0.5)), 3);
    assert_eq!(cube_face(Vector3::new(-2.0, 1.0, 1.5)), 1);
    assert_eq!(cube_face(Vector3::new(0.1, 0.1, -0.3)), 5);
}

#[test]
fn every_shadow_layer_is_in_use_for_the_scene() {
    let (setup, _) = scene_lights(&Instance::new(), &ghost_orbits()).unwrap();
    let (uniform, mut active) = ShadowUniform::from_setup(&setup);
    active.sort_unstable();
    assert_eq!(active, (0..SHADOW_LAYERS as u32).collect::<Vec<_>>());
    assert_eq!(
        uniform.view_proj[SUN_LAYER as usize],
        Into::<[[f32; 4]; 4]>::into(directional_view_proj(&setup.sun))
    );
}

#[test]
fn sun_energy_fades_below_the_horizon() {
    let overhead = sun_intensity(1.0);
    assert!(overhead > 600.0 && overhead < 700.0, "{overhead}");
    assert!(sun_intensity(0.5) < overhead);
    assert!(sun_intensity(0.0) > 0.0);
    assert_eq!(sun_intensity(-1.0), 0.0);
    assert_eq!(sun_intensity(-5.0), 0.0);
}

#[test]
fn mie_scattering_scales_with_turbidity() {
    let thin = total_mie(10.0);
    let thick = total_mie(20.0);
    for (a, b) in thin.iter().zip(thick) {
        assert!(*a > 0.0);
        assert!((b / a - 2.0).abs() < 1e-9);
    }
    assert!(thin[0] < thin[1] && thin[1] < thin[2]);
}

#[test]
fn sky_uniform_from_default_params() {
    let params = SkyParams::default();
    let uniform = SkyUniform::from_params(&params);

    assert_close(Vector3::from(uniform.sun_direction).magnitude(), 1.0, EPS);
    assert!(uniform.sun_direction[1] < 0.0);
    assert_close(uniform.mie_directional_g, 0.95, EPS);
    assert!(uniform.sun_e >= 0.0 && (uniform.sun_e as f64) < sun_intensity(1.0));
    assert_close(uniform.sunfade, 1.0, 1e-3);
    // blue light scatters the most
    assert!(uniform.beta_r[2] > uniform.beta_r[1] && uniform.beta_r[1] > uniform.beta_r[0]);
    let mie = total_mie(10.0);
    assert_close(uniform.beta_m[0], (mie[0] * 0.1) as f32, 1e-9);
}

#[test]
fn degenerate_sun_position_does_not_produce_nan() {
    let params = SkyParams {
        sun_position: [0.0, 0.0, 0.0],
        ..SkyParams::default()
    };
    let uniform = SkyUniform::from_params(&params);
    assert!(uniform.sun_direction.iter().all(|c| c.is_finite()));
    assert!(uniform.sun_e.is_finite());
}
