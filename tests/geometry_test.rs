use haunted_house::{
    data_structures::{
        geometry::{Geometry, cone, cuboid, plane, sphere},
        texture::TextureWrap,
    },
    resources::mesh::{DisplacementMap, compute_tangents, displace, sample_red},
};

use crate::common::test_utils::{EPS, assert_close, assert_close3, gradient_image, solid_image};

mod common;

fn assert_valid_indices(geometry: &Geometry) {
    assert_eq!(geometry.indices.len() % 3, 0);
    let count = geometry.vertices.len() as u32;
    assert!(geometry.indices.iter().all(|&i| i < count));
}

fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Every triangle's winding agrees with the normals of its corners.
fn assert_counter_clockwise(geometry: &Geometry) {
    for tri in geometry.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| geometry.vertices[i as usize]);
        let face = cross(sub(b.position, a.position), sub(c.position, a.position));
        if length(face) < 1e-9 {
            continue;
        }
        let normal = a.normal;
        let facing = face[0] * normal[0] + face[1] * normal[1] + face[2] * normal[2];
        assert!(facing > 0.0, "clockwise triangle {tri:?}");
    }
}

#[test]
fn plane_counts_and_bounds() {
    let geometry = plane(20.0, 20.0, 100, 100);
    assert_eq!(geometry.vertices.len(), 101 * 101);
    assert_eq!(geometry.indices.len(), 6 * 100 * 100);
    assert_valid_indices(&geometry);

    let (min, max) = geometry.bounds();
    assert_close3(min, [-10.0, -10.0, 0.0], EPS);
    assert_close3(max, [10.0, 10.0, 0.0], EPS);
    assert_counter_clockwise(&geometry);
}

#[test]
fn plane_uv_origin_is_top_left() {
    let geometry = plane(2.0, 2.0, 1, 1);
    let top_left = geometry
        .vertices
        .iter()
        .find(|v| v.tex_coords == [0.0, 0.0])
        .unwrap();
    assert_close3(top_left.position, [-1.0, 1.0, 0.0], EPS);
    let bottom_right = geometry
        .vertices
        .iter()
        .find(|v| v.tex_coords == [1.0, 1.0])
        .unwrap();
    assert_close3(bottom_right.position, [1.0, -1.0, 0.0], EPS);
}

#[test]
fn cuboid_has_one_quad_per_face() {
    let geometry = cuboid(4.0, 2.5, 4.0);
    assert_eq!(geometry.vertices.len(), 24);
    assert_eq!(geometry.indices.len(), 36);
    assert_valid_indices(&geometry);

    let (min, max) = geometry.bounds();
    assert_close3(min, [-2.0, -1.25, -2.0], EPS);
    assert_close3(max, [2.0, 1.25, 2.0], EPS);
    assert_counter_clockwise(&geometry);

    for v in &geometry.vertices {
        assert_close(length(v.normal), 1.0, EPS);
        let on_face = (0..3).any(|axis| {
            v.normal[axis] != 0.0 && (v.position[axis].abs() - max[axis]).abs() < EPS
        });
        assert!(on_face, "normal {:?} at {:?}", v.normal, v.position);
    }
}

#[test]
fn four_sided_cone_is_the_roof() {
    let geometry = cone(3.5, 1.5, 4);
    assert_eq!(geometry.vertices.len(), 19);
    assert_eq!(geometry.indices.len(), 24);
    assert_valid_indices(&geometry);

    let (min, max) = geometry.bounds();
    assert_close(min[1], -0.75, EPS);
    assert_close(max[1], 0.75, EPS);
    assert_close(max[0], 3.5, EPS);
    assert_close(min[2], -3.5, EPS);
    assert_counter_clockwise(&geometry);
}

#[test]
fn sphere_counts_and_radius() {
    let geometry = sphere(1.0, 16, 16);
    assert_eq!(geometry.vertices.len(), 17 * 17);
    // pole rows contribute one triangle per quad
    assert_eq!(geometry.indices.len(), 3 * (2 * 16 * 16 - 2 * 16));
    assert_valid_indices(&geometry);
    for v in &geometry.vertices {
        assert_close(length(v.position), 1.0, EPS);
        assert_close3(v.normal, v.position, EPS);
    }
    assert_counter_clockwise(&geometry);
}

#[test]
fn tangents_follow_the_u_direction() {
    let geometry = plane(2.0, 2.0, 2, 2);
    for v in &geometry.vertices {
        assert!(v.tangent[0] > 0.0);
        assert_close(v.tangent[1], 0.0, EPS);
        assert_close(v.tangent[2], 0.0, EPS);
        assert!(v.bitangent[1] > 0.0);
        assert_close(v.bitangent[0], 0.0, EPS);
        assert_close(v.bitangent[2], 0.0, EPS);
    }
}

#[test]
fn unused_vertices_get_a_fallback_basis() {
    let mut geometry = plane(1.0, 1.0, 1, 1);
    geometry.indices.clear();
    compute_tangents(&mut geometry.vertices, &geometry.indices);
    for v in &geometry.vertices {
        assert_close(length(v.tangent), 1.0, EPS);
        assert_close(length(v.bitangent), 1.0, EPS);
    }
}

#[test]
fn red_channel_is_sampled_bilinearly() {
    let image = solid_image(4, 4, 255);
    assert_close(sample_red(&image, 0.3, 0.7, TextureWrap::REPEAT), 1.0, EPS);
    assert_close(sample_red(&image, -3.2, 12.5, TextureWrap::REPEAT), 1.0, EPS);

    let black = solid_image(2, 2, 0);
    assert_close(sample_red(&black, 0.5, 0.5, TextureWrap::REPEAT), 0.0, EPS);

    let gradient = gradient_image(256, 4);
    let left = sample_red(&gradient, 0.25, 0.5, TextureWrap::REPEAT);
    let right = sample_red(&gradient, 0.75, 0.5, TextureWrap::REPEAT);
    assert!(right > left);
    assert_close(left, 0.25, 0.01);
}

#[test]
fn clamped_edges_do_not_bleed_into_the_opposite_side() {
    let gradient = gradient_image(256, 4);

    // the right edge of a repeating map blends with the black left column
    assert_close(sample_red(&gradient, 1.0, 0.5, TextureWrap::REPEAT), 0.5, 0.01);
    assert_close(sample_red(&gradient, 0.0, 0.5, TextureWrap::REPEAT), 0.5, 0.01);

    assert_close(sample_red(&gradient, 1.0, 0.5, TextureWrap::CLAMP), 1.0, EPS);
    assert_close(sample_red(&gradient, 0.0, 0.5, TextureWrap::CLAMP), 0.0, EPS);
    assert_close(sample_red(&gradient, 1.7, 0.5, TextureWrap::CLAMP), 1.0, EPS);
    assert_close(sample_red(&gradient, -0.3, 0.5, TextureWrap::CLAMP), 0.0, EPS);

    // u repeats, v clamps
    assert_close(sample_red(&gradient, 1.0, 3.0, TextureWrap::REPEAT_U), 0.5, 0.01);
}

#[test]
fn door_edges_keep_their_height_under_clamping() {
    let map = DisplacementMap {
        scale: 1.0,
        bias: 0.0,
        repeat: [1.0, 1.0],
        wrap: TextureWrap::CLAMP,
    };
    let mut geometry = plane(2.2, 2.2, 4, 4);
    displace(&mut geometry, &gradient_image(64, 64), &map);
    let right_edge = geometry
        .vertices
        .iter()
        .filter(|v| v.tex_coords[0] >= 1.0 - EPS)
        .collect::<Vec<_>>();
    assert!(!right_edge.is_empty());
    for v in right_edge {
        assert_close(v.position[2], 1.0, EPS);
    }
}

#[test]
fn displacement_moves_vertices_along_normals() {
    let map = DisplacementMap {
        scale: 0.3,
        bias: -0.128,
        repeat: [8.0, 8.0],
        wrap: TextureWrap::REPEAT,
    };
    let mut geometry = plane(20.0, 20.0, 10, 10);
    let flat = geometry.clone();
    displace(&mut geometry, &solid_image(8, 8, 255), &map);

    for (moved, original) in geometry.vertices.iter().zip(&flat.vertices) {
        assert_close(moved.position[0], original.position[0], EPS);
        assert_close(moved.position[1], original.position[1], EPS);
        assert_close(moved.position[2], 0.3 - 0.128, EPS);
    }
    assert_eq!(geometry.indices, flat.indices);
}

#[test]
fn black_height_map_only_applies_the_bias() {
    let map = DisplacementMap {
        scale: 0.15,
        bias: -0.04,
        repeat: [1.0, 1.0],
        wrap: TextureWrap::CLAMP,
    };
    assert_close(map.offset(0.0), -0.04, EPS);
    assert_close(map.offset(1.0), 0.11, EPS);

    let mut geometry = plane(2.2, 2.2, 4, 4);
    displace(&mut geometry, &solid_image(4, 4, 0), &map);
    for v in &geometry.vertices {
        assert_close(v.position[2], -0.04, EPS);
    }
}
