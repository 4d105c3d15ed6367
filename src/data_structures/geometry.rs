//! Procedural tessellation of the primitive shapes the scene is built from.
//!
//! All generators emit counter-clockwise front faces and texture coordinates
//! for a top-left image origin (`v = 0` is the top row of the image). Tangents
//! are filled in by [`compute_tangents`] before the geometry is returned.

use std::f32::consts::PI;

use crate::{data_structures::model::ModelVertex, resources::mesh::compute_tangents};

/// CPU-side triangle list, ready to be displaced and uploaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        (min, max)
    }

    fn vertex(&mut self, position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) {
        self.vertices.push(ModelVertex {
            position,
            tex_coords,
            normal,
            ..Default::default()
        });
    }

    fn finish(mut self) -> Self {
        compute_tangents(&mut self.vertices, &self.indices);
        self
    }
}

/// A flat rectangle in the XY plane facing +Z.
pub fn plane(width: f32, height: f32, segments_x: u32, segments_y: u32) -> Geometry {
    let mut geometry = Geometry::default();
    let (gx, gy) = (segments_x.max(1), segments_y.max(1));
    let (half_w, half_h) = (width / 2.0, height / 2.0);
    let (seg_w, seg_h) = (width / gx as f32, height / gy as f32);

    for iy in 0..=gy {
        let y = iy as f32 * seg_h - half_h;
        for ix in 0..=gx {
            let x = ix as f32 * seg_w - half_w;
            geometry.vertex(
                [x, -y, 0.0],
                [0.0, 0.0, 1.0],
                [ix as f32 / gx as f32, iy as f32 / gy as f32],
            );
        }
    }
    push_grid_indices(&mut geometry.indices, 0, gx, gy);
    geometry.finish()
}

/// An axis-aligned box centred on the origin, one quad per face.
pub fn cuboid(width: f32, height: f32, depth: f32) -> Geometry {
    let mut geometry = Geometry::default();
    // (u axis, v axis, w axis, u dir, v dir, face width, face height, face depth)
    let faces = [
        (2, 1, 0, -1.0, -1.0, depth, height, width),
        (2, 1, 0, 1.0, -1.0, depth, height, -width),
        (0, 2, 1, 1.0, 1.0, width, depth, height),
        (0, 2, 1, 1.0, -1.0, width, depth, -height),
        (0, 1, 2, 1.0, -1.0, width, height, depth),
        (0, 1, 2, -1.0, -1.0, width, height, -depth),
    ];
    for (u, v, w, udir, vdir, face_w, face_h, face_d) in faces {
        let start = geometry.vertices.len() as u32;
        for iy in 0..=1u32 {
            let y = iy as f32 * face_h - face_h / 2.0;
            for ix in 0..=1u32 {
                let x = ix as f32 * face_w - face_w / 2.0;
                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = face_d / 2.0;
                let mut normal = [0.0; 3];
                normal[w] = if face_d > 0.0 { 1.0 } else { -1.0 };
                geometry.vertex(position, normal, [ix as f32, iy as f32]);
            }
        }
        push_grid_indices(&mut geometry.indices, start, 1, 1);
    }
    geometry.finish()
}

/// A closed cone with its apex on +Y, standing on a cap at `-height / 2`.
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Geometry {
    let mut geometry = Geometry::default();
    let segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = radius / height;

    // lateral surface: row 0 is the apex ring, row 1 the base ring
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(2);
    for row in 0..=1u32 {
        let v = row as f32;
        let ring_radius = v * radius;
        let mut indices = Vec::with_capacity(segments as usize + 1);
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            let normal = normalize([sin, slope, cos]);
            indices.push(geometry.vertices.len() as u32);
            geometry.vertex(
                [ring_radius * sin, -v * height + half_height, ring_radius * cos],
                normal,
                [u, v],
            );
        }
        grid.push(indices);
    }
    for x in 0..segments as usize {
        let b = grid[1][x];
        let c = grid[1][x + 1];
        let d = grid[0][x + 1];
        // the apex has zero radius, so only the lower triangle of each quad remains
        geometry.indices.extend_from_slice(&[b, c, d]);
    }

    // bottom cap
    let center_start = geometry.vertices.len() as u32;
    for _ in 1..=segments {
        geometry.vertex([0.0, -half_height, 0.0], [0.0, -1.0, 0.0], [0.5, 0.5]);
    }
    let ring_start = geometry.vertices.len() as u32;
    for x in 0..=segments {
        let theta = x as f32 / segments as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        geometry.vertex(
            [radius * sin, -half_height, radius * cos],
            [0.0, -1.0, 0.0],
            [cos * 0.5 + 0.5, 1.0 - (-sin * 0.5 + 0.5)],
        );
    }
    for x in 0..segments {
        let c = center_start + x;
        let i = ring_start + x;
        geometry.indices.extend_from_slice(&[i + 1, i, c]);
    }
    geometry.finish()
}

/// A UV sphere; the pole rows collapse to a single triangle per segment.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let mut geometry = Geometry::default();
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(hs as usize + 1);

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        // shift the pole texels so the pole triangles sample the middle of their strip
        let u_offset = if iy == 0 {
            0.5 / ws as f32
        } else if iy == hs {
            -0.5 / ws as f32
        } else {
            0.0
        };
        let mut row = Vec::with_capacity(ws as usize + 1);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * 2.0 * PI;
            let theta = v * PI;
            let position = [
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ];
            row.push(geometry.vertices.len() as u32);
            geometry.vertex(position, normalize(position), [u + u_offset, v]);
        }
        grid.push(row);
    }

    for iy in 0..hs as usize {
        for ix in 0..ws as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                geometry.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs as usize - 1 {
                geometry.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    geometry.finish()
}

fn push_grid_indices(indices: &mut Vec<u32>, start: u32, gx: u32, gy: u32) {
    let row = gx + 1;
    for iy in 0..gy {
        for ix in 0..gx {
            let a = start + ix + row * iy;
            let b = start + ix + row * (iy + 1);
            let c = start + (ix + 1) + row * (iy + 1);
            let d = start + (ix + 1) + row * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}
