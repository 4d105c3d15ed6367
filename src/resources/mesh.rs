use std::ops::RangeInclusive;

use image::{DynamicImage, GenericImageView};
use wgpu::util::DeviceExt;

use crate::data_structures::{
    geometry::Geometry,
    model::{self, ModelVertex},
    texture::TextureWrap,
};

/// Height map applied to a geometry before upload.
///
/// Each vertex moves along its normal by `red * scale + bias`, where `red` is
/// the map's red channel in `[0, 1]` sampled at the vertex's repeated uv.
/// Lookups outside `[0, 1]` follow `wrap`, like the GPU sampler would.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementMap {
    pub scale: f32,
    pub bias: f32,
    pub repeat: [f32; 2],
    pub wrap: TextureWrap,
}

impl DisplacementMap {
    pub const SCALE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const BIAS_RANGE: RangeInclusive<f32> = -1.0..=1.0;

    pub fn offset(&self, sample: f32) -> f32 {
        sample * self.scale + self.bias
    }
}

/// Generated shapes come without tangents and bitangents, so they have to be
/// calculated for normal maps to work correctly.
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];
    for v in vertices.iter_mut() {
        v.tangent = [0.0; 3];
        v.bitangent = [0.0; 3];
    }

    for c in indices.chunks_exact(3) {
        let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
        let v0 = vertices[i0];
        let v1 = vertices[i1];
        let v2 = vertices[i2];

        let pos0: cgmath::Vector3<f32> = v0.position.into();
        let pos1: cgmath::Vector3<f32> = v1.position.into();
        let pos2: cgmath::Vector3<f32> = v2.position.into();

        let uv0: cgmath::Vector2<f32> = v0.tex_coords.into();
        let uv1: cgmath::Vector2<f32> = v1.tex_coords.into();
        let uv2: cgmath::Vector2<f32> = v2.tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() < f32::EPSILON {
            // collapsed uv triangle (cone apex, sphere poles)
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // flipped to get right-handed normal maps with the wgpu texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for i in [i0, i1, i2] {
            vertices[i].tangent = (tangent + cgmath::Vector3::from(vertices[i].tangent)).into();
            vertices[i].bitangent =
                (bitangent + cgmath::Vector3::from(vertices[i].bitangent)).into();
            triangles_included[i] += 1;
        }
    }

    for (v, n) in vertices.iter_mut().zip(triangles_included) {
        if n == 0 {
            let (tangent, bitangent) = fallback_basis(v.normal.into());
            v.tangent = tangent.into();
            v.bitangent = bitangent.into();
            continue;
        }
        let denom = 1.0 / n as f32;
        v.tangent = (cgmath::Vector3::from(v.tangent) * denom).into();
        v.bitangent = (cgmath::Vector3::from(v.bitangent) * denom).into();
    }
}

fn fallback_basis(normal: cgmath::Vector3<f32>) -> (cgmath::Vector3<f32>, cgmath::Vector3<f32>) {
    use cgmath::InnerSpace;
    let up = if normal.y.abs() < 0.99 {
        cgmath::Vector3::unit_y()
    } else {
        cgmath::Vector3::unit_x()
    };
    let tangent = up.cross(normal);
    if tangent.magnitude2() == 0.0 {
        return (cgmath::Vector3::unit_x(), cgmath::Vector3::unit_y());
    }
    let tangent = tangent.normalize();
    (tangent, normal.cross(tangent))
}

/// Offset every vertex of `geometry` along its normal by the height map.
///
/// Normals are left untouched; shading detail comes from the normal maps.
pub fn displace(geometry: &mut Geometry, map_image: &DynamicImage, map: &DisplacementMap) {
    let transform = model::uv_transform(map.repeat);
    for v in geometry.vertices.iter_mut() {
        let u = v.tex_coords[0] * transform[0] + transform[2];
        let w = v.tex_coords[1] * transform[1] + transform[3];
        let offset = map.offset(sample_red(map_image, u, w, map.wrap));
        for axis in 0..3 {
            v.position[axis] += v.normal[axis] * offset;
        }
    }
}

/// Bilinear sample of the red channel in `[0, 1]`.
///
/// `Repeat` axes wrap around; every other address mode clamps to the edge texel.
pub fn sample_red(image: &DynamicImage, u: f32, v: f32, wrap: TextureWrap) -> f32 {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }
    let repeats = |mode: wgpu::AddressMode| mode == wgpu::AddressMode::Repeat;
    let (repeat_u, repeat_v) = (repeats(wrap.u), repeats(wrap.v));
    let fold = |t: f32, repeat: bool| if repeat { t.rem_euclid(1.0) } else { t.clamp(0.0, 1.0) };
    let x = fold(u, repeat_u) * width as f32 - 0.5;
    let y = fold(v, repeat_v) * height as f32 - 0.5;
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);

    let index = |t: f32, size: u32, repeat: bool| -> u32 {
        if repeat {
            (t as i64).rem_euclid(size as i64) as u32
        } else {
            (t as i64).clamp(0, size as i64 - 1) as u32
        }
    };
    let texel = |tx: f32, ty: f32| -> f32 {
        let px = index(tx, width, repeat_u);
        let py = index(ty, height, repeat_v);
        image.get_pixel(px, py).0[0] as f32 / 255.0
    };
    let top = texel(x0, y0) * (1.0 - fx) + texel(x0 + 1.0, y0) * fx;
    let bottom = texel(x0, y0 + 1.0) * (1.0 - fx) + texel(x0 + 1.0, y0 + 1.0) * fx;
    top * (1.0 - fy) + bottom * fy
}

pub fn upload_mesh(device: &wgpu::Device, name: &str, geometry: &Geometry) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name:?} Vertex Buffer")),
        contents: bytemuck::cast_slice(&geometry.vertices),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name:?} Index Buffer")),
        contents: bytemuck::cast_slice(&geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name: name.to_string(),
        vertex_buffer,
        index_buffer,
        num_elements: geometry.indices.len() as u32,
    }
}

/// Replaces the vertices of an uploaded mesh. The vertex count must not change.
pub fn write_vertices(queue: &wgpu::Queue, mesh: &model::Mesh, geometry: &Geometry) {
    queue.write_buffer(&mesh.vertex_buffer, 0, bytemuck::cast_slice(&geometry.vertices));
}
