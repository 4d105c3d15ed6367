/**
 * This module contains all logic for loading meshes and textures from external files
 * and turning them into GPU resources.
 */
pub mod mesh;
pub mod texture;

use crate::{
    color::Rgb,
    data_structures::{
        model::{Material, MaterialTextures, MaterialUniform},
        texture::{ColorSpace, Texture, TextureWrap},
    },
};

/// Where a material's ambient-occlusion/roughness/metalness data comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ArmSource {
    /// One image already packed as R = occlusion, G = roughness, B = metalness.
    Packed(&'static str),
    /// Three single-purpose images packed on load.
    Separate {
        ao: &'static str,
        roughness: &'static str,
        metalness: &'static str,
    },
}

/// Static description of a standard material: which files, how they repeat and wrap.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    pub name: &'static str,
    pub albedo: &'static str,
    pub arm: ArmSource,
    pub normal: &'static str,
    /// Read from the green channel, never repeated.
    pub alpha: Option<&'static str>,
    pub repeat: [f32; 2],
    pub wrap: TextureWrap,
    pub tint: Rgb,
    pub transparent: bool,
}

pub async fn load_material(
    desc: &MaterialDesc,
    asset_root: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Material> {
    let albedo =
        texture::load_texture(asset_root, desc.albedo, ColorSpace::Srgb, desc.wrap, device, queue);
    let normal = texture::load_texture(
        asset_root,
        desc.normal,
        ColorSpace::Linear,
        desc.wrap,
        device,
        queue,
    );
    let arm = async {
        match &desc.arm {
            ArmSource::Packed(file) => {
                texture::load_texture(asset_root, file, ColorSpace::Linear, desc.wrap, device, queue)
                    .await
            }
            ArmSource::Separate {
                ao,
                roughness,
                metalness,
            } => {
                let (ao, roughness, metalness) = futures::try_join!(
                    texture::load_image(asset_root, ao),
                    texture::load_image(asset_root, roughness),
                    texture::load_image(asset_root, metalness),
                )?;
                let packed = texture::pack_arm(&ao, &roughness, &metalness);
                Ok(Texture::from_image(
                    device,
                    queue,
                    &packed,
                    Some(&format!("{} arm", desc.name)),
                    ColorSpace::Linear,
                    desc.wrap,
                ))
            }
        }
    };
    let alpha = async {
        match desc.alpha {
            Some(file) => {
                texture::load_texture(
                    asset_root,
                    file,
                    ColorSpace::Linear,
                    TextureWrap::CLAMP,
                    device,
                    queue,
                )
                .await
            }
            None => Ok(Texture::create_solid(
                [255, 255, 255, 255],
                ColorSpace::Linear,
                device,
                queue,
            )),
        }
    };
    let (albedo, normal, arm, alpha) = futures::try_join!(albedo, normal, arm, alpha)?;
    log::info!("loaded material {}", desc.name);

    Ok(Material::new(
        device,
        desc.name,
        MaterialTextures {
            albedo,
            arm,
            normal,
            alpha,
        },
        MaterialUniform::new(desc.tint.into(), desc.repeat),
        desc.transparent,
        layout,
    ))
}
