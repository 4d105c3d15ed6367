use anyhow::Context;
use image::{DynamicImage, GenericImageView, imageops::FilterType};

use crate::data_structures::texture::{self, ColorSpace, TextureWrap};

/// Bindings of group 0 in `standard.wgsl`.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let sampler = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            texture(0),
            sampler(1),
            texture(2),
            texture(3),
            texture(4),
            sampler(5),
            wgpu::BindGroupLayoutEntry {
                binding: 6,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

#[cfg(target_arch = "wasm32")]
fn format_url(asset_root: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window available")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("failed to read page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/{}/", asset_root.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(asset_root: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(asset_root, file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(asset_root).join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    Ok(data)
}

pub async fn load_image(asset_root: &str, file_name: &str) -> anyhow::Result<DynamicImage> {
    let data = load_binary(asset_root, file_name)
        .await
        .with_context(|| format!("failed to load {file_name}"))?;
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str());
    texture::decode(&data, extension).with_context(|| format!("failed to decode {file_name}"))
}

pub async fn load_texture(
    asset_root: &str,
    file_name: &str,
    color_space: ColorSpace,
    wrap: TextureWrap,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let img = load_image(asset_root, file_name).await?;
    Ok(texture::Texture::from_image(
        device,
        queue,
        &img,
        Some(file_name),
        color_space,
        wrap,
    ))
}

/// Packs occlusion (red of `ao`), roughness (green of `roughness`) and
/// metalness (blue of `metalness`) into one ARM image the size of `ao`.
pub fn pack_arm(ao: &DynamicImage, roughness: &DynamicImage, metalness: &DynamicImage) -> DynamicImage {
    let (width, height) = ao.dimensions();
    let fit = |img: &DynamicImage| {
        if img.dimensions() == (width, height) {
            img.to_rgba8()
        } else {
            img.resize_exact(width, height, FilterType::Triangle).to_rgba8()
        }
    };
    let ao = ao.to_rgba8();
    let roughness = fit(roughness);
    let metalness = fit(metalness);
    let packed = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([
            ao.get_pixel(x, y).0[0],
            roughness.get_pixel(x, y).0[1],
            metalness.get_pixel(x, y).0[2],
            255,
        ])
    });
    DynamicImage::ImageRgba8(packed)
}
