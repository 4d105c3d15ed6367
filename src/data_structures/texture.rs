//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture resources,
//! and helper methods for creating depth textures, the shadow atlas, neutral
//! fallback textures and mip-mapped textures from decoded image data.

use anyhow::*;
use image::{GenericImageView, ImageFormat, imageops::FilterType, load_from_memory_with_format};

/// How the texel values of an image are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour data authored for display (albedo maps).
    Srgb,
    /// Data maps: normals, ARM, alpha, height.
    Linear,
}

/// Addressing mode per texture axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureWrap {
    pub u: wgpu::AddressMode,
    pub v: wgpu::AddressMode,
}

impl TextureWrap {
    pub const REPEAT: TextureWrap = TextureWrap {
        u: wgpu::AddressMode::Repeat,
        v: wgpu::AddressMode::Repeat,
    };
    pub const CLAMP: TextureWrap = TextureWrap {
        u: wgpu::AddressMode::ClampToEdge,
        v: wgpu::AddressMode::ClampToEdge,
    };
    /// Repeat horizontally only.
    pub const REPEAT_U: TextureWrap = TextureWrap {
        u: wgpu::AddressMode::Repeat,
        v: wgpu::AddressMode::ClampToEdge,
    };
}

/// A GPU texture with a view and optional sampler.
///
/// Textures are used for colour maps, normal maps, depth, and other data
/// bound to shaders. Typically created via [`from_image`](Self::from_image) or
/// via [`create_depth_texture`](Self::create_depth_texture).
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Create the layered depth texture every shadow-casting light renders into.
    ///
    /// The returned view spans all layers; per-layer render views come from
    /// [`layer_view`](Self::layer_view). The sampler performs depth comparison.
    pub fn create_shadow_atlas(device: &wgpu::Device, size: u32, layers: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow atlas"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow atlas view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        }));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A single-layer render view into an array texture.
    pub fn layer_view(&self, layer: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow layer view"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        })
    }

    /// Create a 1x1 texture of a single colour.
    ///
    /// Used as a neutral default for optional material slots so the shader
    /// never has to branch on a missing map.
    pub fn create_solid(
        rgba: [u8; 4],
        color_space: ColorSpace,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Texture {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba(rgba),
        ));
        Self::upload(device, queue, &img, Some("solid"), color_space, TextureWrap::REPEAT)
    }

    /// Upload an already decoded image with a full mip chain.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        color_space: ColorSpace,
        wrap: TextureWrap,
    ) -> Self {
        Self::upload(device, queue, img, label, color_space, wrap)
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        color_space: ColorSpace,
        wrap: TextureWrap,
    ) -> Self {
        let dimensions = img.dimensions();
        let mip_level_count = mip_level_count(dimensions.0, dimensions.1);

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let format = match color_space {
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut level = img.to_rgba8();
        for mip_level in 0..mip_level_count {
            let (width, height) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level,
                    origin: wgpu::Origin3d::ZERO,
                },
                &level,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
            if mip_level + 1 < mip_level_count {
                level = image::imageops::resize(
                    &level,
                    (width / 2).max(1),
                    (height / 2).max(1),
                    FilterType::Triangle,
                );
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_sampler(device, wrap));

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

pub fn decode(bytes: &[u8], format: Option<&str>) -> Result<image::DynamicImage> {
    let img = match format.and_then(ImageFormat::from_extension) {
        None => image::load_from_memory(bytes)?,
        Some(fmt) => load_from_memory_with_format(bytes, fmt)?,
    };
    Ok(img)
}

pub fn create_sampler(device: &wgpu::Device, wrap: TextureWrap) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wrap.u,
        address_mode_v: wrap.v,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    create_sampler(device, TextureWrap::REPEAT)
}
