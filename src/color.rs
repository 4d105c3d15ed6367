//! Colour parsing and colour-space conversion.
//!
//! Scene colours are authored as sRGB hex strings (`#86cdff`) or a handful of
//! CSS names. Shaders light in linear space, so everything that reaches a
//! uniform buffer goes through [`Rgb::from_hex`] first.

use anyhow::{Context, bail};

/// A linear-space RGB triple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `#rgb` or a CSS colour name and convert it to linear space.
    pub fn from_hex(code: &str) -> anyhow::Result<Self> {
        let code = code.trim();
        let hex = match code.to_ascii_lowercase().as_str() {
            "grey" | "gray" => "808080".to_string(),
            "white" => "ffffff".to_string(),
            "black" => "000000".to_string(),
            "red" => "ff0000".to_string(),
            other => match other.strip_prefix('#') {
                // lengths below are byte counts
                Some(hex) if !hex.is_ascii() => bail!("non-ASCII digits in colour '{code}'"),
                Some(hex) if hex.len() == 6 => hex.to_string(),
                // shorthand: every digit is doubled
                Some(hex) if hex.len() == 3 => hex.chars().flat_map(|c| [c, c]).collect(),
                _ => bail!("unsupported colour '{code}'"),
            },
        };
        let channel = |idx: usize| -> anyhow::Result<f32> {
            let byte = u8::from_str_radix(&hex[idx..idx + 2], 16)
                .with_context(|| format!("invalid hex digits in colour '{code}'"))?;
            Ok(srgb_to_linear(byte as f32 / 255.0))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        c.to_array()
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
