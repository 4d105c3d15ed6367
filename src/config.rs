//! Scene configuration.
//!
//! Everything has a sensible default; a couple of knobs can be overridden via
//! environment variables so the binary stays argument-free.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use crate::{
    data_structures::texture::TextureWrap, resources::mesh::DisplacementMap,
    scene::graves::GRAVE_COUNT,
};

pub const ASSETS_ENV: &str = "HAUNTED_HOUSE_ASSETS";
pub const SEED_ENV: &str = "HAUNTED_HOUSE_SEED";
pub const FLOOR_SCALE_ENV: &str = "HAUNTED_HOUSE_FLOOR_DISPLACEMENT_SCALE";
pub const FLOOR_BIAS_ENV: &str = "HAUNTED_HOUSE_FLOOR_DISPLACEMENT_BIAS";
pub const DOOR_SCALE_ENV: &str = "HAUNTED_HOUSE_DOOR_DISPLACEMENT_SCALE";
pub const DOOR_BIAS_ENV: &str = "HAUNTED_HOUSE_DOOR_DISPLACEMENT_BIAS";

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Directory (native) or URL path segment (web) the textures are fetched from.
    pub asset_root: String,
    /// Seed for grave placement and the door-light flicker. `None` draws from entropy.
    pub seed: Option<u64>,
    pub grave_count: usize,
    pub floor_displacement: DisplacementMap,
    pub door_displacement: DisplacementMap,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            seed: None,
            grave_count: GRAVE_COUNT,
            floor_displacement: DisplacementMap {
                scale: 0.3,
                bias: -0.128,
                repeat: [8.0, 8.0],
                wrap: TextureWrap::REPEAT,
            },
            door_displacement: DisplacementMap {
                scale: 0.15,
                bias: -0.04,
                repeat: [1.0, 1.0],
                wrap: TextureWrap::CLAMP,
            },
        }
    }
}

impl SceneConfig {
    /// Defaults, overridden by the `HAUNTED_HOUSE_*` variables that are set.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(ASSETS_ENV).filter(|root| !root.trim().is_empty()) {
            config.asset_root = root.trim().to_string();
        }
        if let Some(seed) = parse_var(&lookup, SEED_ENV) {
            config.seed = Some(seed);
        }

        let displacements = [
            (&mut config.floor_displacement, FLOOR_SCALE_ENV, FLOOR_BIAS_ENV),
            (&mut config.door_displacement, DOOR_SCALE_ENV, DOOR_BIAS_ENV),
        ];
        for (map, scale_key, bias_key) in displacements {
            if let Some(scale) = parse_in_range(&lookup, scale_key, DisplacementMap::SCALE_RANGE) {
                map.scale = scale;
            }
            if let Some(bias) = parse_in_range(&lookup, bias_key, DisplacementMap::BIAS_RANGE) {
                map.bias = bias;
            }
        }
        config
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring {key}={raw:?}: {e}");
            None
        }
    }
}

fn parse_in_range(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    range: RangeInclusive<f32>,
) -> Option<f32> {
    let value = parse_var::<f32>(lookup, key)?;
    if range.contains(&value) {
        Some(value)
    } else {
        log::warn!(
            "Ignoring {key}={value}: outside {}..={}",
            range.start(),
            range.end()
        );
        None
    }
}
