//! Texture sets of every surface in the diorama.

use crate::{
    color::Rgb,
    data_structures::texture::TextureWrap,
    resources::{ArmSource, MaterialDesc},
};

pub const FLOOR_DISPLACEMENT: &str = "floor/coast_sand_rocks_02_1k/coast_sand_rocks_02_disp_1k.webp";
pub const DOOR_HEIGHT: &str = "door/height.jpg";

pub fn floor() -> MaterialDesc {
    MaterialDesc {
        name: "floor",
        albedo: "floor/coast_sand_rocks_02_1k/coast_sand_rocks_02_diff_1k.webp",
        arm: ArmSource::Packed("floor/coast_sand_rocks_02_1k/coast_sand_rocks_02_arm_1k.webp"),
        normal: "floor/coast_sand_rocks_02_1k/coast_sand_rocks_02_nor_gl_1k.webp",
        alpha: Some("floor/alpha.webp"),
        repeat: [8.0, 8.0],
        wrap: TextureWrap::REPEAT,
        tint: Rgb::WHITE,
        transparent: true,
    }
}

pub fn walls() -> MaterialDesc {
    MaterialDesc {
        name: "walls",
        albedo: "walls/castle_brick_broken_06_1k/castle_brick_broken_06_diff_1k.jpg",
        arm: ArmSource::Packed("walls/castle_brick_broken_06_1k/castle_brick_broken_06_arm_1k.jpg"),
        normal: "walls/castle_brick_broken_06_1k/castle_brick_broken_06_nor_gl_1k.jpg",
        alpha: None,
        repeat: [1.0, 1.0],
        wrap: TextureWrap::CLAMP,
        tint: Rgb::WHITE,
        transparent: false,
    }
}

pub fn roof() -> MaterialDesc {
    MaterialDesc {
        name: "roof",
        albedo: "roof/roof_slates_02_1k/roof_slates_02_diff_1k.jpg",
        arm: ArmSource::Packed("roof/roof_slates_02_1k/roof_slates_02_arm_1k.webp"),
        normal: "roof/roof_slates_02_1k/roof_slates_02_nor_gl_1k.webp",
        alpha: None,
        repeat: [3.0, 1.0],
        wrap: TextureWrap::REPEAT_U,
        tint: Rgb::WHITE,
        transparent: false,
    }
}

pub fn door() -> MaterialDesc {
    MaterialDesc {
        name: "door",
        albedo: "door/color.jpg",
        arm: ArmSource::Separate {
            ao: "door/ambientOcclusion.jpg",
            roughness: "door/roughness.jpg",
            metalness: "door/metalness.jpg",
        },
        normal: "door/normal.jpg",
        alpha: Some("door/alpha.jpg"),
        repeat: [1.0, 1.0],
        wrap: TextureWrap::CLAMP,
        tint: Rgb::WHITE,
        transparent: true,
    }
}

pub fn bushes() -> anyhow::Result<MaterialDesc> {
    Ok(MaterialDesc {
        name: "bushes",
        albedo: "bushes/leaves_forest_ground_1k/leaves_forest_ground_diff_1k.webp",
        arm: ArmSource::Packed("bushes/leaves_forest_ground_1k/leaves_forest_ground_arm_1k.webp"),
        normal: "bushes/leaves_forest_ground_1k/leaves_forest_ground_nor_gl_1k.webp",
        alpha: None,
        repeat: [2.0, 1.0],
        wrap: TextureWrap::REPEAT_U,
        tint: Rgb::from_hex("#ccffcc")?,
        transparent: false,
    })
}

pub fn graves() -> anyhow::Result<MaterialDesc> {
    Ok(MaterialDesc {
        name: "graves",
        albedo: "graves/plastered_stone_wall_1k/plastered_stone_wall_diff_1k.jpg",
        arm: ArmSource::Packed("graves/plastered_stone_wall_1k/plastered_stone_wall_arm_1k.webp"),
        normal: "graves/plastered_stone_wall_1k/plastered_stone_wall_nor_gl_1k.jpg",
        alpha: None,
        repeat: [0.3, 0.4],
        wrap: TextureWrap::CLAMP,
        tint: Rgb::from_hex("grey")?,
        transparent: false,
    })
}
