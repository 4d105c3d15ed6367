//! haunted-house
//!
//! A haunted-house diorama rendered with wgpu on native and WASM: a displaced
//! sandy ground, a house with a roof, a door and bushes, a randomly scattered
//! grave field, three ghost lights orbiting the house, an analytic sky and
//! exponential fog.
//!
//! High-level modules
//! - `camera`: perspective camera, viewport and damped orbit controls
//! - `color`: colour parsing and sRGB conversion
//! - `config`: scene configuration and its environment overrides
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (geometry, meshes, instances, textures)
//! - `flow`: the frame loop and the scene lifecycle hooks
//! - `pipelines`: standard, transparent, shadow and sky pipelines plus lights
//! - `resources`: helpers to load textures and create GPU resources
//! - `render`: render composition for efficient pipeline reuse
//! - `scene`: the haunted house scene and its animation
//! - `timer`: the frame timer
//!

pub mod camera;
pub mod color;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod timer;

use config::SceneConfig;
use flow::{FlowConstructor, GraphicsFlow};
use scene::HauntedHouse;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Builds the haunted house and runs it until the window closes.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    let house: FlowConstructor = Box::new(move |init| {
        Box::pin(async move {
            let house = HauntedHouse::new(init, config).await?;
            Ok(Box::new(house) as Box<dyn GraphicsFlow>)
        })
    });
    flow::run(vec![house])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(SceneConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
