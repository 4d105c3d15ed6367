//! The haunted house itself.
//!
//! - `assembler`: builds the scene graph, lights and sky once and animates the lights
//! - `graves`: random grave placement
//! - `ghosts`: orbiting ghost lights and the flickering door light
//! - `materials`: texture sets of every surface
//! - `tuning`: keyboard tuning of the floor displacement

pub mod assembler;
pub mod ghosts;
pub mod graves;
pub mod materials;
pub mod tuning;

pub use assembler::HauntedHouse;
