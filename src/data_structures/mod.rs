//! Engine data structures: geometry, models, textures, scene graphs, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `geometry` tessellates planes, boxes, cones and spheres on the CPU
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation and attribute data
//! - `scene_graph` enables hierarchical scene organization

pub mod geometry;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
