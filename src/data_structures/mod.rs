//! Engine data structures: models, textures, scene graphs and terrain.
//!
//! - `model` holds GPU meshes and materials plus the draw helpers for them
//! - `texture` wraps GPU textures, depth buffers and the shadow map
//! - `transform` is the translation/rotation/scale of a scene-graph node
//! - `scene_graph` is the arena-backed node hierarchy with skins
//! - `terrain` builds the displaced plane mesh on the CPU

pub mod model;
pub mod scene_graph;
pub mod terrain;
pub mod texture;
pub mod transform;
