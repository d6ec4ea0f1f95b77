//! phoenix-vale
//!
//! A decorative wgpu scene that runs natively and in the browser: a displaced mountain
//! floor under an ambient and a shadow-casting directional light, three skinned phoenix
//! birds flying their looped clip, a scripted camera flythrough that hands over to orbit
//! controls, and a small debug panel for the light and floor.
//!
//! High-level modules
//! - `animation`: keyframe clips and the per-instance mixer that plays them
//! - `camera`: camera, projection, viewport sizing, orbit controls and flythrough
//! - `config`: the constants the scene is built from
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, meshes, materials, textures and terrain geometry
//! - `flow`: flow control, frame clock and the winit event loop
//! - `pipelines`: the skinned, terrain and shadow pipelines plus light resources
//! - `resources`: helpers to load assets, parse glTF and create GPU resources
//! - `render`: render composition and per-pipeline batching
//! - `scene`: the phoenix scene itself
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Open the window (or attach to the `#canvas` element) and run the phoenix scene.
pub fn run_scene() -> anyhow::Result<()> {
    let scene = scene::PhoenixScene::constructor(config::SceneConfig::default());
    flow::run(vec![scene])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    run_scene().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
