//! Scene constants.
//!
//! Every tunable of the phoenix scene lives here as a literal default. Nothing is read from
//! disk or the environment; runtime knobs of the engine itself (clear colour) sit on
//! [`crate::context::Context`] instead.

use cgmath::{Point3, Vector3};

use crate::camera::timeline::{Axis, Tween};

/// Bird model, instancing and playback settings.
#[derive(Clone, Debug)]
pub struct BirdConfig {
    pub model: &'static str,
    pub clip: String,
    pub scale: f32,
    pub positions: [Vector3<f32>; 3],
    /// Delayed start per instance in mixer time units.
    pub start_offsets: [f32; 3],
    pub playback_rate: f32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            model: "models/phoenix_bird/scene.gltf",
            clip: "Take 001".to_string(),
            scale: 0.01,
            positions: [
                Vector3::new(-16.0, 8.0, -4.0),
                Vector3::new(-17.0, 9.0, 3.0),
                Vector3::new(-19.0, 8.0, -9.0),
            ],
            start_offsets: [0.0, 0.2, 0.35],
            playback_rate: 0.5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FloorConfig {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub color_map: &'static str,
    pub displacement_map: &'static str,
    pub alpha_map: &'static str,
    pub displacement_scale: f32,
    pub alpha_cutoff: f32,
    /// Rotation about X in radians.
    pub rotation_x: f32,
    pub position: Vector3<f32>,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 150.0,
            width_segments: 50,
            height_segments: 50,
            color_map: "models/red moutain.jpg",
            displacement_map: "models/mountainDispMap.jpeg",
            alpha_map: "models/mountainAlpha.jpg",
            displacement_scale: 20.0,
            alpha_cutoff: 0.5,
            rotation_x: -std::f32::consts::PI * 0.5,
            position: Vector3::new(0.0, -5.0, 0.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: Vector3<f32>,
    pub directional_target: Point3<f32>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.3,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 0.6,
            directional_position: Vector3::new(20.0, 20.0, -25.0),
            directional_target: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: Point3<f32>,
    pub orbit_target: Point3<f32>,
    pub damping_factor: f32,
    pub flythrough: Vec<Tween>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 100.0,
            position: Point3::new(0.0, 2.0, 70.0),
            orbit_target: Point3::new(0.0, 0.75, 0.0),
            damping_factor: 0.05,
            flythrough: vec![
                Tween::to(&[(Axis::X, -20.0), (Axis::Y, 50.0)], 3.0).at(2.0),
                Tween::to(&[(Axis::Z, -20.0), (Axis::Y, 50.0)], 5.0).at(2.0),
                Tween::to(&[(Axis::Y, 13.0), (Axis::X, 15.0)], 5.0).at(10.0),
                Tween::to(&[(Axis::Z, -25.0), (Axis::X, -40.0)], 5.0).at(15.0),
                Tween::to(&[(Axis::Z, -20.0)], 5.0).at(20.0),
            ],
        }
    }
}

/// Everything the phoenix scene is built from.
#[derive(Clone, Debug, Default)]
pub struct SceneConfig {
    pub birds: BirdConfig,
    pub floor: FloorConfig,
    pub lighting: LightingConfig,
    pub camera: CameraConfig,
}

/// The device pixel ratio is capped at this value when sizing the surface.
pub const MAX_PIXEL_RATIO: f64 = 2.0;
