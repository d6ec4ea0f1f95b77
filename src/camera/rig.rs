use cgmath::{Deg, Point3};
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, Projection, orbit::OrbitController, timeline::Timeline},
    config::CameraConfig,
};

/// Which writer currently moves the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraOwner {
    Flythrough,
    Orbit,
}

/// Owns the camera pose and hands it from the scripted flythrough to the orbit controller
/// once the flythrough has finished. The hand-over is one-way.
#[derive(Debug)]
pub struct CameraRig {
    pub camera: Camera,
    pub orbit: OrbitController,
    timeline: Timeline,
    owner: CameraOwner,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, look_at: Point3<f32>) -> Self {
        Self {
            camera: Camera::new(config.position, look_at),
            orbit: OrbitController::new(config.orbit_target, config.damping_factor),
            timeline: Timeline::new(config.flythrough.clone()),
            owner: CameraOwner::Flythrough,
        }
    }

    pub fn projection(config: &CameraConfig, width: u32, height: u32) -> Projection {
        Projection::new(
            width,
            height,
            Deg(config.fovy_degrees),
            config.znear,
            config.zfar,
        )
    }

    pub fn owner(&self) -> CameraOwner {
        self.owner
    }

    pub fn update(&mut self, dt: f32) {
        match self.owner {
            CameraOwner::Flythrough => {
                self.timeline.advance(dt, &mut self.camera.position);
                self.camera.look_at(self.orbit.target);
                if self.timeline.is_complete() {
                    self.orbit.reset_motion();
                    self.owner = CameraOwner::Orbit;
                    log::info!(
                        "flythrough finished at {:?}, orbit controls take over",
                        self.camera.position
                    );
                }
            }
            CameraOwner::Orbit => self.orbit.update(&mut self.camera),
        }
    }

    /// Pointer input is dropped while the flythrough runs.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        projection: &Projection,
        viewport_height: f32,
    ) -> bool {
        match self.owner {
            CameraOwner::Flythrough => false,
            CameraOwner::Orbit => {
                self.orbit
                    .handle_window_event(event, &self.camera, projection, viewport_height)
            }
        }
    }
}
