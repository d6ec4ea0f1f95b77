//! Damped orbit controls around a target point.
//!
//! Left drag rotates, right drag pans in screen space and the wheel dollies. Input only
//! accumulates deltas; [`OrbitController::update`] integrates a `damping_factor` share of
//! them into the camera every frame and decays the rest, which gives the inertial feel.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::camera::{Camera, Projection};

const EPS: f32 = 0.000001;

/// Spherical coordinates, Y up. `theta` is measured around Y from +Z, `phi` from +Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` off the poles where the look-at basis degenerates.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    Rotate,
    Dolly,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitController {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: Option<Drag>,
    cursor: Option<PhysicalPosition<f64>>,
}

impl OrbitController {
    pub fn new(target: Point3<f32>, damping_factor: f32) -> Self {
        Self {
            target,
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            pan_offset: Vector3::zero(),
            scale: 1.0,
            drag: None,
            cursor: None,
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Queue a rotation from a pointer delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.spherical_delta.theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.spherical_delta.phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Queue a screen-space pan from a pointer delta in pixels.
    pub fn pan(
        &mut self,
        dx: f32,
        dy: f32,
        viewport_height: f32,
        camera: &Camera,
        projection: &Projection,
    ) {
        let height = viewport_height.max(1.0);
        let distance = (camera.position - self.target).magnitude();
        // half of the fov is center to top of screen
        let target_distance = distance * (projection.fovy().0 / 2.0).tan();
        let (_, right, up) = camera.basis();
        let left = 2.0 * dx * target_distance / height * self.pan_speed;
        let upward = 2.0 * dy * target_distance / height * self.pan_speed;
        self.pan_offset += -right * left + up * upward;
    }

    /// Positive notches move towards the target.
    pub fn dolly(&mut self, notches: f32) {
        if notches > 0.0 {
            self.scale *= self.zoom_scale().powf(notches);
        } else if notches < 0.0 {
            self.scale /= self.zoom_scale().powf(-notches);
        }
    }

    /// Drop pending motion and any drag in progress.
    pub fn reset_motion(&mut self) {
        self.spherical_delta = Spherical::default();
        self.pan_offset = Vector3::zero();
        self.scale = 1.0;
        self.drag = None;
    }

    pub fn is_settled(&self) -> bool {
        self.spherical_delta.theta.abs() < EPS
            && self.spherical_delta.phi.abs() < EPS
            && self.pan_offset.magnitude2() < EPS * EPS
            && (self.scale - 1.0).abs() < EPS
    }

    /// Feed a window event. Returns `true` if the event was used.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        projection: &Projection,
        viewport_height: f32,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => self.drag = Some(Drag::Rotate),
                    (MouseButton::Middle, ElementState::Pressed) => self.drag = Some(Drag::Dolly),
                    (MouseButton::Right, ElementState::Pressed) => self.drag = Some(Drag::Pan),
                    (_, ElementState::Released) => self.drag = None,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position);
                match (self.drag, previous) {
                    (Some(drag), Some(previous)) => {
                        let dx = (position.x - previous.x) as f32;
                        let dy = (position.y - previous.y) as f32;
                        match drag {
                            Drag::Rotate => self.rotate(dx, dy, viewport_height),
                            // one zoom step per move, dragging up moves closer
                            Drag::Dolly if dy != 0.0 => self.dolly(-dy.signum()),
                            Drag::Dolly => (),
                            Drag::Pan => self.pan(dx, dy, viewport_height, camera, projection),
                        }
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 100.0) as f32,
                };
                self.dolly(notches);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.drag = None;
                self.cursor = None;
                false
            }
            _ => false,
        }
    }

    /// Integrate pending motion into `camera` and aim it at the target.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * share;
        spherical.phi += self.spherical_delta.phi * share;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * share;

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (OrbitController, Camera) {
        let controller = OrbitController::new(Point3::new(0.0, 0.75, 0.0), 0.05);
        let camera = Camera::new((0.0, 2.0, 70.0), (0.0, 0.75, 0.0));
        (controller, camera)
    }

    #[test]
    fn spherical_round_trips_offset() {
        let offset = Vector3::new(3.0, -4.0, 12.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-4);
    }

    #[test]
    fn update_without_input_keeps_pose_and_aims_at_target() {
        let (mut controller, mut camera) = setup();
        let before = camera.position;
        controller.update(&mut camera);
        assert!((camera.position - before).magnitude() < 1e-3);
        assert_eq!(camera.target, controller.target);
    }

    #[test]
    fn rotation_is_damped_and_preserves_distance() {
        let (mut controller, mut camera) = setup();
        let distance = (camera.position - controller.target).magnitude();
        controller.rotate(120.0, 0.0, 600.0);

        controller.update(&mut camera);
        let after_one = camera.position;
        for _ in 0..400 {
            controller.update(&mut camera);
        }
        let settled = camera.position;

        // the first frame only applies a fraction of the total swing
        assert!((after_one - settled).magnitude() > 1.0);
        assert!(controller.is_settled());
        assert!(((settled - controller.target).magnitude() - distance).abs() < 1e-2);
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let (mut controller, mut camera) = setup();
        controller.enable_damping = false;
        controller.rotate(0.0, 100_000.0, 600.0);
        controller.update(&mut camera);
        let spherical = Spherical::from_offset(camera.position - controller.target);
        assert!(spherical.phi >= EPS * 0.5);
        assert!(spherical.phi <= PI);
    }

    #[test]
    fn wheel_up_moves_closer() {
        let (mut controller, mut camera) = setup();
        let distance = (camera.position - controller.target).magnitude();
        controller.dolly(1.0);
        controller.update(&mut camera);
        let after = (camera.position - controller.target).magnitude();
        assert!((after - distance * 0.95).abs() < 1e-3);
    }

    #[test]
    fn middle_drag_dollies() {
        let (mut controller, mut camera) = setup();
        controller.enable_damping = false;
        let projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
        let distance = (camera.position - controller.target).magnitude();
        let device_id = winit::event::DeviceId::dummy();
        let moved = |y: f64| WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(10.0, y),
        };
        let press = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Middle,
        };

        controller.handle_window_event(&moved(300.0), &camera, &projection, 600.0);
        assert!(controller.handle_window_event(&press, &camera, &projection, 600.0));
        assert!(controller.handle_window_event(&moved(280.0), &camera, &projection, 600.0));
        controller.update(&mut camera);

        let target = controller.target;
        let after = (camera.position - target).magnitude();
        assert!((after - distance * 0.95).abs() < 1e-3);
        // the target does not move, so this was no pan
        assert_eq!(target, Point3::new(0.0, 0.75, 0.0));
    }

    #[test]
    fn drag_requires_a_pressed_button() {
        let (mut controller, camera) = setup();
        let projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);
        let moved = |x: f64| WindowEvent::CursorMoved {
            device_id: winit::event::DeviceId::dummy(),
            position: PhysicalPosition::new(x, 10.0),
        };
        assert!(!controller.handle_window_event(&moved(0.0), &camera, &projection, 600.0));
        assert!(!controller.handle_window_event(&moved(50.0), &camera, &projection, 600.0));
        assert!(controller.is_settled());
    }
}
