//! Camera types, viewport sizing and the uniforms uploaded for view/projection.
//!
//! - `orbit` holds the damped, pointer driven orbit controller
//! - `timeline` holds the scripted flythrough tweens
//! - `rig` arbitrates which of the two currently moves the camera

pub mod orbit;
pub mod rig;
pub mod timeline;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::config::MAX_PIXEL_RATIO;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A look-at camera: a position aimed at a target point, Y up.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        // A camera sitting exactly on its target has no direction; nudge it so the matrix stays finite.
        let target = if (self.target - self.position).magnitude2() < f32::EPSILON {
            self.position + Vector3::new(0.0, 0.0, -1.0)
        } else {
            self.target
        };
        Matrix4::look_at_rh(self.position, target, Vector3::unit_y())
    }

    /// Unit vectors (forward, right, up) of the current view.
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position).normalize();
        let mut right = forward.cross(Vector3::unit_y());
        if right.magnitude2() < f32::EPSILON {
            right = Vector3::unit_x();
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize();
        (forward, right, up)
    }
}

/// Perspective projection. `aspect` follows the logical viewport size.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Window size in logical pixels plus the device pixel ratio reported by the platform.
///
/// The surface is rendered at `logical * min(ratio, 2)` physical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Build from a physical window size as winit reports it.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(
            width as f64 / scale_factor,
            height as f64 / scale_factor,
            scale_factor,
        )
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height.max(1.0)) as f32
    }

    pub fn effective_pixel_ratio(&self) -> f64 {
        self.pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Surface size in physical pixels, never zero.
    ///
    /// Neither side exceeds `max_dimension` (the device's `max_texture_dimension_2d`). A
    /// larger size is scaled down as a whole, so the aspect ratio stays that of the window.
    pub fn render_size(&self, max_dimension: u32) -> (u32, u32) {
        let ratio = self.effective_pixel_ratio();
        let (width, height) = (self.width * ratio, self.height * ratio);
        let limit = max_dimension.max(1) as f64;
        let fit = (limit / width.max(height)).min(1.0);
        let side = |v: f64| ((v * fit).round() as u32).clamp(1, max_dimension.max(1));
        (side(width), side(height))
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera plus the rig that moves it.
#[derive(Debug)]
pub struct CameraResources {
    pub rig: rig::CameraRig,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        rig: rig::CameraRig,
        projection: &Projection,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&rig.camera, projection);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            rig,
            uniform,
            buffer,
            bind_group,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, projection: &Projection) {
        self.uniform.update_view_proj(&self.rig.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect_and_caps_pixel_ratio() {
        let mut viewport = Viewport::new(800.0, 600.0, 3.0);
        let mut projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 100.0);

        viewport.resize(1920.0, 1080.0);
        let (w, h) = (viewport.width as u32, viewport.height as u32);
        projection.resize(w, h);

        assert!((projection.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert!((viewport.aspect() - projection.aspect()).abs() < 1e-6);
        assert_eq!(viewport.render_size(8192), (3840, 2160));
    }

    #[test]
    fn low_pixel_ratio_is_kept() {
        let viewport = Viewport::new(1000.0, 500.0, 1.5);
        assert_eq!(viewport.render_size(8192), (1500, 750));
    }

    #[test]
    fn physical_size_is_converted_to_logical() {
        let viewport = Viewport::from_physical(2000, 1000, 2.0);
        assert_eq!(viewport.width, 1000.0);
        assert_eq!(viewport.height, 500.0);
        assert_eq!(viewport.render_size(8192), (2000, 1000));
    }

    #[test]
    fn render_size_fits_the_texture_limit() {
        // 1440x900 CSS pixels at ratio 2 under the WebGL2 limit of 2048
        let viewport = Viewport::from_physical(2880, 1800, 2.0);
        assert_eq!(viewport.render_size(2048), (2048, 1280));
        assert_eq!(viewport.render_size(4096), (2880, 1800));

        let tall = Viewport::new(300.0, 1500.0, 2.0);
        assert_eq!(tall.render_size(2048), (410, 2048));
    }

    #[test]
    fn camera_basis_is_orthonormal() {
        let camera = Camera::new((0.0, 2.0, 70.0), (0.0, -5.0, 0.0));
        let (forward, right, up) = camera.basis();
        assert!(forward.dot(right).abs() < 1e-5);
        assert!(forward.dot(up).abs() < 1e-5);
        assert!(up.y > 0.0);
    }
}
