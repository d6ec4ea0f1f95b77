use cgmath::{InnerSpace, Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX, config::LightingConfig, data_structures::texture::Texture,
    pipelines::Layouts,
};

/// Orthographic frustum the directional light renders its shadow map with.
///
/// The bounds are taken as-is; `left > right` mirrors the frustum horizontally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCamera {
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub map_size: u32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            near: 10.0,
            far: 50.0,
            left: 50.0,
            right: 1.0,
            top: 20.0,
            bottom: -7.0,
            map_size: 812,
        }
    }
}

impl ShadowCamera {
    pub fn view_proj(&self, position: Point3<f32>, target: Point3<f32>) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(position, target, Vector3::unit_y());
        let proj = cgmath::ortho(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        );
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

/// Ambient term plus the single shadow-casting directional light.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLights {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub shadow: ShadowCamera,
}

impl SceneLights {
    pub fn from_config(config: &LightingConfig) -> Self {
        let p = config.directional_position;
        Self {
            ambient_color: config.ambient_color,
            ambient_intensity: config.ambient_intensity,
            color: config.directional_color,
            intensity: config.directional_intensity,
            position: Point3::new(p.x, p.y, p.z),
            target: config.directional_target,
            shadow: ShadowCamera::default(),
        }
    }

    pub fn to_uniform(&self) -> LightUniform {
        let direction = (self.position - self.target).normalize();
        let scale = |c: [f32; 3], i: f32| [c[0] * i, c[1] * i, c[2] * i, 1.0];
        LightUniform {
            ambient: scale(self.ambient_color, self.ambient_intensity),
            color: scale(self.color, self.intensity),
            direction: [direction.x, direction.y, direction.z, 0.0],
            view_proj: self.shadow.view_proj(self.position, self.target).into(),
            shadow: [1.0 / self.shadow.map_size as f32, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for SceneLights {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}

/// `ambient` and `color` are premultiplied by their intensity; `direction` points towards
/// the light; `shadow.x` is the size of one shadow map texel in UV units.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub color: [f32; 4],
    pub direction: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub shadow: [f32; 4],
}

#[derive(Debug)]
pub struct LightResources {
    pub lights: SceneLights,
    pub buffer: wgpu::Buffer,
    pub shadow_map: Texture,
    /// Main pass: uniform, shadow map and comparison sampler.
    pub bind_group: wgpu::BindGroup,
    /// Shadow pass: uniform only, since the map is the render target there.
    pub shadow_bind_group: wgpu::BindGroup,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, layouts: &Layouts, lights: SceneLights) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniform Buffer"),
            contents: bytemuck::cast_slice(&[lights.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_map = Texture::create_shadow_map(device, lights.shadow.map_size);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.light,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
            label: Some("light_bind_group"),
        });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.shadow,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });

        Self {
            lights,
            buffer,
            shadow_map,
            bind_group,
            shadow_bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.lights.to_uniform()]));
    }
}
