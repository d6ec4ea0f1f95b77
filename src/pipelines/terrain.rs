use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub fn shader() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Terrain Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("terrain.wgsl").into()),
    }
}

/// `tint` is linear RGB. `params.x` is the alpha cutoff, `params.y` 1 when the floor
/// receives shadows.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub params: [f32; 4],
}

impl TerrainUniform {
    pub fn new(model: Matrix4<f32>, tint: [f32; 3], alpha_cutoff: f32, receive_shadow: bool) -> Self {
        Self {
            model: model.into(),
            tint: [tint[0], tint[1], tint[2], 1.0],
            params: [
                alpha_cutoff,
                if receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

/// Colour map, alpha map and uniform of the floor.
#[derive(Debug)]
pub struct TerrainBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl TerrainBinding {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        color: &Texture,
        alpha: &Texture,
        uniform: TerrainUniform,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&alpha.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&color.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some("terrain_bind_group"),
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &TerrainUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(std::slice::from_ref(uniform)));
    }
}
