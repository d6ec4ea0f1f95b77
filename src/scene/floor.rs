//! The displaced mountain floor.

use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::{
    config::FloorConfig,
    context::InitContext,
    data_structures::{
        terrain::{Heightmap, PlaneGeometry},
        texture::Texture,
    },
    pipelines::terrain::{TerrainBinding, TerrainUniform},
    render::{Render, TerrainDraw},
    resources::texture::{load_image, load_texture},
};

#[derive(Debug)]
pub struct Floor {
    geometry: PlaneGeometry,
    heightmap: Option<Heightmap>,
    uniform: TerrainUniform,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    binding: TerrainBinding,
}

async fn texture_or_white(init: &InitContext, file_name: &str, linear: bool) -> Texture {
    match load_texture(file_name, linear, &init.device, &init.queue).await {
        Ok(texture) => texture,
        Err(e) => {
            log::warn!("{file_name}: {e:#}, using plain white");
            Texture::solid_colour(&init.device, &init.queue, [255; 4], file_name)
        }
    }
}

/// sRGB byte to linear intensity.
pub fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl Floor {
    pub async fn new(init: &InitContext, config: &FloorConfig) -> Self {
        let color = texture_or_white(init, config.color_map, false).await;
        let alpha = texture_or_white(init, config.alpha_map, true).await;
        let heightmap = match load_image(config.displacement_map)
            .await
            .and_then(|img| Heightmap::from_image(&img))
        {
            Ok(map) => Some(map),
            Err(e) => {
                log::warn!("{}: {e:#}, the floor stays flat", config.displacement_map);
                None
            }
        };

        let geometry = PlaneGeometry::new(
            config.width,
            config.height,
            config.width_segments,
            config.height_segments,
        );
        let vertices = geometry.displaced_vertices(heightmap.as_ref(), config.displacement_scale);
        let vertex_buffer = init.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Floor Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = init.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Floor Index Buffer"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let model = Matrix4::from_translation(config.position)
            * Matrix4::from_angle_x(cgmath::Rad(config.rotation_x));
        let uniform = TerrainUniform::new(model, [1.0; 3], config.alpha_cutoff, true);
        let binding =
            TerrainBinding::new(&init.device, &init.layouts.terrain, &color, &alpha, uniform);
        log::info!(
            "floor: {} vertices, displacement scale {}",
            geometry.vertex_count(),
            config.displacement_scale
        );

        Self {
            num_indices: geometry.indices.len() as u32,
            geometry,
            heightmap,
            uniform,
            vertex_buffer,
            index_buffer,
            binding,
        }
    }

    pub fn set_displacement_scale(&self, queue: &wgpu::Queue, scale: f32) {
        let vertices = self.geometry.displaced_vertices(self.heightmap.as_ref(), scale);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
    }

    pub fn set_tint(&mut self, queue: &wgpu::Queue, rgb: [u8; 3]) {
        let [r, g, b] = rgb.map(srgb_to_linear);
        self.uniform.tint = [r, g, b, 1.0];
        self.binding.write(queue, &self.uniform);
    }

    pub fn render(&self) -> Render<'_> {
        Render::Terrain(TerrainDraw {
            vertex: &self.vertex_buffer,
            index: &self.index_buffer,
            group: &self.binding.bind_group,
            amount: self.num_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints_and_midtones() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(128) - 0.2158).abs() < 1e-3);
    }
}
