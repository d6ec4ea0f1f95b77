//! Terrain mesh: a segmented plane displaced by a heightmap.
//!
//! The plane lies in its local XY plane facing +Z, the same vertex order, UVs and winding
//! as three.js' `PlaneGeometry`. Displacement moves vertices along +Z only.

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::Vertex;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for TerrainVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Undisplaced positions.
    pub positions: Vec<Vector3<f32>>,
    /// `v` grows upwards, as in three.js.
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl PlaneGeometry {
    pub fn new(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let grid_x1 = grid_x + 1;
        let grid_y1 = grid_y + 1;
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let mut positions = Vec::with_capacity((grid_x1 * grid_y1) as usize);
        let mut uvs = Vec::with_capacity((grid_x1 * grid_y1) as usize);
        for iy in 0..grid_y1 {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..grid_x1 {
                let x = ix as f32 * segment_width - width / 2.0;
                positions.push(Vector3::new(x, -y, 0.0));
                uvs.push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
            }
        }

        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + grid_x1 * iy;
                let b = ix + grid_x1 * (iy + 1);
                let c = (ix + 1) + grid_x1 * (iy + 1);
                let d = (ix + 1) + grid_x1 * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            width,
            height,
            width_segments: grid_x,
            height_segments: grid_y,
            positions,
            uvs,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertices displaced by `heightmap * scale` with normals rebuilt from the new surface.
    pub fn displaced_vertices(&self, heightmap: Option<&Heightmap>, scale: f32) -> Vec<TerrainVertex> {
        let positions: Vec<Vector3<f32>> = self
            .positions
            .iter()
            .zip(&self.uvs)
            .map(|(p, uv)| {
                let height = heightmap.map_or(0.0, |map| map.sample(uv[0], uv[1]));
                Vector3::new(p.x, p.y, p.z + height * scale)
            })
            .collect();
        let normals = compute_normals(&positions, &self.indices);

        positions
            .iter()
            .zip(&self.uvs)
            .zip(normals)
            .map(|((p, uv), n)| TerrainVertex {
                position: (*p).into(),
                // images are stored top row first
                tex_coords: [uv[0], 1.0 - uv[1]],
                normal: n.into(),
            })
            .collect()
    }
}

fn compute_normals(positions: &[Vector3<f32>], indices: &[u32]) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::new(0.0, 0.0, 0.0); positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                n.normalize()
            } else {
                Vector3::unit_z()
            }
        })
        .collect()
}

/// Grey-scale height samples in `[0, 1]`, read from an image's red channel.
#[derive(Clone, Debug)]
pub struct Heightmap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl Heightmap {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> anyhow::Result<Self> {
        if width == 0 || height == 0 || values.len() != (width * height) as usize {
            anyhow::bail!(
                "heightmap of {width}x{height} needs {} samples, got {}",
                width * height,
                values.len()
            );
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn from_image(img: &image::DynamicImage) -> anyhow::Result<Self> {
        let rgba = img.to_rgba8();
        let values = rgba.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        Self::new(rgba.width(), rgba.height(), values)
    }

    fn texel(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.values[(y * self.width + x) as usize]
    }

    /// Bilinear sample with edge clamping. `v = 1` is the top row of the image.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.texel(x0, y0) * (1.0 - fx) + self.texel(x0 + 1, y0) * fx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - fx) + self.texel(x0 + 1, y0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_one_vertex_per_grid_corner() {
        let plane = PlaneGeometry::new(150.0, 150.0, 50, 50);
        assert_eq!(plane.vertex_count(), 2601);
        assert_eq!(plane.indices.len(), 50 * 50 * 6);
        assert_eq!(plane.positions[0], Vector3::new(-75.0, 75.0, 0.0));
        assert_eq!(plane.uvs[0], [0.0, 1.0]);
        assert_eq!(plane.positions[2600], Vector3::new(75.0, -75.0, 0.0));
    }

    #[test]
    fn flat_plane_faces_positive_z() {
        let plane = PlaneGeometry::new(10.0, 10.0, 2, 2);
        for vertex in plane.displaced_vertices(None, 20.0) {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
            assert_eq!(vertex.position[2], 0.0);
        }
    }

    #[test]
    fn displacement_only_moves_along_the_normal() {
        let plane = PlaneGeometry::new(150.0, 150.0, 50, 50);
        let values = (0..16).map(|i| i as f32 / 15.0).collect();
        let map = Heightmap::new(4, 4, values).unwrap();

        let flat = plane.displaced_vertices(Some(&map), 0.0);
        let displaced = plane.displaced_vertices(Some(&map), 20.0);
        let mut moved = 0;
        for (a, b) in flat.iter().zip(&displaced) {
            assert_eq!(a.position[0], b.position[0]);
            assert_eq!(a.position[1], b.position[1]);
            assert!(b.position[2] >= 0.0 && b.position[2] <= 20.0);
            if b.position[2] > 0.0 {
                moved += 1;
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn heightmap_sampling_is_bilinear_and_flipped() {
        // top row black, bottom row white
        let map = Heightmap::new(1, 2, vec![0.0, 1.0]).unwrap();
        assert_eq!(map.sample(0.5, 1.0), 0.0);
        assert_eq!(map.sample(0.5, 0.0), 1.0);
        assert!((map.sample(0.5, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn heightmap_rejects_mismatched_samples() {
        assert!(Heightmap::new(2, 2, vec![0.0; 3]).is_err());
    }
}
