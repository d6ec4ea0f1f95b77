use wgpu::util::DeviceExt;

use crate::data_structures::model::{self, SkinnedVertex};

/// A triangle list read from one glTF primitive, not yet on the GPU.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
    /// glTF material index, `None` for the default material.
    pub material: Option<usize>,
}

/// Weights are renormalised; vertices without any weight are bound to joint 0.
fn normalize_weights(weights: [f32; 4]) -> [f32; 4] {
    let sum: f32 = weights.iter().sum();
    if sum <= f32::EPSILON {
        return [1.0, 0.0, 0.0, 0.0];
    }
    weights.map(|w| w / sum)
}

pub fn read_primitive(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
) -> Option<MeshData> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!(
            "{name}: primitive {} uses {:?}, only triangle lists are drawn",
            primitive.index(),
            primitive.mode()
        );
        return None;
    }
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let Some(positions) = reader.read_positions() else {
        log::warn!("{name}: primitive {} has no positions", primitive.index());
        return None;
    };
    let mut vertices: Vec<SkinnedVertex> = positions
        .map(|position| SkinnedVertex::rigid(position, [0.0; 2], [0.0, 0.0, 1.0]))
        .collect();

    match reader.read_normals() {
        Some(normals) => vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal),
        None => log::warn!("{name}: no normals, lighting will be flat"),
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
    }
    if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
        vertices
            .iter_mut()
            .zip(joints.into_u16().zip(weights.into_f32()))
            .for_each(|(vertex, (joints, weights))| {
                vertex.joints = joints.map(u32::from);
                vertex.weights = normalize_weights(weights);
            });
    }

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    Some(MeshData {
        name: name.to_string(),
        vertices,
        indices,
        material: primitive.material().index(),
    })
}

pub fn upload_meshes(
    device: &wgpu::Device,
    meshes: &[MeshData],
    default_material: usize,
) -> Vec<model::Mesh> {
    meshes
        .iter()
        .map(|mesh| {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            model::Mesh {
                name: mesh.name.clone(),
                vertex_buffer,
                index_buffer,
                num_elements: mesh.indices.len() as u32,
                material: mesh.material.unwrap_or(default_material),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_renormalised() {
        assert_eq!(normalize_weights([0.0; 4]), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(normalize_weights([2.0, 2.0, 0.0, 0.0]), [0.5, 0.5, 0.0, 0.0]);
    }
}
