//! A hand-built skinned glTF asset: one triangle, two joints and a "Take 001" clip.

use cgmath::{Matrix4, SquareMatrix};

const FRAC_1_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// One skinned triangle with two joints and a "Take 001" clip turning the wing joint
/// 90° about Z over one second.
pub fn binary_chunk() -> Vec<u8> {
    let mut bin = Vec::new();
    // 0: positions
    bin.extend_from_slice(bytemuck::cast_slice(&[
        0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
    ]));
    // 36: joints
    bin.extend_from_slice(&[0u8, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0]);
    // 48: weights
    bin.extend_from_slice(bytemuck::cast_slice(&[
        1.0f32, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0,
    ]));
    // 96: indices, padded to 104
    bin.extend_from_slice(bytemuck::cast_slice(&[0u16, 1, 2, 0]));
    // 104: inverse bind matrices
    let identity: [[f32; 4]; 4] = Matrix4::identity().into();
    let wing: [[f32; 4]; 4] =
        Matrix4::from_translation(cgmath::Vector3::new(0.0, -1.0, 0.0)).into();
    bin.extend_from_slice(bytemuck::cast_slice(&[identity, wing]));
    // 232: keyframe times
    bin.extend_from_slice(bytemuck::cast_slice(&[0.0f32, 1.0]));
    // 240: rotations
    bin.extend_from_slice(bytemuck::cast_slice(&[
        0.0f32,
        0.0,
        0.0,
        1.0,
        0.0,
        0.0,
        FRAC_1_SQRT_2,
        FRAC_1_SQRT_2,
    ]));
    assert_eq!(bin.len(), 272);
    bin
}

pub fn document(buffer: &str) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "Armature", "children": [1, 3] }},
    {{ "name": "root_joint", "children": [2] }},
    {{ "name": "wing_joint", "translation": [0.0, 1.0, 0.0] }},
    {{ "name": "body", "mesh": 0, "skin": 0 }}
  ],
  "skins": [{{ "inverseBindMatrices": 4, "joints": [1, 2] }}],
  "meshes": [{{
    "name": "phoenix",
    "primitives": [{{ "attributes": {{ "POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2 }}, "indices": 3 }}]
  }}],
  "animations": [{{
    "name": "Take 001",
    "samplers": [{{ "input": 5, "output": 6, "interpolation": "LINEAR" }}],
    "channels": [{{ "sampler": 0, "target": {{ "node": 2, "path": "rotation" }} }}]
  }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5121, "count": 3, "type": "VEC4" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4" }},
    {{ "bufferView": 3, "componentType": 5123, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 4, "componentType": 5126, "count": 2, "type": "MAT4" }},
    {{ "bufferView": 5, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 6, "componentType": 5126, "count": 2, "type": "VEC4" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 12 }},
    {{ "buffer": 0, "byteOffset": 48, "byteLength": 48 }},
    {{ "buffer": 0, "byteOffset": 96, "byteLength": 6 }},
    {{ "buffer": 0, "byteOffset": 104, "byteLength": 128 }},
    {{ "buffer": 0, "byteOffset": 232, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 240, "byteLength": 32 }}
  ],
  "buffers": [{buffer}]
}}"#
    )
}

pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(bin);
    out
}

/// The asset as a GLB with its buffer embedded.
pub fn phoenix_glb() -> Vec<u8> {
    glb(&document(r#"{ "byteLength": 272 }"#), &binary_chunk())
}

/// Write the GLB below `./assets`, where the native loader reads assets from.
#[allow(dead_code)]
pub fn install(asset_path: &str) -> std::io::Result<()> {
    let path = std::path::Path::new("./assets").join(asset_path);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, phoenix_glb())
}
