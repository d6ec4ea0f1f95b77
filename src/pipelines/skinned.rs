use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

/// Joints per skin the shader can address. Keeps the palette under the 16 KiB uniform
/// limit of WebGL2.
pub const MAX_JOINTS: usize = 128;

pub fn shader() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Skinned Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("skinned.wgsl").into()),
    }
}

pub fn shadow_shader() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
    }
}

/// Joint palette of one drawn mesh. `flags.x` is 1 when the mesh receives shadows.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinUniform {
    pub flags: [f32; 4],
    pub joints: [[[f32; 4]; 4]; MAX_JOINTS],
}

impl SkinUniform {
    pub fn new(joints: &[Matrix4<f32>], receive_shadow: bool) -> Self {
        if joints.len() > MAX_JOINTS {
            log::warn!(
                "skin has {} joints, only the first {MAX_JOINTS} are used",
                joints.len()
            );
        }
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        let mut palette = [identity; MAX_JOINTS];
        for (slot, joint) in palette.iter_mut().zip(joints) {
            *slot = (*joint).into();
        }
        Self {
            flags: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            joints: palette,
        }
    }
}

/// GPU copy of one [`SkinUniform`], rewritten every frame.
#[derive(Debug)]
pub struct SkinBuffer {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl SkinBuffer {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[SkinUniform::new(&[], false)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(label),
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &SkinUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(std::slice::from_ref(uniform)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn palette_is_padded_with_identity() {
        let moved = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let uniform = SkinUniform::new(&[moved], true);
        assert_eq!(uniform.flags[0], 1.0);
        assert_eq!(uniform.joints[0][3], [1.0, 2.0, 3.0, 1.0]);
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        assert_eq!(uniform.joints[1], identity);
        assert_eq!(uniform.joints[MAX_JOINTS - 1], identity);
    }

    #[test]
    fn oversized_skins_are_truncated() {
        let joints = vec![Matrix4::from_scale(2.0); MAX_JOINTS + 5];
        let uniform = SkinUniform::new(&joints, false);
        assert_eq!(uniform.flags[0], 0.0);
        assert_eq!(uniform.joints[MAX_JOINTS - 1][0][0], 2.0);
        assert_eq!(std::mem::size_of::<SkinUniform>(), 16 + MAX_JOINTS * 64);
    }
}
