//! Render pipelines and the bind group layouts they share.
//!
//! - `basic`: pipeline construction helpers
//! - `light`: ambient/directional light, shadow camera and shadow map
//! - `skinned`: glTF meshes with a joint palette, plus their shadow pass
//! - `terrain`: the displaced floor with colour and alpha maps
//!
//! Bind group slots are fixed across pipelines: material (0), camera (1), light (2) and
//! skin (3) in the main pass; light view (0) and skin (1) in the shadow pass.

use crate::{
    data_structures::{
        model::{SkinnedVertex, Vertex},
        terrain::TerrainVertex,
        texture::Texture,
    },
    pipelines::basic::{
        RasterState, mk_depth_pipeline, mk_render_pipeline, sampler_entry, texture_entry,
        uniform_entry,
    },
};

pub mod basic;
pub mod light;
pub mod skinned;
pub mod terrain;

#[derive(Debug, Clone)]
pub struct Layouts {
    pub camera: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
    pub shadow: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub skin: wgpu::BindGroupLayout,
    pub terrain: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
            label: Some("camera_bind_group_layout"),
        });
        let light = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("light_bind_group_layout"),
        });
        let shadow = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            label: Some("shadow_bind_group_layout"),
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
            label: Some("material_bind_group_layout"),
        });
        let skin = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
            label: Some("skin_bind_group_layout"),
        });
        let terrain = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            ],
            label: Some("terrain_bind_group_layout"),
        });

        Self {
            camera,
            light,
            shadow,
            material,
            skin,
            terrain,
        }
    }
}

/// Every pipeline the scene draws with, created once per surface format.
#[derive(Debug)]
pub struct Pipelines {
    pub skinned: wgpu::RenderPipeline,
    /// Skinned meshes whose material blends; drawn after everything opaque.
    pub skinned_blend: wgpu::RenderPipeline,
    pub terrain: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, layouts: &Layouts) -> Self {
        let skinned_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skinned Pipeline Layout"),
            bind_group_layouts: &[
                &layouts.material,
                &layouts.camera,
                &layouts.light,
                &layouts.skin,
            ],
            push_constant_ranges: &[],
        });
        let terrain_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Pipeline Layout"),
            bind_group_layouts: &[&layouts.terrain, &layouts.camera, &layouts.light],
            push_constant_ranges: &[],
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&layouts.shadow, &layouts.skin],
            push_constant_ranges: &[],
        });

        // glTF exports and the floor plane are drawn double-sided.
        let double_sided = RasterState {
            cull_mode: None,
            depth_write: true,
        };

        let skinned = mk_render_pipeline(
            device,
            "Skinned Pipeline",
            &skinned_layout,
            format,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            &[SkinnedVertex::desc()],
            double_sided,
            skinned::shader(),
        );
        let skinned_blend = mk_render_pipeline(
            device,
            "Skinned Blend Pipeline",
            &skinned_layout,
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            Some(Texture::DEPTH_FORMAT),
            &[SkinnedVertex::desc()],
            RasterState {
                cull_mode: None,
                depth_write: false,
            },
            skinned::shader(),
        );
        let terrain = mk_render_pipeline(
            device,
            "Terrain Pipeline",
            &terrain_layout,
            format,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            &[TerrainVertex::desc()],
            double_sided,
            terrain::shader(),
        );
        // The mirrored shadow frustum flips winding, so nothing is culled here either.
        let shadow = mk_depth_pipeline(
            device,
            "Shadow Pipeline",
            &shadow_layout,
            Texture::DEPTH_FORMAT,
            &[SkinnedVertex::desc()],
            double_sided,
            skinned::shadow_shader(),
        );

        Self {
            skinned,
            skinned_blend,
            terrain,
            shadow,
        }
    }
}
