use std::sync::Arc;

use crate::{
    animation::AnimationClip,
    data_structures::{
        model::{self, Material},
        scene_graph::SceneGraph,
        texture::Texture,
    },
    resources::{
        gltf_scene::{GltfScene, parse_gltf, resolve_uri},
        texture::load_binary,
    },
};

/**
 * This module contains all logic for loading meshes, textures and animations from external files.
 */
pub mod animation;
pub mod gltf_scene;
pub mod mesh;
pub mod texture;

/// A glTF asset ready to be instanced: the node template, its clips and the GPU data
/// every instance shares.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub graph: SceneGraph,
    pub clips: Vec<Arc<AnimationClip>>,
    pub model: Arc<model::Model>,
}

pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material_layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<LoadedModel> {
    log::info!("loading {file_name}");
    let bytes = load_binary(file_name).await?;
    let scene = parse_gltf(&bytes, |uri| {
        let path = resolve_uri(file_name, &uri);
        async move { load_binary(&path).await }
    })
    .await?;

    let model = upload(file_name, &scene, device, queue, material_layout);
    log::info!(
        "loaded {file_name}: {} meshes, {} materials, {} clips",
        model.meshes.len(),
        model.materials.len(),
        scene.clips.len()
    );

    Ok(LoadedModel {
        graph: scene.graph,
        clips: scene.clips.into_iter().map(Arc::new).collect(),
        model: Arc::new(model),
    })
}

fn upload(
    file_name: &str,
    scene: &GltfScene,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material_layout: &wgpu::BindGroupLayout,
) -> model::Model {
    let textures: Vec<Option<Texture>> = scene
        .images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            img.as_ref().map(|img| {
                Texture::from_image(device, queue, img, Some(&format!("{file_name} image {i}")), false)
            })
        })
        .collect();
    let white = Texture::solid_colour(device, queue, [255; 4], "white");

    let materials = scene
        .materials
        .iter()
        .map(|data| {
            let texture = data
                .base_color_image
                .and_then(|i| textures.get(i))
                .and_then(Option::as_ref)
                .unwrap_or(&white);
            Material::new(
                device,
                &data.name,
                texture,
                data.base_color,
                data.shading,
                data.alpha,
                material_layout,
            )
        })
        .collect();
    let meshes = mesh::upload_meshes(device, &scene.meshes, scene.default_material());

    model::Model { meshes, materials }
}
