//! CPU side of glTF loading: buffers, images, node hierarchy, skins and clips.
//!
//! Nothing here touches the GPU, so a whole asset can be parsed and inspected in tests.
//! External files are fetched through the `load` callback, which receives each URI as
//! written in the asset; [`resolve_uri`] turns it into an asset path.

use std::collections::HashSet;

use anyhow::{Context as _, bail};
use cgmath::Matrix4;

use crate::{
    animation::AnimationClip,
    data_structures::{
        model::AlphaMode,
        scene_graph::{MeshNode, Node, NodeKind, SceneGraph, ShadowFlags, Shading, Skin},
        texture::decode_image,
        transform::Transform,
    },
    resources::{
        animation::read_animations,
        mesh::{MeshData, read_primitive},
    },
};

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    /// Index into [`GltfScene::images`].
    pub base_color_image: Option<usize>,
    pub alpha: AlphaMode,
    pub shading: Shading,
}

impl MaterialData {
    pub fn fallback() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [1.0; 4],
            base_color_image: None,
            alpha: AlphaMode::Opaque,
            shading: Shading::Lit,
        }
    }

    fn read(material: &gltf::Material) -> Self {
        let pbr = material.pbr_metallic_roughness();
        let alpha = match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask(material.alpha_cutoff().unwrap_or(0.5)),
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        };
        Self {
            name: material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or_default())),
            base_color: pbr.base_color_factor(),
            base_color_image: pbr
                .base_color_texture()
                .map(|info| info.texture().source().index()),
            alpha,
            shading: if material.unlit() {
                Shading::Unlit
            } else {
                Shading::Lit
            },
        }
    }
}

#[derive(Debug)]
pub struct GltfScene {
    pub graph: SceneGraph,
    pub meshes: Vec<MeshData>,
    /// glTF materials followed by one fallback for primitives without a material.
    pub materials: Vec<MaterialData>,
    /// Decoded images by glTF index; `None` where decoding failed.
    pub images: Vec<Option<image::DynamicImage>>,
    pub clips: Vec<AnimationClip>,
}

impl GltfScene {
    pub fn default_material(&self) -> usize {
        self.materials.len() - 1
    }
}

/// Resolve `uri` relative to the directory of `base`, decoding percent escapes.
pub fn resolve_uri(base: &str, uri: &str) -> String {
    let uri = percent_decode(uri);
    match base.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => format!("{dir}/{uri}"),
        _ => uri,
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub async fn parse_gltf<F, Fut>(bytes: &[u8], mut load: F) -> anyhow::Result<GltfScene>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<u8>>>,
{
    let gltf::Gltf { document, mut blob } = gltf::Gltf::from_slice(bytes).context("not a valid glTF asset")?;

    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .take()
                .context("the asset references a binary chunk it does not contain")?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("buffer {} is an embedded data URI, which is not supported", buffer.index())
            }
            gltf::buffer::Source::Uri(uri) => load(uri.to_string())
                .await
                .with_context(|| format!("cannot load buffer {uri}"))?,
        };
        if data.len() < buffer.length() {
            bail!(
                "buffer {} holds {} bytes but declares {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        buffers.push(data);
    }

    let mut images = Vec::new();
    for image in document.images() {
        let decoded = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let start = view.offset();
                let end = start + view.length();
                buffers
                    .get(view.buffer().index())
                    .and_then(|data| data.get(start..end))
                    .context("image view lies outside its buffer")
                    .and_then(|data| decode_image(data, Some(mime_type)))
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let hint = mime_type.or_else(|| uri.rsplit_once('.').map(|(_, ext)| ext));
                match load(uri.to_string()).await {
                    Ok(data) => decode_image(&data, hint),
                    Err(e) => Err(e),
                }
            }
        };
        images.push(match decoded {
            Ok(img) => Some(img),
            Err(e) => {
                log::warn!("image {} is unusable and falls back to white: {e:#}", image.index());
                None
            }
        });
    }

    let mut materials: Vec<MaterialData> = document.materials().map(|m| MaterialData::read(&m)).collect();
    materials.push(MaterialData::fallback());
    let default_material = materials.len() - 1;

    let mut graph = SceneGraph::new();
    let joints: HashSet<usize> = document
        .skins()
        .flat_map(|skin| skin.joints().map(|joint| joint.index()))
        .collect();
    for node in document.nodes() {
        let kind = if joints.contains(&node.index()) {
            NodeKind::Joint
        } else {
            NodeKind::Group
        };
        graph.add_node(
            Node::new(node.name().map(str::to_string), Transform::from(node.transform()), kind),
            None,
        );
    }
    for node in document.nodes() {
        for child in node.children() {
            graph.attach(child.index(), node.index());
        }
    }
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        graph.set_roots(scene.nodes().map(|node| node.index()).collect());
    }

    for skin in document.skins() {
        let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let inverse_bind = reader
            .read_inverse_bind_matrices()
            .map(|matrices| matrices.map(Matrix4::from).collect())
            .unwrap_or_default();
        graph.add_skin(Skin {
            joints: skin.joints().map(|joint| joint.index()).collect(),
            inverse_bind,
        });
    }

    let mut meshes = Vec::new();
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let skin = node.skin().map(|skin| skin.index());
        let name = mesh.name().unwrap_or("mesh").to_string();
        let mut mesh_nodes = Vec::new();
        for primitive in mesh.primitives() {
            if let Some(data) = read_primitive(&name, &primitive, &buffers) {
                let material = data.material.unwrap_or(default_material);
                let shading = materials
                    .get(material)
                    .map_or(Shading::Lit, |material| material.shading);
                mesh_nodes.push(MeshNode {
                    mesh: meshes.len(),
                    skin,
                    shading,
                    shadows: ShadowFlags::default(),
                });
                meshes.push(data);
            }
        }

        if mesh_nodes.len() == 1 {
            if let (Some(target), Some(mesh_node)) = (graph.node_mut(node.index()), mesh_nodes.pop()) {
                target.kind = NodeKind::Mesh(mesh_node);
            }
        } else {
            for (i, mesh_node) in mesh_nodes.into_iter().enumerate() {
                graph.add_node(
                    Node::new(
                        Some(format!("{name}.{i}")),
                        Transform::identity(),
                        NodeKind::Mesh(mesh_node),
                    ),
                    Some(node.index()),
                );
            }
        }
    }

    let clips = read_animations(&document, &buffers);
    log::debug!(
        "parsed glTF: {} nodes, {} meshes, {} skins, {} clips",
        graph.len(),
        meshes.len(),
        graph.skins().len(),
        clips.len()
    );

    Ok(GltfScene {
        graph,
        meshes,
        materials,
        images,
        clips,
    })
}
