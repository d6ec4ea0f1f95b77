//! The three phoenix instances: cloned scene graphs, one mixer each and their joint palettes.

use std::sync::Arc;

use cgmath::Matrix4;

use crate::{
    animation::{AnimationClip, mixer::AnimationMixer},
    config::BirdConfig,
    data_structures::{
        model::Model,
        scene_graph::{NodeId, SceneGraph, ShadowFlags},
        transform::Transform,
    },
    pipelines::skinned::{SkinBuffer, SkinUniform},
    render::{Render, SkinnedDraw},
    resources::LoadedModel,
};

pub const BIRD_COUNT: usize = 3;

/// Turn the loaded template into the three placed birds.
///
/// Lit meshes cast and receive shadows. Each instance hangs below its own root carrying the
/// configured scale and position.
pub fn instantiate(mut template: SceneGraph, config: &BirdConfig) -> [SceneGraph; BIRD_COUNT] {
    template.traverse_mut(|node| {
        if let Some(flags) = node.shadow_flags_mut() {
            flags.cast = true;
            flags.receive = true;
        }
    });

    let mut birds = [template.clone(), template.clone(), template];
    for (i, (graph, position)) in birds.iter_mut().zip(config.positions).enumerate() {
        graph.wrap_in_root(
            &format!("phoenix {i}"),
            Transform::from_translation(position).with_uniform_scale(config.scale),
        );
    }
    birds
}

/// One mixer per bird, all playing `clip` with their staggered start.
///
/// Without a clip the mixers stay empty and updating them does nothing.
pub fn drive(clip: Option<Arc<AnimationClip>>, config: &BirdConfig) -> Vec<AnimationMixer> {
    (0..BIRD_COUNT)
        .map(|i| {
            let mut mixer = AnimationMixer::new();
            if let Some(clip) = &clip {
                mixer
                    .clip_action(clip.clone())
                    .start_at(config.start_offsets[i])
                    .set_time_scale(config.playback_rate)
                    .play();
            }
            mixer
        })
        .collect()
}

#[derive(Debug)]
struct MeshSkin {
    node: NodeId,
    mesh: usize,
    skin: Option<usize>,
    shadows: ShadowFlags,
    buffer: SkinBuffer,
}

#[derive(Debug)]
pub struct Bird {
    pub graph: SceneGraph,
    pub mixer: AnimationMixer,
    skins: Vec<MeshSkin>,
}

impl Bird {
    fn new(
        device: &wgpu::Device,
        skin_layout: &wgpu::BindGroupLayout,
        graph: SceneGraph,
        mixer: AnimationMixer,
    ) -> Self {
        let skins = graph
            .mesh_nodes()
            .into_iter()
            .map(|(node, mesh)| MeshSkin {
                node,
                mesh: mesh.mesh,
                skin: mesh.skin,
                shadows: mesh.shadows,
                buffer: SkinBuffer::new(device, skin_layout, &format!("skin of node {node}")),
            })
            .collect();
        Self { graph, mixer, skins }
    }

    /// Advance the mixer and pose the graph.
    pub fn advance(&mut self, dt: f32) {
        self.mixer.update(dt);
        self.mixer.apply(&mut self.graph);
    }

    fn upload(&self, queue: &wgpu::Queue) {
        let world = self.graph.world_matrices();
        for skin in &self.skins {
            let joints = palette(&self.graph, &world, skin.node, skin.skin);
            skin.buffer
                .write(queue, &SkinUniform::new(&joints, skin.shadows.receive));
        }
    }
}

/// Joint matrices of one mesh node. Rigid meshes get their node's world matrix as joint 0.
pub fn palette(
    graph: &SceneGraph,
    world: &[Matrix4<f32>],
    node: NodeId,
    skin: Option<usize>,
) -> Vec<Matrix4<f32>> {
    match skin {
        Some(skin) => graph.joint_matrices(skin, world),
        None => world.get(node).copied().into_iter().collect(),
    }
}

/// The birds once their asset is loaded. Geometry and materials are shared.
#[derive(Debug)]
pub struct Flock {
    model: Arc<Model>,
    birds: Vec<Bird>,
}

impl Flock {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        skin_layout: &wgpu::BindGroupLayout,
        loaded: LoadedModel,
        config: &BirdConfig,
    ) -> Self {
        let clip = AnimationClip::find_by_name(&loaded.clips, &config.clip);
        match &clip {
            Some(clip) => log::info!(
                "playing {:?} ({:.2}s) on {BIRD_COUNT} birds",
                clip.name,
                clip.duration
            ),
            None => log::warn!(
                "clip {:?} not found among {} clip(s), birds stay in their bind pose",
                config.clip,
                loaded.clips.len()
            ),
        }

        let birds = instantiate(loaded.graph, config)
            .into_iter()
            .zip(drive(clip, config))
            .map(|(graph, mixer)| Bird::new(device, skin_layout, graph, mixer))
            .collect();
        let flock = Self {
            model: loaded.model,
            birds,
        };
        flock.upload(queue);
        flock
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn update(&mut self, queue: &wgpu::Queue, dt: f32) {
        self.birds.iter_mut().for_each(|bird| bird.advance(dt));
        self.upload(queue);
    }

    fn upload(&self, queue: &wgpu::Queue) {
        self.birds.iter().for_each(|bird| bird.upload(queue));
    }

    pub fn render(&self) -> Render<'_> {
        let draws = self
            .birds
            .iter()
            .flat_map(|bird| bird.skins.iter())
            .filter_map(|skin| {
                let mesh = self.model.meshes.get(skin.mesh)?;
                let material = self.model.materials.get(mesh.material)?;
                Some(SkinnedDraw {
                    mesh,
                    material,
                    skin: &skin.buffer.bind_group,
                    cast_shadow: skin.shadows.cast,
                })
            })
            .collect();
        Render::Skinned(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::scene_graph::{MeshNode, Node, NodeKind, Shading};
    use cgmath::SquareMatrix;

    fn template() -> SceneGraph {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::group("Sketchfab_model"), None);
        for (name, shading) in [("body", Shading::Lit), ("glow", Shading::Unlit)] {
            graph.add_node(
                Node::new(
                    Some(name.to_string()),
                    Transform::identity(),
                    NodeKind::Mesh(MeshNode {
                        mesh: 0,
                        skin: None,
                        shading,
                        shadows: ShadowFlags::default(),
                    }),
                ),
                Some(root),
            );
        }
        graph
    }

    #[test]
    fn only_lit_meshes_get_shadows() {
        let birds = instantiate(template(), &BirdConfig::default());
        for bird in &birds {
            let flags: Vec<_> = bird.mesh_nodes().into_iter().map(|(_, m)| m.shadows).collect();
            assert_eq!(
                flags,
                vec![
                    ShadowFlags { cast: true, receive: true },
                    ShadowFlags::default()
                ]
            );
        }
    }

    #[test]
    fn instances_are_placed_and_scaled() {
        let config = BirdConfig::default();
        let birds = instantiate(template(), &config);
        for (bird, position) in birds.iter().zip(config.positions) {
            let world = bird.world_matrices();
            let body = bird.find_by_name("body").unwrap();
            let expected = Matrix4::from_translation(position) * Matrix4::from_scale(0.01);
            assert_eq!(world[body], expected);
            assert_eq!(palette(bird, &world, body, None), vec![expected]);
        }
    }

    #[test]
    fn palette_of_unreachable_skin_is_empty() {
        let graph = template();
        let world = graph.world_matrices();
        assert!(palette(&graph, &world, 0, Some(3)).is_empty());
        assert_eq!(palette(&graph, &world, 0, None), vec![Matrix4::identity()]);
    }
}
