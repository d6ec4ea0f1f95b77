use std::sync::Arc;

use phoenix_vale::{
    animation::AnimationClip,
    camera::Viewport,
    config::{BirdConfig, FloorConfig},
    data_structures::{
        scene_graph::{MeshNode, Node, NodeKind, SceneGraph, ShadowFlags, Shading},
        terrain::{Heightmap, PlaneGeometry},
        transform::Transform,
    },
    scene::birds::{BIRD_COUNT, drive, instantiate},
};

fn bird_template() -> SceneGraph {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::group("Sketchfab_model"), None);
    graph.add_node(
        Node::new(
            Some("phoenix".to_string()),
            Transform::identity(),
            NodeKind::Mesh(MeshNode {
                mesh: 0,
                skin: None,
                shading: Shading::Lit,
                shadows: ShadowFlags::default(),
            }),
        ),
        Some(root),
    );
    graph
}

fn take_001() -> Arc<AnimationClip> {
    Arc::new(AnimationClip {
        name: "Take 001".to_string(),
        duration: 10.0,
        tracks: Vec::new(),
    })
}

#[test]
fn three_birds_share_one_clip() {
    let config = BirdConfig::default();
    let clip = take_001();
    let graphs = instantiate(bird_template(), &config);
    let mixers = drive(Some(clip.clone()), &config);

    assert_eq!(graphs.len(), BIRD_COUNT);
    assert_eq!(mixers.len(), BIRD_COUNT);
    for mixer in &mixers {
        assert_eq!(mixer.actions().len(), 1);
        assert!(Arc::ptr_eq(mixer.actions()[0].clip(), &clip));
        assert_eq!(mixer.actions()[0].time_scale(), 0.5);
    }
    // ours plus one per mixer
    assert_eq!(Arc::strong_count(&clip), 1 + BIRD_COUNT);
}

#[test]
fn play_heads_are_staggered() {
    let mut mixers = drive(Some(take_001()), &BirdConfig::default());
    for _ in 0..4 {
        mixers.iter_mut().for_each(|mixer| mixer.update(0.25));
    }

    let heads: Vec<f32> = mixers.iter().map(|m| m.actions()[0].time()).collect();
    assert!((heads[0] - 0.5).abs() < 1e-5);
    assert!((heads[0] - heads[1] - 0.2 * 0.5).abs() < 1e-5);
    assert!((heads[0] - heads[2] - 0.35 * 0.5).abs() < 1e-5);
}

#[test]
fn missing_clip_leaves_birds_in_bind_pose() {
    let config = BirdConfig::default();
    let mut graphs = instantiate(bird_template(), &config);
    let mut mixers = drive(None, &config);
    let before: Vec<_> = graphs.iter().map(SceneGraph::world_matrices).collect();

    for (mixer, graph) in mixers.iter_mut().zip(graphs.iter_mut()) {
        assert!(mixer.actions().is_empty());
        mixer.update(1.0 / 60.0);
        mixer.apply(graph);
    }

    let after: Vec<_> = graphs.iter().map(SceneGraph::world_matrices).collect();
    assert_eq!(before, after);
}

#[test]
fn floor_has_expected_vertex_count_and_only_moves_along_its_normal() {
    let config = FloorConfig::default();
    let plane = PlaneGeometry::new(
        config.width,
        config.height,
        config.width_segments,
        config.height_segments,
    );
    assert_eq!(plane.vertex_count(), 2601);

    let heightmap = Heightmap::new(2, 2, vec![0.5; 4]).unwrap();
    let flat = plane.displaced_vertices(None, config.displacement_scale);
    let raised = plane.displaced_vertices(Some(&heightmap), config.displacement_scale);
    for (flat, raised) in flat.iter().zip(&raised) {
        assert_eq!(flat.position[0], raised.position[0]);
        assert_eq!(flat.position[1], raised.position[1]);
        assert!((raised.position[2] - 10.0).abs() < 1e-5);
    }
}

#[test]
fn resize_follows_the_window() {
    let mut viewport = Viewport::new(1280.0, 720.0, 1.0);
    viewport.resize(1000.0, 500.0);
    assert_eq!(viewport.aspect(), 2.0);
    assert_eq!(viewport.render_size(2048), (1000, 500));

    let retina = Viewport::from_physical(3000, 1500, 3.0);
    assert_eq!(retina.aspect(), 2.0);
    assert_eq!(retina.render_size(2048), (2000, 1000));

    let wide = Viewport::from_physical(5000, 1000, 2.0);
    assert_eq!(wide.render_size(2048), (2048, 410));
    assert_eq!(wide.aspect(), 5.0);
}
