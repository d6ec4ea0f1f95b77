mod common;

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};
use common::phoenix_glb::{binary_chunk, document, phoenix_glb};
use futures::executor::block_on;
use phoenix_vale::{
    animation::AnimationClip,
    data_structures::scene_graph::{NodeKind, Shading},
    resources::{
        gltf_scene::{GltfScene, parse_gltf, resolve_uri},
        texture::load_binary,
    },
};

fn parse_glb() -> GltfScene {
    let bytes = phoenix_glb();
    block_on(parse_gltf(&bytes, |uri: String| async move {
        Err::<Vec<u8>, _>(anyhow::anyhow!("unexpected external file {uri}"))
    }))
    .expect("the asset should parse")
}

#[test]
fn graph_mirrors_the_node_hierarchy() {
    let scene = parse_glb();
    let graph = &scene.graph;

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.roots(), &[0]);
    assert_eq!(graph.nodes()[0].children, vec![1, 3]);
    assert_eq!(graph.nodes()[1].kind, NodeKind::Joint);
    assert_eq!(graph.nodes()[2].kind, NodeKind::Joint);
    assert_eq!(graph.find_by_name("body"), Some(3));

    let body = graph.nodes()[3].mesh().expect("body is a mesh node");
    assert_eq!(body.skin, Some(0));
    assert_eq!(body.shading, Shading::Lit);
}

#[test]
fn primitives_and_materials_are_read() {
    let scene = parse_glb();
    assert_eq!(scene.meshes.len(), 1);
    let mesh = &scene.meshes[0];
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.vertices[1].joints, [0, 1, 0, 0]);
    assert_eq!(mesh.vertices[1].weights, [0.5, 0.5, 0.0, 0.0]);
    assert_eq!(mesh.vertices[2].weights, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(mesh.material, None);

    // only the fallback for primitives without a material
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.default_material(), 0);
    assert!(scene.images.is_empty());
}

#[test]
fn bind_pose_gives_identity_joints() {
    let scene = parse_glb();
    let world = scene.graph.world_matrices();
    let joints = scene.graph.joint_matrices(0, &world);
    assert_eq!(joints, vec![Matrix4::identity(); 2]);
}

#[test]
fn clip_is_found_and_sampled() {
    let scene = parse_glb();
    let clips: Vec<Arc<AnimationClip>> = scene.clips.into_iter().map(Arc::new).collect();
    assert!(AnimationClip::find_by_name(&clips, "Take 002").is_none());
    let clip = AnimationClip::find_by_name(&clips, "Take 001").expect("clip by name");
    assert_eq!(clip.duration, 1.0);

    let mut graph = scene.graph;
    clip.apply(0.5, &mut graph);
    let rotation = graph.nodes()[2].local.rotation;
    let half = std::f32::consts::FRAC_PI_8;
    assert!((rotation.s - half.cos()).abs() < 1e-4);
    assert!((rotation.v.z - half.sin()).abs() < 1e-4);
    assert!(rotation.v.x.abs() < 1e-6 && rotation.v.y.abs() < 1e-6);
}

#[test]
fn external_buffers_are_requested_by_uri() {
    let json = document(r#"{ "byteLength": 272, "uri": "scene%20data.bin" }"#);
    let mut requested = Vec::new();
    let scene = block_on(parse_gltf(json.as_bytes(), |uri: String| {
        requested.push(uri);
        async { Ok(binary_chunk()) }
    }))
    .expect("the asset should parse");

    assert_eq!(requested, vec!["scene%20data.bin".to_string()]);
    assert_eq!(
        resolve_uri("models/phoenix_bird/scene.gltf", &requested[0]),
        "models/phoenix_bird/scene data.bin"
    );
    assert_eq!(scene.meshes[0].vertices.len(), 3);
}

#[test]
fn short_buffers_are_rejected() {
    let json = document(r#"{ "byteLength": 272, "uri": "scene.bin" }"#);
    let result = block_on(parse_gltf(json.as_bytes(), |_: String| async {
        Ok(vec![0u8; 16])
    }));
    assert!(result.is_err());
}

#[test]
fn installed_asset_is_read_by_the_native_loader() {
    let asset = "test-fixtures/gltf_parse/phoenix.glb";
    common::phoenix_glb::install(asset).expect("cannot write the asset");

    let bytes = block_on(load_binary(asset)).expect("the loader reads ./assets");
    assert_eq!(bytes, phoenix_glb());
    let scene = block_on(parse_gltf(&bytes, |uri: String| async move {
        Err::<Vec<u8>, _>(anyhow::anyhow!("unexpected external file {uri}"))
    }))
    .expect("the asset should parse");
    let clips: Vec<Arc<AnimationClip>> = scene.clips.into_iter().map(Arc::new).collect();
    assert!(AnimationClip::find_by_name(&clips, "Take 404").is_none());
}
