//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in a flat arena and refer to each other by index. A [`SceneGraph`] is
//! therefore a plain value: cloning it deep-copies the hierarchy, and every skin in the
//! clone points at the clone's own joints without any re-binding step.

use cgmath::{Matrix4, SquareMatrix};

use crate::data_structures::transform::Transform;

pub type NodeId = usize;

/// How a material reacts to light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    Lit,
    Unlit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadowFlags {
    pub cast: bool,
    pub receive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshNode {
    /// Index into the owning model's meshes.
    pub mesh: usize,
    pub skin: Option<usize>,
    pub shading: Shading,
    pub shadows: ShadowFlags,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group,
    Joint,
    Mesh(MeshNode),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub local: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: Option<String>, local: Transform, kind: NodeKind) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            local,
            kind,
        }
    }

    pub fn group(name: &str) -> Self {
        Self::new(Some(name.to_string()), Transform::identity(), NodeKind::Group)
    }

    /// Shadow settings of nodes that are lit. Everything else can neither cast nor
    /// receive shadows and yields `None`.
    pub fn shadow_flags_mut(&mut self) -> Option<&mut ShadowFlags> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) if mesh.shading == Shading::Lit => Some(&mut mesh.shadows),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// Joints of a skinned mesh and the matrices that bring vertices into joint space.
#[derive(Clone, Debug)]
pub struct Skin {
    pub joints: Vec<NodeId>,
    pub inverse_bind: Vec<Matrix4<f32>>,
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    skins: Vec<Skin>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` below `parent`, or as a new root.
    pub fn add_node(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Hang an existing root below `parent`.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) {
        if child == parent || self.nodes[child].parent.is_some() {
            log::warn!("node {child} already has a parent and is not re-attached");
            return;
        }
        self.roots.retain(|&root| root != child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub fn add_skin(&mut self, skin: Skin) -> usize {
        self.skins.push(skin);
        self.skins.len() - 1
    }

    pub fn set_roots(&mut self, roots: Vec<NodeId>) {
        self.roots = roots;
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name.as_deref() == Some(name))
    }

    /// Visit every node reachable from the roots, parents before children.
    pub fn traverse_mut(&mut self, mut visit: impl FnMut(&mut Node)) {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id];
            visit(node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// All mesh nodes reachable from the roots.
    pub fn mesh_nodes(&self) -> Vec<(NodeId, &MeshNode)> {
        let mut meshes = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if let Some(mesh) = node.mesh() {
                meshes.push((id, mesh));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        meshes
    }

    /// Put every current root below a new group node carrying `transform`.
    pub fn wrap_in_root(&mut self, name: &str, transform: Transform) -> NodeId {
        let old_roots = std::mem::take(&mut self.roots);
        let mut root = Node::group(name);
        root.local = transform;
        let root_id = self.add_node(root, None);
        for child in old_roots {
            self.nodes[child].parent = Some(root_id);
            self.nodes[root_id].children.push(child);
        }
        root_id
    }

    /// World matrix of every node, indexed by node id. Unreachable nodes get identity.
    pub fn world_matrices(&self) -> Vec<Matrix4<f32>> {
        let mut world = vec![Matrix4::identity(); self.nodes.len()];
        let mut stack: Vec<(NodeId, Matrix4<f32>)> = self
            .roots
            .iter()
            .map(|&root| (root, Matrix4::identity()))
            .collect();
        while let Some((id, parent)) = stack.pop() {
            let node = &self.nodes[id];
            let matrix = parent * node.local.to_matrix();
            world[id] = matrix;
            stack.extend(node.children.iter().map(|&child| (child, matrix)));
        }
        world
    }

    /// `joint_world * inverse_bind` per joint of `skin`.
    pub fn joint_matrices(&self, skin: usize, world: &[Matrix4<f32>]) -> Vec<Matrix4<f32>> {
        let Some(skin) = self.skins.get(skin) else {
            return Vec::new();
        };
        skin.joints
            .iter()
            .enumerate()
            .map(|(i, &joint)| {
                let inverse_bind = skin
                    .inverse_bind
                    .get(i)
                    .copied()
                    .unwrap_or_else(Matrix4::identity);
                world.get(joint).copied().unwrap_or_else(Matrix4::identity) * inverse_bind
            })
            .collect()
    }
}
