//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn each frame as a [`Render`]. The engine sorts the
//! collected draws into batches per pipeline: shadow casters for the shadow pass, then
//! terrain, opaque skinned meshes and finally blended skinned meshes for the main pass.

use crate::data_structures::model::{AlphaMode, Material, Mesh};

/// One mesh of a skinned (or rigid, single-joint) model.
#[derive(Clone, Copy)]
pub struct SkinnedDraw<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a Material,
    pub skin: &'a wgpu::BindGroup,
    pub cast_shadow: bool,
}

/// The floor: its own vertex/index buffers and bind group.
#[derive(Clone, Copy)]
pub struct TerrainDraw<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: u32,
}

/// Specifies how a flow should be rendered.
///
/// - `None` renders nothing
/// - `Skinned(Vec<SkinnedDraw>)` renders meshes through the skinned pipelines
/// - `Terrain(TerrainDraw)` renders the displaced floor
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Skinned(Vec<SkinnedDraw<'a>>),
    Terrain(TerrainDraw<'a>),
    Composed(Vec<Render<'a>>),
}

/// Draws of one frame, grouped by pipeline.
#[derive(Default)]
pub(crate) struct Batches<'a> {
    pub(crate) opaque: Vec<SkinnedDraw<'a>>,
    pub(crate) blended: Vec<SkinnedDraw<'a>>,
    pub(crate) terrain: Vec<TerrainDraw<'a>>,
}

impl<'a> Batches<'a> {
    pub(crate) fn shadow_casters(&self) -> impl Iterator<Item = &SkinnedDraw<'a>> {
        self.opaque
            .iter()
            .chain(self.blended.iter())
            .filter(|draw| draw.cast_shadow)
    }
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Skinned(draws) => {
                for draw in draws {
                    match draw.material.alpha {
                        AlphaMode::Blend => batches.blended.push(draw),
                        AlphaMode::Opaque | AlphaMode::Mask(_) => batches.opaque.push(draw),
                    }
                }
            }
            Render::Terrain(flat) => batches.terrain.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
            Render::None => (),
        }
    }
}
