//! Asset storage
//!
//! The asset store is the sole owner of mesh geometry and animation clips.
//! Everything else in the engine refers to assets through slotmap handles,
//! which keeps teardown order trivial: dropping the store drops the assets,
//! and a dangling handle simply fails to resolve instead of dangling a
//! pointer.

pub mod heightmap;
pub mod material;
pub mod mesh;

pub use heightmap::{HeightField, HeightmapError};
pub use material::{Material, TextureAtlas};
pub use mesh::{Mesh, MAX_WEIGHTS};

use crate::anim::AnimationClip;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Non-owning reference to a mesh in the [`AssetStore`]
    pub struct MeshHandle;

    /// Non-owning reference to an animation clip in the [`AssetStore`]
    pub struct ClipHandle;
}

/// Owner of all CPU-side mesh and animation data
#[derive(Default)]
pub struct AssetStore {
    meshes: SlotMap<MeshHandle, Mesh>,
    clips: SlotMap<ClipHandle, AnimationClip>,
}

impl AssetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh, returning its handle
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.insert(mesh)
    }

    /// Add an animation clip, returning its handle
    pub fn add_clip(&mut self, clip: AnimationClip) -> ClipHandle {
        self.clips.insert(clip)
    }

    /// Look up a mesh
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    /// Look up an animation clip
    pub fn clip(&self, handle: ClipHandle) -> Option<&AnimationClip> {
        self.clips.get(handle)
    }

    /// Remove a mesh; items still holding the handle simply stop resolving
    pub fn remove_mesh(&mut self, handle: MeshHandle) -> Option<Mesh> {
        self.meshes.remove(handle)
    }

    /// Number of meshes in the store
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}
