//! Scene contents
//!
//! The scene is the boundary object the renderer consumes: meshes mapped to
//! their render-item lists (plain and instanced separately), the light
//! collection, fog, an optional sky box, and particle emitters.
//!
//! A render item is one record for every kind of drawable. Instead of an
//! inheritance chain, optional capability data hangs off the base record:
//! skinned items carry a [`SkinningState`], particles carry a
//! [`ParticleData`].

use crate::assets::{AssetStore, ClipHandle, MeshHandle};
use crate::foundation::math::{model_matrix, Mat4, Quat, Vec3};
use crate::particles::{FlowEmitter, ParticleData};
use crate::render::lights::{Fog, SceneLighting};
use std::collections::HashMap;

/// Frame cursor into an animation clip, advanced externally once per logic
/// tick
#[derive(Debug, Clone, Copy)]
pub struct SkinningState {
    /// The clip the item plays
    pub clip: ClipHandle,
    /// Index of the frame currently displayed
    pub current_frame: usize,
}

impl SkinningState {
    /// Start a clip at its first frame
    pub fn new(clip: ClipHandle) -> Self {
        Self {
            clip,
            current_frame: 0,
        }
    }

    /// Advance to the next frame, wrapping modulo `frame_count`
    pub fn advance(&mut self, frame_count: usize) {
        if frame_count > 0 {
            self.current_frame = (self.current_frame + 1) % frame_count;
        }
    }
}

/// One drawable thing in the scene
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// World-space position
    pub position: Vec3,
    /// World-space rotation
    pub rotation: Quat,
    /// Uniform scale
    pub scale: f32,
    /// Texture-atlas cell index for atlas-textured meshes
    pub texture_cell: u32,
    /// Selection highlight flag
    pub selected: bool,
    /// Visibility flag, rewritten every frame by the frustum filter
    pub inside_frustum: bool,
    /// When set, the frustum filter never touches this item
    pub culling_disabled: bool,
    /// Present for skinned items
    pub skinning: Option<SkinningState>,
    /// Present for particles
    pub particle: Option<ParticleData>,
}

impl Default for RenderItem {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderItem {
    /// A unit-scale item at the origin
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: 1.0,
            texture_cell: 0,
            selected: false,
            inside_frustum: true,
            culling_disabled: false,
            skinning: None,
            particle: None,
        }
    }

    /// Item at a position
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Attach an animation clip, starting at frame 0
    pub fn with_skinning(mut self, clip: ClipHandle) -> Self {
        self.skinning = Some(SkinningState::new(clip));
        self
    }

    /// Attach particle behaviour
    pub fn with_particle(mut self, particle: ParticleData) -> Self {
        self.particle = Some(particle);
        self
    }

    /// World model matrix for this item
    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(&self.position, &self.rotation, self.scale)
    }
}

/// Everything the renderer draws in one frame
#[derive(Default)]
pub struct Scene {
    /// Plain meshes mapped to their items
    pub mesh_items: HashMap<MeshHandle, Vec<RenderItem>>,
    /// GPU-instanced meshes mapped to their items
    pub instanced_mesh_items: HashMap<MeshHandle, Vec<RenderItem>>,
    /// Light collection; `None` renders unlit
    pub lighting: Option<SceneLighting>,
    /// Fog parameters
    pub fog: Fog,
    /// Optional sky box item (single mesh, culling irrelevant)
    pub sky_box: Option<(MeshHandle, RenderItem)>,
    /// Particle emitters
    pub emitters: Vec<FlowEmitter>,
    /// Whether the shadow pipeline runs at all
    pub render_shadows: bool,
}

impl Scene {
    /// Create an empty scene with shadows enabled
    pub fn new() -> Self {
        Self {
            render_shadows: true,
            ..Self::default()
        }
    }

    /// Add items under a mesh, routing to the instanced map when the mesh
    /// carries an instance cap
    pub fn add_items(&mut self, assets: &AssetStore, mesh: MeshHandle, items: Vec<RenderItem>) {
        let instanced = assets
            .mesh(mesh)
            .map(|m| m.max_instances.is_some())
            .unwrap_or(false);
        let map = if instanced {
            &mut self.instanced_mesh_items
        } else {
            &mut self.mesh_items
        };
        map.entry(mesh).or_default().extend(items);
    }

    /// Advance every skinned item's frame cursor by one logic tick
    pub fn advance_animations(&mut self, assets: &AssetStore) {
        for items in self
            .mesh_items
            .values_mut()
            .chain(self.instanced_mesh_items.values_mut())
        {
            for item in items {
                if let Some(skinning) = item.skinning.as_mut() {
                    if let Some(clip) = assets.clip(skinning.clip) {
                        skinning.advance(clip.frame_count());
                    }
                }
            }
        }
    }

    /// Update all particle emitters
    pub fn update_particles(&mut self, elapsed_millis: i64) {
        for emitter in &mut self.emitters {
            emitter.update(elapsed_millis);
        }
    }
}
