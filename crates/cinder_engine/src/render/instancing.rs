//! GPU instancing batch builder
//!
//! Packs visible render items into per-instance records and hands them to
//! the device in chunks no larger than the mesh's instance cap. The staging
//! vector is owned by the batcher and reused across frames.

use crate::assets::Mesh;
use crate::foundation::math::Mat4;
use crate::scene::RenderItem;
use bytemuck::{Pod, Zeroable};

/// Floats per instance: model matrix, atlas offset, trailing scalar
pub const INSTANCE_SIZE_FLOATS: usize = 16 + 2 + 1;

/// One instance as the vertex shader consumes it
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    /// Model matrix, column major
    pub model: [[f32; 4]; 4],
    /// Texture-atlas offset of the item's cell
    pub texture_offset: [f32; 2],
    /// Scale in billboard mode, otherwise the selected flag as 0.0/1.0
    pub selected_or_scale: f32,
}

impl InstanceRecord {
    fn build(item: &RenderItem, mesh: &Mesh, billboard: bool, view: Option<&Mat4>) -> Self {
        let mut model = item.model_matrix();
        if billboard {
            if let Some(view) = view {
                // Cancel the item's rotation so the quad faces the camera:
                // the view rotation's transpose is its inverse.
                model
                    .fixed_view_mut::<3, 3>(0, 0)
                    .copy_from(&view.fixed_view::<3, 3>(0, 0).transpose());
            }
        }

        let texture_offset = match mesh.material.texture {
            Some(atlas) => {
                let col = item.texture_cell % atlas.cols;
                let row = item.texture_cell / atlas.cols;
                [
                    col as f32 / atlas.cols as f32,
                    row as f32 / atlas.rows as f32,
                ]
            }
            None => [0.0, 0.0],
        };

        let selected_or_scale = if billboard {
            item.scale
        } else if item.selected {
            1.0
        } else {
            0.0
        };

        Self {
            model: model.into(),
            texture_offset,
            selected_or_scale,
        }
    }
}

/// Reusable staging buffer for instanced draws
#[derive(Default)]
pub struct InstanceBatcher {
    staging: Vec<InstanceRecord>,
}

impl InstanceBatcher {
    /// Empty batcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack `items` into chunks of at most the mesh's instance cap and call
    /// `draw` once per chunk, in item order.
    ///
    /// In billboard mode each record's rotation is replaced by the transpose
    /// of the view matrix's upper-left 3x3; the replacement happens on the
    /// record, never on the item.
    pub fn render_instanced<F>(
        &mut self,
        mesh: &Mesh,
        items: &[RenderItem],
        billboard: bool,
        view: Option<&Mat4>,
        mut draw: F,
    ) where
        F: FnMut(&[InstanceRecord]),
    {
        let chunk_size = mesh.max_instances.unwrap_or(items.len().max(1));
        for chunk in items.chunks(chunk_size) {
            self.staging.clear();
            self.staging
                .extend(chunk.iter().map(|item| InstanceRecord::build(item, mesh, billboard, view)));
            draw(&self.staging);
        }
    }
}
