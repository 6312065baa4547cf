//! View-frustum culling
//!
//! Extracts the six frustum planes from the combined projection-view matrix
//! and rewrites each render item's `inside_frustum` flag with a bounding
//! sphere test. Conservative: an item is kept whenever its sphere touches
//! the frustum.

use crate::assets::{AssetStore, MeshHandle};
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::scene::RenderItem;
use std::collections::HashMap;

const NUM_PLANES: usize = 6;

/// Frustum plane cache, reused across frames
pub struct FrustumCullingFilter {
    /// Planes as (normal, distance) half-spaces, normalized
    planes: [Vec4; NUM_PLANES],
}

impl Default for FrustumCullingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrustumCullingFilter {
    /// Filter with no planes set; call [`FrustumCullingFilter::update_frustum`]
    /// before the first test
    pub fn new() -> Self {
        Self {
            planes: [Vec4::zeros(); NUM_PLANES],
        }
    }

    /// Re-extract the six planes from `projection * view`.
    ///
    /// Gribb-Hartmann: each plane is a sum or difference of the fourth row
    /// of the combined matrix with one of the other rows, normalized so the
    /// plane's distance term is in world units.
    pub fn update_frustum(&mut self, projection: &Mat4, view: &Mat4) {
        let m = projection * view;
        let row = |i: usize| Vec4::new(m[(i, 0)], m[(i, 1)], m[(i, 2)], m[(i, 3)]);
        let r3 = row(3);
        let raw = [
            r3 + row(0), // left
            r3 - row(0), // right
            r3 + row(1), // bottom
            r3 - row(1), // top
            r3 + row(2), // near
            r3 - row(2), // far
        ];
        for (plane, raw) in self.planes.iter_mut().zip(raw) {
            let len = Vec3::new(raw.x, raw.y, raw.z).norm();
            *plane = raw / len;
        }
    }

    /// Whether a bounding sphere intersects the frustum
    pub fn inside_frustum(&self, x: f32, y: f32, z: f32, bounding_radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.x * x + p.y * y + p.z * z + p.w >= -bounding_radius)
    }

    /// Rewrite `inside_frustum` for every item in the map, scaling each
    /// mesh's bounding radius by the item's scale. Items with culling
    /// disabled are left untouched.
    pub fn filter(&self, assets: &AssetStore, items: &mut HashMap<MeshHandle, Vec<RenderItem>>) {
        for (&mesh, items) in items.iter_mut() {
            let Some(mesh) = assets.mesh(mesh) else {
                continue;
            };
            self.filter_items(items, mesh.bounding_radius);
        }
    }

    fn filter_items(&self, items: &mut [RenderItem], mesh_bounding_radius: f32) {
        for item in items {
            if item.culling_disabled {
                continue;
            }
            let radius = item.scale * mesh_bounding_radius;
            let p = item.position;
            item.inside_frustum = self.inside_frustum(p.x, p.y, p.z, radius);
        }
    }
}
