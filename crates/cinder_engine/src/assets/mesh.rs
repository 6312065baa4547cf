//! Mesh geometry
//!
//! Immutable CPU-side geometry created once at load time. Render items refer
//! to meshes through [`MeshHandle`](super::MeshHandle)s; the GPU copies live
//! behind the render device boundary and are keyed by the same handle.

use crate::assets::Material;
use crate::foundation::math::Vec3;

/// Maximum number of joints that may influence a single vertex
pub const MAX_WEIGHTS: usize = 4;

/// Immutable mesh geometry plus its material
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex texture coordinates
    pub tex_coords: Vec<[f32; 2]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Up to four joint indices per vertex; unused slots hold -1
    pub joint_indices: Vec<[i32; MAX_WEIGHTS]>,
    /// Up to four joint weights per vertex; unused slots hold -1.0
    pub weights: Vec<[f32; MAX_WEIGHTS]>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Bounding-sphere radius around the origin
    pub bounding_radius: f32,
    /// Surface material
    pub material: Material,
    /// When set, the mesh is drawn with GPU instancing in chunks of at most
    /// this many instances per draw call
    pub max_instances: Option<usize>,
}

impl Mesh {
    /// Create a static (non-skinned) mesh. Joint data is filled with the
    /// unused-slot sentinels and the bounding radius is computed from the
    /// positions.
    pub fn new(
        positions: Vec<[f32; 3]>,
        tex_coords: Vec<[f32; 2]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        let joint_indices = vec![[-1; MAX_WEIGHTS]; positions.len()];
        let weights = vec![[-1.0; MAX_WEIGHTS]; positions.len()];
        Self::skinned(
            positions,
            tex_coords,
            normals,
            joint_indices,
            weights,
            indices,
            material,
        )
    }

    /// Create a skinned mesh with explicit joint indices and weights
    pub fn skinned(
        positions: Vec<[f32; 3]>,
        tex_coords: Vec<[f32; 2]>,
        normals: Vec<[f32; 3]>,
        joint_indices: Vec<[i32; MAX_WEIGHTS]>,
        weights: Vec<[f32; MAX_WEIGHTS]>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        let bounding_radius = bounding_radius(&positions);
        Self {
            positions,
            tex_coords,
            normals,
            joint_indices,
            weights,
            indices,
            bounding_radius,
            material,
            max_instances: None,
        }
    }

    /// Mark the mesh as instanced with the given per-draw instance cap
    pub fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = Some(max_instances);
        self
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Radius of the smallest origin-centered sphere containing all positions
fn bounding_radius(positions: &[[f32; 3]]) -> f32 {
    positions
        .iter()
        .map(|p| Vec3::new(p[0], p[1], p[2]).norm())
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(
            vec![
                [-1.0, -1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
            ],
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0.0, 0.0, 1.0]; 4],
            vec![0, 1, 2, 0, 2, 3],
            Material::default(),
        )
    }

    #[test]
    fn bounding_radius_covers_furthest_vertex() {
        let mesh = quad();
        let expected = 2.0_f32.sqrt();
        assert!((mesh.bounding_radius - expected).abs() < 1e-6);
    }

    #[test]
    fn empty_mesh_has_zero_radius() {
        let mesh = Mesh::new(vec![], vec![], vec![], vec![], Material::default());
        assert_eq!(mesh.bounding_radius, 0.0);
    }

    #[test]
    fn static_mesh_pads_joint_data() {
        let mesh = quad();
        assert_eq!(mesh.joint_indices.len(), 4);
        assert_eq!(mesh.joint_indices[0], [-1; MAX_WEIGHTS]);
        assert_eq!(mesh.weights[0], [-1.0; MAX_WEIGHTS]);
    }
}
