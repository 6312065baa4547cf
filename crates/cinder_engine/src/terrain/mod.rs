//! Terrain height-field collision queries
//!
//! A terrain is a square grid of blocks, each one a render item scaled and
//! positioned over a shared [`HeightField`]. `height_at` answers "how high
//! is the ground under this world position" by locating the block, then the
//! grid cell, then the triangle within the cell, and interpolating on that
//! triangle's plane.

use crate::assets::heightmap::{HeightField, START_X, START_Z};
use crate::assets::MeshHandle;
use crate::foundation::math::Vec3;
use crate::scene::RenderItem;

/// Axis-aligned 2D box over the XZ plane, half-open on its far edges so a
/// point on the seam between two blocks lands in exactly one of them
#[derive(Debug, Clone, Copy)]
pub struct Box2D {
    /// Minimum X
    pub x: f32,
    /// Minimum Z
    pub z: f32,
    /// X extent
    pub width: f32,
    /// Z extent
    pub height: f32,
}

impl Box2D {
    /// Whether the box contains the XZ point
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.x && z >= self.z && x < self.x + self.width && z < self.z + self.height
    }
}

/// A grid of terrain blocks over one shared height field
pub struct Terrain {
    /// One render item per block, row-major
    pub items: Vec<RenderItem>,
    /// The mesh every block is drawn with
    pub mesh: MeshHandle,
    bounding_boxes: Vec<Box2D>,
    blocks_per_side: usize,
    cells_per_col: usize,
    cells_per_row: usize,
    field: HeightField,
}

impl Terrain {
    /// Lay out `blocks_per_side²` blocks of the given height field, centered
    /// on the origin, each scaled by `scale`
    pub fn new(blocks_per_side: usize, scale: f32, field: HeightField, mesh: MeshHandle) -> Self {
        let mut items = Vec::with_capacity(blocks_per_side * blocks_per_side);
        let mut bounding_boxes = Vec::with_capacity(blocks_per_side * blocks_per_side);
        let half = (blocks_per_side as f32 - 1.0) / 2.0;
        for row in 0..blocks_per_side {
            for col in 0..blocks_per_side {
                let x_displacement = (col as f32 - half) * scale * field.x_length();
                let z_displacement = (row as f32 - half) * scale * field.z_length();
                let mut item = RenderItem::at(Vec3::new(x_displacement, 0.0, z_displacement));
                item.scale = scale;
                bounding_boxes.push(block_bounding_box(&item));
                items.push(item);
            }
        }
        Self {
            items,
            mesh,
            bounding_boxes,
            blocks_per_side,
            cells_per_col: field.width() - 1,
            cells_per_row: field.depth() - 1,
            field,
        }
    }

    /// Terrain height under a world position, or `None` when the position
    /// lies outside every block
    pub fn height_at(&self, position: &Vec3) -> Option<f32> {
        let (block, bounds) = self.find_block(position)?;
        let triangle = self.triangle_at(position, bounds, block);
        Some(interpolate_height(
            &triangle[0],
            &triangle[1],
            &triangle[2],
            position.x,
            position.z,
        ))
    }

    fn find_block(&self, position: &Vec3) -> Option<(&RenderItem, &Box2D)> {
        for row in 0..self.blocks_per_side {
            for col in 0..self.blocks_per_side {
                let index = row * self.blocks_per_side + col;
                let bounds = &self.bounding_boxes[index];
                if bounds.contains(position.x, position.z) {
                    return Some((&self.items[index], bounds));
                }
            }
        }
        None
    }

    /// The three corners of the height-field triangle under the position.
    ///
    /// Each cell is split along its diagonal; the side of the diagonal the
    /// point falls on picks the triangle, with points exactly on the
    /// diagonal resolving to the far triangle (strict less-than), so seam
    /// points are deterministic.
    fn triangle_at(&self, position: &Vec3, bounds: &Box2D, block: &RenderItem) -> [Vec3; 3] {
        let cell_width = bounds.width / self.cells_per_col as f32;
        let cell_height = bounds.height / self.cells_per_row as f32;
        let col = ((position.x - bounds.x) / cell_width) as usize;
        let row = ((position.z - bounds.z) / cell_height) as usize;

        let b = Vec3::new(
            bounds.x + col as f32 * cell_width,
            self.world_height(row + 1, col, block),
            bounds.z + (row + 1) as f32 * cell_height,
        );
        let c = Vec3::new(
            bounds.x + (col + 1) as f32 * cell_width,
            self.world_height(row, col + 1, block),
            bounds.z + row as f32 * cell_height,
        );
        let a = if position.z < diagonal_z(b.x, b.z, c.x, c.z, position.x) {
            Vec3::new(
                bounds.x + col as f32 * cell_width,
                self.world_height(row, col, block),
                bounds.z + row as f32 * cell_height,
            )
        } else {
            Vec3::new(
                bounds.x + (col + 1) as f32 * cell_width,
                self.world_height(row + 2, col + 1, block),
                bounds.z + (row + 1) as f32 * cell_height,
            )
        };
        [a, b, c]
    }

    fn world_height(&self, row: usize, col: usize, block: &RenderItem) -> f32 {
        self.field.height(row, col) * block.scale + block.position.y
    }
}

fn block_bounding_box(block: &RenderItem) -> Box2D {
    let scale = block.scale;
    Box2D {
        x: START_X * scale + block.position.x,
        z: START_Z * scale + block.position.z,
        width: (START_X * 2.0).abs() * scale,
        height: (START_Z * 2.0).abs() * scale,
    }
}

/// Z coordinate of the cell diagonal through (x1,z1)-(x2,z2) at `x`
fn diagonal_z(x1: f32, z1: f32, x2: f32, z2: f32, x: f32) -> f32 {
    (z1 - z2) / (x1 - x2) * (x - x1) + z1
}

/// Height at (x, z) on the plane through the three triangle corners
fn interpolate_height(pa: &Vec3, pb: &Vec3, pc: &Vec3, x: f32, z: f32) -> f32 {
    // Plane equation ax + by + cz + d = 0
    let a = (pb.y - pa.y) * (pc.z - pa.z) - (pc.y - pa.y) * (pb.z - pa.z);
    let b = (pb.z - pa.z) * (pc.x - pa.x) - (pc.z - pa.z) * (pb.x - pa.x);
    let c = (pb.x - pa.x) * (pc.y - pa.y) - (pc.x - pa.x) * (pb.y - pa.y);
    let d = -(a * pa.x + b * pa.y + c * pa.z);
    // y = (-d - ax - cz) / b
    (-d - a * x - c * z) / b
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn dummy_mesh_handle() -> MeshHandle {
        let mut map: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        map.insert(())
    }

    fn flat_terrain(height: f32) -> Terrain {
        // 3x3 blocks of a 5x5 flat height field scaled by 10.
        Terrain::new(
            3,
            10.0,
            HeightField::flat(5, 5, height),
            dummy_mesh_handle(),
        )
    }

    #[test]
    fn flat_terrain_reports_constant_height() {
        let terrain = flat_terrain(2.0);
        for &(x, z) in &[(0.0, 0.0), (3.3, -4.1), (-12.0, 9.5)] {
            let h = terrain.height_at(&Vec3::new(x, 100.0, z)).unwrap();
            assert!((h - 20.0).abs() < 1e-4, "height at ({x}, {z}) was {h}");
        }
    }

    #[test]
    fn block_boundary_resolves_to_exactly_one_triangle() {
        let terrain = flat_terrain(1.0);
        // x = -5 is the seam between the left and middle blocks of the
        // center row; the half-open boxes put it in the middle block.
        let h = terrain.height_at(&Vec3::new(-5.0, 0.0, 0.0)).unwrap();
        assert!(h.is_finite());
        assert!((h - 10.0).abs() < 1e-4);
    }

    #[test]
    fn cell_diagonal_is_deterministic() {
        let terrain = flat_terrain(0.5);
        // Points exactly on a cell diagonal still interpolate finitely.
        let h = terrain.height_at(&Vec3::new(1.25, 0.0, 1.25)).unwrap();
        assert!((h - 5.0).abs() < 1e-4);
    }

    #[test]
    fn outside_every_block_returns_none() {
        let terrain = flat_terrain(1.0);
        assert!(terrain.height_at(&Vec3::new(1000.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn sloped_cell_interpolates_on_the_plane() {
        // Single block, 2x2 field: heights form a plane rising along +X.
        let field = HeightField::new(2, 2, vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        let terrain = Terrain::new(1, 1.0, field, dummy_mesh_handle());
        let h = terrain.height_at(&Vec3::new(0.25, 0.0, 0.0)).unwrap();
        // x=0.25 sits three quarters along the unit block starting at -0.5.
        assert!((h - 0.75).abs() < 1e-4);
    }
}
