//! Height-field data for terrain
//!
//! A regular grid of height samples, either supplied directly or decoded
//! from an image where each pixel's packed RGB value maps linearly onto the
//! [min_y, max_y] range.

use std::path::Path;
use thiserror::Error;

/// World-space X coordinate of the grid's first column (before scaling)
pub const START_X: f32 = -0.5;
/// World-space Z coordinate of the grid's first row (before scaling)
pub const START_Z: f32 = -0.5;

const MAX_COLOUR: f32 = (0xFF_FF_FF) as f32;

/// Height-field loading errors
#[derive(Error, Debug)]
pub enum HeightmapError {
    /// The heightmap image could not be read or decoded
    #[error("Heightmap image error: {0}")]
    Image(#[from] image::ImageError),
    /// The sample grid dimensions do not match the sample count
    #[error("Heightmap dimension mismatch: {width}x{depth} grid but {samples} samples")]
    DimensionMismatch {
        /// Declared grid width
        width: usize,
        /// Declared grid depth
        depth: usize,
        /// Number of samples provided
        samples: usize,
    },
}

/// A regular grid of height samples spanning a unit square in XZ
#[derive(Debug, Clone)]
pub struct HeightField {
    width: usize,
    depth: usize,
    heights: Vec<f32>,
}

impl HeightField {
    /// Create a height field from raw samples, row-major (one row per Z step)
    pub fn new(width: usize, depth: usize, heights: Vec<f32>) -> Result<Self, HeightmapError> {
        if heights.len() != width * depth {
            return Err(HeightmapError::DimensionMismatch {
                width,
                depth,
                samples: heights.len(),
            });
        }
        Ok(Self {
            width,
            depth,
            heights,
        })
    }

    /// Create a flat height field at a constant height
    pub fn flat(width: usize, depth: usize, height: f32) -> Self {
        Self {
            width,
            depth,
            heights: vec![height; width * depth],
        }
    }

    /// Decode a height field from an image file. Each pixel's RGB channels
    /// are packed into a 24-bit value and mapped linearly onto
    /// `[min_y, max_y]`.
    pub fn from_image(
        path: impl AsRef<Path>,
        min_y: f32,
        max_y: f32,
    ) -> Result<Self, HeightmapError> {
        let img = image::open(path)?.into_rgba8();
        let (width, depth) = (img.width() as usize, img.height() as usize);
        let mut heights = Vec::with_capacity(width * depth);
        for pixel in img.pixels() {
            let [r, g, b, _] = pixel.0;
            let packed = ((r as u32) << 16 | (g as u32) << 8 | b as u32) as f32;
            heights.push(min_y + (max_y - min_y) * (packed / MAX_COLOUR));
        }
        Ok(Self {
            width,
            depth,
            heights,
        })
    }

    /// Grid width (samples per row)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid depth (number of rows)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Height sample at a grid cell, clamped to the grid edges
    pub fn height(&self, row: usize, col: usize) -> f32 {
        let row = row.min(self.depth - 1);
        let col = col.min(self.width - 1);
        self.heights[row * self.width + col]
    }

    /// World-space X extent of one block built from this field
    pub fn x_length(&self) -> f32 {
        (-START_X * 2.0).abs()
    }

    /// World-space Z extent of one block built from this field
    pub fn z_length(&self) -> f32 {
        (-START_Z * 2.0).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_is_rejected() {
        let result = HeightField::new(3, 3, vec![0.0; 8]);
        assert!(matches!(
            result,
            Err(HeightmapError::DimensionMismatch { samples: 8, .. })
        ));
    }

    #[test]
    fn out_of_range_lookups_clamp_to_edges() {
        let field = HeightField::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(field.height(0, 0), 1.0);
        assert_eq!(field.height(5, 5), 4.0);
    }
}
