//! Material definitions
//!
//! Materials are pure CPU-side records; textures themselves live behind the
//! render device boundary, so all the engine tracks here is the atlas grid
//! layout and whether a normal map exists.

use crate::foundation::math::Vec4;

/// Texture-atlas layout shared by a material's diffuse texture
///
/// Instanced items and particles select a cell by index; the batch builder
/// turns that index into a UV offset using these dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAtlas {
    /// Number of atlas columns
    pub cols: u32,
    /// Number of atlas rows
    pub rows: u32,
}

impl TextureAtlas {
    /// Atlas with the given grid dimensions
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// A single-cell atlas (a plain, non-animated texture)
    pub fn single() -> Self {
        Self { cols: 1, rows: 1 }
    }

    /// Total number of cells in the atlas
    pub fn cell_count(&self) -> u32 {
        self.cols * self.rows
    }
}

/// Surface material for a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Ambient colour (RGBA)
    pub ambient: Vec4,
    /// Diffuse colour (RGBA)
    pub diffuse: Vec4,
    /// Specular colour (RGBA)
    pub specular: Vec4,
    /// Reflectance scalar fed to the specular term
    pub reflectance: f32,
    /// Diffuse texture atlas layout, if the material is textured
    pub texture: Option<TextureAtlas>,
    /// Whether a normal map accompanies the diffuse texture
    pub has_normal_map: bool,
}

impl Material {
    const DEFAULT_COLOUR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

    /// Untextured material with a single colour for all three terms
    pub fn from_colour(colour: Vec4, reflectance: f32) -> Self {
        Self {
            ambient: colour,
            diffuse: colour,
            specular: colour,
            reflectance,
            texture: None,
            has_normal_map: false,
        }
    }

    /// Textured material with default colours
    pub fn textured(atlas: TextureAtlas) -> Self {
        Self {
            texture: Some(atlas),
            ..Self::default()
        }
    }

    /// Whether a diffuse texture is present
    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Self::DEFAULT_COLOUR,
            diffuse: Self::DEFAULT_COLOUR,
            specular: Self::DEFAULT_COLOUR,
            reflectance: 0.0,
            texture: None,
            has_normal_map: false,
        }
    }
}
