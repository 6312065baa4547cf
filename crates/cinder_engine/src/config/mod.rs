//! Engine configuration
//!
//! An immutable configuration struct handed to the renderer and shadow
//! pipeline at construction. Values that the engine previously would have
//! hard-coded (field of view, clip planes, shadow map size, light count
//! limits) all live here, optionally loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Render-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clip plane distance
    pub z_near: f32,
    /// Far clip plane distance
    pub z_far: f32,
    /// Shadow map width and height in texels (square maps, one per cascade)
    pub shadow_map_size: u32,
    /// Specular exponent pushed to the scene shader
    pub specular_power: f32,
    /// Maximum number of point lights the scene shader declares
    pub max_point_lights: usize,
    /// Maximum number of spot lights the scene shader declares
    pub max_spot_lights: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fov: 60.0_f32.to_radians(),
            z_near: 0.01,
            z_far: 1000.0,
            shadow_map_size: 4096,
            specular_power: 10.0,
            max_point_lights: 5,
            max_spot_lights: 5,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Render settings
    pub render: RenderSettings,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        Ok(config)
    }
}
