//! Rendering pipeline
//!
//! The renderer consumes a [`Scene`](crate::scene::Scene) and drives a
//! [`RenderDevice`] through a fixed pass order: frustum culling, the shadow
//! cascades, the lit scene pass, the sky box, particles, and finally the
//! device's debug overlay hook. Shader programs and the GPU itself stay
//! behind the [`ShaderProgram`] and [`RenderDevice`] traits.

pub mod camera;
pub mod device;
pub mod frustum;
pub mod instancing;
pub mod lights;
pub mod renderer;
pub mod shader;
pub mod shadow;

pub use camera::Camera;
pub use device::RenderDevice;
pub use frustum::FrustumCullingFilter;
pub use instancing::{InstanceBatcher, InstanceRecord, INSTANCE_SIZE_FLOATS};
pub use renderer::Renderer;
pub use shader::{ShaderError, ShaderProgram};
pub use shadow::{cascade_splits, ShadowCascade, ShadowRenderer, NUM_CASCADES};

use crate::config::RenderSettings;
use crate::foundation::math::{perspective, Mat4};
use thiserror::Error;

/// Renderer construction and per-frame failures
#[derive(Debug, Error)]
pub enum RenderError {
    /// A shader was missing an expected uniform
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Feature toggles the windowing layer exposes to the renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Draw in wireframe
    pub wireframe: bool,
    /// Back-face culling
    pub cull_face: bool,
    /// Multisampling requested at surface creation
    pub antialiasing: bool,
    /// Whether the frustum filter runs each frame
    pub frustum_culling: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wireframe: false,
            cull_face: true,
            antialiasing: true,
            frustum_culling: true,
        }
    }
}

/// Framebuffer size, projection matrix and options; owned by the windowing
/// layer and handed to the renderer each frame
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
    /// Current perspective projection
    pub projection: Mat4,
    /// Feature toggles
    pub options: RenderOptions,
}

impl ViewportState {
    /// Viewport with a projection derived from the render settings
    pub fn new(width: u32, height: u32, settings: &RenderSettings) -> Self {
        let mut state = Self {
            width,
            height,
            projection: Mat4::identity(),
            options: RenderOptions::default(),
        };
        state.update_projection(settings);
        state
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Recompute the projection, e.g. after a resize
    pub fn update_projection(&mut self, settings: &RenderSettings) {
        self.projection = perspective(
            settings.fov,
            self.aspect_ratio(),
            settings.z_near,
            settings.z_far,
        );
    }

    /// Record a new framebuffer size and recompute the projection
    pub fn resize(&mut self, width: u32, height: u32, settings: &RenderSettings) {
        self.width = width;
        self.height = height;
        self.update_projection(settings);
    }
}
