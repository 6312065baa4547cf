//! Render device boundary
//!
//! Everything that actually touches the GPU sits behind this trait: clears,
//! state toggles, the shadow framebuffer, and the draw calls themselves.
//! Meshes are referred to by handle; the device keeps its own GPU copies
//! keyed the same way.

use crate::assets::MeshHandle;
use crate::render::camera::Camera;
use crate::render::instancing::InstanceRecord;

/// GPU abstraction the renderer drives
pub trait RenderDevice {
    /// Clear colour, depth and stencil for the new frame
    fn clear(&mut self);

    /// Set the viewport to the framebuffer size
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Toggle depth-buffer writes. Disabled while particles are drawn.
    fn set_depth_write(&mut self, enabled: bool);

    /// Toggle additive blending. Enabled while particles are drawn.
    fn set_additive_blend(&mut self, enabled: bool);

    /// Bind the shadow framebuffer targeting the given cascade's depth map
    /// and clear it; the viewport is expected to match the shadow map size
    fn begin_shadow_pass(&mut self, cascade: usize);

    /// Return to the default framebuffer after the last cascade
    fn end_shadow_pass(&mut self);

    /// Bind the cascade depth maps starting at the given texture unit
    fn bind_shadow_maps(&mut self, first_unit: u32);

    /// Draw a mesh once
    fn draw(&mut self, mesh: MeshHandle);

    /// Draw a mesh once per instance record
    fn draw_instanced(&mut self, mesh: MeshHandle, instances: &[InstanceRecord]);

    /// Hook for debug geometry (axes, crosshair overlays); devices without
    /// debug support leave this empty
    fn draw_debug_overlays(&mut self, camera: &Camera) {
        let _ = camera;
    }
}
