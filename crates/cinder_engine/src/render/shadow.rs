//! Cascaded shadow maps
//!
//! Three depth-only passes per frame, one per cascade. Each cascade covers
//! a slice of the camera frustum; its light view and orthographic
//! projection are re-derived from the camera every frame so the shadow
//! volume tracks the view with no caching or temporal reuse.

use crate::assets::{AssetStore, MeshHandle};
use crate::config::RenderSettings;
use crate::foundation::math::{
    generic_view_matrix, orthographic, perspective, rad_to_deg, Mat4, Vec3, Vec4,
};
use crate::render::device::RenderDevice;
use crate::render::instancing::InstanceBatcher;
use crate::render::lights::DirectionalLight;
use crate::render::shader::{ShaderError, ShaderProgram};
use crate::scene::{RenderItem, Scene};
use log::warn;
use std::collections::HashMap;

/// Number of shadow cascades
pub const NUM_CASCADES: usize = 3;

const FRUSTUM_CORNERS: usize = 8;

/// Far planes of the three cascades for a given camera far plane: a tight
/// slice near the camera, a middle slice, and the rest of the frustum
pub fn cascade_splits(z_far: f32) -> [f32; NUM_CASCADES] {
    [z_far / 20.0, z_far / 10.0, z_far]
}

/// One shadow cascade: a camera-frustum slice and the light-space matrices
/// that cover it
#[derive(Debug, Clone)]
pub struct ShadowCascade {
    z_near: f32,
    z_far: f32,
    /// View matrix from the light's point of view
    pub light_view_matrix: Mat4,
    /// Orthographic projection fitted around the slice in light space
    pub ortho_projection_matrix: Mat4,
}

impl ShadowCascade {
    /// Cascade covering camera depths `z_near..z_far`
    pub fn new(z_near: f32, z_far: f32) -> Self {
        Self {
            z_near,
            z_far,
            light_view_matrix: Mat4::identity(),
            ortho_projection_matrix: Mat4::identity(),
        }
    }

    /// Far plane of the slice this cascade covers
    pub fn far_plane(&self) -> f32 {
        self.z_far
    }

    /// Re-derive the light view and projection for the current camera.
    ///
    /// Walks the eight corners of the slice frustum in world space, places
    /// the light at the corner centroid pushed back along the light
    /// direction by the slice's depth extent, and fits an orthographic box
    /// around the corners in light space.
    pub fn update(&mut self, fov: f32, aspect: f32, view: &Mat4, light: &DirectionalLight) {
        let projection_view = perspective(fov, aspect, self.z_near, self.z_far) * view;
        let Some(inverse) = projection_view.try_inverse() else {
            // Degenerate camera (zero aspect, collapsed view): keep last
            // frame's matrices rather than poisoning them with NaN.
            warn!("shadow cascade projection-view not invertible, keeping previous matrices");
            return;
        };

        let mut corners = [Vec3::zeros(); FRUSTUM_CORNERS];
        let mut centroid = Vec3::zeros();
        let mut min_z = f32::MAX;
        let mut max_z = f32::MIN;
        for (i, corner) in corners.iter_mut().enumerate() {
            let ndc = Vec4::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
                1.0,
            );
            let world = inverse * ndc;
            *corner = Vec3::new(world.x, world.y, world.z) / world.w;
            centroid += *corner;
            min_z = min_z.min(corner.z);
            max_z = max_z.max(corner.z);
        }
        centroid /= FRUSTUM_CORNERS as f32;

        let light_position = centroid + light.direction * (max_z - min_z);
        self.update_light_view_matrix(&light.direction, &light_position);
        self.update_light_projection_matrix(&corners);
    }

    fn update_light_view_matrix(&mut self, light_direction: &Vec3, light_position: &Vec3) {
        let pitch = rad_to_deg(light_direction.z.clamp(-1.0, 1.0).acos());
        let yaw = rad_to_deg(light_direction.x.clamp(-1.0, 1.0).asin());
        self.light_view_matrix =
            generic_view_matrix(light_position, &Vec3::new(pitch, yaw, 0.0));
    }

    fn update_light_projection_matrix(&mut self, corners: &[Vec3; FRUSTUM_CORNERS]) {
        let mut min = Vec3::repeat(f32::MAX);
        let mut max = Vec3::repeat(f32::MIN);
        for corner in corners {
            let c = self.light_view_matrix * Vec4::new(corner.x, corner.y, corner.z, 1.0);
            min = min.inf(&Vec3::new(c.x, c.y, c.z));
            max = max.sup(&Vec3::new(c.x, c.y, c.z));
        }
        let dist_z = max.z - min.z;
        self.ortho_projection_matrix = orthographic(min.x, max.x, min.y, max.y, 0.0, dist_z);
    }
}

/// Depth-only pass over the scene, once per cascade
pub struct ShadowRenderer {
    cascades: Vec<ShadowCascade>,
    splits: [f32; NUM_CASCADES],
    depth_shader: Box<dyn ShaderProgram>,
    batcher: InstanceBatcher,
}

impl ShadowRenderer {
    /// Build the cascades and declare the depth shader's uniforms; a shader
    /// missing any of them fails construction
    pub fn new(
        settings: &RenderSettings,
        mut depth_shader: Box<dyn ShaderProgram>,
    ) -> Result<Self, ShaderError> {
        depth_shader.declare_uniform("isInstanced")?;
        depth_shader.declare_uniform("modelNonInstancedMatrix")?;
        depth_shader.declare_uniform("lightViewMatrix")?;
        depth_shader.declare_uniform("jointsMatrix")?;
        depth_shader.declare_uniform("orthoProjectionMatrix")?;

        let splits = cascade_splits(settings.z_far);
        let mut cascades = Vec::with_capacity(NUM_CASCADES);
        let mut z_near = settings.z_near;
        for z_far in splits {
            cascades.push(ShadowCascade::new(z_near, z_far));
            z_near = z_far;
        }

        Ok(Self {
            cascades,
            splits,
            depth_shader,
            batcher: InstanceBatcher::new(),
        })
    }

    /// The cascades as of the last update
    pub fn cascades(&self) -> &[ShadowCascade] {
        &self.cascades
    }

    /// Cascade far planes
    pub fn splits(&self) -> &[f32; NUM_CASCADES] {
        &self.splits
    }

    /// Update the cascades and render the depth map for each one
    pub fn render(
        &mut self,
        fov: f32,
        aspect: f32,
        view: &Mat4,
        scene: &Scene,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        if let Some(lighting) = &scene.lighting {
            for cascade in &mut self.cascades {
                cascade.update(fov, aspect, view, &lighting.directional);
            }
        }

        self.depth_shader.bind();
        for i in 0..self.cascades.len() {
            let (ortho, light_view) = {
                let cascade = &self.cascades[i];
                (cascade.ortho_projection_matrix, cascade.light_view_matrix)
            };
            self.depth_shader.set_matrix("orthoProjectionMatrix", &ortho);
            self.depth_shader.set_matrix("lightViewMatrix", &light_view);
            device.begin_shadow_pass(i);
            Self::render_non_instanced(
                self.depth_shader.as_mut(),
                &scene.mesh_items,
                assets,
                device,
            );
            Self::render_instanced(
                self.depth_shader.as_mut(),
                &mut self.batcher,
                &scene.instanced_mesh_items,
                assets,
                device,
            );
        }
        device.end_shadow_pass();
        self.depth_shader.unbind();
    }

    fn render_non_instanced(
        shader: &mut dyn ShaderProgram,
        mesh_items: &HashMap<MeshHandle, Vec<RenderItem>>,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        shader.set_int("isInstanced", 0);
        for (&handle, items) in mesh_items {
            for item in items.iter().filter(|i| i.inside_frustum) {
                shader.set_matrix("modelNonInstancedMatrix", &item.model_matrix());
                if let Some(skinning) = &item.skinning {
                    if let Some(clip) = assets.clip(skinning.clip) {
                        if let Some(frame) = clip.frames.get(skinning.current_frame) {
                            shader.set_matrix_array("jointsMatrix", &frame.joint_matrices);
                        }
                    }
                }
                device.draw(handle);
            }
        }
    }

    fn render_instanced(
        shader: &mut dyn ShaderProgram,
        batcher: &mut InstanceBatcher,
        mesh_items: &HashMap<MeshHandle, Vec<RenderItem>>,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        shader.set_int("isInstanced", 1);
        for (&handle, items) in mesh_items {
            let Some(mesh) = assets.mesh(handle) else {
                continue;
            };
            let visible: Vec<RenderItem> = items
                .iter()
                .filter(|i| i.inside_frustum)
                .cloned()
                .collect();
            batcher.render_instanced(mesh, &visible, false, None, |records| {
                device.draw_instanced(handle, records);
            });
        }
    }
}
