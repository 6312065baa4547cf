//! First-person camera
//!
//! Position plus Euler rotation in degrees, with a cached view matrix the
//! owner refreshes once per frame via [`Camera::update_view_matrix`].

use crate::foundation::math::{deg_to_rad, generic_view_matrix, Mat4, Vec3};

/// Observer position and orientation
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position
    pub position: Vec3,
    /// Euler rotation in degrees (pitch around X, yaw around Y)
    pub rotation: Vec3,
    view_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Camera at the origin looking down -Z
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            view_matrix: Mat4::identity(),
        }
    }

    /// The view matrix as of the last [`Camera::update_view_matrix`] call
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Recompute the cached view matrix from position and rotation
    pub fn update_view_matrix(&mut self) -> &Mat4 {
        self.view_matrix = generic_view_matrix(&self.position, &self.rotation);
        &self.view_matrix
    }

    /// Move relative to the current yaw: `offset.z` walks forward/backward,
    /// `offset.x` strafes, `offset.y` is world-vertical
    pub fn move_position(&mut self, offset: &Vec3) {
        let yaw = deg_to_rad(self.rotation.y);
        if offset.z != 0.0 {
            self.position.x += yaw.sin() * -1.0 * offset.z;
            self.position.z += yaw.cos() * offset.z;
        }
        if offset.x != 0.0 {
            let side = deg_to_rad(self.rotation.y - 90.0);
            self.position.x += side.sin() * -1.0 * offset.x;
            self.position.z += side.cos() * offset.x;
        }
        self.position.y += offset.y;
    }

    /// Add to the Euler rotation, in degrees
    pub fn move_rotation(&mut self, offset: &Vec3) {
        self.rotation += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forward_motion_follows_yaw() {
        let mut camera = Camera::new();
        camera.rotation.y = 90.0;
        camera.move_position(&Vec3::new(0.0, 0.0, -1.0));
        // Yawed 90 degrees, stepping forward moves along world +X.
        assert_relative_eq!(camera.position.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn view_matrix_updates_on_demand() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, 3.0);
        assert_relative_eq!(*camera.view_matrix(), Mat4::identity());
        camera.update_view_matrix();
        let p = camera
            .view_matrix()
            .transform_point(&nalgebra::Point3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(p.coords.norm(), 0.0, epsilon = 1e-6);
    }
}
