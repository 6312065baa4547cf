//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics, plus the handful of
//! matrix builders the renderer and shadow pipeline share.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Convert degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Convert radians to degrees
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

/// Build a model matrix from position, rotation and a uniform scale.
///
/// Equivalent to `translate(position) * rotate(rotation) * scale(s, s, s)`.
pub fn model_matrix(position: &Vec3, rotation: &Quat, scale: f32) -> Mat4 {
    Mat4::new_translation(position) * rotation.to_homogeneous() * Mat4::new_scaling(scale)
}

/// Build a view matrix for an observer at `position` with Euler `rotation`
/// given in degrees (pitch around X, yaw around Y, roll unused).
///
/// The rotation is applied first so the observer rotates over its own
/// position: `Rx(pitch) * Ry(yaw) * T(-position)`. The camera and the shadow
/// cascades' light view both go through this.
pub fn generic_view_matrix(position: &Vec3, rotation_degrees: &Vec3) -> Mat4 {
    let pitch = deg_to_rad(rotation_degrees.x);
    let yaw = deg_to_rad(rotation_degrees.y);
    Mat4::from_axis_angle(&Vec3::x_axis(), pitch)
        * Mat4::from_axis_angle(&Vec3::y_axis(), yaw)
        * Mat4::new_translation(&-position)
}

/// Perspective projection with OpenGL depth conventions (NDC z in [-1, 1]).
///
/// The cascade corner extraction inverts this matrix and walks the eight
/// NDC cube corners, so the depth range here and there must agree.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::new_perspective(aspect, fov_y, near, far)
}

/// Orthographic projection with OpenGL depth conventions.
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::new_orthographic(left, right, bottom, top, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn model_matrix_identity_for_default_item() {
        let m = model_matrix(&Vec3::zeros(), &Quat::identity(), 1.0);
        assert_relative_eq!(m, Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn model_matrix_applies_translation_and_scale() {
        let m = model_matrix(&Vec3::new(1.0, 2.0, 3.0), &Quat::identity(), 2.0);
        let p = m.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn view_matrix_translates_world_opposite_to_observer() {
        let view = generic_view_matrix(&Vec3::new(0.0, 0.0, 5.0), &Vec3::zeros());
        let p = view.transform_point(&nalgebra::Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(p.coords.norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn view_matrix_rotation_applies_before_translation() {
        // Observer at origin looking down -Z, yawed 90 degrees: world +X ends
        // up along the view -Z axis.
        let view = generic_view_matrix(&Vec3::zeros(), &Vec3::new(0.0, 90.0, 0.0));
        let p = view.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-6);
    }
}
