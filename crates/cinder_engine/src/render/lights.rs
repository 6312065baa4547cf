//! Light sources and fog
//!
//! Pure mathematical light definitions; the renderer re-expresses positions
//! and directions in view space every frame before pushing them to the
//! shader, so everything here stays in world space.

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Directional light (parallel rays, e.g. the sun). Drives the shadow
/// cascades.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Light colour
    pub colour: Vec3,
    /// Direction the light travels, normalized
    pub direction: Vec3,
    /// Light intensity
    pub intensity: f32,
}

impl DirectionalLight {
    /// Create a directional light with a normalized direction
    pub fn new(colour: Vec3, direction: Vec3, intensity: f32) -> Self {
        Self {
            colour,
            direction: direction.normalize(),
            intensity,
        }
    }

    /// Copy of this light with its direction re-expressed in view space
    pub fn in_view_space(&self, view: &Mat4) -> Self {
        let mut light = self.clone();
        let dir = view
            * Vec4::new(
                self.direction.x,
                self.direction.y,
                self.direction.z,
                0.0,
            );
        light.direction = Vec3::new(dir.x, dir.y, dir.z);
        light
    }
}

/// Distance attenuation factors for point and spot lights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            exponent: 0.0,
        }
    }
}

/// Omnidirectional point light
#[derive(Debug, Clone)]
pub struct PointLight {
    /// Light colour
    pub colour: Vec3,
    /// World-space position
    pub position: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Distance attenuation
    pub attenuation: Attenuation,
}

impl PointLight {
    /// Create a point light with default attenuation
    pub fn new(colour: Vec3, position: Vec3, intensity: f32) -> Self {
        Self {
            colour,
            position,
            intensity,
            attenuation: Attenuation::default(),
        }
    }

    /// Copy of this light with its position re-expressed in view space
    pub fn in_view_space(&self, view: &Mat4) -> Self {
        let mut light = self.clone();
        let pos = view * Vec4::new(self.position.x, self.position.y, self.position.z, 1.0);
        light.position = Vec3::new(pos.x, pos.y, pos.z);
        light
    }
}

/// Spot light: a point light restricted to a cone
#[derive(Debug, Clone)]
pub struct SpotLight {
    /// Underlying point light (colour, position, attenuation)
    pub point_light: PointLight,
    /// Cone axis direction, world space
    pub cone_direction: Vec3,
    /// Cosine of the cut-off angle
    pub cut_off: f32,
}

impl SpotLight {
    /// Create a spot light from a cut-off angle in degrees
    pub fn new(point_light: PointLight, cone_direction: Vec3, cut_off_degrees: f32) -> Self {
        Self {
            point_light,
            cone_direction,
            cut_off: cut_off_degrees.to_radians().cos(),
        }
    }

    /// Copy of this light with position and cone direction re-expressed in
    /// view space
    pub fn in_view_space(&self, view: &Mat4) -> Self {
        let mut light = self.clone();
        let dir = view
            * Vec4::new(
                self.cone_direction.x,
                self.cone_direction.y,
                self.cone_direction.z,
                0.0,
            );
        light.cone_direction = Vec3::new(dir.x, dir.y, dir.z);
        light.point_light = self.point_light.in_view_space(view);
        light
    }
}

/// Fog parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Whether fog is applied at all
    pub active: bool,
    /// Fog colour
    pub colour: Vec3,
    /// Exponential density
    pub density: f32,
}

impl Fog {
    /// Fog disabled
    pub fn none() -> Self {
        Self {
            active: false,
            colour: Vec3::zeros(),
            density: 0.0,
        }
    }
}

impl Default for Fog {
    fn default() -> Self {
        Self::none()
    }
}

/// All lights affecting a scene
#[derive(Debug, Clone)]
pub struct SceneLighting {
    /// Flat ambient term
    pub ambient: Vec3,
    /// Ambient term applied to the sky box
    pub sky_box_light: Vec3,
    /// The single shadow-casting directional light
    pub directional: DirectionalLight,
    /// Point lights, capped by the renderer's configured maximum
    pub point_lights: Vec<PointLight>,
    /// Spot lights, capped by the renderer's configured maximum
    pub spot_lights: Vec<SpotLight>,
}

impl SceneLighting {
    /// Lighting with just an ambient term and a directional light
    pub fn new(ambient: Vec3, sky_box_light: Vec3, directional: DirectionalLight) -> Self {
        Self {
            ambient,
            sky_box_light,
            directional,
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::generic_view_matrix;
    use approx::assert_relative_eq;

    #[test]
    fn point_light_position_moves_into_view_space() {
        let view = generic_view_matrix(&Vec3::new(0.0, 0.0, 10.0), &Vec3::zeros());
        let light = PointLight::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, 10.0), 1.0);
        let viewed = light.in_view_space(&view);
        assert_relative_eq!(viewed.position.norm(), 0.0, epsilon = 1e-6);
        // World-space original is untouched.
        assert_relative_eq!(light.position.z, 10.0);
    }

    #[test]
    fn spot_light_direction_rotates_but_does_not_translate() {
        let view = generic_view_matrix(&Vec3::new(5.0, 0.0, 0.0), &Vec3::zeros());
        let spot = SpotLight::new(
            PointLight::new(Vec3::new(1.0, 1.0, 1.0), Vec3::zeros(), 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            30.0,
        );
        let viewed = spot.in_view_space(&view);
        // Identity rotation: direction unchanged, position translated.
        assert_relative_eq!(viewed.cone_direction, spot.cone_direction, epsilon = 1e-6);
        assert_relative_eq!(viewed.point_light.position.x, -5.0, epsilon = 1e-6);
    }
}
