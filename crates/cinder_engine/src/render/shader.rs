//! Shader program boundary
//!
//! The engine never touches a graphics API directly; it talks to shader
//! programs through this trait. Uniform names are declared up front at
//! renderer construction, so a shader that does not expose an expected
//! uniform fails the whole initialization instead of silently dropping
//! values at draw time.
//!
//! Struct- and array-shaped uniforms use dotted and indexed paths
//! (`pointLights[2].att.exponent`); the provided methods compose those
//! paths so callers deal in whole lights, materials and fog records.

use crate::assets::Material;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::lights::{DirectionalLight, Fog, PointLight, SpotLight};
use thiserror::Error;

/// Shader uniform declaration failures; always fatal at load time
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShaderError {
    /// The program has no uniform with the requested name
    #[error("could not find uniform: {0}")]
    UniformNotFound(String),
}

/// One linked shader program
pub trait ShaderProgram {
    /// Register a uniform by name. Fails when the program does not expose
    /// the name.
    fn declare_uniform(&mut self, name: &str) -> Result<(), ShaderError>;

    /// Make the program current
    fn bind(&mut self);

    /// Make no program current
    fn unbind(&mut self);

    /// Set a 4x4 matrix uniform
    fn set_matrix(&mut self, name: &str, value: &Mat4);

    /// Set a contiguous array of 4x4 matrices
    fn set_matrix_array(&mut self, name: &str, values: &[Mat4]);

    /// Set an integer uniform
    fn set_int(&mut self, name: &str, value: i32);

    /// Set a float uniform
    fn set_float(&mut self, name: &str, value: f32);

    /// Set a vec3 uniform
    fn set_vec3(&mut self, name: &str, value: &Vec3);

    /// Set a vec4 uniform
    fn set_vec4(&mut self, name: &str, value: &Vec4);

    /// Declare `name[0]` through `name[size - 1]`
    fn declare_uniform_array(&mut self, name: &str, size: usize) -> Result<(), ShaderError> {
        for i in 0..size {
            self.declare_uniform(&format!("{name}[{i}]"))?;
        }
        Ok(())
    }

    /// Declare the fields of a material struct uniform
    fn declare_material_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        self.declare_uniform(&format!("{name}.ambient"))?;
        self.declare_uniform(&format!("{name}.diffuse"))?;
        self.declare_uniform(&format!("{name}.specular"))?;
        self.declare_uniform(&format!("{name}.hasTexture"))?;
        self.declare_uniform(&format!("{name}.hasNormalMap"))?;
        self.declare_uniform(&format!("{name}.reflectance"))?;
        Ok(())
    }

    /// Declare the fields of a fog struct uniform
    fn declare_fog_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        self.declare_uniform(&format!("{name}.activeFog"))?;
        self.declare_uniform(&format!("{name}.colour"))?;
        self.declare_uniform(&format!("{name}.density"))?;
        Ok(())
    }

    /// Declare the fields of a point-light struct uniform
    fn declare_point_light_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        self.declare_uniform(&format!("{name}.colour"))?;
        self.declare_uniform(&format!("{name}.position"))?;
        self.declare_uniform(&format!("{name}.intensity"))?;
        self.declare_uniform(&format!("{name}.att.constant"))?;
        self.declare_uniform(&format!("{name}.att.linear"))?;
        self.declare_uniform(&format!("{name}.att.exponent"))?;
        Ok(())
    }

    /// Declare a point-light array uniform
    fn declare_point_light_list_uniform(
        &mut self,
        name: &str,
        size: usize,
    ) -> Result<(), ShaderError> {
        for i in 0..size {
            self.declare_point_light_uniform(&format!("{name}[{i}]"))?;
        }
        Ok(())
    }

    /// Declare the fields of a spot-light struct uniform
    fn declare_spot_light_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        self.declare_point_light_uniform(&format!("{name}.pl"))?;
        self.declare_uniform(&format!("{name}.conedir"))?;
        self.declare_uniform(&format!("{name}.cutoff"))?;
        Ok(())
    }

    /// Declare a spot-light array uniform
    fn declare_spot_light_list_uniform(
        &mut self,
        name: &str,
        size: usize,
    ) -> Result<(), ShaderError> {
        for i in 0..size {
            self.declare_spot_light_uniform(&format!("{name}[{i}]"))?;
        }
        Ok(())
    }

    /// Declare the fields of a directional-light struct uniform
    fn declare_directional_light_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        self.declare_uniform(&format!("{name}.colour"))?;
        self.declare_uniform(&format!("{name}.direction"))?;
        self.declare_uniform(&format!("{name}.intensity"))?;
        Ok(())
    }

    /// Set one element of a matrix array uniform
    fn set_matrix_at(&mut self, name: &str, value: &Mat4, index: usize) {
        self.set_matrix(&format!("{name}[{index}]"), value);
    }

    /// Set one element of a float array uniform
    fn set_float_at(&mut self, name: &str, value: f32, index: usize) {
        self.set_float(&format!("{name}[{index}]"), value);
    }

    /// Set all fields of a material struct uniform
    fn set_material(&mut self, name: &str, material: &Material) {
        self.set_vec4(&format!("{name}.ambient"), &material.ambient);
        self.set_vec4(&format!("{name}.diffuse"), &material.diffuse);
        self.set_vec4(&format!("{name}.specular"), &material.specular);
        self.set_int(
            &format!("{name}.hasTexture"),
            i32::from(material.is_textured()),
        );
        self.set_int(
            &format!("{name}.hasNormalMap"),
            i32::from(material.has_normal_map),
        );
        self.set_float(&format!("{name}.reflectance"), material.reflectance);
    }

    /// Set all fields of a fog struct uniform
    fn set_fog(&mut self, name: &str, fog: &Fog) {
        self.set_int(&format!("{name}.activeFog"), i32::from(fog.active));
        self.set_vec3(&format!("{name}.colour"), &fog.colour);
        self.set_float(&format!("{name}.density"), fog.density);
    }

    /// Set all fields of a point-light struct uniform
    fn set_point_light(&mut self, name: &str, light: &PointLight) {
        self.set_vec3(&format!("{name}.colour"), &light.colour);
        self.set_vec3(&format!("{name}.position"), &light.position);
        self.set_float(&format!("{name}.intensity"), light.intensity);
        self.set_float(&format!("{name}.att.constant"), light.attenuation.constant);
        self.set_float(&format!("{name}.att.linear"), light.attenuation.linear);
        self.set_float(&format!("{name}.att.exponent"), light.attenuation.exponent);
    }

    /// Set one element of a point-light array uniform
    fn set_point_light_at(&mut self, name: &str, light: &PointLight, index: usize) {
        self.set_point_light(&format!("{name}[{index}]"), light);
    }

    /// Set all fields of a spot-light struct uniform
    fn set_spot_light(&mut self, name: &str, light: &SpotLight) {
        self.set_point_light(&format!("{name}.pl"), &light.point_light);
        self.set_vec3(&format!("{name}.conedir"), &light.cone_direction);
        self.set_float(&format!("{name}.cutoff"), light.cut_off);
    }

    /// Set one element of a spot-light array uniform
    fn set_spot_light_at(&mut self, name: &str, light: &SpotLight, index: usize) {
        self.set_spot_light(&format!("{name}[{index}]"), light);
    }

    /// Set all fields of a directional-light struct uniform
    fn set_directional_light(&mut self, name: &str, light: &DirectionalLight) {
        self.set_vec3(&format!("{name}.colour"), &light.colour);
        self.set_vec3(&format!("{name}.direction"), &light.direction);
        self.set_float(&format!("{name}.intensity"), light.intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Shader that accepts every declaration and records names and sets
    #[derive(Default)]
    struct RecordingShader {
        declared: HashSet<String>,
        sets: Vec<String>,
    }

    impl ShaderProgram for RecordingShader {
        fn declare_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
            self.declared.insert(name.to_string());
            Ok(())
        }
        fn bind(&mut self) {}
        fn unbind(&mut self) {}
        fn set_matrix(&mut self, name: &str, _value: &Mat4) {
            self.sets.push(name.to_string());
        }
        fn set_matrix_array(&mut self, name: &str, _values: &[Mat4]) {
            self.sets.push(name.to_string());
        }
        fn set_int(&mut self, name: &str, _value: i32) {
            self.sets.push(name.to_string());
        }
        fn set_float(&mut self, name: &str, _value: f32) {
            self.sets.push(name.to_string());
        }
        fn set_vec3(&mut self, name: &str, _value: &Vec3) {
            self.sets.push(name.to_string());
        }
        fn set_vec4(&mut self, name: &str, _value: &Vec4) {
            self.sets.push(name.to_string());
        }
    }

    #[test]
    fn spot_light_list_declares_nested_paths() {
        let mut shader = RecordingShader::default();
        shader.declare_spot_light_list_uniform("spotLights", 2).unwrap();
        assert!(shader.declared.contains("spotLights[0].pl.att.exponent"));
        assert!(shader.declared.contains("spotLights[1].conedir"));
        assert!(shader.declared.contains("spotLights[1].cutoff"));
    }

    #[test]
    fn point_light_set_targets_indexed_paths() {
        let mut shader = RecordingShader::default();
        let light = PointLight::new(Vec3::new(1.0, 1.0, 1.0), Vec3::zeros(), 1.0);
        shader.set_point_light_at("pointLights", &light, 3);
        assert!(shader.sets.contains(&"pointLights[3].position".to_string()));
        assert!(shader
            .sets
            .contains(&"pointLights[3].att.constant".to_string()));
    }
}
