//! # Cinder Engine
//!
//! Core of a real-time 3D rendering engine: cascaded shadow maps, skeletal
//! animation evaluation, GPU instancing, frustum culling, particles and
//! terrain queries, driven against pluggable shader and device boundaries.
//!
//! ## Features
//!
//! - **Cascaded Shadow Maps**: Three camera-tracking cascades, re-fitted
//!   every frame
//! - **Skeletal Animation**: Load-time evaluation of joint hierarchies into
//!   ready-to-upload skinning matrices
//! - **GPU Instancing**: Chunked per-instance records with atlas and
//!   billboard support
//! - **Frustum Culling**: Bounding-sphere tests against the view frustum
//! - **Particles**: Deterministic flow emitters rendered as billboards
//! - **Terrain**: Height-field collision queries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cinder_engine::prelude::*;
//! # struct MyShader;
//! # impl cinder_engine::render::ShaderProgram for MyShader {
//! #     fn declare_uniform(&mut self, _: &str) -> Result<(), ShaderError> { Ok(()) }
//! #     fn bind(&mut self) {}
//! #     fn unbind(&mut self) {}
//! #     fn set_matrix(&mut self, _: &str, _: &Mat4) {}
//! #     fn set_matrix_array(&mut self, _: &str, _: &[Mat4]) {}
//! #     fn set_int(&mut self, _: &str, _: i32) {}
//! #     fn set_float(&mut self, _: &str, _: f32) {}
//! #     fn set_vec3(&mut self, _: &str, _: &Vec3) {}
//! #     fn set_vec4(&mut self, _: &str, _: &cinder_engine::foundation::math::Vec4) {}
//! # }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let _renderer = Renderer::new(
//!         config.render.clone(),
//!         Box::new(MyShader),
//!         Box::new(MyShader),
//!         Box::new(MyShader),
//!         Box::new(MyShader),
//!     )?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod anim;
pub mod assets;
pub mod config;
pub mod foundation;
pub mod particles;
pub mod render;
pub mod scene;
pub mod terrain;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        anim::{build_clip, AnimationClip, AnimationError},
        assets::{AssetStore, ClipHandle, Material, Mesh, MeshHandle, TextureAtlas},
        config::{ConfigError, EngineConfig, RenderSettings},
        foundation::{
            math::{Mat4, Quat, Vec3},
            time::Timer,
        },
        particles::{FlowEmitter, ParticleData},
        render::{
            Camera, RenderDevice, RenderError, Renderer, ShaderError, ShaderProgram,
            ViewportState,
        },
        scene::{RenderItem, Scene},
        terrain::Terrain,
    };
}
