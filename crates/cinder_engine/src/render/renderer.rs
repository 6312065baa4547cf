//! Frame orchestration
//!
//! One [`Renderer::render`] call draws a complete frame: clear, frustum
//! culling, the shadow cascades (only when the scene changed since the last
//! frame), the lit scene pass, the sky box, particles, and the device's
//! debug overlay hook. All uniform names are declared at construction, so a
//! shader missing one aborts initialization instead of failing mid-frame.

use crate::assets::{AssetStore, MeshHandle};
use crate::config::RenderSettings;
use crate::foundation::math::Mat4;
use crate::render::camera::Camera;
use crate::render::device::RenderDevice;
use crate::render::frustum::FrustumCullingFilter;
use crate::render::instancing::InstanceBatcher;
use crate::render::lights::SceneLighting;
use crate::render::shader::ShaderProgram;
use crate::render::shadow::{ShadowRenderer, NUM_CASCADES};
use crate::render::{RenderError, ViewportState};
use crate::scene::{RenderItem, Scene};
use std::collections::HashMap;

/// First texture unit used for the cascade shadow maps; units 0 and 1 hold
/// the diffuse texture and normal map
const SHADOW_MAP_FIRST_UNIT: u32 = 2;

/// Drives the fixed frame pass order against a render device
pub struct Renderer {
    settings: RenderSettings,
    scene_shader: Box<dyn ShaderProgram>,
    sky_box_shader: Box<dyn ShaderProgram>,
    particles_shader: Box<dyn ShaderProgram>,
    shadow_renderer: ShadowRenderer,
    frustum_filter: FrustumCullingFilter,
    batcher: InstanceBatcher,
}

impl Renderer {
    /// Declare every uniform on the four shader programs and build the
    /// shadow pipeline. Any missing uniform is fatal here.
    pub fn new(
        settings: RenderSettings,
        mut scene_shader: Box<dyn ShaderProgram>,
        mut sky_box_shader: Box<dyn ShaderProgram>,
        mut particles_shader: Box<dyn ShaderProgram>,
        depth_shader: Box<dyn ShaderProgram>,
    ) -> Result<Self, RenderError> {
        Self::declare_scene_uniforms(scene_shader.as_mut(), &settings)?;
        Self::declare_sky_box_uniforms(sky_box_shader.as_mut())?;
        Self::declare_particles_uniforms(particles_shader.as_mut())?;
        let shadow_renderer = ShadowRenderer::new(&settings, depth_shader)?;

        Ok(Self {
            settings,
            scene_shader,
            sky_box_shader,
            particles_shader,
            shadow_renderer,
            frustum_filter: FrustumCullingFilter::new(),
            batcher: InstanceBatcher::new(),
        })
    }

    fn declare_scene_uniforms(
        shader: &mut dyn ShaderProgram,
        settings: &RenderSettings,
    ) -> Result<(), RenderError> {
        shader.declare_uniform("viewMatrix")?;
        shader.declare_uniform("projectionMatrix")?;
        shader.declare_uniform("texture_sampler")?;
        shader.declare_uniform("normalMap")?;
        shader.declare_material_uniform("material")?;
        shader.declare_uniform("specularPower")?;
        shader.declare_uniform("ambientLight")?;
        shader.declare_point_light_list_uniform("pointLights", settings.max_point_lights)?;
        shader.declare_spot_light_list_uniform("spotLights", settings.max_spot_lights)?;
        shader.declare_directional_light_uniform("directionalLight")?;
        shader.declare_fog_uniform("fog")?;
        for i in 0..NUM_CASCADES {
            shader.declare_uniform(&format!("shadowMap_{i}"))?;
        }
        shader.declare_uniform_array("orthoProjectionMatrix", NUM_CASCADES)?;
        shader.declare_uniform("modelNonInstancedMatrix")?;
        shader.declare_uniform_array("lightViewMatrix", NUM_CASCADES)?;
        shader.declare_uniform_array("cascadeFarPlanes", NUM_CASCADES)?;
        shader.declare_uniform("renderShadow")?;
        shader.declare_uniform("jointsMatrix")?;
        shader.declare_uniform("isInstanced")?;
        shader.declare_uniform("numCols")?;
        shader.declare_uniform("numRows")?;
        shader.declare_uniform("selectedNonInstanced")?;
        Ok(())
    }

    fn declare_sky_box_uniforms(shader: &mut dyn ShaderProgram) -> Result<(), RenderError> {
        shader.declare_uniform("projectionMatrix")?;
        shader.declare_uniform("modelViewMatrix")?;
        shader.declare_uniform("texture_sampler")?;
        shader.declare_uniform("ambientLight")?;
        shader.declare_uniform("colour")?;
        shader.declare_uniform("hasTexture")?;
        Ok(())
    }

    fn declare_particles_uniforms(shader: &mut dyn ShaderProgram) -> Result<(), RenderError> {
        shader.declare_uniform("viewMatrix")?;
        shader.declare_uniform("projectionMatrix")?;
        shader.declare_uniform("texture_sampler")?;
        shader.declare_uniform("numCols")?;
        shader.declare_uniform("numRows")?;
        Ok(())
    }

    /// Draw one frame.
    ///
    /// `scene_changed` gates the shadow pass: when false, last frame's depth
    /// maps are reused as-is.
    pub fn render(
        &mut self,
        viewport: &ViewportState,
        camera: &Camera,
        scene: &mut Scene,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
        scene_changed: bool,
    ) {
        device.clear();

        if viewport.options.frustum_culling {
            self.frustum_filter
                .update_frustum(&viewport.projection, camera.view_matrix());
            self.frustum_filter.filter(assets, &mut scene.mesh_items);
            self.frustum_filter
                .filter(assets, &mut scene.instanced_mesh_items);
        }

        // Depth maps are rendered before the main viewport is set up.
        if scene.render_shadows && scene_changed {
            self.shadow_renderer.render(
                self.settings.fov,
                viewport.aspect_ratio(),
                camera.view_matrix(),
                scene,
                assets,
                device,
            );
        }
        device.set_viewport(viewport.width, viewport.height);

        self.render_scene(viewport, camera, scene, assets, device);
        self.render_sky_box(viewport, camera, scene, assets, device);
        self.render_particles(viewport, camera, scene, assets, device);
        device.draw_debug_overlays(camera);
    }

    fn render_scene(
        &mut self,
        viewport: &ViewportState,
        camera: &Camera,
        scene: &Scene,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        let shader = self.scene_shader.as_mut();
        shader.bind();
        let view = camera.view_matrix();
        shader.set_matrix("viewMatrix", view);
        shader.set_matrix("projectionMatrix", &viewport.projection);

        let splits = *self.shadow_renderer.splits();
        for (i, cascade) in self.shadow_renderer.cascades().iter().enumerate() {
            shader.set_matrix_at("orthoProjectionMatrix", &cascade.ortho_projection_matrix, i);
            shader.set_float_at("cascadeFarPlanes", splits[i], i);
            shader.set_matrix_at("lightViewMatrix", &cascade.light_view_matrix, i);
        }

        if let Some(lighting) = &scene.lighting {
            Self::render_lights(shader, view, lighting, &self.settings);
        }
        shader.set_fog("fog", &scene.fog);
        shader.set_int("texture_sampler", 0);
        shader.set_int("normalMap", 1);
        for i in 0..NUM_CASCADES {
            shader.set_int(
                &format!("shadowMap_{i}"),
                (SHADOW_MAP_FIRST_UNIT as usize + i) as i32,
            );
        }
        shader.set_int("renderShadow", i32::from(scene.render_shadows));

        Self::render_non_instanced(shader, &scene.mesh_items, assets, device);
        Self::render_instanced(
            shader,
            &mut self.batcher,
            &scene.instanced_mesh_items,
            assets,
            device,
        );
        shader.unbind();
    }

    fn render_lights(
        shader: &mut dyn ShaderProgram,
        view: &Mat4,
        lighting: &SceneLighting,
        settings: &RenderSettings,
    ) {
        shader.set_vec3("ambientLight", &lighting.ambient);
        shader.set_float("specularPower", settings.specular_power);

        // Lights are pushed in view space; the world-space originals in the
        // scene stay untouched.
        for (i, light) in lighting
            .point_lights
            .iter()
            .take(settings.max_point_lights)
            .enumerate()
        {
            shader.set_point_light_at("pointLights", &light.in_view_space(view), i);
        }
        for (i, light) in lighting
            .spot_lights
            .iter()
            .take(settings.max_spot_lights)
            .enumerate()
        {
            shader.set_spot_light_at("spotLights", &light.in_view_space(view), i);
        }
        shader.set_directional_light("directionalLight", &lighting.directional.in_view_space(view));
    }

    fn render_non_instanced(
        shader: &mut dyn ShaderProgram,
        mesh_items: &HashMap<MeshHandle, Vec<RenderItem>>,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        shader.set_int("isInstanced", 0);
        for (&handle, items) in mesh_items {
            let Some(mesh) = assets.mesh(handle) else {
                continue;
            };
            shader.set_material("material", &mesh.material);
            if let Some(atlas) = mesh.material.texture {
                shader.set_int("numCols", atlas.cols as i32);
                shader.set_int("numRows", atlas.rows as i32);
            }
            device.bind_shadow_maps(SHADOW_MAP_FIRST_UNIT);
            for item in items.iter().filter(|i| i.inside_frustum) {
                shader.set_float("selectedNonInstanced", if item.selected { 1.0 } else { 0.0 });
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
            shader.set_material("material", &mesh.material);
            if let Some(atlas) = mesh.material.texture {
                shader.set_int("numCols", atlas.cols as i32);
                shader.set_int("numRows", atlas.rows as i32);
            }
            let visible: Vec<RenderItem> = items
                .iter()
                .filter(|i| i.inside_frustum)
                .cloned()
                .collect();
            device.bind_shadow_maps(SHADOW_MAP_FIRST_UNIT);
            batcher.render_instanced(mesh, &visible, false, None, |records| {
                device.draw_instanced(handle, records);
            });
        }
    }

    fn render_sky_box(
        &mut self,
        viewport: &ViewportState,
        camera: &Camera,
        scene: &Scene,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        let Some((handle, item)) = &scene.sky_box else {
            return;
        };
        let Some(mesh) = assets.mesh(*handle) else {
            return;
        };
        let shader = self.sky_box_shader.as_mut();
        shader.bind();
        shader.set_int("texture_sampler", 0);
        shader.set_matrix("projectionMatrix", &viewport.projection);

        // The sky box follows the camera: drop the view translation so only
        // the rotation applies.
        let mut view = *camera.view_matrix();
        view[(0, 3)] = 0.0;
        view[(1, 3)] = 0.0;
        view[(2, 3)] = 0.0;
        shader.set_matrix("modelViewMatrix", &(view * item.model_matrix()));

        let ambient = scene
            .lighting
            .as_ref()
            .map(|l| l.sky_box_light)
            .unwrap_or_else(|| crate::foundation::math::Vec3::new(1.0, 1.0, 1.0));
        shader.set_vec3("ambientLight", &ambient);
        shader.set_vec4("colour", &mesh.material.ambient);
        shader.set_int("hasTexture", i32::from(mesh.material.is_textured()));
        device.draw(*handle);
        shader.unbind();
    }

    fn render_particles(
        &mut self,
        viewport: &ViewportState,
        camera: &Camera,
        scene: &Scene,
        assets: &AssetStore,
        device: &mut dyn RenderDevice,
    ) {
        if scene.emitters.is_empty() {
            return;
        }
        let shader = self.particles_shader.as_mut();
        shader.bind();
        let view = camera.view_matrix();
        shader.set_matrix("viewMatrix", view);
        shader.set_int("texture_sampler", 0);
        shader.set_matrix("projectionMatrix", &viewport.projection);

        device.set_depth_write(false);
        device.set_additive_blend(true);
        for emitter in &scene.emitters {
            let Some(mesh) = assets.mesh(emitter.mesh) else {
                continue;
            };
            if let Some(atlas) = mesh.material.texture {
                shader.set_int("numCols", atlas.cols as i32);
                shader.set_int("numRows", atlas.rows as i32);
            }
            self.batcher
                .render_instanced(mesh, &emitter.particles, true, Some(view), |records| {
                    device.draw_instanced(emitter.mesh, records);
                });
        }
        device.set_additive_blend(false);
        device.set_depth_write(true);
        shader.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Material, Mesh};
    use crate::foundation::math::{Vec3, Vec4};
    use crate::render::instancing::InstanceRecord;
    use crate::render::lights::{DirectionalLight, PointLight};
    use crate::render::shader::ShaderError;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct EventLog(Rc<RefCell<Vec<String>>>);

    impl EventLog {
        fn push(&self, event: impl Into<String>) {
            self.0.borrow_mut().push(event.into());
        }
        fn events(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
        fn position(&self, event: &str) -> Option<usize> {
            self.0.borrow().iter().position(|e| e.as_str() == event)
        }
    }

    /// Shader fake sharing one event log with the device fake, recording
    /// vec3 and matrix values for inspection
    struct FakeShader {
        label: &'static str,
        log: EventLog,
        missing_uniform: Option<&'static str>,
        vec3s: Rc<RefCell<std::collections::HashMap<String, Vec3>>>,
        matrices: Rc<RefCell<std::collections::HashMap<String, Mat4>>>,
    }

    impl FakeShader {
        fn new(label: &'static str, log: &EventLog) -> Self {
            Self {
                label,
                log: log.clone(),
                missing_uniform: None,
                vec3s: Rc::default(),
                matrices: Rc::default(),
            }
        }
    }

    impl ShaderProgram for FakeShader {
        fn declare_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
            if self.missing_uniform == Some(name) {
                return Err(ShaderError::UniformNotFound(name.to_string()));
            }
            Ok(())
        }
        fn bind(&mut self) {
            self.log.push(format!("{}: bind", self.label));
        }
        fn unbind(&mut self) {
            self.log.push(format!("{}: unbind", self.label));
        }
        fn set_matrix(&mut self, name: &str, value: &Mat4) {
            self.matrices.borrow_mut().insert(name.to_string(), *value);
        }
        fn set_matrix_array(&mut self, _name: &str, _values: &[Mat4]) {}
        fn set_int(&mut self, _name: &str, _value: i32) {}
        fn set_float(&mut self, _name: &str, _value: f32) {}
        fn set_vec3(&mut self, name: &str, value: &Vec3) {
            self.vec3s.borrow_mut().insert(name.to_string(), *value);
        }
        fn set_vec4(&mut self, _name: &str, _value: &Vec4) {}
    }

    struct FakeDevice {
        log: EventLog,
    }

    impl RenderDevice for FakeDevice {
        fn clear(&mut self) {
            self.log.push("clear");
        }
        fn set_viewport(&mut self, _width: u32, _height: u32) {
            self.log.push("viewport");
        }
        fn set_depth_write(&mut self, enabled: bool) {
            self.log.push(format!("depth_write {enabled}"));
        }
        fn set_additive_blend(&mut self, enabled: bool) {
            self.log.push(format!("additive_blend {enabled}"));
        }
        fn begin_shadow_pass(&mut self, cascade: usize) {
            self.log.push(format!("begin_shadow_pass {cascade}"));
        }
        fn end_shadow_pass(&mut self) {
            self.log.push("end_shadow_pass");
        }
        fn bind_shadow_maps(&mut self, _first_unit: u32) {}
        fn draw(&mut self, _mesh: MeshHandle) {
            self.log.push("draw");
        }
        fn draw_instanced(&mut self, _mesh: MeshHandle, instances: &[InstanceRecord]) {
            self.log.push(format!("draw_instanced {}", instances.len()));
        }
    }

    fn tiny_mesh() -> Mesh {
        Mesh::new(
            vec![[0.0, 0.0, 0.0]],
            vec![[0.0, 0.0]],
            vec![[0.0, 1.0, 0.0]],
            vec![0],
            Material::default(),
        )
    }

    fn lighting() -> SceneLighting {
        SceneLighting::new(
            Vec3::new(0.3, 0.3, 0.3),
            Vec3::new(1.0, 1.0, 1.0),
            DirectionalLight::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, 1.0), 1.0),
        )
    }

    struct Fixture {
        renderer: Renderer,
        viewport: ViewportState,
        camera: Camera,
        scene: Scene,
        assets: AssetStore,
        device: FakeDevice,
        log: EventLog,
        scene_vec3s: Rc<RefCell<std::collections::HashMap<String, Vec3>>>,
        sky_matrices: Rc<RefCell<std::collections::HashMap<String, Mat4>>>,
    }

    fn fixture() -> Fixture {
        let settings = RenderSettings::default();
        let log = EventLog::default();
        let scene_shader = FakeShader::new("scene", &log);
        let scene_vec3s = scene_shader.vec3s.clone();
        let sky_shader = FakeShader::new("sky", &log);
        let sky_matrices = sky_shader.matrices.clone();
        let renderer = Renderer::new(
            settings.clone(),
            Box::new(scene_shader),
            Box::new(sky_shader),
            Box::new(FakeShader::new("particles", &log)),
            Box::new(FakeShader::new("depth", &log)),
        )
        .unwrap();

        let mut assets = AssetStore::new();
        let mesh = assets.add_mesh(tiny_mesh());
        let mut scene = Scene::new();
        scene.add_items(&assets, mesh, vec![RenderItem::at(Vec3::new(0.0, 0.0, -5.0))]);
        scene.lighting = Some(lighting());

        let mut camera = Camera::new();
        camera.update_view_matrix();

        Fixture {
            renderer,
            viewport: ViewportState::new(800, 600, &settings),
            camera,
            scene,
            assets,
            device: FakeDevice { log: log.clone() },
            log,
            scene_vec3s,
            sky_matrices,
        }
    }

    #[test]
    fn missing_scene_uniform_fails_construction() {
        let log = EventLog::default();
        let mut scene_shader = FakeShader::new("scene", &log);
        scene_shader.missing_uniform = Some("fog.activeFog");
        let result = Renderer::new(
            RenderSettings::default(),
            Box::new(scene_shader),
            Box::new(FakeShader::new("sky", &log)),
            Box::new(FakeShader::new("particles", &log)),
            Box::new(FakeShader::new("depth", &log)),
        );
        assert!(matches!(
            result,
            Err(RenderError::Shader(ShaderError::UniformNotFound(name))) if name == "fog.activeFog"
        ));
    }

    #[test]
    fn shadow_pass_runs_before_scene_pass() {
        let mut f = fixture();
        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            true,
        );
        let end_shadow = f.log.position("end_shadow_pass").expect("shadow pass ran");
        let scene_bind = f.log.position("scene: bind").expect("scene pass ran");
        assert!(end_shadow < scene_bind);
        // All three cascades rendered.
        for i in 0..NUM_CASCADES {
            assert!(f.log.position(&format!("begin_shadow_pass {i}")).is_some());
        }
    }

    #[test]
    fn unchanged_scene_skips_shadow_pass_but_not_scene_pass() {
        let mut f = fixture();
        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            false,
        );
        assert!(f.log.position("begin_shadow_pass 0").is_none());
        assert!(f.log.position("scene: bind").is_some());
        assert!(f.log.position("draw").is_some());
    }

    #[test]
    fn shadows_disabled_on_scene_skip_shadow_pass() {
        let mut f = fixture();
        f.scene.render_shadows = false;
        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            true,
        );
        assert!(f.log.position("begin_shadow_pass 0").is_none());
    }

    #[test]
    fn point_lights_are_pushed_in_view_space() {
        let mut f = fixture();
        f.camera.position = Vec3::new(0.0, 0.0, 10.0);
        f.camera.update_view_matrix();
        let lighting = f.scene.lighting.as_mut().unwrap();
        lighting.point_lights.push(PointLight::new(
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 10.0),
            1.0,
        ));
        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            true,
        );
        let vec3s = f.scene_vec3s.borrow();
        let pushed = vec3s.get("pointLights[0].position").unwrap();
        assert_relative_eq!(pushed.norm(), 0.0, epsilon = 1e-5);
        // World-space light in the scene is untouched.
        assert_relative_eq!(
            f.scene.lighting.as_ref().unwrap().point_lights[0].position.z,
            10.0
        );
    }

    #[test]
    fn sky_box_view_matrix_loses_translation() {
        let mut f = fixture();
        let sky_mesh = f.assets.add_mesh(tiny_mesh());
        f.scene.sky_box = Some((sky_mesh, RenderItem::new()));
        f.camera.position = Vec3::new(3.0, 4.0, 5.0);
        f.camera.update_view_matrix();
        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            true,
        );
        let matrices = f.sky_matrices.borrow();
        let model_view = matrices.get("modelViewMatrix").unwrap();
        // Identity camera rotation and an origin sky box: stripping the view
        // translation leaves the identity.
        assert_relative_eq!(*model_view, Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn particles_draw_with_depth_writes_off_and_additive_blend() {
        use crate::particles::{FlowEmitter, ParticleData};

        let mut f = fixture();
        let particle_mesh = f.assets.add_mesh(tiny_mesh().with_max_instances(50));
        let base = RenderItem::new().with_particle(ParticleData::new(
            Vec3::zeros(),
            1000,
            100,
            1,
        ));
        let mut emitter = FlowEmitter::new(particle_mesh, base.clone(), 10, 100);
        emitter.particles.push(base);
        f.scene.emitters.push(emitter);

        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            true,
        );

        let events = f.log.events();
        let depth_off = f.log.position("depth_write false").unwrap();
        let depth_on = events
            .iter()
            .rposition(|e| e.as_str() == "depth_write true")
            .unwrap();
        let particle_draw = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("draw_instanced"))
            .map(|(i, _)| i)
            .next_back()
            .unwrap();
        assert!(depth_off < particle_draw && particle_draw < depth_on);
        assert!(f.log.position("additive_blend true").unwrap() < particle_draw);
    }

    #[test]
    fn culled_items_are_not_drawn() {
        let mut f = fixture();
        // Put the single item far behind the camera; culling marks it
        // outside and the scene pass draws nothing.
        for items in f.scene.mesh_items.values_mut() {
            items[0].position = Vec3::new(0.0, 0.0, 100.0);
        }
        f.renderer.render(
            &f.viewport,
            &f.camera,
            &mut f.scene,
            &f.assets,
            &mut f.device,
            false,
        );
        assert!(f.log.position("draw").is_none());
    }
}
