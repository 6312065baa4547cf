//! Particle effects
//!
//! Particles are ordinary render items carrying a [`ParticleData`]
//! capability; an emitter owns its live particles and is drawn by the
//! renderer's billboard-instanced particle pass.

use crate::assets::MeshHandle;
use crate::foundation::math::Vec3;
use crate::scene::RenderItem;
use rand::Rng;

/// Per-particle behaviour attached to a render item
#[derive(Debug, Clone, Copy)]
pub struct ParticleData {
    /// Velocity in world units per second
    pub speed: Vec3,
    /// Remaining time to live in milliseconds; the particle is removed once
    /// this goes negative
    pub ttl: i64,
    /// Milliseconds between texture-atlas frame advances
    pub update_texture_millis: i64,
    /// Milliseconds accumulated since the last frame advance
    pub current_anim_millis: i64,
    /// Total texture-atlas animation frames; 0 disables frame animation
    pub anim_frames: u32,
}

impl ParticleData {
    /// Create particle behaviour
    pub fn new(
        speed: Vec3,
        ttl: i64,
        update_texture_millis: i64,
        anim_frames: u32,
    ) -> Self {
        Self {
            speed,
            ttl,
            update_texture_millis,
            current_anim_millis: 0,
            anim_frames,
        }
    }
}

/// Update a particle's TTL and texture animation, returning the remaining
/// TTL. The caller removes the particle once the result is negative.
pub fn update_ttl(item: &mut RenderItem, elapsed_millis: i64) -> i64 {
    let Some(mut particle) = item.particle else {
        return 0;
    };
    particle.ttl -= elapsed_millis;
    particle.current_anim_millis += elapsed_millis;
    if particle.current_anim_millis >= particle.update_texture_millis && particle.anim_frames > 0 {
        particle.current_anim_millis = 0;
        item.texture_cell = (item.texture_cell + 1) % particle.anim_frames;
    }
    let ttl = particle.ttl;
    item.particle = Some(particle);
    ttl
}

/// Emitter that spawns copies of a base particle at a fixed cadence
///
/// Spawn timing accumulates the elapsed milliseconds handed to
/// [`FlowEmitter::update`], so emitters are deterministic with respect to
/// the game loop's timestep (no wall-clock sampling).
pub struct FlowEmitter {
    /// The mesh every particle of this emitter is drawn with (instanced)
    pub mesh: MeshHandle,
    /// Template copied for each spawned particle
    pub base_particle: RenderItem,
    /// Live particles
    pub particles: Vec<RenderItem>,
    /// Cap on live particles
    pub max_particles: usize,
    /// Whether the emitter spawns at all
    pub active: bool,
    /// Milliseconds between spawns
    pub creation_period_millis: i64,
    /// Random spread applied to each spawned particle's speed components
    pub speed_rnd_range: f32,
    /// Random spread applied to each spawned particle's position components
    pub position_rnd_range: f32,
    /// Random spread applied to each spawned particle's scale
    pub scale_rnd_range: f32,
    /// Random spread applied to the texture animation period
    pub anim_rnd_range: i64,
    since_last_creation: i64,
}

impl FlowEmitter {
    /// Create an inactive emitter
    pub fn new(
        mesh: MeshHandle,
        base_particle: RenderItem,
        max_particles: usize,
        creation_period_millis: i64,
    ) -> Self {
        Self {
            mesh,
            base_particle,
            particles: Vec::new(),
            max_particles,
            active: false,
            creation_period_millis,
            speed_rnd_range: 0.0,
            position_rnd_range: 0.0,
            scale_rnd_range: 0.0,
            anim_rnd_range: 0,
            since_last_creation: 0,
        }
    }

    /// Age, move, and cull live particles, then spawn if the period elapsed
    pub fn update(&mut self, elapsed_millis: i64) {
        self.particles.retain_mut(|particle| {
            if update_ttl(particle, elapsed_millis) < 0 {
                return false;
            }
            let delta = elapsed_millis as f32 / 1000.0;
            if let Some(data) = particle.particle {
                particle.position += data.speed * delta;
            }
            true
        });

        if !self.active {
            return;
        }
        self.since_last_creation += elapsed_millis;
        if self.since_last_creation >= self.creation_period_millis
            && self.particles.len() < self.max_particles
        {
            self.create_particle();
            self.since_last_creation = 0;
        }
    }

    fn create_particle(&mut self) {
        let mut rng = rand::thread_rng();
        let sign = if rng.gen_bool(0.5) { 1.0f32 } else { -1.0 };
        let speed_inc = sign * rng.gen::<f32>() * self.speed_rnd_range;
        let pos_inc = sign * rng.gen::<f32>() * self.position_rnd_range;
        let scale_inc = sign * rng.gen::<f32>() * self.scale_rnd_range;
        let anim_inc = (sign * rng.gen::<f32>() * self.anim_rnd_range as f32) as i64;

        let mut particle = self.base_particle.clone();
        particle.position += Vec3::new(pos_inc, pos_inc, pos_inc);
        particle.scale += scale_inc;
        if let Some(data) = particle.particle.as_mut() {
            data.speed += Vec3::new(speed_inc, speed_inc, speed_inc);
            data.update_texture_millis += anim_inc;
        }
        self.particles.push(particle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn dummy_mesh_handle() -> MeshHandle {
        let mut map: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        map.insert(())
    }

    fn particle_item(ttl: i64) -> RenderItem {
        RenderItem::new().with_particle(ParticleData::new(
            Vec3::new(0.0, 1.0, 0.0),
            ttl,
            100,
            4,
        ))
    }

    #[test]
    fn ttl_goes_negative_past_lifetime() {
        let mut item = particle_item(4000);
        assert!(update_ttl(&mut item, 4001) < 0);
    }

    #[test]
    fn emitter_removes_expired_particles() {
        let mut emitter = FlowEmitter::new(dummy_mesh_handle(), particle_item(4000), 10, 1000);
        emitter.particles.push(particle_item(4000));
        emitter.update(4001);
        assert!(emitter.particles.is_empty());
    }

    #[test]
    fn emitter_moves_live_particles_by_speed() {
        let mut emitter = FlowEmitter::new(dummy_mesh_handle(), particle_item(4000), 10, 1000);
        emitter.particles.push(particle_item(4000));
        emitter.update(500);
        let p = &emitter.particles[0];
        assert!((p.position.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn emitter_spawns_after_period_and_respects_cap() {
        let mut emitter = FlowEmitter::new(dummy_mesh_handle(), particle_item(100_000), 2, 1000);
        emitter.active = true;
        emitter.update(1000);
        assert_eq!(emitter.particles.len(), 1);
        // Period not yet elapsed again.
        emitter.update(500);
        assert_eq!(emitter.particles.len(), 1);
        emitter.update(500);
        assert_eq!(emitter.particles.len(), 2);
        // At the cap: no further spawns.
        emitter.update(2000);
        assert_eq!(emitter.particles.len(), 2);
    }

    #[test]
    fn texture_frame_advances_and_wraps() {
        let mut item = particle_item(100_000);
        update_ttl(&mut item, 100);
        assert_eq!(item.texture_cell, 1);
        update_ttl(&mut item, 100);
        update_ttl(&mut item, 100);
        update_ttl(&mut item, 100);
        assert_eq!(item.texture_cell, 0);
    }
}
