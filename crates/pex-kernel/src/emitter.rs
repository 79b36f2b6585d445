//! Particle emitter.
//!
//! Ties the pieces together: the emission controller decides how many
//! particles are due, the pool hands out slots for them, and every live
//! particle is then stepped and written to the vertex buffer.
//!
//! # Example
//!
//! ```
//! use pex_kernel::attributes::AttributeMap;
//! use pex_kernel::emitter::ParticleEmitter;
//!
//! let attrs = AttributeMap::new()
//!     .with("texture", "name", "circle.png")
//!     .with("maxParticles", "value", 100)
//!     .with("particleLifespan", "value", 2.0)
//!     .with("speed", "value", 40.0);
//!
//! let mut emitter = ParticleEmitter::from_source(&attrs, 7).expect("valid description");
//! emitter.advance(1.0 / 60.0);
//!
//! assert_eq!(emitter.vertex_buffer().len(), emitter.live_particle_count());
//! ```

use std::path::Path;

use glam::Vec2;
use pex_common::{ConfigResult, PointSprite};
use tracing::{debug, warn};

use crate::attributes::{AttributeSource, TomlAttributes};
use crate::config::{BlendFunc, EmitterConfig};
use crate::controller::EmissionController;
use crate::particle::Particle;
use crate::pool::ParticlePool;
use crate::sampler::VarianceSampler;
use crate::texture::TextureSource;
use crate::update::{step_particle, FrameEnv};

/// A configured particle emitter and its live particles.
///
/// Single-threaded: call [`advance`](Self::advance) once per frame, then
/// read [`vertex_buffer`](Self::vertex_buffer) before the next advance.
pub struct ParticleEmitter {
    /// Loaded configuration, `None` until the first successful load.
    config: Option<EmitterConfig>,
    /// Live particles and vertex records.
    pool: ParticlePool,
    /// Emission state machine.
    controller: EmissionController,
    /// Randomness for particle initialization.
    sampler: VarianceSampler,
    /// Current source position (may differ from the configured one).
    source_position: Vec2,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self::with_seed(crate::sampler::DEFAULT_SEED)
    }
}

impl ParticleEmitter {
    /// Creates an inactive emitter with no configuration.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: None,
            pool: ParticlePool::new(0),
            controller: EmissionController::new(),
            sampler: VarianceSampler::new(seed),
            source_position: Vec2::ZERO,
        }
    }

    /// Creates an active emitter from a configuration.
    #[must_use]
    pub fn new(config: EmitterConfig, seed: u64) -> Self {
        let mut emitter = Self::with_seed(seed);
        emitter.install(config);
        emitter
    }

    /// Creates an active emitter from an attribute source.
    pub fn from_source(source: &impl AttributeSource, seed: u64) -> ConfigResult<Self> {
        Ok(Self::new(EmitterConfig::load(source)?, seed))
    }

    /// Loads (or reloads) the configuration.
    ///
    /// On success all particles are dropped and emission restarts. On
    /// failure the emitter is left exactly as it was.
    pub fn load(&mut self, source: &impl AttributeSource) -> ConfigResult<()> {
        let config = EmitterConfig::load(source)?;
        self.install(config);
        Ok(())
    }

    /// Loads a TOML emitter description from text.
    pub fn load_toml(&mut self, text: &str) -> ConfigResult<()> {
        let source = TomlAttributes::parse(text)?;
        self.load(&source)
    }

    /// Loads a TOML emitter description from a file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let source = TomlAttributes::from_path(path)?;
        self.load(&source)?;
        debug!("Loaded emitter from {}", path.display());
        Ok(())
    }

    fn install(&mut self, config: EmitterConfig) {
        self.source_position = config.source_position;
        self.pool = ParticlePool::new(config.max_particles);
        self.config = Some(config);
        self.controller.start();
    }

    /// Advances the simulation by `delta` seconds.
    ///
    /// Spawns whatever emission is due, steps every live particle and
    /// rewrites the vertex buffer. Negative or NaN deltas count as zero.
    pub fn advance(&mut self, delta: f32) {
        let delta = delta.max(0.0);
        let Some(config) = self.config.as_ref() else {
            return;
        };

        let source_position = self.source_position;
        let pool = &mut self.pool;
        let sampler = &mut self.sampler;

        self.controller.tick(delta, config, || match pool.try_spawn() {
            Some(slot) => {
                if let Some(particle) = pool.get_mut(slot) {
                    particle.init(config, source_position, sampler, delta);
                }
                true
            }
            None => false,
        });

        let env = FrameEnv::new(config, source_position);
        pool.for_each_live(|particle, sprite| {
            let alive = step_particle(particle, delta, &env);
            if alive {
                *sprite = particle.sprite();
            }
            alive
        });
    }

    /// Restarts emission, keeping live particles.
    pub fn start(&mut self) {
        if self.config.is_none() {
            warn!("Cannot start an emitter without configuration");
            return;
        }
        self.controller.start();
    }

    /// Stops emitting. Live particles keep aging until they expire.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Drops all live particles and restarts emission.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.start();
    }

    /// Reseeds the random sampler.
    pub fn reseed(&mut self, seed: u64) {
        self.sampler.reseed(seed);
    }

    /// Moves the emission source, e.g. to follow a pointer.
    pub fn set_source_position(&mut self, position: Vec2) {
        self.source_position = position;
    }

    /// Current emission source.
    #[must_use]
    pub fn source_position(&self) -> Vec2 {
        self.source_position
    }

    /// Returns true while new particles are being emitted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Number of live particles.
    #[must_use]
    pub fn live_particle_count(&self) -> usize {
        self.pool.len()
    }

    /// One vertex record per live particle.
    #[must_use]
    pub fn vertex_buffer(&self) -> &[PointSprite] {
        self.pool.vertices()
    }

    /// The vertex buffer as raw bytes, ready for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.pool.vertices())
    }

    /// Live particles in vertex buffer order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.pool.particles()
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> Option<&EmitterConfig> {
        self.config.as_ref()
    }

    /// Texture reference for the renderer.
    #[must_use]
    pub fn texture(&self) -> Option<&TextureSource> {
        self.config.as_ref().map(|c| &c.texture)
    }

    /// Blend factors for the renderer.
    #[must_use]
    pub fn blend_func(&self) -> Option<BlendFunc> {
        self.config.as_ref().map(|c| c.blend_func)
    }

    /// Seconds since emission started.
    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.controller.elapsed()
    }

    /// Unspent emission time.
    #[must_use]
    pub fn emit_counter(&self) -> f32 {
        self.controller.emit_counter()
    }
}

impl std::fmt::Debug for ParticleEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleEmitter")
            .field("active", &self.controller.is_active())
            .field("live", &self.pool.len())
            .field("capacity", &self.pool.capacity())
            .field("source_position", &self.source_position)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::particle::MIN_TIME_TO_LIVE;
    use pex_common::ConfigError;
    use proptest::prelude::*;

    /// Description with every variance zeroed.
    fn exact(max: i32, lifespan: f32) -> AttributeMap {
        let mut attrs = AttributeMap::new()
            .with("texture", "name", "circle.png")
            .with("maxParticles", "value", max)
            .with("particleLifespan", "value", lifespan);
        for element in ["startColorVariance", "finishColorVariance"] {
            for channel in ["red", "green", "blue", "alpha"] {
                attrs.set(element, channel, 0);
            }
        }
        attrs
    }

    #[test]
    fn test_unloaded_emitter_is_inert() {
        let mut emitter = ParticleEmitter::default();
        emitter.advance(1.0);
        emitter.start();

        assert!(!emitter.is_active());
        assert_eq!(emitter.live_particle_count(), 0);
        assert!(emitter.config().is_none());
        assert!(emitter.texture().is_none());
    }

    #[test]
    fn test_emission_accumulation() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 1).expect("loads");
        assert!(emitter.is_active());

        emitter.advance(0.35);

        assert_eq!(emitter.live_particle_count(), 3);
        assert_eq!(emitter.vertex_buffer().len(), 3);
        assert!((emitter.emit_counter() - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_particle_first_frame() {
        let attrs = exact(100, 10.0)
            .with("sourcePosition", "x", 10)
            .with("sourcePosition", "y", 20)
            .with("gravity", "y", -9.8);
        let mut emitter = ParticleEmitter::from_source(&attrs, 1).expect("loads");

        // Spawns one particle (0.15 > 0.1) and steps it by the same delta
        emitter.advance(0.15);
        assert_eq!(emitter.live_particle_count(), 1);

        let particle = emitter.particles()[0];
        let velocity = particle.velocity().expect("gravity motion");
        assert!((velocity.y + 9.8 * 0.15).abs() < 1e-4);
        assert!((particle.position.y - (20.0 - 9.8 * 0.15 * 0.15)).abs() < 1e-4);

        let sprite = emitter.vertex_buffer()[0];
        assert_eq!(sprite.position(), particle.position);
    }

    #[test]
    fn test_time_to_live_decreases_then_removed() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 1.0), 2).expect("loads");

        // One particle at t = 0.015, then no more emission
        emitter.advance(0.015);
        emitter.stop();
        assert_eq!(emitter.live_particle_count(), 1);

        let mut last_ttl = emitter.particles()[0].time_to_live;
        for _ in 0..20 {
            emitter.advance(0.1);
            match emitter.particles().first() {
                Some(p) => {
                    assert!(p.time_to_live <= last_ttl);
                    last_ttl = p.time_to_live;
                }
                None => break,
            }
        }

        assert_eq!(emitter.live_particle_count(), 0);
        assert!(emitter.vertex_buffer().is_empty());
    }

    #[test]
    fn test_short_lived_particles_reach_vertex_buffer() {
        // Variance far above the lifespan floors about half the samples
        let attrs = exact(600, 0.1).with("particleLifespanVariance", "value", 10);
        let mut emitter = ParticleEmitter::from_source(&attrs, 12).expect("loads");
        let interval = emitter
            .config()
            .and_then(EmitterConfig::emission_interval)
            .expect("spawning emitter");
        let delta = 1.0 / 60.0;

        emitter.advance(delta);

        // Nothing can have died before this frame, so every spawn is live
        let spawned = ((delta - emitter.emit_counter()) / interval).round() as usize;
        assert!(spawned > 50);
        assert_eq!(emitter.live_particle_count(), spawned);
        assert_eq!(emitter.vertex_buffer().len(), spawned);
        assert!(emitter
            .particles()
            .iter()
            .any(|p| p.time_to_live < MIN_TIME_TO_LIVE + 1e-4));
    }

    #[test]
    fn test_radial_min_radius_early_death() {
        let attrs = exact(100, 10.0)
            .with("emitterType", "value", 1)
            .with("maxRadius", "value", 100)
            .with("minRadius", "value", 10);
        let mut emitter = ParticleEmitter::from_source(&attrs, 3).expect("loads");

        emitter.advance(0.15);
        emitter.stop();
        assert_eq!(emitter.live_particle_count(), 1);

        let mut previous = emitter.particles()[0].radius().expect("radial motion");
        assert!((previous - 98.5).abs() < 1e-3);

        let mut below_min = false;
        for _ in 0..40 {
            emitter.advance(0.5);

            if below_min {
                // Dead even though nominal lifespan is left
                assert_eq!(emitter.live_particle_count(), 0);
                return;
            }

            let particle = emitter.particles()[0];
            let radius = particle.radius().expect("radial motion");
            // Linear: 10 units per second
            assert!((previous - radius - 5.0).abs() < 1e-3);
            previous = radius;

            if radius < 10.0 {
                assert!(particle.time_to_live.abs() < f32::EPSILON);
                below_min = true;
            }
        }
        panic!("radius never dropped below the minimum");
    }

    #[test]
    fn test_duration_expiry_keeps_particles_aging() {
        let attrs = exact(100, 10.0).with("duration", "value", 2.0);
        let mut emitter = ParticleEmitter::from_source(&attrs, 4).expect("loads");

        for _ in 0..25 {
            emitter.advance(0.1);
        }
        assert!(!emitter.is_active());
        let count = emitter.live_particle_count();
        assert!(count > 0);

        let ttl_before = emitter.particles()[0].time_to_live;
        emitter.advance(0.5);
        assert_eq!(emitter.live_particle_count(), count);
        assert!(emitter.particles()[0].time_to_live < ttl_before);
    }

    #[test]
    fn test_stop_then_start() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 5).expect("loads");
        emitter.advance(0.35);
        emitter.stop();

        emitter.advance(1.0);
        assert_eq!(emitter.live_particle_count(), 3);

        emitter.start();
        emitter.advance(0.35);
        assert_eq!(emitter.live_particle_count(), 6);
    }

    #[test]
    fn test_reset_clears_particles() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 5).expect("loads");
        emitter.advance(0.35);
        emitter.stop();

        emitter.reset();
        assert_eq!(emitter.live_particle_count(), 0);
        assert!(emitter.is_active());
        assert!(emitter.elapsed_time().abs() < f32::EPSILON);
    }

    #[test]
    fn test_reload_resets_state() {
        let attrs = exact(50, 5.0).with("speed", "value", 30);
        let mut emitter = ParticleEmitter::with_seed(6);

        emitter.load(&attrs).expect("loads");
        let first = emitter.config().cloned();
        emitter.advance(1.0);
        assert!(emitter.live_particle_count() > 0);

        emitter.load(&attrs).expect("loads");
        assert_eq!(emitter.config().cloned(), first);
        assert_eq!(emitter.live_particle_count(), 0);
        assert!(emitter.elapsed_time().abs() < f32::EPSILON);
        assert!(emitter.is_active());
    }

    #[test]
    fn test_failed_reload_keeps_state() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 7).expect("loads");
        emitter.advance(0.35);

        let result = emitter.load(&AttributeMap::new().with("maxParticles", "value", 3));
        assert!(matches!(result, Err(ConfigError::TextureUnresolved)));

        let result = emitter.load_toml("[broken");
        assert!(matches!(result, Err(ConfigError::MalformedSource(_))));

        assert_eq!(emitter.live_particle_count(), 3);
        assert_eq!(emitter.config().map(|c| c.max_particles), Some(100));
        assert!(emitter.is_active());
    }

    #[test]
    fn test_failed_first_load_stays_inactive() {
        let mut emitter = ParticleEmitter::with_seed(1);
        assert!(emitter.load(&AttributeMap::new()).is_err());
        assert!(!emitter.is_active());
    }

    #[test]
    fn test_source_position_follows_pointer() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 8).expect("loads");
        emitter.set_source_position(Vec2::new(300.0, 400.0));
        emitter.advance(0.15);

        assert_eq!(emitter.source_position(), Vec2::new(300.0, 400.0));
        assert_eq!(emitter.particles()[0].position, Vec2::new(300.0, 400.0));
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 9).expect("loads");
        emitter.advance(0.35);
        let ttl = emitter.particles()[0].time_to_live;

        emitter.advance(-1.0);
        emitter.advance(f32::NAN);
        assert!((emitter.particles()[0].time_to_live - ttl).abs() < f32::EPSILON);
        assert!((emitter.elapsed_time() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_pool_capacity_bounds_live_count() {
        // Lifespans of 2..4s against one spawn every 0.75s overrun 4 slots
        let attrs = exact(4, 3.0).with("particleLifespanVariance", "value", 1.0);
        let mut emitter = ParticleEmitter::from_source(&attrs, 10).expect("loads");

        let mut peak = 0;
        for _ in 0..400 {
            emitter.advance(0.05);
            assert!(emitter.live_particle_count() <= 4);
            peak = peak.max(emitter.live_particle_count());
        }
        assert_eq!(peak, 4);
    }

    #[test]
    fn test_vertex_bytes() {
        let mut emitter = ParticleEmitter::from_source(&exact(100, 10.0), 11).expect("loads");
        emitter.advance(0.35);

        assert_eq!(
            emitter.vertex_bytes().len(),
            3 * std::mem::size_of::<PointSprite>()
        );
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ring.toml");
        std::fs::write(
            &path,
            "[texture]\nname = \"ring.png\"\n[maxParticles]\nvalue = 12\n[particleLifespan]\nvalue = 1.5\n",
        )
        .expect("write");

        let mut emitter = ParticleEmitter::default();
        emitter.load_file(&path).expect("loads");
        assert_eq!(emitter.config().map(|c| c.max_particles), Some(12));
        assert_eq!(
            emitter.texture().and_then(TextureSource::path),
            Some(Path::new("ring.png"))
        );
    }

    fn arb_description() -> impl Strategy<Value = (AttributeMap, Vec<f32>)> {
        (
            0i32..48,
            0.05f32..3.0,
            0.0f32..3.0,
            0i32..2,
            prop::collection::vec(0.0f32..0.6, 1..40),
        )
            .prop_map(|(max, lifespan, variance, kind, deltas)| {
                let attrs = AttributeMap::new()
                    .with("texture", "name", "p.png")
                    .with("maxParticles", "value", max)
                    .with("particleLifespan", "value", lifespan)
                    .with("particleLifespanVariance", "value", variance)
                    .with("emitterType", "value", kind)
                    .with("speed", "value", 20)
                    .with("speedVariance", "value", 20)
                    .with("startParticleSize", "value", 4)
                    .with("finishParticleSizeVariance", "value", 8)
                    .with("maxRadius", "value", 50)
                    .with("minRadius", "value", 5)
                    .with("gravity", "y", -30);
                (attrs, deltas)
            })
    }

    proptest! {
        #[test]
        fn prop_frame_invariants((attrs, deltas) in arb_description(), seed in any::<u64>()) {
            let mut emitter = ParticleEmitter::from_source(&attrs, seed).expect("loads");
            let capacity = emitter.config().map_or(0, |c| c.max_particles);

            for delta in deltas {
                emitter.advance(delta);

                prop_assert!(emitter.live_particle_count() <= capacity);
                prop_assert_eq!(emitter.vertex_buffer().len(), emitter.live_particle_count());
                prop_assert_eq!(emitter.particles().len(), emitter.live_particle_count());
                prop_assert!(emitter.emit_counter() >= 0.0);

                for (particle, sprite) in emitter.particles().iter().zip(emitter.vertex_buffer()) {
                    prop_assert!(sprite.size >= 0.0);
                    prop_assert_eq!(sprite.position(), particle.position);
                    prop_assert!(particle.time_to_live >= 0.0);
                }
            }
        }
    }
}
