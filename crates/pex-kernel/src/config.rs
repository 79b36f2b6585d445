//! Emitter configuration.
//!
//! Turns an attribute source into the immutable parameter set the
//! simulation runs on. Every parameter has a default, so a sparse
//! description still loads; only the texture reference is mandatory.

use glam::Vec2;
use pex_common::{Color4, ConfigResult};
use tracing::{info, warn};

use crate::attributes::AttributeSource;
use crate::texture::TextureSource;

/// GL blend factor `GL_ZERO`.
pub const GL_ZERO: u32 = 0;
/// GL blend factor `GL_ONE`.
pub const GL_ONE: u32 = 1;
/// GL blend factor `GL_SRC_ALPHA`.
pub const GL_SRC_ALPHA: u32 = 0x0302;
/// GL blend factor `GL_ONE_MINUS_SRC_ALPHA`.
pub const GL_ONE_MINUS_SRC_ALPHA: u32 = 0x0303;

/// Largest pool an emitter description may request.
///
/// Both the particle and vertex storage are allocated up front, so larger
/// requests are clamped to this with a warning.
pub const MAX_PARTICLES: usize = 1 << 20;

/// Motion model shared by every particle of an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum EmitterType {
    /// Speed, gravity and radial/tangential acceleration.
    #[default]
    Gravity = 0,
    /// Orbit around the source at a shrinking radius.
    Radial = 1,
}

impl EmitterType {
    /// Converts from the raw selector value. Unknown values select gravity.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Radial,
            _ => Self::Gravity,
        }
    }
}

/// Blend factors handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFunc {
    /// Source factor (GL enum).
    pub source: u32,
    /// Destination factor (GL enum).
    pub destination: u32,
}

impl Default for BlendFunc {
    fn default() -> Self {
        Self {
            source: GL_ONE,
            destination: GL_ONE_MINUS_SRC_ALPHA,
        }
    }
}

impl BlendFunc {
    /// Returns true for additive blending (destination factor `GL_ONE`).
    #[must_use]
    pub const fn is_additive(&self) -> bool {
        self.destination == GL_ONE
    }
}

/// Immutable emitter parameters.
///
/// Angles are in degrees, times in seconds. Each `*_variance` field is the
/// half-width of the uniform spread around its base value.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Motion model.
    pub emitter_type: EmitterType,
    /// Texture reference for the renderer.
    pub texture: TextureSource,
    /// Blend factors for the renderer.
    pub blend_func: BlendFunc,

    /// Emission origin.
    pub source_position: Vec2,
    /// Per-axis spread of the spawn position.
    pub source_position_variance: Vec2,
    /// Emission angle (degrees).
    pub angle: f32,
    /// Emission angle spread (degrees).
    pub angle_variance: f32,
    /// Initial speed.
    pub speed: f32,
    /// Initial speed spread.
    pub speed_variance: f32,
    /// Acceleration away from the spawn point.
    pub radial_acceleration: f32,
    /// Radial acceleration spread.
    pub radial_accel_variance: f32,
    /// Acceleration perpendicular to the radial direction.
    pub tangential_acceleration: f32,
    /// Tangential acceleration spread.
    pub tangential_accel_variance: f32,
    /// Constant acceleration.
    pub gravity: Vec2,

    /// Particle lifespan (seconds).
    pub particle_lifespan: f32,
    /// Lifespan spread (seconds).
    pub particle_lifespan_variance: f32,

    /// Color at spawn.
    pub start_color: Color4,
    /// Per-channel spread of the spawn color.
    pub start_color_variance: Color4,
    /// Color at death.
    pub finish_color: Color4,
    /// Per-channel spread of the death color.
    pub finish_color_variance: Color4,

    /// Size at spawn.
    pub start_particle_size: f32,
    /// Spawn size spread.
    pub start_particle_size_variance: f32,
    /// Size at death.
    pub finish_particle_size: f32,
    /// Death size spread.
    pub finish_particle_size_variance: f32,

    /// Pool capacity.
    pub max_particles: usize,
    /// Emission duration in seconds, `None` for infinite.
    pub duration: Option<f32>,

    /// Radial mode: spawn radius.
    pub max_radius: f32,
    /// Radial mode: spawn radius spread.
    pub max_radius_variance: f32,
    /// Radial mode: authored shrink speed. Kept for round-tripping; the
    /// shrink rate is derived from the spawn radius and time-to-live.
    pub radius_speed: f32,
    /// Radial mode: radius below which a particle dies.
    pub min_radius: f32,
    /// Radial mode: rotation rate (degrees per second).
    pub rotate_per_second: f32,
    /// Radial mode: rotation rate spread (degrees per second).
    pub rotate_per_second_variance: f32,
}

impl EmitterConfig {
    /// Builds a configuration from an attribute source.
    ///
    /// Fails only if the texture reference cannot be resolved.
    pub fn load(source: &impl AttributeSource) -> ConfigResult<Self> {
        let texture = TextureSource::resolve(source)?;

        let vec2 = |element: &str| {
            Vec2::new(
                source.get_f32(element, "x", 0.0),
                source.get_f32(element, "y", 0.0),
            )
        };
        let color = |element: &str| {
            Color4::new(
                source.get_f32(element, "red", 1.0),
                source.get_f32(element, "green", 1.0),
                source.get_f32(element, "blue", 1.0),
                source.get_f32(element, "alpha", 1.0),
            )
        };
        let scalar = |element: &str| source.get_f32(element, "value", 0.0);

        let defaults = BlendFunc::default();
        let blend_func = BlendFunc {
            source: blend_factor(source.get_i32(
                "blendFuncSource",
                "value",
                defaults.source as i32,
            )),
            destination: blend_factor(source.get_i32(
                "blendFuncDestination",
                "value",
                defaults.destination as i32,
            )),
        };

        let duration = source.get_f32("duration", "value", -1.0);

        let config = Self {
            emitter_type: EmitterType::from_i32(source.get_i32("emitterType", "value", 0)),
            texture,
            blend_func,

            source_position: vec2("sourcePosition"),
            source_position_variance: vec2("sourcePositionVariance"),
            angle: scalar("angle"),
            angle_variance: scalar("angleVariance"),
            speed: scalar("speed"),
            speed_variance: scalar("speedVariance"),
            radial_acceleration: scalar("radialAcceleration"),
            radial_accel_variance: scalar("radialAccelVariance"),
            tangential_acceleration: scalar("tangentialAcceleration"),
            tangential_accel_variance: scalar("tangentialAccelVariance"),
            gravity: vec2("gravity"),

            particle_lifespan: scalar("particleLifespan"),
            particle_lifespan_variance: scalar("particleLifespanVariance"),

            start_color: color("startColor"),
            start_color_variance: color("startColorVariance"),
            finish_color: color("finishColor"),
            finish_color_variance: color("finishColorVariance"),

            start_particle_size: scalar("startParticleSize"),
            start_particle_size_variance: scalar("startParticleSizeVariance"),
            finish_particle_size: scalar("finishParticleSize"),
            finish_particle_size_variance: scalar("finishParticleSizeVariance"),

            max_particles: capacity(source.get_i32("maxParticles", "value", 0)),
            duration: (duration >= 0.0).then_some(duration),

            max_radius: scalar("maxRadius"),
            max_radius_variance: scalar("maxRadiusVariance"),
            radius_speed: scalar("radiusSpeed"),
            min_radius: scalar("minRadius"),
            rotate_per_second: scalar("rotatePerSecond"),
            rotate_per_second_variance: scalar("rotatePerSecondVariance"),
        };

        if config.particle_lifespan <= 0.0 {
            warn!(
                "Non-positive particle lifespan {}; emitter will not spawn",
                config.particle_lifespan
            );
        }
        if config.max_particles == 0 {
            warn!("maxParticles is 0; emitter will not spawn");
        }

        info!(
            "Loaded {:?} emitter: {} particles, {:.2}/s",
            config.emitter_type,
            config.max_particles,
            config.emission_rate()
        );

        Ok(config)
    }

    /// Particles spawned per second: capacity divided by lifespan.
    ///
    /// Degenerate configurations (no capacity, non-positive lifespan) yield
    /// zero, which means "never spawn".
    #[must_use]
    pub fn emission_rate(&self) -> f32 {
        if self.max_particles == 0 || self.particle_lifespan <= 0.0 {
            return 0.0;
        }
        self.max_particles as f32 / self.particle_lifespan
    }

    /// Seconds between two spawns, `None` if the emitter never spawns.
    #[must_use]
    pub fn emission_interval(&self) -> Option<f32> {
        let rate = self.emission_rate();
        (rate > 0.0 && rate.is_finite()).then(|| 1.0 / rate)
    }
}

fn capacity(raw: i32) -> usize {
    let requested = raw.max(0) as usize;
    if requested > MAX_PARTICLES {
        warn!("maxParticles {requested} exceeds {MAX_PARTICLES}; clamping");
        return MAX_PARTICLES;
    }
    requested
}

fn blend_factor(raw: i32) -> u32 {
    raw.max(0) as u32
}
