//! Particle state and initialization.

use glam::Vec2;
use pex_common::{Color4, PointSprite};

use crate::config::{EmitterConfig, EmitterType};
use crate::sampler::VarianceSampler;

/// Smallest time-to-live a particle has left after its spawn frame.
///
/// A lifespan variance larger than the lifespan can sample a non-positive
/// value. The sampled lifespan is floored at this plus the spawn frame's
/// delta, so the particle survives the step that follows its spawn and
/// reaches the vertex buffer at least once.
pub const MIN_TIME_TO_LIVE: f32 = 1.0e-3;

/// Motion state, one variant per motion model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Free flight under gravity plus radial/tangential acceleration.
    Gravity {
        /// Spawn position. Accelerations act relative to this anchor.
        anchor: Vec2,
        /// Current velocity.
        velocity: Vec2,
        /// Acceleration away from the anchor.
        radial_acceleration: f32,
        /// Acceleration perpendicular to the radial direction.
        tangential_acceleration: f32,
    },
    /// Orbit around the emitter source.
    Radial {
        /// Current angle (radians).
        angle: f32,
        /// Angular velocity (radians per second, signed).
        angular_velocity: f32,
        /// Current distance from the source.
        radius: f32,
        /// Radius lost per second.
        radius_delta: f32,
    },
}

impl Default for Motion {
    fn default() -> Self {
        Self::Gravity {
            anchor: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radial_acceleration: 0.0,
            tangential_acceleration: 0.0,
        }
    }
}

/// A single live particle.
///
/// Color, size and radius deltas are rates per second so the ramps finish
/// exactly when the time-to-live runs out, whatever the frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    /// Current position.
    pub position: Vec2,
    /// Model-specific motion state.
    pub motion: Motion,
    /// Current color.
    pub color: Color4,
    /// Color change per second.
    pub color_delta: Color4,
    /// Current size (may go negative; clamped when written out).
    pub size: f32,
    /// Size change per second.
    pub size_delta: f32,
    /// Remaining lifetime in seconds.
    pub time_to_live: f32,
}

impl Particle {
    /// Populates this slot with a freshly spawned particle.
    ///
    /// `source_position` is the emitter's current source, which may have
    /// moved since the configuration was loaded. `first_step` is the delta
    /// the particle will be stepped by in its spawn frame.
    pub fn init(
        &mut self,
        config: &EmitterConfig,
        source_position: Vec2,
        sampler: &mut VarianceSampler,
        first_step: f32,
    ) {
        let position = sampler.variance_vec2(source_position, config.source_position_variance);

        let angle = sampler
            .variance(config.angle, config.angle_variance)
            .to_radians();
        let speed = sampler.variance(config.speed, config.speed_variance);
        let radial_acceleration =
            sampler.variance(config.radial_acceleration, config.radial_accel_variance);
        let tangential_acceleration = sampler.variance(
            config.tangential_acceleration,
            config.tangential_accel_variance,
        );

        let time_to_live = sampler
            .variance(config.particle_lifespan, config.particle_lifespan_variance)
            .max(MIN_TIME_TO_LIVE + first_step.max(0.0));

        let start_size = sampler.variance(
            config.start_particle_size,
            config.start_particle_size_variance,
        );
        let finish_size = sampler.variance(
            config.finish_particle_size,
            config.finish_particle_size_variance,
        );

        let start_color = sampler.variance_color(config.start_color, config.start_color_variance);
        let finish_color =
            sampler.variance_color(config.finish_color, config.finish_color_variance);

        let motion = match config.emitter_type {
            EmitterType::Gravity => Motion::Gravity {
                anchor: position,
                velocity: Vec2::from_angle(angle) * speed,
                radial_acceleration,
                tangential_acceleration,
            },
            EmitterType::Radial => {
                let radius = sampler.variance(config.max_radius, config.max_radius_variance);
                let angular_velocity = sampler
                    .variance(config.rotate_per_second, config.rotate_per_second_variance)
                    .to_radians();
                Motion::Radial {
                    angle,
                    angular_velocity,
                    radius,
                    radius_delta: radius / time_to_live,
                }
            }
        };

        *self = Self {
            position,
            motion,
            color: start_color,
            color_delta: (finish_color - start_color) / time_to_live,
            size: start_size,
            size_delta: (finish_size - start_size) / time_to_live,
            time_to_live,
        };
    }

    /// Returns true while the particle has lifetime left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.time_to_live > 0.0
    }

    /// Current velocity (gravity model only).
    #[must_use]
    pub fn velocity(&self) -> Option<Vec2> {
        match self.motion {
            Motion::Gravity { velocity, .. } => Some(velocity),
            Motion::Radial { .. } => None,
        }
    }

    /// Current orbit radius (radial model only).
    #[must_use]
    pub fn radius(&self) -> Option<f32> {
        match self.motion {
            Motion::Radial { radius, .. } => Some(radius),
            Motion::Gravity { .. } => None,
        }
    }

    /// Render record for this particle. Negative sizes are clamped to zero.
    #[must_use]
    pub fn sprite(&self) -> PointSprite {
        PointSprite::new(self.position, self.size.max(0.0), self.color)
    }
}
