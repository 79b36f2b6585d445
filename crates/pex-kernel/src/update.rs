//! Per-particle frame integration.
//!
//! Both motion models use explicit Euler steps. Velocity is updated before
//! position, matching the reference effect format frame for frame.

use glam::Vec2;

use crate::config::EmitterConfig;
use crate::particle::{Motion, Particle};

/// Emitter-wide inputs of a frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEnv {
    /// Constant acceleration (gravity model).
    pub gravity: Vec2,
    /// Current emitter source; radial particles orbit it.
    pub source_position: Vec2,
    /// Radius below which radial particles die.
    pub min_radius: f32,
}

impl FrameEnv {
    /// Collects the step inputs from a configuration and the live source.
    #[must_use]
    pub fn new(config: &EmitterConfig, source_position: Vec2) -> Self {
        Self {
            gravity: config.gravity,
            source_position,
            min_radius: config.min_radius,
        }
    }
}

/// Advances one particle by `delta` seconds.
///
/// Returns false once the particle's time-to-live is used up; its state is
/// left untouched in that case. A radial particle that shrinks below the
/// minimum radius still returns true for this frame but has its
/// time-to-live zeroed, so it is removed on the next step.
pub fn step_particle(particle: &mut Particle, delta: f32, env: &FrameEnv) -> bool {
    particle.time_to_live -= delta;
    if !particle.is_alive() {
        return false;
    }

    match &mut particle.motion {
        Motion::Gravity {
            anchor,
            velocity,
            radial_acceleration,
            tangential_acceleration,
        } => {
            // Work relative to the spawn point so the radial direction is
            // measured from where the particle was born.
            let mut relative = particle.position - *anchor;

            let radial = relative.normalize_or_zero();
            let tangential = radial.perp() * *tangential_acceleration;
            let acceleration = radial * *radial_acceleration + tangential + env.gravity;

            *velocity += acceleration * delta;
            relative += *velocity * delta;
            particle.position = relative + *anchor;
        }
        Motion::Radial {
            angle,
            angular_velocity,
            radius,
            radius_delta,
        } => {
            *angle += *angular_velocity * delta;
            *radius -= *radius_delta * delta;
            particle.position = env.source_position - Vec2::from_angle(*angle) * *radius;

            if *radius < env.min_radius {
                particle.time_to_live = 0.0;
            }
        }
    }

    particle.color += particle.color_delta * delta;
    particle.size += particle.size_delta * delta;

    true
}
