//! # Pex Kernel
//!
//! CPU simulation core for 2D particle emitters.
//!
//! This crate provides:
//! - Emitter descriptions read from element/attribute sources (TOML or in-memory)
//! - Texture references, including base64 inline data with optional compression
//! - A fixed-capacity particle pool with O(1) swap-removal
//! - Gravity and radial motion models with per-particle color/size ramps
//! - Fractional emission driven by frame deltas
//! - A render-ready vertex buffer of point sprites
//!
//! ## Frame Model
//!
//! The host calls [`ParticleEmitter::advance`] once per frame with the
//! elapsed time in seconds. The emitter first spawns whatever emission is
//! due, then steps every live particle and rewrites its vertex record.
//! After `advance` returns, the vertex buffer holds exactly one record per
//! live particle and can be uploaded as-is.
//!
//! ## Determinism
//!
//! All randomness comes from a seeded sampler, so the same description,
//! seed and delta sequence always produce the same particles.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attributes;
pub mod config;
pub mod controller;
pub mod emitter;
pub mod particle;
pub mod pool;
pub mod sampler;
pub mod texture;
pub mod update;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attributes::*;
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::emitter::*;
    pub use crate::particle::*;
    pub use crate::pool::*;
    pub use crate::sampler::*;
    pub use crate::texture::*;
    pub use crate::update::*;
}

pub use prelude::*;
