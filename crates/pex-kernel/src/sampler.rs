//! Random variance sampling.
//!
//! Every randomized emitter parameter is expressed as `base ± variance`.
//! The sampler draws a 31-bit integer from a seedable generator and maps it
//! the same way the reference effect format does: `raw / 0x3fff_ffff - 1`
//! for the signed sample and `raw / 0x7fff_ffff` for the unit sample.
//! The mapping is computed in `f64` and narrowed, so after rounding both
//! samples land inside their closed intervals.

use glam::Vec2;
use pex_common::Color4;

/// Largest raw sample (31 bits, like C `random()`).
const RAW_MAX: u32 = 0x7fff_ffff;

/// Divisor mapping a raw sample onto `[0, 2]`.
const HALF_RAW_MAX: f64 = 0x3fff_ffff as f64;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 12345;

/// Seedable sampler for `base ± variance` parameters.
#[derive(Debug, Clone)]
pub struct VarianceSampler {
    rng: fastrand::Rng,
}

impl Default for VarianceSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl VarianceSampler {
    /// Creates a sampler with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Reseeds the underlying generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    fn raw(&mut self) -> u32 {
        self.rng.u32(..=RAW_MAX)
    }

    /// Uniform sample in `[0, 1]`.
    pub fn unit(&mut self) -> f32 {
        (f64::from(self.raw()) / f64::from(RAW_MAX)) as f32
    }

    /// Uniform sample in `[-1, 1]`.
    pub fn signed_unit(&mut self) -> f32 {
        (f64::from(self.raw()) / HALF_RAW_MAX - 1.0) as f32
    }

    /// Returns `base + spread * u` with `u` in `[-1, 1]`.
    pub fn variance(&mut self, base: f32, spread: f32) -> f32 {
        base + spread * self.signed_unit()
    }

    /// Samples each axis independently.
    pub fn variance_vec2(&mut self, base: Vec2, spread: Vec2) -> Vec2 {
        Vec2::new(
            self.variance(base.x, spread.x),
            self.variance(base.y, spread.y),
        )
    }

    /// Samples each channel independently.
    pub fn variance_color(&mut self, base: Color4, spread: Color4) -> Color4 {
        Color4::new(
            self.variance(base.red, spread.red),
            self.variance(base.green, spread.green),
            self.variance(base.blue, spread.blue),
            self.variance(base.alpha, spread.alpha),
        )
    }
}
