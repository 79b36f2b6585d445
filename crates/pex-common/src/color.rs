//! Four-channel float color used by the color ramps.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// RGBA color with float channels.
///
/// Channels are conventionally in `[0, 1]` but are never clamped here;
/// interpolation may overshoot and the renderer decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Color4 {
    /// Red channel
    pub red: f32,
    /// Green channel
    pub green: f32,
    /// Blue channel
    pub blue: f32,
    /// Alpha channel
    pub alpha: f32,
}

impl Color4 {
    /// All channels zero.
    pub const ZERO: Self = Self::splat(0.0);
    /// All channels one (opaque white).
    pub const ONES: Self = Self::splat(1.0);

    /// Creates a new color.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates a color with every channel set to `value`.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Applies `f` to every channel.
    #[must_use]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self::new(f(self.red), f(self.green), f(self.blue), f(self.alpha))
    }

    /// Combines two colors channel by channel.
    #[must_use]
    pub fn zip_with(self, other: Self, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        Self::new(
            f(self.red, other.red),
            f(self.green, other.green),
            f(self.blue, other.blue),
            f(self.alpha, other.alpha),
        )
    }
}

impl Add for Color4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl AddAssign for Color4 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Color4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul<f32> for Color4 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.map(|c| c * rhs)
    }
}

impl Div<f32> for Color4 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        self.map(|c| c / rhs)
    }
}
