//! Render-ready vertex record.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Color4;

/// One point sprite per live particle.
/// Layout: x, y, size, rgba (28 bytes), tightly packed for vertex upload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct PointSprite {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Point size, never negative.
    pub size: f32,
    /// Color red channel.
    pub red: f32,
    /// Color green channel.
    pub green: f32,
    /// Color blue channel.
    pub blue: f32,
    /// Color alpha channel.
    pub alpha: f32,
}

impl PointSprite {
    /// Byte offset of the size attribute.
    pub const SIZE_OFFSET: usize = 2 * std::mem::size_of::<f32>();
    /// Byte offset of the color attribute.
    pub const COLOR_OFFSET: usize = 3 * std::mem::size_of::<f32>();

    /// Creates a sprite record.
    #[must_use]
    pub const fn new(position: Vec2, size: f32, color: Color4) -> Self {
        Self {
            x: position.x,
            y: position.y,
            size,
            red: color.red,
            green: color.green,
            blue: color.blue,
            alpha: color.alpha,
        }
    }

    /// Returns the position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Returns the color.
    #[must_use]
    pub const fn color(&self) -> Color4 {
        Color4::new(self.red, self.green, self.blue, self.alpha)
    }
}
