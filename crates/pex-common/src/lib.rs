//! # Pex Common
//!
//! Common types shared by the Pex particle emitter crates.
//!
//! This crate provides:
//! - `Color4`, the four-channel color used for color ramps
//! - `PointSprite`, the render-ready vertex record
//! - The configuration error taxonomy
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;
pub mod sprite;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
    pub use crate::sprite::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_carries_color() {
        let color = Color4::new(0.5, 0.25, 1.0, 0.75);
        let sprite = PointSprite::new(glam::Vec2::new(3.0, 4.0), 2.0, color);

        assert_eq!(sprite.color(), color);
        assert!((sprite.size - 2.0).abs() < f32::EPSILON);
    }
}
