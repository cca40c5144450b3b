//! Resolved per-part screen position.
//!
//! One [`PartState`] exists per named part of a sprite's animation. It is
//! written every time a drawn frame references the part, so game logic can
//! read where an arm or a head ended up after the last draw.

use glam::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct PartState {
    name: String,
    /// Last drawn destination x, before surface scaling.
    pub x: f32,
    /// Last drawn destination y, before surface scaling.
    pub y: f32,
}

impl PartState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
